use crate::shared::frame::Frame;

/// Produces frames from a live device.
///
/// Implementations own the device handle and hand out BGR frames in
/// capture order, with increasing frame indices.
pub trait FrameSource: Send {
    /// Acquires the device. Fails if it cannot be opened.
    fn open(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    /// Next frame, or `None` once the device stops delivering.
    fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Releases the device. Safe to call more than once.
    fn close(&mut self);
}
