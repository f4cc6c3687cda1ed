use std::time::Instant;

use crate::classification::domain::classifier_context::ClassifierContext;
use crate::pipeline::classify_frame_use_case::ClassifyFrameUseCase;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::video::domain::frame_display::FrameDisplay;
use crate::video::domain::frame_source::FrameSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    QuitRequested,
    EndOfStream,
    CaptureFailed,
    FrameLimit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveSummary {
    pub frames: usize,
    pub faces: usize,
    pub error_labels: usize,
    pub stop_reason: StopReason,
}

/// Capture → classify → display loop over a live frame source.
///
/// Runs until the quit key, the end of the stream, a capture failure, or
/// the optional frame limit. The source and display are released on every
/// exit path.
pub struct LiveClassifyUseCase {
    source: Box<dyn FrameSource>,
    display: Box<dyn FrameDisplay>,
    frame_use_case: ClassifyFrameUseCase,
    logger: Box<dyn PipelineLogger>,
    max_frames: usize,
}

impl LiveClassifyUseCase {
    /// `max_frames` of 0 means no limit.
    pub fn new(
        source: Box<dyn FrameSource>,
        display: Box<dyn FrameDisplay>,
        frame_use_case: ClassifyFrameUseCase,
        logger: Box<dyn PipelineLogger>,
        max_frames: usize,
    ) -> Self {
        Self {
            source,
            display,
            frame_use_case,
            logger,
            max_frames,
        }
    }

    pub fn execute(
        &mut self,
        context: &ClassifierContext,
    ) -> Result<LiveSummary, Box<dyn std::error::Error>> {
        self.source.open()?;
        self.logger.info("Press 'q' in the video window to quit");

        let result = self.run(context);

        self.source.close();
        self.display.close();
        self.logger.summary();
        if let Ok(summary) = &result {
            log::info!(
                "Stopped after {} frames ({:?}): {} faces, {} unclassified",
                summary.frames,
                summary.stop_reason,
                summary.faces,
                summary.error_labels
            );
        }
        result
    }

    fn run(&mut self, context: &ClassifierContext) -> Result<LiveSummary, Box<dyn std::error::Error>> {
        let mut summary = LiveSummary {
            frames: 0,
            faces: 0,
            error_labels: 0,
            stop_reason: StopReason::EndOfStream,
        };

        loop {
            if self.max_frames > 0 && summary.frames >= self.max_frames {
                summary.stop_reason = StopReason::FrameLimit;
                break;
            }

            let mut frame = match self.source.read() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    summary.stop_reason = StopReason::EndOfStream;
                    break;
                }
                Err(e) => {
                    log::warn!("Frame capture failed: {e}");
                    summary.stop_reason = StopReason::CaptureFailed;
                    break;
                }
            };

            let t0 = Instant::now();
            let faces = self.frame_use_case.execute(context, &mut frame);
            self.logger
                .timing("classify", t0.elapsed().as_secs_f64() * 1000.0);
            self.logger.metric("faces", faces.len() as f64);
            summary.faces += faces.len();
            summary.error_labels += faces.iter().filter(|f| f.is_error()).count();

            let t1 = Instant::now();
            self.display.show(&frame)?;
            self.logger
                .timing("display", t1.elapsed().as_secs_f64() * 1000.0);

            summary.frames += 1;
            self.logger.progress(summary.frames, self.max_frames);

            if self.display.quit_requested()? {
                summary.stop_reason = StopReason::QuitRequested;
                break;
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::domain::frame_annotator::FrameAnnotator;
    use crate::classification::domain::emotion_classifier::{EmotionClassifier, Prediction};
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::face_label::FaceLabel;
    use crate::shared::frame::Frame;
    use crate::shared::label_set::LabelSet;
    use crate::shared::region::Region;
    use crate::shared::sample::NormalizedSample;
    use image::GrayImage;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    #[derive(Default)]
    struct Lifecycle {
        source_opened: bool,
        source_closed: bool,
        display_closed: bool,
        shown: Vec<usize>,
    }

    type Shared = Arc<Mutex<Lifecycle>>;

    struct StubSource {
        frames: Vec<Frame>,
        fail_at: Option<usize>,
        open_fails: bool,
        reads: usize,
        state: Shared,
    }

    impl FrameSource for StubSource {
        fn open(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            if self.open_fails {
                return Err("no camera".into());
            }
            self.state.lock().unwrap().source_opened = true;
            Ok(())
        }

        fn read(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
            if self.fail_at == Some(self.reads) {
                return Err("device unplugged".into());
            }
            self.reads += 1;
            if self.frames.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.frames.remove(0)))
            }
        }

        fn close(&mut self) {
            self.state.lock().unwrap().source_closed = true;
        }
    }

    struct StubDisplay {
        quit_after: Option<usize>,
        state: Shared,
    }

    impl FrameDisplay for StubDisplay {
        fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.state.lock().unwrap().shown.push(frame.index());
            Ok(())
        }

        fn quit_requested(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
            let shown = self.state.lock().unwrap().shown.len();
            Ok(self.quit_after.is_some_and(|n| shown >= n))
        }

        fn close(&mut self) {
            self.state.lock().unwrap().display_closed = true;
        }
    }

    struct OneFaceDetector;

    impl FaceDetector for OneFaceDetector {
        fn detect(&mut self, _image: &GrayImage) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            Ok(vec![Region::new(2, 2, 8, 8)])
        }
    }

    struct NoopAnnotator;

    impl FrameAnnotator for NoopAnnotator {
        fn annotate(&self, _frame: &mut Frame, _faces: &[FaceLabel]) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
    }

    struct HappyClassifier;

    impl EmotionClassifier for HappyClassifier {
        fn num_classes(&self) -> usize {
            4
        }

        fn predict(&self, _sample: &NormalizedSample) -> Result<Prediction, Box<dyn std::error::Error>> {
            Ok(Prediction::new(vec![0.0, 1.0, 0.0, 0.0]))
        }
    }

    // --- Helpers ---

    fn frames(n: usize) -> Vec<Frame> {
        (0..n)
            .map(|i| Frame::new(vec![80; 16 * 16 * 3], 16, 16, 3, i))
            .collect()
    }

    fn context() -> ClassifierContext {
        ClassifierContext::new(Box::new(HappyClassifier), LabelSet::defaults()).unwrap()
    }

    fn build(
        source_frames: usize,
        fail_at: Option<usize>,
        quit_after: Option<usize>,
        max_frames: usize,
    ) -> (LiveClassifyUseCase, Shared) {
        let state = Shared::default();
        let use_case = LiveClassifyUseCase::new(
            Box::new(StubSource {
                frames: frames(source_frames),
                fail_at,
                open_fails: false,
                reads: 0,
                state: state.clone(),
            }),
            Box::new(StubDisplay {
                quit_after,
                state: state.clone(),
            }),
            ClassifyFrameUseCase::new(Box::new(OneFaceDetector), Box::new(NoopAnnotator)),
            Box::new(NullPipelineLogger),
            max_frames,
        );
        (use_case, state)
    }

    // --- Tests ---

    #[test]
    fn test_runs_until_end_of_stream() {
        let (mut use_case, state) = build(3, None, None, 0);
        let summary = use_case.execute(&context()).unwrap();

        assert_eq!(summary.frames, 3);
        assert_eq!(summary.faces, 3);
        assert_eq!(summary.error_labels, 0);
        assert_eq!(summary.stop_reason, StopReason::EndOfStream);
        let state = state.lock().unwrap();
        assert_eq!(state.shown, vec![0, 1, 2]);
        assert!(state.source_opened && state.source_closed && state.display_closed);
    }

    #[test]
    fn test_quit_key_stops_loop() {
        let (mut use_case, state) = build(10, None, Some(2), 0);
        let summary = use_case.execute(&context()).unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.stop_reason, StopReason::QuitRequested);
        assert!(state.lock().unwrap().source_closed);
    }

    #[test]
    fn test_frame_limit_stops_loop() {
        let (mut use_case, _) = build(10, None, None, 4);
        let summary = use_case.execute(&context()).unwrap();
        assert_eq!(summary.frames, 4);
        assert_eq!(summary.stop_reason, StopReason::FrameLimit);
    }

    #[test]
    fn test_capture_failure_ends_loop_and_releases() {
        let (mut use_case, state) = build(10, Some(1), None, 0);
        let summary = use_case.execute(&context()).unwrap();
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.stop_reason, StopReason::CaptureFailed);
        let state = state.lock().unwrap();
        assert!(state.source_closed && state.display_closed);
    }

    #[test]
    fn test_unopenable_source_is_fatal() {
        let state = Shared::default();
        let mut use_case = LiveClassifyUseCase::new(
            Box::new(StubSource {
                frames: frames(1),
                fail_at: None,
                open_fails: true,
                reads: 0,
                state: state.clone(),
            }),
            Box::new(StubDisplay {
                quit_after: None,
                state: state.clone(),
            }),
            ClassifyFrameUseCase::new(Box::new(OneFaceDetector), Box::new(NoopAnnotator)),
            Box::new(NullPipelineLogger),
            0,
        );
        assert!(use_case.execute(&context()).is_err());
        assert!(state.lock().unwrap().shown.is_empty());
    }
}
