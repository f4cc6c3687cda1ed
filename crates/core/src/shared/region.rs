/// A detected face rectangle in frame-pixel coordinates.
///
/// Regions are transient: the detector produces a fresh set per frame and
/// no identity carries across frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Intersection with a `width × height` image, or `None` when nothing
    /// of the region lies inside it.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Region> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.right().min(width as i32);
        let y2 = self.bottom().min(height as i32);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Region::new(x1, y1, x2 - x1, y2 - y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_edges() {
        let r = Region::new(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
    }

    #[test]
    fn test_extreme_rectangle_saturates() {
        let r = Region::new(i32::MAX - 5, 10, i32::MAX, i32::MAX);
        assert_eq!(r.right(), i32::MAX);
        assert_eq!(r.bottom(), i32::MAX);
        assert_eq!(r.clamp_to(100, 100), None);
        assert_eq!(
            Region::new(20, 30, i32::MAX, i32::MAX).clamp_to(100, 100),
            Some(Region::new(20, 30, 80, 70))
        );
    }

    #[test]
    fn test_clamp_inside_is_identity() {
        let r = Region::new(10, 10, 20, 20);
        assert_eq!(r.clamp_to(100, 100), Some(r));
    }

    #[rstest]
    #[case::left_edge(Region::new(-10, 0, 30, 30), Region::new(0, 0, 20, 30))]
    #[case::top_edge(Region::new(0, -5, 30, 30), Region::new(0, 0, 30, 25))]
    #[case::bottom_right(Region::new(90, 90, 30, 30), Region::new(90, 90, 10, 10))]
    fn test_clamp_partial(#[case] region: Region, #[case] expected: Region) {
        assert_eq!(region.clamp_to(100, 100), Some(expected));
    }

    #[rstest]
    #[case::outside_right(Region::new(150, 0, 10, 10))]
    #[case::outside_above(Region::new(0, -20, 10, 10))]
    #[case::zero_width(Region::new(10, 10, 0, 10))]
    #[case::zero_height(Region::new(10, 10, 10, 0))]
    fn test_clamp_empty(#[case] region: Region) {
        assert_eq!(region.clamp_to(100, 100), None);
    }
}
