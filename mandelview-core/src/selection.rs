/// A screen-space rectangle dragged out by the user.
///
/// Stores the raw drag extremes; the accessors normalise them so the
/// rectangle reads the same whichever direction it was dragged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRect {
    pub x1: i32,
    pub x2: i32,
    pub y1: i32,
    pub y2: i32,
}

impl SelectionRect {
    /// Rectangle spanning the press point and the current pointer position.
    pub fn from_corners(start: (i32, i32), end: (i32, i32)) -> Self {
        Self {
            x1: start.0,
            x2: end.0,
            y1: start.1,
            y2: end.1,
        }
    }

    pub fn left(&self) -> i32 {
        self.x1.min(self.x2)
    }

    pub fn top(&self) -> i32 {
        self.y1.min(self.y2)
    }

    pub fn right(&self) -> i32 {
        self.x1.max(self.x2)
    }

    pub fn bottom(&self) -> i32 {
        self.y1.max(self.y2)
    }

    pub fn width(&self) -> u32 {
        self.x1.abs_diff(self.x2)
    }

    pub fn height(&self) -> u32 {
        self.y1.abs_diff(self.y2)
    }

    /// A click without drag: zero width and zero height.
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 && self.height() == 0
    }

    /// `(left, top, width, height)`, the shape a display layer draws as the
    /// drag overlay.
    pub fn overlay(&self) -> (i32, i32, u32, u32) {
        (self.left(), self.top(), self.width(), self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_any_drag_direction() {
        let forward = SelectionRect::from_corners((10, 20), (110, 70));
        let backward = SelectionRect::from_corners((110, 70), (10, 20));
        let mixed = SelectionRect::from_corners((110, 20), (10, 70));

        for r in [forward, backward, mixed] {
            assert_eq!((r.left(), r.top(), r.right(), r.bottom()), (10, 20, 110, 70));
            assert_eq!((r.width(), r.height()), (100, 50));
        }
    }

    #[test]
    fn click_is_degenerate() {
        assert!(SelectionRect::from_corners((5, 5), (5, 5)).is_degenerate());
        // A purely vertical drag still has extent.
        assert!(!SelectionRect::from_corners((5, 5), (5, 40)).is_degenerate());
    }

    #[test]
    fn overlay_allows_offscreen_corners() {
        let r = SelectionRect::from_corners((-15, 30), (40, -10));
        assert_eq!(r.overlay(), (-15, -10, 55, 40));
    }
}
