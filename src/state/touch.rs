// Horizontal swipe recognition for the document stack.
use crate::model::ScreenPoint;

pub const SWIPE_MIN_PX: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger travelled right-to-left.
    Left,
    Right,
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct SwipeTracker {
    start: Option<ScreenPoint>,
}

impl SwipeTracker {
    pub fn begin(&mut self, p: ScreenPoint) {
        self.start = Some(p);
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }

    /// Short or vertical-dominant travel is not a swipe.
    pub fn finish(&mut self, end: ScreenPoint) -> Option<SwipeDirection> {
        let start = self.start.take()?;
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        if dx.abs() < SWIPE_MIN_PX || dy.abs() > dx.abs() {
            return None;
        }
        Some(if dx < 0.0 {
            SwipeDirection::Left
        } else {
            SwipeDirection::Right
        })
    }
}
