//! Gesture controller for the document stack: open/closed folder, focus
//! navigation with a deferred page flip, the hand-dealt card layout and the
//! press-and-hold drag that deletes a page when dropped on the side strip.
//!
//! The controller never owns the pages. It is told how many there are and
//! reports deletion requests back to the caller. Deferred transitions hand out
//! a token; the caller schedules a timer and feeds the token back, and a
//! token that no longer matches is ignored.

use crate::model::{ScreenPoint, ScreenRect};
use crate::state::SwipeTracker;
use crate::state::touch::SwipeDirection;

pub const HOLD_DELAY_MS: u32 = 500;
pub const FLIP_DURATION_MS: u32 = 450;
pub const DROP_ZONE_WIDTH_PX: f64 = 192.0;

const FOCUS_Z_INDEX: i32 = 1000;
// strictly below both distance-1 neighbours
const FLIP_Z_INDEX: i32 = FOCUS_Z_INDEX - 2;
const CLOSED_Z_BASE: i32 = 900;
const DRAG_Z_INDEX: i32 = 9999;

/// The delete strip along the right edge of a `(width, height)` viewport.
pub fn drop_zone_strip(viewport: (f64, f64)) -> ScreenRect {
    let (w, h) = viewport;
    ScreenRect::new(w - DROP_ZONE_WIDTH_PX, 0.0, DROP_ZONE_WIDTH_PX, h)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub offset_y: f64,
    pub blur: f64,
    pub alpha: f64,
}

/// Transform descriptor for one card. Translation is a percentage of the
/// card's own size plus a pixel term.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardLayout {
    pub x_pct: f64,
    pub y_pct: f64,
    pub dx_px: f64,
    pub dy_px: f64,
    pub rotate_deg: f64,
    pub z_px: f64,
    pub scale: f64,
    pub z_index: i32,
    pub shadow: Shadow,
}

impl CardLayout {
    pub fn transform_css(&self) -> String {
        format!(
            "translate(calc({:.3}% + {:.3}px), calc({:.3}% + {:.3}px)) rotate({:.3}deg) translateZ({:.3}px) scale({:.4})",
            self.x_pct, self.dx_px, self.y_pct, self.dy_px, self.rotate_deg, self.z_px, self.scale
        )
    }

    pub fn shadow_css(&self) -> String {
        format!(
            "0 {:.1}px {:.1}px rgba(0,0,0,{:.3})",
            self.shadow.offset_y, self.shadow.blur, self.shadow.alpha
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pub index: usize,
    pub pointer: ScreenPoint,
    pub over_drop_zone: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Hold {
    Idle,
    /// Pressed on the focused page, waiting for the hold delay.
    Pending {
        index: usize,
        token: u64,
        pointer: ScreenPoint,
    },
    Dragging(DragSession),
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Flip {
    index: usize,
    token: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Ignored,
    Moved,
    /// Focus advances once the flip timer delivers this token.
    FlipStarted { token: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    None,
    HoldCancelled,
    Dropped { index: usize, delete: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub struct StackController {
    open: bool,
    focus: usize,
    len: usize,
    flip: Option<Flip>,
    hold: Hold,
    suppress_click: bool,
    swipe: SwipeTracker,
    last_token: u64,
}

impl StackController {
    pub fn new(len: usize) -> Self {
        Self {
            open: false,
            focus: 0,
            len,
            flip: None,
            hold: Hold::Idle,
            suppress_click: false,
            swipe: SwipeTracker::default(),
            last_token: 0,
        }
    }

    fn issue_token(&mut self) -> u64 {
        self.last_token += 1;
        self.last_token
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn flipping_index(&self) -> Option<usize> {
        self.flip.map(|f| f.index)
    }

    pub fn drag(&self) -> Option<DragSession> {
        match self.hold {
            Hold::Dragging(d) => Some(d),
            _ => None,
        }
    }

    pub fn drop_zone_visible(&self) -> bool {
        self.drag().is_some()
    }

    /// The caller changed the page list; keep focus inside it and drop
    /// transitions that point past the end.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.focus = self.focus.min(len.saturating_sub(1));
        if self.flip.is_some_and(|f| f.index + 1 >= len) {
            self.flip = None;
        }
        match self.hold {
            Hold::Pending { index, .. } | Hold::Dragging(DragSession { index, .. }) if index >= len => {
                self.hold = Hold::Idle;
            }
            _ => {}
        }
    }

    /// Flips closed/open. Closing cancels every pending transition and
    /// rewinds focus to the first page.
    pub fn toggle_open(&mut self) -> bool {
        self.open = !self.open;
        if !self.open {
            self.focus = 0;
            self.flip = None;
            self.hold = Hold::Idle;
            self.swipe.cancel();
            self.suppress_click = false;
        }
        self.open
    }

    /// Jump straight to a page (fullscreen viewer sync). Cancels a running flip.
    pub fn set_focus(&mut self, index: usize) -> bool {
        if !self.open || index >= self.len {
            return false;
        }
        self.flip = None;
        self.focus = index;
        true
    }

    /// Starts the flip-out of the focused page. Calls made while a flip is
    /// running are ignored so each flip advances exactly one page.
    pub fn next(&mut self) -> Navigation {
        if !self.open || self.flip.is_some() || self.focus + 1 >= self.len {
            return Navigation::Ignored;
        }
        let token = self.issue_token();
        self.flip = Some(Flip {
            index: self.focus,
            token,
        });
        Navigation::FlipStarted { token }
    }

    pub fn finish_flip(&mut self, token: u64) -> bool {
        match self.flip {
            Some(f) if f.token == token && self.open => {
                self.flip = None;
                self.focus = (f.index + 1).min(self.len.saturating_sub(1));
                true
            }
            _ => false,
        }
    }

    /// Steps back immediately, without animation.
    pub fn prev(&mut self) -> Navigation {
        if !self.open || self.flip.is_some() || self.focus == 0 {
            return Navigation::Ignored;
        }
        self.focus -= 1;
        Navigation::Moved
    }

    /// Card placement as a function of the offset from focus and the
    /// open/closed state only.
    pub fn compute_layout(&self, index: usize) -> CardLayout {
        if !self.open {
            return CardLayout {
                x_pct: -50.0,
                y_pct: -50.0,
                dx_px: 0.0,
                dy_px: index as f64 * 0.5,
                rotate_deg: 0.0,
                z_px: 0.0,
                scale: 0.95,
                z_index: CLOSED_Z_BASE + index as i32,
                shadow: Shadow {
                    offset_y: 10.0,
                    blur: 30.0,
                    alpha: 0.3,
                },
            };
        }
        let offset = index as i64 - self.focus as i64;
        if offset == 0 {
            return CardLayout {
                x_pct: -50.0,
                y_pct: -50.0,
                dx_px: 0.0,
                dy_px: 0.0,
                rotate_deg: 0.0,
                z_px: 10.0,
                scale: 1.0,
                z_index: FOCUS_Z_INDEX,
                shadow: Shadow {
                    offset_y: 20.0,
                    blur: 60.0,
                    alpha: 0.4,
                },
            };
        }
        let d = offset.unsigned_abs() as f64;
        let z_index = FOCUS_Z_INDEX - offset.unsigned_abs().min(i32::MAX as u64 / 2) as i32;
        if offset < 0 {
            // already read: fanned out to the left, tilting further away
            CardLayout {
                x_pct: -184.0 - d * 1.2,
                y_pct: -50.0 + d * 1.5,
                dx_px: 0.0,
                dy_px: 0.0,
                rotate_deg: -3.0 - d * 0.5,
                z_px: 5.0 - d * 4.0,
                scale: (1.0 - d * 0.02).max(0.1),
                z_index,
                shadow: Shadow {
                    offset_y: 10.0 + d * 2.0,
                    blur: 30.0 + d * 3.0,
                    alpha: (0.2 + d * 0.03).min(1.0),
                },
            }
        } else {
            CardLayout {
                x_pct: -50.0 + d * 2.5,
                y_pct: -50.0 + d * 1.8,
                dx_px: 0.0,
                dy_px: 0.0,
                rotate_deg: d * 0.7,
                z_px: 10.0 - d * 5.0,
                scale: (1.0 - d * 0.02).max(0.1),
                z_index,
                shadow: Shadow {
                    offset_y: 12.0 + d * 2.0,
                    blur: 35.0 + d * 4.0,
                    alpha: (0.25 + d * 0.04).min(1.0),
                },
            }
        }
    }

    /// Layout including transient state: the flipping page heads for the
    /// discard pile, the dragged page follows the pointer (`viewport` is the
    /// window size, the stack is centered in it).
    pub fn card_layout(&self, index: usize, viewport: (f64, f64)) -> CardLayout {
        if let Some(d) = self.drag().filter(|d| d.index == index) {
            return CardLayout {
                x_pct: -50.0,
                y_pct: -50.0,
                dx_px: d.pointer.x - viewport.0 / 2.0,
                dy_px: d.pointer.y - viewport.1 / 2.0,
                rotate_deg: 0.0,
                z_px: 0.0,
                scale: 0.9,
                z_index: DRAG_Z_INDEX,
                shadow: Shadow {
                    offset_y: 25.0,
                    blur: 80.0,
                    alpha: 0.6,
                },
            };
        }
        if self.open && self.flipping_index() == Some(index) {
            return CardLayout {
                x_pct: -250.0,
                y_pct: -50.0,
                dx_px: 0.0,
                dy_px: 0.0,
                rotate_deg: -5.0,
                z_px: -20.0,
                scale: 0.95,
                z_index: FLIP_Z_INDEX,
                shadow: Shadow {
                    offset_y: 20.0,
                    blur: 60.0,
                    alpha: 0.4,
                },
            };
        }
        self.compute_layout(index)
    }

    // ---------------- Hold / drag -----------------

    /// Press on a page. Only the focused page of an open stack arms the hold
    /// timer; the returned token must come back through [`Self::hold_elapsed`].
    pub fn begin_hold(&mut self, index: usize, pointer: ScreenPoint) -> Option<u64> {
        self.suppress_click = false;
        if !self.open || index != self.focus || index >= self.len || self.drag().is_some() {
            return None;
        }
        let token = self.issue_token();
        self.hold = Hold::Pending {
            index,
            token,
            pointer,
        };
        Some(token)
    }

    pub fn hold_elapsed(&mut self, token: u64) -> bool {
        match self.hold {
            Hold::Pending {
                index,
                token: t,
                pointer,
            } if t == token && self.open && index == self.focus => {
                self.hold = Hold::Dragging(DragSession {
                    index,
                    pointer,
                    over_drop_zone: false,
                });
                true
            }
            _ => false,
        }
    }

    /// Pointer left the stack before the hold fired.
    pub fn cancel_hold(&mut self) -> bool {
        if matches!(self.hold, Hold::Pending { .. }) {
            self.hold = Hold::Idle;
            return true;
        }
        false
    }

    /// Tracks the pointer; while dragging also re-tests the drop zone.
    pub fn pointer_move(&mut self, p: ScreenPoint, drop_zone: Option<ScreenRect>) -> bool {
        match &mut self.hold {
            Hold::Idle => false,
            Hold::Pending { pointer, .. } => {
                *pointer = p;
                false
            }
            Hold::Dragging(d) => {
                d.pointer = p;
                d.over_drop_zone = drop_zone.is_some_and(|z| z.contains(p));
                true
            }
        }
    }

    /// Ends the press. A finished drag always hides the drop zone and
    /// swallows the click that follows the release.
    pub fn pointer_up(&mut self) -> Release {
        match std::mem::replace(&mut self.hold, Hold::Idle) {
            Hold::Idle => Release::None,
            Hold::Pending { .. } => Release::HoldCancelled,
            Hold::Dragging(d) => {
                self.suppress_click = true;
                Release::Dropped {
                    index: d.index,
                    delete: d.over_drop_zone,
                }
            }
        }
    }

    /// Whether a click on `index` should open it fullscreen. Consumes the
    /// post-drag suppression.
    pub fn click(&mut self, index: usize) -> bool {
        if std::mem::take(&mut self.suppress_click) {
            return false;
        }
        self.open && self.drag().is_none() && index == self.focus && index < self.len
    }

    // ---------------- Touch -----------------

    pub fn touch_start(&mut self, p: ScreenPoint) {
        if self.open && !self.drop_zone_visible() {
            self.swipe.begin(p);
        }
    }

    pub fn touch_end(&mut self, p: ScreenPoint) -> Navigation {
        let dir = self.swipe.finish(p);
        if !self.open || self.drop_zone_visible() {
            return Navigation::Ignored;
        }
        match dir {
            Some(SwipeDirection::Left) => self.next(),
            Some(SwipeDirection::Right) => self.prev(),
            None => Navigation::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_stack(len: usize) -> StackController {
        let mut s = StackController::new(len);
        s.toggle_open();
        s
    }

    fn advance(s: &mut StackController) {
        match s.next() {
            Navigation::FlipStarted { token } => assert!(s.finish_flip(token)),
            other => panic!("expected flip, got {other:?}"),
        }
    }

    #[test]
    fn next_defers_focus_until_flip_finishes() {
        let mut s = open_stack(3);
        let Navigation::FlipStarted { token } = s.next() else {
            panic!("flip expected");
        };
        assert_eq!(s.focus(), 0);
        assert_eq!(s.flipping_index(), Some(0));
        assert_eq!(s.next(), Navigation::Ignored);
        assert!(s.finish_flip(token));
        assert_eq!(s.focus(), 1);
        assert!(!s.finish_flip(token));
        assert_eq!(s.focus(), 1);
    }

    #[test]
    fn next_on_last_page_is_noop() {
        let mut s = open_stack(2);
        advance(&mut s);
        assert_eq!(s.next(), Navigation::Ignored);
        assert_eq!(s.focus(), 1);
    }

    #[test]
    fn prev_is_immediate() {
        let mut s = open_stack(3);
        advance(&mut s);
        assert_eq!(s.prev(), Navigation::Moved);
        assert_eq!(s.focus(), 0);
        assert_eq!(s.prev(), Navigation::Ignored);
    }

    #[test]
    fn navigation_requires_open_stack() {
        let mut s = StackController::new(3);
        assert_eq!(s.next(), Navigation::Ignored);
        assert_eq!(s.prev(), Navigation::Ignored);
    }

    #[test]
    fn close_resets_focus_and_stale_flip() {
        let mut s = open_stack(3);
        advance(&mut s);
        advance(&mut s);
        assert_eq!(s.focus(), 2);
        s.toggle_open();
        s.toggle_open();
        assert_eq!(s.focus(), 0);

        let Navigation::FlipStarted { token } = s.next() else {
            panic!("flip expected");
        };
        s.toggle_open();
        assert!(!s.finish_flip(token));
        s.toggle_open();
        assert_eq!(s.focus(), 0);
    }

    #[test]
    fn open_layout_z_order_falls_off_with_distance() {
        let mut s = open_stack(5);
        advance(&mut s);
        advance(&mut s);
        let z = |i| s.compute_layout(i).z_index;
        assert!(z(2) > z(1) && z(1) > z(0));
        assert!(z(2) > z(3) && z(3) > z(4));
    }

    #[test]
    fn layout_is_asymmetric() {
        let mut s = open_stack(3);
        advance(&mut s);
        let behind = s.compute_layout(0);
        let ahead = s.compute_layout(2);
        let focus = s.compute_layout(1);
        assert_eq!((focus.rotate_deg, focus.scale), (0.0, 1.0));
        assert!(behind.rotate_deg < 0.0 && ahead.rotate_deg > 0.0);
        assert!(behind.x_pct < -100.0);
        assert!((behind.rotate_deg.abs() - ahead.rotate_deg.abs()).abs() > 1.0);
    }

    #[test]
    fn closed_layout_piles_by_index() {
        let s = StackController::new(3);
        let a = s.compute_layout(0);
        let b = s.compute_layout(2);
        assert!(b.z_index > a.z_index);
        assert_eq!(b.dy_px, 1.0);
        assert_eq!(a.rotate_deg, 0.0);
    }

    #[test]
    fn hold_only_on_focused_page() {
        let mut s = open_stack(3);
        assert_eq!(s.begin_hold(1, ScreenPoint::default()), None);
        assert!(s.begin_hold(0, ScreenPoint::default()).is_some());
        let mut closed = StackController::new(3);
        assert_eq!(closed.begin_hold(0, ScreenPoint::default()), None);
    }

    #[test]
    fn early_release_is_a_plain_click() {
        let mut s = open_stack(2);
        let token = s.begin_hold(0, ScreenPoint::new(400.0, 300.0)).unwrap();
        assert_eq!(s.pointer_up(), Release::HoldCancelled);
        assert!(!s.hold_elapsed(token));
        assert!(s.drag().is_none());
        assert!(s.click(0));
    }

    #[test]
    fn drag_released_outside_zone_neither_deletes_nor_opens() {
        let zone = ScreenRect::new(1088.0, 0.0, DROP_ZONE_WIDTH_PX, 800.0);
        let mut s = open_stack(3);
        let token = s.begin_hold(0, ScreenPoint::new(500.0, 400.0)).unwrap();
        assert!(s.hold_elapsed(token));
        assert!(s.drop_zone_visible());
        s.pointer_move(ScreenPoint::new(540.0, 400.0), Some(zone));
        assert!(!s.drag().unwrap().over_drop_zone);
        assert_eq!(s.pointer_up(), Release::Dropped { index: 0, delete: false });
        assert!(!s.drop_zone_visible());
        assert!(!s.click(0));
        assert_eq!(s.compute_layout(0), s.card_layout(0, (1280.0, 800.0)));
        // the suppression is one-shot
        assert!(s.click(0));
    }

    #[test]
    fn drag_released_inside_zone_requests_delete() {
        let zone = ScreenRect::new(1088.0, 0.0, DROP_ZONE_WIDTH_PX, 800.0);
        let mut s = open_stack(3);
        let token = s.begin_hold(0, ScreenPoint::new(500.0, 400.0)).unwrap();
        s.hold_elapsed(token);
        s.pointer_move(ScreenPoint::new(1200.0, 300.0), Some(zone));
        assert!(s.drag().unwrap().over_drop_zone);
        let layout = s.card_layout(0, (1280.0, 800.0));
        assert_eq!((layout.dx_px, layout.dy_px), (560.0, -100.0));
        assert_eq!(s.pointer_up(), Release::Dropped { index: 0, delete: true });
        s.set_len(2);
        assert_eq!(s.focus(), 0);
    }

    #[test]
    fn stale_hold_token_is_ignored() {
        let mut s = open_stack(3);
        let first = s.begin_hold(0, ScreenPoint::default()).unwrap();
        s.cancel_hold();
        let second = s.begin_hold(0, ScreenPoint::default()).unwrap();
        assert!(!s.hold_elapsed(first));
        assert!(s.hold_elapsed(second));
    }

    #[test]
    fn shrinking_list_clamps_focus() {
        let mut s = open_stack(3);
        advance(&mut s);
        advance(&mut s);
        s.set_len(2);
        assert_eq!(s.focus(), 1);
        s.set_len(0);
        assert_eq!(s.focus(), 0);
    }

    #[test]
    fn swipe_thresholds() {
        let mut s = open_stack(3);
        s.touch_start(ScreenPoint::new(300.0, 200.0));
        assert_eq!(s.touch_end(ScreenPoint::new(260.0, 200.0)), Navigation::Ignored);

        s.touch_start(ScreenPoint::new(300.0, 200.0));
        let Navigation::FlipStarted { token } = s.touch_end(ScreenPoint::new(240.0, 205.0)) else {
            panic!("left swipe should flip forward");
        };
        s.finish_flip(token);
        assert_eq!(s.focus(), 1);

        advance(&mut s);
        assert_eq!(s.focus(), 2);
        s.touch_start(ScreenPoint::new(300.0, 200.0));
        assert_eq!(s.touch_end(ScreenPoint::new(240.0, 200.0)), Navigation::Ignored);
        assert_eq!(s.focus(), 2);
    }

    #[test]
    fn swipe_right_goes_back_and_vertical_is_ignored() {
        let mut s = open_stack(3);
        advance(&mut s);
        s.touch_start(ScreenPoint::new(100.0, 100.0));
        assert_eq!(s.touch_end(ScreenPoint::new(100.0, 300.0)), Navigation::Ignored);
        s.touch_start(ScreenPoint::new(100.0, 100.0));
        assert_eq!(s.touch_end(ScreenPoint::new(180.0, 110.0)), Navigation::Moved);
        assert_eq!(s.focus(), 0);
    }

    #[test]
    fn swipe_disabled_while_dragging() {
        let mut s = open_stack(3);
        let token = s.begin_hold(0, ScreenPoint::default()).unwrap();
        s.hold_elapsed(token);
        s.touch_start(ScreenPoint::new(300.0, 200.0));
        assert_eq!(s.touch_end(ScreenPoint::new(100.0, 200.0)), Navigation::Ignored);
    }

    #[test]
    fn second_hold_while_dragging_is_refused() {
        let mut s = open_stack(3);
        let token = s.begin_hold(0, ScreenPoint::new(10.0, 10.0)).unwrap();
        assert!(s.hold_elapsed(token));
        assert_eq!(s.begin_hold(0, ScreenPoint::new(20.0, 20.0)), None);
        assert_eq!(s.drag().map(|d| d.index), Some(0));
    }

    #[test]
    fn set_focus_cancels_running_flip() {
        let mut s = open_stack(4);
        let Navigation::FlipStarted { token } = s.next() else {
            panic!("flip expected");
        };
        assert!(s.set_focus(2));
        assert_eq!(s.flipping_index(), None);
        assert!(!s.finish_flip(token));
        assert_eq!(s.focus(), 2);
    }

    #[test]
    fn set_focus_rejects_out_of_range_and_closed() {
        let mut s = open_stack(3);
        assert!(!s.set_focus(7));
        assert_eq!(s.focus(), 0);
        s.toggle_open();
        assert!(!s.set_focus(1));
        assert_eq!(s.focus(), 0);
    }

    #[test]
    fn flipping_page_sits_below_its_neighbours() {
        let mut s = open_stack(3);
        advance(&mut s);
        let Navigation::FlipStarted { .. } = s.next() else {
            panic!("flip expected");
        };
        let flipping = s.card_layout(1, (1000.0, 800.0));
        let before = s.card_layout(0, (1000.0, 800.0));
        let after = s.card_layout(2, (1000.0, 800.0));
        assert_eq!(flipping.z_index, FLIP_Z_INDEX);
        assert!(flipping.z_index < before.z_index);
        assert!(flipping.z_index < after.z_index);
        assert_ne!(flipping, s.compute_layout(1));
    }

    #[test]
    fn drop_strip_hugs_the_right_screen_edge() {
        let zone = drop_zone_strip((1600.0, 900.0));
        assert_eq!(zone, ScreenRect::new(1408.0, 0.0, DROP_ZONE_WIDTH_PX, 900.0));

        let mut s = open_stack(2);
        let token = s.begin_hold(0, ScreenPoint::new(800.0, 450.0)).unwrap();
        assert!(s.hold_elapsed(token));
        // the folder sits left of center; dropping there keeps the page
        s.pointer_move(ScreenPoint::new(700.0, 450.0), Some(zone));
        assert!(!s.drag().unwrap().over_drop_zone);
        s.pointer_move(ScreenPoint::new(1599.0, 20.0), Some(zone));
        assert_eq!(s.pointer_up(), Release::Dropped { index: 0, delete: true });
    }
}
