//! Annotation surface for the map: tool selection, pointer-driven pan / draw /
//! erase, marker placement and the persisted stroke and marker sets.
//!
//! Everything is expressed in normalized 0..100 coordinates through
//! [`Viewport`], so stored annotations survive zoom, pan and resizes.
//! Methods report what changed so the caller can redraw and persist in the
//! same event handler.

use crate::model::{Marker, MarkerKind, NormPoint, ScreenPoint, ScreenRect, Stroke};
use crate::state::viewport::{PanDirection, Viewport};

pub const ERASE_DIVISOR: f64 = 5.0;
pub const MARKER_MIN_PX: f64 = 32.0;
pub const MARKER_BASE_PX: f64 = 40.0;
pub const DEFAULT_PEN_COLOR: &str = "#ff0000";
pub const DEFAULT_PEN_WIDTH: f64 = 3.0;
pub const PEN_WIDTH_RANGE: (f64, f64) = (1.0, 10.0);
pub const DEFAULT_ERASER_WIDTH: f64 = 10.0;
pub const ERASER_WIDTH_RANGE: (f64, f64) = (5.0, 30.0);

#[derive(Clone, Debug, PartialEq)]
pub enum Tool {
    Idle,
    PlaceMarker(MarkerKind),
    Draw { color: String, width: f64 },
    Erase { width: f64 },
}

/// Toolbar button identity, independent of the pen/eraser settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolKind {
    Marker(MarkerKind),
    Pen,
    Eraser,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Maps `MouseEvent.button`.
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => PointerButton::Middle,
            2 => PointerButton::Secondary,
            _ => PointerButton::Primary,
        }
    }
}

/// Active pointer session. At most one at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    None,
    /// `anchor` is the pointer position minus the pan offset at press time.
    Panning { anchor: ScreenPoint },
    Stroking { points: Vec<NormPoint> },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Ink {
    Color { color: String, width: f64 },
    Erase { width: f64 },
}

/// Newly appended piece of the in-progress stroke, for incremental rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeSegment {
    pub from: NormPoint,
    pub to: NormPoint,
    pub ink: Ink,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MoveEffect {
    None,
    Panned,
    Segment(StrokeSegment),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReleaseEffect {
    None,
    PanEnded,
    /// A tap or a one-sample stroke: nothing is kept.
    StrokeDiscarded,
    StrokeAdded { id: String },
    Erased { removed: usize },
}

impl ReleaseEffect {
    pub fn paths_changed(&self) -> bool {
        matches!(self, ReleaseEffect::StrokeAdded { .. })
            || matches!(self, ReleaseEffect::Erased { removed } if *removed > 0)
    }

    /// Erase strokes punch holes into the raster while moving, so any
    /// finished stroke requires a full repaint.
    pub fn needs_repaint(&self) -> bool {
        matches!(
            self,
            ReleaseEffect::StrokeAdded { .. }
                | ReleaseEffect::Erased { .. }
                | ReleaseEffect::StrokeDiscarded
        )
    }
}

/// Proximity test used by the eraser: true when any point of `stroke` lies
/// closer than `eraser_width / 5` to any point of `erase_path`. This is an
/// approximation of segment intersection; fast strokes with sparse samples
/// can slip past each other.
pub fn strokes_touch(stroke: &[NormPoint], erase_path: &[NormPoint], eraser_width: f64) -> bool {
    let limit = eraser_width / ERASE_DIVISOR;
    stroke
        .iter()
        .any(|a| erase_path.iter().any(|b| a.distance(*b) < limit))
}

/// On-screen marker diameter: never below 32px, shrinking with zoom above 1x.
pub fn marker_size_px(zoom: f64) -> f64 {
    MARKER_MIN_PX.max(MARKER_BASE_PX / zoom)
}

pub fn marker_icon_scale(zoom: f64) -> f64 {
    (marker_size_px(zoom) / MARKER_BASE_PX).min(1.0)
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationSurface {
    pub viewport: Viewport,
    tool: Tool,
    gesture: Gesture,
    pen_color: String,
    pen_width: f64,
    eraser_width: f64,
    markers: Vec<Marker>,
    strokes: Vec<Stroke>,
    editing: Option<String>,
}

impl Default for AnnotationSurface {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            tool: Tool::Idle,
            gesture: Gesture::None,
            pen_color: DEFAULT_PEN_COLOR.to_string(),
            pen_width: DEFAULT_PEN_WIDTH,
            eraser_width: DEFAULT_ERASER_WIDTH,
            markers: Vec::new(),
            strokes: Vec::new(),
            editing: None,
        }
    }
}

impl AnnotationSurface {
    pub fn new(markers: Vec<Marker>, strokes: Vec<Stroke>) -> Self {
        let mut s = Self::default();
        s.load(markers, strokes);
        s
    }

    /// Replaces both sets. Strokes with fewer than two points are dropped.
    pub fn load(&mut self, markers: Vec<Marker>, strokes: Vec<Stroke>) {
        self.markers = markers;
        self.strokes = strokes.into_iter().filter(Stroke::is_drawable).collect();
        self.gesture = Gesture::None;
        self.editing = None;
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Gesture::Panning { .. })
    }

    pub fn is_stroking(&self) -> bool {
        matches!(self.gesture, Gesture::Stroking { .. })
    }

    pub fn pen_color(&self) -> &str {
        &self.pen_color
    }

    pub fn pen_width(&self) -> f64 {
        self.pen_width
    }

    pub fn eraser_width(&self) -> f64 {
        self.eraser_width
    }

    pub fn tool_kind(&self) -> Option<ToolKind> {
        match self.tool {
            Tool::Idle => None,
            Tool::PlaceMarker(kind) => Some(ToolKind::Marker(kind)),
            Tool::Draw { .. } => Some(ToolKind::Pen),
            Tool::Erase { .. } => Some(ToolKind::Eraser),
        }
    }

    // ---------------- Tools -----------------

    /// Switches tool and cancels whatever gesture was in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        self.gesture = Gesture::None;
        self.tool = tool;
    }

    /// Toolbar behaviour: picking the active tool again deselects it.
    pub fn toggle_tool(&mut self, kind: ToolKind) {
        if self.tool_kind() == Some(kind) {
            self.set_tool(Tool::Idle);
            return;
        }
        let tool = match kind {
            ToolKind::Marker(k) => Tool::PlaceMarker(k),
            ToolKind::Pen => Tool::Draw {
                color: self.pen_color.clone(),
                width: self.pen_width,
            },
            ToolKind::Eraser => Tool::Erase {
                width: self.eraser_width,
            },
        };
        self.set_tool(tool);
    }

    pub fn set_pen_color(&mut self, color: &str) {
        self.pen_color = color.to_string();
        if let Tool::Draw { color: c, .. } = &mut self.tool {
            *c = self.pen_color.clone();
        }
    }

    pub fn set_pen_width(&mut self, width: f64) {
        self.pen_width = width.clamp(PEN_WIDTH_RANGE.0, PEN_WIDTH_RANGE.1);
        if let Tool::Draw { width: w, .. } = &mut self.tool {
            *w = self.pen_width;
        }
    }

    pub fn set_eraser_width(&mut self, width: f64) {
        self.eraser_width = width.clamp(ERASER_WIDTH_RANGE.0, ERASER_WIDTH_RANGE.1);
        if let Tool::Erase { width: w } = &mut self.tool {
            *w = self.eraser_width;
        }
    }

    // ---------------- Pointer -----------------

    /// Starts a pan (middle button, or primary with no tool) or a stroke
    /// (draw / erase tools). Returns true when a gesture started.
    pub fn pointer_down(&mut self, screen: ScreenPoint, button: PointerButton, rect: ScreenRect) -> bool {
        if rect.is_empty() {
            return false;
        }
        let pan_eligible = button == PointerButton::Middle
            || (button == PointerButton::Primary && self.tool == Tool::Idle);
        if pan_eligible {
            self.gesture = Gesture::Panning {
                anchor: ScreenPoint::new(
                    screen.x - self.viewport.pan_x,
                    screen.y - self.viewport.pan_y,
                ),
            };
            return true;
        }
        if button != PointerButton::Primary {
            return false;
        }
        match self.tool {
            Tool::Draw { .. } | Tool::Erase { .. } => {
                let p = self.viewport.to_normalized(screen, rect);
                self.gesture = Gesture::Stroking { points: vec![p] };
                true
            }
            _ => false,
        }
    }

    pub fn pointer_move(&mut self, screen: ScreenPoint, rect: ScreenRect) -> MoveEffect {
        let ink = match &self.tool {
            Tool::Draw { color, width } => Some(Ink::Color {
                color: color.clone(),
                width: *width,
            }),
            Tool::Erase { width } => Some(Ink::Erase { width: *width }),
            _ => None,
        };
        match &mut self.gesture {
            Gesture::None => MoveEffect::None,
            Gesture::Panning { anchor } => {
                let (x, y) = (screen.x - anchor.x, screen.y - anchor.y);
                self.viewport.set_pan(x, y);
                MoveEffect::Panned
            }
            Gesture::Stroking { points } => {
                let (Some(ink), false) = (ink, rect.is_empty()) else {
                    return MoveEffect::None;
                };
                let to = self.viewport.to_normalized(screen, rect);
                let Some(&from) = points.last() else {
                    points.push(to);
                    return MoveEffect::None;
                };
                points.push(to);
                MoveEffect::Segment(StrokeSegment { from, to, ink })
            }
        }
    }

    /// Ends the active gesture. A drawing stroke is committed with the id
    /// produced by `next_id`; an erase stroke removes every stroke it touches.
    pub fn pointer_up(&mut self, next_id: impl FnOnce() -> String) -> ReleaseEffect {
        match std::mem::replace(&mut self.gesture, Gesture::None) {
            Gesture::None => ReleaseEffect::None,
            Gesture::Panning { .. } => ReleaseEffect::PanEnded,
            Gesture::Stroking { points } => {
                if points.len() < 2 {
                    return ReleaseEffect::StrokeDiscarded;
                }
                match &self.tool {
                    Tool::Draw { color, width } => {
                        let id = next_id();
                        self.strokes.push(Stroke {
                            id: id.clone(),
                            points,
                            color: color.clone(),
                            width: *width,
                        });
                        ReleaseEffect::StrokeAdded { id }
                    }
                    Tool::Erase { width } => {
                        let before = self.strokes.len();
                        let width = *width;
                        self.strokes
                            .retain(|s| !strokes_touch(&s.points, &points, width));
                        ReleaseEffect::Erased {
                            removed: before - self.strokes.len(),
                        }
                    }
                    _ => ReleaseEffect::StrokeDiscarded,
                }
            }
        }
    }

    /// Click on the bare map: places one marker of the selected kind, then
    /// drops back to the idle tool.
    pub fn map_click(&mut self, screen: ScreenPoint, rect: ScreenRect, next_id: impl FnOnce() -> String) -> Option<String> {
        let Tool::PlaceMarker(kind) = self.tool else {
            return None;
        };
        if self.gesture != Gesture::None || rect.is_empty() {
            return None;
        }
        let p = self.viewport.to_normalized(screen, rect);
        let id = next_id();
        self.markers.push(Marker {
            id: id.clone(),
            x: p.x,
            y: p.y,
            kind,
            note: String::new(),
        });
        self.tool = Tool::Idle;
        Some(id)
    }

    // ---------------- View -----------------

    pub fn wheel(&mut self, delta_y: f64) -> bool {
        self.viewport.wheel(delta_y)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_out()
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn pan_step(&mut self, dir: PanDirection) {
        self.viewport.pan_step(dir);
    }

    pub fn marker_size_px(&self) -> f64 {
        marker_size_px(self.viewport.zoom)
    }

    // ---------------- Direct mutations -----------------

    pub fn editing_marker(&self) -> Option<&Marker> {
        let id = self.editing.as_deref()?;
        self.markers.iter().find(|m| m.id == id)
    }

    /// Opens the note editor; returns the current note to seed the text box.
    pub fn open_note_editor(&mut self, id: &str) -> Option<String> {
        let note = self.markers.iter().find(|m| m.id == id)?.note.clone();
        self.editing = Some(id.to_string());
        Some(note)
    }

    pub fn close_note_editor(&mut self) {
        self.editing = None;
    }

    /// Saves a note and closes the editor if it was open for this marker.
    pub fn edit_marker_note(&mut self, id: &str, text: &str) -> bool {
        let Some(m) = self.markers.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        m.note = text.to_string();
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        true
    }

    pub fn delete_marker(&mut self, id: &str) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| m.id != id);
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        self.markers.len() != before
    }

    pub fn delete_path(&mut self, id: &str) -> bool {
        let before = self.strokes.len();
        self.strokes.retain(|s| s.id != id);
        self.strokes.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: ScreenRect = ScreenRect {
        left: 0.0,
        top: 0.0,
        width: 1000.0,
        height: 500.0,
    };

    fn pt(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint::new(x, y)
    }

    fn ids() -> impl FnMut() -> String {
        let mut n = 0;
        move || {
            n += 1;
            format!("path-{n}")
        }
    }

    fn draw(surface: &mut AnnotationSurface, pts: &[(f64, f64)], next: &mut impl FnMut() -> String) -> ReleaseEffect {
        let (first, rest) = pts.split_first().unwrap();
        surface.pointer_down(pt(first.0, first.1), PointerButton::Primary, RECT);
        for &(x, y) in rest {
            surface.pointer_move(pt(x, y), RECT);
        }
        surface.pointer_up(|| next())
    }

    fn with_pen() -> AnnotationSurface {
        let mut s = AnnotationSurface::default();
        s.toggle_tool(ToolKind::Pen);
        s
    }

    #[test]
    fn tap_without_move_persists_nothing() {
        let mut s = with_pen();
        assert!(s.pointer_down(pt(100.0, 100.0), PointerButton::Primary, RECT));
        assert_eq!(s.pointer_up(|| "path-1".into()), ReleaseEffect::StrokeDiscarded);
        assert!(s.strokes().is_empty());
    }

    #[test]
    fn stroke_is_stored_in_normalized_space() {
        let mut s = with_pen();
        s.viewport.zoom = 2.0;
        s.viewport.set_pan(100.0, 0.0);
        let mut next = ids();
        let fx = draw(&mut s, &[(100.0, 0.0), (300.0, 200.0)], &mut next);
        assert_eq!(fx, ReleaseEffect::StrokeAdded { id: "path-1".into() });
        let stroke = &s.strokes()[0];
        assert_eq!(stroke.points[0], NormPoint { x: 0.0, y: 0.0 });
        assert_eq!(stroke.points[1], NormPoint { x: 10.0, y: 20.0 });
        assert_eq!(stroke.color, DEFAULT_PEN_COLOR);
        assert_eq!(stroke.width, DEFAULT_PEN_WIDTH);
    }

    #[test]
    fn moving_while_stroking_yields_segments() {
        let mut s = with_pen();
        s.pointer_down(pt(0.0, 0.0), PointerButton::Primary, RECT);
        match s.pointer_move(pt(100.0, 50.0), RECT) {
            MoveEffect::Segment(seg) => {
                assert_eq!(seg.from, NormPoint { x: 0.0, y: 0.0 });
                assert_eq!(seg.to, NormPoint { x: 10.0, y: 10.0 });
                assert!(matches!(seg.ink, Ink::Color { .. }));
            }
            other => panic!("expected segment, got {other:?}"),
        }
    }

    #[test]
    fn erase_far_away_leaves_strokes_alone() {
        let mut s = with_pen();
        let mut next = ids();
        draw(&mut s, &[(100.0, 100.0), (200.0, 100.0), (300.0, 100.0)], &mut next);
        s.toggle_tool(ToolKind::Eraser);
        let fx = draw(&mut s, &[(100.0, 400.0), (300.0, 400.0)], &mut next);
        assert_eq!(fx, ReleaseEffect::Erased { removed: 0 });
        assert!(fx.needs_repaint());
        assert!(!fx.paths_changed());
        assert_eq!(s.strokes().len(), 1);
    }

    #[test]
    fn erase_over_a_point_removes_the_whole_stroke() {
        let mut s = with_pen();
        let mut next = ids();
        draw(&mut s, &[(100.0, 100.0), (200.0, 100.0), (300.0, 100.0)], &mut next);
        draw(&mut s, &[(100.0, 450.0), (900.0, 450.0)], &mut next);
        s.toggle_tool(ToolKind::Eraser);
        // vertical swipe through the middle sample of the first stroke only
        let fx = draw(&mut s, &[(200.0, 50.0), (200.0, 100.0), (200.0, 150.0)], &mut next);
        assert_eq!(fx, ReleaseEffect::Erased { removed: 1 });
        assert_eq!(s.strokes().len(), 1);
        assert_eq!(s.strokes()[0].id, "path-2");
    }

    #[test]
    fn erase_threshold_scales_with_eraser_width() {
        let a = [NormPoint { x: 10.0, y: 10.0 }, NormPoint { x: 20.0, y: 10.0 }];
        let b = [NormPoint { x: 10.0, y: 13.0 }, NormPoint { x: 10.0, y: 30.0 }];
        assert!(!strokes_touch(&a, &b, 10.0));
        assert!(strokes_touch(&a, &b, 20.0));
    }

    #[test]
    fn idle_primary_press_pans() {
        let mut s = AnnotationSurface::default();
        assert!(s.pointer_down(pt(50.0, 50.0), PointerButton::Primary, RECT));
        assert!(s.is_panning());
        assert_eq!(s.pointer_move(pt(80.0, 20.0), RECT), MoveEffect::Panned);
        assert_eq!((s.viewport.pan_x, s.viewport.pan_y), (30.0, -30.0));
        assert_eq!(s.pointer_up(String::new), ReleaseEffect::PanEnded);
        assert!(s.strokes().is_empty());
    }

    #[test]
    fn middle_button_pans_even_with_pen() {
        let mut s = with_pen();
        s.viewport.set_pan(10.0, 10.0);
        assert!(s.pointer_down(pt(0.0, 0.0), PointerButton::Middle, RECT));
        assert!(s.is_panning());
        s.pointer_move(pt(5.0, 5.0), RECT);
        assert_eq!((s.viewport.pan_x, s.viewport.pan_y), (15.0, 15.0));
    }

    #[test]
    fn switching_tool_cancels_stroke() {
        let mut s = with_pen();
        s.pointer_down(pt(0.0, 0.0), PointerButton::Primary, RECT);
        s.pointer_move(pt(100.0, 100.0), RECT);
        s.toggle_tool(ToolKind::Eraser);
        assert_eq!(s.gesture, Gesture::None);
        assert_eq!(s.pointer_up(String::new), ReleaseEffect::None);
        assert!(s.strokes().is_empty());
    }

    #[test]
    fn marker_click_places_once_then_goes_idle() {
        let mut s = AnnotationSurface::default();
        s.toggle_tool(ToolKind::Marker(MarkerKind::Anomaly));
        assert!(!s.pointer_down(pt(500.0, 250.0), PointerButton::Primary, RECT));
        let id = s.map_click(pt(500.0, 250.0), RECT, || "marker-1".into());
        assert_eq!(id.as_deref(), Some("marker-1"));
        let m = &s.markers()[0];
        assert_eq!((m.x, m.y, m.kind), (50.0, 50.0, MarkerKind::Anomaly));
        assert_eq!(s.tool, Tool::Idle);
        assert_eq!(s.map_click(pt(10.0, 10.0), RECT, || "marker-2".into()), None);
        assert_eq!(s.markers().len(), 1);
    }

    #[test]
    fn click_with_pen_places_nothing() {
        let mut s = with_pen();
        assert_eq!(s.map_click(pt(1.0, 1.0), RECT, || "marker-1".into()), None);
    }

    #[test]
    fn toggling_active_tool_deselects() {
        let mut s = AnnotationSurface::default();
        s.toggle_tool(ToolKind::Marker(MarkerKind::Base));
        s.toggle_tool(ToolKind::Marker(MarkerKind::Base));
        assert_eq!(s.tool, Tool::Idle);
    }

    #[test]
    fn pen_settings_follow_into_active_tool() {
        let mut s = with_pen();
        s.set_pen_color("#00ff00");
        s.set_pen_width(42.0);
        assert_eq!(
            s.tool,
            Tool::Draw {
                color: "#00ff00".into(),
                width: PEN_WIDTH_RANGE.1
            }
        );
    }

    #[test]
    fn deleting_edited_marker_closes_editor() {
        let mut s = AnnotationSurface::default();
        s.toggle_tool(ToolKind::Marker(MarkerKind::Target));
        s.map_click(pt(10.0, 10.0), RECT, || "marker-1".into());
        assert_eq!(s.open_note_editor("marker-1").as_deref(), Some(""));
        assert!(s.editing_marker().is_some());
        assert!(s.delete_marker("marker-1"));
        assert!(s.editing_marker().is_none());
        assert!(!s.delete_marker("marker-1"));
    }

    #[test]
    fn note_edit_saves_and_closes() {
        let mut s = AnnotationSurface::default();
        s.toggle_tool(ToolKind::Marker(MarkerKind::Base));
        s.map_click(pt(10.0, 10.0), RECT, || "marker-1".into());
        s.open_note_editor("marker-1");
        assert!(s.edit_marker_note("marker-1", "stash under the bridge"));
        assert_eq!(s.markers()[0].note, "stash under the bridge");
        assert!(s.editing_marker().is_none());
        assert!(!s.edit_marker_note("missing", "x"));
    }

    #[test]
    fn delete_path_by_id() {
        let mut s = with_pen();
        let mut next = ids();
        draw(&mut s, &[(0.0, 0.0), (10.0, 10.0)], &mut next);
        assert!(!s.delete_path("path-9"));
        assert!(s.delete_path("path-1"));
        assert!(s.strokes().is_empty());
    }

    #[test]
    fn load_drops_single_point_strokes() {
        let strokes = vec![
            Stroke {
                id: "a".into(),
                points: vec![NormPoint { x: 1.0, y: 1.0 }],
                color: "#fff".into(),
                width: 2.0,
            },
            Stroke {
                id: "b".into(),
                points: vec![NormPoint { x: 1.0, y: 1.0 }, NormPoint { x: 2.0, y: 2.0 }],
                color: "#fff".into(),
                width: 2.0,
            },
        ];
        let s = AnnotationSurface::new(Vec::new(), strokes);
        assert_eq!(s.strokes().len(), 1);
        assert_eq!(s.strokes()[0].id, "b");
    }

    #[test]
    fn marker_size_never_below_minimum() {
        assert_eq!(marker_size_px(0.5), 80.0);
        assert_eq!(marker_size_px(1.0), 40.0);
        assert_eq!(marker_size_px(5.0), MARKER_MIN_PX);
        assert_eq!(marker_icon_scale(5.0), 0.8);
        assert_eq!(marker_icon_scale(0.5), 1.0);
    }

    #[test]
    fn empty_rect_is_ignored() {
        let mut s = with_pen();
        assert!(!s.pointer_down(pt(1.0, 1.0), PointerButton::Primary, ScreenRect::default()));
    }
}
