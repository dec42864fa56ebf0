//! Core data models for the desk.
//! Everything here is plain serializable data shared by the state machines,
//! the persistence layer and the components.

use serde::{Deserialize, Serialize};
use std::rc::Rc;
use yew::Reducible;

/// Position on the map surface as a 0..100 percentage of its width/height.
/// Independent of zoom and pan.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormPoint {
    pub x: f64,
    pub y: f64,
}

impl NormPoint {
    pub fn distance(self, other: NormPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Client-space pixel position of a pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned client-space rectangle (a `getBoundingClientRect` snapshot).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Degenerate rects (not laid out yet, hidden) cannot map coordinates.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    pub fn from_dom(rect: &web_sys::DomRect) -> Self {
        Self::new(rect.left(), rect.top(), rect.width(), rect.height())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Radiation,
    Mutant,
    Anomaly,
    Danger,
    Target,
    Base,
    Checkpoint,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 7] = [
        MarkerKind::Radiation,
        MarkerKind::Mutant,
        MarkerKind::Anomaly,
        MarkerKind::Danger,
        MarkerKind::Target,
        MarkerKind::Base,
        MarkerKind::Checkpoint,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MarkerKind::Radiation => "РАДИАЦИЯ",
            MarkerKind::Mutant => "МУТАНТЫ",
            MarkerKind::Anomaly => "АНОМАЛИИ",
            MarkerKind::Danger => "ОПАСНОСТЬ",
            MarkerKind::Target => "ЦЕЛЬ",
            MarkerKind::Base => "БАЗА",
            MarkerKind::Checkpoint => "ТОЧКА",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            MarkerKind::Radiation => "☢",
            MarkerKind::Mutant => "☠",
            MarkerKind::Anomaly => "⚡",
            MarkerKind::Danger => "⚠",
            MarkerKind::Target => "⌖",
            MarkerKind::Base => "⌂",
            MarkerKind::Checkpoint => "⚑",
        }
    }

    /// (background, border, foreground)
    pub fn colors(self) -> (&'static str, &'static str, &'static str) {
        match self {
            MarkerKind::Radiation => ("#eab308", "#ca8a04", "#713f12"),
            MarkerKind::Mutant => ("#ef4444", "#dc2626", "#ffffff"),
            MarkerKind::Anomaly => ("#a855f7", "#9333ea", "#ffffff"),
            MarkerKind::Danger => ("#f97316", "#ea580c", "#ffffff"),
            MarkerKind::Target => ("#3b82f6", "#2563eb", "#ffffff"),
            MarkerKind::Base => ("#22c55e", "#16a34a", "#ffffff"),
            MarkerKind::Checkpoint => ("#06b6d4", "#0891b2", "#ffffff"),
        }
    }
}

/// Typed point of interest pinned to the map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    #[serde(default)]
    pub note: String,
}

impl Marker {
    pub fn position(&self) -> NormPoint {
        NormPoint {
            x: self.x,
            y: self.y,
        }
    }
}

/// Persisted freehand line in normalized coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: String,
    pub points: Vec<NormPoint>,
    pub color: String,
    pub width: f64,
}

impl Stroke {
    /// Single taps never make it to storage or the canvas.
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }
}

/// A page in the document folder. The url is stored verbatim (external link or data URL).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub url: String,
}

// ---------------- Documents reducer -----------------
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Documents {
    pub items: Vec<Document>,
}

#[derive(Clone, Debug)]
pub enum DocumentAction {
    Load(Vec<Document>),
    Add { id: String, url: String },
    Remove { index: usize },
}

impl Reducible for Documents {
    type Action = DocumentAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        use DocumentAction::*;
        let mut new = (*self).clone();
        match action {
            Load(items) => {
                new.items = items;
            }
            Add { id, url } => {
                let url = url.trim().to_string();
                if url.is_empty() {
                    return self;
                }
                new.items.push(Document { id, url });
            }
            Remove { index } => {
                if index >= new.items.len() {
                    return self;
                }
                new.items.remove(index);
            }
        }
        Rc::new(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(urls: &[&str]) -> Rc<Documents> {
        Rc::new(Documents {
            items: urls
                .iter()
                .enumerate()
                .map(|(i, u)| Document {
                    id: format!("doc-{i}"),
                    url: u.to_string(),
                })
                .collect(),
        })
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let before = docs(&["a", "b"]);
        let after = before.clone().reduce(DocumentAction::Remove { index: 5 });
        assert!(Rc::ptr_eq(&before, &after));
    }

    #[test]
    fn add_trims_and_rejects_blank_urls() {
        let state = docs(&[]);
        let state = state.reduce(DocumentAction::Add {
            id: "doc-1".into(),
            url: "   ".into(),
        });
        assert!(state.items.is_empty());
        let state = state.reduce(DocumentAction::Add {
            id: "doc-2".into(),
            url: "  https://zone.example/page.png ".into(),
        });
        assert_eq!(state.items[0].url, "https://zone.example/page.png");
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let state = docs(&["a", "b", "c"]).reduce(DocumentAction::Remove { index: 1 });
        let urls: Vec<_> = state.items.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, ["a", "c"]);
    }

    #[test]
    fn marker_serializes_kind_as_type() {
        let m = Marker {
            id: "marker-1".into(),
            x: 10.0,
            y: 20.0,
            kind: MarkerKind::Checkpoint,
            note: String::new(),
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["type"], "checkpoint");
    }

    #[test]
    fn rect_containment_is_inclusive() {
        let r = ScreenRect::new(10.0, 10.0, 100.0, 50.0);
        assert!(r.contains(ScreenPoint::new(10.0, 60.0)));
        assert!(r.contains(ScreenPoint::new(110.0, 10.0)));
        assert!(!r.contains(ScreenPoint::new(110.1, 30.0)));
        assert!(ScreenRect::default().is_empty());
    }
}
