//! Shared types for XHunt.
//!
//! Geometry and element handles used by the hover detector and the panel,
//! plus the domain error enum surfaced by the tool server. Kept free of
//! subsystem imports so every module can depend on it.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A viewport coordinate reported by a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width/height pair (viewport or panel dimensions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Bounding box of a UI element in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Build a rect from its origin and size.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
            width,
            height,
        }
    }

    /// Whether the point lies inside the rect (right/bottom edges exclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    /// The same rect shifted by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.left + dx, self.top + dy, self.width, self.height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.0},{:.0} {:.0}x{:.0})",
            self.left, self.top, self.width, self.height
        )
    }
}

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

/// Opaque handle to a UI node owned by the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the pointer rested on when a debounced resolution fired.
///
/// `text` holds only the element's direct text nodes, trimmed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointerSample {
    pub element: Option<ElementId>,
    pub text: String,
    pub rect: Option<Rect>,
}

impl PointerSample {
    /// The "nothing hovered" sample.
    pub fn empty() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for XHunt.
#[derive(Debug, thiserror::Error)]
pub enum XHuntError {
    #[error("Analysis backend error: {0}")]
    Analysis(String),

    #[error("Chain RPC error ({method}): {message}")]
    Chain { method: String, message: String },

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_new_derives_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 30.0);
        assert_eq!(r.right, 110.0);
        assert_eq!(r.bottom, 50.0);
    }

    #[test]
    fn test_rect_contains_excludes_far_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(9.9, 9.9)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
        assert!(!r.contains(Point::new(5.0, -1.0)));
    }

    #[test]
    fn test_rect_translate() {
        let r = Rect::new(5.0, 5.0, 10.0, 10.0).translate(0.0, -100.0);
        assert_eq!(r.top, -95.0);
        assert_eq!(r.bottom, -85.0);
        assert_eq!(r.width, 10.0);
    }

    #[test]
    fn test_error_display() {
        let e = XHuntError::Chain {
            method: "getBalance".into(),
            message: "Invalid param".into(),
        };
        assert_eq!(e.to_string(), "Chain RPC error (getBalance): Invalid param");
        assert_eq!(
            XHuntError::UnknownTool("nope".into()).to_string(),
            "Unknown tool: nope"
        );
    }

    #[test]
    fn test_empty_sample() {
        let s = PointerSample::empty();
        assert!(s.element.is_none());
        assert!(s.text.is_empty());
        assert!(s.rect.is_none());
    }
}
