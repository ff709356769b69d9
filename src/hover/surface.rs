//! The host UI surface the detector reads from.
//!
//! In a browser this is `document.elementFromPoint` plus node inspection; here
//! it is a trait so the detector can run against any element tree. `Scene` is
//! an in-memory tree used by tests and headless embedders.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::types::{ElementId, Point, Rect};

/// Read-only view of the element tree under the pointer.
///
/// Every method may come back empty (pointer outside the viewport, node
/// detached, API unavailable); the detector treats that as "nothing hovered".
pub trait HoverSurface {
    /// Topmost element at the viewport coordinate.
    fn element_at(&self, point: Point) -> Option<ElementId>;

    /// Concatenated text of the element's direct text-node children.
    fn direct_text(&self, element: ElementId) -> String;

    /// Current bounding box of the element.
    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;
}

impl<S: HoverSurface + ?Sized> HoverSurface for &S {
    fn element_at(&self, point: Point) -> Option<ElementId> {
        (**self).element_at(point)
    }

    fn direct_text(&self, element: ElementId) -> String {
        (**self).direct_text(element)
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        (**self).bounding_rect(element)
    }
}

impl<S: HoverSurface + ?Sized> HoverSurface for Arc<S> {
    fn element_at(&self, point: Point) -> Option<ElementId> {
        (**self).element_at(point)
    }

    fn direct_text(&self, element: ElementId) -> String {
        (**self).direct_text(element)
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        (**self).bounding_rect(element)
    }
}

/// A child of an element: either a text node or a nested element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Element(ElementId),
}

/// Join only the immediate text nodes; nested elements contribute nothing.
pub fn direct_text_of(children: &[Node]) -> String {
    children
        .iter()
        .filter_map(|node| match node {
            Node::Text(text) => Some(text.as_str()),
            Node::Element(_) => None,
        })
        .collect()
}

/// Host without element-at-point support. Detection stays permanently empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl HoverSurface for NullSurface {
    fn element_at(&self, _point: Point) -> Option<ElementId> {
        None
    }

    fn direct_text(&self, _element: ElementId) -> String {
        String::new()
    }

    fn bounding_rect(&self, _element: ElementId) -> Option<Rect> {
        None
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct SceneElement {
    rect: Rect,
    children: Vec<Node>,
    /// Insertion order; later elements paint on top.
    z: usize,
}

#[derive(Debug, Default)]
struct SceneInner {
    elements: BTreeMap<ElementId, SceneElement>,
    next_z: usize,
}

/// In-memory element tree with hit testing.
///
/// Interior mutability lets a test scroll or restyle the page while a hover
/// session holds the scene behind an `Arc`.
#[derive(Debug, Default)]
pub struct Scene {
    inner: RwLock<SceneInner>,
    resolutions: AtomicUsize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an element. Later inserts are hit first.
    pub fn insert(&self, id: ElementId, rect: Rect, children: Vec<Node>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let z = inner.next_z;
        inner.next_z += 1;
        inner.elements.insert(id, SceneElement { rect, children, z });
    }

    /// Convenience for a leaf element holding a single text node.
    pub fn insert_text(&self, id: ElementId, rect: Rect, text: &str) {
        self.insert(id, rect, vec![Node::Text(text.to_string())]);
    }

    pub fn remove(&self, id: ElementId) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.elements.remove(&id);
    }

    /// Shift every element, as a page scroll does to viewport coordinates.
    pub fn scroll_by(&self, dx: f64, dy: f64) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for element in inner.elements.values_mut() {
            element.rect = element.rect.translate(dx, dy);
        }
    }

    /// Move a single element.
    pub fn set_rect(&self, id: ElementId, rect: Rect) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(element) = inner.elements.get_mut(&id) {
            element.rect = rect;
        }
    }

    /// Number of `element_at` calls served so far.
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }
}

impl HoverSurface for Scene {
    fn element_at(&self, point: Point) -> Option<ElementId> {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .elements
            .iter()
            .filter(|(_, element)| element.rect.contains(point))
            .max_by_key(|(_, element)| element.z)
            .map(|(id, _)| *id)
    }

    fn direct_text(&self, element: ElementId) -> String {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .elements
            .get(&element)
            .map(|e| direct_text_of(&e.children))
            .unwrap_or_default()
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.elements.get(&element).map(|e| e.rect)
    }
}
