//! Elements - the rendered root nodes of pages

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path;

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique element identifier
///
/// Every stamped element gets a fresh id, so two elements with the same id
/// are the same instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Visual properties a segue may animate
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Opacity (0.0 = transparent, 1.0 = opaque)
    pub opacity: f32,
    /// Translation in pixels (x, y, z)
    pub translate: [f32; 3],
    /// Stacking order (higher = on top)
    pub z_index: i32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            translate: [0.0; 3],
            z_index: 0,
        }
    }
}

#[derive(Debug)]
struct ElementData {
    id: ElementId,
    tag: String,
    text: String,
    hidden: bool,
    properties: Map<String, Value>,
    classes: BTreeSet<String>,
    animated: Option<Style>,
}

/// Shared handle to an element
///
/// Cloning the handle does not clone the element; equality is identity.
#[derive(Clone)]
pub struct Element {
    inner: Rc<RefCell<ElementData>>,
}

impl Element {
    /// Create a new, visible element
    pub fn new(tag: impl Into<String>) -> Self {
        let id = ElementId(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            inner: Rc::new(RefCell::new(ElementData {
                id,
                tag: tag.into(),
                text: String::new(),
                hidden: false,
                properties: Map::new(),
                classes: BTreeSet::new(),
                animated: None,
            })),
        }
    }

    /// Builder-style text content
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    #[inline]
    pub fn id(&self) -> ElementId {
        self.inner.borrow().id
    }

    pub fn tag(&self) -> String {
        self.inner.borrow().tag.clone()
    }

    pub fn text(&self) -> String {
        self.inner.borrow().text.clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.inner.borrow_mut().text = text.into();
    }

    /// Whether the element carries the `hidden` flag
    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.inner.borrow().hidden
    }

    #[inline]
    pub fn set_hidden(&self, hidden: bool) {
        self.inner.borrow_mut().hidden = hidden;
    }

    /// Read a bound property by dotted path
    pub fn property(&self, path: &str) -> Option<Value> {
        path::get(&self.inner.borrow().properties, path).cloned()
    }

    /// Write a bound property by dotted path
    pub fn set_property(&self, path: &str, value: Value) -> bool {
        path::set(&mut self.inner.borrow_mut().properties, path, value)
    }

    pub fn add_class(&self, class: &str) {
        self.inner.borrow_mut().classes.insert(class.to_string());
    }

    pub fn remove_class(&self, class: &str) {
        self.inner.borrow_mut().classes.remove(class);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.inner.borrow().classes.contains(class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.inner.borrow().classes.iter().cloned().collect()
    }

    /// Style written by a running animation, if any
    pub fn animated_style(&self) -> Option<Style> {
        self.inner.borrow().animated
    }

    pub fn set_animated_style(&self, style: Style) {
        self.inner.borrow_mut().animated = Some(style);
    }

    /// Drop the animation overlay, falling back to the resting style
    pub fn clear_animated_style(&self) {
        self.inner.borrow_mut().animated = None;
    }

    /// Effective style: the animation overlay or the resting default
    pub fn computed_style(&self) -> Style {
        self.animated_style().unwrap_or_default()
    }

    /// Identity comparison
    #[inline]
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("Element")
            .field("id", &data.id)
            .field("tag", &data.tag)
            .field("text", &data.text)
            .field("hidden", &data.hidden)
            .finish()
    }
}
