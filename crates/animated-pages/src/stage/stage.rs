//! Stage - ordered children and visibility of the page host

use tracing::warn;

use super::{Element, Size};

/// The host element pages are inserted into
///
/// Children are kept in document order. The stage is considered visible when
/// it is displayed and its box is not collapsed; an invisible stage makes the
/// switcher skip segues entirely.
#[derive(Debug)]
pub struct Stage {
    /// Children in document order
    children: Vec<Element>,
    /// Layout size of the host box
    size: Size,
    /// `false` if the host or one of its ancestors is not displayed
    displayed: bool,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl Stage {
    /// Create a new, displayed stage
    pub fn new(size: Size) -> Self {
        Self {
            children: Vec::new(),
            size,
            displayed: true,
        }
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Resize the host box
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    #[inline]
    pub fn is_displayed(&self) -> bool {
        self.displayed
    }

    pub fn set_displayed(&mut self, displayed: bool) {
        self.displayed = displayed;
    }

    /// Whether anything on the stage can currently be seen
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.displayed && !self.size.is_collapsed()
    }

    /// Children in document order
    #[inline]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Children without the `hidden` flag
    pub fn visible_children(&self) -> Vec<Element> {
        self.children.iter().filter(|c| !c.is_hidden()).cloned().collect()
    }

    /// Position of an element among the children
    pub fn index_of(&self, element: &Element) -> Option<usize> {
        self.children.iter().position(|c| c.ptr_eq(element))
    }

    #[inline]
    pub fn contains(&self, element: &Element) -> bool {
        self.index_of(element).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Insert `element` before `reference`, or append when `reference` is `None`
    ///
    /// An element that already is a child is moved. A reference that is not a
    /// child of the stage degrades to an append.
    pub fn insert_before(&mut self, element: &Element, reference: Option<&Element>) {
        if let Some(index) = self.index_of(element) {
            self.children.remove(index);
        }

        let index = match reference {
            Some(reference) if reference.ptr_eq(element) => None,
            Some(reference) => {
                let index = self.index_of(reference);
                if index.is_none() {
                    warn!(
                        reference = %reference.id(),
                        "reference element is not a child of the stage, appending"
                    );
                }
                index
            }
            None => None,
        };

        match index {
            Some(index) => self.children.insert(index, element.clone()),
            None => self.children.push(element.clone()),
        }
    }

    /// Remove a child, returns `false` if it was not attached
    pub fn remove(&mut self, element: &Element) -> bool {
        match self.index_of(element) {
            Some(index) => {
                self.children.remove(index);
                true
            }
            None => false,
        }
    }
}
