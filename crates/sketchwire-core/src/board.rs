//! Board document: a named, arrival-ordered element sequence.

use crate::element::{Element, ElementId};
use serde::{Deserialize, Serialize};

/// A board holds the elements that make up its visible state, in the order
/// they were created or received. The raster is always "apply all elements in
/// arrival order"; no element carries a logical clock.
///
/// This struct is also the persisted document shape of the CRUD API
/// (`{id, name, elements}`) and what the snapshot event reproduces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub elements: Vec<Element>,
}

impl Board {
    /// Create an empty board.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            elements: Vec::new(),
        }
    }

    /// Append an element. Appending an id already present is a no-op: the
    /// transport is at-least-once, and ids must stay unique in the sequence.
    /// Returns true if the element was added.
    pub fn push(&mut self, element: Element) -> bool {
        if self.contains(element.id()) {
            log::debug!("board {}: dropping duplicate element {}", self.id, element.id());
            return false;
        }
        self.elements.push(element);
        true
    }

    /// Remove an element by id, preserving the order of the rest.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id() == id)?;
        Some(self.elements.remove(index))
    }

    /// Replace the whole sequence with a snapshot. Always a wholesale
    /// replace, never a merge, so re-applying the same snapshot is idempotent.
    pub fn replace_all(&mut self, elements: Vec<Element>) {
        self.elements = elements;
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.iter().any(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
