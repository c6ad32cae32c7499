use std::collections::HashSet;

use super::generate_id;

/// Unique sentence ids kept in the order they were selected.
///
/// The set answers membership; the vector holds the order. Both are only mutated together.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    members: HashSet<String>,
    order: Vec<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` at the end of the order. Returns false if it was already selected.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.members.contains(&id) {
            return false;
        }
        self.members.insert(id.clone());
        self.order.push(id);
        true
    }

    /// Returns false if `id` was not selected.
    pub fn remove(&mut self, id: &str) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.order.retain(|selected| selected != id);
        true
    }

    /// Select `id` if absent, deselect it otherwise. Returns whether it is now selected.
    pub fn toggle(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.members.contains(&id) {
            self.remove(&id);
            false
        } else {
            self.insert(id);
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Ids in selection order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl PartialEq for SelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    /// Replays insertions in iteration order; later duplicates are dropped.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = SelectionSet::new();
        for id in iter {
            selection.insert(id);
        }
        selection
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub id: String,
    /// The video this highlight cuts from
    pub video_id: String,
    pub name: String,
    pub selection: SelectionSet,
}

impl Highlight {
    pub fn new(video_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            video_id: video_id.into(),
            name: name.into(),
            selection: SelectionSet::new(),
        }
    }
}
