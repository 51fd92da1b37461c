//! Ordered queue of task ids receiving focus timer credit.
//!
//! The head of the queue is the "current" task. Operations never duplicate
//! an id, and reordering can only permute membership, never change it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveTaskQueue {
    ids: Vec<String>,
}

impl ActiveTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|x| x == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Append `id` unless already queued. An empty queue makes it current.
    pub fn add(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// Drop `id`; the next id (if any) becomes current when it was the head.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|x| x != id);
        self.ids.len() != before
    }

    /// Reorder to follow `order`.
    ///
    /// Ids in `order` that are not queued are ignored, duplicates count once,
    /// and queued ids missing from `order` keep their relative order at the end.
    pub fn reorder<S: AsRef<str>>(&mut self, order: &[S]) {
        let mut next: Vec<String> = Vec::with_capacity(self.ids.len());
        for id in order {
            let id = id.as_ref();
            if self.contains(id) && !next.iter().any(|x| x == id) {
                next.push(id.to_string());
            }
        }
        for id in &self.ids {
            if !next.contains(id) {
                next.push(id.clone());
            }
        }
        self.ids = next;
    }
}
