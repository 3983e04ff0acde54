#![forbid(unsafe_code)]

//! Example items and the view model that publishes them.

use std::cell::Cell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use slist_core::{ListItem, SnapshotError};
use slist_runtime::{Observable, publish};

use crate::palette::SystemColor;

/// One colored entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleData {
    pub id: u64,
    pub color: SystemColor,
}

impl ListItem for ExampleData {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

/// Owns the example item sequence and publishes every change.
///
/// Cloning yields another handle to the same data.
#[derive(Debug, Clone)]
pub struct ExampleViewModel {
    subject: Observable<Vec<ExampleData>>,
    next_id: Rc<Cell<u64>>,
}

impl Default for ExampleViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ExampleViewModel {
    /// Start with one entry per palette color.
    #[must_use]
    pub fn new() -> Self {
        Self::with_colors(SystemColor::NAMED)
    }

    #[must_use]
    pub fn with_colors(colors: impl IntoIterator<Item = SystemColor>) -> Self {
        let next_id = Rc::new(Cell::new(1));
        let data = colors
            .into_iter()
            .map(|color| ExampleData {
                id: allocate(&next_id),
                color,
            })
            .collect();
        Self {
            subject: Observable::new(data),
            next_id,
        }
    }

    /// Channel the list binds to.
    #[must_use]
    pub fn subject(&self) -> &Observable<Vec<ExampleData>> {
        &self.subject
    }

    /// Current entries.
    #[must_use]
    pub fn data(&self) -> Vec<ExampleData> {
        self.subject.get().unwrap_or_default()
    }

    /// Drop the entry with `id`. Returns whether one was removed.
    pub fn remove_item(&self, id: u64) -> bool {
        let mut data = self.data();
        let before = data.len();
        data.retain(|entry| entry.id != id);
        if data.len() == before {
            tracing::debug!(id, "remove requested for unknown entry");
            return false;
        }
        self.subject.set(data);
        true
    }

    /// Append a new entry and return its id.
    pub fn append(&self, color: SystemColor) -> u64 {
        let id = allocate(&self.next_id);
        self.subject.modify(|data| data.push(ExampleData { id, color }));
        id
    }

    /// Change the color of the entry with `id`.
    pub fn recolor(&self, id: u64, color: SystemColor) -> bool {
        let mut data = self.data();
        let Some(entry) = data.iter_mut().find(|entry| entry.id == id) else {
            return false;
        };
        entry.color = color;
        self.subject.set(data);
        true
    }

    /// Reorder entries with a seeded shuffle.
    pub fn shuffle(&self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.subject.modify(|data| data.shuffle(&mut rng));
    }

    /// Publish `data` as given.
    ///
    /// # Errors
    ///
    /// Rejects sequences with a repeated id without publishing.
    pub fn replace(&self, data: Vec<ExampleData>) -> Result<(), SnapshotError> {
        let max = data.iter().map(|entry| entry.id).max();
        publish(&self.subject, data)?;
        if let Some(max) = max {
            if max >= self.next_id.get() {
                self.next_id.set(max.saturating_add(1));
            }
        }
        Ok(())
    }
}

fn allocate(next_id: &Cell<u64>) -> u64 {
    let id = next_id.get();
    next_id.set(id + 1);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_seven_palette_entries() {
        let model = ExampleViewModel::new();
        let data = model.data();
        assert_eq!(data.len(), 7);
        assert_eq!(data[0].color, SystemColor::Red);
        assert_eq!(data[6].color, SystemColor::Pink);
        let ids: Vec<u64> = data.iter().map(|e| e.id).collect();
        assert_eq!(ids, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn remove_publishes_only_on_change() {
        let model = ExampleViewModel::new();
        let version = model.subject().version();
        assert!(model.remove_item(3));
        assert_eq!(model.subject().version(), version + 1);
        assert!(!model.remove_item(3));
        assert_eq!(model.subject().version(), version + 1);
        assert!(model.data().iter().all(|e| e.id != 3));
    }

    #[test]
    fn shuffle_is_a_seeded_permutation() {
        let a = ExampleViewModel::new();
        let b = ExampleViewModel::new();
        a.shuffle(42);
        b.shuffle(42);
        assert_eq!(a.data(), b.data());

        let mut ids: Vec<u64> = a.data().iter().map(|e| e.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn append_allocates_fresh_ids_after_replace() {
        let model = ExampleViewModel::with_colors([]);
        model
            .replace(vec![ExampleData {
                id: 40,
                color: SystemColor::Blue,
            }])
            .unwrap();
        assert_eq!(model.append(SystemColor::Red), 41);
    }

    #[test]
    fn replace_rejects_duplicate_ids() {
        let model = ExampleViewModel::new();
        let entry = ExampleData {
            id: 1,
            color: SystemColor::Red,
        };
        assert!(model.replace(vec![entry.clone(), entry]).is_err());
        assert_eq!(model.data().len(), 7);
    }

    #[test]
    fn rejected_replace_keeps_id_allocation() {
        let model = ExampleViewModel::new();
        let entry = ExampleData {
            id: 90,
            color: SystemColor::Red,
        };
        assert!(model.replace(vec![entry.clone(), entry]).is_err());
        assert_eq!(model.append(SystemColor::Blue), 8);
    }

    #[test]
    fn replace_with_max_id_does_not_overflow() {
        let model = ExampleViewModel::with_colors([]);
        model
            .replace(vec![ExampleData {
                id: u64::MAX,
                color: SystemColor::Pink,
            }])
            .unwrap();
        assert_eq!(model.data()[0].id, u64::MAX);
    }

    #[test]
    fn recolor_changes_content_not_identity() {
        let model = ExampleViewModel::new();
        assert!(model.recolor(2, SystemColor::Other { r: 0, g: 0, b: 0 }));
        assert_eq!(model.data()[1].id, 2);
        assert_eq!(model.data()[1].color.name(), "");
        assert!(!model.recolor(99, SystemColor::Red));
    }
}
