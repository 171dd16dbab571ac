use crate::edition::{Edition, EditionError};
use chrono::Utc;
use dorsal_shared::models::events::EditionActivatedEvent;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory edition roster enforcing the at-most-one-active invariant.
///
/// Activation is a single deactivate-all-then-activate-one pass instead of
/// ad hoc flag toggling, so the invariant holds after any call sequence.
pub struct EditionRegistry {
    editions: HashMap<Uuid, Edition>,
}

impl EditionRegistry {
    pub fn new() -> Self {
        Self {
            editions: HashMap::new(),
        }
    }

    /// Insert or replace an edition. New editions come in inactive; use
    /// `activate` to open one.
    pub fn upsert(&mut self, mut edition: Edition) {
        edition.is_active = false;
        self.editions.insert(edition.id, edition);
    }

    pub fn get(&self, id: &Uuid) -> Option<&Edition> {
        self.editions.get(id)
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut Edition> {
        self.editions.get_mut(id)
    }

    /// The one edition currently accepting registrations, if any
    pub fn find_active(&self) -> Option<&Edition> {
        self.editions.values().find(|e| e.is_active)
    }

    /// Make `id` the single active edition
    pub fn activate(&mut self, id: &Uuid) -> Result<EditionActivatedEvent, EditionError> {
        if !self.editions.contains_key(id) {
            return Err(EditionError::NotFound(id.to_string()));
        }

        for edition in self.editions.values_mut() {
            edition.is_active = edition.id == *id;
        }

        let edition = &self.editions[id];
        tracing::info!(year = edition.year, "edition activated");
        Ok(EditionActivatedEvent {
            edition_id: edition.id,
            year: edition.year,
            activated_at: Utc::now().timestamp(),
        })
    }

    /// Close registrations entirely
    pub fn deactivate_all(&mut self) {
        for edition in self.editions.values_mut() {
            edition.is_active = false;
        }
    }

    pub fn len(&self) -> usize {
        self.editions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editions.is_empty()
    }
}

impl Default for EditionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
