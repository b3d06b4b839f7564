//! The fetched list of other users.
//!
//! A failed refresh keeps whatever list was last fetched; a stale directory
//! is more useful than an empty one. Contrast with the conversation cache,
//! which discards on failure.

use crate::api::DirectoryEntry;

#[derive(Debug, Clone, Default)]
pub struct DirectoryState {
    pub entries: Vec<DirectoryEntry>,
    pub loading: bool,
}

impl DirectoryState {
    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    pub fn loaded(&mut self, entries: Vec<DirectoryEntry>) {
        self.loading = false;
        self.entries = entries;
    }

    /// Entries are deliberately left untouched.
    pub fn load_failed(&mut self) {
        self.loading = false;
    }

    pub fn clear(&mut self) {
        self.loading = false;
        self.entries.clear();
    }

    /// Look a peer up by username or id, for front ends that accept either.
    pub fn find(&self, key: &str) -> Option<&DirectoryEntry> {
        self.entries
            .iter()
            .find(|entry| entry.username == key || entry.id == key)
    }
}
