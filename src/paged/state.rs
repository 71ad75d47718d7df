use std::collections::HashSet;

use crate::error::SyncError;
use crate::model::{Cursor, Identified, Page};

/// Published snapshot of a paginated list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    /// Server order, unique ids.
    pub items: Vec<T>,
    pub cursor: Option<Cursor>,
    /// Exactly `cursor.is_some()` after the last successful fetch.
    pub has_more: bool,
    pub is_loading: bool,
    pub last_error: Option<SyncError>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            has_more: false,
            is_loading: false,
            last_error: None,
        }
    }
}

impl<T: Identified> ListState<T> {
    pub fn error_message(&self) -> Option<String> {
        self.last_error.as_ref().and_then(SyncError::display_message)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether `anchor_id` sits inside the last `window` items.
    pub fn trigger_armed(&self, anchor_id: &str, window: usize) -> bool {
        let threshold = self.items.len().saturating_sub(window.max(1));
        self.position(anchor_id)
            .map_or(false, |index| index >= threshold)
    }

    /// Replace the list with a first page. Returns the number of items kept.
    pub(crate) fn replace_page(&mut self, page: Page<T>) -> usize {
        self.items.clear();
        self.set_cursor(page.next_cursor);
        self.extend_unique(page.items)
    }

    /// Append a following page, dropping ids already present.
    pub(crate) fn append_page(&mut self, page: Page<T>) -> usize {
        self.set_cursor(page.next_cursor);
        self.extend_unique(page.items)
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    fn set_cursor(&mut self, cursor: Option<Cursor>) {
        self.has_more = cursor.is_some();
        self.cursor = cursor;
    }

    fn extend_unique(&mut self, incoming: Vec<T>) -> usize {
        let mut seen: HashSet<String> = self.items.iter().map(|item| item.id().to_string()).collect();
        let before = self.items.len();
        for item in incoming {
            if seen.insert(item.id().to_string()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }
}
