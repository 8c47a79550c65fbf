//! Session queue.
//!
//! Items run strictly in insertion order. At most one item is
//! [`ItemStatus::InProgress`] at any time; that item is the "current" one
//! whose repeats are credited when a session interval ends.

use tracing::{debug, info};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Pending,
    InProgress,
    Completed,
}

impl ItemStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
        }
    }
}

/// One queued unit of repeated work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionItem {
    name: String,
    secs_per_repeat: u32,
    total_repeats: u32,
    completed_repeats: u32,
    status: ItemStatus,
}

impl SessionItem {
    pub fn new(name: &str, total_repeats: u32, secs_per_repeat: u32) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if total_repeats == 0 {
            return Err(ValidationError::ZeroRepeats);
        }
        if secs_per_repeat == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        Ok(Self {
            name: name.into(),
            secs_per_repeat,
            total_repeats,
            completed_repeats: 0,
            status: ItemStatus::Pending,
        })
    }

    /// Rebuilds an item from stored progress.
    ///
    /// Progress is clamped to the repeat count and the status is made
    /// consistent with it: an exhausted item is always `Completed`, and a
    /// `Completed` item with repeats left becomes `Pending` again.
    pub fn restore(
        name: &str,
        total_repeats: u32,
        secs_per_repeat: u32,
        completed_repeats: u32,
        status: ItemStatus,
    ) -> Result<Self, ValidationError> {
        let mut item = Self::new(name, total_repeats, secs_per_repeat)?;
        item.completed_repeats = completed_repeats.min(total_repeats);
        item.status = if item.completed_repeats == total_repeats {
            ItemStatus::Completed
        } else if status == ItemStatus::Completed {
            ItemStatus::Pending
        } else {
            status
        };
        Ok(item)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn secs_per_repeat(&self) -> u32 {
        self.secs_per_repeat
    }

    pub fn total_repeats(&self) -> u32 {
        self.total_repeats
    }

    pub fn completed_repeats(&self) -> u32 {
        self.completed_repeats
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn is_exhausted(&self) -> bool {
        self.completed_repeats >= self.total_repeats
    }
}

/// Ordered collection of [`SessionItem`]s plus the completed-view flag.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionQueue {
    items: Vec<SessionItem>,
    show_completed: bool,
}

impl SessionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new pending item.
    pub fn add(
        &mut self,
        name: &str,
        total_repeats: u32,
        secs_per_repeat: u32,
    ) -> Result<&SessionItem, ValidationError> {
        let item = SessionItem::new(name, total_repeats, secs_per_repeat)?;
        info!(name = item.name(), total_repeats, secs_per_repeat, "queued session");
        self.items.push(item);
        Ok(&self.items[self.items.len() - 1])
    }

    /// Appends already-built items, e.g. from a loaded project.
    pub fn extend(&mut self, items: impl IntoIterator<Item = SessionItem>) -> usize {
        let before = self.items.len();
        self.items.extend(items);
        self.items.len() - before
    }

    /// Selects the next item to work on.
    ///
    /// The current item is put back to `Pending` first (it cannot be
    /// exhausted, that would have made it `Completed`), then the first
    /// pending item in insertion order is promoted. Returns the promoted item,
    /// or `None` when nothing is pending.
    pub fn advance_to_next(&mut self) -> Option<&SessionItem> {
        for item in self.items.iter_mut() {
            if item.status == ItemStatus::InProgress && !item.is_exhausted() {
                item.status = ItemStatus::Pending;
            }
        }

        let idx = self.items.iter().position(|i| i.status == ItemStatus::Pending);
        match idx {
            Some(idx) => {
                let item = &mut self.items[idx];
                item.status = ItemStatus::InProgress;
                debug!(name = item.name(), "session item now in progress");
                Some(&self.items[idx])
            }
            None => {
                debug!("no pending session item");
                None
            }
        }
    }

    /// Credits one finished repeat to the current item.
    ///
    /// The item becomes `Completed` once every repeat is done; otherwise it
    /// stays `InProgress` until the next [`advance_to_next`](Self::advance_to_next).
    pub fn record_repeat_completion(&mut self) -> Option<&SessionItem> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.status == ItemStatus::InProgress)?;
        item.completed_repeats = (item.completed_repeats + 1).min(item.total_repeats);
        if item.is_exhausted() {
            item.status = ItemStatus::Completed;
            info!(name = item.name(), "session item completed");
        }
        Some(item)
    }

    pub fn toggle_show_completed(&mut self) -> bool {
        self.show_completed = !self.show_completed;
        self.show_completed
    }

    pub fn show_completed(&self) -> bool {
        self.show_completed
    }

    pub fn current(&self) -> Option<&SessionItem> {
        self.items.iter().find(|i| i.status == ItemStatus::InProgress)
    }

    pub fn items(&self) -> &[SessionItem] {
        &self.items
    }

    /// Items still to run, the current one included.
    pub fn open_items(&self) -> impl Iterator<Item = &SessionItem> {
        self.items.iter().filter(|i| i.status != ItemStatus::Completed)
    }

    pub fn completed_items(&self) -> impl Iterator<Item = &SessionItem> {
        self.items.iter().filter(|i| i.status == ItemStatus::Completed)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
