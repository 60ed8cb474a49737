use chrono::{DateTime, Utc};

use crate::models::AlertNotification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InboxFilter {
    #[default]
    All,
    Unread,
    Starred,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InboxEntry {
    pub id: u64,
    pub notification: AlertNotification,
    pub received_at: DateTime<Utc>,
    pub read: bool,
    pub starred: bool,
}

/// Received notifications, kept in arrival order.
#[derive(Debug, Clone, Default)]
pub struct NotificationInbox {
    entries: Vec<InboxEntry>,
    next_id: u64,
}

impl NotificationInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: AlertNotification) -> u64 {
        self.next_id += 1;
        let id = self.next_id;

        self.entries.push(InboxEntry {
            id,
            notification,
            received_at: Utc::now(),
            read: false,
            starred: false,
        });

        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Arrival order, oldest first.
    pub fn entries(&self) -> &[InboxEntry] {
        &self.entries
    }

    pub fn latest_first(&self) -> Vec<&InboxEntry> {
        self.entries.iter().rev().collect()
    }

    pub fn filtered(&self, filter: InboxFilter) -> Vec<&InboxEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| match filter {
                InboxFilter::All => true,
                InboxFilter::Unread => !e.read,
                InboxFilter::Starred => e.starred,
            })
            .collect()
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.read).count()
    }

    pub fn starred_count(&self) -> usize {
        self.entries.iter().filter(|e| e.starred).count()
    }

    pub fn mark_read(&mut self, id: u64) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(e) => {
                e.read = true;
                true
            }
            None => false,
        }
    }

    pub fn toggle_star(&mut self, id: u64) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(e) => {
                e.starred = !e.starred;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for e in &mut self.entries {
            e.read = true;
        }
    }

    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
