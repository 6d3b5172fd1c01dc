//! In-memory notification list

use serde::Serialize;

use super::models::NotificationRecord;

/// Summary counts shown above the notification list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NotificationCounts {
    pub total: usize,
    pub pending: usize,
    pub processed: usize,
}

/// Ordered notification records, kept in insertion order.
///
/// Records are never removed one by one: they go away only when a full-state
/// refresh replaces the whole list.
#[derive(Debug, Default)]
pub struct NotificationStore {
    records: Vec<NotificationRecord>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: NotificationRecord) {
        self.records.push(record);
    }

    pub fn replace_all(&mut self, records: Vec<NotificationRecord>) {
        self.records = records;
    }

    pub fn find_by_id(&self, id: i64) -> Option<&NotificationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: i64) -> Option<&mut NotificationRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Flag the first record with `id` as processed.
    ///
    /// Returns false when no such record is held.
    pub fn mark_processed(&mut self, id: i64) -> bool {
        match self.find_by_id_mut(id) {
            Some(record) => {
                record.processed = true;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[NotificationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn counts(&self) -> NotificationCounts {
        count_records(&self.records)
    }
}

pub fn count_records(records: &[NotificationRecord]) -> NotificationCounts {
    let processed = records.iter().filter(|r| r.processed).count();
    NotificationCounts {
        total: records.len(),
        pending: records.len() - processed,
        processed,
    }
}
