use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::models::{Identity, NewRecord, Record};
use crate::store::RecordStore;

/// Test double that keeps the same `(name_key, batch)` uniqueness rule as
/// the Postgres index.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<(Identity, Record)>>,
    insert_calls: AtomicUsize,
    fail_inserts: AtomicBool,
    blind_lookups: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Makes identity lookups miss, as if another writer stored the row
    /// after the check. Inserts still honour the uniqueness rule.
    pub fn blind_lookups(&self, blind: bool) {
        self.blind_lookups.store(blind, Ordering::SeqCst);
    }

    fn poisoned() -> LedgerError {
        LedgerError::Store(sqlx::Error::Protocol("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<Record>> {
        if self.blind_lookups.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let rows = self.rows.lock().map_err(|_| Self::poisoned())?;
        Ok(rows
            .iter()
            .find(|(stored, _)| stored == identity)
            .map(|(_, record)| record.clone()))
    }

    async fn insert_many(&self, records: Vec<NewRecord>) -> Result<Vec<Record>> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(LedgerError::Store(sqlx::Error::PoolTimedOut));
        }

        let mut rows = self.rows.lock().map_err(|_| Self::poisoned())?;
        let now = Utc::now();
        let mut inserted = Vec::new();
        for new in records {
            if rows.iter().any(|(stored, _)| *stored == new.identity) {
                continue;
            }
            let record = Record {
                id: Uuid::new_v4(),
                sequence_number: new.sequence_number,
                name: new.name,
                company: new.company,
                email: new.email,
                date_updated: now,
                batch: new.batch,
                status: new.status,
            };
            rows.push((new.identity, record.clone()));
            inserted.push(record);
        }
        Ok(inserted)
    }

    async fn find_all_sorted_by_status(&self) -> Result<Vec<Record>> {
        let rows = self.rows.lock().map_err(|_| Self::poisoned())?;
        let mut records: Vec<Record> = rows.iter().map(|(_, record)| record.clone()).collect();
        records.sort_by(|a, b| {
            a.status
                .cmp(&b.status)
                .then_with(|| match (a.sequence_number, b.sequence_number) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(records)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Record>> {
        let wanted = name.trim().to_lowercase();
        let rows = self.rows.lock().map_err(|_| Self::poisoned())?;
        Ok(rows
            .iter()
            .map(|(_, record)| record)
            .find(|record| record.name.trim().to_lowercase() == wanted)
            .cloned())
    }
}
