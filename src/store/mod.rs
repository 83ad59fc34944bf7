use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Identity, NewRecord, Record};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgRecordStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<Record>>;

    /// Inserts the whole batch in one submission. Rows whose identity is
    /// already stored are dropped by the store and missing from the result.
    async fn insert_many(&self, records: Vec<NewRecord>) -> Result<Vec<Record>>;

    /// Every record, ordered by the raw `status` string.
    async fn find_all_sorted_by_status(&self) -> Result<Vec<Record>>;

    /// Whitespace- and case-tolerant lookup by display name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Record>>;
}
