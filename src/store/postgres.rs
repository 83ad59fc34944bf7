use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Identity, NewRecord, Record};
use crate::store::RecordStore;

const RECORD_COLUMNS: &str =
    "id, sequence_number, name, company, email, batch, status, date_updated";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &PgRow) -> Result<Record> {
    Ok(Record {
        id: row.try_get("id")?,
        sequence_number: row.try_get("sequence_number")?,
        name: row.try_get("name")?,
        company: row.try_get("company")?,
        email: row.try_get("email")?,
        batch: row.try_get("batch")?,
        status: row.try_get("status")?,
        date_updated: row.try_get("date_updated")?,
    })
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<Record>> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM alumni.records \
             WHERE name_key = $1 AND batch = $2 LIMIT 1"
        );
        let row = sqlx::query(&query)
            .bind(&identity.name_key)
            .bind(identity.batch)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn insert_many(&self, records: Vec<NewRecord>) -> Result<Vec<Record>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut ids: Vec<Uuid> = Vec::with_capacity(records.len());
        let mut sequence_numbers: Vec<Option<i64>> = Vec::with_capacity(records.len());
        let mut names: Vec<String> = Vec::with_capacity(records.len());
        let mut name_keys: Vec<String> = Vec::with_capacity(records.len());
        let mut companies: Vec<String> = Vec::with_capacity(records.len());
        let mut emails: Vec<String> = Vec::with_capacity(records.len());
        let mut batches: Vec<i32> = Vec::with_capacity(records.len());
        let mut statuses: Vec<String> = Vec::with_capacity(records.len());
        let mut dates: Vec<DateTime<Utc>> = Vec::with_capacity(records.len());

        for record in records {
            ids.push(Uuid::new_v4());
            sequence_numbers.push(record.sequence_number);
            names.push(record.name);
            name_keys.push(record.identity.name_key);
            companies.push(record.company);
            emails.push(record.email);
            batches.push(record.batch);
            statuses.push(record.status);
            dates.push(now);
        }

        // One statement, so the batch lands entirely or not at all.
        let query = format!(
            r#"
            INSERT INTO alumni.records
            (id, sequence_number, name, name_key, company, email, batch, status, date_updated)
            SELECT * FROM UNNEST(
                $1::uuid[], $2::bigint[], $3::text[], $4::text[], $5::text[],
                $6::text[], $7::int4[], $8::text[], $9::timestamptz[]
            )
            ON CONFLICT (name_key, batch) DO NOTHING
            RETURNING {RECORD_COLUMNS}
            "#
        );

        let rows = sqlx::query(&query)
            .bind(ids)
            .bind(sequence_numbers)
            .bind(names)
            .bind(name_keys)
            .bind(companies)
            .bind(emails)
            .bind(batches)
            .bind(statuses)
            .bind(dates)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn find_all_sorted_by_status(&self) -> Result<Vec<Record>> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM alumni.records \
             ORDER BY status COLLATE \"C\", sequence_number NULLS LAST, name"
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Record>> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM alumni.records \
             WHERE lower(btrim(name)) = lower(btrim($1)) \
             ORDER BY date_updated LIMIT 1"
        );
        let row = sqlx::query(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(record_from_row).transpose()
    }
}
