use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::{LedgerError, Result};
use crate::models::{Identity, IngestSummary, NameMatch, NewRecord, RawRow, DEFAULT_STATUS};
use crate::store::RecordStore;

const SEQUENCE_KEYS: &[&str] = &["slNo", "sl_no", "sequenceNumber", "sequence_number"];

#[instrument(skip(store, rows), fields(rows = rows.len()))]
pub async fn ingest<S>(store: &S, rows: Vec<RawRow>, policy: NameMatch) -> Result<IngestSummary>
where
    S: RecordStore + ?Sized,
{
    let total = rows.len();
    let candidates = rows
        .iter()
        .enumerate()
        .map(|(index, row)| parse_row(index + 1, row, policy))
        .collect::<Result<Vec<_>>>()?;

    let mut seen: HashSet<Identity> = HashSet::new();
    let mut pending = Vec::new();
    for candidate in candidates {
        if !seen.insert(candidate.identity.clone()) {
            debug!(name = %candidate.name, batch = candidate.batch, "duplicate within upload");
            continue;
        }
        if store.find_by_identity(&candidate.identity).await?.is_some() {
            debug!(name = %candidate.name, batch = candidate.batch, "already stored");
            continue;
        }
        pending.push(candidate);
    }

    let inserted = if pending.is_empty() {
        0
    } else {
        let submitted = pending.len();
        let stored = store.insert_many(pending).await.map_err(|err| {
            tracing::error!(error = %err, "batch insert failed");
            err
        })?;
        if stored.len() < submitted {
            // Another writer stored the same identity between check and insert.
            debug!(
                lost = submitted - stored.len(),
                "identity constraint dropped rows"
            );
        }
        stored.len()
    };

    let summary = IngestSummary {
        inserted,
        skipped: total - inserted,
    };
    info!(inserted = summary.inserted, skipped = summary.skipped, "ingestion finished");
    Ok(summary)
}

fn parse_row(row_number: usize, row: &RawRow, policy: NameMatch) -> Result<NewRecord> {
    let name = match row.get("name") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            return Err(LedgerError::validation(row_number, "name", "is required"));
        }
        Some(_) => {
            return Err(LedgerError::validation(row_number, "name", "must be text"));
        }
    };

    let batch = match row.get("batch") {
        Some(value) => integer_cell(value)
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| LedgerError::validation(row_number, "batch", "must be a whole number"))?,
        None => return Err(LedgerError::validation(row_number, "batch", "is required")),
    };

    let sequence_number = match SEQUENCE_KEYS.iter().find_map(|key| row.get(*key)) {
        None | Some(Value::Null) => None,
        Some(value) => Some(integer_cell(value).ok_or_else(|| {
            LedgerError::validation(row_number, "slNo", "must be a whole number")
        })?),
    };

    let status = text_cell(row, "status")
        .filter(|status| !status.is_empty())
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());

    Ok(NewRecord {
        identity: Identity::new(&name, batch, policy),
        sequence_number,
        name,
        company: text_cell(row, "company").unwrap_or_default(),
        email: text_cell(row, "email").unwrap_or_default(),
        batch,
        status,
    })
}

fn integer_cell(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_number)),
        Value::String(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
        }
        _ => None,
    }
}

// Spreadsheet exports often write whole numbers as `2019.0`.
fn whole_number(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn text_cell(row: &RawRow, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
