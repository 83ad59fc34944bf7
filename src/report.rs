use tracing::{info, instrument};

use crate::error::{LedgerError, Result};
use crate::models::{Record, ReportGroup};
use crate::render::{self, PageConfig};
use crate::store::RecordStore;

pub const REPORT_FILENAME: &str = "alumni_report.pdf";
pub const REPORT_CONTENT_TYPE: &str = "application/pdf";

/// Splits records into status groups, keeping the first-seen order of each
/// status. The input is expected to be sorted by status already.
pub fn group_by_status(records: Vec<Record>) -> Vec<ReportGroup> {
    let mut groups: Vec<ReportGroup> = Vec::new();

    for record in records {
        match groups.iter_mut().find(|group| group.status == record.status) {
            Some(group) => group.records.push(record),
            None => groups.push(ReportGroup {
                status: record.status.clone(),
                records: vec![record],
            }),
        }
    }

    groups
}

#[instrument(skip(store))]
pub async fn assemble<S>(store: &S) -> Result<Vec<ReportGroup>>
where
    S: RecordStore + ?Sized,
{
    let records = store.find_all_sorted_by_status().await?;
    if records.is_empty() {
        return Err(LedgerError::EmptyResult);
    }

    let total = records.len();
    let groups = group_by_status(records);
    info!(records = total, groups = groups.len(), "report assembled");
    Ok(groups)
}

/// Assembles the report and renders it into PDF bytes.
pub async fn build_report<S>(store: &S, page: &PageConfig) -> Result<Vec<u8>>
where
    S: RecordStore + ?Sized,
{
    let groups = assemble(store).await?;
    let mut output = Vec::new();
    render::render_pdf(&groups, page, &mut output)?;
    Ok(output)
}
