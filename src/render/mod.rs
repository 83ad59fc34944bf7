pub mod layout;
pub mod pdf;

use std::io::Write;

use tracing::debug;

use crate::error::Result;
use crate::models::ReportGroup;

pub use layout::{layout, PageConfig};
pub use pdf::PdfWriter;

/// Lays out `groups` and streams the resulting PDF into `out`.
pub fn render_pdf<W: Write>(
    groups: &[ReportGroup],
    config: &PageConfig,
    out: &mut W,
) -> Result<()> {
    let ops = layout(groups, config);
    let mut writer = PdfWriter::new(config);
    for op in &ops {
        writer.draw(op);
    }
    debug!(instructions = ops.len(), pages = writer.page_count(), "report laid out");
    writer.finish(out)?;
    Ok(())
}
