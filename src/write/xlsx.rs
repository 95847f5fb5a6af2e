use anyhow::{bail, Context, Result};
use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;
use tracing::{info, instrument};

use super::write_atomically;
use crate::process::table::string_column;

/// Rows per worksheet, header included.
const MAX_ROWS: usize = 1_048_576;

/// Single-sheet workbook: bold header row, then one row per record. Nulls are
/// left as empty cells.
#[instrument(level = "info", skip(batch), fields(path = %path.as_ref().display(), rows = batch.num_rows()))]
pub fn write_xlsx(batch: &RecordBatch, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if batch.num_rows() + 1 > MAX_ROWS {
        bail!("{} rows do not fit in one worksheet", batch.num_rows());
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("journals").context("naming worksheet")?;
        let header = Format::new().set_bold();

        let schema = batch.schema();
        for (idx, field) in schema.fields().iter().enumerate() {
            let col = u16::try_from(idx).context("too many columns for a worksheet")?;
            sheet
                .write_string_with_format(0, col, field.name(), &header)
                .with_context(|| format!("writing header {:?}", field.name()))?;

            let values = string_column(batch, field.name())?
                .with_context(|| format!("column {:?} missing", field.name()))?;
            for row in 0..values.len() {
                if values.is_null(row) {
                    continue;
                }
                sheet
                    .write_string(row as u32 + 1, col, values.value(row))
                    .with_context(|| format!("writing cell ({}, {})", row + 1, col))?;
            }
        }
        sheet.autofit();
    }

    write_atomically(path, |tmp| {
        workbook
            .save(tmp)
            .with_context(|| format!("saving workbook {}", tmp.display()))
    })?;
    info!("wrote spreadsheet");
    Ok(())
}
