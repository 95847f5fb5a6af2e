// src/process/table.rs

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::medline::JournalRecord;

/// Assemble an all-Utf8, all-nullable batch from column names and per-column values.
///
/// The row count is passed explicitly so a table with no columns still knows
/// how many rows it has.
pub fn string_batch(
    names: Vec<String>,
    columns: Vec<Vec<Option<String>>>,
    num_rows: usize,
) -> Result<RecordBatch> {
    let fields: Vec<Field> = names
        .iter()
        .map(|n| Field::new(n, DataType::Utf8, true))
        .collect();
    let arrays: Vec<ArrayRef> = columns
        .into_iter()
        .map(|values| Arc::new(StringArray::from(values)) as ArrayRef)
        .collect();

    RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        arrays,
        &RecordBatchOptions::new().with_row_count(Some(num_rows)),
    )
    .context("building string record batch")
}

/// Build the MEDLINE table. Columns are the union of all record keys in
/// first-seen order; a record lacking a key gets null in that column.
#[instrument(level = "debug", skip(records), fields(records = records.len()))]
pub fn records_to_batch(records: &[JournalRecord]) -> Result<RecordBatch> {
    let mut names: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for rec in records {
        for key in rec.keys() {
            if seen.insert(key) {
                names.push(key.to_string());
            }
        }
    }

    let columns: Vec<Vec<Option<String>>> = names
        .iter()
        .map(|name| {
            records
                .iter()
                .map(|rec| rec.get(name).map(str::to_string))
                .collect()
        })
        .collect();

    debug!(columns = names.len(), "built MEDLINE table");
    string_batch(names, columns, records.len())
}

/// Read the DOAJ CSV export. The first record is the header; empty fields are
/// null. Empty input gives an empty table.
#[instrument(level = "debug", skip(text), fields(content_len = text.len()))]
pub fn csv_to_batch(text: &str) -> Result<RecordBatch> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV header")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut unique = HashSet::new();
    for h in &headers {
        if !unique.insert(h.as_str()) {
            bail!("duplicate CSV column {:?}", h);
        }
    }

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut num_rows = 0usize;
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        for (col, field) in columns.iter_mut().zip(record.iter()) {
            col.push(if field.is_empty() {
                None
            } else {
                Some(field.to_string())
            });
        }
        num_rows += 1;
    }

    debug!(columns = headers.len(), rows = num_rows, "read CSV table");
    string_batch(headers, columns, num_rows)
}

/// Look up a Utf8 column by name. `Ok(None)` if the batch has no such column.
pub fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<Option<&'a StringArray>> {
    let Some(col) = batch.column_by_name(name) else {
        return Ok(None);
    };
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(Some)
        .with_context(|| format!("column {:?} is not Utf8", name))
}
