use anyhow::{bail, Context, Result};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").expect("non-word regex"));
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_-]+").expect("separator regex"));
static EDGE_HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-+|-+$").expect("hyphen regex"));

/// Normalize a column title into a lowercase, underscore-separated name.
///
/// `"Journal ISSN (print version)"` becomes `"journal_issn_print_version"`.
/// The last step only strips hyphens, which the separator pass has already
/// turned into underscores, so a leading or trailing `_` survives.
pub fn slugify(s: &str) -> String {
    let s = s.to_lowercase();
    let s = s.trim();
    let s = NON_WORD.replace_all(s, "");
    let s = SEPARATORS.replace_all(&s, "_");
    EDGE_HYPHENS.replace_all(&s, "").into_owned()
}

/// Rename every column with [`slugify`]. Fails if two columns end up with the
/// same name.
pub fn rename_columns(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut taken: HashMap<String, &str> = HashMap::with_capacity(schema.fields().len());
    let mut fields = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let slug = slugify(field.name());
        if let Some(prev) = taken.insert(slug.clone(), field.name()) {
            bail!(
                "columns {:?} and {:?} both normalize to {:?}",
                prev,
                field.name(),
                slug
            );
        }
        fields.push(Field::new(slug, field.data_type().clone(), field.is_nullable()));
    }

    RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        batch.columns().to_vec(),
        &RecordBatchOptions::new().with_row_count(Some(batch.num_rows())),
    )
    .context("rebuilding batch with normalized column names")
}
