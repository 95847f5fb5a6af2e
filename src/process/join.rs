// src/process/join.rs

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, BooleanArray, StringArray, UInt32Array};
use arrow::compute::{filter_record_batch, take_record_batch};
use arrow::record_batch::RecordBatch;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{debug, instrument, warn};

use super::table::string_column;

/// DOAJ column holding the journal title, used for ordering the result.
pub const TITLE_COLUMN: &str = "Journal title";

/// Exact-equality condition on a named column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: String,
    pub value: String,
}

impl Predicate {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Journals that charge neither an APC nor any other fee.
    pub fn no_fees() -> Vec<Predicate> {
        vec![
            Predicate::new("APC", "No"),
            Predicate::new("Has other fees", "No"),
        ]
    }
}

impl FromStr for Predicate {
    type Err = anyhow::Error;

    /// Parse `COLUMN=VALUE`. Only the first `=` splits, so values may contain `=`.
    fn from_str(s: &str) -> Result<Self> {
        let (column, value) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected COLUMN=VALUE, got {:?}", s))?;
        if column.is_empty() {
            bail!("empty column name in {:?}", s);
        }
        Ok(Predicate::new(column, value))
    }
}

/// A DOAJ column (`left`) matched against a MEDLINE column (`right`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub left: String,
    pub right: String,
}

impl KeyPair {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinKeys {
    pub print: KeyPair,
    pub online: KeyPair,
}

impl Default for JoinKeys {
    fn default() -> Self {
        Self {
            print: KeyPair::new("Journal ISSN (print version)", "ISSN (Print)"),
            online: KeyPair::new("Journal EISSN (online version)", "ISSN (Online)"),
        }
    }
}

/// Fetch a column the operation cannot do without. `Ok(None)` only when the
/// batch is empty, in which case the caller returns it unchanged.
fn required_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<Option<&'a StringArray>> {
    match string_column(batch, name)? {
        Some(col) => Ok(Some(col)),
        None if batch.num_rows() == 0 => Ok(None),
        None => bail!("column {:?} not found", name),
    }
}

/// Keep the rows where every predicate holds. Null never equals a literal.
#[instrument(level = "info", skip(batch, predicates), fields(rows = batch.num_rows()))]
pub fn apply_predicates(batch: &RecordBatch, predicates: &[Predicate]) -> Result<RecordBatch> {
    if predicates.is_empty() {
        return Ok(batch.clone());
    }

    let mut keep = vec![true; batch.num_rows()];
    for pred in predicates {
        let Some(col) = required_column(batch, &pred.column)? else {
            return Ok(batch.clone());
        };
        for (row, flag) in keep.iter_mut().enumerate() {
            *flag = *flag && col.is_valid(row) && col.value(row) == pred.value;
        }
    }

    let mask = BooleanArray::from(keep);
    let out = filter_record_batch(batch, &mask).context("applying pre-filter")?;
    debug!(kept = out.num_rows(), "pre-filter applied");
    Ok(out)
}

/// Distinct non-null values of a MEDLINE column. A missing column is an empty set.
fn value_set<'a>(batch: &'a RecordBatch, name: &str) -> Result<HashSet<&'a str>> {
    match string_column(batch, name)? {
        Some(col) => Ok(col.iter().flatten().collect()),
        None => {
            warn!(column = name, "identifier column missing from MEDLINE table");
            Ok(HashSet::new())
        }
    }
}

fn hit(col: &StringArray, ids: &HashSet<&str>, row: usize) -> bool {
    col.is_valid(row) && ids.contains(col.value(row))
}

/// Rows of `doaj` whose print ISSN is a MEDLINE print ISSN or whose online
/// ISSN is a MEDLINE online ISSN. Each row appears at most once, in input order.
#[instrument(level = "info", skip_all, fields(doaj_rows = doaj.num_rows(), medline_rows = medline.num_rows()))]
pub fn semi_join(doaj: &RecordBatch, medline: &RecordBatch, keys: &JoinKeys) -> Result<RecordBatch> {
    let Some(print) = required_column(doaj, &keys.print.left)? else {
        return Ok(doaj.clone());
    };
    let Some(online) = required_column(doaj, &keys.online.left)? else {
        return Ok(doaj.clone());
    };

    let print_ids = value_set(medline, &keys.print.right)?;
    let online_ids = value_set(medline, &keys.online.right)?;

    let mask: BooleanArray = (0..doaj.num_rows())
        .map(|row| Some(hit(print, &print_ids, row) || hit(online, &online_ids, row)))
        .collect();

    let out = filter_record_batch(doaj, &mask).context("filtering DOAJ by MEDLINE ISSNs")?;
    debug!(matched = out.num_rows(), "semi-join done");
    Ok(out)
}

/// Stable ascending sort on a string column, nulls first, byte-wise ordering.
pub fn sort_by_title(batch: &RecordBatch, column: &str) -> Result<RecordBatch> {
    let Some(col) = required_column(batch, column)? else {
        return Ok(batch.clone());
    };

    let mut order: Vec<u32> = (0..batch.num_rows() as u32).collect();
    order.sort_by(|&a, &b| {
        let key = |i: u32| col.is_valid(i as usize).then(|| col.value(i as usize));
        key(a).cmp(&key(b))
    });

    take_record_batch(batch, &UInt32Array::from(order))
        .with_context(|| format!("sorting by {:?}", column))
}
