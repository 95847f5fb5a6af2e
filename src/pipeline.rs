// src/pipeline.rs

use anyhow::Result;
use reqwest::Client;
use std::path::PathBuf;
use tokio::time::Instant;
use tracing::{info, instrument};

use crate::config::Config;
use crate::fetch::{load_or_fetch, Dataset, DatasetSource};
use crate::process::{
    apply_predicates, csv_to_batch, parse_records, records_to_batch, rename_columns, semi_join,
    sort_by_title, JoinKeys, TITLE_COLUMN,
};
use crate::write::{write_outputs, OutputPaths};

/// What a run did.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub medline_journals: usize,
    pub doaj_journals: usize,
    pub after_prefilter: usize,
    pub matched: usize,
    pub outputs: Vec<PathBuf>,
}

/// Fetch both lists, keep the DOAJ journals indexed in MEDLINE, write the outputs.
#[instrument(level = "info", skip(config))]
pub async fn run(config: &Config) -> Result<RunReport> {
    let start = Instant::now();
    let client = Client::new();

    // ─── 1) fetch ────────────────────────────────────────────────────
    let medline_src = DatasetSource::new(Dataset::Medline, &config.medline_url, &config.cache_dir)?;
    let doaj_src = DatasetSource::new(Dataset::Doaj, &config.doaj_url, &config.cache_dir)?;
    let medline_text = load_or_fetch(&client, &medline_src, config.refresh).await?;
    let doaj_text = load_or_fetch(&client, &doaj_src, config.refresh).await?;

    // ─── 2) parse ────────────────────────────────────────────────────
    let records = parse_records(&medline_text);
    drop(medline_text);
    let medline = records_to_batch(&records)?;
    let doaj = csv_to_batch(&doaj_text)?;
    drop(doaj_text);
    info!(
        medline = medline.num_rows(),
        doaj = doaj.num_rows(),
        "parsed journal lists"
    );

    // ─── 3) filter, join, sort, rename ───────────────────────────────
    let predicates = config.predicates();
    let subset = apply_predicates(&doaj, &predicates)?;
    let joined = semi_join(&subset, &medline, &JoinKeys::default())?;
    let sorted = sort_by_title(&joined, TITLE_COLUMN)?;
    let result = rename_columns(&sorted)?;
    info!(matched = result.num_rows(), "DOAJ journals indexed in MEDLINE");

    // ─── 4) write ────────────────────────────────────────────────────
    let paths = OutputPaths::new(&config.out_dir, &config.output_stem, config.parquet);
    write_outputs(&result, &paths)?;

    info!(elapsed = ?start.elapsed(), "all done");
    Ok(RunReport {
        medline_journals: medline.num_rows(),
        doaj_journals: doaj.num_rows(),
        after_prefilter: subset.num_rows(),
        matched: result.num_rows(),
        outputs: paths.all(),
    })
}
