//! Command-line options.

use clap::Parser;
use std::path::PathBuf;

use crate::fetch::Dataset;
use crate::process::Predicate;

pub const DEFAULT_OUTPUT_STEM: &str = "full_OA_journal_in_MEDLINE";

/// Build the list of fully open-access journals (DOAJ) that are indexed in MEDLINE.
#[derive(Debug, Clone, Parser)]
#[command(name = "oa_medline", version, about)]
pub struct Config {
    /// Directory holding the cached dataset downloads
    #[arg(long, default_value = ".")]
    pub cache_dir: PathBuf,

    /// Directory the result files are written to (created if absent)
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// File name of the outputs, without extension
    #[arg(long, default_value = DEFAULT_OUTPUT_STEM)]
    pub output_stem: String,

    /// Download both datasets even if cache files exist
    #[arg(long)]
    pub refresh: bool,

    /// MEDLINE journal list location
    #[arg(long, default_value = Dataset::Medline.default_url())]
    pub medline_url: String,

    /// DOAJ CSV export location
    #[arg(long, default_value = Dataset::Doaj.default_url())]
    pub doaj_url: String,

    /// Keep only DOAJ rows where COLUMN equals VALUE (repeatable, all must hold)
    #[arg(long = "require", value_name = "COLUMN=VALUE")]
    pub require: Vec<Predicate>,

    /// Keep only journals with no APC and no other fees
    #[arg(long)]
    pub no_fees: bool,

    /// Also write the result as Parquet
    #[arg(long)]
    pub parquet: bool,
}

impl Config {
    /// Pre-filter predicates: `--require` entries plus the `--no-fees` pair.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut preds = self.require.clone();
        if self.no_fees {
            preds.extend(Predicate::no_fees());
        }
        preds
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("."),
            out_dir: PathBuf::from("."),
            output_stem: DEFAULT_OUTPUT_STEM.to_string(),
            refresh: false,
            medline_url: Dataset::Medline.default_url().to_string(),
            doaj_url: Dataset::Doaj.default_url().to_string(),
            require: Vec::new(),
            no_fees: false,
            parquet: false,
        }
    }
}
