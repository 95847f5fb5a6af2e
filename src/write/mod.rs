// src/write/mod.rs

use anyhow::{Context, Result};
use arrow::json::writer::JsonArray;
use arrow::json::WriterBuilder;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

mod xlsx;

pub use xlsx::write_xlsx;

/// Write to `<path>.tmp` through `f`, then rename over `path`.
fn write_atomically<F>(path: &Path, f: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    f(&tmp)?;
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

/// JSON array of objects, one per row, keys in column order. Nulls are kept
/// as `null` so every object carries every column.
#[instrument(level = "info", skip(batch), fields(path = %path.as_ref().display(), rows = batch.num_rows()))]
pub fn write_json(batch: &RecordBatch, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_atomically(path, |tmp| {
        let file =
            File::create(tmp).with_context(|| format!("creating {}", tmp.display()))?;
        let mut writer = WriterBuilder::new()
            .with_explicit_nulls(true)
            .build::<_, JsonArray>(BufWriter::new(file));
        writer.write(batch).context("encoding JSON rows")?;
        writer.finish().context("finishing JSON array")?;
        let mut out = writer.into_inner();
        out.write_all(b"\n")?;
        out.flush().with_context(|| format!("flushing {}", tmp.display()))?;
        Ok(())
    })?;
    info!("wrote JSON");
    Ok(())
}

/// Snappy-compressed Parquet copy of the result.
#[instrument(level = "info", skip(batch), fields(path = %path.as_ref().display(), rows = batch.num_rows()))]
pub fn write_parquet(batch: &RecordBatch, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_atomically(path, |tmp| {
        let file =
            File::create(tmp).with_context(|| format!("creating {}", tmp.display()))?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
            .context("creating Arrow writer")?;
        writer.write(batch).context("writing parquet batch")?;
        writer.close().context("closing parquet writer")?;
        Ok(())
    })?;
    info!("wrote Parquet");
    Ok(())
}

/// Files produced for one result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub xlsx: PathBuf,
    pub json: PathBuf,
    pub parquet: Option<PathBuf>,
}

impl OutputPaths {
    pub fn new(out_dir: impl AsRef<Path>, stem: &str, parquet: bool) -> Self {
        let dir = out_dir.as_ref();
        Self {
            xlsx: dir.join(format!("{}.xlsx", stem)),
            json: dir.join(format!("{}.json", stem)),
            parquet: parquet.then(|| dir.join(format!("{}.parquet", stem))),
        }
    }

    pub fn all(&self) -> Vec<PathBuf> {
        let mut v = vec![self.xlsx.clone(), self.json.clone()];
        v.extend(self.parquet.clone());
        v
    }
}

/// Write every configured output for `batch`.
pub fn write_outputs(batch: &RecordBatch, paths: &OutputPaths) -> Result<()> {
    write_xlsx(batch, &paths.xlsx)?;
    write_json(batch, &paths.json)?;
    if let Some(p) = &paths.parquet {
        write_parquet(batch, p)?;
    }
    Ok(())
}
