// wardscrub/src/commands/batch.rs
//! `wardscrub batch`: every `<stem>.txt` of a directory is one document.
//!
//! Documents are independent; each runs on a tokio blocking worker, at most
//! `--jobs` at a time. A failing document is reported and counted but never
//! stops the others. Documents whose text output and report already exist are
//! skipped unless `--force` is given.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, error, info};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use wardscrub_core::{load_image, load_word_boxes, process_document, save_image, DocumentInput, PiiEngine, RegexEngine};

use crate::cli::BatchCommand;
use crate::commands::{build_engine, prepare_text};
use crate::ui::output_format::{error_msg, success_msg};

const TOKEN_EXTENSIONS: [&str; 2] = ["tsv", "json"];
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("{failed} of {total} documents failed")]
    DocumentsFailed { failed: usize, total: usize },
}

/// The files making up one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDocument {
    pub stem: String,
    pub text: PathBuf,
    pub tokens: Option<PathBuf>,
    pub image: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOutcome {
    Redacted,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub jobs: usize,
    pub no_clean: bool,
    pub force: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: Vec<String>,
}

fn sibling(dir: &Path, stem: &str, extensions: &[&str]) -> Option<PathBuf> {
    extensions
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|p| p.is_file())
}

/// Lists the documents of `dir`, sorted by stem.
pub fn discover_documents(dir: &Path) -> Result<Vec<BatchDocument>> {
    let mut documents = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read input directory {}", dir.display()))? {
        let path = entry?.path();
        let is_text = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("txt"));
        if !path.is_file() || !is_text {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        documents.push(BatchDocument {
            tokens: sibling(dir, &stem, &TOKEN_EXTENSIONS),
            image: sibling(dir, &stem, &IMAGE_EXTENSIONS),
            text: path,
            stem,
        });
    }
    documents.sort_by(|a, b| a.stem.cmp(&b.stem));
    Ok(documents)
}

fn text_output(out_dir: &Path, stem: &str) -> PathBuf {
    out_dir.join(format!("{}_redacted.txt", stem))
}

fn report_output(out_dir: &Path, stem: &str) -> PathBuf {
    out_dir.join(format!("{}_pii.json", stem))
}

/// Redacts one document and writes its outputs into `out_dir`.
///
/// Without `force`, a document whose text output and report both exist is
/// left alone.
pub fn process_one(
    engine: &dyn PiiEngine,
    doc: &BatchDocument,
    out_dir: &Path,
    options: BatchOptions,
) -> Result<DocumentOutcome> {
    let text_path = text_output(out_dir, &doc.stem);
    let report_path = report_output(out_dir, &doc.stem);
    if !options.force && text_path.is_file() && report_path.is_file() {
        info!("Skipping '{}': already processed.", doc.stem);
        return Ok(DocumentOutcome::Skipped);
    }

    let raw = fs::read_to_string(&doc.text).with_context(|| format!("Failed to read {}", doc.text.display()))?;
    let word_boxes = doc.tokens.as_ref().map(load_word_boxes).transpose()?;
    let image = doc.image.as_ref().map(load_image).transpose()?;

    let input = DocumentInput {
        source_id: doc.stem.clone(),
        text: prepare_text(&raw, options.no_clean),
        word_boxes,
        image,
    };
    let output = process_document(engine, &input)?;

    fs::write(&text_path, format!("{}\n", output.redacted_text))
        .with_context(|| format!("Failed to write {}", text_path.display()))?;

    if let (Some(image), Some(source)) = (&output.redacted_image, &doc.image) {
        let name = source.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        save_image(image, out_dir.join(format!("redacted_{}", name)))?;
    }

    output.report.write_to(&report_path)?;
    debug!("Finished document '{}'.", doc.stem);
    Ok(DocumentOutcome::Redacted)
}

/// Runs every document through `engine`, `options.jobs` at a time.
pub async fn run_documents(
    engine: Arc<RegexEngine>,
    documents: Vec<BatchDocument>,
    out_dir: PathBuf,
    options: BatchOptions,
) -> BatchSummary {
    let semaphore = Arc::new(Semaphore::new(options.jobs.max(1)));
    let out_dir = Arc::new(out_dir);
    let mut set = JoinSet::new();

    for doc in documents {
        let engine = Arc::clone(&engine);
        let semaphore = Arc::clone(&semaphore);
        let out_dir = Arc::clone(&out_dir);
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let stem = doc.stem.clone();
            let result = tokio::task::spawn_blocking(move || process_one(engine.as_ref(), &doc, &out_dir, options))
                .await
                .map_err(anyhow::Error::from)
                .and_then(|r| r);
            (stem, result)
        });
    }

    let mut summary = BatchSummary::default();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((_, Ok(DocumentOutcome::Redacted))) => summary.processed += 1,
            Ok((_, Ok(DocumentOutcome::Skipped))) => summary.skipped += 1,
            Ok((stem, Err(e))) => {
                error!("Document '{}' failed: {:#}", stem, e);
                error_msg(format!("{}: {:#}", stem, e));
                summary.failed.push(stem);
            }
            Err(e) => {
                error!("Batch worker aborted: {}", e);
                summary.failed.push("<worker>".to_string());
            }
        }
    }
    summary.failed.sort();
    summary
}

pub async fn run_batch(cmd: &BatchCommand, quiet: bool) -> Result<()> {
    info!("Starting batch operation on {}", cmd.input.display());
    let engine = Arc::new(build_engine(&cmd.patterns)?);
    fs::create_dir_all(&cmd.output)
        .with_context(|| format!("Failed to create output directory {}", cmd.output.display()))?;

    let documents = discover_documents(&cmd.input)?;
    let total = documents.len();
    info!("Found {} documents.", total);

    let options = BatchOptions {
        jobs: usize::from(cmd.jobs),
        no_clean: cmd.patterns.no_clean,
        force: cmd.force,
    };
    let summary = run_documents(engine, documents, cmd.output.clone(), options).await;

    if !summary.failed.is_empty() {
        return Err(BatchError::DocumentsFailed {
            failed: summary.failed.len(),
            total,
        }
        .into());
    }
    success_msg(
        format!(
            "{} documents redacted into {}, {} already processed.",
            summary.processed,
            cmd.output.display(),
            summary.skipped
        ),
        quiet,
    );
    Ok(())
}
