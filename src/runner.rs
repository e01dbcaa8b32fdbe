//! End-to-end extraction: corpus files -> constructions -> report rows
//!
//! Each document is loaded, matched, and flattened into `ReportRow`s on its
//! own, so token data never outlives its file. With more than one job the
//! documents are processed on worker threads; results are still collected in
//! enumeration order, so the report is the same either way.

use crate::config::Config;
use crate::corpus::{Corpus, Document, DocumentSource};
use crate::error::EzafeError;
use crate::matcher::Matcher;
use crate::report::{ReportRow, write_csv_file};
use pariter::IteratorExt as _;
use tracing::{debug, info, warn};

/// Outcome of processing one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentReport {
    pub sentences: usize,
    pub tokens: usize,
    pub rows: Vec<ReportRow>,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Documents matched successfully
    pub documents: usize,
    /// Documents that failed to load and were skipped
    pub skipped: usize,
    pub sentences: usize,
    pub tokens: usize,
    pub rows: Vec<ReportRow>,
}

/// Match one loaded document and flatten the results
pub fn extract_rows(document: &Document, matcher: &Matcher) -> Vec<ReportRow> {
    matcher
        .find_in_document(&document.sentences)
        .iter()
        .map(ReportRow::from_construction)
        .collect()
}

/// Load and match a single document
pub fn process_source(
    source: &DocumentSource,
    matcher: &Matcher,
) -> Result<DocumentReport, EzafeError> {
    let document = source.load()?;
    let rows = extract_rows(&document, matcher);

    debug!(
        document = %source.name(),
        sentences = document.sentences.len(),
        constructions = rows.len(),
        "matched document"
    );

    Ok(DocumentReport {
        sentences: document.sentences.len(),
        tokens: document.token_count(),
        rows,
    })
}

type SourceResult = (DocumentSource, Result<DocumentReport, EzafeError>);

/// Process every document of a corpus in order
///
/// A document that fails to load is logged and skipped, unless
/// `config.strict` is set, in which case the first failure is returned.
pub fn run_corpus(corpus: Corpus, config: &Config) -> Result<RunSummary, EzafeError> {
    let matcher = config.matcher();

    let results: Box<dyn Iterator<Item = SourceResult>> = if config.parallel() {
        let jobs = config.jobs;
        Box::new(corpus.into_iter().parallel_map_custom(
            move |o| o.threads(jobs),
            move |source| {
                let result = process_source(&source, &matcher);
                (source, result)
            },
        ))
    } else {
        Box::new(corpus.into_iter().map(move |source| {
            let result = process_source(&source, &matcher);
            (source, result)
        }))
    };

    let mut summary = RunSummary::default();
    for (source, result) in results {
        match result {
            Ok(report) => {
                summary.documents += 1;
                summary.sentences += report.sentences;
                summary.tokens += report.tokens;
                summary.rows.extend(report.rows);
            }
            Err(e) if config.strict => return Err(e),
            Err(e) => {
                warn!(document = %source.name(), error = %e, "skipping document");
                summary.skipped += 1;
            }
        }
    }

    if summary.skipped > 0 {
        warn!(skipped = summary.skipped, "some documents could not be read");
    }
    info!(
        documents = summary.documents,
        skipped = summary.skipped,
        sentences = summary.sentences,
        constructions = summary.rows.len(),
        "matching finished"
    );
    Ok(summary)
}

/// Run the whole pipeline described by `config` and write the CSV report
pub fn run(config: &Config) -> Result<RunSummary, EzafeError> {
    let corpus = Corpus::from_dir(&config.corpus_root, config.extensions.as_slice())?;
    info!(
        corpus = %config.corpus_root.display(),
        files = corpus.len(),
        scope = %config.scope,
        lemma = %config.particle_lemma,
        "processing corpus"
    );

    let summary = run_corpus(corpus, config)?;
    write_csv_file(&config.output, &summary.rows)?;
    info!(output = %config.output.display(), rows = summary.rows.len(), "report written");

    Ok(summary)
}
