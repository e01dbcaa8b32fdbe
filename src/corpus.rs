//! Corpus enumeration and document loading
//!
//! A `Corpus` is an ordered list of document sources: in-memory CoNLL-U
//! text, or files gathered from explicit paths, a glob pattern, or a
//! directory listing. Files are always visited in sorted order so a run is
//! reproducible regardless of how the filesystem lists them.
//!
//! Each source loads into a `Document` as a whole. A file with any parse
//! error fails entirely, so nothing downstream sees half a file.

use crate::conllu::{CoNLLUReader, read_sentences};
use crate::error::EzafeError;
use crate::token::Sentence;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffixes picked up by `Corpus::from_dir` by default
pub const DEFAULT_EXTENSIONS: [&str; 2] = [".conllu", ".conllu.gz"];

/// One loadable unit of a corpus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// In-memory CoNLL-U text
    Text(String),
    /// File path (plain or gzipped)
    File(PathBuf),
}

impl DocumentSource {
    /// Read and parse the whole source
    pub fn load(&self) -> Result<Document, EzafeError> {
        match self {
            DocumentSource::Text(text) => {
                let sentences = CoNLLUReader::from_str(text).collect::<Result<Vec<_>, _>>()?;
                Ok(Document {
                    path: None,
                    sentences,
                })
            }
            DocumentSource::File(path) => {
                let sentences =
                    read_sentences(path).map_err(|e| EzafeError::from_read(path, e))?;
                Ok(Document {
                    path: Some(path.clone()),
                    sentences,
                })
            }
        }
    }

    /// Label for log messages
    pub fn name(&self) -> String {
        match self {
            DocumentSource::Text(_) => "<string>".to_string(),
            DocumentSource::File(path) => path.display().to_string(),
        }
    }
}

/// All sentences of one source, in file order
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub path: Option<PathBuf>,
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }
}

/// Ordered collection of document sources
///
/// # Examples
///
/// ```no_run
/// use ezafe::Corpus;
///
/// let corpus = Corpus::from_dir("corpus/", &[".conllu"]).unwrap();
/// for document in corpus.documents() {
///     match document {
///         Ok(doc) => println!("{} sentences", doc.sentences.len()),
///         Err(e) => eprintln!("{}", e),
///     }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    sources: Vec<DocumentSource>,
}

impl Corpus {
    /// Create from an in-memory CoNLL-U string
    pub fn from_string(text: &str) -> Self {
        Self {
            sources: vec![DocumentSource::Text(text.to_string())],
        }
    }

    /// Create from a single file path
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self {
            sources: vec![DocumentSource::File(path.as_ref().to_path_buf())],
        }
    }

    /// Create from explicit file paths, kept in the order given
    pub fn from_paths(file_paths: Vec<PathBuf>) -> Self {
        Self {
            sources: file_paths.into_iter().map(DocumentSource::File).collect(),
        }
    }

    /// Create from a glob pattern
    ///
    /// Files are processed in sorted order for deterministic results.
    pub fn from_glob(pattern: &str) -> Result<Self, EzafeError> {
        let mut file_paths: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        file_paths.sort();
        Ok(Self::from_paths(file_paths))
    }

    /// Create from the files directly inside `dir` whose names end in one of
    /// `extensions`
    ///
    /// Subdirectories are not descended into. Files are sorted by path.
    pub fn from_dir(dir: impl AsRef<Path>, extensions: &[impl AsRef<str>]) -> Result<Self, EzafeError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(EzafeError::NotADirectory(dir.to_path_buf()));
        }

        let entries = fs::read_dir(dir).map_err(|source| EzafeError::FileOpen {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut file_paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && has_extension(&path, extensions) {
                file_paths.push(path);
            }
        }
        file_paths.sort();

        debug!(dir = %dir.display(), files = file_paths.len(), "enumerated corpus directory");
        Ok(Self::from_paths(file_paths))
    }

    pub fn sources(&self) -> &[DocumentSource] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Load each document in order
    pub fn documents(&self) -> impl Iterator<Item = Result<Document, EzafeError>> + '_ {
        self.sources.iter().map(DocumentSource::load)
    }
}

impl IntoIterator for Corpus {
    type Item = DocumentSource;
    type IntoIter = std::vec::IntoIter<DocumentSource>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.into_iter()
    }
}

fn has_extension(path: &Path, extensions: &[impl AsRef<str>]) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| extensions.iter().any(|ext| name.ends_with(ext.as_ref())))
}
