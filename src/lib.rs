//! Ezafe: extract ezafe constructions from dependency parses
//!
//! Reads CoNLL-U treebanks, finds every ezafe particle, rebuilds the noun
//! phrase around it (attribute, head, co-attributes, children) and writes
//! the results as a CSV report and a console table.

pub mod config; // Run configuration
pub mod conllu; // CoNLL-U file parsing
pub mod corpus; // Corpus enumeration and document loading
pub mod error; // Crate error type
pub mod index; // Inverted indices for token lookup
pub mod matcher; // Ezafe construction matching
pub mod report; // CSV and table output
pub mod runner; // End-to-end extraction (corpus + matcher + report)
pub mod token; // Token and sentence data structures

// Re-exports for convenience
pub use config::Config;
pub use conllu::{CoNLLUReader, ParseError};
pub use corpus::{Corpus, Document, DocumentSource};
pub use error::EzafeError;
pub use index::TokenIndex;
pub use matcher::{Construction, EZAFE_LEMMA, MatchScope, Matcher, find_constructions};
pub use report::{COLUMNS, ReportRow, render_table, write_csv, write_csv_file};
pub use runner::{RunSummary, run, run_corpus};
pub use token::{Features, Sentence, Token, TokenId};
