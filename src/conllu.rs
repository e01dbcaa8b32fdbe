//! CoNLL-U file parsing
//!
//! Parses CoNLL-U format files into `Sentence`s of `Token`s.
//! Multiword tokens and empty nodes are kept in the sentence (in file order)
//! so downstream code sees every annotation line; they simply never match a
//! HEAD lookup. Files ending in `.gz` are decompressed on the fly.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::token::{Dep, Features, Misc, Sentence, Token, TokenId};
use atoi::FromRadix10Checked;
use bstr::ByteSlice;
use flate2::read::MultiGzDecoder;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::Path;
use thiserror::Error;

const FIELD_COUNT: usize = 10;

/// Error during CoNLL-U parsing
#[derive(Debug, Error)]
#[error("Parse error at line {line_num}: {message}")]
pub struct ParseError {
    pub line_num: usize,
    pub message: String,
}

impl ParseError {
    fn new(line_num: usize, message: impl Into<String>) -> Self {
        Self {
            line_num,
            message: message.into(),
        }
    }
}

/// CoNLL-U reader that iterates over sentences
pub struct CoNLLUReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    line_num: usize,
}

impl CoNLLUReader<Box<dyn BufRead>> {
    /// Create a reader from a file path, gunzipping `*.gz` files
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let reader: Box<dyn BufRead> = if is_gzip(path) {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::from_reader(reader))
    }
}

impl CoNLLUReader<Cursor<Vec<u8>>> {
    /// Create a reader from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Self {
        Self::from_reader(Cursor::new(text.as_bytes().to_vec()))
    }
}

impl<R: BufRead> CoNLLUReader<R> {
    /// Create a reader over any buffered source
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
            line_num: 0,
        }
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

impl<R: BufRead> Iterator for CoNLLUReader<R> {
    type Item = Result<Sentence, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut token_lines: Vec<(usize, Vec<u8>)> = Vec::new();
        let mut metadata = FxHashMap::default();
        let mut sentence_text = None;
        let mut seen_comment = false;

        // Read lines until we hit a blank line (sentence boundary) or EOF
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    if token_lines.is_empty() && !seen_comment {
                        return None;
                    }
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    return Some(Err(ParseError::new(
                        self.line_num + 1,
                        format!("IO error: {}", e),
                    )));
                }
            }
            self.line_num += 1;

            let line = self.buf.trim_end_with(|c| c == '\n' || c == '\r');

            if line.trim().is_empty() {
                if !token_lines.is_empty() || seen_comment {
                    break;
                }
                continue;
            }

            if line[0] == b'#' {
                seen_comment = true;
                let comment = match line[1..].to_str() {
                    Ok(s) => s,
                    Err(_) => {
                        return Some(Err(ParseError::new(
                            self.line_num,
                            "Invalid UTF-8 in comment",
                        )));
                    }
                };
                parse_comment(comment, &mut metadata, &mut sentence_text);
                continue;
            }

            token_lines.push((self.line_num, line.to_vec()));
        }

        Some(parse_sentence(token_lines, sentence_text, metadata))
    }
}

/// Parse a comment line (without the leading #)
fn parse_comment(
    comment: &str,
    metadata: &mut FxHashMap<String, String>,
    sentence_text: &mut Option<String>,
) {
    if let Some((key, value)) = comment.split_once('=') {
        let key = key.trim();
        let value = value.trim();

        if key == "text" {
            *sentence_text = Some(value.to_string());
        } else {
            metadata.insert(key.to_string(), value.to_string());
        }
    }
}

/// Parse accumulated token lines into a Sentence
fn parse_sentence(
    lines: Vec<(usize, Vec<u8>)>,
    sentence_text: Option<String>,
    metadata: FxHashMap<String, String>,
) -> Result<Sentence, ParseError> {
    let mut sentence = Sentence::with_metadata(sentence_text, metadata);
    sentence.tokens.reserve(lines.len());

    for (line_num, line) in lines {
        sentence.push(parse_line(&line, line_num)?);
    }

    Ok(sentence)
}

/// Split a token line into its ten tab-separated columns
fn split_fields(line: &[u8], line_num: usize) -> Result<[&[u8]; FIELD_COUNT], ParseError> {
    let mut fields: [&[u8]; FIELD_COUNT] = [&[]; FIELD_COUNT];
    let mut count = 0;
    let mut start = 0;

    for pos in memchr::memchr_iter(b'\t', line) {
        if count < FIELD_COUNT {
            fields[count] = &line[start..pos];
        }
        count += 1;
        start = pos + 1;
    }
    if count < FIELD_COUNT {
        fields[count] = &line[start..];
    }
    count += 1;

    if count != FIELD_COUNT {
        return Err(ParseError::new(
            line_num,
            format!("Expected {} fields, found {}", FIELD_COUNT, count),
        ));
    }
    Ok(fields)
}

fn field_str<'a>(bytes: &'a [u8], column: &str, line_num: usize) -> Result<&'a str, ParseError> {
    bytes
        .to_str()
        .map_err(|_| ParseError::new(line_num, format!("Invalid UTF-8 in {} column", column)))
}

/// Parse a single CoNLL-U token line
fn parse_line(line: &[u8], line_num: usize) -> Result<Token, ParseError> {
    let fields = split_fields(line, line_num)?;

    let id = parse_id(fields[0])
        .ok_or_else(|| ParseError::new(line_num, format!("Invalid ID: {}", fields[0].as_bstr())))?;
    let form = field_str(fields[1], "FORM", line_num)?.to_string();
    let lemma = field_str(fields[2], "LEMMA", line_num)?.to_string();
    let upos = field_str(fields[3], "UPOS", line_num)?.to_string();
    let xpos = match field_str(fields[4], "XPOS", line_num)? {
        "_" => None,
        s => Some(s.to_string()),
    };
    let feats = parse_features(field_str(fields[5], "FEATS", line_num)?);
    let head = parse_head(fields[6]).ok_or_else(|| {
        ParseError::new(line_num, format!("Invalid HEAD: {}", fields[6].as_bstr()))
    })?;
    let deprel = field_str(fields[7], "DEPREL", line_num)?.to_string();
    let deps = parse_deps(field_str(fields[8], "DEPS", line_num)?);
    let misc: Misc = parse_features(field_str(fields[9], "MISC", line_num)?);

    Ok(Token {
        id,
        form,
        lemma,
        upos,
        xpos,
        feats,
        head,
        deprel,
        deps,
        misc,
    })
}

/// Parse an unsigned decimal, rejecting empty input and trailing garbage
#[inline]
fn parse_usize(bytes: &[u8]) -> Option<usize> {
    let (n, used) = usize::from_radix_10_checked(bytes);
    if used == 0 || used != bytes.len() {
        return None;
    }
    n
}

/// Parse ID field (can be integer, range, or decimal)
fn parse_id(s: &[u8]) -> Option<TokenId> {
    if let Some(dash) = memchr::memchr(b'-', s) {
        let start = parse_usize(&s[..dash])?;
        let end = parse_usize(&s[dash + 1..])?;
        Some(TokenId::Range(start, end))
    } else if let Some(dot) = memchr::memchr(b'.', s) {
        let main = parse_usize(&s[..dot])?;
        let sub = parse_usize(&s[dot + 1..])?;
        Some(TokenId::Decimal(main, sub))
    } else {
        parse_usize(s).map(TokenId::Single)
    }
}

/// Parse HEAD field: `_` is no head, `0` is the root
///
/// The outer `Option` is the parse result, the inner one the head itself.
fn parse_head(s: &[u8]) -> Option<Option<usize>> {
    if s == b"_" {
        Some(None)
    } else {
        parse_usize(s).map(Some)
    }
}

/// Parse FEATS or MISC field (key=value|key=value)
fn parse_features(s: &str) -> Features {
    let mut feats = Features::new();

    if s == "_" {
        return feats;
    }

    for pair in s.split('|') {
        if let Some((key, value)) = pair.split_once('=') {
            feats.insert(key.to_string(), value.to_string());
        }
    }

    feats
}

/// Parse DEPS field (head:deprel|head:deprel)
fn parse_deps(s: &str) -> Vec<Dep> {
    let mut deps = Vec::new();

    if s == "_" {
        return deps;
    }

    for pair in s.split('|') {
        if let Some((head, deprel)) = pair.split_once(':') {
            if let Some(head) = parse_id(head.as_bytes()) {
                deps.push(Dep {
                    head,
                    deprel: deprel.to_string(),
                });
            }
        }
    }

    deps
}

/// Read every sentence of a file
///
/// The first parse error aborts the read, so callers never see a partially
/// parsed file.
pub fn read_sentences(path: &Path) -> Result<Vec<Sentence>, ReadError> {
    let reader = CoNLLUReader::from_file(path).map_err(ReadError::Open)?;
    reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(ReadError::Parse)
}

/// Failure reading a whole file
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("{0}")]
    Open(#[source] io::Error),
    #[error("{0}")]
    Parse(#[source] ParseError),
}
