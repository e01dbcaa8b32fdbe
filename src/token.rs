//! Token and sentence data structures
//!
//! A `Sentence` is an ordered list of `Token`s exactly as they appear in the
//! CoNLL-U source, including multiword tokens and empty nodes. Tokens are
//! immutable once the reader has built them.

use rustc_hash::FxHashMap;
use std::fmt;

/// CoNLL-U token ID: a word, a multiword range, or an empty node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenId {
    /// Ordinary word: 1, 2, 3
    Single(usize),
    /// Multiword token: 1-2
    Range(usize, usize),
    /// Empty node: 2.1
    Decimal(usize, usize),
}

impl TokenId {
    /// Word position, if this is an ordinary word
    ///
    /// Ranges and empty nodes have no position a HEAD can point at.
    pub fn position(&self) -> Option<usize> {
        match self {
            TokenId::Single(n) => Some(*n),
            TokenId::Range(_, _) | TokenId::Decimal(_, _) => None,
        }
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenId::Single(n) => write!(f, "{}", n),
            TokenId::Range(a, b) => write!(f, "{}-{}", a, b),
            TokenId::Decimal(n, m) => write!(f, "{}.{}", n, m),
        }
    }
}

/// Ordered key=value pairs (FEATS and MISC columns)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Features(Vec<(String, String)>);

impl Features {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a pair, replacing the value of an existing key in place
    pub fn insert(&mut self, key: String, value: String) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "_");
        }
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        Ok(())
    }
}

/// MISC column uses the same key=value syntax as FEATS
pub type Misc = Features;

/// Enhanced dependency (DEPS column entry)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dep {
    pub head: TokenId,
    pub deprel: String,
}

/// One line of a CoNLL-U sentence
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub id: TokenId,
    pub form: String,
    pub lemma: String,
    pub upos: String,
    pub xpos: Option<String>,
    pub feats: Features,
    /// HEAD as written: `Some(0)` is the root, `None` is `_`
    pub head: Option<usize>,
    pub deprel: String,
    pub deps: Vec<Dep>,
    pub misc: Misc,
}

impl Token {
    /// Create a word token with the given attributes
    ///
    /// Remaining columns are left empty; handy for building sentences by hand.
    pub fn new(id: usize, form: &str, lemma: &str, head: Option<usize>, deprel: &str) -> Self {
        Self {
            id: TokenId::Single(id),
            form: form.to_string(),
            lemma: lemma.to_string(),
            upos: "_".to_string(),
            xpos: None,
            feats: Features::new(),
            head,
            deprel: deprel.to_string(),
            deps: Vec::new(),
            misc: Misc::new(),
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.head == Some(0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = match self.head {
            Some(h) => h.to_string(),
            None => "_".to_string(),
        };
        write!(
            f,
            "Token(id={}, form={}, lemma={}, upos={}, xpos={}, feats={}, head={}, deprel={}, misc={})",
            self.id,
            self.form,
            self.lemma,
            self.upos,
            self.xpos.as_deref().unwrap_or("_"),
            self.feats,
            head,
            self.deprel,
            self.misc,
        )
    }
}

/// A sentence: tokens in file order plus comment metadata
#[derive(Debug, Clone, Default)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    pub sentence_text: Option<String>,
    pub metadata: FxHashMap<String, String>,
}

impl Sentence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sentence carrying `# text` and other comment metadata
    pub fn with_metadata(
        sentence_text: Option<String>,
        metadata: FxHashMap<String, String>,
    ) -> Self {
        Self {
            tokens: Vec::new(),
            sentence_text,
            metadata,
        }
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Sentence id from `# sent_id = ...`, if present
    pub fn sent_id(&self) -> Option<&str> {
        self.metadata.get("sent_id").map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
