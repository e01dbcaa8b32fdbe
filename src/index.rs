//! Inverted indices for constant-time token lookup
//!
//! `TokenIndex` replaces repeated linear scans over a token list. It stores
//! positions into the slice it was built from, never the tokens themselves.
//! Id lookups keep only the first token seen for each id, so duplicate ids
//! resolve exactly as a front-to-back scan would. Head and lemma groups keep
//! every token, in input order.

use crate::token::Token;
use rustc_hash::FxHashMap;

/// Position of a token within the indexed slice
pub type TokenPos = usize;

/// Inverted index over one token slice
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    /// First position for each word id
    by_id: FxHashMap<usize, TokenPos>,
    /// All positions for each HEAD value
    by_head: FxHashMap<usize, Vec<TokenPos>>,
    /// All positions for each lemma
    by_lemma: FxHashMap<String, Vec<TokenPos>>,
}

impl TokenIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a token slice
    pub fn build(tokens: &[Token]) -> Self {
        Self::from_tokens(tokens)
    }

    /// Build an index from tokens in order
    ///
    /// Positions count from zero in iteration order, so they line up with a
    /// `Vec<&Token>` collected from the same iterator.
    pub fn from_tokens<'t>(tokens: impl IntoIterator<Item = &'t Token>) -> Self {
        let mut index = Self::new();

        for (pos, token) in tokens.into_iter().enumerate() {
            index.add_token(pos, token);
        }

        index
    }

    /// Add a token to the index
    fn add_token(&mut self, pos: TokenPos, token: &Token) {
        // Multiword ranges and empty nodes are not addressable by HEAD
        if let Some(id) = token.id.position() {
            self.by_id.entry(id).or_insert(pos);
        }

        if let Some(head) = token.head {
            self.by_head.entry(head).or_default().push(pos);
        }

        // Look up first so repeated lemmas don't allocate a key each time
        match self.by_lemma.get_mut(token.lemma.as_str()) {
            Some(positions) => positions.push(pos),
            None => {
                self.by_lemma.insert(token.lemma.clone(), vec![pos]);
            }
        }
    }

    /// Position of the first token with this id
    pub fn get_by_id(&self, id: usize) -> Option<TokenPos> {
        self.by_id.get(&id).copied()
    }

    /// Positions of all tokens whose HEAD is `head`
    pub fn get_by_head(&self, head: usize) -> &[TokenPos] {
        self.by_head.get(&head).map(Vec::as_slice).unwrap_or_default()
    }

    /// Positions of all tokens with this lemma
    pub fn get_by_lemma(&self, lemma: &str) -> &[TokenPos] {
        self.by_lemma.get(lemma).map(Vec::as_slice).unwrap_or_default()
    }
}
