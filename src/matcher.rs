//! Ezafe construction matching
//!
//! For every token whose lemma is the ezafe particle, the matcher rebuilds
//! the phrase around it:
//!
//! ```text
//!   head            <- attribute.head
//!    ├─ attribute   <- particle.head   (plus its siblings: co_attributes)
//!    │    └─ particle
//!    └─ ...         (children of head)
//! ```
//!
//! Lookups go through a `TokenIndex`, so one scope costs O(n) to index and
//! each particle costs O(1) plus the size of its output. Id lookups resolve
//! to the first token carrying that id, which is what a front-to-back scan
//! would find.
//!
//! A particle is skipped without error when its attribute or the attribute's
//! head cannot be found. Annotated corpora are noisy and a dangling HEAD is
//! not worth failing a run over.

use crate::index::{TokenIndex, TokenPos};
use crate::token::{Sentence, Token};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Lemma of the ezafe particle
pub const EZAFE_LEMMA: &str = "ī";

/// One matched ezafe construction
///
/// Every field borrows from the token list the matcher scanned.
#[derive(Debug, Clone, PartialEq)]
pub struct Construction<'a> {
    /// Head of the whole phrase (the attribute's head)
    pub head: &'a Token,
    /// The ezafe particle
    pub particle: &'a Token,
    /// Token the particle attaches to
    pub attribute: &'a Token,
    /// Every token sharing the attribute's head, the attribute included
    pub co_attributes: Vec<&'a Token>,
    /// Every token whose head is `head`
    pub children: Vec<&'a Token>,
}

/// Which token list id lookups are resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchScope {
    /// One sentence at a time
    #[default]
    Sentence,
    /// All sentences of a file flattened into one list
    ///
    /// Ids repeat across sentences, so a lookup may land in an earlier
    /// sentence. This mirrors how per-file extraction scripts behave.
    Document,
}

impl fmt::Display for MatchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchScope::Sentence => write!(f, "sentence"),
            MatchScope::Document => write!(f, "document"),
        }
    }
}

impl FromStr for MatchScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sentence" => Ok(MatchScope::Sentence),
            "document" | "file" => Ok(MatchScope::Document),
            other => Err(format!(
                "unknown scope '{}' (expected 'sentence' or 'document')",
                other
            )),
        }
    }
}

/// Ezafe construction matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    particle_lemma: String,
    scope: MatchScope,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(EZAFE_LEMMA)
    }
}

impl Matcher {
    /// Create a matcher for the given particle lemma, sentence-scoped
    pub fn new(particle_lemma: impl Into<String>) -> Self {
        Self {
            particle_lemma: particle_lemma.into(),
            scope: MatchScope::default(),
        }
    }

    pub fn with_scope(mut self, scope: MatchScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn particle_lemma(&self) -> &str {
        &self.particle_lemma
    }

    pub fn scope(&self) -> MatchScope {
        self.scope
    }

    /// Find all constructions in one token list
    ///
    /// Constructions come out in the input order of their particles.
    pub fn find<'a>(&self, tokens: &'a [Token]) -> Vec<Construction<'a>> {
        let refs: Vec<&'a Token> = tokens.iter().collect();
        self.find_in(&refs)
    }

    /// Find all constructions in a list of borrowed tokens
    pub fn find_in<'a>(&self, tokens: &[&'a Token]) -> Vec<Construction<'a>> {
        let index = TokenIndex::from_tokens(tokens.iter().copied());

        index
            .get_by_lemma(&self.particle_lemma)
            .iter()
            .filter_map(|&pos| resolve(tokens, &index, tokens[pos]))
            .collect()
    }

    /// Find all constructions in the sentences of one file, honouring scope
    pub fn find_in_document<'a>(&self, sentences: &'a [Sentence]) -> Vec<Construction<'a>> {
        match self.scope {
            MatchScope::Sentence => sentences
                .iter()
                .flat_map(|sentence| self.find(&sentence.tokens))
                .collect(),
            MatchScope::Document => {
                let tokens: Vec<&'a Token> = sentences
                    .iter()
                    .flat_map(|sentence| sentence.tokens.iter())
                    .collect();
                self.find_in(&tokens)
            }
        }
    }
}

/// Find constructions for the standard ezafe lemma
pub fn find_constructions(tokens: &[Token]) -> Vec<Construction<'_>> {
    Matcher::default().find(tokens)
}

/// Rebuild the construction around one particle, if it resolves
fn resolve<'a>(
    tokens: &[&'a Token],
    index: &TokenIndex,
    particle: &'a Token,
) -> Option<Construction<'a>> {
    let Some(attribute) = particle
        .head
        .and_then(|id| index.get_by_id(id))
        .map(|pos| tokens[pos])
    else {
        trace!(particle = %particle, "ezafe attribute not found");
        return None;
    };

    let Some((head_id, head)) = attribute
        .head
        .and_then(|id| index.get_by_id(id).map(|pos| (id, tokens[pos])))
    else {
        trace!(attribute = %attribute, "ezafe construction head not found");
        return None;
    };

    // attribute.head == head.id, so both groups come from the same bucket
    let co_attributes = collect(tokens, index.get_by_head(head_id));
    let children = collect(tokens, index.get_by_head(head_id));

    Some(Construction {
        head,
        particle,
        attribute,
        co_attributes,
        children,
    })
}

fn collect<'a>(tokens: &[&'a Token], positions: &[TokenPos]) -> Vec<&'a Token> {
    positions.iter().map(|&pos| tokens[pos]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenId;
    use proptest::prelude::*;

    fn tok(id: usize, lemma: &str, head: Option<usize>) -> Token {
        Token::new(id, lemma, lemma, head, "dep")
    }

    fn ids(tokens: &[&Token]) -> Vec<TokenId> {
        tokens.iter().map(|t| t.id).collect()
    }

    /// Position of a borrowed token within its slice, by address
    fn pos_of(tokens: &[Token], token: &Token) -> usize {
        tokens
            .iter()
            .position(|t| std::ptr::eq(t, token))
            .expect("token borrowed from another slice")
    }

    /// Straightforward linear-scan version to check the indexed matcher against
    fn linear_scan<'a>(tokens: &'a [Token], lemma: &str) -> Vec<Construction<'a>> {
        let find_id = |id: Option<usize>| {
            tokens
                .iter()
                .find(|t| id.is_some() && t.id.position() == id)
        };
        let mut out = Vec::new();
        for particle in tokens.iter().filter(|t| t.lemma == lemma) {
            let Some(attribute) = find_id(particle.head) else {
                continue;
            };
            let co_attributes: Vec<&Token> =
                tokens.iter().filter(|t| t.head == attribute.head).collect();
            let Some(head) = find_id(attribute.head) else {
                continue;
            };
            let children: Vec<&Token> = tokens
                .iter()
                .filter(|t| t.head.is_some() && t.head == head.id.position())
                .collect();
            out.push(Construction {
                head,
                particle,
                attribute,
                co_attributes,
                children,
            });
        }
        out
    }

    type Positions = (usize, usize, usize, Vec<usize>, Vec<usize>);

    /// Constructions as token positions, so equal-looking tokens can't mask
    /// a wrong pick
    fn positions(tokens: &[Token], found: &[Construction<'_>]) -> Vec<Positions> {
        found
            .iter()
            .map(|c| {
                (
                    pos_of(tokens, c.head),
                    pos_of(tokens, c.particle),
                    pos_of(tokens, c.attribute),
                    c.co_attributes.iter().map(|t| pos_of(tokens, t)).collect(),
                    c.children.iter().map(|t| pos_of(tokens, t)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_basic_construction() {
        // x <- y <- z (root), ī attached to y
        let tokens = vec![
            tok(1, "x", Some(2)),
            tok(2, "y", Some(3)),
            tok(3, "z", Some(0)),
            tok(4, EZAFE_LEMMA, Some(2)),
        ];

        let found = find_constructions(&tokens);

        assert_eq!(found.len(), 1);
        let c = &found[0];
        assert_eq!(c.particle.id, TokenId::Single(4));
        assert_eq!(c.attribute.id, TokenId::Single(2));
        assert_eq!(c.head.id, TokenId::Single(3));
        // Only y hangs off z, so both groups are just the attribute
        assert_eq!(ids(&c.co_attributes), vec![TokenId::Single(2)]);
        assert_eq!(ids(&c.children), vec![TokenId::Single(2)]);
    }

    #[test]
    fn test_noun_phrase_with_siblings() {
        // pus ī šāh ī wuzurg: "son of the great king"
        let tokens = vec![
            Token::new(1, "dīd", "dīdan", Some(0), "root"),
            Token::new(2, "pus", "pus", Some(1), "obj"),
            Token::new(3, "ī", "ī", Some(4), "case"),
            Token::new(4, "šāh", "šāh", Some(2), "nmod"),
            Token::new(5, "ī", "ī", Some(6), "case"),
            Token::new(6, "wuzurg", "wuzurg", Some(4), "amod"),
            Token::new(7, "nēk", "nēk", Some(4), "amod"),
        ];

        let found = find_constructions(&tokens);
        assert_eq!(found.len(), 2);

        assert_eq!(found[0].head.form, "pus");
        assert_eq!(found[0].attribute.form, "šāh");
        assert_eq!(ids(&found[0].co_attributes), vec![TokenId::Single(4)]);

        assert_eq!(found[1].head.form, "šāh");
        assert_eq!(found[1].particle.id, TokenId::Single(5));
        assert_eq!(found[1].attribute.form, "wuzurg");
        let forms: Vec<&str> = found[1].children.iter().map(|t| t.form.as_str()).collect();
        assert_eq!(forms, vec!["ī", "wuzurg", "nēk"]);
        assert_eq!(found[1].co_attributes, found[1].children);
    }

    #[test]
    fn test_empty_input() {
        assert!(find_constructions(&[]).is_empty());
    }

    #[test]
    fn test_dangling_particle_head() {
        let tokens = vec![tok(1, "x", Some(0)), tok(2, EZAFE_LEMMA, Some(9))];
        assert!(find_constructions(&tokens).is_empty());
    }

    #[test]
    fn test_particle_without_head() {
        let tokens = vec![tok(1, "x", Some(0)), tok(2, EZAFE_LEMMA, None)];
        assert!(find_constructions(&tokens).is_empty());
    }

    #[test]
    fn test_root_attribute_is_skipped() {
        // The attribute's head is 0, and there is no token 0
        let tokens = vec![tok(1, "x", Some(0)), tok(2, EZAFE_LEMMA, Some(1))];
        assert!(find_constructions(&tokens).is_empty());
    }

    #[test]
    fn test_dangling_attribute_head() {
        let tokens = vec![tok(1, "x", Some(7)), tok(2, EZAFE_LEMMA, Some(1))];
        assert!(find_constructions(&tokens).is_empty());
    }

    #[test]
    fn test_two_particles_same_attribute() {
        let tokens = vec![
            tok(1, "z", Some(0)),
            tok(2, "y", Some(1)),
            tok(3, EZAFE_LEMMA, Some(2)),
            tok(4, EZAFE_LEMMA, Some(2)),
        ];

        let found = find_constructions(&tokens);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].particle.id, TokenId::Single(3));
        assert_eq!(found[1].particle.id, TokenId::Single(4));
        assert_eq!(found[0].attribute, found[1].attribute);
        assert_eq!(found[0].co_attributes, found[1].co_attributes);
        assert_eq!(found[0].children, found[1].children);
    }

    #[test]
    fn test_multiword_token_never_resolves() {
        let mut range = tok(2, "y", Some(1));
        range.id = TokenId::Range(2, 3);
        let tokens = vec![tok(1, "z", Some(0)), range, tok(4, EZAFE_LEMMA, Some(2))];

        assert!(find_constructions(&tokens).is_empty());
    }

    #[test]
    fn test_custom_lemma() {
        let tokens = vec![
            tok(1, "z", Some(0)),
            tok(2, "y", Some(1)),
            tok(3, "i", Some(2)),
        ];

        assert!(find_constructions(&tokens).is_empty());
        assert_eq!(Matcher::new("i").find(&tokens).len(), 1);
    }

    fn sentence(tokens: Vec<Token>) -> Sentence {
        let mut sentence = Sentence::new();
        for token in tokens {
            sentence.push(token);
        }
        sentence
    }

    #[test]
    fn test_document_scope_crosses_sentences() {
        let sentences = vec![
            sentence(vec![
                Token::new(1, "xwadāy", "xwadāy", Some(0), "root"),
                Token::new(2, "nēk", "nēk", Some(1), "amod"),
            ]),
            sentence(vec![
                Token::new(1, "ī", "ī", Some(2), "case"),
                Token::new(3, "dar", "dar", Some(0), "root"),
            ]),
        ];

        let per_sentence = Matcher::default().find_in_document(&sentences);
        assert!(per_sentence.is_empty());

        let per_document = Matcher::default()
            .with_scope(MatchScope::Document)
            .find_in_document(&sentences);
        assert_eq!(per_document.len(), 1);
        assert_eq!(per_document[0].attribute.form, "nēk");
        // Id 1 appears twice; the first one (sentence 1) wins
        assert_eq!(per_document[0].head.form, "xwadāy");
        assert_eq!(per_document[0].particle.form, "ī");
    }

    #[test]
    fn test_sentence_scope_keeps_sentence_order() {
        let phrase = || {
            vec![
                tok(1, "z", Some(0)),
                tok(2, "y", Some(1)),
                tok(3, EZAFE_LEMMA, Some(2)),
            ]
        };
        let sentences = vec![sentence(phrase()), sentence(vec![]), sentence(phrase())];

        let found = Matcher::default().find_in_document(&sentences);

        assert_eq!(found.len(), 2);
        assert!(std::ptr::eq(found[0].particle, &sentences[0].tokens[2]));
        assert!(std::ptr::eq(found[1].particle, &sentences[2].tokens[2]));
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!("sentence".parse::<MatchScope>(), Ok(MatchScope::Sentence));
        assert_eq!("Document".parse::<MatchScope>(), Ok(MatchScope::Document));
        assert_eq!("file".parse::<MatchScope>(), Ok(MatchScope::Document));
        assert!("corpus".parse::<MatchScope>().is_err());
        assert_eq!(MatchScope::Document.to_string(), "document");
    }

    fn arb_token() -> impl Strategy<Value = Token> {
        (
            1usize..8,
            prop::option::of(0usize..8),
            prop::sample::select(vec![EZAFE_LEMMA, "x", "y"]),
            prop::bool::weighted(0.1),
        )
            .prop_map(|(id, head, lemma, multiword)| {
                let mut token = tok(id, lemma, head);
                if multiword {
                    token.id = TokenId::Range(id, id + 1);
                }
                token
            })
    }

    fn arb_tokens() -> impl Strategy<Value = Vec<Token>> {
        prop::collection::vec(arb_token(), 0..24)
    }

    proptest! {
        #[test]
        fn indexed_matches_linear_scan(tokens in arb_tokens()) {
            let indexed = find_constructions(&tokens);
            let scanned = linear_scan(&tokens, EZAFE_LEMMA);
            prop_assert_eq!(positions(&tokens, &indexed), positions(&tokens, &scanned));
        }

        #[test]
        fn at_most_one_construction_per_particle(tokens in arb_tokens()) {
            let particles = tokens.iter().filter(|t| t.lemma == EZAFE_LEMMA).count();
            prop_assert!(find_constructions(&tokens).len() <= particles);
        }

        #[test]
        fn matching_is_idempotent(tokens in arb_tokens()) {
            let first = positions(&tokens, &find_constructions(&tokens));
            let second = positions(&tokens, &find_constructions(&tokens));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn relations_hold(tokens in arb_tokens()) {
            for c in find_constructions(&tokens) {
                prop_assert_eq!(c.attribute.head, c.head.id.position());
                prop_assert_eq!(c.particle.head, c.attribute.id.position());
                prop_assert!(c.co_attributes.iter().all(|t| t.head == c.attribute.head));
                prop_assert!(c.children.iter().all(|t| t.head == c.head.id.position()));
                prop_assert!(c.co_attributes.iter().any(|t| std::ptr::eq(*t, c.attribute)));
            }
        }
    }
}
