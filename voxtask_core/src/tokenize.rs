//! Word/punctuation tokenization behind a narrow trait.
//!
//! The interpreter only needs an ordered token stream with the original
//! surface text, so any linguistic pipeline can sit behind [`Tokenizer`].
//! The default [`RuleTokenizer`] splits on whitespace and peels surrounding
//! punctuation into standalone tokens, which is enough for the command
//! templates the interpreter targets: quote and comma tokens must surface
//! on their own so stop-word filtering can drop them.

/// A single token with its original surface text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub index: usize,
}

/// Abstract tokenization capability.
pub trait Tokenizer: Send + Sync {
    /// Split `text` into an ordered token sequence.
    fn tokenize(&self, text: &str) -> anyhow::Result<Vec<Token>>;
}

/// Punctuation peeled off the edges of whitespace-separated chunks.
const EDGE_PUNCTUATION: &[char] = &['"', '\'', ',', '.', '!', '?', ';', ':', '(', ')'];

/// Rule-based tokenizer: whitespace split plus edge punctuation peeling.
///
/// Interior punctuation is kept attached (`3rd`, `don't`, `12/31/2025`).
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTokenizer;

impl RuleTokenizer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Split one whitespace-separated chunk into leading punctuation,
    /// the word itself, and trailing punctuation, in stream order.
    fn split_chunk(chunk: &str, out: &mut Vec<String>) {
        let mut rest = chunk;
        let mut leading = Vec::new();

        while let Some(c) = rest.chars().next() {
            if EDGE_PUNCTUATION.contains(&c) {
                leading.push(c.to_string());
                rest = &rest[c.len_utf8()..];
            } else {
                break;
            }
        }

        let mut trailing = Vec::new();
        while let Some(c) = rest.chars().last() {
            if EDGE_PUNCTUATION.contains(&c) {
                trailing.push(c.to_string());
                rest = &rest[..rest.len() - c.len_utf8()];
            } else {
                break;
            }
        }

        out.extend(leading);
        if !rest.is_empty() {
            out.push(rest.to_string());
        }
        out.extend(trailing.into_iter().rev());
    }
}

impl Tokenizer for RuleTokenizer {
    fn tokenize(&self, text: &str) -> anyhow::Result<Vec<Token>> {
        let mut surfaces = Vec::new();
        for chunk in text.split_whitespace() {
            Self::split_chunk(chunk, &mut surfaces);
        }

        Ok(surfaces
            .into_iter()
            .enumerate()
            .map(|(index, text)| Token { text, index })
            .collect())
    }
}
