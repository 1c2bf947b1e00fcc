//! The command interpreter: keyword spotting, span segmentation, and
//! assembly of the structured extraction.
//!
//! One pass per call; the interpreter holds no per-call state. Vocabularies
//! are passed in at call time and treated as read-only, so a caller can
//! replace them wholesale between calls and run calls in parallel.
//!
//! Nothing here propagates failure outward: a tokenizer error becomes an
//! [`ExtractionResult`] with all fields null and a single error string.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::deadline::DeadlineResolver;
use crate::resolver::{
    ASSIGNEE_FALLBACK, CATEGORY_FALLBACK, EntityResolver, SimilarityMatrix,
};
use crate::tokenize::{RuleTokenizer, Token, Tokenizer};

/// The role a spotted keyword token signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordClass {
    Task,
    User,
    Category,
    Deadline,
}

impl KeywordClass {
    /// Fault-tolerant variant list for this class. Matching is by
    /// substring containment against the lowercased token, which absorbs
    /// simple transcription typos and pluralization.
    #[must_use]
    pub const fn variants(self) -> &'static [&'static str] {
        match self {
            Self::Task => &["assign", "task", "tasks", "tusk", "tack"],
            Self::User => &["user", "users", "youser", "yuser"],
            Self::Category => &["category", "categories", "cat", "type", "kind"],
            Self::Deadline => &["deadlin", "deadline", "dead line"],
        }
    }

    fn matches(self, lower_token: &str) -> bool {
        self.variants().iter().any(|v| lower_token.contains(v))
    }
}

/// First token index spotted for each keyword class.
///
/// Transient: discarded once spans are sliced.
#[derive(Debug, Clone, Copy, Default)]
struct KeywordHits {
    task: Option<usize>,
    user: Option<usize>,
    category: Option<usize>,
    deadline: Option<usize>,
}

/// Literal tokens removed from every extracted span.
const STOP_WORDS: &[&str] = &["\"", "'", "the", "a", "an", ","];

/// The interpreter's output: one structured, confidence-scored extraction.
///
/// `success` is true iff `title` and `assignee` are both present and
/// non-empty. `errors` carries non-fatal diagnostics (an unparsable
/// deadline never fails the extraction).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: Option<String>,
    pub assignee: Option<String>,
    pub category: Option<String>,
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_similarity: Option<SimilarityMatrix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_similarity: Option<SimilarityMatrix>,
    pub success: bool,
    pub errors: Vec<String>,
}

impl ExtractionResult {
    /// Result for an internal fault: all fields null, one error string.
    fn internal_fault(message: String) -> Self {
        Self {
            errors: vec![message],
            ..Self::default()
        }
    }
}

/// Rule-based command interpreter.
///
/// Holds the tokenizer, the deadline resolver, and the entity resolver;
/// all are read-only across calls.
pub struct Interpreter {
    tokenizer: Box<dyn Tokenizer>,
    deadlines: DeadlineResolver,
    resolver: EntityResolver,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Interpreter with the rule-based tokenizer and date parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokenizer: Box::new(RuleTokenizer::new()),
            deadlines: DeadlineResolver::default(),
            resolver: EntityResolver::default(),
        }
    }

    /// Interpreter with explicit collaborators, for callers that swap in
    /// a different tokenizer or date parser.
    #[must_use]
    pub fn with_parts(
        tokenizer: Box<dyn Tokenizer>,
        deadlines: DeadlineResolver,
        resolver: EntityResolver,
    ) -> Self {
        Self {
            tokenizer,
            deadlines,
            resolver,
        }
    }

    /// Interpret one transcribed command against the given vocabularies.
    ///
    /// Pure with respect to its inputs (plus the wall clock for relative
    /// deadlines); never fails outward.
    #[must_use]
    pub fn interpret(
        &self,
        text: &str,
        users: &[String],
        categories: &[String],
    ) -> ExtractionResult {
        info!(text, "interpreting command");

        let tokens = match self.tokenizer.tokenize(text) {
            Ok(tokens) => tokens,
            Err(e) => {
                error!(%e, "tokenization failed");
                return ExtractionResult::internal_fault(format!("tokenization failed: {e}"));
            }
        };

        let mut result = ExtractionResult::default();
        let hits = spot_keywords(&tokens);

        self.primary_pass(&tokens, hits, users, categories, &mut result);

        if result.title.is_none() || result.assignee.is_none() {
            self.fallback_pass(&tokens, users, &mut result);
        }

        result.success = result.title.as_deref().is_some_and(|t| !t.is_empty())
            && result.assignee.as_deref().is_some_and(|a| !a.is_empty());

        if result.success {
            info!(
                title = result.title.as_deref(),
                assignee = result.assignee.as_deref(),
                "command interpreted"
            );
        }
        result
    }

    /// Slice spans between spotted keywords and resolve them.
    fn primary_pass(
        &self,
        tokens: &[Token],
        hits: KeywordHits,
        users: &[String],
        categories: &[String],
        result: &mut ExtractionResult,
    ) {
        let end_of_stream = tokens.len();

        // Title: between TASK and the next keyword. Unlike the other
        // classes, TASK extracts nothing without a following keyword.
        if let Some(task_idx) = hits.task {
            if let Some(next) = next_keyword(task_idx, &[hits.user, hits.category, hits.deadline]) {
                result.title = join_span(tokens, task_idx + 1, next);
            }
        }

        if let Some(user_idx) = hits.user {
            let end = next_keyword(user_idx, &[hits.category, hits.deadline]).unwrap_or(end_of_stream);
            if let Some(raw) = join_span(tokens, user_idx + 1, end) {
                let res = self.resolver.resolve(&raw, users, ASSIGNEE_FALLBACK);
                result.assignee = Some(res.resolved);
                result.assignee_similarity = Some(res.matrix);
            }
        }

        if let Some(category_idx) = hits.category {
            let end = next_keyword(category_idx, &[hits.deadline]).unwrap_or(end_of_stream);
            if let Some(raw) = join_span(tokens, category_idx + 1, end) {
                let res = self.resolver.resolve(&raw, categories, CATEGORY_FALLBACK);
                result.category = Some(res.resolved);
                result.category_similarity = Some(res.matrix);
            }
        }

        if let Some(deadline_idx) = hits.deadline {
            if let Some(raw) = join_span(tokens, deadline_idx + 1, end_of_stream) {
                self.resolve_deadline(&raw, result);
            }
        }
    }

    /// Secondary extraction using literal `to`/`by` separators. Never
    /// overwrites a value the primary pass already set; a no-op when the
    /// separators are absent or out of order.
    fn fallback_pass(&self, tokens: &[Token], users: &[String], result: &mut ExtractionResult) {
        let mut to_idx = None;
        let mut by_idx = None;
        // Last occurrence of each separator wins.
        for (i, token) in tokens.iter().enumerate() {
            let lower = token.text.to_lowercase();
            if lower == "to" {
                to_idx = Some(i);
            } else if lower == "by" {
                by_idx = Some(i);
            }
        }

        let (Some(to_idx), Some(by_idx)) = (to_idx, by_idx) else {
            return;
        };
        if to_idx >= by_idx {
            return;
        }

        if result.title.is_none() {
            result.title = join_span(tokens, 0, to_idx);
        }

        if result.assignee.is_none() {
            if let Some(raw) = join_span(tokens, to_idx + 1, by_idx) {
                let res = self.resolver.resolve(&raw, users, ASSIGNEE_FALLBACK);
                result.assignee = Some(res.resolved);
                result.assignee_similarity = Some(res.matrix);
            }
        }

        if result.deadline.is_none() {
            if let Some(raw) = join_span(tokens, by_idx + 1, tokens.len()) {
                self.resolve_deadline(&raw, result);
            }
        }
    }

    /// Resolve a deadline span; an unresolvable one becomes a diagnostic,
    /// never a failure.
    fn resolve_deadline(&self, raw: &str, result: &mut ExtractionResult) {
        match self.deadlines.resolve(raw) {
            Some(timestamp) => result.deadline = Some(timestamp),
            None => result
                .errors
                .push(format!("Could not parse deadline: {raw}")),
        }
    }
}

/// Scan tokens once, left to right, recording the first hit per class.
///
/// Classes are checked in TASK, USER, CATEGORY, DEADLINE order for each
/// token; a token matches at most one class, a filled slot is skipped, and
/// the next class in order gets a chance at the token instead.
fn spot_keywords(tokens: &[Token]) -> KeywordHits {
    let mut hits = KeywordHits::default();

    for (i, token) in tokens.iter().enumerate() {
        let lower = token.text.to_lowercase();
        if hits.task.is_none() && KeywordClass::Task.matches(&lower) {
            hits.task = Some(i);
        } else if hits.user.is_none() && KeywordClass::User.matches(&lower) {
            hits.user = Some(i);
        } else if hits.category.is_none() && KeywordClass::Category.matches(&lower) {
            hits.category = Some(i);
        } else if hits.deadline.is_none() && KeywordClass::Deadline.matches(&lower) {
            hits.deadline = Some(i);
        }
    }

    hits
}

/// Earliest spotted keyword positioned after `idx`.
fn next_keyword(idx: usize, candidates: &[Option<usize>]) -> Option<usize> {
    candidates
        .iter()
        .flatten()
        .copied()
        .filter(|&c| c > idx)
        .min()
}

/// Join tokens in `[start, end)` into one span, dropping stop-word tokens.
///
/// Returns `None` when nothing survives the filter.
fn join_span(tokens: &[Token], start: usize, end: usize) -> Option<String> {
    let words: Vec<&str> = tokens
        .get(start..end.min(tokens.len()))?
        .iter()
        .map(|t| t.text.as_str())
        .filter(|t| !STOP_WORDS.contains(t))
        .collect();

    if words.is_empty() {
        return None;
    }
    Some(words.join(" ").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn toks(text: &str) -> Vec<Token> {
        RuleTokenizer::new()
            .tokenize(text)
            .expect("rule tokenizer is infallible")
    }

    #[test]
    fn keyword_spotting_records_first_occurrence() {
        let hits = spot_keywords(&toks("task one user two task three user four"));
        assert_eq!(hits.task, Some(0));
        assert_eq!(hits.user, Some(2));
    }

    #[test]
    fn task_class_wins_a_contested_token() {
        // "taskuser" contains both a TASK and a USER variant; the priority
        // order gives it to TASK and USER is spotted later.
        let hits = spot_keywords(&toks("taskuser fix it user Bob"));
        assert_eq!(hits.task, Some(0));
        assert_eq!(hits.user, Some(3));
    }

    #[test]
    fn filled_slot_passes_token_to_next_class() {
        // The second "task" token cannot refill TASK; it is checked against
        // the remaining classes instead (and matches none of them).
        let hits = spot_keywords(&toks("task task user Bob"));
        assert_eq!(hits.task, Some(0));
        assert_eq!(hits.user, Some(2));
    }

    #[test]
    fn span_filter_drops_stop_words() {
        let tokens = toks(r#"" the big , plan ""#);
        assert_eq!(join_span(&tokens, 0, tokens.len()).as_deref(), Some("big plan"));
    }

    #[test]
    fn all_stop_word_span_is_none() {
        let tokens = toks(r#"" the ""#);
        assert!(join_span(&tokens, 0, tokens.len()).is_none());
    }

    #[test]
    fn title_requires_a_following_keyword() {
        let interp = Interpreter::new();
        let result = interp.interpret("task fix the door", &vocab(&["Bob"]), &[]);
        assert_eq!(result.title, None);
        assert!(!result.success);
    }

    #[test]
    fn user_span_runs_to_end_of_stream() {
        let interp = Interpreter::new();
        let result = interp.interpret("task fix door user Bob", &vocab(&["Bob", "Alice"]), &[]);
        assert_eq!(result.title.as_deref(), Some("fix door"));
        assert_eq!(result.assignee.as_deref(), Some("Bob"));
        assert!(result.success);
    }

    #[test]
    fn fallback_uses_to_and_by_separators() {
        let interp = Interpreter::new();
        let result = interp.interpret(
            "fix the door to Bob by tomorrow",
            &vocab(&["Bob", "Alice"]),
            &[],
        );
        assert_eq!(result.title.as_deref(), Some("fix door"));
        assert_eq!(result.assignee.as_deref(), Some("Bob"));
        assert!(result.deadline.is_some());
        assert!(result.success);
    }

    #[test]
    fn fallback_requires_to_before_by() {
        let interp = Interpreter::new();
        let result = interp.interpret("done by noon to Bob", &vocab(&["Bob"]), &[]);
        assert_eq!(result.title, None);
        assert!(!result.success);
    }

    #[test]
    fn fallback_never_overwrites_primary_values() {
        // Primary pass fills the assignee; the fallback may only add the
        // missing title.
        let interp = Interpreter::new();
        let result = interp.interpret(
            "bring supplies to site user Bob by Friday",
            &vocab(&["Bob", "Alice"]),
            &[],
        );
        assert_eq!(result.assignee.as_deref(), Some("Bob"));
    }

    #[test]
    fn unparsable_deadline_is_non_fatal() {
        let interp = Interpreter::new();
        let result = interp.interpret(
            "task fix door user Bob deadline whenever",
            &vocab(&["Bob"]),
            &[],
        );
        assert!(result.success);
        assert_eq!(result.deadline, None);
        assert_eq!(
            result.errors,
            vec!["Could not parse deadline: whenever".to_string()]
        );
    }

    #[test]
    fn tokenizer_failure_yields_fault_result() {
        struct BrokenTokenizer;

        impl Tokenizer for BrokenTokenizer {
            fn tokenize(&self, _text: &str) -> anyhow::Result<Vec<Token>> {
                anyhow::bail!("decoder offline")
            }
        }

        let interp = Interpreter::with_parts(
            Box::new(BrokenTokenizer),
            DeadlineResolver::default(),
            EntityResolver::default(),
        );
        let result = interp.interpret("task fix door user Bob", &vocab(&["Bob"]), &[]);
        assert_eq!(result.title, None);
        assert_eq!(result.assignee, None);
        assert_eq!(result.category, None);
        assert_eq!(result.deadline, None);
        assert!(!result.success);
        assert_eq!(
            result.errors,
            vec!["tokenization failed: decoder offline".to_string()]
        );
    }

    #[test]
    fn no_keywords_is_malformed_not_fault() {
        let interp = Interpreter::new();
        let result = interp.interpret("hello world", &vocab(&["Bob"]), &[]);
        assert_eq!(result.title, None);
        assert_eq!(result.assignee, None);
        assert!(!result.success);
        assert!(result.errors.is_empty());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn absent_matrices_are_omitted_from_json() {
        let interp = Interpreter::new();
        let result = interp.interpret("hello world", &vocab(&["Bob"]), &[]);
        let json = serde_json::to_string(&result).expect("result should serialize");
        assert!(!json.contains("assignee_similarity"));
        assert!(!json.contains("category_similarity"));
    }
}
