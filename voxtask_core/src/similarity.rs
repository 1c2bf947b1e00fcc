//! Normalized string similarity for fuzzy entity resolution.

/// Compute a normalized similarity ratio between two strings.
///
/// Both inputs are trimmed and lowercased before scoring. The score is the
/// classic longest-matching-blocks ratio: `2 * M / (len(a) + len(b))`, where
/// `M` is the total length of the matching blocks found by recursively
/// taking the longest common substring and recursing on the pieces to
/// either side of it.
///
/// Returns 1.0 for identical strings (after normalization) and 0.0 for
/// completely disjoint ones. Deterministic and symmetric.
#[must_use]
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.trim().to_lowercase().chars().collect();
    let b: Vec<char> = b.trim().to_lowercase().chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let matched = matching_chars(&a, &b);
    #[allow(clippy::cast_precision_loss)]
    let ratio = 2.0 * matched as f64 / (a.len() + b.len()) as f64;
    ratio
}

/// Total length of the matching blocks between two char slices.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (a_start, b_start, len) = longest_match(a, b);
    if len == 0 {
        return 0;
    }

    len + matching_chars(&a[..a_start], &b[..b_start])
        + matching_chars(&a[a_start + len..], &b[b_start + len..])
}

/// Find the longest common substring of `a` and `b`.
///
/// Returns `(start_in_a, start_in_b, length)`. Among equally long matches
/// the earliest in `a`, then in `b`, wins.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // lengths[j] = length of the common suffix ending at a[i], b[j]
    let mut lengths = vec![0_usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        let mut prev = 0;
        for (j, cb) in b.iter().enumerate() {
            let cur = lengths[j + 1];
            if ca == cb {
                let run = prev + 1;
                lengths[j + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            } else {
                lengths[j + 1] = 0;
            }
            prev = cur;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert!((similarity_ratio("Bob", "Bob") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn case_and_whitespace_are_normalized() {
        assert!((similarity_ratio("  BOB ", "bob") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert!(similarity_ratio("abc", "xyz").abs() < 1e-9);
    }

    #[test]
    fn both_empty_score_one() {
        assert!((similarity_ratio("", "") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn one_empty_scores_zero() {
        assert!(similarity_ratio("bob", "").abs() < 1e-9);
    }

    #[test]
    fn typo_scores_high() {
        // SequenceMatcher("bobb", "bob").ratio() == 2*3/7
        let score = similarity_ratio("bobb", "Bob");
        assert!((score - 6.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn ratio_is_symmetric() {
        let ab = similarity_ratio("construction", "inspection");
        let ba = similarity_ratio("inspection", "construction");
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn multiple_blocks_are_summed() {
        // "ab" and "ef" match around the gap: M = 4, lengths 6 and 5.
        let score = similarity_ratio("abcdef", "abxef");
        assert!((score - 8.0 / 11.0).abs() < 1e-9);
    }
}
