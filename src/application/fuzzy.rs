//! Fuzzy text similarity on a 0-100 scale.
//!
//! Scores are weighted combinations of a diff-based ratio computed over the
//! whole strings, the best-aligned substring, and sorted or de-duplicated
//! token sets, so that `alice` scores high against `Alice Smith +1555...`.

use similar::TextDiff;

use crate::domain::Contact;

/// Minimum similarity for a contact to survive a search.
pub const MATCH_THRESHOLD: u8 = 60;

const UNBASE_SCALE: f64 = 0.95;
const PARTIAL_SCALE: f64 = 0.90;
const LONG_PARTIAL_SCALE: f64 = 0.60;

/// Weighted similarity between a query and a candidate, 0-100.
#[must_use]
pub fn similarity(query: &str, candidate: &str) -> u8 {
    let a = normalize(query);
    let b = normalize(candidate);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let base = ratio(&a, &b);

    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    let (shorter, longer) = (a_len.min(b_len), a_len.max(b_len));
    #[allow(clippy::cast_precision_loss)]
    let len_ratio = longer as f64 / shorter as f64;

    let best = if len_ratio < 1.5 {
        let sorted = token_sort_ratio(&a, &b, false) * UNBASE_SCALE;
        let set = token_set_ratio(&a, &b, false) * UNBASE_SCALE;
        base.max(sorted).max(set)
    } else {
        let scale = if len_ratio > 8.0 {
            LONG_PARTIAL_SCALE
        } else {
            PARTIAL_SCALE
        };
        let partial = partial_ratio(&a, &b) * scale;
        let sorted = token_sort_ratio(&a, &b, true) * UNBASE_SCALE * scale;
        let set = token_set_ratio(&a, &b, true) * UNBASE_SCALE * scale;
        base.max(partial).max(sorted).max(set)
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = best.round().clamp(0.0, 100.0) as u8;
    score
}

/// Contacts scoring at or above [`MATCH_THRESHOLD`], best first.
///
/// Ties keep the original list order.
#[must_use]
pub fn rank_contacts(query: &str, contacts: &[Contact]) -> Vec<(Contact, u8)> {
    let mut ranked: Vec<(Contact, u8)> = contacts
        .iter()
        .map(|c| (c.clone(), similarity(query, &c.search_text())))
        .filter(|(_, score)| *score >= MATCH_THRESHOLD)
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Lowercases, turns non-alphanumerics into spaces, trims.
fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();
    mapped.trim().to_string()
}

/// `SequenceMatcher`-style ratio scaled to 0-100.
fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    f64::from(TextDiff::from_chars(a, b).ratio()) * 100.0
}

/// Best ratio of the shorter string against any equal-length window of the longer.
fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let width = short.chars().count();
    if width == 0 {
        return 0.0;
    }

    let mut bounds: Vec<usize> = long.char_indices().map(|(i, _)| i).collect();
    bounds.push(long.len());

    bounds
        .windows(width + 1)
        .map(|w| ratio(short, &long[w[0]..w[width]]))
        .fold(0.0, f64::max)
}

fn sorted_tokens(text: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens
}

fn score_pair(a: &str, b: &str, partial: bool) -> f64 {
    if partial {
        partial_ratio(a, b)
    } else {
        ratio(a, b)
    }
}

fn token_sort_ratio(a: &str, b: &str, partial: bool) -> f64 {
    score_pair(
        &sorted_tokens(a).join(" "),
        &sorted_tokens(b).join(" "),
        partial,
    )
}

fn token_set_ratio(a: &str, b: &str, partial: bool) -> f64 {
    let mut left = sorted_tokens(a);
    let mut right = sorted_tokens(b);
    left.dedup();
    right.dedup();

    let common: Vec<&str> = left.iter().copied().filter(|t| right.contains(t)).collect();
    let only_left: Vec<&str> = left.iter().copied().filter(|t| !common.contains(t)).collect();
    let only_right: Vec<&str> = right.iter().copied().filter(|t| !common.contains(t)).collect();

    let base = common.join(" ");
    let join = |rest: &[&str]| {
        if base.is_empty() {
            rest.join(" ")
        } else if rest.is_empty() {
            base.clone()
        } else {
            format!("{base} {}", rest.join(" "))
        }
    };
    let combined_left = join(&only_left);
    let combined_right = join(&only_right);

    let mut best = score_pair(&combined_left, &combined_right, partial);
    if !base.is_empty() {
        best = best
            .max(score_pair(&base, &combined_left, partial))
            .max(score_pair(&base, &combined_right, partial));
    }
    best
}
