use log::{info, warn};

use crate::error::{DeepqError, Result};

/// Minimum similarity for the fuzzy fallback to accept a match.
const FUZZY_THRESHOLD: f32 = 0.6;

/// Resolve a query against the available names: exact match, then unique
/// prefix, then closest fuzzy match above the threshold.
pub fn resolve<'a>(query: &str, choices: &[&'a str]) -> Result<&'a str> {
    if let Some(&exact) = choices.iter().find(|&&c| c == query) {
        return Ok(exact);
    }

    let prefix_matches: Vec<&str> = choices
        .iter()
        .copied()
        .filter(|c| c.starts_with(query))
        .collect();
    match prefix_matches.len() {
        1 => {
            info!("Auto-completed '{}' to '{}'", query, prefix_matches[0]);
            return Ok(prefix_matches[0]);
        }
        0 => {}
        _ => {
            return Err(DeepqError::AmbiguousTask {
                name: query.to_string(),
                candidates: prefix_matches.join(", "),
            });
        }
    }

    let best = choices
        .iter()
        .copied()
        .map(|c| (similarity(query, c), c))
        .max_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if let Some((score, candidate)) = best {
        if score >= FUZZY_THRESHOLD {
            warn!("Task '{}' not found. Assuming '{}'.", query, candidate);
            return Ok(candidate);
        }
    }

    Err(DeepqError::UnknownTask {
        name: query.to_string(),
        available: choices.join(", "),
    })
}

/// Normalized similarity in [0, 1] based on edit distance.
fn similarity(a: &str, b: &str) -> f32 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f32 / longest as f32
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert!(similarity("abc", "xyz") <= 0.0 + f32::EPSILON);
    }
}
