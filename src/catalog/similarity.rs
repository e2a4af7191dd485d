//! String Similarity
//!
//! Case-insensitive Levenshtein similarity used to suggest the closest known
//! node type for a typo.

/// Minimum score a candidate must exceed to be suggested
pub const SUGGESTION_THRESHOLD: f64 = 0.6;

/// Levenshtein edit distance between two strings, counted in chars.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rows of the DP table are enough: row i-1 and row i.
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Similarity score in `0.0..=1.0`, ignoring case.
///
/// Two empty strings are a perfect match.
pub fn similarity(a: &str, b: &str) -> f64 {
    similarity_lowercased(&a.to_lowercase(), &b.to_lowercase())
}

/// Score two strings that are already lowercase.
fn similarity_lowercased(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    1.0 - distance as f64 / max_len as f64
}

/// Find the candidate most similar to `query`.
///
/// Only scores strictly above [`SUGGESTION_THRESHOLD`] qualify; on ties the
/// first candidate wins.
pub fn best_match<'a, I>(query: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = query.to_lowercase();
    let mut best: Option<(&'a str, f64)> = None;

    for candidate in candidates {
        let score = similarity_lowercased(&query, &candidate.to_lowercase());
        if score <= SUGGESTION_THRESHOLD {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }

    best.map(|(candidate, _)| candidate)
}
