//! Normalization and similarity primitives shared by title lookup and
//! section-name matching.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

/// Normalize for matching: NFKC + lowercase + alphanumeric only.
///
/// NFKC folds full-width latin and full-width punctuation, so "（医疗）"
/// and "(医疗)" normalize identically; the alphanumeric filter then drops
/// the brackets entirely. CJK ideographs count as alphanumeric and survive.
pub fn normalized(s: &str) -> String {
    s.nfkc()
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Like [`normalized`] but keeps single spaces between tokens.
pub fn normalized_with_spaces(s: &str) -> String {
    let folded: String = s.nfkc().collect::<String>().to_lowercase();
    let kept: String = folded
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn tokenset(s: &str) -> HashSet<String> {
    normalized_with_spaces(s)
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

/// Token Jaccard similarity (set-based).
pub fn token_jaccard(a: &str, b: &str) -> f32 {
    let sa = tokenset(a);
    let sb = tokenset(b);
    if sa.is_empty() || sb.is_empty() {
        return 0.0;
    }
    let inter = sa.intersection(&sb).count() as f32;
    let uni = (sa.len() + sb.len()).saturating_sub(inter as usize) as f32;
    if uni == 0.0 {
        0.0
    } else {
        inter / uni
    }
}

/// Character bigram Jaccard similarity. Single-char inputs fall back to
/// unigram sets so one-ideograph queries still score.
pub fn jaccard(a: &str, b: &str) -> f32 {
    let grams = |s: &str| -> HashSet<(char, char)> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() < 2 {
            return chars.iter().map(|&c| (c, '\0')).collect();
        }
        chars.windows(2).map(|w| (w[0], w[1])).collect()
    };
    let sa = grams(a);
    let sb = grams(b);
    if sa.is_empty() || sb.is_empty() {
        return 0.0;
    }
    let inter = sa.intersection(&sb).count() as f32;
    let uni = (sa.len() + sb.len()).saturating_sub(inter as usize) as f32;
    if uni == 0.0 {
        0.0
    } else {
        inter / uni
    }
}

/// Order-preserving containment: every char of `pat` appears in `text`
/// in order.
pub fn is_subsequence(text: &str, pat: &str) -> bool {
    let mut pat_chars = pat.chars().peekable();
    for ch in text.chars() {
        match pat_chars.peek() {
            Some(&p) if p == ch => {
                pat_chars.next();
            }
            Some(_) => {}
            None => return true,
        }
    }
    pat_chars.peek().is_none()
}

/// Fuzzy score of a query against a title and its aliases, in `[0, 1]`.
///
/// All aliases are equally valid match targets. Substring containment
/// dominates the similarity blend; a subsequence hit floors the score so
/// abbreviated queries ("银" for "银灰") still rank above noise.
pub fn title_match_score(title: &str, aliases: &[String], query: &str) -> f32 {
    let nq = normalized(query);
    if nq.is_empty() {
        return 0.0;
    }

    let mut score: f32 = 0.0;
    for target in std::iter::once(title).chain(aliases.iter().map(|s| s.as_str())) {
        let hay = normalized(target);
        if hay.is_empty() {
            continue;
        }
        let s = if hay == nq {
            1.0
        } else if hay.contains(&nq) || nq.contains(&hay) {
            0.9
        } else {
            let mut s = jaccard(&hay, &nq).max(token_jaccard(target, query));
            if s < 0.75 && (is_subsequence(&hay, &nq) || is_subsequence(&nq, &hay)) {
                s = 0.75;
            }
            s
        };
        score = score.max(s);
    }
    score
}
