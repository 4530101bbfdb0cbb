/// Fixed stopword set, sorted for binary search.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "can", "do", "does", "for", "from",
    "have", "how", "i", "in", "is", "it", "me", "my", "of", "on", "or", "that", "the", "their",
    "this", "to", "was", "what", "when", "where", "which", "who", "why", "will", "with", "you",
    "your",
];

/// Tokens shorter than this (in chars) are dropped.
pub const MIN_TOKEN_CHARS: usize = 2;

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Lowercase, strip punctuation and stopwords, keep order and duplicates.
///
/// Used for queries, chunk text (lexical index) and sentences (ranking), so all three
/// agree on what a token is.
pub fn normalize(raw: &str) -> Vec<String> {
    let lowered = raw.to_lowercase();
    let mut out = Vec::new();
    for piece in lowered.split(|c: char| !c.is_alphanumeric()) {
        if piece.chars().count() < MIN_TOKEN_CHARS || is_stopword(piece) {
            continue;
        }
        out.push(piece.to_string());
    }
    out
}

/// `token` followed by its plural and gerund stems (`-ies` → `-y`, `-es`, `-s`, `-ing`
/// with and without a trailing `e`). Stems shorter than 3 chars or in the stopword set
/// are skipped.
pub fn suffix_variants(token: &str) -> Vec<String> {
    let mut out = vec![token.to_string()];
    let len = token.chars().count();
    let mut push = |v: String| {
        if v.chars().count() > 2 && !is_stopword(&v) && !out.contains(&v) {
            out.push(v);
        }
    };

    if len > 3 {
        if let Some(stem) = token.strip_suffix("ies") {
            push(format!("{stem}y"));
        }
    }
    if len > 4 {
        if let Some(stem) = token.strip_suffix("es") {
            push(stem.to_string());
        }
    }
    if len > 3 {
        if let Some(stem) = token.strip_suffix('s') {
            push(stem.to_string());
        }
    }
    if len > 4 {
        if let Some(stem) = token.strip_suffix("ing") {
            push(stem.to_string());
            if !stem.ends_with('e') {
                push(format!("{stem}e"));
            }
        }
    }
    out
}
