use std::collections::BTreeMap;

use super::normalize::normalize;

/// Built-in academic-domain synonyms. Keys may be multi-word phrases.
const BUILTIN_SYNONYMS: &[(&str, &[&str])] = &[
    ("financial aid", &["scholarship", "tuition assistance", "fafsa", "aid"]),
    ("scholarship", &["financial aid", "tuition assistance"]),
    ("aid", &["financial aid"]),
    ("drop course", &["withdraw", "course withdrawal"]),
    ("drop", &["withdraw"]),
    ("withdraw", &["drop", "course withdrawal"]),
    ("register", &["enroll", "registration"]),
    ("registration", &["enroll", "course sign up"]),
    ("academic calendar", &["term dates", "important dates", "schedule"]),
    ("advisor", &["counselor", "academic advisor"]),
    ("counselor", &["advisor"]),
    ("library", &["media center", "learning commons"]),
    ("library hours", &["library schedule", "opening hours"]),
    ("health services", &["wellness", "nurse", "medical services"]),
    ("health", &["wellness"]),
    ("student id", &["identification card", "id card"]),
    ("parking", &["vehicle parking", "permit"]),
    ("refund", &["tuition refund", "reimbursement"]),
    ("exam", &["assessment", "test"]),
    ("transcript", &["academic record", "official record"]),
    ("fine", &["penalty", "fee"]),
    ("fee", &["charge", "payment"]),
];

/// Static phrase → related-terms mapping, built once and never mutated afterwards.
///
/// Keys and terms are stored in normalized token form, so lookups compare against the
/// output of [`normalize`].
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    // Key: normalized phrase tokens joined by a single space.
    entries: BTreeMap<String, Vec<Vec<String>>>,
    max_phrase_len: usize,
}

impl SynonymTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (phrase, terms) in BUILTIN_SYNONYMS {
            table.insert(phrase, terms.iter().copied());
        }
        table
    }

    /// Built-in table extended with configured entries. Configured terms for an existing
    /// key are appended after the built-in ones.
    pub fn with_extra<'a, I, T>(extra: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, T)>,
        T: IntoIterator<Item = &'a String>,
    {
        let mut table = Self::builtin();
        for (phrase, terms) in extra {
            table.insert(phrase, terms.into_iter().map(String::as_str));
        }
        table
    }

    fn insert<'a>(&mut self, phrase: &str, terms: impl IntoIterator<Item = &'a str>) {
        let key_tokens = normalize(phrase);
        if key_tokens.is_empty() {
            return;
        }
        self.max_phrase_len = self.max_phrase_len.max(key_tokens.len());
        let slot = self.entries.entry(key_tokens.join(" ")).or_default();
        for term in terms {
            let term_tokens = normalize(term);
            if !term_tokens.is_empty() && !slot.contains(&term_tokens) {
                slot.push(term_tokens);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, window: &[String]) -> Option<&Vec<Vec<String>>> {
        self.entries.get(&window.join(" "))
    }

    /// Append related terms for every phrase found in `tokens`.
    ///
    /// At each position phrases are tried longest first. Original tokens are kept in
    /// place; appended tokens are unique and never repeat an existing token.
    pub fn expand(&self, tokens: &[String]) -> Vec<String> {
        let mut out: Vec<String> = tokens.to_vec();
        if self.entries.is_empty() {
            return out;
        }

        for start in 0..tokens.len() {
            let longest = self.max_phrase_len.min(tokens.len() - start);
            for len in (1..=longest).rev() {
                let Some(related) = self.lookup(&tokens[start..start + len]) else {
                    continue;
                };
                for term in related {
                    for tok in term {
                        if !out.contains(tok) {
                            out.push(tok.clone());
                        }
                    }
                }
            }
        }
        out
    }
}
