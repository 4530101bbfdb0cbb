use crate::domain::{Citation, Context, ContextEntry, SentenceHit};
use crate::rank::compare_sentence_hits;

pub const DEFAULT_CHAR_BUDGET: usize = 2400;
const ELLIPSIS: &str = "...";

/// Orders ranked sentences and packs them into a character budget.
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    char_budget: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_CHAR_BUDGET)
    }
}

impl ContextAssembler {
    pub fn new(char_budget: usize) -> Self {
        Self { char_budget }
    }

    /// Entries are appended in descending score order while the running total fits.
    /// The first entry is always kept, truncated if it alone exceeds the budget.
    pub fn assemble(&self, sentences: &[SentenceHit]) -> Context {
        let mut ordered: Vec<&SentenceHit> = sentences.iter().collect();
        ordered.sort_by(|a, b| compare_sentence_hits(a, b));

        let mut entries: Vec<ContextEntry> = Vec::new();
        let mut used = 0usize;
        for s in ordered {
            let len = s.text.chars().count();
            let text = if entries.is_empty() && len > self.char_budget {
                truncate_chars(&s.text, self.char_budget)
            } else if used + len <= self.char_budget {
                s.text.clone()
            } else {
                break;
            };
            used += text.chars().count();
            entries.push(ContextEntry {
                index: entries.len() as u32 + 1,
                text,
                score: s.score,
                citation: Citation {
                    chunk_id: s.chunk_id,
                    source: s.source.clone(),
                    page: s.page,
                },
            });
        }

        tracing::debug!(entries = entries.len(), chars = used, "context assembled");
        Context { entries }
    }
}

/// Cut `text` to at most `max_chars` chars including a trailing `...`.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
