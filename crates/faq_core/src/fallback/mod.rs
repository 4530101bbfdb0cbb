//! Deterministic answers that never depend on the generation collaborator.

use crate::domain::{Answer, AnswerKind, Confidence, Context};

pub const INSUFFICIENT_INFORMATION: &str = "After reviewing the handbook, I couldn't locate a dedicated section on that topic. \
Please connect with the academic office for the latest guidance, and I can help search the handbook with different wording if you'd like.";

/// The fixed answer for queries with no usable context. Carries no sources.
pub fn insufficient_answer(top_score: Option<f32>) -> Answer {
    Answer {
        text: INSUFFICIENT_INFORMATION.to_string(),
        sources: Vec::new(),
        confidence: Confidence::Low,
        top_score,
        kind: AnswerKind::InsufficientContext,
    }
}

/// Render `context` as an intro line, one bullet per entry with an inline citation,
/// and a de-duplicated `Sources:` line.
///
/// Returns the insufficient-information text when the context is empty.
pub fn format_fallback(raw_query: &str, context: &Context) -> String {
    if context.is_empty() {
        return INSUFFICIENT_INFORMATION.to_string();
    }

    let mut sections: Vec<String> = vec![intro_line(raw_query)];

    let bullets: Vec<String> = context
        .entries
        .iter()
        .map(|e| format!("- {} ({})", e.text.trim(), e.citation.label()))
        .collect();
    sections.push(bullets.join("\n"));

    let mut labels: Vec<String> = Vec::new();
    for c in context.citations() {
        let label = c.label();
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    sections.push(format!("Sources: {}", labels.join(", ")));

    sections.join("\n\n")
}

fn intro_line(raw_query: &str) -> String {
    let cleaned = raw_query.trim().trim_end_matches(['?', '!', '.']).trim_end();
    if cleaned.is_empty() {
        "Here's what the handbook clarifies about your question:".to_string()
    } else {
        format!("Here's what the handbook clarifies about \"{cleaned}\":")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Citation, ContextEntry};
    use pretty_assertions::assert_eq;

    fn entry(index: u32, text: &str, chunk_id: u64, page: Option<u32>) -> ContextEntry {
        ContextEntry {
            index,
            text: text.to_string(),
            score: 0.5,
            citation: Citation {
                chunk_id,
                source: "Student Handbook".to_string(),
                page,
            },
        }
    }

    #[test]
    fn formats_bullets_with_inline_citations_and_sources() {
        let ctx = Context {
            entries: vec![
                entry(1, "Late book returns incur a fine of ₹5 per day.", 2, Some(14)),
                entry(2, "Fines are billed to the student account.", 2, Some(14)),
                entry(3, "Library hours are posted online.", 1, None),
            ],
        };
        let text = format_fallback("What is the library fine for late books?", &ctx);
        assert_eq!(
            text,
            "Here's what the handbook clarifies about \"What is the library fine for late books\":\n\n\
- Late book returns incur a fine of ₹5 per day. (Student Handbook, p. 14)\n\
- Fines are billed to the student account. (Student Handbook, p. 14)\n\
- Library hours are posted online. (Student Handbook)\n\n\
Sources: Student Handbook, p. 14, Student Handbook"
        );
    }

    #[test]
    fn empty_context_yields_insufficient_text() {
        assert_eq!(format_fallback("anything", &Context::default()), INSUFFICIENT_INFORMATION);
        let a = insufficient_answer(Some(0.1));
        assert!(a.sources.is_empty());
        assert_eq!(a.kind, AnswerKind::InsufficientContext);
        assert_eq!(a.confidence, Confidence::Low);
    }

    #[test]
    fn intro_handles_punctuation_only_queries() {
        let ctx = Context {
            entries: vec![entry(1, "Office hours run daily.", 1, None)],
        };
        assert!(format_fallback("???", &ctx)
            .starts_with("Here's what the handbook clarifies about your question:"));
    }
}
