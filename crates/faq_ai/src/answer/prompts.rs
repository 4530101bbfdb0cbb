use faq_core::domain::Context;

/// Numbered context entries, each tagged with its chunk marker and citation label.
pub fn context_blocks(context: &Context) -> String {
    let blocks: Vec<String> = context
        .entries
        .iter()
        .map(|e| {
            format!(
                "{}. [[chunk:{}]] ({})\n{}",
                e.index,
                e.citation.chunk_id,
                e.citation.label(),
                e.text
            )
        })
        .collect();
    blocks.join("\n\n")
}

pub fn answer_prompt(
    question: &str,
    context_blocks: &str,
    min_words: u32,
    max_words: u32,
) -> String {
    format!(
        r#"You are a campus FAQ assistant answering a student's question from the official handbook.

Rules (non-negotiable):
1) Use ONLY the numbered context entries below. Do not invent policies, dates, amounts or contacts.
2) Cite supporting entries inline with their marker in the form [[chunk:<id>]], using only ids listed below.
3) If the context does not answer the question, say so plainly and suggest contacting the relevant office.
4) Write between {min_words} and {max_words} words in plain prose.

Question:
{question}

Context:
{context_blocks}

Answer:
"#
    )
}
