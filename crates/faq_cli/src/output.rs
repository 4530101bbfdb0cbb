//! Human-readable and JSON renderings of answers, hits and stats.

use faq_ai::hybrid::{RetrievalOutcome, RetrievalState};
use faq_core::domain::{Answer, RetrievalHit, Strategy};
use faq_core::knowledge::{KnowledgeBase, KnowledgeBaseStats};
use serde::Serialize;

const SNIPPET_MAX_CHARS: usize = 160;

#[derive(Serialize)]
struct AnswerOutput<'a> {
    question: &'a str,
    #[serde(flatten)]
    answer: &'a Answer,
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    state: RetrievalState,
    top_score: Option<f32>,
    hits: Vec<HitOutput<'a>>,
}

#[derive(Serialize)]
struct HitOutput<'a> {
    #[serde(flatten)]
    hit: &'a RetrievalHit,
    source: Option<&'a str>,
    page: Option<u32>,
    snippet: String,
}

pub fn answer_json_line(question: &str, answer: &Answer) -> String {
    serde_json::to_string(&AnswerOutput { question, answer }).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_answer(question: &str, answer: &Answer, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(&AnswerOutput { question, answer })
            .unwrap_or_else(|_| "{}".to_string());
    }
    let mut out = answer.text.clone();
    if !answer.sources.is_empty() && !out.contains("Sources:") {
        let labels: Vec<String> = answer.sources.iter().map(|c| c.label()).collect();
        out.push_str("\n\nSources: ");
        out.push_str(&labels.join(", "));
    }
    out
}

pub fn format_search(
    query: &str,
    outcome: &RetrievalOutcome,
    kb: &KnowledgeBase,
    json: bool,
) -> String {
    let hits: Vec<HitOutput> = outcome
        .hits
        .iter()
        .map(|hit| {
            let chunk = kb.get(hit.chunk_id);
            HitOutput {
                hit,
                source: chunk.map(|c| c.source.as_str()),
                page: chunk.and_then(|c| c.page),
                snippet: chunk
                    .map(|c| truncate_text(&c.text, SNIPPET_MAX_CHARS))
                    .unwrap_or_default(),
            }
        })
        .collect();

    if json {
        let out = SearchOutput {
            query,
            state: outcome.state,
            top_score: outcome.top_score,
            hits,
        };
        return serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string());
    }

    if hits.is_empty() {
        return format!("No results found for \"{query}\"");
    }
    let mut out = format!(
        "{} hit{} for \"{}\" ({:?}):\n\n",
        hits.len(),
        if hits.len() == 1 { "" } else { "s" },
        query,
        outcome.state
    );
    for h in &hits {
        let strategy = match h.hit.strategy {
            Strategy::Vector => "vector",
            Strategy::Lexical => "lexical",
        };
        out.push_str(&format!(
            "{}. chunk {} (score: {:.3}, {})\n",
            h.hit.rank + 1,
            h.hit.chunk_id,
            h.hit.score,
            strategy
        ));
        if let Some(source) = h.source {
            match h.page {
                Some(p) => out.push_str(&format!("   {source}, p. {p}\n")),
                None => out.push_str(&format!("   {source}\n")),
            }
        }
        out.push_str(&format!("   {}\n\n", h.snippet));
    }
    out.trim_end().to_string()
}

pub fn format_stats(stats: &KnowledgeBaseStats, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(stats).unwrap_or_else(|_| "{}".to_string());
    }
    format!(
        "chunks: {}\ndims: {}\nvocabulary: {}\nsources ({}):\n{}",
        stats.chunk_count,
        stats.dims,
        stats.vocabulary_size,
        stats.sources.len(),
        stats
            .sources
            .iter()
            .map(|s| format!("  - {s}"))
            .collect::<Vec<_>>()
            .join("\n")
    )
}

fn truncate_text(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut s: String = text.chars().take(max_chars).collect();
    s.push_str("...");
    s
}
