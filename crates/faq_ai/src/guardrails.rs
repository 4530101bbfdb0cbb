use std::collections::BTreeSet;

use faq_core::domain::Context;
use faq_core::error::{codes, AppError};

/// Validate generated text against the context it was produced from.
///
/// Output must be non-empty, and every `[[chunk:<id>]]` marker must name a chunk that
/// is part of `context`. Violations are reported as `GENERATION_UNAVAILABLE` so callers
/// take the deterministic fallback. Returns the cited ids.
pub fn enforce_citations(output: &str, context: &Context) -> Result<BTreeSet<u64>, AppError> {
    if output.trim().is_empty() {
        return Err(AppError::new(
            codes::GENERATION_UNAVAILABLE,
            "Generated answer was empty",
        ));
    }

    let allowed: BTreeSet<u64> = context.chunk_ids().into_iter().collect();
    let mut cited = BTreeSet::new();
    for raw in extract_cited_chunk_ids(output) {
        let id = raw.parse::<u64>().map_err(|_| {
            AppError::new(codes::GENERATION_UNAVAILABLE, "Answer cited a malformed chunk id")
                .with_details(format!("chunk_id={raw}"))
        })?;
        if !allowed.contains(&id) {
            return Err(AppError::new(
                codes::GENERATION_UNAVAILABLE,
                "Answer cited a chunk outside the provided context",
            )
            .with_details(format!("chunk_id={id}")));
        }
        cited.insert(id);
    }
    Ok(cited)
}

/// Parse `[[chunk:<id>]]` markers.
pub fn extract_cited_chunk_ids(text: &str) -> BTreeSet<String> {
    const OPEN: &str = "[[chunk:";
    let mut out = BTreeSet::new();
    let mut rest = text;
    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        match after_open.find("]]") {
            Some(end) => {
                let id = after_open[..end].trim();
                if !id.is_empty() && !id.contains('[') {
                    out.insert(id.to_string());
                }
                rest = &after_open[end + 2..];
            }
            None => break,
        }
    }
    out
}

/// Remove citation markers so the answer reads cleanly.
pub fn strip_citation_markers(text: &str) -> String {
    const OPEN: &str = "[[chunk:";
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find("]]") else {
            break;
        };
        out.push_str(rest[..start].trim_end_matches(' '));
        rest = &after_open[end + 2..];
    }
    out.push_str(rest);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use faq_core::domain::{Citation, ContextEntry};

    fn context(ids: &[u64]) -> Context {
        Context {
            entries: ids
                .iter()
                .enumerate()
                .map(|(i, id)| ContextEntry {
                    index: i as u32 + 1,
                    text: format!("fact {id}"),
                    score: 0.5,
                    citation: Citation {
                        chunk_id: *id,
                        source: "handbook.pdf".to_string(),
                        page: None,
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn extracts_markers() {
        let ids = extract_cited_chunk_ids("a [[chunk:2]] b [[chunk: 7 ]] c [[chunk:]] [[chunk:9");
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["2", "7"]);
    }

    #[test]
    fn rejects_empty_output_and_foreign_citations() {
        let ctx = context(&[2, 7]);
        assert_eq!(
            enforce_citations("   ", &ctx).unwrap_err().code,
            codes::GENERATION_UNAVAILABLE
        );
        assert!(enforce_citations("Fine is charged [[chunk:99]].", &ctx).is_err());
        assert!(enforce_citations("Fine is charged [[chunk:abc]].", &ctx).is_err());
        let cited = enforce_citations("Fine is charged [[chunk:7]].", &ctx).expect("ok");
        assert_eq!(cited.into_iter().collect::<Vec<_>>(), vec![7]);
        assert!(enforce_citations("No markers at all.", &ctx)
            .expect("ok")
            .is_empty());
    }

    #[test]
    fn strips_markers() {
        assert_eq!(
            strip_citation_markers("The fine is ₹5 per day [[chunk:2]]. Pay online [[chunk:3]]."),
            "The fine is ₹5 per day. Pay online."
        );
    }
}
