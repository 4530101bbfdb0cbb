/// Lowercased abbreviations (without the trailing period) that never end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "approx", "apr", "assoc", "aug", "ave", "co", "corp", "dec", "dept", "dr", "e.g", "etc",
    "feb", "fig", "i.e", "inc", "jan", "jr", "jul", "jun", "mar", "mr", "mrs", "ms", "nov", "oct",
    "prof", "rd", "sep", "sept", "sr", "st", "vs",
];

fn is_abbreviation(word: &str) -> bool {
    let w = word
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    if w.is_empty() {
        return false;
    }
    // Single-letter initials: "J. Smith".
    if w.chars().count() == 1 && w.chars().all(char::is_alphabetic) {
        return true;
    }
    ABBREVIATIONS.binary_search(&w.as_str()).is_ok()
}

/// Split text into sentences.
///
/// A boundary is `.`, `?` or `!` (optionally followed by closing quotes/brackets), then
/// whitespace, then an uppercase letter, possibly behind an opening quote or bracket.
/// A period ending a known abbreviation or an initial is not a boundary.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = Vec::new();
    // Byte offset where the current sentence starts.
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if !matches!(c, '.' | '?' | '!') {
            i += 1;
            continue;
        }

        // Absorb runs like "?!" and closing punctuation.
        let mut end = i + 1;
        while end < chars.len()
            && matches!(chars[end].1, '.' | '?' | '!' | '"' | '\'' | ')' | ']' | '”' | '’')
        {
            end += 1;
        }

        let mut next = end;
        while next < chars.len() && chars[next].1.is_whitespace() {
            next += 1;
        }
        let saw_space = next > end;
        let mut probe = next;
        while probe < chars.len()
            && matches!(chars[probe].1, '"' | '\'' | '(' | '[' | '“' | '‘')
        {
            probe += 1;
        }
        let starts_upper = probe < chars.len() && chars[probe].1.is_uppercase();

        let boundary = saw_space
            && starts_upper
            && !(c == '.' && is_abbreviation(word_before(&text[start..pos])));

        if boundary {
            let byte_end = if end < chars.len() { chars[end].0 } else { text.len() };
            push_trimmed(&mut out, &text[start..byte_end]);
            start = if next < chars.len() { chars[next].0 } else { text.len() };
        }
        i = end;
    }

    if start < text.len() {
        push_trimmed(&mut out, &text[start..]);
    }
    out
}

fn word_before(head: &str) -> &str {
    match head.rfind(char::is_whitespace) {
        Some(ws) => head[ws..].trim_start(),
        None => head,
    }
}

fn push_trimmed(out: &mut Vec<String>, s: &str) {
    let t = s.trim();
    if !t.is_empty() {
        out.push(t.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviations_are_sorted() {
        let mut sorted = ABBREVIATIONS.to_vec();
        sorted.sort();
        assert_eq!(sorted, ABBREVIATIONS.to_vec());
    }

    #[test]
    fn splits_on_terminal_punctuation_before_capital() {
        let got = split_sentences("Library hours are 9 to 5. Is it open Sunday? No! It is closed.");
        assert_eq!(
            got,
            vec![
                "Library hours are 9 to 5.",
                "Is it open Sunday?",
                "No!",
                "It is closed."
            ]
        );
    }

    #[test]
    fn does_not_split_after_abbreviations_or_initials() {
        let got = split_sentences(
            "Contact Dr. Rao in Room 4. Forms, e.g. Form A, go to J. Smith at the registrar.",
        );
        assert_eq!(
            got,
            vec![
                "Contact Dr. Rao in Room 4.",
                "Forms, e.g. Form A, go to J. Smith at the registrar."
            ]
        );
    }

    #[test]
    fn does_not_split_before_lowercase_or_digits() {
        let text = "Fees are approx. three hundred. the rest is waived. 2025 rules apply.";
        let got = split_sentences(text);
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn a_bare_no_answer_ends_its_sentence() {
        let text = "Is late work accepted? No. Late work is rejected. See form No. 5 first.";
        let got = split_sentences(text);
        assert_eq!(
            got,
            vec![
                "Is late work accepted?",
                "No.",
                "Late work is rejected.",
                "See form No. 5 first."
            ]
        );
    }

    #[test]
    fn handles_quotes_and_trailing_text_without_punctuation() {
        let got = split_sentences("He said \"Pay by Friday.\" \"Late fees apply\" and more");
        assert_eq!(got, vec!["He said \"Pay by Friday.\"", "\"Late fees apply\" and more"]);
    }

    #[test]
    fn keeps_non_ascii_content_intact() {
        let got = split_sentences("Late book returns incur a ₹5 per day fine. Pay at the desk.");
        assert_eq!(
            got,
            vec!["Late book returns incur a ₹5 per day fine.", "Pay at the desk."]
        );
    }

    #[test]
    fn empty_text_has_no_sentences() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   ").is_empty());
    }
}
