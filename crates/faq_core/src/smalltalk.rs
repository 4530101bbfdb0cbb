//! Canned replies for greetings, farewells and queries too short to search.

use crate::domain::{Answer, AnswerKind, Confidence};

const GREETINGS: &[&str] = &[
    "good afternoon",
    "good evening",
    "good morning",
    "greetings",
    "hello",
    "hey",
    "hi",
];

const FAREWELLS: &[&str] = &["bye", "goodbye", "see you", "thank you", "thanks"];

// Words allowed around a greeting or farewell without turning it into a question.
const FILLER: &[&str] = &["a", "again", "all", "lot", "so", "much", "there", "very"];

pub const GREETING_REPLY: &str = "Hello! I'm your Academic FAQ Assistant. I can help you with questions about academic policies, \
deadlines, course registration, and university procedures. What would you like to know?";

pub const FAREWELL_REPLY: &str = "Thank you for using the Academic FAQ Assistant! Feel free to ask me any academic questions anytime. \
Have a great day!";

pub const TOO_SHORT_REPLY: &str = "Please ask a specific question about academic policies or procedures.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallTalk {
    TooShort,
    Greeting,
    Farewell,
}

impl SmallTalk {
    /// Classify a raw query. A message counts as small talk only when nothing but
    /// greeting/farewell phrases and filler words remain, so "hi, when is the exam?" is
    /// still searched.
    pub fn detect(raw: &str) -> Option<Self> {
        if raw.chars().filter(|c| !c.is_whitespace()).count() < 2 {
            return Some(SmallTalk::TooShort);
        }

        let words: Vec<String> = raw
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        if words.is_empty() {
            return None;
        }

        let mut greeting = false;
        let mut farewell = false;
        let mut i = 0;
        'outer: while i < words.len() {
            for (phrases, flag) in [(GREETINGS, &mut greeting), (FAREWELLS, &mut farewell)] {
                if let Some(n) = match_phrase(&words[i..], phrases) {
                    *flag = true;
                    i += n;
                    continue 'outer;
                }
            }
            if FILLER.contains(&words[i].as_str()) {
                i += 1;
                continue;
            }
            return None;
        }

        match (greeting, farewell) {
            (_, true) => Some(SmallTalk::Farewell),
            (true, false) => Some(SmallTalk::Greeting),
            (false, false) => None,
        }
    }

    pub fn reply(self) -> &'static str {
        match self {
            SmallTalk::TooShort => TOO_SHORT_REPLY,
            SmallTalk::Greeting => GREETING_REPLY,
            SmallTalk::Farewell => FAREWELL_REPLY,
        }
    }

    pub fn answer(self) -> Answer {
        Answer {
            text: self.reply().to_string(),
            sources: Vec::new(),
            confidence: Confidence::High,
            top_score: None,
            kind: AnswerKind::SmallTalk,
        }
    }
}

/// Number of words consumed when `words` starts with one of `phrases`.
fn match_phrase(words: &[String], phrases: &[&str]) -> Option<usize> {
    phrases
        .iter()
        .map(|p| p.split(' ').collect::<Vec<_>>())
        .filter(|parts| parts.len() <= words.len())
        .filter(|parts| parts.iter().zip(words).all(|(p, w)| *p == w.as_str()))
        .map(|parts| parts.len())
        .max()
}
