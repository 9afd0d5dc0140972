//! Voice command interpretation
//!
//! Maps a transcript to an action. Pure, case-insensitive substring
//! matching over a fixed-order rule list; unmatched input always resolves
//! to the fallback response, never a failure.

/// Action resolved from a transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Play the named clip from the catalog
    PlayClip(String),
    /// Show and speak the fallback text
    Respond(String),
}

/// One keyword rule: any listed substring triggers the clip
#[derive(Debug, Clone)]
struct Rule {
    keywords: Vec<String>,
    clip: String,
}

/// Maps transcripts to actions; first matching rule wins
#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    rules: Vec<Rule>,
    fallback: String,
}

impl CommandInterpreter {
    /// Create an interpreter with the built-in command set
    ///
    /// `fallback` is the response for transcripts matching no rule.
    #[must_use]
    pub fn new(fallback: impl Into<String>) -> Self {
        let mut interpreter = Self {
            rules: Vec::new(),
            fallback: fallback.into(),
        };
        interpreter.push_rule(&["SALÚDANOS"], "amy_1");
        // Accent-insensitive variants: recognition output is not reliable
        // about diacritics
        interpreter.push_rule(&["PLATÍCANOS", "PLATICANOS"], "amy_2");
        interpreter.push_rule(&["CONTINÚA", "CONTINUA"], "amy_3");
        interpreter
    }

    /// Append a keyword rule, evaluated after the existing rules
    pub fn push_rule(&mut self, keywords: &[&str], clip: impl Into<String>) {
        self.rules.push(Rule {
            keywords: keywords.iter().map(|k| k.to_uppercase()).collect(),
            clip: clip.into(),
        });
    }

    /// Resolve `transcript` to an action
    ///
    /// Matching is case-insensitive and position-independent; rules are
    /// evaluated in insertion order and the first match wins.
    #[must_use]
    pub fn interpret(&self, transcript: &str) -> Action {
        let normalized = transcript.to_uppercase();
        for rule in &self.rules {
            if rule.keywords.iter().any(|k| normalized.contains(k.as_str())) {
                return Action::PlayClip(rule.clip.clone());
            }
        }
        Action::Respond(self.fallback.clone())
    }

    /// The configured fallback text
    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpreter() -> CommandInterpreter {
        CommandInterpreter::new("fallback text")
    }

    #[test]
    fn keyword_matches_anywhere_in_transcript() {
        assert_eq!(
            interpreter().interpret("ME PUEDES SALÚDANOS POR FAVOR"),
            Action::PlayClip("amy_1".to_string())
        );
    }

    #[test]
    fn unmatched_transcript_falls_back() {
        assert_eq!(
            interpreter().interpret("HOLA"),
            Action::Respond("fallback text".to_string())
        );
    }

    #[test]
    fn accent_insensitive_variants() {
        assert_eq!(
            interpreter().interpret("PLATICANOS ALGO"),
            Action::PlayClip("amy_2".to_string())
        );
        assert_eq!(
            interpreter().interpret("PLATÍCANOS ALGO"),
            Action::PlayClip("amy_2".to_string())
        );
        assert_eq!(
            interpreter().interpret("CONTINUA"),
            Action::PlayClip("amy_3".to_string())
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            interpreter().interpret("salúdanos"),
            Action::PlayClip("amy_1".to_string())
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        assert_eq!(
            interpreter().interpret("SALÚDANOS Y CONTINÚA"),
            Action::PlayClip("amy_1".to_string())
        );
    }

    #[test]
    fn extra_rules_evaluated_after_builtins() {
        let mut interpreter = interpreter();
        interpreter.push_rule(&["despídete"], "amy_4");
        assert_eq!(
            interpreter.interpret("DESPÍDETE YA"),
            Action::PlayClip("amy_4".to_string())
        );
    }
}
