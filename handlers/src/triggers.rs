//! Quiz-start trigger words.

use quizbot_core::{contains_phrase, normalize};

/// Start synonyms in the supported languages, already normalized (no diacritics).
pub const BUILTIN_START_TRIGGERS: &[&str] = &[
    // en
    "start", "quiz", "begin", "play",
    // es
    "empezar", "comenzar", "iniciar", "jugar",
    // pt
    "comecar",
    // fr
    "commencer", "demarrer", "jouer",
    // de
    "starten", "anfangen", "spielen",
    // it
    "inizia", "iniziare", "gioca",
];

/// How a trigger must occur in the normalized message text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerMatch {
    /// The trigger is a substring of the text, so "startquiz" matches "start".
    #[default]
    Substring,
    /// The trigger's words occur as a contiguous run of whole words, so "display" does not match "play".
    WholeWords,
}

/// A message starts the quiz when one of the triggers occurs in its normalized text.
#[derive(Debug, Clone)]
pub struct StartTriggers {
    triggers: Vec<String>,
    mode: TriggerMatch,
}

impl Default for StartTriggers {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StartTriggers {
    pub fn builtin() -> Self {
        Self {
            triggers: BUILTIN_START_TRIGGERS.iter().map(|t| t.to_string()).collect(),
            mode: TriggerMatch::default(),
        }
    }

    /// Built-in set plus `extra`; blanks and repeats are dropped.
    pub fn with_additions<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::builtin();
        for t in extra {
            let t = normalize(t.as_ref());
            if !t.is_empty() && !set.triggers.contains(&t) {
                set.triggers.push(t);
            }
        }
        set
    }

    pub fn with_mode(mut self, mode: TriggerMatch) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> TriggerMatch {
        self.mode
    }

    pub fn matches(&self, text: &str) -> bool {
        match self.mode {
            TriggerMatch::Substring => {
                let text = normalize(text);
                !text.is_empty() && self.triggers.iter().any(|t| text.contains(t.as_str()))
            }
            TriggerMatch::WholeWords => self.triggers.iter().any(|t| contains_phrase(text, t)),
        }
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }
}
