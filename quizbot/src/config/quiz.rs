//! Quiz and routing settings: texts, timeouts, dedup window, start triggers, fallback responder.

use anyhow::{Context, Result};
use quiz_engine::InvalidAnswerPolicy;
use std::env;
use std::time::Duration;

pub const DEFAULT_FALLBACK_TEXT: &str =
    "Thanks for your message! Type \"start\" to play the quiz.";
pub const DEFAULT_FAILURE_TEXT: &str =
    "Sorry, something went wrong on our side. Please try again in a moment.";
pub const DEFAULT_NO_QUIZ_TEXT: &str = "There is no quiz available right now.";
pub const DEFAULT_WELCOME_TEXT: &str = "Welcome to the quiz!";
pub const DEFAULT_COMPLETION_TEXT: &str = "Quiz complete! Your score: {score}";

/// OpenAI-compatible endpoint used for dynamic fallback replies.
#[derive(Debug, Clone)]
pub struct LlmFallbackConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub dedup_window: Duration,
    pub storage_timeout: Duration,
    pub fallback_timeout: Duration,
    pub fallback_text: String,
    pub failure_text: String,
    pub no_quiz_text: String,
    pub welcome_text: String,
    pub completion_text: String,
    pub invalid_answer_policy: InvalidAnswerPolicy,
    /// Added to the built-in start triggers.
    pub extra_start_triggers: Vec<String>,
    /// Opt-in: triggers must occur as whole words instead of as substrings.
    pub start_triggers_whole_words: bool,
    pub llm_fallback: Option<LlmFallbackConfig>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            dedup_window: Duration::from_secs(60),
            storage_timeout: Duration::from_millis(5000),
            fallback_timeout: Duration::from_millis(8000),
            fallback_text: DEFAULT_FALLBACK_TEXT.to_string(),
            failure_text: DEFAULT_FAILURE_TEXT.to_string(),
            no_quiz_text: DEFAULT_NO_QUIZ_TEXT.to_string(),
            welcome_text: DEFAULT_WELCOME_TEXT.to_string(),
            completion_text: DEFAULT_COMPLETION_TEXT.to_string(),
            invalid_answer_policy: InvalidAnswerPolicy::default(),
            extra_start_triggers: Vec::new(),
            start_triggers_whole_words: false,
            llm_fallback: None,
        }
    }
}

fn env_text(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_bool(key: &str, default: bool) -> Result<bool> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => anyhow::bail!("{} must be true or false, got '{}'", key, raw),
        },
        Err(_) => Ok(default),
    }
}

fn env_u64(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a non-negative integer, got '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

impl QuizConfig {
    pub fn from_env() -> Result<Self> {
        let invalid_answer_policy = match env::var("INVALID_ANSWER_POLICY") {
            Ok(raw) => raw.parse::<InvalidAnswerPolicy>()?,
            Err(_) => InvalidAnswerPolicy::default(),
        };
        let extra_start_triggers = env::var("START_TRIGGERS")
            .map(|raw| {
                raw.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let llm_fallback = env::var("FALLBACK_LLM_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .map(|base_url| LlmFallbackConfig {
                base_url,
                api_key: env::var("FALLBACK_LLM_API_KEY").ok(),
                model: env_text("FALLBACK_LLM_MODEL", "gpt-4o-mini"),
            });

        Ok(Self {
            dedup_window: Duration::from_secs(env_u64("DEDUP_WINDOW_SECS", 60)?),
            storage_timeout: Duration::from_millis(env_u64("STORAGE_TIMEOUT_MS", 5000)?),
            fallback_timeout: Duration::from_millis(env_u64("FALLBACK_TIMEOUT_MS", 8000)?),
            fallback_text: env_text("FALLBACK_TEXT", DEFAULT_FALLBACK_TEXT),
            failure_text: env_text("FAILURE_TEXT", DEFAULT_FAILURE_TEXT),
            no_quiz_text: env_text("NO_QUIZ_TEXT", DEFAULT_NO_QUIZ_TEXT),
            welcome_text: env_text("QUIZ_WELCOME_TEXT", DEFAULT_WELCOME_TEXT),
            completion_text: env_text("QUIZ_COMPLETION_TEXT", DEFAULT_COMPLETION_TEXT),
            invalid_answer_policy,
            extra_start_triggers,
            start_triggers_whole_words: env_bool("START_TRIGGERS_WHOLE_WORDS", false)?,
            llm_fallback,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.dedup_window.is_zero() {
            anyhow::bail!("DEDUP_WINDOW_SECS must be greater than zero");
        }
        if self.storage_timeout.is_zero() {
            anyhow::bail!("STORAGE_TIMEOUT_MS must be greater than zero");
        }
        if self.fallback_timeout.is_zero() {
            anyhow::bail!("FALLBACK_TIMEOUT_MS must be greater than zero");
        }
        if !self.completion_text.contains("{score}") {
            anyhow::bail!("QUIZ_COMPLETION_TEXT must contain {{score}}");
        }
        // A failure must never read like a normal outcome.
        for (name, other) in [
            ("FALLBACK_TEXT", &self.fallback_text),
            ("QUIZ_COMPLETION_TEXT", &self.completion_text),
            ("NO_QUIZ_TEXT", &self.no_quiz_text),
        ] {
            if self.failure_text.trim() == other.trim() {
                anyhow::bail!("FAILURE_TEXT must differ from {}", name);
            }
        }
        if self.no_quiz_text.trim() == self.completion_text.trim() {
            anyhow::bail!("NO_QUIZ_TEXT must differ from QUIZ_COMPLETION_TEXT");
        }
        if let Some(llm) = &self.llm_fallback {
            if reqwest::Url::parse(&llm.base_url).is_err() {
                anyhow::bail!("FALLBACK_LLM_URL is not a valid URL: {}", llm.base_url);
            }
        }
        Ok(())
    }
}
