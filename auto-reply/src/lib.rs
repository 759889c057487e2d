//! Auto-reply matcher
//!
//! Matches message text against active rules: the first rule, in descending priority, with a
//! trigger that is a substring of the normalized text wins. Matching never fails; an empty or
//! unreachable rule set is reported as no match.

use std::sync::Arc;
use std::time::Duration;

use quizbot_core::{bounded, normalize, QuizbotError};
use storage::{RuleRecord, RuleSet};
use tracing::{debug, warn};

pub struct AutoReplyMatcher {
    rules: Arc<dyn RuleSet>,
    timeout: Duration,
}

impl AutoReplyMatcher {
    pub fn new(rules: Arc<dyn RuleSet>, timeout: Duration) -> Self {
        Self { rules, timeout }
    }

    /// Returns the first matching rule, or `None` to fall through.
    pub async fn match_text(&self, text: &str) -> Option<RuleRecord> {
        let rules = match bounded("list_active_rules", self.timeout, async {
            self.rules
                .list_active_rules()
                .await
                .map_err(QuizbotError::from)
        })
        .await
        {
            Ok(rules) => rules,
            Err(e) => {
                warn!(error = %e, "step: rule set unavailable, auto-reply skipped");
                return None;
            }
        };

        let matched = first_match(rules, &normalize(text));
        if let Some(rule) = &matched {
            debug!(rule_id = %rule.id, priority = rule.priority, "step: auto-reply matched");
        }
        matched
    }
}

/// `rules` are expected in evaluation order. `text` must already be normalized.
pub fn first_match(rules: Vec<RuleRecord>, text: &str) -> Option<RuleRecord> {
    if text.is_empty() {
        return None;
    }
    rules.into_iter().filter(|r| r.active).find(|rule| {
        rule.triggers.iter().any(|trigger| {
            let trigger = normalize(trigger);
            !trigger.is_empty() && text.contains(&trigger)
        })
    })
}
