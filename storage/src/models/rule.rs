//! Auto-reply rule record.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub id: String,
    pub triggers: Vec<String>,
    pub response: String,
    /// Higher wins.
    pub priority: i64,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Creation order; breaks priority ties.
    #[serde(default)]
    pub position: i64,
}

fn default_active() -> bool {
    true
}

impl RuleRecord {
    pub fn new(
        id: impl Into<String>,
        triggers: Vec<String>,
        response: impl Into<String>,
        priority: i64,
    ) -> Self {
        Self {
            id: id.into(),
            triggers,
            response: response.into(),
            priority,
            active: true,
            position: 0,
        }
    }
}

/// Sorts rules by descending priority, then creation order, then id.
pub fn sort_rules(rules: &mut [RuleRecord]) {
    rules.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.position.cmp(&b.position))
            .then_with(|| a.id.cmp(&b.id))
    });
}
