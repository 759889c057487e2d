//! Loading quiz content (questions, auto-reply rules) from JSON files into the store.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use storage::{QuestionRecord, RuleRecord, SqliteStore};
use tracing::{info, warn};

/// Reads a JSON array of questions. Ids must be unique.
pub fn load_questions(path: &Path) -> Result<Vec<QuestionRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read questions file {}", path.display()))?;
    let questions: Vec<QuestionRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid questions JSON in {}", path.display()))?;

    let mut ids = HashSet::new();
    for q in &questions {
        if !ids.insert(q.id.as_str()) {
            anyhow::bail!("Duplicate question id '{}' in {}", q.id, path.display());
        }
        if q.options.is_empty() {
            warn!(question_id = %q.id, "Question has no answer options; every answer will be invalid");
        }
        if let Some(correct) = &q.correct_token {
            if !q.options.contains(correct) {
                warn!(question_id = %q.id, correct = %correct, "correct_token is not one of the options");
            }
        }
    }
    Ok(questions)
}

/// Reads a JSON array of rules. File order is creation order and breaks priority ties.
pub fn load_rules(path: &Path) -> Result<Vec<RuleRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file {}", path.display()))?;
    let mut rules: Vec<RuleRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid rules JSON in {}", path.display()))?;
    for (i, rule) in rules.iter_mut().enumerate() {
        rule.position = i as i64;
    }
    Ok(rules)
}

/// Replaces the question bank, and the rule set when `rules` is given.
pub async fn seed_store(
    store: &SqliteStore,
    questions_path: &Path,
    rules_path: Option<&Path>,
) -> Result<()> {
    let questions = load_questions(questions_path)?;
    store
        .replace_questions(&questions)
        .await
        .context("Failed to store questions")?;
    info!(count = questions.len(), path = %questions_path.display(), "Questions seeded");

    if let Some(path) = rules_path {
        let rules = load_rules(path)?;
        store
            .replace_rules(&rules)
            .await
            .context("Failed to store rules")?;
        info!(count = rules.len(), path = %path.display(), "Rules seeded");
    }
    Ok(())
}
