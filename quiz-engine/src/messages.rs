//! User-facing quiz texts and question rendering.

use storage::QuestionRecord;

#[derive(Debug, Clone)]
pub struct QuizMessages {
    /// Prefix of the first question of a new session.
    pub welcome: String,
    /// Completion text; `{score}` is replaced with the final score.
    pub completion: String,
    /// Prefix when an invalid answer is re-prompted.
    pub reprompt: String,
}

impl Default for QuizMessages {
    fn default() -> Self {
        Self {
            welcome: "Welcome to the quiz!".to_string(),
            completion: "Quiz complete! Your score: {score}".to_string(),
            reprompt: "Please reply with one of the listed options.".to_string(),
        }
    }
}

impl QuizMessages {
    pub fn completion_text(&self, score: i64) -> String {
        self.completion.replace("{score}", &score.to_string())
    }

    pub fn welcome_text(&self, first: &QuestionRecord) -> String {
        format!("{}\n\n{}", self.welcome, render_question(first))
    }

    pub fn reprompt_text(&self, question: &QuestionRecord) -> String {
        format!("{}\n\n{}", self.reprompt, render_question(question))
    }
}

pub fn render_question(question: &QuestionRecord) -> String {
    if question.options.is_empty() {
        return question.prompt.clone();
    }
    format!("{}\n\nReply with: {}", question.prompt, question.options.join(" / "))
}
