use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::prompts::Phase;

/// Lifecycle state of a planning session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Draft,
    InProgress,
    Completed,
    Archived,
}

/// One free-text answer to a catalog question. Question ids follow the
/// `{phase letter}-{number}` convention, e.g. "C-01" for the first Clarify
/// question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub response: String,
    pub answered_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Answer {
    /// Phase this answer belongs to, derived from the question-id prefix.
    pub fn phase(&self) -> Phase {
        match self.question_id.chars().next() {
            Some('O') => Phase::Organize,
            Some('R') => Phase::Refine,
            Some('E') => Phase::Equip,
            _ => Phase::Clarify,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One message in a recorded guidance exchange. `model` is set on assistant
/// messages to the identity of the provider that produced the reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Audit record of one guidance exchange: the outgoing user instruction and
/// the assistant reply, with timestamps. Only materialized when a provider was
/// actually invoked — never for cache hits or rejected requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    pub phase: Phase,
    pub messages: Vec<ConversationMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything the surrounding UI accumulates for one planning session. The
/// core only reads this (for output generation); snapshot persistence is the
/// caller's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub session: SessionMetadata,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub conversations: Vec<ConversationRecord>,
}

impl SessionData {
    /// Answers belonging to one phase, in catalog (question-id) order.
    pub fn answers_for_phase(&self, phase: Phase) -> Vec<&Answer> {
        let mut answers: Vec<&Answer> = self
            .answers
            .iter()
            .filter(|a| a.phase() == phase)
            .collect();
        answers.sort_by(|a, b| a.question_id.cmp(&b.question_id));
        answers
    }
}
