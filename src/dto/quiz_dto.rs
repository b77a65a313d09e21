use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::quiz::scoring::SessionTotals;
use crate::quiz::session::{AnswerOutcome, QuizSession};
use crate::services::progression_service::ProgressionSnapshot;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub topic: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SelectAnswerRequest {
    #[validate(length(min = 1))]
    pub answer: String,
}

/// The question as shown to the student. Never carries the correct answer;
/// that is only revealed through `AnswerView` after a submission.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub total_questions: usize,
    pub question: String,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerView {
    pub question: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub already_answered: bool,
    pub points: i32,
    pub time_remaining_seconds: Option<i64>,
}

impl From<&AnswerOutcome> for AnswerView {
    fn from(outcome: &AnswerOutcome) -> Self {
        Self {
            question: outcome.question.clone(),
            selected_answer: outcome.selected_answer.clone(),
            correct_answer: outcome.correct_answer.clone(),
            is_correct: outcome.is_correct,
            already_answered: outcome.already_answered,
            points: outcome.points,
            time_remaining_seconds: outcome.time_remaining_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub subject: String,
    pub topic: String,
    pub phase: String,
    pub question: Option<QuestionView>,
    pub selected_answer: Option<String>,
    pub last_outcome: Option<AnswerView>,
    pub time_remaining_seconds: Option<i64>,
    pub totals: SessionTotals,
}

impl SessionView {
    pub fn from_session(id: Uuid, session: &QuizSession, now: DateTime<Utc>) -> Self {
        let question = session
            .current_index()
            .zip(session.current_question())
            .map(|(index, q)| QuestionView {
                index,
                total_questions: session.total_questions(),
                question: q.question.clone(),
                answers: q.answers.clone(),
            });
        Self {
            id,
            subject: session.subject.clone(),
            topic: session.topic.clone(),
            phase: session.phase.name().to_string(),
            question,
            selected_answer: session.selected_answer().map(|s| s.to_string()),
            last_outcome: session.last_outcome().map(AnswerView::from),
            time_remaining_seconds: session.time_remaining(now),
            totals: session.totals.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub correct_count: i32,
    pub incorrect_count: i32,
    pub quiz_points: i32,
    /// Absent for subjects that do not feed the points economy.
    pub progression: Option<ProgressionSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvanceResponse {
    pub finished: bool,
    pub session: Option<SessionView>,
    pub summary: Option<SessionSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectInfo {
    pub key: &'static str,
    pub timed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardQuery {
    pub school_id: Option<Uuid>,
    pub limit: Option<i64>,
}
