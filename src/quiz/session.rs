use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ruleset::QuizRules;
use super::scoring::SessionTotals;

/// A question as presented inside a session: the answer order is already
/// shuffled and frozen, so reloading the session shows the same layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionQuestion {
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: String,
}

/// Result of one graded submission, kept in the `Answered` phase so the
/// client can reveal correctness until it advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub question: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub already_answered: bool,
    pub points: i32,
    pub time_remaining_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    Presenting {
        index: usize,
        presented_at: DateTime<Utc>,
    },
    AnswerSelected {
        index: usize,
        presented_at: DateTime<Utc>,
        selected: String,
    },
    Answered {
        index: usize,
        outcome: AnswerOutcome,
    },
    Finished,
}

impl SessionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::Presenting { .. } => "presenting",
            SessionPhase::AnswerSelected { .. } => "answer_selected",
            SessionPhase::Answered { .. } => "answered",
            SessionPhase::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("no questions available for this topic")]
    NoQuestions,
    #[error("answer is not one of the presented options")]
    UnknownAnswer,
    #[error("no answer selected for the current question")]
    NoAnswerSelected,
    #[error("current question has already been answered")]
    AlreadyAnswered,
    #[error("current question has not been answered yet")]
    NotAnswered,
    #[error("session is already finished")]
    Finished,
}

/// What `advance` moved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    Next(usize),
    Finished,
}

/// One run through an ordered question set, from the first presentation to
/// `Finished`. Pure state: all persistence and duplicate lookups happen in
/// the service layer, which feeds their results in through `submit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSession {
    pub subject: String,
    pub topic: String,
    pub rules: QuizRules,
    pub questions: Vec<SessionQuestion>,
    pub phase: SessionPhase,
    pub totals: SessionTotals,
}

impl QuizSession {
    /// Starts at the first question. An empty question set is refused here so
    /// no session ever presents a blank screen.
    pub fn new(
        subject: impl Into<String>,
        topic: impl Into<String>,
        rules: QuizRules,
        questions: Vec<SessionQuestion>,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        Ok(Self {
            subject: subject.into(),
            topic: topic.into(),
            rules,
            questions,
            phase: SessionPhase::Presenting {
                index: 0,
                presented_at: now,
            },
            totals: SessionTotals::default(),
        })
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        match &self.phase {
            SessionPhase::Presenting { index, .. }
            | SessionPhase::AnswerSelected { index, .. }
            | SessionPhase::Answered { index, .. } => Some(*index),
            SessionPhase::Finished => None,
        }
    }

    pub fn current_question(&self) -> Option<&SessionQuestion> {
        self.current_index().map(|i| &self.questions[i])
    }

    pub fn selected_answer(&self) -> Option<&str> {
        match &self.phase {
            SessionPhase::AnswerSelected { selected, .. } => Some(selected.as_str()),
            _ => None,
        }
    }

    pub fn last_outcome(&self) -> Option<&AnswerOutcome> {
        match &self.phase {
            SessionPhase::Answered { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, SessionPhase::Finished)
    }

    /// Seconds left on the current question's countdown, floored at zero.
    /// `None` for untimed rulesets and once the question is answered.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        let presented_at = match &self.phase {
            SessionPhase::Presenting { presented_at, .. }
            | SessionPhase::AnswerSelected { presented_at, .. } => *presented_at,
            _ => return None,
        };
        countdown(&self.rules, presented_at, now)
    }

    /// Picks (or re-picks) an answer. No side effects beyond the phase move.
    pub fn select(&mut self, answer: &str) -> Result<(), SessionError> {
        let (index, presented_at) = match &self.phase {
            SessionPhase::Presenting {
                index,
                presented_at,
            }
            | SessionPhase::AnswerSelected {
                index,
                presented_at,
                ..
            } => (*index, *presented_at),
            SessionPhase::Answered { .. } => return Err(SessionError::AlreadyAnswered),
            SessionPhase::Finished => return Err(SessionError::Finished),
        };
        if !self.questions[index].answers.iter().any(|a| a == answer) {
            return Err(SessionError::UnknownAnswer);
        }
        self.phase = SessionPhase::AnswerSelected {
            index,
            presented_at,
            selected: answer.to_string(),
        };
        Ok(())
    }

    /// Grades the selected answer. `already_answered` is the caller's
    /// idempotency lookup over persisted responses; a repeat scores zero
    /// points but still counts toward the session tallies.
    pub fn submit(
        &mut self,
        already_answered: bool,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SessionError> {
        let (index, presented_at, selected) = match &self.phase {
            SessionPhase::AnswerSelected {
                index,
                presented_at,
                selected,
            } => (*index, *presented_at, selected.clone()),
            SessionPhase::Presenting { .. } => return Err(SessionError::NoAnswerSelected),
            SessionPhase::Answered { .. } => return Err(SessionError::AlreadyAnswered),
            SessionPhase::Finished => return Err(SessionError::Finished),
        };
        let question = &self.questions[index];
        let is_correct = selected == question.correct_answer;
        let time_remaining = countdown(&self.rules, presented_at, now);
        let points = self
            .rules
            .points_for(is_correct, already_answered, time_remaining);
        let outcome = AnswerOutcome {
            question: question.question.clone(),
            selected_answer: selected,
            correct_answer: question.correct_answer.clone(),
            is_correct,
            already_answered,
            points,
            time_remaining_seconds: time_remaining,
        };
        self.totals.record(is_correct, points);
        self.phase = SessionPhase::Answered {
            index,
            outcome: outcome.clone(),
        };
        Ok(outcome)
    }

    /// Moves past an answered question: next presentation with a fresh
    /// countdown, or `Finished` after the last one. `Finished` is terminal.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, SessionError> {
        let index = match &self.phase {
            SessionPhase::Answered { index, .. } => *index,
            SessionPhase::Presenting { .. } | SessionPhase::AnswerSelected { .. } => {
                return Err(SessionError::NotAnswered)
            }
            SessionPhase::Finished => return Err(SessionError::Finished),
        };
        let next = index + 1;
        if next < self.questions.len() {
            self.phase = SessionPhase::Presenting {
                index: next,
                presented_at: now,
            };
            Ok(Advance::Next(next))
        } else {
            self.phase = SessionPhase::Finished;
            Ok(Advance::Finished)
        }
    }
}

fn countdown(rules: &QuizRules, presented_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<i64> {
    rules
        .limit_seconds()
        .map(|limit| (limit - (now - presented_at).num_seconds()).max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn question(text: &str, correct: &str, wrong: &[&str]) -> SessionQuestion {
        let mut answers = vec![correct.to_string()];
        answers.extend(wrong.iter().map(|w| w.to_string()));
        SessionQuestion {
            question: text.to_string(),
            answers,
            correct_answer: correct.to_string(),
        }
    }

    fn timed_session(now: DateTime<Utc>) -> QuizSession {
        QuizSession::new(
            "math",
            "fractions",
            QuizRules::timed(),
            vec![
                question("1/2 + 1/2?", "1", &["2", "1/4"]),
                question("3/4 of 8?", "6", &["4", "8"]),
            ],
            now,
        )
        .unwrap()
    }

    #[test]
    fn empty_question_set_is_refused() {
        let err = QuizSession::new("math", "fractions", QuizRules::timed(), vec![], Utc::now())
            .unwrap_err();
        assert_eq!(err, SessionError::NoQuestions);
    }

    #[test]
    fn starts_presenting_first_question() {
        let session = timed_session(Utc::now());
        assert_eq!(session.current_index(), Some(0));
        assert_eq!(session.phase.name(), "presenting");
        assert!(!session.is_finished());
    }

    #[test]
    fn select_requires_presented_option() {
        let mut session = timed_session(Utc::now());
        assert_eq!(session.select("42"), Err(SessionError::UnknownAnswer));
        assert!(session.select("1").is_ok());
        // re-selection is allowed until submit
        assert!(session.select("2").is_ok());
        assert_eq!(session.selected_answer(), Some("2"));
    }

    #[test]
    fn submit_without_selection_is_rejected() {
        let mut session = timed_session(Utc::now());
        assert_eq!(
            session.submit(false, Utc::now()),
            Err(SessionError::NoAnswerSelected)
        );
    }

    #[test]
    fn fast_correct_answer_earns_full_points() {
        let start = Utc::now();
        let mut session = timed_session(start);
        session.select("1").unwrap();
        let outcome = session
            .submit(false, start + Duration::seconds(30))
            .unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.points, 10);
        assert_eq!(session.totals.quiz_points, 10);
        assert_eq!(session.totals.correct_count, 1);
    }

    #[test]
    fn expired_countdown_downgrades_points_but_still_submits() {
        let start = Utc::now();
        let mut session = timed_session(start);
        session.select("1").unwrap();
        let late = start + Duration::seconds(500);
        assert_eq!(session.time_remaining(late), Some(0));
        let outcome = session.submit(false, late).unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.points, 5);
    }

    #[test]
    fn duplicate_submission_scores_zero() {
        let start = Utc::now();
        let mut session = timed_session(start);
        session.select("1").unwrap();
        let outcome = session.submit(true, start + Duration::seconds(5)).unwrap();
        assert!(outcome.is_correct);
        assert!(outcome.already_answered);
        assert_eq!(outcome.points, 0);
        assert_eq!(session.totals.quiz_points, 0);
        // the repeat still counts as correct in the session tallies
        assert_eq!(session.totals.correct_count, 1);
    }

    #[test]
    fn double_submit_is_rejected() {
        let start = Utc::now();
        let mut session = timed_session(start);
        session.select("1").unwrap();
        session.submit(false, start).unwrap();
        assert_eq!(
            session.submit(false, start),
            Err(SessionError::AlreadyAnswered)
        );
        assert_eq!(session.select("2"), Err(SessionError::AlreadyAnswered));
    }

    #[test]
    fn advance_walks_to_finished() {
        let start = Utc::now();
        let mut session = timed_session(start);
        assert_eq!(session.advance(start), Err(SessionError::NotAnswered));

        session.select("1").unwrap();
        session.submit(false, start).unwrap();
        assert_eq!(session.advance(start), Ok(Advance::Next(1)));
        // fresh countdown on the next question
        assert_eq!(session.time_remaining(start), Some(120));

        session.select("4").unwrap();
        let outcome = session.submit(false, start).unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(session.advance(start), Ok(Advance::Finished));
        assert!(session.is_finished());
        assert_eq!(session.advance(start), Err(SessionError::Finished));
        assert_eq!(session.select("1"), Err(SessionError::Finished));
    }

    #[test]
    fn untimed_session_has_no_countdown_and_no_points() {
        let start = Utc::now();
        let mut session = QuizSession::new(
            "history",
            "rome",
            QuizRules::Untimed,
            vec![question("Founded?", "753 BC", &["509 BC", "27 BC"])],
            start,
        )
        .unwrap();
        assert_eq!(session.time_remaining(start), None);
        session.select("753 BC").unwrap();
        let outcome = session.submit(false, start).unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.points, 0);
        assert_eq!(outcome.time_remaining_seconds, None);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let start = Utc::now();
        let mut session = timed_session(start);
        session.select("1").unwrap();
        session.submit(false, start).unwrap();
        let json = serde_json::to_value(&session).unwrap();
        let restored: QuizSession = serde_json::from_value(json).unwrap();
        assert_eq!(restored, session);
    }
}
