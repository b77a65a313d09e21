use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::question::Question;

use super::session::SessionQuestion;

pub const MIN_ANSWERS: usize = 3;
pub const MAX_ANSWERS: usize = 5;

/// A record is playable when it can be presented without producing an
/// unanswerable question: 3 to 5 options, correct answer among them exactly
/// once. The store enforces none of this, so the loader must.
pub fn playable(answers: &[String], correct_answer: &str) -> bool {
    (MIN_ANSWERS..=MAX_ANSWERS).contains(&answers.len())
        && answers.iter().filter(|a| *a == correct_answer).count() == 1
}

/// Turns fetched rows into a session-ready question set: invalid records are
/// warn-logged and skipped, valid ones get their answers shuffled uniformly.
pub fn prepare<R: Rng>(rows: Vec<Question>, rng: &mut R) -> Vec<SessionQuestion> {
    rows.into_iter()
        .filter_map(|row| {
            if !playable(&row.answers.0, &row.correct_answer) {
                tracing::warn!(
                    question_id = %row.id,
                    subject = %row.subject,
                    "skipping question with invalid answer set"
                );
                return None;
            }
            let mut answers = row.answers.0;
            answers.shuffle(rng);
            Some(SessionQuestion {
                question: row.question,
                answers,
                correct_answer: row.correct_answer,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn row(answers: &[&str], correct: &str) -> Question {
        Question {
            id: Uuid::new_v4(),
            subject: "math".into(),
            topic: "fractions".into(),
            question: "q".into(),
            answers: sqlx::types::Json(answers.iter().map(|a| a.to_string()).collect()),
            correct_answer: correct.into(),
            school_id: Uuid::new_v4(),
            school_year: "9".into(),
            classroom: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn playable_checks_count_and_membership() {
        let ok: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        assert!(playable(&ok, "b"));
        assert!(!playable(&ok, "z"));
        assert!(!playable(&ok[..2].to_vec(), "a"));
        let dup: Vec<String> = vec!["a".into(), "a".into(), "b".into()];
        assert!(!playable(&dup, "a"));
    }

    #[test]
    fn shuffle_preserves_answer_multiset_and_correct_answer() {
        let mut rng = StdRng::seed_from_u64(7);
        let prepared = prepare(vec![row(&["a", "b", "c", "d"], "c")], &mut rng);
        assert_eq!(prepared.len(), 1);
        let q = &prepared[0];
        let mut sorted = q.answers.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["a", "b", "c", "d"]);
        assert_eq!(
            q.answers.iter().filter(|a| *a == &q.correct_answer).count(),
            1
        );
    }

    #[test]
    fn invalid_rows_are_dropped_not_presented() {
        let mut rng = StdRng::seed_from_u64(7);
        let prepared = prepare(
            vec![
                row(&["a", "b", "c"], "missing"),
                row(&["x", "y", "z"], "y"),
            ],
            &mut rng,
        );
        assert_eq!(prepared.len(), 1);
        assert_eq!(prepared[0].correct_answer, "y");
    }

    #[test]
    fn empty_input_yields_empty_set() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(prepare(vec![], &mut rng).is_empty());
    }
}
