use serde::{Deserialize, Serialize};

/// The nine subjects the portal serves. Only `math` runs the timed,
/// points-awarding variant; the rest record responses without touching the
/// points economy.
pub const SUBJECT_KEYS: [&str; 9] = [
    "math",
    "portuguese",
    "science",
    "history",
    "geography",
    "english",
    "arts",
    "physical_education",
    "religion",
];

const TIMED_SUBJECT: &str = "math";

/// Scoring rules for one subject, carried inside the session snapshot so a
/// persisted session keeps grading the same way even if the registry changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuizRules {
    /// Per-question countdown. Running out of time never blocks submission,
    /// it only downgrades the points a correct answer earns.
    Timed {
        limit_seconds: i64,
        fast_points: i32,
        slow_points: i32,
        exp_per_correct: i64,
    },
    /// No countdown, no points, no progression.
    Untimed,
}

impl QuizRules {
    pub fn timed() -> Self {
        QuizRules::Timed {
            limit_seconds: 120,
            fast_points: 10,
            slow_points: 5,
            exp_per_correct: 50,
        }
    }

    pub fn limit_seconds(&self) -> Option<i64> {
        match self {
            QuizRules::Timed { limit_seconds, .. } => Some(*limit_seconds),
            QuizRules::Untimed => None,
        }
    }

    /// Whether finishing a session updates the user's points/exp/level.
    pub fn awards_progression(&self) -> bool {
        matches!(self, QuizRules::Timed { .. })
    }

    pub fn exp_per_correct(&self) -> i64 {
        match self {
            QuizRules::Timed { exp_per_correct, .. } => *exp_per_correct,
            QuizRules::Untimed => 0,
        }
    }

    /// Points for a single submission. A repeat submission of the same
    /// question scores zero no matter what.
    pub fn points_for(
        &self,
        is_correct: bool,
        already_answered: bool,
        time_remaining: Option<i64>,
    ) -> i32 {
        match self {
            QuizRules::Untimed => 0,
            QuizRules::Timed {
                fast_points,
                slow_points,
                ..
            } => {
                if already_answered || !is_correct {
                    0
                } else if time_remaining.unwrap_or(0) > 0 {
                    *fast_points
                } else {
                    *slow_points
                }
            }
        }
    }
}

/// Resolves a subject key to its ruleset. Unknown keys get `None`, which the
/// API surfaces as a not-found rather than presenting an empty quiz.
pub fn ruleset_for(subject: &str) -> Option<QuizRules> {
    if !SUBJECT_KEYS.contains(&subject) {
        return None;
    }
    if subject == TIMED_SUBJECT {
        Some(QuizRules::timed())
    } else {
        Some(QuizRules::Untimed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_all_subjects() {
        for key in SUBJECT_KEYS {
            assert!(ruleset_for(key).is_some(), "missing ruleset for {key}");
        }
        assert_eq!(ruleset_for("alchemy"), None);
    }

    #[test]
    fn only_math_is_timed() {
        assert!(ruleset_for("math").unwrap().awards_progression());
        for key in SUBJECT_KEYS.iter().filter(|k| **k != "math") {
            assert_eq!(ruleset_for(key), Some(QuizRules::Untimed));
        }
    }

    #[test]
    fn timed_points_formula() {
        let rules = QuizRules::timed();
        // correct with time on the clock
        assert_eq!(rules.points_for(true, false, Some(37)), 10);
        // correct after the countdown ran out
        assert_eq!(rules.points_for(true, false, Some(0)), 5);
        // wrong answers and repeats never score
        assert_eq!(rules.points_for(false, false, Some(37)), 0);
        assert_eq!(rules.points_for(true, true, Some(37)), 0);
    }

    #[test]
    fn untimed_never_scores() {
        assert_eq!(QuizRules::Untimed.points_for(true, false, None), 0);
        assert!(!QuizRules::Untimed.awards_progression());
    }
}
