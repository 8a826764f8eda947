//! Quiz questions and grading.
//!
//! Quizzes come from an external generator; completing one earns points that
//! are logged as [`ActivityType::QuizCompleted`](crate::ActivityType::QuizCompleted).

use serde::{Deserialize, Serialize};

/// Points awarded per correct answer.
pub const POINTS_PER_CORRECT_ANSWER: u32 = 10;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl QuizQuestion {
    /// Whether `answer` matches the expected answer exactly.
    pub fn is_correct(&self, answer: &str) -> bool {
        self.answer == answer
    }
}

/// A generated quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(rename = "quizId")]
    pub id: String,
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// Counts answers matching their question; extra or missing answers score nothing.
    pub fn grade<S: AsRef<str>>(&self, answers: &[S]) -> usize {
        self.questions
            .iter()
            .zip(answers)
            .filter(|(question, answer)| question.is_correct(answer.as_ref()))
            .count()
    }
}

/// Points earned for a number of correct answers.
pub fn points_earned(correct_count: usize) -> f64 {
    #[expect(
        clippy::cast_precision_loss,
        reason = "answer counts are tiny"
    )]
    let correct = correct_count as f64;
    correct * f64::from(POINTS_PER_CORRECT_ANSWER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> Quiz {
        let question = |q: &str, answer: &str| QuizQuestion {
            question: q.to_string(),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            answer: answer.to_string(),
        };
        Quiz {
            id: "quiz-1".to_string(),
            questions: vec![
                question("first", "A"),
                question("second", "C"),
                question("third", "D"),
            ],
        }
    }

    #[test]
    fn grade_counts_exact_matches() {
        assert_eq!(quiz().grade(&["A", "C", "D"]), 3);
        assert_eq!(quiz().grade(&["A", "B", "D"]), 2);
        assert_eq!(quiz().grade(&["a", "c", "d"]), 0);
    }

    #[test]
    fn grade_ignores_missing_and_extra_answers() {
        assert_eq!(quiz().grade(&["A"]), 1);
        assert_eq!(quiz().grade(&["A", "C", "D", "A"]), 3);
        assert_eq!(quiz().grade::<&str>(&[]), 0);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "small integers are exact")]
    fn points_are_ten_per_correct_answer() {
        assert_eq!(points_earned(0), 0.0);
        assert_eq!(points_earned(3), 30.0);
    }

    #[test]
    fn quiz_id_serializes_as_quiz_id() {
        let json = serde_json::to_value(quiz()).unwrap();
        assert_eq!(json["quizId"], "quiz-1");
        assert_eq!(json["questions"][1]["answer"], "C");
    }
}
