use serde::{Deserialize, Serialize};

use super::balancer::ANSWER_SLOTS;
use super::question::Question;
use crate::error::QuizError;

pub const POINTS_PER_QUESTION: u32 = 10;
/// 报表中“及格”的得分比例。
pub const PASS_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum QuizDifficulty {
    #[default]
    #[serde(rename = "Fácil", alias = "easy")]
    Easy,
    #[serde(rename = "Médio", alias = "medium")]
    Medium,
    #[serde(rename = "Difícil", alias = "hard")]
    Hard,
}

impl QuizDifficulty {
    pub fn label(self) -> &'static str {
        match self {
            QuizDifficulty::Easy => "Fácil",
            QuizDifficulty::Medium => "Médio",
            QuizDifficulty::Hard => "Difícil",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: QuizDifficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_grade: Option<u8>,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: u64,
}

impl Quiz {
    pub fn max_score(&self) -> u32 {
        self.questions.len() as u32 * POINTS_PER_QUESTION
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub student_id: String,
    pub quiz_id: String,
    pub score: u32,
    pub max_score: u32,
    pub date: u64,
}

impl QuizResult {
    pub fn percentage(&self) -> f64 {
        if self.max_score == 0 {
            return 0.0;
        }
        f64::from(self.score) * 100.0 / f64::from(self.max_score)
    }

    pub fn passed(&self) -> bool {
        self.max_score > 0 && f64::from(self.score) >= f64::from(self.max_score) * PASS_RATIO
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizFeedback {
    pub correct: bool,
    pub correct_index: u8,
    pub score: u32,
}

/// 一次答题过程：每题只能作答一次，答对 +10 分。只能经 `new` 创建。
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuizSession {
    quiz: Quiz,
    current: usize,
    score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected: Option<usize>,
    finished: bool,
}

impl QuizSession {
    pub fn new(quiz: Quiz) -> Result<Self, QuizError> {
        if quiz.questions.is_empty() {
            return Err(QuizError::EmptyQuiz);
        }
        Ok(Self {
            quiz,
            current: 0,
            score: 0,
            selected: None,
            finished: false,
        })
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.finished {
            return None;
        }
        self.quiz.questions.get(self.current)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// 已完成题目占比（0.0 ~ 1.0），用于进度条。
    pub fn progress(&self) -> f64 {
        if self.finished {
            return 1.0;
        }
        self.current as f64 / self.quiz.questions.len() as f64
    }

    pub fn answer(&mut self, option: usize) -> Result<QuizFeedback, QuizError> {
        if self.finished {
            return Err(QuizError::Finished);
        }
        if option >= ANSWER_SLOTS {
            return Err(QuizError::OptionOutOfRange { option });
        }
        if self.selected.is_some() {
            return Err(QuizError::AlreadyAnswered {
                question: self.current,
            });
        }
        let question = self
            .quiz
            .questions
            .get(self.current)
            .ok_or(QuizError::Finished)?;
        let correct = question.is_correct(option);
        let correct_index = question.correct_answer_index;
        if correct {
            self.score += POINTS_PER_QUESTION;
        }
        self.selected = Some(option);
        Ok(QuizFeedback {
            correct,
            correct_index,
            score: self.score,
        })
    }

    /// 进入下一题；最后一题之后结束本次答题，返回 `false`。
    pub fn next(&mut self) -> Result<bool, QuizError> {
        if self.finished {
            return Err(QuizError::Finished);
        }
        if self.selected.is_none() {
            return Err(QuizError::NotAnswered {
                question: self.current,
            });
        }
        self.selected = None;
        if self.current + 1 < self.quiz.questions.len() {
            self.current += 1;
            return Ok(true);
        }
        self.finished = true;
        Ok(false)
    }

    pub fn result(&self, student_id: impl Into<String>, date: u64) -> Result<QuizResult, QuizError> {
        if !self.finished {
            return Err(QuizError::NotAnswered {
                question: self.current,
            });
        }
        Ok(QuizResult {
            student_id: student_id.into(),
            quiz_id: self.quiz.id.clone(),
            score: self.score,
            max_score: self.quiz.max_score(),
            date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: u8) -> Question {
        Question {
            id: format!("q-{correct}"),
            text: "?".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer_index: correct,
            explanation: None,
        }
    }

    fn quiz(questions: Vec<Question>) -> Quiz {
        Quiz {
            id: "quiz-1".into(),
            title: "Frações".into(),
            subject: "Matemática".into(),
            description: String::new(),
            difficulty: QuizDifficulty::Easy,
            target_grade: Some(3),
            questions,
            created_by: "prof-1".into(),
            created_at: 0,
        }
    }

    #[test]
    fn scores_ten_points_per_correct_answer() {
        let mut session =
            QuizSession::new(quiz(vec![question(0), question(3), question(1)])).expect("quiz");
        assert!(session.answer(0).expect("answer").correct);
        assert!(session.next().expect("next"));
        assert!(!session.answer(2).expect("answer").correct);
        assert!(session.next().expect("next"));
        assert_eq!(session.answer(1).expect("answer").score, 20);
        assert!(!session.next().expect("last"));

        let result = session.result("aluno-1", 1_700_000_000_000).expect("finished");
        assert_eq!(result.score, 20);
        assert_eq!(result.max_score, 30);
        assert!(!result.passed());
        assert!((result.percentage() - 66.666).abs() < 0.01);
    }

    #[test]
    fn enforces_answer_flow() {
        let mut session = QuizSession::new(quiz(vec![question(2)])).expect("quiz");
        assert_eq!(session.next(), Err(QuizError::NotAnswered { question: 0 }));
        assert_eq!(
            session.answer(4),
            Err(QuizError::OptionOutOfRange { option: 4 })
        );
        session.answer(2).expect("answer");
        assert_eq!(
            session.answer(1),
            Err(QuizError::AlreadyAnswered { question: 0 })
        );
        session.next().expect("finish");
        assert!(session.current_question().is_none());
        assert_eq!(session.answer(0), Err(QuizError::Finished));
        assert_eq!(session.progress(), 1.0);
    }

    #[test]
    fn session_state_is_exported_for_the_ui() {
        let mut session = QuizSession::new(quiz(vec![question(1), question(2)])).expect("quiz");
        session.answer(1).expect("answer");
        let json = serde_json::to_value(&session).expect("serialize");
        assert_eq!(json["current"], 0);
        assert_eq!(json["score"], 10);
        assert_eq!(json["selected"], 1);
        assert_eq!(json["quiz"]["questions"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn empty_quiz_is_rejected() {
        assert_eq!(QuizSession::new(quiz(Vec::new())), Err(QuizError::EmptyQuiz));
    }

    #[test]
    fn difficulty_uses_portuguese_labels() {
        let json = serde_json::to_string(&QuizDifficulty::Medium).expect("serialize");
        assert_eq!(json, "\"Médio\"");
        let parsed: QuizDifficulty = serde_json::from_str("\"Difícil\"").expect("deserialize");
        assert_eq!(parsed, QuizDifficulty::Hard);
        let legacy: QuizDifficulty = serde_json::from_str("\"easy\"").expect("alias");
        assert_eq!(legacy, QuizDifficulty::Easy);
    }
}
