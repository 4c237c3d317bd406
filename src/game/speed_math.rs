use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const ROUND_SECONDS: u32 = 30;
pub const POINTS_PER_ANSWER: u32 = 10;
const OPTION_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MathProblem {
    pub operation: Operation,
    pub prompt: String,
    pub answer: i32,
    pub options: Vec<i32>,
}

fn pick_operation<R: Rng>(grade: u8, rng: &mut R) -> Operation {
    match grade {
        0 | 1 => {
            if rng.gen::<f64>() > 0.7 {
                Operation::Sub
            } else {
                Operation::Add
            }
        }
        2 => {
            if rng.gen::<f64>() > 0.5 {
                Operation::Sub
            } else {
                Operation::Add
            }
        }
        3 => {
            if rng.gen::<f64>() > 0.5 {
                Operation::Mul
            } else if rng.gen::<f64>() > 0.5 {
                Operation::Add
            } else {
                Operation::Sub
            }
        }
        4 => {
            if rng.gen::<f64>() > 0.4 {
                Operation::Mul
            } else if rng.gen::<f64>() > 0.4 {
                Operation::Div
            } else {
                Operation::Sub
            }
        }
        _ => {
            let roll: f64 = rng.gen();
            if roll < 0.2 {
                Operation::Add
            } else if roll < 0.4 {
                Operation::Sub
            } else if roll < 0.7 {
                Operation::Mul
            } else {
                Operation::Div
            }
        }
    }
}

fn additive_max(grade: u8) -> i32 {
    match grade {
        0 | 1 => 15,
        2 => 40,
        _ => i32::from(grade) * 30,
    }
}

/// 按年级出一道口算题，附带 3 个互不相同的正整数选项（含正确答案）。
pub fn generate_problem<R: Rng>(grade: u8, rng: &mut R) -> MathProblem {
    let operation = pick_operation(grade, rng);
    let (prompt, answer) = match operation {
        Operation::Add => {
            let max = additive_max(grade);
            let a = rng.gen_range(1..=max);
            let b = rng.gen_range(1..=max);
            (format!("{a} + {b}"), a + b)
        }
        Operation::Sub => {
            let max = additive_max(grade);
            let a = rng.gen_range(10..max + 10);
            let b = rng.gen_range(1..a);
            (format!("{a} - {b}"), a - b)
        }
        Operation::Mul => {
            let max = match grade {
                0..=3 => 5,
                4 => 9,
                _ => 12,
            };
            let a = rng.gen_range(2..=max);
            let b = rng.gen_range(2..=10);
            (format!("{a} x {b}"), a * b)
        }
        Operation::Div => {
            let (quotient, divisor) = if grade == 4 {
                (rng.gen_range(2..=9), rng.gen_range(2..=5))
            } else {
                (rng.gen_range(3..=12), rng.gen_range(2..=9))
            };
            (format!("{} ÷ {}", quotient * divisor, divisor), quotient)
        }
    };

    MathProblem {
        operation,
        prompt,
        answer,
        options: answer_options(answer, rng),
    }
}

fn answer_options<R: Rng>(answer: i32, rng: &mut R) -> Vec<i32> {
    let mut options = BTreeSet::from([answer]);
    while options.len() < OPTION_COUNT {
        let offset = rng.gen_range(1..=5);
        let fake = if rng.gen_bool(0.5) {
            answer + offset
        } else {
            answer - offset
        };
        if fake > 0 {
            options.insert(fake);
        }
    }
    let mut options: Vec<i32> = options.into_iter().collect();
    options.shuffle(rng);
    options
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum AnswerFeedback {
    Correct { score: u32 },
    Wrong { expected: i32 },
}

/// 30 秒限时口算，每答对一题 +10 分。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeedMathGame {
    pub grade: u8,
    pub score: u32,
    pub time_left: u32,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<MathProblem>,
}

impl SpeedMathGame {
    pub fn new(grade: u8) -> Self {
        Self {
            grade,
            score: 0,
            time_left: ROUND_SECONDS,
            active: false,
            problem: None,
        }
    }

    pub fn start<R: Rng>(&mut self, rng: &mut R) {
        self.score = 0;
        self.time_left = ROUND_SECONDS;
        self.active = true;
        self.problem = Some(generate_problem(self.grade, rng));
    }

    pub fn is_finished(&self) -> bool {
        !self.active && self.time_left == 0
    }

    pub fn answer<R: Rng>(&mut self, value: i32, rng: &mut R) -> Result<AnswerFeedback, GameError> {
        if !self.active {
            return Err(GameError::NotStarted);
        }
        let expected = self
            .problem
            .as_ref()
            .map(|problem| problem.answer)
            .ok_or(GameError::NotStarted)?;

        let feedback = if value == expected {
            self.score += POINTS_PER_ANSWER;
            AnswerFeedback::Correct { score: self.score }
        } else {
            AnswerFeedback::Wrong { expected }
        };
        self.problem = Some(generate_problem(self.grade, rng));
        Ok(feedback)
    }

    /// 时钟走一秒，返回剩余秒数；归零时结束本局。
    pub fn tick(&mut self) -> u32 {
        if self.active && self.time_left > 0 {
            self.time_left -= 1;
            if self.time_left == 0 {
                self.active = false;
                log::debug!("speed math round over with {} points", self.score);
            }
        }
        self.time_left
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn problems_are_consistent_for_all_grades() {
        let mut rng = SmallRng::seed_from_u64(31);
        for grade in 1..=7 {
            for _ in 0..200 {
                let problem = generate_problem(grade, &mut rng);
                assert_eq!(problem.options.len(), 3);
                assert!(problem.options.contains(&problem.answer));
                assert!(problem.options.iter().all(|value| *value > 0));
                let mut distinct = problem.options.clone();
                distinct.sort_unstable();
                distinct.dedup();
                assert_eq!(distinct.len(), 3);
                assert!(problem.answer > 0, "{} = {}", problem.prompt, problem.answer);
            }
        }
    }

    #[test]
    fn first_grade_only_adds_and_subtracts() {
        let mut rng = SmallRng::seed_from_u64(32);
        for _ in 0..200 {
            let problem = generate_problem(1, &mut rng);
            assert!(matches!(problem.operation, Operation::Add | Operation::Sub));
        }
    }

    #[test]
    fn round_scores_and_expires() {
        let mut rng = SmallRng::seed_from_u64(33);
        let mut game = SpeedMathGame::new(3);
        assert_eq!(game.answer(1, &mut rng), Err(GameError::NotStarted));

        game.start(&mut rng);
        let expected = game.problem.as_ref().expect("problem").answer;
        assert_eq!(
            game.answer(expected, &mut rng),
            Ok(AnswerFeedback::Correct { score: 10 })
        );
        let expected = game.problem.as_ref().expect("problem").answer;
        assert_eq!(
            game.answer(expected + 100, &mut rng),
            Ok(AnswerFeedback::Wrong { expected })
        );
        assert_eq!(game.score, 10);

        for _ in 0..ROUND_SECONDS {
            game.tick();
        }
        assert!(game.is_finished());
        assert_eq!(game.tick(), 0);
        assert!(game.answer(0, &mut rng).is_err());
    }
}
