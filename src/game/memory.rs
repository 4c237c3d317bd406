use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const PAIR_COUNT: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EquationPair {
    pub id: u8,
    pub equation: String,
    pub result: String,
}

/// 按年级生成 6 组算式与结果，算式互不相同，结果也互不相同。
pub fn generate_pairs<R: Rng>(grade: u8, rng: &mut R) -> Vec<EquationPair> {
    let mut pairs = Vec::with_capacity(PAIR_COUNT);
    let mut used_equations = HashSet::new();
    let mut used_results = HashSet::new();

    while pairs.len() < PAIR_COUNT {
        let (equation, result) = random_equation(grade, rng);
        let result = result.to_string();
        if used_equations.contains(&equation) || used_results.contains(&result) {
            continue;
        }
        used_equations.insert(equation.clone());
        used_results.insert(result.clone());
        pairs.push(EquationPair {
            id: pairs.len() as u8,
            equation,
            result,
        });
    }
    pairs
}

fn random_equation<R: Rng>(grade: u8, rng: &mut R) -> (String, i32) {
    match grade {
        0 | 1 => {
            if rng.gen_bool(0.5) {
                add(rng.gen_range(1..=10), rng.gen_range(1..=5))
            } else {
                sub(rng.gen_range(5..=10), rng.gen_range(1..=4))
            }
        }
        2 => {
            if rng.gen_bool(0.5) {
                add(rng.gen_range(10..=40), rng.gen_range(5..=20))
            } else {
                sub(rng.gen_range(20..=50), rng.gen_range(5..=15))
            }
        }
        3 => mul(rng.gen_range(2..=6), rng.gen_range(2..=9)),
        4 => {
            if rng.gen_bool(0.5) {
                mul(rng.gen_range(6..=9), rng.gen_range(4..=9))
            } else {
                div(rng.gen_range(2..=6), rng.gen_range(3..=9))
            }
        }
        _ => {
            let op: f64 = rng.gen();
            if op < 0.33 {
                let a = rng.gen_range(50..=100);
                let b = rng.gen_range(20..=50);
                if rng.gen_bool(0.5) {
                    add(a, b)
                } else {
                    sub(a, b)
                }
            } else if op < 0.66 {
                mul(rng.gen_range(7..=12), rng.gen_range(6..=12))
            } else {
                div(rng.gen_range(4..=10), rng.gen_range(5..=15))
            }
        }
    }
}

fn add(a: i32, b: i32) -> (String, i32) {
    (format!("{a} + {b}"), a + b)
}

fn sub(a: i32, b: i32) -> (String, i32) {
    (format!("{a} - {b}"), a - b)
}

fn mul(a: i32, b: i32) -> (String, i32) {
    (format!("{a} x {b}"), a * b)
}

/// 整除题：先定除数与商，再反推被除数。
fn div(divisor: i32, quotient: i32) -> (String, i32) {
    (format!("{} ÷ {}", divisor * quotient, divisor), quotient)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Equation,
    Result,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryCard {
    pub id: String,
    pub value: String,
    pub match_id: u8,
    pub kind: CardKind,
    #[serde(default)]
    pub face_up: bool,
    #[serde(default)]
    pub matched: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum FlipOutcome {
    Ignored,
    Revealed,
    Match { won: bool },
    /// 两张牌保持翻开，等待前端延时后调用 `resolve_mismatch`。
    Mismatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryGame {
    pub grade: u8,
    pub cards: Vec<MemoryCard>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending: Vec<String>,
    pub moves: u32,
    pub matches: u8,
    pub won: bool,
}

impl MemoryGame {
    pub fn new<R: Rng>(grade: u8, rng: &mut R) -> Self {
        let mut cards = Vec::with_capacity(PAIR_COUNT * 2);
        for pair in generate_pairs(grade, rng) {
            cards.push(MemoryCard {
                id: format!("eq-{}", pair.id),
                value: pair.equation,
                match_id: pair.id,
                kind: CardKind::Equation,
                face_up: false,
                matched: false,
            });
            cards.push(MemoryCard {
                id: format!("res-{}", pair.id),
                value: pair.result,
                match_id: pair.id,
                kind: CardKind::Result,
                face_up: false,
                matched: false,
            });
        }
        cards.shuffle(rng);

        Self {
            grade,
            cards,
            pending: Vec::new(),
            moves: 0,
            matches: 0,
            won: false,
        }
    }

    pub fn flip(&mut self, card_id: &str) -> Result<FlipOutcome, GameError> {
        let index = self
            .cards
            .iter()
            .position(|card| card.id == card_id)
            .ok_or_else(|| GameError::CardNotFound {
                card_id: card_id.to_string(),
            })?;

        let card = &self.cards[index];
        if self.pending.len() == 2 || card.face_up || card.matched || self.won {
            return Ok(FlipOutcome::Ignored);
        }

        self.cards[index].face_up = true;
        self.pending.push(card_id.to_string());
        if self.pending.len() < 2 {
            return Ok(FlipOutcome::Revealed);
        }

        self.moves += 1;
        let first = self.card_match_id(&self.pending[0]);
        let second = self.card_match_id(&self.pending[1]);
        if first.is_some() && first == second {
            for id in std::mem::take(&mut self.pending) {
                if let Some(card) = self.cards.iter_mut().find(|card| card.id == id) {
                    card.matched = true;
                }
            }
            self.matches += 1;
            self.won = usize::from(self.matches) == PAIR_COUNT;
            return Ok(FlipOutcome::Match { won: self.won });
        }
        Ok(FlipOutcome::Mismatch)
    }

    /// 翻回未配对的两张牌。
    pub fn resolve_mismatch(&mut self) {
        if self.pending.len() < 2 {
            return;
        }
        for id in std::mem::take(&mut self.pending) {
            if let Some(card) = self.cards.iter_mut().find(|card| card.id == id) {
                card.face_up = false;
            }
        }
    }

    fn card_match_id(&self, card_id: &str) -> Option<u8> {
        self.cards
            .iter()
            .find(|card| card.id == card_id)
            .map(|card| card.match_id)
    }
}
