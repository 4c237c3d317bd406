use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::{check_winner, Board, Mark, Outcome, BOARD_CELLS};

const WIN_SCORE: i32 = 10;
const RANDOMNESS_STEP: f64 = 0.2;

/// 难度（年级）对应的随机走子概率：`max(0, 1 - difficulty * 0.2)`。
pub fn randomness_for(difficulty: u8) -> f64 {
    (1.0 - f64::from(difficulty) * RANDOMNESS_STEP).max(0.0)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AiConfig {
    pub difficulty: u8,
    pub randomness: f64,
}

impl AiConfig {
    pub fn from_grade(grade: u8) -> Self {
        Self {
            difficulty: grade,
            randomness: randomness_for(grade),
        }
    }

    pub fn with_randomness(mut self, randomness: f64) -> Self {
        self.randomness = randomness.clamp(0.0, 1.0);
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_grade(1)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MoveReason {
    /// 随机门控命中，直接随机落子。
    Random,
    Win,
    Block,
    Search,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveDecision {
    pub cell: usize,
    pub reason: MoveReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    pub nodes: u64,
    pub depth_reached: u8,
}

impl MoveDecision {
    fn immediate(cell: usize, reason: MoveReason) -> Self {
        Self {
            cell,
            reason,
            score: None,
            nodes: 0,
            depth_reached: 0,
        }
    }
}

struct SearchStats {
    nodes: u64,
    depth_reached: u8,
}

impl SearchStats {
    fn new() -> Self {
        Self {
            nodes: 0,
            depth_reached: 0,
        }
    }
}

/// 为 `mark` 一方挑选落子格。棋盘已满时返回 `None`，调用方需自行避免。
pub fn choose_move<R: Rng>(
    board: &Board,
    mark: Mark,
    difficulty: u8,
    rng: &mut R,
) -> Option<MoveDecision> {
    decide(board, mark, &AiConfig::from_grade(difficulty), rng)
}

pub fn decide<R: Rng>(
    board: &Board,
    mark: Mark,
    config: &AiConfig,
    rng: &mut R,
) -> Option<MoveDecision> {
    let available = board.empty_cells();
    if available.is_empty() {
        return None;
    }

    // 随机门控必须在胜着/堵截/搜索之前判定
    let roll: f64 = rng.gen();
    if roll < config.randomness {
        let cell = *available.choose(rng)?;
        return Some(MoveDecision::immediate(cell, MoveReason::Random));
    }

    if let Some(cell) = completing_move(board, &available, mark) {
        return Some(MoveDecision::immediate(cell, MoveReason::Win));
    }

    if let Some(cell) = completing_move(board, &available, mark.opponent()) {
        return Some(MoveDecision::immediate(cell, MoveReason::Block));
    }

    Some(search_best_move(board, &available, mark))
}

fn completing_move(board: &Board, available: &[usize], mark: Mark) -> Option<usize> {
    available.iter().copied().find(|&cell| {
        matches!(
            check_winner(&board.with_move(cell, mark)),
            Some(Outcome::Winner { mark: winner }) if winner == mark
        )
    })
}

/// 完整极小化极大搜索（无剪枝）。同分时保留先枚举到的格子。
pub fn search_best_move(board: &Board, available: &[usize], mark: Mark) -> MoveDecision {
    let mut stats = SearchStats::new();
    let mut best_score = i32::MIN;
    let mut best_cell = available[0];

    for &cell in available {
        let mut scratch = board.with_move(cell, mark);
        let score = minimax(&mut scratch, 0, false, mark, &mut stats);
        if score > best_score {
            best_score = score;
            best_cell = cell;
        }
    }

    log::debug!(
        "minimax picked cell {} (score {}, {} nodes, depth {})",
        best_cell,
        best_score,
        stats.nodes,
        stats.depth_reached
    );

    MoveDecision {
        cell: best_cell,
        reason: MoveReason::Search,
        score: Some(best_score),
        nodes: stats.nodes,
        depth_reached: stats.depth_reached,
    }
}

fn minimax(
    board: &mut Board,
    depth: i32,
    maximizing: bool,
    mark: Mark,
    stats: &mut SearchStats,
) -> i32 {
    stats.nodes += 1;
    let depth_explored = u8::try_from(depth).unwrap_or(u8::MAX);
    if depth_explored > stats.depth_reached {
        stats.depth_reached = depth_explored;
    }

    match check_winner(board) {
        Some(Outcome::Winner { mark: winner }) if winner == mark => return WIN_SCORE - depth,
        Some(Outcome::Winner { .. }) => return depth - WIN_SCORE,
        Some(Outcome::Draw) => return 0,
        None => {}
    }

    let actor = if maximizing { mark } else { mark.opponent() };
    let mut value = if maximizing { i32::MIN } else { i32::MAX };
    for cell in 0..BOARD_CELLS {
        if !board.is_empty_at(cell) {
            continue;
        }
        board.place(cell, actor);
        let score = minimax(board, depth + 1, !maximizing, mark, stats);
        board.clear(cell);
        value = if maximizing {
            value.max(score)
        } else {
            value.min(score)
        };
    }
    value
}

pub struct TicTacToeAgent {
    config: AiConfig,
    rng: SmallRng,
}

impl TicTacToeAgent {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn decide(&mut self, board: &Board, mark: Mark) -> Option<MoveDecision> {
        decide(board, mark, &self.config, &mut self.rng)
    }
}
