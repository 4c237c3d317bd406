//! 井字棋对手：随机门控 + 胜着/堵截 + 完整极小化极大搜索。

pub mod minimax;

pub use minimax::{
    choose_move, decide, randomness_for, search_best_move, AiConfig, MoveDecision, MoveReason,
    TicTacToeAgent,
};
