//! 跨越 wasm 边界的错误类型，序列化为带 `type` 字段的对象。

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameError {
    #[error("game is already over")]
    GameOver,
    #[error("it is not this player's turn")]
    NotYourTurn,
    #[error("cell {index} is outside the board")]
    CellOutOfRange { index: usize },
    #[error("cell {index} is already taken")]
    CellOccupied { index: usize },
    #[error("no empty cell left to play")]
    BoardFull,
    #[error("pad {pad} does not exist")]
    PadOutOfRange { pad: u8 },
    #[error("card {card_id} not found")]
    CardNotFound { card_id: String },
    #[error("round has not started")]
    NotStarted,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum QuizError {
    #[error("malformed question payload: {reason}")]
    MalformedPayload { reason: String },
    #[error("quiz has no questions")]
    EmptyQuiz,
    #[error("question {question} was already answered")]
    AlreadyAnswered { question: usize },
    #[error("question {question} has not been answered yet")]
    NotAnswered { question: usize },
    #[error("option {option} is outside the 4 answer slots")]
    OptionOutOfRange { option: usize },
    #[error("quiz is already finished")]
    Finished,
}
