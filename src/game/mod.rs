//! 小游戏核心逻辑：井字棋棋盘与对局、数学记忆翻牌、序列记忆、限时口算。

pub mod board;
pub mod memory;
pub mod sequence;
pub mod speed_math;
pub mod tictactoe;

pub use board::{check_winner, Board, Cell, Mark, Outcome, BOARD_CELLS, WINNING_LINES};
pub use memory::{generate_pairs, CardKind, EquationPair, FlipOutcome, MemoryCard, MemoryGame};
pub use sequence::{playback_speed_ms, PressOutcome, SequenceGame, PAD_COUNT};
pub use speed_math::{generate_problem, AnswerFeedback, MathProblem, Operation, SpeedMathGame};
pub use tictactoe::{MatchStatus, MoveRecord, TicTacToeMatch};
