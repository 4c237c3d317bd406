use serde::{Deserialize, Serialize};

use super::board::{check_winner, Board, Mark, Outcome, BOARD_CELLS};
use crate::ai::{MoveDecision, TicTacToeAgent};
use crate::error::GameError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveRecord {
    pub mark: Mark,
    pub cell: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum MatchStatus {
    HumanTurn,
    AiTurn,
    HumanWon,
    AiWon,
    Draw,
}

/// 人机对局：玩家执 X 先手，AI 执 O。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicTacToeMatch {
    pub board: Board,
    pub next: Mark,
    pub human: Mark,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<MoveRecord>,
}

impl TicTacToeMatch {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            next: Mark::X,
            human: Mark::X,
            outcome: None,
            history: Vec::new(),
        }
    }

    pub fn ai_mark(&self) -> Mark {
        self.human.opponent()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn status(&self) -> MatchStatus {
        match self.outcome {
            Some(Outcome::Winner { mark }) if mark == self.human => MatchStatus::HumanWon,
            Some(Outcome::Winner { .. }) => MatchStatus::AiWon,
            Some(Outcome::Draw) => MatchStatus::Draw,
            None if self.next == self.human => MatchStatus::HumanTurn,
            None => MatchStatus::AiTurn,
        }
    }

    pub fn play(&mut self, cell: usize) -> Result<MatchStatus, GameError> {
        self.ensure_open()?;
        if self.next != self.human {
            return Err(GameError::NotYourTurn);
        }
        self.apply(cell, self.human)?;
        Ok(self.status())
    }

    pub fn play_ai(&mut self, agent: &mut TicTacToeAgent) -> Result<MoveDecision, GameError> {
        self.ensure_open()?;
        let mark = self.ai_mark();
        if self.next != mark {
            return Err(GameError::NotYourTurn);
        }
        let decision = agent.decide(&self.board, mark).ok_or(GameError::BoardFull)?;
        self.apply(decision.cell, mark)?;
        Ok(decision)
    }

    pub fn reset(&mut self) {
        *self = Self {
            human: self.human,
            ..Self::new()
        };
    }

    fn ensure_open(&self) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    fn apply(&mut self, cell: usize, mark: Mark) -> Result<(), GameError> {
        if cell >= BOARD_CELLS {
            return Err(GameError::CellOutOfRange { index: cell });
        }
        if !self.board.is_empty_at(cell) {
            return Err(GameError::CellOccupied { index: cell });
        }
        self.board.place(cell, mark);
        self.history.push(MoveRecord { mark, cell });
        self.outcome = check_winner(&self.board);
        if self.outcome.is_none() {
            self.next = mark.opponent();
        }
        Ok(())
    }
}

impl Default for TicTacToeMatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiConfig;

    #[test]
    fn human_moves_first_and_turns_alternate() {
        let mut game = TicTacToeMatch::new();
        assert_eq!(game.status(), MatchStatus::HumanTurn);
        assert_eq!(game.play(4), Ok(MatchStatus::AiTurn));
        assert_eq!(game.play(0), Err(GameError::NotYourTurn));

        let mut agent = TicTacToeAgent::with_seed(AiConfig::from_grade(5), 11);
        let decision = game.play_ai(&mut agent).expect("ai should move");
        assert_ne!(decision.cell, 4);
        assert_eq!(game.status(), MatchStatus::HumanTurn);
        assert_eq!(game.history.len(), 2);
    }

    #[test]
    fn rejects_occupied_and_out_of_range_cells() {
        let mut game = TicTacToeMatch::new();
        assert_eq!(game.play(9), Err(GameError::CellOutOfRange { index: 9 }));
        game.play(0).expect("first move");
        game.next = Mark::X;
        assert_eq!(game.play(0), Err(GameError::CellOccupied { index: 0 }));
    }

    #[test]
    fn ai_wins_when_human_leaves_line_open() {
        let mut game = TicTacToeMatch::new();
        let mut agent = TicTacToeAgent::with_seed(AiConfig::from_grade(5), 5);
        game.play(0).expect("x");
        game.play_ai(&mut agent).expect("o");
        game.play(1).expect("x");
        // 堵在 2
        let block = game.play_ai(&mut agent).expect("o");
        assert_eq!(block.cell, 2);
        game.play(8).expect("x");
        // AI 不败，最终状态只可能是平局或 AI 胜
        while !game.is_finished() {
            if game.next == game.human {
                let cell = game.board.empty_cells()[0];
                game.play(cell).expect("x");
            } else {
                game.play_ai(&mut agent).expect("o");
            }
        }
        assert!(matches!(game.status(), MatchStatus::AiWon | MatchStatus::Draw));
        assert_eq!(game.play(3), Err(GameError::GameOver));
    }

    #[test]
    fn reset_clears_board() {
        let mut game = TicTacToeMatch::new();
        game.play(4).expect("x");
        game.reset();
        assert_eq!(game, TicTacToeMatch::new());
    }
}
