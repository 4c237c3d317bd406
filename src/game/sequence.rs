use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const PAD_COUNT: u8 = 4;
const MIN_SPEED_MS: u32 = 250;
const BASE_SPEED_MS: u32 = 900;
const SPEED_STEP_MS: u32 = 120;

/// 每个色块亮起的时长（毫秒），年级越高越快，最低 250ms。
pub fn playback_speed_ms(grade: u8) -> u32 {
    BASE_SPEED_MS
        .saturating_sub(u32::from(grade) * SPEED_STEP_MS)
        .max(MIN_SPEED_MS)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum PressOutcome {
    Ignored,
    Correct,
    LevelUp { level: usize },
    Wrong { level: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SequenceGame {
    pub grade: u8,
    pub sequence: Vec<u8>,
    pub step: usize,
    pub game_over: bool,
}

impl SequenceGame {
    pub fn new(grade: u8) -> Self {
        Self {
            grade,
            sequence: Vec::new(),
            step: 0,
            game_over: false,
        }
    }

    pub fn speed_ms(&self) -> u32 {
        playback_speed_ms(self.grade)
    }

    pub fn level(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_started(&self) -> bool {
        !self.sequence.is_empty()
    }

    pub fn start<R: Rng>(&mut self, rng: &mut R) {
        self.sequence = vec![rng.gen_range(0..PAD_COUNT)];
        self.step = 0;
        self.game_over = false;
    }

    pub fn press<R: Rng>(&mut self, pad: u8, rng: &mut R) -> Result<PressOutcome, GameError> {
        if pad >= PAD_COUNT {
            return Err(GameError::PadOutOfRange { pad });
        }
        if self.game_over || !self.is_started() {
            return Ok(PressOutcome::Ignored);
        }

        if self.sequence.get(self.step) != Some(&pad) {
            self.game_over = true;
            log::debug!("sequence broken at level {}", self.level());
            return Ok(PressOutcome::Wrong {
                level: self.level(),
            });
        }

        if self.step + 1 == self.sequence.len() {
            self.step = 0;
            self.sequence.push(rng.gen_range(0..PAD_COUNT));
            return Ok(PressOutcome::LevelUp {
                level: self.level(),
            });
        }

        self.step += 1;
        Ok(PressOutcome::Correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn speed_scales_with_grade() {
        assert_eq!(playback_speed_ms(1), 780);
        assert_eq!(playback_speed_ms(5), 300);
        assert_eq!(playback_speed_ms(6), 250);
        assert_eq!(playback_speed_ms(0), 900);
    }

    #[test]
    fn repeating_sequence_levels_up() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut game = SequenceGame::new(2);
        assert_eq!(game.press(0, &mut rng), Ok(PressOutcome::Ignored));

        game.start(&mut rng);
        for round in 1..5 {
            assert_eq!(game.level(), round);
            let replay = game.sequence.clone();
            for (index, pad) in replay.iter().enumerate() {
                let outcome = game.press(*pad, &mut rng).expect("valid pad");
                if index + 1 == replay.len() {
                    assert_eq!(outcome, PressOutcome::LevelUp { level: round + 1 });
                } else {
                    assert_eq!(outcome, PressOutcome::Correct);
                }
            }
        }
    }

    #[test]
    fn wrong_pad_ends_game() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut game = SequenceGame::new(1);
        game.start(&mut rng);
        let wrong = (game.sequence[0] + 1) % PAD_COUNT;
        assert_eq!(game.press(wrong, &mut rng), Ok(PressOutcome::Wrong { level: 1 }));
        assert!(game.game_over);
        assert_eq!(game.press(wrong, &mut rng), Ok(PressOutcome::Ignored));
        assert_eq!(
            game.press(7, &mut rng),
            Err(GameError::PadOutOfRange { pad: 7 })
        );
    }
}
