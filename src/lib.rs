pub mod ai;
pub mod error;
pub mod game;
pub mod quiz;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use once_cell::sync::Lazy;
use rand::rngs::SmallRng;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::{Date, Promise};

pub use ai::{choose_move, AiConfig, MoveDecision, MoveReason, TicTacToeAgent};
pub use error::{GameError, QuizError};
pub use game::{
    check_winner, Board, Cell, FlipOutcome, Mark, MatchStatus, MemoryGame, Outcome, PressOutcome,
    SequenceGame, SpeedMathGame, TicTacToeMatch,
};
pub use quiz::{
    assign_ids, balance_questions, balance_questions_with_report, parse_raw_questions,
    BalanceReport, BalancerConfig, GenerationRequest, Question, Quiz, QuizResult, QuizSession,
    RawQuestion,
};

use utils::{make_rng, set_panic_hook};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// AI 落子前的“思考”时间。
const DEFAULT_THINK_DELAY_MS: u32 = 600;

// 放进 Lazy 里，控制台日志只会安装一次；记录器本身不过滤，实际级别由 `log::max_level` 控制
static LOGGER: Lazy<()> = Lazy::new(|| {
    wasm_logger::init(wasm_logger::Config::new(log::Level::Trace));
    log::set_max_level(log::LevelFilter::Info);
    log::info!("logging initialized");
});

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    Lazy::force(&LOGGER);
}

/// 调整控制台日志级别（"error" / "warn" / "info" / "debug" / "trace"）。
#[wasm_bindgen(js_name = "setLogLevel")]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let level = log::Level::from_str(level).map_err(serde_to_js_error)?;
    log::set_max_level(level.to_level_filter());
    Ok(())
}

fn to_js_error<E: Serialize>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(serde_to_js_error)
}

fn seeded_rng(seed: Option<u32>) -> SmallRng {
    make_rng(seed.map(u64::from))
}

fn parse_mark(mark: &str) -> Result<Mark, JsValue> {
    Mark::from_str(mark).map_err(|_| JsValue::from_str(&format!("unknown mark: {mark}")))
}

fn generation_prefix() -> String {
    format!("gen-{}", Date::now() as u64)
}

#[derive(Serialize)]
struct Step<'a, T, S> {
    outcome: T,
    state: &'a S,
}

fn step_json<T: Serialize, S: Serialize>(outcome: T, state: &S) -> Result<String, JsValue> {
    to_json(&Step { outcome, state })
}

/// 均衡生成服务返回的题目，并分配 `gen-<时间戳>-<序号>` 形式的 id。
#[wasm_bindgen(js_name = "balanceQuestions")]
pub fn balance_questions_json(payload: &str, seed: Option<u32>) -> Result<String, JsValue> {
    let raw = parse_raw_questions(payload).map_err(to_js_error)?;
    let mut rng = seeded_rng(seed);
    let mut questions = balance_questions(&raw, &mut rng);
    assign_ids(&mut questions, &generation_prefix());
    to_json(&questions)
}

/// 同 `balanceQuestions`，额外返回修补与重排信息。
#[wasm_bindgen(js_name = "balanceQuestionsReport")]
pub fn balance_questions_report_json(
    payload: &str,
    max_reshuffles: Option<u8>,
    seed: Option<u32>,
) -> Result<String, JsValue> {
    let raw = parse_raw_questions(payload).map_err(to_js_error)?;
    let mut config = BalancerConfig::default();
    if let Some(max_reshuffles) = max_reshuffles {
        config.max_reshuffles = max_reshuffles;
    }
    let mut rng = seeded_rng(seed);
    let mut report = balance_questions_with_report(&raw, &config, &mut rng);
    assign_ids(&mut report.questions, &generation_prefix());
    to_json(&report)
}

#[wasm_bindgen(js_name = "buildGenerationPrompt")]
pub fn build_generation_prompt(request: JsValue) -> Result<String, JsValue> {
    let request: GenerationRequest = from_value(request).map_err(JsValue::from)?;
    Ok(request.prompt())
}

#[wasm_bindgen(js_name = "generationSystemInstruction")]
pub fn generation_system_instruction() -> String {
    quiz::SYSTEM_INSTRUCTION.to_string()
}

/// 响应结构以 JSON 字符串返回，保持对象而不是 `Map`。
#[wasm_bindgen(js_name = "generationSchema")]
pub fn generation_schema() -> Result<String, JsValue> {
    to_json(&quiz::response_schema())
}

#[wasm_bindgen(js_name = "fallbackQuestions")]
pub fn fallback_questions() -> Result<JsValue, JsValue> {
    let mut rng = make_rng(None);
    to_value(&quiz::fallback_questions(&mut rng)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "checkWinner")]
pub fn check_winner_js(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&check_winner(&board)).map_err(JsValue::from)
}

/// 按年级选择难度，为 `mark` 计算一步棋。
#[wasm_bindgen(js_name = "computeTicTacToeMove")]
pub fn compute_tictactoe_move(board: JsValue, mark: &str, grade: u8) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let mark = parse_mark(mark)?;
    let mut rng = make_rng(None);
    let decision =
        choose_move(&board, mark, grade, &mut rng).ok_or_else(|| to_js_error(GameError::BoardFull))?;
    to_value(&decision).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "thinkTicTacToe")]
pub fn think_tictactoe(
    board: JsValue,
    mark: String,
    grade: u8,
    delay_ms: Option<u32>,
) -> Promise {
    let parsed = from_value::<Board>(board)
        .map_err(JsValue::from)
        .and_then(|board| parse_mark(&mark).map(|mark| (board, mark)));
    let delay = delay_ms.unwrap_or(DEFAULT_THINK_DELAY_MS);

    future_to_promise(async move {
        let (board, mark) = parsed?;
        if delay > 0 {
            TimeoutFuture::new(delay).await;
        }
        let mut agent = TicTacToeAgent::new(AiConfig::from_grade(grade));
        let decision = agent
            .decide(&board, mark)
            .ok_or_else(|| to_js_error(GameError::BoardFull))?;
        Ok(JsValue::from_str(&to_json(&decision)?))
    })
}

#[wasm_bindgen]
pub struct TicTacToeEngine {
    game: TicTacToeMatch,
    agent: TicTacToeAgent,
}

#[wasm_bindgen]
impl TicTacToeEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(grade: u8, seed: Option<u32>) -> TicTacToeEngine {
        let config = AiConfig::from_grade(grade);
        let agent = match seed {
            Some(seed) => TicTacToeAgent::with_seed(config, u64::from(seed)),
            None => TicTacToeAgent::new(config),
        };
        TicTacToeEngine {
            game: TicTacToeMatch::new(),
            agent,
        }
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        to_json(&self.game)
    }

    pub fn status_json(&self) -> Result<String, JsValue> {
        to_json(&self.game.status())
    }

    pub fn play(&mut self, cell: usize) -> Result<String, JsValue> {
        let status = self.game.play(cell).map_err(to_js_error)?;
        step_json(status, &self.game)
    }

    pub fn play_ai(&mut self) -> Result<String, JsValue> {
        let decision = self.game.play_ai(&mut self.agent).map_err(to_js_error)?;
        step_json(decision, &self.game)
    }

    pub fn reset(&mut self) -> Result<String, JsValue> {
        self.game.reset();
        to_json(&self.game)
    }
}

#[wasm_bindgen]
pub struct MemoryEngine {
    game: MemoryGame,
    rng: SmallRng,
}

#[wasm_bindgen]
impl MemoryEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(grade: u8, seed: Option<u32>) -> MemoryEngine {
        let mut rng = seeded_rng(seed);
        let game = MemoryGame::new(grade, &mut rng);
        MemoryEngine { game, rng }
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        to_json(&self.game)
    }

    pub fn flip(&mut self, card_id: &str) -> Result<String, JsValue> {
        let outcome = self.game.flip(card_id).map_err(to_js_error)?;
        step_json(outcome, &self.game)
    }

    pub fn resolve_mismatch(&mut self) -> Result<String, JsValue> {
        self.game.resolve_mismatch();
        to_json(&self.game)
    }

    pub fn restart(&mut self) -> Result<String, JsValue> {
        self.game = MemoryGame::new(self.game.grade, &mut self.rng);
        to_json(&self.game)
    }
}

#[wasm_bindgen]
pub struct SequenceEngine {
    game: SequenceGame,
    rng: SmallRng,
}

#[wasm_bindgen]
impl SequenceEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(grade: u8, seed: Option<u32>) -> SequenceEngine {
        SequenceEngine {
            game: SequenceGame::new(grade),
            rng: seeded_rng(seed),
        }
    }

    pub fn speed_ms(&self) -> u32 {
        self.game.speed_ms()
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        to_json(&self.game)
    }

    pub fn start(&mut self) -> Result<String, JsValue> {
        self.game.start(&mut self.rng);
        to_json(&self.game)
    }

    pub fn press(&mut self, pad: u8) -> Result<String, JsValue> {
        let outcome = self.game.press(pad, &mut self.rng).map_err(to_js_error)?;
        step_json(outcome, &self.game)
    }
}

#[wasm_bindgen]
pub struct SpeedMathEngine {
    game: SpeedMathGame,
    rng: SmallRng,
}

#[wasm_bindgen]
impl SpeedMathEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(grade: u8, seed: Option<u32>) -> SpeedMathEngine {
        SpeedMathEngine {
            game: SpeedMathGame::new(grade),
            rng: seeded_rng(seed),
        }
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        to_json(&self.game)
    }

    pub fn start(&mut self) -> Result<String, JsValue> {
        self.game.start(&mut self.rng);
        to_json(&self.game)
    }

    pub fn answer(&mut self, value: i32) -> Result<String, JsValue> {
        let feedback = self.game.answer(value, &mut self.rng).map_err(to_js_error)?;
        step_json(feedback, &self.game)
    }

    /// 由前端每秒调用一次。
    pub fn tick(&mut self) -> u32 {
        self.game.tick()
    }
}

#[wasm_bindgen]
pub struct QuizEngine {
    session: QuizSession,
}

#[wasm_bindgen]
impl QuizEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(quiz_json: &str) -> Result<QuizEngine, JsValue> {
        let quiz: Quiz = serde_json::from_str(quiz_json).map_err(serde_to_js_error)?;
        let session = QuizSession::new(quiz).map_err(to_js_error)?;
        Ok(QuizEngine { session })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        to_json(&self.session)
    }

    pub fn current_question_json(&self) -> Result<String, JsValue> {
        to_json(&self.session.current_question())
    }

    pub fn progress(&self) -> f64 {
        self.session.progress()
    }

    pub fn answer(&mut self, option: usize) -> Result<String, JsValue> {
        let feedback = self.session.answer(option).map_err(to_js_error)?;
        to_json(&feedback)
    }

    /// 返回 `false` 表示已经答完最后一题。
    pub fn next(&mut self) -> Result<bool, JsValue> {
        self.session.next().map_err(to_js_error)
    }

    pub fn result_json(&self, student_id: &str) -> Result<String, JsValue> {
        let result = self
            .session
            .result(student_id, Date::now() as u64)
            .map_err(to_js_error)?;
        to_json(&result)
    }
}
