//! 浏览器环境测试：`wasm-pack test --headless --firefox`

#![cfg(target_arch = "wasm32")]

use edu_arcade::{
    balance_questions_json, balance_questions_report_json, check_winner_js, set_log_level, start,
    think_tictactoe, Board, QuizEngine, TicTacToeEngine,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn balances_payload_from_js() {
    let payload = r#"[
        {"text": "1 + 1?", "options": ["2", "3", "4", "5"], "correctAnswerIndex": 0},
        {"text": "2 + 2?", "options": ["3", "4", "5", "6"], "correctAnswerIndex": 1},
        {"text": "3 + 3?", "options": ["5", "6", "7", "8"], "correctAnswerIndex": 1}
    ]"#;
    let json = balance_questions_json(payload, Some(11)).expect("balanced");
    let questions: Vec<serde_json::Value> = serde_json::from_str(&json).expect("json");
    assert_eq!(questions.len(), 3);
    assert!(questions[0]["id"].as_str().expect("id").starts_with("gen-"));
    assert!(questions[2]["id"].as_str().expect("id").ends_with("-2"));
}

#[wasm_bindgen_test]
fn rejects_non_array_payload() {
    assert!(balance_questions_json("{}", None).is_err());
}

#[wasm_bindgen_test]
fn empty_board_has_no_winner() {
    let board = serde_wasm_bindgen::to_value(&vec![None::<String>; 9]).expect("board");
    let outcome = check_winner_js(board).expect("outcome");
    assert_eq!(outcome, JsValue::UNDEFINED);
}

#[wasm_bindgen_test]
fn engine_answers_human_move() {
    let mut engine = TicTacToeEngine::new(5, Some(3));
    engine.play(4).expect("human move");
    let step = engine.play_ai().expect("ai move");
    let step: serde_json::Value = serde_json::from_str(&step).expect("json");
    assert_eq!(step["state"]["history"].as_array().map(Vec::len), Some(2));
}

#[wasm_bindgen_test]
fn quiz_engine_runs_to_completion() {
    let quiz = r#"{
        "id": "quiz-1", "title": "Soma", "subject": "Matemática",
        "questions": [{"text": "1 + 1?", "options": ["2", "3", "4", "5"], "correctAnswerIndex": 0}]
    }"#;
    let mut engine = QuizEngine::new(quiz).expect("quiz");
    engine.answer(0).expect("answer");
    assert!(!engine.next().expect("next"));
    let result: serde_json::Value =
        serde_json::from_str(&engine.result_json("aluno-1").expect("result")).expect("json");
    assert_eq!(result["score"], 10);
    assert_eq!(result["maxScore"], 10);
}

#[wasm_bindgen_test]
fn report_lists_patched_items() {
    let payload = r#"[
        {"text": "Sem opções", "correctAnswerIndex": 0},
        {"text": "2 + 2?", "options": ["3", "4", "5", "6"], "correctAnswerIndex": 1}
    ]"#;
    let json = balance_questions_report_json(payload, Some(0), Some(4)).expect("report");
    let report: serde_json::Value = serde_json::from_str(&json).expect("json");
    assert_eq!(report["patched"], serde_json::json!([0]));
    assert_eq!(report["questions"][0]["options"].as_array().map(Vec::len), Some(4));
    assert_ne!(
        report["questions"][0]["correctAnswerIndex"],
        report["questions"][1]["correctAnswerIndex"]
    );
}

#[wasm_bindgen_test]
async fn thinking_resolves_to_an_open_cell() {
    let board = Board::parse("XX. .O. ...").expect("layout");
    let value = serde_wasm_bindgen::to_value(&board).expect("board");
    let resolved = JsFuture::from(think_tictactoe(value, "O".into(), 5, Some(10)))
        .await
        .expect("decision");
    let json = resolved.as_string().expect("json string");
    let decision: serde_json::Value = serde_json::from_str(&json).expect("json");
    let cell = decision["cell"].as_u64().expect("cell") as usize;
    assert!(board.is_empty_at(cell));
    assert_eq!(cell, 2);
    assert_eq!(decision["reason"], "block");
}

#[wasm_bindgen_test]
async fn thinking_on_a_full_board_rejects() {
    let board = Board::parse("XOX XOO OXX").expect("layout");
    let value = serde_wasm_bindgen::to_value(&board).expect("board");
    let outcome = JsFuture::from(think_tictactoe(value, "O".into(), 5, Some(0))).await;
    assert!(outcome.is_err());
}

#[wasm_bindgen_test]
fn log_level_can_be_raised_and_lowered() {
    start();
    start();
    set_log_level("debug").expect("debug");
    assert_eq!(log::max_level(), log::LevelFilter::Debug);
    set_log_level("warn").expect("warn");
    assert_eq!(log::max_level(), log::LevelFilter::Warn);
    assert!(set_log_level("loud").is_err());
}
