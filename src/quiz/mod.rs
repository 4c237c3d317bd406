//! 题目：生成负载解析、正确答案位置均衡、答题流程与生成提示词。

pub mod balancer;
pub mod player;
pub mod prompt;
pub mod question;

pub use balancer::{
    assign_ids, assign_slots, balance_questions, balance_questions_with_report, BalanceReport,
    BalancerConfig, ANSWER_SLOTS,
};
pub use player::{Quiz, QuizDifficulty, QuizFeedback, QuizResult, QuizSession, POINTS_PER_QUESTION};
pub use prompt::{fallback_questions, response_schema, GenerationRequest, SYSTEM_INSTRUCTION};
pub use question::{parse_raw_questions, Question, RawQuestion};
