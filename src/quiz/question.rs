use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QuizError;

/// 多选题，固定 4 个选项。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer_index: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn correct_text(&self) -> Option<&str> {
        self.options
            .get(usize::from(self.correct_answer_index))
            .map(String::as_str)
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == usize::from(self.correct_answer_index)
    }
}

/// 题目生成服务返回的原始条目，字段均可能缺失或格式不对。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawQuestion {
    pub text: String,
    pub options: Option<Vec<String>>,
    pub correct_answer_index: Option<i64>,
    pub explanation: Option<String>,
}

impl RawQuestion {
    pub fn new<S: Into<String>>(
        text: impl Into<String>,
        options: impl IntoIterator<Item = S>,
        correct_answer_index: i64,
    ) -> Self {
        Self {
            text: text.into(),
            options: Some(options.into_iter().map(Into::into).collect()),
            correct_answer_index: Some(correct_answer_index),
            explanation: None,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn from_value(value: &Value) -> Self {
        let text = value.get("text").map(value_to_text).unwrap_or_default();
        let options = value
            .get("options")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(value_to_text).collect());
        let correct_answer_index = value.get("correctAnswerIndex").and_then(|index| {
            index
                .as_i64()
                .or_else(|| index.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .or_else(|| index.as_str().and_then(|s| s.trim().parse().ok()))
        });
        let explanation = value
            .get("explanation")
            .map(value_to_text)
            .filter(|text| !text.is_empty());

        Self {
            text,
            options,
            correct_answer_index,
            explanation,
        }
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// 解析生成服务的 JSON 负载。只有非 JSON 或非数组时报错，单条内容从宽处理。
pub fn parse_raw_questions(payload: &str) -> Result<Vec<RawQuestion>, QuizError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|error| QuizError::MalformedPayload {
            reason: error.to_string(),
        })?;
    let items = value.as_array().ok_or_else(|| QuizError::MalformedPayload {
        reason: "expected a JSON array".into(),
    })?;
    Ok(items.iter().map(RawQuestion::from_value).collect())
}
