use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::balancer::ANSWER_SLOTS;
use super::player::QuizDifficulty;
use super::question::Question;

pub const DEFAULT_QUESTION_COUNT: usize = 5;
/// 排除列表只带最近的 30 条题干，避免提示词过长。
pub const MAX_EXCLUDED_TEXTS: usize = 30;

pub const SYSTEM_INSTRUCTION: &str = "Você é um assistente educacional especializado em criar conteúdo para ensino fundamental.
Seu tom deve ser encorajador e claro.
Sempre gere perguntas apropriadas para a série escolar especificada.
O sistema irá gerenciar o posicionamento das respostas para garantir variedade máxima.
Forneça sempre 4 opções de resposta claras e distintas.
IMPORTANTE: Você deve ser criativo e variar os temas e abordagens. Não repita perguntas ou conceitos idênticos aos fornecidos na lista de exclusão.";

fn default_count() -> usize {
    DEFAULT_QUESTION_COUNT
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub subject: String,
    #[serde(default)]
    pub difficulty: QuizDifficulty,
    pub topic: String,
    pub grade: u8,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_texts: Vec<String>,
}

impl GenerationRequest {
    pub fn new(subject: impl Into<String>, topic: impl Into<String>, grade: u8) -> Self {
        Self {
            subject: subject.into(),
            difficulty: QuizDifficulty::default(),
            topic: topic.into(),
            grade,
            count: DEFAULT_QUESTION_COUNT,
            exclude_texts: Vec::new(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: QuizDifficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn excluding<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_texts.extend(texts.into_iter().map(Into::into));
        self
    }

    pub fn prompt(&self) -> String {
        let mut prompt = format!(
            "Crie {count} perguntas de múltipla escolha sobre {subject}, tópico: \"{topic}\".\n\
             Público Alvo: Alunos do {grade}º Ano do Ensino Fundamental (Brasil).\n\
             Dificuldade: {difficulty}.\n\
             A linguagem deve ser adequada para a idade dessa série.\n\
             Para cada pergunta, forneça exatamente {slots} opções de resposta e uma explicação curta do motivo da resposta correta.",
            count = self.count,
            subject = self.subject,
            topic = self.topic,
            grade = self.grade,
            difficulty = self.difficulty.label(),
            slots = ANSWER_SLOTS,
        );

        if !self.exclude_texts.is_empty() {
            let start = self.exclude_texts.len().saturating_sub(MAX_EXCLUDED_TEXTS);
            prompt.push_str(
                "\n\nIMPORTANTE: Não gere perguntas parecidas com estas (já existentes): ",
            );
            prompt.push_str(&self.exclude_texts[start..].join(" | "));
        }
        prompt
    }
}

/// 生成服务要求的 JSON 响应结构。
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "text": { "type": "STRING", "description": "O enunciado da pergunta." },
                "options": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Lista com exatamente 4 opções de resposta."
                },
                "correctAnswerIndex": {
                    "type": "INTEGER",
                    "description": "O índice (0-3) da resposta correta na lista original."
                },
                "explanation": {
                    "type": "STRING",
                    "description": "Explicação curta de porque a resposta está correta."
                }
            },
            "required": ["text", "options", "correctAnswerIndex", "explanation"]
        }
    })
}

/// 生成失败时展示给学生的占位题。
pub fn fallback_questions<R: Rng>(rng: &mut R) -> Vec<Question> {
    vec![Question {
        id: "err-1".into(),
        text: "Houve um probleminha ao conectar com a nossa IA. Podemos tentar de novo?".into(),
        options: vec![
            "Sim, vamos tentar!".into(),
            "Claro".into(),
            "Pode ser".into(),
            "Com certeza".into(),
        ],
        correct_answer_index: rng.gen_range(0..ANSWER_SLOTS as u8),
        explanation: Some(
            "O servidor de inteligência artificial pode estar ocupado no momento.".into(),
        ),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn prompt_mentions_grade_topic_and_difficulty() {
        let request = GenerationRequest::new("Ciências", "Sistema Solar", 4)
            .with_difficulty(QuizDifficulty::Hard)
            .with_count(8);
        let prompt = request.prompt();
        assert!(prompt.starts_with("Crie 8 perguntas de múltipla escolha sobre Ciências"));
        assert!(prompt.contains("tópico: \"Sistema Solar\""));
        assert!(prompt.contains("4º Ano"));
        assert!(prompt.contains("Dificuldade: Difícil."));
        assert!(!prompt.contains("IMPORTANTE"));
    }

    #[test]
    fn prompt_keeps_only_recent_exclusions() {
        let texts: Vec<String> = (0..40).map(|i| format!("pergunta {i}")).collect();
        let prompt = GenerationRequest::new("História", "Descobrimento", 5)
            .excluding(texts)
            .prompt();
        assert!(prompt.contains("já existentes): pergunta 10 | pergunta 11"));
        assert!(prompt.ends_with("pergunta 39"));
        assert!(!prompt.contains("pergunta 9 |"));
    }

    #[test]
    fn request_defaults_when_deserialized() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{"subject": "Português", "topic": "Substantivos", "grade": 2}"#,
        )
        .expect("deserialize");
        assert_eq!(request.count, DEFAULT_QUESTION_COUNT);
        assert_eq!(request.difficulty, QuizDifficulty::Easy);
    }

    #[test]
    fn fallback_has_valid_answer_slot() {
        let mut rng = SmallRng::seed_from_u64(12);
        let questions = fallback_questions(&mut rng);
        assert_eq!(questions.len(), 1);
        assert!(questions[0].correct_answer_index < 4);
        assert_eq!(response_schema()["items"]["required"][2], "correctAnswerIndex");
    }
}
