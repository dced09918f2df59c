// src/dataset/mod.rs — Question sources

pub mod hotpotqa;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::infra::errors::ReviseLabError;

/// One input question with an optional gold answer.
///
/// Accepts `gold_answer` or `answer`, each either a string or a list whose
/// first element is used. Unknown fields are ignored, so HotpotQA rows
/// load as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRecord")]
pub struct QuestionRecord {
    pub question: String,
    pub gold_answer: Option<String>,
}

impl QuestionRecord {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            gold_answer: None,
        }
    }

    pub fn with_gold(mut self, gold: impl Into<String>) -> Self {
        self.gold_answer = Some(gold.into());
        self
    }
}

#[derive(Deserialize)]
struct RawRecord {
    question: String,
    #[serde(default)]
    gold_answer: Option<GoldField>,
    #[serde(default)]
    answer: Option<GoldField>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GoldField {
    One(String),
    Many(Vec<String>),
}

impl GoldField {
    fn into_answer(self) -> Option<String> {
        match self {
            GoldField::One(s) => Some(s),
            GoldField::Many(v) => v.into_iter().next(),
        }
        .filter(|s| !s.trim().is_empty())
    }
}

impl From<RawRecord> for QuestionRecord {
    fn from(raw: RawRecord) -> Self {
        let gold_answer = raw
            .gold_answer
            .and_then(GoldField::into_answer)
            .or_else(|| raw.answer.and_then(GoldField::into_answer));
        Self {
            question: raw.question,
            gold_answer,
        }
    }
}

fn read_records(path: &Path) -> Result<Vec<QuestionRecord>, ReviseLabError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ReviseLabError::Configuration(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        ReviseLabError::Configuration(format!("invalid question file {}: {}", path.display(), e))
    })
}

/// Load a user-provided JSON array of question objects.
pub fn load_custom_questions(path: &Path) -> Result<Vec<QuestionRecord>, ReviseLabError> {
    tracing::info!("Loading custom questions from {}", path.display());
    let records = read_records(path)?;
    tracing::info!("Loaded {} custom questions", records.len());
    Ok(records)
}

/// Reload a sample previously written by [`hotpotqa::HotpotQaSampler`].
pub fn load_cached_sample(path: &Path) -> Result<Vec<QuestionRecord>, ReviseLabError> {
    let records = read_records(path)?;
    if records.is_empty() {
        return Err(ReviseLabError::Configuration(format!(
            "cached sample {} is empty",
            path.display()
        )));
    }
    tracing::info!("Reusing {} cached questions from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(v: serde_json::Value) -> QuestionRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_question_only() {
        let r = parse(serde_json::json!({"question": "What is the capital of France?"}));
        assert_eq!(r, QuestionRecord::new("What is the capital of France?"));
    }

    #[test]
    fn test_gold_answer_field_wins() {
        let r = parse(serde_json::json!({"question": "q", "gold_answer": "a", "answer": "b"}));
        assert_eq!(r.gold_answer.as_deref(), Some("a"));
    }

    #[test]
    fn test_answer_string_or_list() {
        let r = parse(serde_json::json!({"question": "q", "answer": "yes"}));
        assert_eq!(r.gold_answer.as_deref(), Some("yes"));
        let r = parse(serde_json::json!({"question": "q", "answer": ["first", "second"]}));
        assert_eq!(r.gold_answer.as_deref(), Some("first"));
        let r = parse(serde_json::json!({"question": "q", "answer": []}));
        assert_eq!(r.gold_answer, None);
    }

    #[test]
    fn test_hotpot_row_extra_fields_ignored() {
        let r = parse(serde_json::json!({
            "id": "5a8b57f25542995d1e6f1371",
            "question": "Were Scott Derrickson and Ed Wood of the same nationality?",
            "answer": "yes",
            "type": "comparison",
            "level": "hard",
            "supporting_facts": {"title": [], "sent_id": []},
            "context": {"title": [], "sentences": []}
        }));
        assert_eq!(r.gold_answer.as_deref(), Some("yes"));
    }

    #[test]
    fn test_missing_question_rejected() {
        let r: Result<QuestionRecord, _> = serde_json::from_value(serde_json::json!({"answer": "x"}));
        assert!(r.is_err());
    }

    #[test]
    fn test_load_custom_questions_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(
            &path,
            r#"[{"question": "Who wrote Hamlet?", "gold_answer": "Shakespeare"}, {"question": "2+2?"}]"#,
        )
        .unwrap();
        let records = load_custom_questions(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].gold_answer.as_deref(), Some("Shakespeare"));
        assert_eq!(records[1].gold_answer, None);
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"[{"no_question": 1}]"#).unwrap();
        let err = load_custom_questions(&path).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
        assert!(load_cached_sample(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_empty_cached_sample_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotpotqa_subset_20240101_000000.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(load_cached_sample(&path).is_err());
    }
}
