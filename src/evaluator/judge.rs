// src/evaluator/judge.rs — Single-answer criteria and gold-answer judging

use super::parser::{parse_criteria_verdict, parse_qa_grade};
use super::{CriterionPair, Judgment, LlmEvaluator};
use crate::infra::errors::ReviseLabError;
use crate::provider::{ChatRequest, Message};

/// What the judge checks for each criterion.
pub fn criterion_description(criterion: &str) -> &'static str {
    match criterion {
        "helpfulness" => "Is the submission helpful and appropriate for the person asking?",
        "correctness" => "Is the submission factually correct and accurate?",
        "relevance" => "Does the submission stay on the question that was asked?",
        "conciseness" => "Is the submission concise and to the point?",
        "coherence" => "Is the submission coherent and well organized?",
        _ => "Does the submission meet the criterion?",
    }
}

fn criteria_prompt(criterion: &str, question: &str, answer: &str) -> String {
    format!(
        "You are assessing a submitted answer on a given task based on a criterion.\n\n\
         [BEGIN DATA]\n\
         ***\n[Input]: {}\n\
         ***\n[Submission]: {}\n\
         ***\n[Criteria]: {}: {}\n\
         ***\n[END DATA]\n\n\
         Does the submission meet the criterion? Reason step by step, then print \
         only the single character \"Y\" or \"N\" on its own final line.",
        question,
        answer,
        criterion,
        criterion_description(criterion)
    )
}

fn qa_prompt(question: &str, answer: &str, gold: &str) -> String {
    format!(
        "You are grading a student answer against a reference answer.\n\n\
         QUESTION: {}\n\
         REFERENCE ANSWER: {}\n\
         STUDENT ANSWER: {}\n\n\
         Judge only factual accuracy; ignore style and extra detail that does not \
         conflict with the reference. Explain briefly, then end with a line \
         \"GRADE: CORRECT\" or \"GRADE: INCORRECT\".",
        question, gold, answer
    )
}

impl LlmEvaluator {
    pub(crate) async fn ask_judge(&self, prompt: String) -> Result<String, ReviseLabError> {
        let response = self
            .provider
            .chat(ChatRequest {
                model: self.model.model.clone(),
                messages: vec![Message::user(prompt)],
                tools: vec![],
                max_tokens: Some(1024),
                temperature: Some(self.temperature),
                system: None,
            })
            .await?;
        Ok(response.content)
    }

    /// Judge one criterion for one answer.
    pub async fn judge_criterion(
        &self,
        criterion: &str,
        question: &str,
        answer: &str,
    ) -> Result<Judgment, ReviseLabError> {
        let text = self
            .ask_judge(criteria_prompt(criterion, question, answer))
            .await?;
        let verdict = parse_criteria_verdict(&text)
            .map_err(|e| ReviseLabError::malformed(format!("{} judge", criterion), e))?;
        Ok(verdict.into())
    }

    /// Both sides of one criterion; either failing fails the pair.
    pub(crate) async fn judge_pair(
        &self,
        criterion: &str,
        question: &str,
        responder: &str,
        revisor: &str,
    ) -> Result<CriterionPair, ReviseLabError> {
        let responder = self.judge_criterion(criterion, question, responder).await?;
        let revisor = self.judge_criterion(criterion, question, revisor).await?;
        Ok(CriterionPair { responder, revisor })
    }

    /// QA grade against the gold answer. Errors become `Judgment::Failed`.
    pub(crate) async fn qa_grade(&self, question: &str, answer: &str, gold: &str) -> Judgment {
        let text = match self.ask_judge(qa_prompt(question, answer, gold)).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("QA grading failed: {}", e);
                return Judgment::Failed {
                    error: e.to_string(),
                };
            }
        };
        match parse_qa_grade(&text) {
            Ok(v) => v.into(),
            Err(e) => Judgment::Failed {
                error: ReviseLabError::malformed("qa judge", e).to_string(),
            },
        }
    }
}
