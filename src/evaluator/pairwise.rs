// src/evaluator/pairwise.rs — Head-to-head judgment of the two answers

use super::parser::parse_pairwise_verdict;
use super::{LlmEvaluator, PairwiseWinner};

fn pairwise_prompt(question: &str, first: &str, second: &str) -> String {
    format!(
        "Act as an impartial judge and evaluate the quality of the responses provided by \
         two AI assistants to the user question displayed below. Consider the overall \
         quality of each response. Do not let response order, length or assistant names \
         influence your decision.\n\n\
         Begin with a short explanation. After the explanation, output your final verdict \
         strictly in this format: \"[[A]]\" if assistant A is better, \"[[B]]\" if \
         assistant B is better, and \"[[C]]\" for a tie.\n\n\
         [User Question]\n{}\n\n\
         [The Start of Assistant A's Answer]\n{}\n[The End of Assistant A's Answer]\n\n\
         [The Start of Assistant B's Answer]\n{}\n[The End of Assistant B's Answer]",
        question, first, second
    )
}

impl LlmEvaluator {
    /// Compare responder (A) against revisor (B). Any failure yields
    /// `Invalid` with a description instead of an error.
    pub async fn compare(
        &self,
        question: &str,
        responder: &str,
        revisor: &str,
    ) -> (PairwiseWinner, String) {
        let text = match self
            .ask_judge(pairwise_prompt(question, responder, revisor))
            .await
        {
            Ok(t) => t,
            Err(e) => {
                tracing::error!("Pair-wise evaluation failed: {}", e);
                return (PairwiseWinner::Invalid, format!("Error: {}", e));
            }
        };

        match parse_pairwise_verdict(&text) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Unparseable pair-wise verdict: {}", e);
                (
                    PairwiseWinner::Invalid,
                    format!("Malformed pairwise verdict: {}", e),
                )
            }
        }
    }
}
