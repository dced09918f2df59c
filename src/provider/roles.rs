// src/provider/roles.rs — Role-based model assignment

use super::ModelRef;
use crate::infra::config::{ModelsConfig, PairConfig};
use crate::infra::errors::ReviseLabError;

/// One responder/revisor configuration under comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPair {
    pub responder: ModelRef,
    pub revisor: ModelRef,
}

impl ModelPair {
    pub fn new(responder: ModelRef, revisor: ModelRef) -> Self {
        Self { responder, revisor }
    }

    pub fn from_config(pair: &PairConfig) -> Result<Self, ReviseLabError> {
        Ok(Self {
            responder: parse_ref(&pair.responder)?,
            revisor: parse_ref(&pair.revisor)?,
        })
    }

    /// Label used in logs and the summary table.
    pub fn label(&self) -> String {
        format!("{} -> {}", self.responder, self.revisor)
    }
}

/// All pairs of a run plus the judge model.
#[derive(Debug, Clone)]
pub struct ModelRoles {
    pub pairs: Vec<ModelPair>,
    pub judge: ModelRef,
}

impl ModelRoles {
    pub fn from_config(models: &ModelsConfig) -> Result<Self, ReviseLabError> {
        if models.pairs.is_empty() {
            return Err(ReviseLabError::Configuration(
                "no model pairs configured under [models]".into(),
            ));
        }
        let pairs = models
            .pairs
            .iter()
            .map(ModelPair::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            pairs,
            judge: parse_ref(&models.judge)?,
        })
    }

    /// Distinct Ollama model names across every pair, in first-seen order.
    pub fn ollama_models(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for pair in &self.pairs {
            for m in [&pair.responder, &pair.revisor] {
                if m.provider == "ollama" && !out.contains(&m.model) {
                    out.push(m.model.clone());
                }
            }
        }
        out
    }
}

fn parse_ref(s: &str) -> Result<ModelRef, ReviseLabError> {
    ModelRef::parse(s).ok_or_else(|| {
        ReviseLabError::Configuration(format!(
            "invalid model reference '{}', expected provider/model",
            s
        ))
    })
}
