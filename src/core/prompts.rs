// src/core/prompts.rs — System prompt and tool schemas for the two actors

use chrono::{DateTime, Utc};
use minijinja::{context, Environment};

use super::types::ActorRole;
use crate::infra::errors::ReviseLabError;
use crate::provider::ToolDef;

pub const ANSWER_TOOL: &str = "AnswerQuestion";
pub const REVISE_TOOL: &str = "ReviseAnswer";

const SYSTEM_TEMPLATE: &str = "\
You are a careful research assistant.
Current time: {{ now }}

1. {{ instruction }}
2. Critique your answer: name what is missing and what is superfluous.
3. Suggest web search queries that would fill the gaps.
{% if role == \"revisor\" %}
Cite your sources with bracketed numbers and list them as references.{% endif %}";

const RESPONDER_INSTRUCTION: &str = "Answer the user's question in about 250 words.";
const REVISOR_INSTRUCTION: &str = "Revise your previous answer using the search results. \
Keep it under 250 words and drop anything the critique flagged as superfluous.";

pub fn tool_name(role: ActorRole) -> &'static str {
    match role {
        ActorRole::Responder => ANSWER_TOOL,
        ActorRole::Revisor => REVISE_TOOL,
    }
}

pub fn render_system_prompt(role: ActorRole, now: DateTime<Utc>) -> Result<String, ReviseLabError> {
    let mut env = Environment::new();
    env.add_template("system", SYSTEM_TEMPLATE)
        .map_err(|e| anyhow::anyhow!("prompt template: {}", e))?;
    let tmpl = env
        .get_template("system")
        .map_err(|e| anyhow::anyhow!("prompt template: {}", e))?;

    let instruction = match role {
        ActorRole::Responder => RESPONDER_INSTRUCTION,
        ActorRole::Revisor => REVISOR_INSTRUCTION,
    };
    let rendered = tmpl
        .render(context! {
            now => now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            instruction => instruction,
            role => role.to_string(),
        })
        .map_err(|e| anyhow::anyhow!("prompt render: {}", e))?;
    Ok(rendered)
}

/// Closing user turn that asks for the bound tool.
pub fn respond_instruction(role: ActorRole) -> String {
    format!(
        "Reflect on the original question and the research so far. Respond using the {} function.",
        tool_name(role)
    )
}

pub fn tool_schema(role: ActorRole) -> ToolDef {
    let mut properties = serde_json::json!({
        "answer": {
            "type": "string",
            "description": "About 250 word answer to the question."
        },
        "reflection": {
            "type": "object",
            "description": "Critique of the answer.",
            "properties": {
                "missing": { "type": "string", "description": "What is missing." },
                "superfluous": { "type": "string", "description": "What is superfluous." }
            },
            "required": ["missing", "superfluous"]
        },
        "search_queries": {
            "type": "array",
            "items": { "type": "string" },
            "description": "1-3 search queries for improving the answer."
        }
    });
    let mut required = vec!["answer", "reflection", "search_queries"];

    if role == ActorRole::Revisor {
        properties["references"] = serde_json::json!({
            "type": "array",
            "items": { "type": "string" },
            "description": "Citations motivating the revised answer."
        });
        required.push("references");
    }

    ToolDef {
        name: tool_name(role).into(),
        description: match role {
            ActorRole::Responder => "Answer the question.".into(),
            ActorRole::Revisor => "Revise the original answer to the question.".into(),
        },
        parameters: serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        }),
    }
}
