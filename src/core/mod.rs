// src/core/mod.rs — Draft-search-revise engine

pub mod actor;
pub mod controller;
pub mod experiment;
pub mod orchestrator;
pub mod prompts;
pub mod tools;
pub mod types;
