// src/lib.rs — Library root for reviselab

pub mod cli;
pub mod core;
pub mod dataset;
pub mod evaluator;
pub mod infra;
pub mod provider;
pub mod report;
pub mod search;
pub mod util;
