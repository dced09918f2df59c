// src/infra/mod.rs

pub mod backend;
pub mod config;
pub mod errors;
pub mod logger;
pub mod paths;
