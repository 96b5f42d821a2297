//! AI recruitment tools: request validation, prompt construction, generation
//! and reduction of CV analyses.

pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod reducer;

#[cfg(test)]
pub mod testing;
