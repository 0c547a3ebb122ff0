pub mod assistant;
pub mod config;
mod config_env;
pub mod conversation;
pub mod llm;
pub mod models;
pub mod repos;
pub mod search;
