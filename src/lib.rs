pub mod cli;
pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod errors;
pub mod evaluation;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;
pub mod retrieval;


pub use config::AppConfig;
pub use errors::*;
