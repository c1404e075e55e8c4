pub mod assistant;
pub mod core;
pub mod documents;
pub mod feedback;
pub mod llm;
pub mod rag;
pub mod server;
pub mod state;
pub mod web;
