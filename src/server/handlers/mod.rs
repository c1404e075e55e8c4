pub mod chat;
pub mod demo;
pub mod deploy;
pub mod feedback;
pub mod health;
pub mod scrape;
pub mod upload;
pub mod visualize;
