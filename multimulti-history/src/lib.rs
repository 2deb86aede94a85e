pub mod cache;
pub mod error;
pub mod models;
pub mod reconstruct;
pub mod source;
pub mod tokenizer;

pub use error::HistoryError;
