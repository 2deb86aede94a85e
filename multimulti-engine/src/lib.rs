pub mod config;
pub mod constraints;
pub mod generator;
pub mod sampler;
pub mod stats;
pub mod ticket;
pub mod weights;
