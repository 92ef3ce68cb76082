pub mod errors;
pub mod config;
pub mod models;
pub mod engine;
pub mod token;
pub mod forms;
pub mod crawler;
pub mod evaluate;
pub mod similarity;
pub mod signatures;
pub mod corpus;
pub mod race;
pub mod selector;
pub mod baseline;
pub mod verdict;
pub mod mutator;
pub mod bypass;
pub mod headers;
pub mod reporting;
pub mod pipeline;

// Re-export commonly used items
pub use errors::*;
pub use config::*;
pub use models::*;
pub use engine::*;
pub use token::*;
pub use forms::*;
pub use crawler::*;
pub use evaluate::*;
pub use similarity::*;
pub use signatures::*;
pub use corpus::*;
pub use race::*;
pub use selector::*;
pub use baseline::*;
pub use verdict::*;
pub use mutator::*;
pub use bypass::*;
pub use headers::*;
pub use reporting::*;
pub use pipeline::*;
