//! Business logic services.
//!
//! Services turn raw event dumps into normalized datasets, summaries, and
//! query results.

mod analysis;
mod cache;
mod catalog;
mod normalizer;
pub mod query;
mod resolver;

pub use analysis::analyze;
pub use cache::QueryCache;
pub use catalog::CatalogBuilder;
pub use normalizer::normalize;
pub use query::QueryInterpreter;
pub use resolver::{KeyIndex, Resolution};
