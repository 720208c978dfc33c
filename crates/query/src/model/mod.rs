//! Query model chain: one model per nested select stage.

mod arena;
mod query_model;

pub use arena::{Chain, ModelId, QueryModelArena};
pub use query_model::{QueryColumn, QueryModel, SelectModelType};
