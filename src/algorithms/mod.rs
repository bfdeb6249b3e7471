pub mod ab_join;
pub mod batch;
pub mod common;
pub mod self_join;
