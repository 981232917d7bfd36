//! Language-specific execution strategies and their registry.

pub mod adapter;
pub mod languages;
pub mod registry;
