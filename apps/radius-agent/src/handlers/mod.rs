//! Handlers 模块

pub mod radius;

pub use radius::*;
