//! CLI command implementations.

pub mod common;
pub mod evaluate;
pub mod inspect;
pub mod optimize;
