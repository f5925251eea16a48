//! CLI command implementations

pub mod demo;
pub mod deploy;
pub mod keygen;
