//! Weaves hand-written native fragments and native type hints from script
//! sources into the code a script-to-native generator produced.

pub mod annotations;
pub mod conventions;
pub mod document;
pub mod error;
pub mod passes;
pub mod pipeline;
pub mod project;

pub use conventions::Conventions;
pub use error::{ConfigError, WeaveError};
