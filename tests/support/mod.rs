//! Shared fixtures for enterprise archive layout tests

#![allow(dead_code)]

pub mod assertions;
pub mod builders;
pub mod environment;

pub use assertions::*;
pub use builders::{EarBuilder, ModuleFixture};
pub use environment::{OpenEar, TestEnvironment};
