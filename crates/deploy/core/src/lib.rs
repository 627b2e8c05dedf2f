#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod artifacts;
pub mod chain;
pub mod config;
pub mod deployer;
pub mod error;
pub mod report;
pub mod sleep;
pub mod verification;
