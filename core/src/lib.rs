//! Command interpretation core for the vox console: intent parsing, policy
//! gating, sandboxed file operations and shell execution behind one
//! [`executor::CommandExecutor::execute`] entry point.

pub mod api;
pub mod audit;
pub mod config;
pub mod error;
pub mod executor;
pub mod fileops;
pub mod intent;
pub mod memory;
pub mod policy;
pub mod runner;
