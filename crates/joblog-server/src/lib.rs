//! joblog server library - HTTP surface over the job log model builder.
//!
//! This library provides the HTTP routes, configuration, logging setup and
//! application state. It's separated from main.rs to enable integration testing.

pub mod config;
pub mod logging;
pub mod routes;
pub mod state;
