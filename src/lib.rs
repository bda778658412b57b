//! fleet library
//!
//! Background subagent orchestration: a manager that spawns autonomous task
//! runners, a tracker holding their lifecycle state, and the tools a
//! supervising agent uses to spawn and inspect them.

pub mod activity;
pub mod bus;
pub mod cli;
pub mod config;
pub mod llm;
pub mod logging;
pub mod search;
pub mod subagent;
pub mod tool;
