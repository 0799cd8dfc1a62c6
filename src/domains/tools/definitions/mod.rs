//! Tool definitions module.
//!
//! This module exports all built-in tool definitions.
//! Each tool is defined in its own file for better maintainability.

pub mod demo;
pub mod identity;

pub use demo::{CounterIncrementTool, EchoTool, HelloWorldTool};
pub use identity::WhoAmITool;
