//! Domains module containing business logic organized by bounded contexts.
//!
//! `tools` owns the runtime-configurable tool registry. `resources` and
//! `prompts` follow the same catalog-plus-enabled-set shape and read from the
//! tool registry where they report on it.

pub mod prompts;
pub mod resources;
pub mod tools;
