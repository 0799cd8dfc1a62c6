//! Name-spacing of tool names and descriptions.
//!
//! Several tool providers can sit behind one agent, so each server may carry
//! a namespace. Externally, `echo` in namespace `demo` becomes `demo__echo`
//! and its description is prefixed with `[demo]`. Internal names never carry
//! the prefix.

/// Separator between namespace and tool name.
pub const SEPARATOR: &str = "__";

/// Render an internal name for clients.
pub fn external_name(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{ns}{SEPARATOR}{name}"),
        None => name.to_string(),
    }
}

/// Render a description for clients.
pub fn external_description(namespace: Option<&str>, description: &str) -> String {
    match namespace {
        Some(ns) => format!("[{ns}] {description}"),
        None => description.to_string(),
    }
}

/// Map an inbound name back to its internal form.
///
/// With a namespace configured the exact `"{ns}__"` prefix is required;
/// unprefixed or foreign-prefixed names resolve to `None`.
pub fn internal_name<'a>(namespace: Option<&str>, name: &'a str) -> Option<&'a str> {
    match namespace {
        Some(ns) => name
            .strip_prefix(ns)
            .and_then(|rest| rest.strip_prefix(SEPARATOR))
            .filter(|rest| !rest.is_empty()),
        None => Some(name),
    }
}
