//! Resource definitions module.
//!
//! Each resource is defined in its own file with:
//! - URI and metadata
//! - A `ResourceHandler` providing its content
//!
//! ## Adding a New Resource
//!
//! 1. Create a new file (e.g., `my_resource.rs`)
//! 2. Implement the `ResourceDefinition` and `ResourceHandler` traits
//! 3. Export it here
//! 4. Register in `registry.rs`

pub mod server_info;

pub use server_info::ServerInfoResource;

use super::handlers::{ResourceCapability, ResourceHandler};

/// Trait for resource definitions.
///
/// Each resource must implement this trait to provide its metadata.
pub trait ResourceDefinition: ResourceHandler + Sized + 'static {
    /// The unique URI of the resource.
    const URI: &'static str;

    /// The display name of the resource.
    const NAME: &'static str;

    /// A description of the resource.
    const DESCRIPTION: &'static str;

    /// The MIME type of the resource content.
    const MIME_TYPE: &'static str;

    /// Bind this definition to its metadata for registration.
    fn into_capability(self) -> ResourceCapability {
        ResourceCapability::build(
            Self::URI,
            Self::NAME,
            Self::DESCRIPTION,
            Self::MIME_TYPE,
            self,
        )
    }
}
