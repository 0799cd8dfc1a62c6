pub mod whoami;

pub use whoami::WhoAmITool;
