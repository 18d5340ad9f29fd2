#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod descriptor;
pub mod path;
mod server_config;

pub use self::{
    descriptor::{ServerDescriptor, ServerDescriptorBuilder},
    path::{build_path, PathTransformError, PathTransformInverter},
    server_config::ServerConfig,
};

/// Maps a server name to its resolved descriptor.
///
/// Ordered so that rendered results are stable across runs.
pub type Servers = std::collections::BTreeMap<String, ServerDescriptor>;

/// Free-form attributes passed through to clients untouched.
pub type Attributes = std::collections::BTreeMap<String, String>;
