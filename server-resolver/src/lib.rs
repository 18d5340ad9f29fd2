#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod args;
mod snapshot;

pub use self::{args::Args, snapshot::Snapshot};
pub use workspace_server_resolver_k8s_api as k8s;
pub use workspace_server_resolver_k8s_index as index;
