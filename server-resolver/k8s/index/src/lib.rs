//! Workspace server resolution
//!
//! Projects the cluster objects created for a workspace into a descriptor for every server of
//! every machine. Each object carries annotations naming the machine it belongs to and the servers
//! that machine declares:
//!
//! - Each `Service` makes a machine reachable from within the cluster. Its servers resolve to the
//!   service's name and the container port.
//! - Each `Ingress` exposes a machine on a public host. Its servers resolve to the ingress host
//!   (or load balancer address) under the ingress path, after undoing any configured path
//!   transform.
//! - Each gateway `ConfigMap` describes servers that are routed through a single host shared by
//!   the whole workspace.
//!
//! ```text
//! [ Service ] ----------------------> internal servers --+
//! [ Ingress ] ----------------------> external servers --+--> machine -> server -> descriptor
//! [ ConfigMap ] -> gateway servers -/                    |
//! ```
//!
//! External servers take precedence over internal servers of the same name. Resolvers are built
//! from a point-in-time snapshot and are never updated; a fresher view requires a new resolver.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod factory;
mod gateway;
mod internal;
mod machine_index;
mod native;


pub use self::{
    factory::{FactoryError, ServerResolver, ServerResolverFactory},
    gateway::GatewayResolver,
    internal::InternalResolver,
    native::NativeResolver,
};
pub use workspace_server_resolver_core::{
    build_path, PathTransformInverter, ServerDescriptor, Servers,
};

use std::collections::BTreeMap;
use tracing::info;
use workspace_server_resolver_core::ServerConfig;
use workspace_server_resolver_k8s_api::{Annotations, Resource, ResourceExt};

/// Decodes the servers declared on `obj`.
///
/// An object with invalid server annotations declares no servers.
fn declared_servers<T: Resource<DynamicType = ()>>(obj: &T) -> BTreeMap<String, ServerConfig> {
    Annotations::from_meta(obj.meta())
        .servers()
        .unwrap_or_else(|error| {
            info!(
                kind = %T::kind(&()),
                name = %obj.name_any(),
                %error,
                "Ignoring invalid server annotations"
            );
            Default::default()
        })
}

/// Overlays `external` onto `internal`; external servers replace internal servers with the same
/// name.
fn merge(mut internal: Servers, external: Servers) -> Servers {
    internal.extend(external);
    internal
}
