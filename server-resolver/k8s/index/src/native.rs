use crate::{declared_servers, internal::InternalResolver, machine_index::MachineIndex, merge};
use std::sync::Arc;
use tracing::{debug, trace};
use workspace_server_resolver_core::{
    build_path, PathTransformInverter, ServerDescriptor, Servers,
};
use workspace_server_resolver_k8s_api::{self as k8s, ResourceExt};

/// Resolves external servers through one `Ingress` per machine, each with its own public host.
#[derive(Debug)]
pub struct NativeResolver {
    internal: InternalResolver,
    ingresses: MachineIndex<k8s::Ingress>,
    path_transform: Arc<PathTransformInverter>,
}

// === impl NativeResolver ===

impl NativeResolver {
    pub fn new(
        services: impl IntoIterator<Item = k8s::Service>,
        ingresses: impl IntoIterator<Item = k8s::Ingress>,
        path_transform: Arc<PathTransformInverter>,
    ) -> Self {
        Self {
            internal: InternalResolver::new(services),
            ingresses: MachineIndex::strict(ingresses),
            path_transform,
        }
    }

    /// Resolves all servers of `machine`, preferring external servers over internal ones.
    pub fn resolve(&self, machine: &str) -> Servers {
        merge(
            self.internal.resolve_internal_servers(machine),
            self.resolve_external_servers(machine),
        )
    }

    pub fn resolve_internal_servers(&self, machine: &str) -> Servers {
        self.internal.resolve_internal_servers(machine)
    }

    /// Resolves the servers declared on the ingresses of `machine`.
    ///
    /// A server's path is its declared path under the ingress path, and its endpoint origin is the
    /// ingress path itself, so that every server of the machine shares one web root.
    pub fn resolve_external_servers(&self, machine: &str) -> Servers {
        let mut servers = Servers::new();
        for ingress in self.ingresses.get(machine) {
            let host = ingress_host(ingress);
            if host.is_empty() {
                debug!(%machine, ingress = %ingress.name_any(), "Ingress has no host or address");
            }
            let root = self.path_transform.undo(ingress_path(ingress).unwrap_or("/"));
            let endpoint_origin = build_path(root, "/");

            for (name, config) in declared_servers(ingress) {
                let path = build_path(root, &config.path);
                trace!(%machine, server = %name, %host, %path, "Resolved external server");
                let server = ServerDescriptor::builder(config.protocol, host.clone(), config.port)
                    .path(path)
                    .endpoint_origin(endpoint_origin.clone())
                    .attributes(config.attributes)
                    .build();
                servers.insert(name, server);
            }
        }
        servers
    }

    pub(crate) fn machine_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.internal
            .machine_names()
            .chain(self.ingresses.machine_names())
    }
}

/// Returns the ingress rule's host or, when the ingress is routed by address, the first address
/// reported by its load balancer. Empty when neither is known yet.
fn ingress_host(ingress: &k8s::Ingress) -> String {
    let rule_host = ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.rules.as_ref())
        .and_then(|rules| rules.first())
        .and_then(|rule| rule.host.as_deref())
        .filter(|host| !host.is_empty());
    if let Some(host) = rule_host {
        return host.to_string();
    }

    ingress
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .and_then(|addrs| addrs.first())
        .and_then(|addr| {
            addr.ip
                .as_deref()
                .filter(|ip| !ip.is_empty())
                .or_else(|| addr.hostname.as_deref())
        })
        .unwrap_or_default()
        .to_string()
}

/// Returns the path of the ingress rule's first HTTP path.
fn ingress_path(ingress: &k8s::Ingress) -> Option<&str> {
    ingress
        .spec
        .as_ref()?
        .rules
        .as_ref()?
        .first()?
        .http
        .as_ref()?
        .paths
        .first()?
        .path
        .as_deref()
        .filter(|path| !path.is_empty())
}
