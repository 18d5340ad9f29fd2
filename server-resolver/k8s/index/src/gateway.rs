use crate::{declared_servers, machine_index::MachineIndex, merge, native::NativeResolver};
use tracing::{debug, trace};
use workspace_server_resolver_core::{build_path, ServerDescriptor, Servers};
use workspace_server_resolver_k8s_api::{self as k8s, ResourceExt};

/// Resolves external servers exposed through a gateway on a single host shared by the whole
/// workspace.
///
/// Gateway servers are described by `ConfigMap`s. Internal servers, and external servers that are
/// not routed through the gateway, are resolved by a delegate resolver.
#[derive(Debug)]
pub struct GatewayResolver {
    config_maps: MachineIndex<k8s::ConfigMap>,
    host: String,
    delegate: NativeResolver,
}

// === impl GatewayResolver ===

impl GatewayResolver {
    pub fn new(
        config_maps: impl IntoIterator<Item = k8s::ConfigMap>,
        host: impl Into<String>,
        delegate: NativeResolver,
    ) -> Self {
        Self {
            // Config maps may carry unrelated gateway configuration.
            config_maps: MachineIndex::tolerant(config_maps),
            host: host.into(),
            delegate,
        }
    }

    /// Resolves all servers of `machine`, preferring external servers over internal ones.
    pub fn resolve(&self, machine: &str) -> Servers {
        merge(
            self.delegate.resolve_internal_servers(machine),
            self.resolve_external_servers(machine),
        )
    }

    pub fn resolve_internal_servers(&self, machine: &str) -> Servers {
        self.delegate.resolve_internal_servers(machine)
    }

    /// Resolves the delegate's external servers of `machine`, overlaid with the servers routed
    /// through the gateway.
    pub fn resolve_external_servers(&self, machine: &str) -> Servers {
        let mut servers = self.delegate.resolve_external_servers(machine);
        for cm in self.config_maps.get(machine) {
            for (name, config) in declared_servers(cm) {
                // A subdomain isolates the server on its own, so it is served from the root.
                let root = if config.require_subdomain() {
                    "/".to_string()
                } else {
                    config.endpoint_origin().map(str::to_string).unwrap_or_else(|| {
                        debug!(
                            %machine,
                            server = %name,
                            config_map = %cm.name_any(),
                            "Gateway server has no endpoint origin"
                        );
                        "/".to_string()
                    })
                };
                let path = build_path(&root, &config.path);
                trace!(%machine, server = %name, host = %self.host, %path, "Resolved gateway server");
                let server =
                    ServerDescriptor::builder(config.protocol, self.host.clone(), config.port)
                        .path(path)
                        .endpoint_origin(root)
                        .attributes(config.attributes)
                        .build();
                servers.insert(name, server);
            }
        }
        servers
    }

    pub(crate) fn machine_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.config_maps
            .machine_names()
            .chain(self.delegate.machine_names())
    }
}
