use crate::{declared_servers, machine_index::MachineIndex};
use tracing::trace;
use workspace_server_resolver_core::{ServerDescriptor, Servers};
use workspace_server_resolver_k8s_api::{self as k8s, ResourceExt};

/// Resolves servers that are reachable from within the cluster through each machine's `Service`.
///
/// Every resolution strategy starts from these servers and overlays its external servers on them.
#[derive(Debug)]
pub struct InternalResolver {
    services: MachineIndex<k8s::Service>,
}

// === impl InternalResolver ===

impl InternalResolver {
    pub fn new(services: impl IntoIterator<Item = k8s::Service>) -> Self {
        Self {
            services: MachineIndex::strict(services),
        }
    }

    /// Resolves the servers of `machine` to the name of the service that declares them.
    ///
    /// Traffic reaches the container directly, so the port is not translated and no endpoint
    /// origin is set.
    pub fn resolve_internal_servers(&self, machine: &str) -> Servers {
        let mut servers = Servers::new();
        for svc in self.services.get(machine) {
            let host = svc.name_any();
            for (name, config) in declared_servers(svc) {
                trace!(%machine, server = %name, %host, "Resolved internal server");
                let server = ServerDescriptor::builder(config.protocol, host.clone(), config.port)
                    .port(config.port)
                    .path(config.path)
                    .attributes(config.attributes)
                    .build();
                servers.insert(name, server);
            }
        }
        servers
    }

    pub(crate) fn machine_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.services.machine_names()
    }
}
