use crate::{gateway::GatewayResolver, native::NativeResolver};
use std::{collections::BTreeSet, sync::Arc};
use tracing::{debug, instrument};
use workspace_server_resolver_core::{PathTransformInverter, Servers};
use workspace_server_resolver_k8s_api as k8s;

/// Resolves the servers of a workspace's machines with the configured exposure strategy.
#[derive(Debug)]
pub enum ServerResolver {
    /// Each machine is exposed on its own host.
    Native(NativeResolver),

    /// Servers may be exposed through a gateway on a single shared host.
    Gateway(GatewayResolver),
}

/// Builds a [`ServerResolver`] for each snapshot of a workspace's objects.
///
/// The resolver strategy is selected once, when the factory is built, so that an unsupported
/// configuration is reported before any workspace starts.
#[derive(Clone, Debug)]
pub struct ServerResolverFactory {
    strategy: &'static Strategy,
    gateway_host: String,
    path_transform: Arc<PathTransformInverter>,
}

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("no server resolver supports server strategy {strategy:?} with single-host mode {mode:?}")]
    UnsupportedStrategy { strategy: String, mode: String },

    #[error("server strategy {strategy:?} with single-host mode {mode:?} requires a gateway host")]
    MissingGatewayHost { strategy: String, mode: String },
}

type Create = fn(
    &ServerResolverFactory,
    Vec<k8s::Service>,
    Vec<k8s::Ingress>,
    Vec<k8s::ConfigMap>,
) -> ServerResolver;

struct Strategy {
    server_strategy: &'static str,
    single_host_mode: &'static str,
    requires_gateway_host: bool,
    create: Create,
}

const MULTI_HOST: &str = "multi-host";
const SINGLE_HOST: &str = "single-host";
const DEFAULT_HOST: &str = "default-host";
const NATIVE: &str = "native";
const GATEWAY: &str = "gateway";

/// Supported (server strategy, single-host mode) pairs. The single-host mode only matters when
/// the whole workspace shares a host.
static STRATEGIES: [Strategy; 6] = [
    Strategy::native(MULTI_HOST, NATIVE),
    Strategy::native(MULTI_HOST, GATEWAY),
    Strategy::native(DEFAULT_HOST, NATIVE),
    Strategy::native(DEFAULT_HOST, GATEWAY),
    Strategy::native(SINGLE_HOST, NATIVE),
    Strategy {
        server_strategy: SINGLE_HOST,
        single_host_mode: GATEWAY,
        requires_gateway_host: true,
        create: ServerResolverFactory::create_gateway,
    },
];

// === impl ServerResolver ===

impl ServerResolver {
    /// Resolves every server of `machine` by server name.
    ///
    /// Servers whose routing objects do not exist (yet) are absent from the result.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&self, machine: &str) -> Servers {
        let servers = match self {
            Self::Native(resolver) => resolver.resolve(machine),
            Self::Gateway(resolver) => resolver.resolve(machine),
        };
        debug!(servers = servers.len(), "Resolved");
        servers
    }

    /// Returns the names of all machines that own at least one indexed object.
    pub fn machine_names(&self) -> BTreeSet<String> {
        let names: Box<dyn Iterator<Item = &str> + '_> = match self {
            Self::Native(resolver) => Box::new(resolver.machine_names()),
            Self::Gateway(resolver) => Box::new(resolver.machine_names()),
        };
        names.map(str::to_string).collect()
    }
}

// === impl ServerResolverFactory ===

impl ServerResolverFactory {
    pub fn new(
        server_strategy: &str,
        single_host_mode: &str,
        gateway_host: Option<String>,
        path_transform: PathTransformInverter,
    ) -> Result<Self, FactoryError> {
        let strategy = STRATEGIES
            .iter()
            .find(|s| {
                s.server_strategy == server_strategy && s.single_host_mode == single_host_mode
            })
            .ok_or_else(|| FactoryError::UnsupportedStrategy {
                strategy: server_strategy.to_string(),
                mode: single_host_mode.to_string(),
            })?;

        let gateway_host = gateway_host.unwrap_or_default();
        if strategy.requires_gateway_host && gateway_host.is_empty() {
            return Err(FactoryError::MissingGatewayHost {
                strategy: server_strategy.to_string(),
                mode: single_host_mode.to_string(),
            });
        }

        debug!(
            server_strategy = strategy.server_strategy,
            single_host_mode = strategy.single_host_mode,
            "Selected server resolver"
        );
        Ok(Self {
            strategy,
            gateway_host,
            path_transform: Arc::new(path_transform),
        })
    }

    /// Builds a resolver over a snapshot of a workspace's objects.
    pub fn create(
        &self,
        services: Vec<k8s::Service>,
        ingresses: Vec<k8s::Ingress>,
        config_maps: Vec<k8s::ConfigMap>,
    ) -> ServerResolver {
        (self.strategy.create)(self, services, ingresses, config_maps)
    }

    fn create_native(
        &self,
        services: Vec<k8s::Service>,
        ingresses: Vec<k8s::Ingress>,
        _: Vec<k8s::ConfigMap>,
    ) -> ServerResolver {
        ServerResolver::Native(NativeResolver::new(
            services,
            ingresses,
            self.path_transform.clone(),
        ))
    }

    /// Gateway routing is layered over native routing, which resolves the servers that the gateway
    /// does not describe.
    fn create_gateway(
        &self,
        services: Vec<k8s::Service>,
        ingresses: Vec<k8s::Ingress>,
        config_maps: Vec<k8s::ConfigMap>,
    ) -> ServerResolver {
        let delegate = NativeResolver::new(services, ingresses, self.path_transform.clone());
        ServerResolver::Gateway(GatewayResolver::new(
            config_maps,
            self.gateway_host.clone(),
            delegate,
        ))
    }
}

// === impl Strategy ===

impl Strategy {
    const fn native(server_strategy: &'static str, single_host_mode: &'static str) -> Self {
        Self {
            server_strategy,
            single_host_mode,
            requires_gateway_host: false,
            create: ServerResolverFactory::create_native,
        }
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy")
            .field("server_strategy", &self.server_strategy)
            .field("single_host_mode", &self.single_host_mode)
            .field("requires_gateway_host", &self.requires_gateway_host)
            .finish_non_exhaustive()
    }
}
