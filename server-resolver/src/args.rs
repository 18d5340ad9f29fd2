use crate::{
    index::{PathTransformInverter, ServerResolverFactory, Servers},
    Snapshot,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::{collections::BTreeMap, io::Write, path::PathBuf};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[clap(
    name = "workspace-server-resolver",
    about = "Resolves how the servers of a workspace's machines are exposed"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "workspace_server_resolver=info,warn",
        env = "WORKSPACE_SERVER_RESOLVER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    /// How workspace servers are exposed: `multi-host`, `single-host` or `default-host`.
    #[clap(long, default_value = "multi-host", env = "WORKSPACE_SERVER_STRATEGY")]
    server_strategy: String,

    /// How a single-host workspace is exposed: `native` or `gateway`.
    #[clap(long, default_value = "native", env = "WORKSPACE_SINGLE_HOST_MODE")]
    single_host_mode: String,

    /// The host shared by all servers exposed through the gateway.
    #[clap(long, env = "WORKSPACE_GATEWAY_HOST")]
    gateway_host: Option<String>,

    /// The format applied to ingress paths, with `%s` standing for the original path (e.g.
    /// `%s(.*)`).
    #[clap(long, env = "WORKSPACE_INGRESS_PATH_TRANSFORM")]
    ingress_path_transform: Option<String>,

    /// Reads the workspace's objects from a YAML or JSON file instead of the cluster.
    #[clap(long)]
    snapshot: Option<PathBuf>,

    #[clap(long, short = 'n', default_value = "default")]
    namespace: String,

    /// Only considers objects labeled with this workspace ID.
    #[clap(long)]
    workspace_id: Option<String>,

    /// Machines to resolve. Defaults to every machine found in the snapshot.
    #[clap(long = "machine")]
    machines: Vec<String>,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            server_strategy,
            single_host_mode,
            gateway_host,
            ingress_path_transform,
            snapshot,
            namespace,
            workspace_id,
            machines,
        } = self;

        log_format
            .try_init(log_level)
            .context("failed to configure logging")?;

        // Validate the configuration before reading any objects.
        let path_transform = PathTransformInverter::new(ingress_path_transform.as_deref())?;
        let factory = ServerResolverFactory::new(
            &server_strategy,
            &single_host_mode,
            gateway_host,
            path_transform,
        )?;

        let snapshot = match snapshot {
            Some(path) => Snapshot::read(&path)?,
            None => {
                let client = client
                    .try_client()
                    .await
                    .context("failed to build a Kubernetes client")?;
                Snapshot::list(client, &namespace, workspace_id.as_deref()).await?
            }
        };
        info!(
            services = snapshot.services.len(),
            ingresses = snapshot.ingresses.len(),
            config_maps = snapshot.config_maps.len(),
            "Loaded snapshot"
        );

        let resolver = snapshot.into_resolver(&factory);
        let machines = if machines.is_empty() {
            resolver.machine_names().into_iter().collect()
        } else {
            machines
        };

        let resolved = machines
            .into_iter()
            .map(|machine| {
                let servers = resolver.resolve(&machine);
                for (name, server) in servers.iter().filter(|(_, s)| !s.is_routable()) {
                    debug!(
                        %machine,
                        server = %name,
                        url = %server.url(),
                        "Server is not routable yet"
                    );
                }
                (machine, servers)
            })
            .collect::<BTreeMap<String, Servers>>();

        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &resolved)?;
        writeln!(stdout)?;
        Ok(())
    }
}
