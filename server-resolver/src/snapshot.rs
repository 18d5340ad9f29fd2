use crate::{
    index::{ServerResolver, ServerResolverFactory},
    k8s::{self, WORKSPACE_ID_LABEL},
};
use anyhow::{Context, Result};
use kube::api::{Api, ListParams};
use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;
use tracing::{debug, instrument};

/// A point-in-time view of the objects created for a workspace.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub services: Vec<k8s::Service>,
    pub ingresses: Vec<k8s::Ingress>,
    pub config_maps: Vec<k8s::ConfigMap>,
}

// === impl Snapshot ===

impl Snapshot {
    /// Reads objects from a YAML (or JSON) file as produced by `kubectl get -o yaml`.
    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parses one or more YAML documents, each holding an object or a list of objects. Objects of
    /// other kinds are ignored.
    pub fn parse(yaml: &str) -> Result<Self> {
        let mut snapshot = Self::default();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            snapshot.add(Value::deserialize(doc)?)?;
        }
        Ok(snapshot)
    }

    /// Lists the objects in `namespace`, restricted to a single workspace when `workspace_id` is
    /// set.
    #[instrument(skip(client))]
    pub async fn list(
        client: kube::Client,
        namespace: &str,
        workspace_id: Option<&str>,
    ) -> Result<Self> {
        let params = match workspace_id {
            Some(id) => ListParams::default().labels(&format!("{}={}", WORKSPACE_ID_LABEL, id)),
            None => ListParams::default(),
        };

        let services = Api::<k8s::Service>::namespaced(client.clone(), namespace)
            .list(&params)
            .await
            .context("failed to list services")?;
        let ingresses = Api::<k8s::Ingress>::namespaced(client.clone(), namespace)
            .list(&params)
            .await
            .context("failed to list ingresses")?;
        let config_maps = Api::<k8s::ConfigMap>::namespaced(client, namespace)
            .list(&params)
            .await
            .context("failed to list config maps")?;

        Ok(Self {
            services: services.items,
            ingresses: ingresses.items,
            config_maps: config_maps.items,
        })
    }

    pub fn into_resolver(self, factory: &ServerResolverFactory) -> ServerResolver {
        factory.create(self.services, self.ingresses, self.config_maps)
    }

    fn add(&mut self, obj: Value) -> Result<()> {
        if obj.is_null() {
            return Ok(());
        }

        let kind = obj
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match kind.as_str() {
            "Service" => self
                .services
                .push(serde_yaml::from_value(obj).context("invalid Service")?),
            "Ingress" => self
                .ingresses
                .push(serde_yaml::from_value(obj).context("invalid Ingress")?),
            "ConfigMap" => self
                .config_maps
                .push(serde_yaml::from_value(obj).context("invalid ConfigMap")?),
            kind if kind.ends_with("List") => {
                let items = obj
                    .get("items")
                    .and_then(Value::as_sequence)
                    .cloned()
                    .unwrap_or_default();
                for item in items {
                    self.add(item)?;
                }
            }
            kind => debug!(%kind, "Ignoring object"),
        }
        Ok(())
    }
}
