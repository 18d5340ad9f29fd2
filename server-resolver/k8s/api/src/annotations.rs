//! Machine and server metadata carried in object annotations.
//!
//! ```text
//! org.eclipse.che.machine.name: ws/dev
//! org.eclipse.che.server.8080/tcp.port: 8080/tcp
//! org.eclipse.che.server.8080/tcp.protocol: http
//! org.eclipse.che.server.8080/tcp.path: api
//! org.eclipse.che.server.8080/tcp.attributes: {"requireSubdomain":"false","endpointOrigin":"/m1/"}
//! ```
//!
//! Server names may contain `/` and `-` but never `.`.

use crate::ObjectMeta;
use std::{collections::BTreeMap, num::ParseIntError};
use workspace_server_resolver_core::{Attributes, ServerConfig};

pub const MACHINE_NAME: &str = "org.eclipse.che.machine.name";

const SERVER_PREFIX: &str = "org.eclipse.che.server.";
const PORT: &str = "port";
const PROTOCOL: &str = "protocol";
const PATH: &str = "path";
const ATTRIBUTES: &str = "attributes";

static EMPTY: BTreeMap<String, String> = BTreeMap::new();

/// Decodes machine and server metadata from an object's annotations.
#[derive(Copy, Clone, Debug)]
pub struct Annotations<'a> {
    map: &'a BTreeMap<String, String>,
}

/// Encodes machine and server metadata into annotations.
#[derive(Clone, Debug, Default)]
pub struct AnnotationsBuilder {
    map: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    #[error("server {server:?} does not declare a port")]
    MissingPort { server: String },

    #[error("server {server:?} does not declare a protocol")]
    MissingProtocol { server: String },

    #[error("server {server:?} declares an invalid port {value:?}: {source}")]
    InvalidPort {
        server: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("server {server:?} declares invalid attributes: {source}")]
    InvalidAttributes {
        server: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The raw annotation values for a single server.
#[derive(Debug, Default)]
struct RawServer<'a> {
    port: Option<&'a str>,
    protocol: Option<&'a str>,
    path: Option<&'a str>,
    attributes: Option<&'a str>,
}

// === impl Annotations ===

impl<'a> Annotations<'a> {
    pub fn new(map: &'a BTreeMap<String, String>) -> Self {
        Self { map }
    }

    pub fn from_meta(meta: &'a ObjectMeta) -> Self {
        Self::new(meta.annotations.as_ref().unwrap_or(&EMPTY))
    }

    /// The name of the machine that owns the annotated object, if one is set.
    pub fn machine_name(&self) -> Option<&'a str> {
        self.map
            .get(MACHINE_NAME)
            .map(|name| name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Decodes every server declared in the annotations, by server name.
    ///
    /// Fails on the first server whose declaration cannot be decoded.
    pub fn servers(&self) -> Result<BTreeMap<String, ServerConfig>, AnnotationError> {
        let mut raw = BTreeMap::<&'a str, RawServer<'a>>::new();
        for (key, value) in self.map.iter() {
            let (name, field) = match key
                .strip_prefix(SERVER_PREFIX)
                .and_then(|rest| rest.split_once('.'))
            {
                Some((name, field)) if !name.is_empty() => (name, field),
                _ => continue,
            };
            let value = Some(value.as_str());
            match field {
                PORT => raw.entry(name).or_default().port = value,
                PROTOCOL => raw.entry(name).or_default().protocol = value,
                PATH => raw.entry(name).or_default().path = value,
                ATTRIBUTES => raw.entry(name).or_default().attributes = value,
                _ => {}
            }
        }

        raw.into_iter()
            .map(|(name, server)| {
                server
                    .decode(name)
                    .map(|config| (name.to_string(), config))
            })
            .collect()
    }
}

// === impl RawServer ===

impl RawServer<'_> {
    fn decode(self, name: &str) -> Result<ServerConfig, AnnotationError> {
        let port = self.port.ok_or_else(|| AnnotationError::MissingPort {
            server: name.to_string(),
        })?;
        let port = parse_port(port).map_err(|source| AnnotationError::InvalidPort {
            server: name.to_string(),
            value: port.to_string(),
            source,
        })?;

        let protocol = self
            .protocol
            .ok_or_else(|| AnnotationError::MissingProtocol {
                server: name.to_string(),
            })?;

        let attributes = match self.attributes {
            Some(json) if !json.trim().is_empty() => {
                serde_json::from_str::<Attributes>(json).map_err(|source| {
                    AnnotationError::InvalidAttributes {
                        server: name.to_string(),
                        source,
                    }
                })?
            }
            _ => Attributes::default(),
        };

        Ok(ServerConfig::new(
            port,
            protocol,
            self.path.unwrap_or_default(),
            attributes,
        ))
    }
}

/// Parses a port declaration like `8080` or `8080/tcp`.
fn parse_port(port: &str) -> Result<u16, ParseIntError> {
    let number = port.split_once('/').map(|(n, _)| n).unwrap_or(port);
    number.trim().parse()
}

// === impl AnnotationsBuilder ===

impl AnnotationsBuilder {
    pub fn machine_name(mut self, name: impl Into<String>) -> Self {
        self.map.insert(MACHINE_NAME.to_string(), name.into());
        self
    }

    pub fn server(mut self, name: &str, config: &ServerConfig) -> Self {
        let key = |field: &str| format!("{}{}.{}", SERVER_PREFIX, name, field);
        self.map.insert(key(PORT), config.port.to_string());
        self.map.insert(key(PROTOCOL), config.protocol.clone());
        if !config.path.is_empty() {
            self.map.insert(key(PATH), config.path.clone());
        }

        if !config.attributes.is_empty() {
            if let Ok(json) = serde_json::to_string(&config.attributes) {
                self.map.insert(key(ATTRIBUTES), json);
            }
        }
        self
    }

    pub fn build(self) -> BTreeMap<String, String> {
        self.map
    }
}
