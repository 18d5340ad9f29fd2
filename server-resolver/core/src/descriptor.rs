use crate::Attributes;
use serde::Serialize;

/// Describes how a client reaches a single workspace server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDescriptor {
    protocol: String,

    /// A hostname or IP address. Empty when the routing layer has not yet assigned one.
    host: String,

    /// The port a client dials, when it differs from the scheme's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,

    path: String,

    /// The path prefix under which the server's whole web root lives.
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint_origin: Option<String>,

    /// The container port that ultimately serves traffic.
    target_port: u16,

    #[serde(skip_serializing_if = "Attributes::is_empty")]
    attributes: Attributes,
}

#[derive(Clone, Debug)]
pub struct ServerDescriptorBuilder {
    protocol: String,
    host: String,
    target_port: u16,
    port: Option<u16>,
    path: String,
    endpoint_origin: Option<String>,
    attributes: Attributes,
}

// === impl ServerDescriptor ===

impl ServerDescriptor {
    pub fn builder(
        protocol: impl Into<String>,
        host: impl Into<String>,
        target_port: u16,
    ) -> ServerDescriptorBuilder {
        ServerDescriptorBuilder {
            protocol: protocol.into(),
            host: host.into(),
            target_port,
            port: None,
            path: String::new(),
            endpoint_origin: None,
            attributes: Attributes::default(),
        }
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn endpoint_origin(&self) -> Option<&str> {
        self.endpoint_origin.as_deref()
    }

    pub fn target_port(&self) -> u16 {
        self.target_port
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Indicates whether a host has been assigned to this server.
    ///
    /// Callers should treat an unroutable server as not yet ready and resolve again from a later
    /// snapshot.
    pub fn is_routable(&self) -> bool {
        !self.host.is_empty()
    }

    /// Renders the server's URL, e.g. `http://ws-machine:8080/api`.
    pub fn url(&self) -> String {
        let mut url = format!("{}://{}", self.protocol, self.host);
        if let Some(port) = self.port {
            url.push(':');
            url.push_str(&port.to_string());
        }
        if !self.path.starts_with('/') {
            url.push('/');
        }
        url.push_str(&self.path);
        url
    }
}

// === impl ServerDescriptorBuilder ===

impl ServerDescriptorBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn endpoint_origin(mut self, origin: impl Into<String>) -> Self {
        self.endpoint_origin = Some(origin.into());
        self
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn build(self) -> ServerDescriptor {
        let Self {
            protocol,
            host,
            target_port,
            port,
            path,
            endpoint_origin,
            attributes,
        } = self;
        ServerDescriptor {
            protocol,
            host,
            port,
            path,
            endpoint_origin,
            target_port,
            attributes,
        }
    }
}
