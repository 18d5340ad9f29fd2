use crate::Attributes;

/// A server as declared on a cluster object, before any routing is applied.
///
/// Routing hints such as a required subdomain are carried in the attributes, which are passed
/// through to clients unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// The container port.
    pub port: u16,

    pub protocol: String,

    /// A path relative to the server's root. May be empty.
    pub path: String,

    pub attributes: Attributes,
}

// === impl ServerConfig ===

impl ServerConfig {
    pub const REQUIRE_SUBDOMAIN_ATTRIBUTE: &'static str = "requireSubdomain";
    pub const ENDPOINT_ORIGIN_ATTRIBUTE: &'static str = "endpointOrigin";

    pub fn new(
        port: u16,
        protocol: impl Into<String>,
        path: impl Into<String>,
        attributes: Attributes,
    ) -> Self {
        Self {
            port,
            protocol: protocol.into(),
            path: path.into(),
            attributes,
        }
    }

    /// Sets the `requireSubdomain` attribute.
    pub fn with_require_subdomain(mut self, require_subdomain: bool) -> Self {
        self.attributes.insert(
            Self::REQUIRE_SUBDOMAIN_ATTRIBUTE.to_string(),
            require_subdomain.to_string(),
        );
        self
    }

    /// Sets the `endpointOrigin` attribute.
    pub fn with_endpoint_origin(mut self, origin: impl Into<String>) -> Self {
        self.attributes
            .insert(Self::ENDPOINT_ORIGIN_ATTRIBUTE.to_string(), origin.into());
        self
    }

    /// Indicates that the server must be exposed on a dedicated subdomain rather than a path
    /// prefix of a shared host.
    pub fn require_subdomain(&self) -> bool {
        self.attributes
            .get(Self::REQUIRE_SUBDOMAIN_ATTRIBUTE)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// The path prefix assigned to the server when it shares a host. Only meaningful when the
    /// server does not require a subdomain.
    pub fn endpoint_origin(&self) -> Option<&str> {
        self.attributes
            .get(Self::ENDPOINT_ORIGIN_ATTRIBUTE)
            .map(String::as_str)
    }
}
