//! Endpoint records published to the registry.

use std::collections::BTreeMap;
use std::fmt;

use url::Url;

/// Metadata key carrying the routing key.
pub const API_NAME_KEY: &str = "api.name";

/// Kind of service a record describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// A plain HTTP service reachable at `host:port`.
    HttpEndpoint,
    /// Anything else; never dispatched to by the gateway.
    Other(String),
}

impl RecordType {
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::HttpEndpoint => "http-endpoint",
            RecordType::Other(kind) => kind,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for RecordType {
    fn from(kind: &str) -> Self {
        match kind {
            "http-endpoint" => RecordType::HttpEndpoint,
            other => RecordType::Other(other.to_string()),
        }
    }
}

/// Where a record's service can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub host: String,
    pub port: u16,
    /// Path the service is mounted under, `/` for the whole host.
    pub root_path: String,
}

impl Location {
    /// `host:port`.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL including the root path.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}{}", self.authority(), self.root_path))
    }

    /// Join a request path (which may include a query) onto the root path.
    pub fn join(&self, path_and_query: &str) -> String {
        let root = self.root_path.trim_end_matches('/');
        if path_and_query.starts_with('/') {
            format!("{root}{path_and_query}")
        } else {
            format!("{root}/{path_and_query}")
        }
    }
}

/// Typed record metadata.
///
/// The routing key is pulled out of the free-form entries so lookups never
/// probe string keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordMetadata {
    /// Routing key matched against the first path segment.
    pub api_name: Option<String>,
    /// Any other entries, kept verbatim.
    pub extra: BTreeMap<String, String>,
}

impl RecordMetadata {
    /// Build metadata from raw key/value pairs, lifting `api.name` out.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut metadata = Self::default();
        for (key, value) in pairs {
            metadata.insert(key, value);
        }
        metadata
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if key == API_NAME_KEY {
            self.api_name = Some(value);
        } else {
            self.extra.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        if key == API_NAME_KEY {
            self.api_name.as_deref()
        } else {
            self.extra.get(key).map(String::as_str)
        }
    }
}

/// A registry entry describing one reachable backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRecord {
    pub name: String,
    pub record_type: RecordType,
    pub location: Location,
    pub metadata: RecordMetadata,
}

impl EndpointRecord {
    /// Create an `http-endpoint` record with empty metadata.
    pub fn http_endpoint(
        name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        root_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: RecordType::HttpEndpoint,
            location: Location {
                host: host.into(),
                port,
                root_path: root_path.into(),
            },
            metadata: RecordMetadata::default(),
        }
    }

    /// Set the routing key.
    pub fn with_api_name(mut self, api_name: impl Into<String>) -> Self {
        self.metadata.api_name = Some(api_name.into());
        self
    }

    pub fn is_http_endpoint(&self) -> bool {
        self.record_type == RecordType::HttpEndpoint
    }

    pub fn routing_key(&self) -> Option<&str> {
        self.metadata.api_name.as_deref()
    }
}

/// Identifier assigned at publication; increases with publication order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationId(pub u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reg-{}", self.0)
    }
}

/// A published record together with its registration id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub id: RegistrationId,
    pub record: EndpointRecord,
}
