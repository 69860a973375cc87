//! Prefix extraction and path rewriting.
//!
//! `/fruits/add/apple?x=1` → prefix `fruits`, forwarded as `/add/apple?x=1`.

/// Where an inbound path leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRoute<'a> {
    /// The bare root; never routed.
    Root,
    /// A routable path.
    Prefixed {
        /// First segment, used as the routing key.
        prefix: &'a str,
        /// Path sent to the backend, query included.
        forward_path: String,
    },
}

/// Split `path` into routing prefix and forwarded remainder.
pub fn route_path<'a>(path: &'a str, query: Option<&str>) -> PathRoute<'a> {
    if path.is_empty() || path == "/" {
        return PathRoute::Root;
    }

    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let (prefix, rest) = match trimmed.find('/') {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };

    let mut forward_path = if rest.is_empty() { "/".to_string() } else { rest.to_string() };
    if let Some(query) = query {
        forward_path.push('?');
        forward_path.push_str(query);
    }

    PathRoute::Prefixed { prefix, forward_path }
}
