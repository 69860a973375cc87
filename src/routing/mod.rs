//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound path + query
//!     → path.rs (root check, prefix extraction, path rewrite)
//!     → registry snapshot (fetched by the dispatcher)
//!     → matcher.rs (pick the record whose api.name equals the prefix)
//!     → Return: matched record or explicit no-match
//! ```
//!
//! There is no routing table: the registry snapshot is the table, and it is
//! read fresh for every request.

pub mod matcher;
pub mod path;

pub use matcher::RoutingKeyMatcher;
pub use path::{route_path, PathRoute};
