//! Record matching logic.
//!
//! # Design Decisions
//! - Routing keys match exactly (case-sensitive, like paths)
//! - Records without a routing key never match
//! - First match in snapshot order wins; the registry returns records in
//!   publication order, so ties go to the earliest publication

use crate::registry::EndpointRecord;

/// Matches records whose routing key equals a request prefix.
#[derive(Debug, Clone, Copy)]
pub struct RoutingKeyMatcher<'a> {
    key: &'a str,
}

impl<'a> RoutingKeyMatcher<'a> {
    pub fn new(key: &'a str) -> Self {
        Self { key }
    }

    pub fn matches(&self, record: &EndpointRecord) -> bool {
        record.routing_key() == Some(self.key)
    }

    /// First record in `records` that matches.
    pub fn select<'r>(&self, records: &'r [EndpointRecord]) -> Option<&'r EndpointRecord> {
        records.iter().find(|record| self.matches(record))
    }
}
