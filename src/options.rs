//! Parse-time configuration.

use chrono::{FixedOffset, Local, Offset, Utc};

/// Settings that affect how a query string is compiled.
///
/// The local offset stands in for the host time zone: date/time literals
/// written without an explicit zone are anchored to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Offset used for date/time literals without an explicit zone
    pub local_offset: FixedOffset,

    /// Percent-decode the input before stripping the `?` / `RQL=` prefixes
    pub url_decode: bool,

    /// Merge top-level SELECT and SORT clauses after validation
    pub consolidate: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            local_offset: Local::now().offset().fix(),
            url_decode: true,
            consolidate: true,
        }
    }
}

impl ParseOptions {
    /// Options anchored at UTC, independent of the host.
    pub fn utc() -> Self {
        Self::default().with_local_offset(Utc.fix())
    }

    pub fn with_local_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = offset;
        self
    }

    pub fn with_url_decode(mut self, url_decode: bool) -> Self {
        self.url_decode = url_decode;
        self
    }

    pub fn with_consolidate(mut self, consolidate: bool) -> Self {
        self.consolidate = consolidate;
        self
    }
}
