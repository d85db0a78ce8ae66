// crates/mcp-hub-core/src/time.rs
// ============================================================================
// Module: Wall Clock Helpers
// Description: Millisecond timestamps and RFC 3339 rendering.
// Purpose: Keep every record timestamp on one clock representation.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Records carry unix-epoch milliseconds; human-facing surfaces render
//! RFC 3339 UTC strings.

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Returns the current unix epoch in milliseconds.
#[must_use]
pub fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

/// Returns the current UTC time formatted as RFC 3339.
#[must_use]
pub fn rfc3339_now() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| unix_millis().to_string())
}
