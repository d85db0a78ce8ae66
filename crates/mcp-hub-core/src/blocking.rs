// crates/mcp-hub-core/src/blocking.rs
// ============================================================================
// Module: Blocking Store Calls
// Description: Runs synchronous store work from async handlers.
// Purpose: Keep store backends synchronous without stalling runtime workers.
// Dependencies: tokio
// ============================================================================

//! Runs synchronous store work from async handlers.

/// Runs synchronous work, yielding the worker thread on multi-thread runtimes.
///
/// On current-thread runtimes (and outside any runtime) the closure runs
/// inline.
pub fn run_blocking<T>(work: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(work)
        }
        _ => work(),
    }
}
