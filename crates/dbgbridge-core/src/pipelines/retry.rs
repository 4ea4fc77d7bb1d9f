//! Retry policy for idempotent lookups.

use tracing::debug;

use crate::error::BridgeResult;

/// Whether read-only module and symbol lookups retry after a transient code.
///
/// Driving operations never go through a retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy
{
    /// Report the first failure.
    Never,
    /// Retry once if the first failure is transient (pending I/O, timeouts).
    #[default]
    OnceOnTransient,
}

impl RetryPolicy
{
    /// Run `query`, retrying it once if the policy and the error allow.
    pub(crate) fn run<T>(self, operation: &'static str, mut query: impl FnMut() -> BridgeResult<T>) -> BridgeResult<T>
    {
        match query() {
            Err(err) if self == RetryPolicy::OnceOnTransient && err.is_transient() => {
                debug!("{operation}: transient failure ({err}), retrying once");
                query()
            }
            result => result,
        }
    }
}

