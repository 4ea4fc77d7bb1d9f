//! # Query Pipelines
//!
//! Multi-call sequences that turn raw proxy results into stable values:
//!
//! - [`modules`]: enumerate loaded modules with their names
//! - [`symbols`]: address to symbol and back
//! - [`memory`]: virtual memory reads with partial-read recovery
//! - [`context`]: register and stack snapshots of a suspended thread
//!
//! Pipelines borrow a [`ProxySet`](crate::proxy::ProxySet) for the duration
//! of one query and hold nothing afterwards. Results own their data.
//!
//! Two outcomes are reported as values rather than errors: a symbol lookup
//! miss ([`Lookup::NotFound`]) and a read that stopped early
//! ([`ReadStatus::PartialRead`]).

pub mod context;
pub mod memory;
pub mod modules;
pub mod retry;
pub mod symbols;

pub use context::{StackFrame, ThreadContext};
pub use memory::{ReadOutcome, ReadStatus};
pub use modules::{ModuleInfo, ModuleSnapshot};
pub use retry::RetryPolicy;
pub use symbols::{ModuleLocation, SymbolRecord};

/// Result of a lookup that may legitimately find nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T>
{
    Found(T),
    NotFound,
}

impl<T> Lookup<T>
{
    /// Convert into an `Option`.
    pub fn found(self) -> Option<T>
    {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool
    {
        matches!(self, Lookup::Found(_))
    }

    /// Map the found value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U>
    {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T>
{
    fn from(value: Option<T>) -> Self
    {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::NotFound,
        }
    }
}
