//! # Platform Layer
//!
//! Everything that touches the engine's binary contract without being a
//! struct layout: status codes, `dbgeng.h` constants, and loading the engine
//! itself.

pub mod constants;
pub mod hresult;
pub mod loader;

pub use hresult::{HResult, StatusKind, HRESULT};
pub use loader::{DebugCreateFn, EngineConstructor, EngineSource};
