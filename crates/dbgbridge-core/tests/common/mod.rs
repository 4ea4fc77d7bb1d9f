//! Shared fixtures for the integration tests.

#![allow(dead_code, unused_imports)]

pub mod fake_engine;

use dbgbridge_core::{Session, SessionConfig};

pub use fake_engine::{FakeEngine, FakeModule, PartialReads, Scripted};

pub const KERNEL_BASE: u64 = 0x7ffa_0000_0000;
pub const NTDLL_BASE: u64 = 0x7ffa_1000_0000;
pub const APP_BASE: u64 = 0x7ff6_0000_0000;

/// A suspended dump with three modules and a little mapped memory.
pub fn loaded_dump() -> FakeEngine
{
    dbgbridge_utils::init_test_logging();
    FakeEngine::new()
        .suspended()
        .with_module(
            FakeModule::new("app", APP_BASE, 0x4_0000)
                .symbol(0x1000, "main")
                .symbol(0x2000, "worker_loop"),
        )
        .with_module(
            FakeModule::new("ntdll", NTDLL_BASE, 0x20_0000)
                .symbol(0x1_0000, "RtlUserThreadStart")
                .symbol(0x3_0000, "NtWaitForSingleObject"),
        )
        .with_module(FakeModule::new("kernel32", KERNEL_BASE, 0x10_0000).symbol(0x5000, "BaseThreadInitThunk"))
}

/// Open a session on `engine` with default settings.
pub fn open(engine: FakeEngine) -> Session
{
    open_with(engine, |config| config)
}

/// Open a session on `engine` after adjusting its config.
pub fn open_with(engine: FakeEngine, adjust: impl FnOnce(SessionConfig) -> SessionConfig) -> Session
{
    dbgbridge_utils::init_test_logging();
    Session::open(adjust(engine.config())).expect("session should open on the fake engine")
}
