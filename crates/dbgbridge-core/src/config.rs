//! # Session Configuration
//!
//! [`SessionConfig`] collects everything a session needs before it connects:
//! where the engine comes from, how symbols are located, which output the
//! engine should produce, and the sinks that receive callbacks.
//!
//! ## Environment
//!
//! [`SessionConfig::from_env`] reads:
//!
//! - `DBGBRIDGE_ENGINE_PATH`: engine library to load instead of the system one
//! - `DBGBRIDGE_SYMBOL_PATH`: symbol search path (falls back to `_NT_SYMBOL_PATH`)

use std::env;
use std::ffi::c_void;
use std::fmt;
use std::path::PathBuf;
use std::ptr::NonNull;

use crate::callbacks::CallbackSink;
use crate::error::{BridgeError, BridgeResult};
use crate::pipelines::RetryPolicy;
use crate::platform::constants::MAX_STACK_FRAMES;
use crate::platform::loader::{DebugCreateFn, EngineSource};
use crate::types::{OutputMask, SymbolOptions};

/// Environment variable naming the engine library.
pub const ENGINE_PATH_ENV: &str = "DBGBRIDGE_ENGINE_PATH";
/// Environment variable holding the symbol search path.
pub const SYMBOL_PATH_ENV: &str = "DBGBRIDGE_SYMBOL_PATH";
/// Symbol path variable the engine's own tools use.
pub const NT_SYMBOL_PATH_ENV: &str = "_NT_SYMBOL_PATH";

/// Frames captured per stack when not configured.
pub const DEFAULT_MAX_FRAMES: u32 = 256;

/// Builder for [`Session::open`](crate::session::Session::open).
///
/// ```
/// use dbgbridge_core::{OutputBuffer, RetryPolicy, SessionConfig};
///
/// let output = OutputBuffer::new();
/// let config = SessionConfig::new()
///     .symbol_path("srv*C:\\symbols")
///     .retry(RetryPolicy::Never)
///     .sink(output.clone());
/// assert_eq!(config.sink_count(), 1);
/// ```
pub struct SessionConfig
{
    pub(crate) engine: EngineSource,
    pub(crate) symbol_path: Option<String>,
    pub(crate) symbol_options: Option<SymbolOptions>,
    pub(crate) output_mask: OutputMask,
    pub(crate) retry: RetryPolicy,
    pub(crate) wait_for_initial_event: bool,
    pub(crate) max_frames: u32,
    pub(crate) sinks: Vec<Box<dyn CallbackSink>>,
}

impl Default for SessionConfig
{
    fn default() -> Self
    {
        Self {
            engine: EngineSource::default(),
            symbol_path: None,
            symbol_options: None,
            output_mask: OutputMask::default(),
            retry: RetryPolicy::default(),
            wait_for_initial_event: true,
            max_frames: DEFAULT_MAX_FRAMES,
            sinks: Vec::new(),
        }
    }
}

impl SessionConfig
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Defaults overlaid with the process environment.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: a variable is set but empty or not valid Unicode
    pub fn from_env() -> BridgeResult<Self>
    {
        let mut config = Self::default();
        if let Some(path) = env::var_os(ENGINE_PATH_ENV) {
            if path.is_empty() {
                return Err(BridgeError::InvalidArgument(format!("{ENGINE_PATH_ENV} is set but empty")));
            }
            config.engine = EngineSource::Library(PathBuf::from(path));
        }
        config.symbol_path = match read_var(SYMBOL_PATH_ENV)? {
            Some(path) => Some(path),
            None => read_var(NT_SYMBOL_PATH_ENV)?,
        };
        Ok(config)
    }

    #[must_use]
    pub fn engine(mut self, source: EngineSource) -> Self
    {
        self.engine = source;
        self
    }

    /// Load the engine from `path`.
    #[must_use]
    pub fn engine_library(self, path: impl Into<PathBuf>) -> Self
    {
        self.engine(EngineSource::Library(path.into()))
    }

    /// Use an already-resolved `DebugCreate`.
    #[must_use]
    pub fn entry_point(self, entry: DebugCreateFn) -> Self
    {
        self.engine(EngineSource::Entry(entry))
    }

    /// Build the root client with `constructor`, on the session thread.
    #[must_use]
    pub fn custom_engine<F>(self, constructor: F) -> Self
    where
        F: FnOnce() -> BridgeResult<NonNull<c_void>> + Send + 'static,
    {
        self.engine(EngineSource::Custom(Box::new(constructor)))
    }

    #[must_use]
    pub fn symbol_path(mut self, path: impl Into<String>) -> Self
    {
        self.symbol_path = Some(path.into());
        self
    }

    /// Replace the engine's symbol options. Left untouched when not set.
    #[must_use]
    pub fn symbol_options(mut self, options: SymbolOptions) -> Self
    {
        self.symbol_options = Some(options);
        self
    }

    #[must_use]
    pub fn output_mask(mut self, mask: OutputMask) -> Self
    {
        self.output_mask = mask;
        self
    }

    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self
    {
        self.retry = policy;
        self
    }

    /// Wait for the initial event after opening a target (default: on).
    #[must_use]
    pub fn wait_for_initial_event(mut self, wait: bool) -> Self
    {
        self.wait_for_initial_event = wait;
        self
    }

    /// Stack depth for context captures, clamped to `1..=1024`.
    #[must_use]
    pub fn max_frames(mut self, frames: u32) -> Self
    {
        self.max_frames = frames.clamp(1, MAX_STACK_FRAMES);
        self
    }

    /// Add a callback sink. Sinks see events in the order they were added.
    #[must_use]
    pub fn sink(mut self, sink: impl CallbackSink + 'static) -> Self
    {
        self.sinks.push(Box::new(sink));
        self
    }

    #[must_use]
    pub fn sink_count(&self) -> usize
    {
        self.sinks.len()
    }

    #[must_use]
    pub fn configured_symbol_path(&self) -> Option<&str>
    {
        self.symbol_path.as_deref()
    }

    #[must_use]
    pub fn configured_engine(&self) -> &EngineSource
    {
        &self.engine
    }
}

impl fmt::Debug for SessionConfig
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("SessionConfig")
            .field("engine", &self.engine)
            .field("symbol_path", &self.symbol_path)
            .field("symbol_options", &self.symbol_options)
            .field("output_mask", &self.output_mask)
            .field("retry", &self.retry)
            .field("wait_for_initial_event", &self.wait_for_initial_event)
            .field("max_frames", &self.max_frames)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

fn read_var(name: &str) -> BridgeResult<Option<String>>
{
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(BridgeError::InvalidArgument(format!("{name} is not valid Unicode"))),
    }
}
