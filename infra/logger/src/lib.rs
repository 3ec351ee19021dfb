//! # Logger
//!
//! Installs the global `tracing` subscriber for programs hosting store modules.
//!
//! * Console output is compact and colored; file output rolls over and may be JSON.
//! * Filtering starts from a level and accepts extra directives (`"storemod_store=trace"`).
//!   Without directives, `RUST_LOG` is honored.
//! * [`LoggerBuilder::trace_operations`] raises the [`TRACE_TARGET`] to `DEBUG`, so the
//!   operation traces of modules built with [`storemod_core::Tracer::tracing`] show up no
//!   matter the base level.
//!
//! ## Example
//!
//! ```rust
//! # use storemod_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("store-demo")
//!     .level(LevelFilter::INFO)
//!     .trace_operations(true)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use storemod_core::TRACE_TARGET;
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 7;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
struct LoggerSettings {
    console: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    directives: Vec<String>,
    trace_operations: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            console: true,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            directives: Vec::new(),
            trace_operations: false,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// Configures and installs the global subscriber.
///
/// A name is required before [`LoggerBuilder::init`] becomes available; file-only settings
/// unlock once [`LoggerBuilder::path`] is set.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    settings: LoggerSettings,
    name: N,
    file: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Names the program; also the prefix of rolled log files.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder { settings: self.settings, name: WithName(name.into()), file: PhantomData }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.settings.rotation = rotation;
        self
    }

    /// Writes the log file as JSON lines.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.settings.json = true;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    /// Default level for targets no directive mentions.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Adds a filter directive such as `storemod_store=trace`. May be called repeatedly.
    ///
    /// Once any directive is set, `RUST_LOG` is ignored.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.settings.directives.push(directive.into());
        self
    }

    /// Emits module operation traces regardless of the base level.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn trace_operations(mut self, enabled: bool) -> Self {
        self.settings.trace_operations = enabled;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Directory for rolling log files.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut settings = self.settings;
        settings.path = Some(path.into());
        LoggerBuilder { settings, name: self.name, file: PhantomData }
    }

    /// Installs the global subscriber.
    ///
    /// Keep the returned [`Logger`] alive: it owns the worker that flushes file output.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber is already installed,
    /// [`LoggerError::InvalidConfiguration`] for an empty name, zero `max_files`, a bad
    /// directive or no output at all, and [`LoggerError::Appender`] if the log file cannot be
    /// opened.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { settings, name: WithName(name), .. } = self;
        validate(&settings, &name)?;
        let filter = build_filter(&settings)?;

        let mut layers = Vec::new();
        if settings.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = match &settings.path {
            Some(path) => {
                fs::create_dir_all(path).map_err(|e| LoggerError::Internal {
                    message: e.to_string().into(),
                    context: Some(format!("Failed to create path: {}", path.display()).into()),
                })?;

                let appender = RollingFileAppender::builder()
                    .rotation(settings.rotation.clone())
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(settings.max_files)
                    .build(path)?;
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(if settings.json { file_layer.json().boxed() } else { file_layer.boxed() });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No output enabled. Enable the console or set a log path.".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;
        tracing::debug!(logger = %name, operations = settings.trace_operations, "Logger installed");

        Ok(Logger { guard })
    }
}

/// Handle of the installed logging system.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: LoggerSettings::default(), name: NoName, file: PhantomData }
    }

    /// The file worker guard; `None` for console-only logging.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

fn validate(settings: &LoggerSettings, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }
    if settings.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn build_filter(settings: &LoggerSettings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    let filter = if settings.directives.is_empty() {
        builder.from_env_lossy()
    } else {
        let joined = settings.directives.join(",");
        builder.parse(&joined).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("Invalid filter '{joined}': {e}").into(),
            context: None,
        })?
    };

    if !settings.trace_operations {
        return Ok(filter);
    }
    let directive = format!("{TRACE_TARGET}=debug");
    let parsed: Directive = directive.parse().map_err(|e| LoggerError::InvalidConfiguration {
        message: format!("Invalid filter '{directive}': {e}").into(),
        context: None,
    })?;
    Ok(filter.add_directive(parsed))
}
