use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::*;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Output format for the log subscriber.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Error)]
#[error("unknown log format {0:?}, expected text or json")]
pub struct UnknownLogFormat(String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(UnknownLogFormat(other.to_owned())),
        }
    }
}

pub struct LoggerConfig {
    whoami: String,
    verbosity: String,
    format: LogFormat,
    file: Option<PathBuf>,
    color: bool,
    extra_directives: Vec<String>,
}

impl LoggerConfig {
    pub fn new(whoami: String) -> Self {
        Self {
            whoami,
            verbosity: "info".to_owned(),
            format: LogFormat::Text,
            file: None,
            color: true,
            extra_directives: Vec::new(),
        }
    }

    pub fn set_verbosity(&mut self, verbosity: String) {
        self.verbosity = verbosity;
    }

    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    pub fn set_file(&mut self, path: PathBuf) {
        self.file = Some(path);
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    /// Adds a `target=level` filter directive on top of the base verbosity,
    /// e.g. `lumen_db=debug` to surface statement logging.
    pub fn add_directive(&mut self, directive: String) {
        self.extra_directives.push(directive);
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("bad filter spec {spec:?}: {source}")]
    Filter {
        spec: String,
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("log file: {0}")]
    Io(#[from] std::io::Error),
}

/// Initializes the logging subsystem with the provided config.  `RUST_LOG`
/// takes precedence over the configured verbosity when set.
pub fn init(config: LoggerConfig) -> Result<(), LoggingError> {
    let mut spec = config.verbosity.clone();
    for directive in &config.extra_directives {
        spec.push(',');
        spec.push_str(directive);
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&spec).map_err(|source| LoggingError::Filter {
            spec: spec.clone(),
            source,
        })?,
    };

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match (&config.file, config.format) {
        (None, LogFormat::Text) => tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(config.color)
            .with_filter(filter)
            .boxed(),
        (None, LogFormat::Json) => tracing_subscriber::fmt::layer()
            .json()
            .with_filter(filter)
            .boxed(),
        (Some(path), LogFormat::Text) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .with_filter(filter)
                .boxed()
        }
        (Some(path), LogFormat::Json) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(Arc::new(file))
                .with_filter(filter)
                .boxed()
        }
    };

    tracing_subscriber::registry().with(layer).init();

    info!(whoami = %config.whoami, "logging started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("fluentd".parse::<LogFormat>().is_err());
    }
}
