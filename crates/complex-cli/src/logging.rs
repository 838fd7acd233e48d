use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Overrides the console directives when set, e.g. `PDBCOMPLEX_LOG=pdbcomplex::engine=trace`.
const LOG_ENV: &str = "PDBCOMPLEX_LOG";

/// Everything this program emits at debug, dependencies at info.
const FILE_DIRECTIVES: &str = "info,pdbcomplex=debug";

fn console_directives(verbosity: u8, quiet: bool) -> String {
    if quiet {
        return "off".to_string();
    }
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Library and binary both log under the `pdbcomplex` target.
    format!("warn,pdbcomplex={level}")
}

fn console_filter(verbosity: u8, quiet: bool) -> EnvFilter {
    if !quiet {
        if let Some(filter) = std::env::var(LOG_ENV)
            .ok()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
        {
            return filter;
        }
    }
    EnvFilter::new(console_directives(verbosity, quiet))
}

fn file_layer(file: File) -> Box<dyn Layer<Registry> + Send + Sync> {
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(EnvFilter::new(FILE_DIRECTIVES))
        .boxed()
}

/// Installs the global subscriber.
///
/// The console follows `-v`/`-q`. A log file, when given, always records the full
/// debug trace of a run, so `-q --log-file run.log` keeps the terminal silent while
/// still capturing per-structure extraction failures and catalog warnings.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(console_filter(verbosity, quiet));

    let file_sink = log_file
        .map(|path| File::create(path).map(file_layer).map_err(CliError::Io))
        .transpose()?;

    tracing_subscriber::registry()
        .with(file_sink)
        .with(console_layer)
        .init();
    Ok(())
}
