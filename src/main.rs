//! scgi-oneshot: serve one SCGI request over stdin/stdout.
//!
//! Expects an inetd-style supervisor to have accepted the connection and
//! wired it to this process's standard input/output. Decodes one request,
//! hands it to the configured bundled application, streams the response
//! back, and exits.

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use scgi_oneshot::apps::hello::Hello;
use scgi_oneshot::apps::inspect::Inspect;
use scgi_oneshot::config::{BuiltinApp, Config};
use scgi_oneshot::{serve_once, Application, DiagnosticsSink};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_logging(&config)?;

    info!(app = %config.app, "Serving one SCGI request");

    let mut app: Box<dyn Application> = match config.app {
        BuiltinApp::Hello => Box::new(Hello),
        BuiltinApp::Inspect => Box::new(Inspect),
    };

    if let Err(e) = serve_once(app.as_mut(), &config.diagnostics) {
        error!(error = %e, "Exchange failed");
        return Err(e.into());
    }

    info!("Exchange complete");
    Ok(())
}

/// Route log output to the configured diagnostics destination.
///
/// Stdout carries the response bytes, so the subscriber must never be
/// left on its default stdout writer.
fn init_logging(config: &Config) -> io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match &config.diagnostics {
        DiagnosticsSink::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .with_target(false)
                .init();
        }
        DiagnosticsSink::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(false)
                .init();
        }
        DiagnosticsSink::Discard => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .with_target(false)
                .init();
        }
    }
    Ok(())
}
