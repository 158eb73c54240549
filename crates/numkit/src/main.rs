//! numkit: parallel integration, memoized Fibonacci, and statistics.

use std::process::ExitCode;

use numkit_lib::{app, config, errors};

fn main() -> ExitCode {
    let config = config::AppConfig::parse();

    let level = if config.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match app::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            app::presenter(&config).present_error(&format!("{err:#}"));
            let code = errors::exit_code(&err);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
