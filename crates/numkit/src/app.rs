//! Application entry point and dispatch.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use numkit_cli::output::write_to_file;
use numkit_cli::{CLIResultPresenter, IntegralReport, JsonResultPresenter, ResultPresenter};
use numkit_core::options::{Dispatch, IntegrationOptions};
use numkit_core::progress::CancellationToken;
use numkit_core::stats::{self, Summary};
use numkit_core::{fibonacci, fibonacci_many, Integrator};

use crate::config::{AppConfig, Command, DispatchArg, Function};

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    // Handle shell completion
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        numkit_cli::completion::generate_completion(&mut cmd, shell, &mut std::io::stdout());
        return Ok(());
    }

    let Some(command) = &config.command else {
        anyhow::bail!("no command given, see `numkit --help`");
    };

    let presenter = presenter(config);
    let timeout = config.timeout_duration()?;

    match command {
        Command::Fib { n, details } => run_fib(config, presenter.as_ref(), n, *details, timeout),
        Command::Integrate {
            function,
            lower,
            upper,
            chunks,
            dispatch,
        } => run_integrate(
            config,
            presenter.as_ref(),
            IntegrateArgs {
                function: *function,
                lower: *lower,
                upper: *upper,
                chunks: *chunks,
                dispatch: *dispatch,
                timeout,
            },
        ),
        Command::Stats { values } => {
            let summary = Summary::from_values(values);
            presenter.present_summary(&summary);
            if let Some(path) = &config.output {
                write_output(path, &serde_json::to_string(&summary)?)?;
            }
            Ok(())
        }
        Command::TwoSum { target, values } => {
            let pair = stats::two_sum(values, *target);
            presenter.present_two_sum(*target, pair);
            if let Some(path) = &config.output {
                let line = pair.map_or_else(|| "-".to_string(), |(i, j)| format!("{i} {j}"));
                write_output(path, &line)?;
            }
            Ok(())
        }
        Command::Factorial { n } => {
            let start = Instant::now();
            let value = stats::factorial(*n);
            presenter.present_factorial(*n, &value, start.elapsed());
            if let Some(path) = &config.output {
                write_output(path, &value)?;
            }
            Ok(())
        }
    }
}

/// Pick the presenter matching the output flags.
#[must_use]
pub fn presenter(config: &AppConfig) -> Box<dyn ResultPresenter> {
    if config.json {
        Box::new(JsonResultPresenter)
    } else {
        Box::new(CLIResultPresenter::new(config.verbose, config.quiet))
    }
}

fn run_fib(
    config: &AppConfig,
    presenter: &dyn ResultPresenter,
    ns: &[u64],
    details: bool,
    timeout: Duration,
) -> Result<()> {
    let start = Instant::now();

    if let [n] = ns {
        let value = fibonacci(*n);
        presenter.present_fibonacci(*n, &value, start.elapsed(), details);
        if let Some(path) = &config.output {
            write_output(path, &value)?;
        }
        return Ok(());
    }

    debug!(count = ns.len(), "computing Fibonacci batch over a shared cache");
    let values = fibonacci_many(ns, timeout)?;
    let pairs: Vec<_> = ns.iter().copied().zip(values).collect();
    presenter.present_fibonacci_batch(&pairs, start.elapsed());

    if let Some(path) = &config.output {
        let lines: Vec<String> = pairs.iter().map(|(_, v)| v.to_string()).collect();
        write_output(path, &lines.join("\n"))?;
    }
    Ok(())
}

struct IntegrateArgs {
    function: Function,
    lower: f64,
    upper: f64,
    chunks: Option<usize>,
    dispatch: DispatchArg,
    timeout: Duration,
}

fn run_integrate(
    config: &AppConfig,
    presenter: &dyn ResultPresenter,
    args: IntegrateArgs,
) -> Result<()> {
    let dispatch = Dispatch::from(args.dispatch);
    let integrator = Integrator::new(IntegrationOptions {
        chunk_timeout: args.timeout,
        dispatch,
        ..IntegrationOptions::default()
    });
    let f = args.function.as_fn();

    let start = Instant::now();
    let value = match args.chunks {
        Some(chunks) => {
            let cancel = CancellationToken::new();
            ctrlc_handler(cancel.clone());
            if dispatch == Dispatch::Sequential {
                debug!("sequential dispatch, chunk timeout is not enforced");
            }
            integrator
                .integrate_chunked(f, args.lower, args.upper, chunks, &cancel)
                .inspect_err(|e| {
                    if let Some(chunk) = e.task_index() {
                        warn!(chunk, error = %e, "chunk did not complete");
                    }
                })?
        }
        None => {
            if dispatch != Dispatch::default() {
                numkit_cli::ui::print_warning("--dispatch has no effect without --chunks");
            }
            integrator.integrate(f, args.lower, args.upper)
        }
    };

    let report = IntegralReport {
        function: args.function.name(),
        lower: args.lower,
        upper: args.upper,
        chunks: args.chunks,
        dispatch: args.chunks.map(|_| dispatch),
        value,
        duration_ms: start.elapsed().as_secs_f64() * 1000.0,
    };
    presenter.present_integral(&report);

    if let Some(path) = &config.output {
        write_output(path, &report.value)?;
    }
    Ok(())
}

fn write_output(path: &str, value: &impl std::fmt::Display) -> Result<()> {
    write_to_file(path, value).with_context(|| format!("writing result to {path}"))
}

fn ctrlc_handler(cancel: CancellationToken) {
    if let Err(e) = ctrlc::set_handler(move || {
        cancel.cancel();
    }) {
        warn!(error = %e, "could not install Ctrl+C handler");
    }
}
