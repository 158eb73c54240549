//! Text and JSON result presenters.

use std::time::Duration;

use num_bigint::BigUint;
use serde_json::json;

use numkit_core::stats::Summary;

use crate::interfaces::{IntegralReport, ResultPresenter};
use crate::output::{format_duration, format_number, format_optional, format_result};
use crate::ui;

/// Human-readable presenter.
pub struct CLIResultPresenter {
    verbose: bool,
    quiet: bool,
}

impl CLIResultPresenter {
    #[must_use]
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }
}

impl ResultPresenter for CLIResultPresenter {
    fn present_fibonacci(&self, n: u64, value: &BigUint, duration: Duration, details: bool) {
        if self.quiet {
            println!("{value}");
            return;
        }

        println!("N: {}", format_number(n));
        println!("Duration: {}", format_duration(duration));
        if details {
            println!("Result bits: {}", value.bits());
            println!("Result digits: {}", value.to_string().len());
        }
        println!(
            "F({}) = {}",
            format_number(n),
            format_result(value, self.verbose)
        );
    }

    fn present_fibonacci_batch(&self, values: &[(u64, BigUint)], duration: Duration) {
        for (n, value) in values {
            if self.quiet {
                println!("{value}");
            } else {
                println!(
                    "F({}) = {}",
                    format_number(*n),
                    format_result(value, self.verbose)
                );
            }
        }
        if !self.quiet {
            println!("Duration: {}", format_duration(duration));
        }
    }

    fn present_integral(&self, report: &IntegralReport) {
        if self.quiet {
            println!("{}", report.value);
            return;
        }

        println!("Function: {}", report.function);
        println!("Interval: [{}, {}]", report.lower, report.upper);
        if let Some(chunks) = report.chunks {
            let dispatch = report
                .dispatch
                .map_or_else(String::new, |d| format!(" ({d:?})"));
            println!("Chunks: {chunks}{dispatch}");
        }
        println!("Duration: {}", format_duration(report.duration()));
        println!("Integral = {}", report.value);
    }

    fn present_summary(&self, summary: &Summary) {
        if self.quiet {
            println!("{}", format_optional(summary.mean));
            return;
        }

        println!("Count: {}", summary.count);
        println!("Sum: {}", summary.sum);
        println!("Mean: {}", format_optional(summary.mean));
        println!("Median: {}", format_optional(summary.median));
        println!(
            "Mode: {}",
            summary
                .mode
                .map_or_else(|| "-".to_string(), |m| m.to_string())
        );
        println!("Harmonic mean: {}", format_optional(summary.harmonic_mean));
        println!("Range: {}", format_optional(summary.range));
        if self.verbose {
            if let Some(histogram) = &summary.histogram {
                println!("Histogram:");
                for (value, count) in histogram {
                    println!("  {value:>10} {count}");
                }
            }
        }
    }

    fn present_two_sum(&self, target: i64, pair: Option<(usize, usize)>) {
        match pair {
            Some((i, j)) if self.quiet => println!("{i} {j}"),
            Some((i, j)) => println!("Indices {i} and {j} sum to {target}"),
            None if self.quiet => println!("-"),
            None => println!("No pair sums to {target}"),
        }
    }

    fn present_factorial(&self, n: u64, value: &BigUint, duration: Duration) {
        if self.quiet {
            println!("{value}");
            return;
        }
        println!("Duration: {}", format_duration(duration));
        println!("{}! = {}", format_number(n), format_result(value, self.verbose));
    }

    fn present_error(&self, error: &str) {
        ui::print_error(error);
    }
}

/// Presenter that prints one JSON document per result.
pub struct JsonResultPresenter;

impl JsonResultPresenter {
    fn emit(value: &serde_json::Value) {
        println!("{value}");
    }
}

impl ResultPresenter for JsonResultPresenter {
    fn present_fibonacci(&self, n: u64, value: &BigUint, duration: Duration, _details: bool) {
        Self::emit(&json!({
            "n": n,
            "value": value.to_string(),
            "duration_ms": duration.as_secs_f64() * 1000.0,
        }));
    }

    fn present_fibonacci_batch(&self, values: &[(u64, BigUint)], duration: Duration) {
        let entries: Vec<_> = values
            .iter()
            .map(|(n, value)| json!({ "n": n, "value": value.to_string() }))
            .collect();
        Self::emit(&json!({
            "values": entries,
            "duration_ms": duration.as_secs_f64() * 1000.0,
        }));
    }

    fn present_integral(&self, report: &IntegralReport) {
        Self::emit(&json!(report));
    }

    fn present_summary(&self, summary: &Summary) {
        Self::emit(&json!(summary));
    }

    fn present_two_sum(&self, target: i64, pair: Option<(usize, usize)>) {
        Self::emit(&json!({ "target": target, "indices": pair }));
    }

    fn present_factorial(&self, n: u64, value: &BigUint, duration: Duration) {
        Self::emit(&json!({
            "n": n,
            "value": value.to_string(),
            "duration_ms": duration.as_secs_f64() * 1000.0,
        }));
    }

    fn present_error(&self, error: &str) {
        eprintln!("{}", json!({ "error": error }));
    }
}
