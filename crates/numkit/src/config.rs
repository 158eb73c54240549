//! Application configuration from CLI flags and environment.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use numkit_core::error::NumError;
use numkit_core::options::Dispatch;

/// numkit: parallel integration, memoized Fibonacci, and statistics.
#[derive(Parser, Debug)]
#[command(name = "numkit", version, about, arg_required_else_help = true)]
pub struct AppConfig {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (also enables debug logging).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (only output the value).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write the result to this file as well.
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Per-task timeout for parallel work (e.g., "100s", "500ms", "5m").
    #[arg(long, global = true, default_value = "100s", env = "NUMKIT_TIMEOUT")]
    pub timeout: String,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute Fibonacci numbers with a memoization cache. Several indices
    /// are computed concurrently over one shared cache.
    Fib {
        /// Indices to compute.
        #[arg(required = true)]
        n: Vec<u64>,

        /// Show bit and digit counts.
        #[arg(short, long)]
        details: bool,
    },

    /// Approximate a definite integral with the rectangle rule.
    Integrate {
        /// Function to integrate.
        #[arg(short, long, value_enum, default_value = "identity")]
        function: Function,

        /// Lower bound.
        #[arg(long, allow_negative_numbers = true)]
        lower: f64,

        /// Upper bound.
        #[arg(long, allow_negative_numbers = true)]
        upper: f64,

        /// Split the interval into this many concurrently evaluated chunks.
        #[arg(long)]
        chunks: Option<usize>,

        /// How chunks are scheduled.
        #[arg(long, value_enum, default_value = "threads")]
        dispatch: DispatchArg,
    },

    /// Print descriptive statistics of the given values.
    Stats {
        /// Sample values.
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },

    /// Find the first pair of values adding up to a target.
    TwoSum {
        /// Target sum.
        #[arg(short, long, allow_negative_numbers = true)]
        target: i64,

        /// Values to search.
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i64>,
    },

    /// Compute n!.
    Factorial {
        /// Argument.
        n: u64,
    },
}

/// Built-in integrands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Function {
    /// f(x) = x
    Identity,
    /// f(x) = x^2
    Square,
    /// f(x) = x^2 + 1
    SquarePlusOne,
    /// f(x) = sin(x)
    Sin,
    /// f(x) = cos(x)
    Cos,
    /// f(x) = e^x
    Exp,
    /// f(x) = sqrt(x)
    Sqrt,
}

impl Function {
    /// The function itself.
    #[must_use]
    pub fn as_fn(self) -> fn(f64) -> f64 {
        match self {
            Self::Identity => |x| x,
            Self::Square => |x| x * x,
            Self::SquarePlusOne => |x| x * x + 1.0,
            Self::Sin => f64::sin,
            Self::Cos => f64::cos,
            Self::Exp => f64::exp,
            Self::Sqrt => f64::sqrt,
        }
    }

    /// Name as accepted on the command line.
    #[must_use]
    pub fn name(self) -> String {
        self.to_possible_value()
            .map_or_else(|| format!("{self:?}"), |v| v.get_name().to_string())
    }
}

/// Command-line mirror of [`Dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DispatchArg {
    /// One thread per chunk.
    Threads,
    /// Shared worker pool.
    Pool,
    /// One chunk after another on the calling thread.
    Sequential,
}

impl From<DispatchArg> for Dispatch {
    fn from(arg: DispatchArg) -> Self {
        match arg {
            DispatchArg::Threads => Self::Threads,
            DispatchArg::Pool => Self::Pool,
            DispatchArg::Sequential => Self::Sequential,
        }
    }
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse the timeout string into a `Duration`.
    pub fn timeout_duration(&self) -> Result<Duration, NumError> {
        match parse_duration(&self.timeout) {
            Some(d) if !d.is_zero() => Ok(d),
            _ => Err(NumError::Config(format!("invalid timeout: {:?}", self.timeout))),
        }
    }
}

/// Parse a duration string like "5m", "1h", "30s", "250ms". A bare number
/// is taken as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        return ms.trim().parse().ok().map(Duration::from_millis);
    }
    let (digits, unit_secs) = if let Some(mins) = s.strip_suffix('m') {
        (mins, 60)
    } else if let Some(hours) = s.strip_suffix('h') {
        (hours, 3600)
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, 1)
    } else {
        (s, 1)
    };
    let n: u64 = digits.trim().parse().ok()?;
    n.checked_mul(unit_secs).map(Duration::from_secs)
}
