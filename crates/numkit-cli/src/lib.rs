//! # numkit-cli
//!
//! CLI output formatting, text and JSON result presenters, and shell
//! completion.

pub mod completion;
pub mod interfaces;
pub mod output;
pub mod presenter;
pub mod ui;

pub use interfaces::{IntegralReport, ResultPresenter};
pub use presenter::{CLIResultPresenter, JsonResultPresenter};
