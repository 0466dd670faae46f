pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod process;
pub mod run;

pub use config::Config;
pub use error::EtlError;
pub use run::{run, BatchReport, RunSummary, StopReason};
