pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod process;
pub mod write;

pub use config::Config;
pub use pipeline::{run, RunReport};
