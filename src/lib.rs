pub mod config;
pub mod core;
pub mod domain;
pub mod runtime;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use config::GeneratorConfig;
pub use core::{process_request, CodeGenerator};
pub use utils::error::{GenError, Result};
