pub mod emitter;
pub mod generator;
pub mod imports;
pub mod intake;

pub use crate::domain::model::{GeneratedFile, GenerationUnit};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
pub use generator::{process_request, respond, CodeGenerator};
