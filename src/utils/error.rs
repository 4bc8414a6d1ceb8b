use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Failed to decode CodeGeneratorRequest: {0}")]
    DecodeError(#[from] prost::DecodeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed descriptor in {file}: {message}")]
    MalformedDescriptor { file: String, message: String },

    #[error("error generating relative import path for {file}: {reason}")]
    RelativePath { file: String, reason: String },

    #[error("Unresolved type reference in {file}: {type_name} has no import alias")]
    UnresolvedType { file: String, type_name: String },

    #[error("Failed to render generated code: {0}")]
    RenderError(#[from] std::fmt::Error),

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Service {service} has methods {first} and {second} that both map to {ident}")]
    DuplicateMethod {
        file: String,
        service: String,
        first: String,
        second: String,
        ident: String,
    },

    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Protocol,
    Descriptor,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GenError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GenError::DecodeError(_) => ErrorCategory::Protocol,
            GenError::MalformedDescriptor { .. }
            | GenError::RelativePath { .. }
            | GenError::UnresolvedType { .. }
            | GenError::DuplicateMethod { .. }
            | GenError::RenderError(_)
            | GenError::GenerationFailed(_) => ErrorCategory::Descriptor,
            GenError::ConfigValidationError { .. } | GenError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            GenError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Descriptor => ErrorSeverity::High,
            ErrorCategory::Protocol | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Protocol => format!("protoc plugin protocol failure: {}", self),
            ErrorCategory::Descriptor => format!("cannot generate bindings: {}", self),
            ErrorCategory::Configuration => format!("invalid plugin options: {}", self),
            ErrorCategory::System => format!("system error: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GenError::DecodeError(_) => {
                "Run the plugin through protoc (--plugin=protoc-gen-rtwirp) or pass --request with a serialized CodeGeneratorRequest"
            }
            GenError::RelativePath { .. } => {
                "Make sure all .proto files are passed to protoc relative to the same include root"
            }
            GenError::UnresolvedType { .. } => {
                "Import the .proto file that defines the referenced message directly"
            }
            GenError::DuplicateMethod { .. } => {
                "Rename one of the RPCs; method names are lower-cased on their first letter"
            }
            GenError::MalformedDescriptor { .. } | GenError::GenerationFailed(_) => {
                "Check the .proto definition and the protoc version"
            }
            GenError::IoError(_) => "Check file permissions and the output directory",
            _ => "Check the --rtwirp_opt parameters and the config file",
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
