use thiserror::Error;

use crate::module::ModuleError;

#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("XML parse error at byte {position}: {message}")]
    Parse { position: u64, message: String },

    #[error("XML serialization error: {0}")]
    Serialize(String),

    #[error("Validate one weblogic-application element: found {found} as document root")]
    InvalidRoot { found: usize },

    #[error("Descriptor is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Failed to access descriptor: {0}")]
    Module(#[from] ModuleError),
}

pub type Result<T> = std::result::Result<T, DescriptorError>;
