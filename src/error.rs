//! Fatal errors. Anything listed here aborts the whole invocation; shape
//! problems inside the document are warnings instead (see `processor::context`).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("JSON parse error at byte offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("formatting generated code")]
    Format(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, CodegenError>;
