pub mod node;

pub use node::Node;

use std::path::Path;

use crate::error::{CodegenError, Result};

/// Read the whole input file into memory.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path).map_err(|source| CodegenError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("File loaded, size: {} bytes", bytes.len());
    Ok(bytes)
}

/// Parse the whole input document into a `Node` tree.
///
/// Any syntax error is fatal and reported with the byte offset at which
/// serde_json gave up.
pub fn load_from_json(json: &[u8]) -> Result<Node> {
    let root: Node = serde_json::from_slice(json).map_err(|e| CodegenError::Syntax {
        offset: byte_offset(json, e.line(), e.column()),
        message: e.to_string(),
    })?;
    log::info!("JSON parsed successfully");
    Ok(root)
}

/// Convert serde_json's one-based line/column pair back to a byte offset.
fn byte_offset(src: &[u8], line: usize, column: usize) -> usize {
    let line_start = src
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'\n')
        .map(|(i, _)| i + 1)
        .nth(line.saturating_sub(2))
        .filter(|_| line > 1)
        .unwrap_or(0);
    (line_start + column.saturating_sub(1)).min(src.len())
}
