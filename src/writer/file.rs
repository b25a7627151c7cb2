//! Write the generated files into the output directory.
//!
//! Every file is first written to a temp file next to its destination; they
//! are only renamed into place once all of them were written in full.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{CodegenError, Result};

pub fn emit(out_dir: &Path, files: &[(&str, &str)]) -> Result<()> {
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| CodegenError::Write { path, source }
    };

    fs::create_dir_all(out_dir).map_err(write_err(out_dir))?;

    let mut staged = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let dest = out_dir.join(name);
        let mut tmp = NamedTempFile::new_in(out_dir).map_err(write_err(&dest))?;
        tmp.write_all(contents.as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(write_err(&dest))?;
        staged.push((tmp, dest));
    }

    for (tmp, dest) in staged {
        tmp.persist(&dest).map_err(|e| CodegenError::Write {
            path: dest.clone(),
            source: e.error,
        })?;
        log::info!("Wrote {}", dest.display());
    }
    Ok(())
}
