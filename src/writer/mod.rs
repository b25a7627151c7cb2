//! Component 4 – turning the processed project into files.
pub mod c;
pub mod file;

pub use c::Mode;
