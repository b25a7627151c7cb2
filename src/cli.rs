use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Input localization .json file
    pub input: PathBuf,
    /// Output directory for the generated header and source
    pub output: PathBuf,
    /// JSON file with output naming options
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Namespace wrapping the generated code
    #[arg(long)]
    pub root_namespace: Option<String>,
    /// File name of the generated header
    #[arg(long)]
    pub header_name: Option<String>,
    /// File name of the generated source
    #[arg(long)]
    pub source_name: Option<String>,
    /// Also write the warnings report to this file
    #[arg(long)]
    pub warnings_file: Option<PathBuf>,
    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
