pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod writer;

use std::path::Path;

use anyhow::Context;
use clap::Parser;

use config::EmitConfig;
use writer::Mode;

/// Everything one generation run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub header: String,
    pub source: String,
    /// One warning per line, empty when the document was clean.
    pub warnings: String,
}

/// Pure part of the pipeline: JSON bytes in, header/source text out.
pub fn generate(json: &[u8], config: &EmitConfig) -> error::Result<Generated> {
    let root = parser::load_from_json(json)?;
    let processed = processor::run(&root);

    let header = writer::c::emit(&processed, Mode::Header, config)?;
    let source = writer::c::emit(&processed, Mode::Source, config)?;

    Ok(Generated {
        header,
        source,
        warnings: processed.ctx.warnings.report(),
    })
}

pub fn run() -> anyhow::Result<()> {
    run_with(cli::Cli::parse())
}

pub fn run_with(args: cli::Cli) -> anyhow::Result<()> {
    init_logging(args.verbose);

    // 1. ── Configure ──────────────────────────────────────────────────
    let config = load_config(&args).with_context(|| "Loading configuration")?;

    // 2. ── Parse & generate ───────────────────────────────────────────
    let json = parser::read_input(&args.input)
        .with_context(|| format!("Reading {}", args.input.display()))?;
    let generated = generate(&json, &config).with_context(|| "Generating localization code")?;

    // 3. ── Write outputs ──────────────────────────────────────────────
    writer::file::emit(
        &args.output,
        &[
            (config.header_name.as_str(), generated.header.as_str()),
            (config.source_name.as_str(), generated.source.as_str()),
        ],
    )
    .with_context(|| format!("Writing {}", args.output.display()))?;

    // 4. ── Report ─────────────────────────────────────────────────────
    if !generated.warnings.is_empty() {
        log::warn!("{} warnings", generated.warnings.lines().count());
        eprint!("{}", generated.warnings);
    }
    if let Some(path) = &args.warnings_file {
        std::fs::write(path, &generated.warnings)
            .with_context(|| format!("Writing {}", path.display()))?;
    }

    Ok(())
}

fn load_config(args: &cli::Cli) -> error::Result<EmitConfig> {
    let (mut config, origin) = match &args.config {
        Some(path) => (EmitConfig::load(path)?, path.as_path()),
        None => (EmitConfig::default(), Path::new("<command line>")),
    };

    if let Some(ns) = &args.root_namespace {
        config.root_namespace = ns.clone();
    }
    if let Some(name) = &args.header_name {
        config.header_name = name.clone();
    }
    if let Some(name) = &args.source_name {
        config.source_name = name.clone();
    }
    config.validate(origin)?;
    Ok(config)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    // RUST_LOG, when set, wins over -v.
    let _ = env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
