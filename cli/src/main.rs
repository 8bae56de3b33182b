use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rdgen_emitter::{generate, EmitterOptions, Model, DEFAULT_RUNTIME_CRATE};

/// rdgen - emit a recursive-descent parser from a grammar model
#[derive(Parser, Debug)]
#[command(name = "rdgen")]
#[command(about = "Generate Rust parser source from a JSON grammar model", long_about = None)]
struct Args {
    /// Grammar model (JSON)
    #[arg(value_name = "MODEL")]
    input: PathBuf,

    /// Write the generated source here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Wrap the output in `pub mod <NAMESPACE>`; `a::b` nests
    #[arg(long)]
    namespace: Option<String>,

    /// Path generated code uses to reach the runtime
    #[arg(long, default_value = DEFAULT_RUNTIME_CRATE)]
    runtime_crate: String,

    /// Prefix the output with a generation banner
    #[arg(long)]
    info: bool,

    /// Document every item with its grammar rule
    #[arg(long)]
    rules: bool,

    /// Format the output with rustfmt when available
    #[arg(long)]
    format: bool,

    /// Log emission progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", record.level().as_str().to_lowercase(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() -> Result<()> {
    let args = Args::parse();

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        });
    }

    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let model = Model::from_json(&json).with_context(|| format!("loading {}", args.input.display()))?;

    let options = EmitterOptions {
        emit_info: args.info,
        emit_rules: args.rules,
        sources: vec![args.input.display().to_string()],
        namespace: args.namespace,
        runtime_crate: args.runtime_crate,
        format: args.format,
    };
    let parser = generate(&model, &options)
        .with_context(|| format!("generating a parser for {}", args.input.display()))?;
    let source = parser.to_source();

    match &args.output {
        Some(path) => {
            std::fs::write(path, source).with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => print!("{}", source),
    }

    Ok(())
}
