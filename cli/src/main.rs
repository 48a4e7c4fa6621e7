use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use eduasm::Assembler;
use tracing::Level;

#[derive(Parser)]
#[command(version, about = "Assembler for the 64-word educational CPU", long_about = None)]
struct Args {
    /// Assembly source file
    source: PathBuf,

    /// Output file for the image (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a human-readable listing to this file
    #[arg(long, value_name = "FILE")]
    listing: Option<PathBuf>,

    /// One of `TRACE`, `DEBUG`, `INFO`, `WARN`, or `ERROR`
    #[arg(short, long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = main_real(args) {
        tracing::error!("{e:#}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main_real(args: Args) -> anyhow::Result<()> {
    let source = fs::read_to_string(&args.source)
        .with_context(|| format!("cant read {}", args.source.display()))?;

    let image = Assembler::new()
        .assemble_with_warnings(&source, |message, index| {
            tracing::warn!("{}:{}: {message}", args.source.display(), index + 1);
        })
        .with_context(|| format!("failed to assemble {}", args.source.display()))?;
    tracing::debug!(
        words = image.instructions().len(),
        labels = image.labels().len(),
        "assembled"
    );

    let text = image.to_string();
    match &args.output {
        Some(path) => fs::write(path, &text)
            .with_context(|| format!("cant write {}", path.display()))?,
        None => io::stdout().lock().write_all(text.as_bytes())?,
    }

    if let Some(path) = &args.listing {
        let file = fs::File::create(path)
            .with_context(|| format!("cant create {}", path.display()))?;
        image.write_listing(io::BufWriter::new(file))?;
        tracing::info!("listing saved to {}", path.display());
    }

    Ok(())
}
