use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quanthuff::models::{CodecConfig, InspectReport};
use quanthuff::services::CompressionService;
use quanthuff_codec::Strategy;

#[derive(Parser)]
#[command(name = "quanthuff")]
#[command(about = "Lossy PNG compression by color quantization and Huffman coding")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a PNG into a quanthuff artifact
    Compress {
        /// Input PNG file
        #[arg(short, long)]
        input: PathBuf,

        /// Output artifact file
        #[arg(short, long)]
        output: PathBuf,

        /// Quantization strategy: "rounded-block", "plain-block" or "octree"
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Octree palette size
        #[arg(short = 'c', long)]
        max_colors: Option<usize>,

        /// Match pixels to the nearest palette color instead of the quick path lookup
        #[arg(long)]
        exact: bool,

        /// YAML file with default settings (flags override it)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Decompress an artifact back into a PNG
    Decompress {
        /// Input artifact file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,

        /// Fail instead of writing a partial image when the bitstream ends early
        #[arg(long)]
        strict: bool,
    },
    /// Describe an artifact without decoding it
    Inspect {
        /// Input artifact file
        #[arg(short, long)]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        run_status_command();
        return Ok(());
    };

    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quanthuff=info,quanthuff_codec=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match command {
        Commands::Compress {
            input,
            output,
            strategy,
            max_colors,
            exact,
            config,
        } => run_compress_command(&input, &output, strategy, max_colors, exact, config.as_deref()),
        Commands::Decompress {
            input,
            output,
            strict,
        } => run_decompress_command(&input, &output, strict),
        Commands::Inspect { input, json } => run_inspect_command(&input, json),
    }
}

/// Compress a PNG file to an artifact
fn run_compress_command(
    input: &Path,
    output: &Path,
    strategy: Option<Strategy>,
    max_colors: Option<usize>,
    exact: bool,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let config = CodecConfig::load_or_default(config)
        .context("Failed to load configuration")?
        .with_overrides(strategy, max_colors, exact);

    let report = CompressionService::new(&config)
        .compress_file(input, output)
        .with_context(|| format!("Failed to compress {}", input.display()))?;

    println!(
        "Compressed {} -> {} ({} bytes, {:.2}x, {})",
        input.display(),
        output.display(),
        report.artifact_bytes,
        report.ratio(),
        report.strategy
    );
    Ok(())
}

/// Decompress an artifact to a PNG file
fn run_decompress_command(input: &Path, output: &Path, strict: bool) -> anyhow::Result<()> {
    let report = CompressionService::decompress_file(input, output, strict)
        .with_context(|| format!("Failed to decompress {}", input.display()))?;

    println!(
        "Decompressed {} -> {} ({}x{})",
        input.display(),
        output.display(),
        report.width,
        report.height
    );
    if !report.is_complete() {
        eprintln!(
            "Warning: bitstream ended early, decoded {} of {} symbols",
            report.decoded_symbols, report.expected_symbols
        );
    }
    Ok(())
}

/// Print an artifact summary
fn run_inspect_command(input: &Path, json: bool) -> anyhow::Result<()> {
    let report = CompressionService::inspect_file(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_inspect_report(&report);
    }
    Ok(())
}

fn print_inspect_report(report: &InspectReport) {
    println!("Strategy:     {}", report.strategy);
    println!(
        "Dimensions:   {}x{}x{}",
        report.width, report.height, report.channels
    );
    println!("Symbols:      {}", report.expected_symbols);
    println!(
        "Alphabet:     {} (average code {:.2} bits)",
        report.alphabet_size, report.average_code_length
    );
    if let Some(palette_size) = report.palette_size {
        println!("Palette:      {palette_size} colors");
    }
    println!("Tree:         {} bytes", report.tree_bytes);
    println!("Bitstream:    {} bytes", report.bitstream_bytes);
    println!("Total:        {} bytes", report.total_bytes);

    if !report.code_lengths.is_empty() {
        println!("\nCode lengths:");
        for code in &report.code_lengths {
            println!("  {:>10}  {} bits", code.symbol, code.bits);
        }
    }
}

/// Display version and usage information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("Quanthuff v{VERSION}");
    println!("Lossy PNG compression by color quantization and Huffman coding\n");

    println!("Strategies:");
    for strategy in Strategy::ALL {
        let marker = if strategy == Strategy::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {strategy}{marker}");
    }

    println!("\nEnvironment Variables:");
    println!(
        "  RUST_LOG = {}",
        std::env::var("RUST_LOG")
            .ok()
            .as_deref()
            .unwrap_or("quanthuff=info,quanthuff_codec=warn (default)")
    );

    println!("\nCommands:");
    println!("  quanthuff compress     Compress a PNG into an artifact");
    println!("  quanthuff decompress   Decompress an artifact into a PNG");
    println!("  quanthuff inspect      Describe an artifact");
    println!("\nRun 'quanthuff --help' for more details.");
}
