//! Lineage Trace Command Line Interface
//!
//! Traces the lineage of one target table from Excel or CSV metadata,
//! exports it as Atlas-style catalog JSON and optionally renders it.
//!
//! # Usage
//!
//! ```bash
//! # Excel input, DOT rendering next to the export
//! lineage-trace -i metadata.xlsx -s lineage -t sales_summary -o out/lineage.json \
//!     -g dot --graph-output out/lineage.dot
//!
//! # CSV input, machine-readable summary
//! lineage-trace -i metadata.csv -t sales_summary --format json
//!
//! # Settings from a YAML file, flags override
//! lineage-trace --config trace.yaml --lenient --max-paths 10000
//! ```
//!
//! # Exit status
//!
//! 0 success, 2 configuration, 3 invalid metadata record, 4 unknown target,
//! 5 path limit exceeded, 6 metadata could not be read, 1 anything else.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use lineage_trace::{
    ConfigOverrides, InputFormat, LineagePipeline, RenderMode, TraceConfig, TraceError,
    TraceReport,
};

#[derive(Parser)]
#[command(name = "lineage-trace")]
#[command(version)]
#[command(about = "Trace table lineage and export it as catalog JSON")]
#[command(long_about = None)]
struct Cli {
    /// Metadata file (Excel workbook or CSV)
    #[arg(short, long, env = "LINEAGE_INPUT")]
    input: Option<PathBuf>,

    /// Worksheet holding the metadata (Excel input)
    #[arg(short, long, env = "LINEAGE_SHEET")]
    sheet: Option<String>,

    /// Final target table
    #[arg(short, long, env = "LINEAGE_TARGET")]
    target: Option<String>,

    /// Catalog JSON output path
    #[arg(short, long, env = "LINEAGE_OUTPUT")]
    output: Option<PathBuf>,

    /// Graph rendering: dot, mermaid or none
    #[arg(short = 'g', long = "graph", value_enum)]
    graph: Option<RenderMode>,

    /// Input type; inferred from the file extension when omitted
    #[arg(long, value_enum)]
    input_type: Option<InputFormat>,

    /// YAML config file; flags take precedence over its values
    #[arg(long, env = "LINEAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Namespace prefix for catalog qualified names
    #[arg(long, env = "LINEAGE_NAMESPACE")]
    namespace: Option<String>,

    /// Skip invalid metadata records instead of aborting
    #[arg(long)]
    lenient: bool,

    /// Fail when more distinct transformation paths exist
    #[arg(long)]
    max_paths: Option<usize>,

    /// Fail when a walk needs more hops
    #[arg(long)]
    max_depth: Option<usize>,

    /// Return the paths found so far when a limit is hit
    #[arg(long)]
    allow_partial: bool,

    /// Write the rendered graph here instead of stdout
    #[arg(long)]
    graph_output: Option<PathBuf>,

    /// Summary format
    #[arg(long, default_value = "text", value_enum)]
    format: OutputFormat,

    /// Only log warnings and errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input: self.input.clone(),
            input_format: self.input_type,
            sheet: self.sheet.clone(),
            target: self.target.clone(),
            output: self.output.clone(),
            render: self.graph,
            render_output: self.graph_output.clone(),
            namespace: self.namespace.clone(),
            lenient: self.lenient,
            max_paths: self.max_paths,
            max_depth: self.max_depth,
            allow_partial: self.allow_partial,
        }
    }
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e
                .downcast_ref::<TraceError>()
                .map_or(1, TraceError::exit_code);
            if cli.format == OutputFormat::Json {
                let body = serde_json::json!({ "error": format!("{:#}", e), "exit_code": code });
                println!("{}", body);
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = TraceConfig::load(cli.config.as_deref())
        .map_err(TraceError::from)?
        .merge(cli.overrides());

    let pipeline = LineagePipeline::from_config(&config)?;
    let report = pipeline.run()?;

    match cli.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize trace report")?;
            println!("{}", json);
        }
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &TraceReport) {
    println!(
        "{} Lineage of {} ({} tables, {} transformations in the full graph)",
        "OK".green().bold(),
        report.target.cyan().bold(),
        report.nodes,
        report.edges
    );

    println!("\n{} ({})", "Ancestors".bold(), report.ancestors.len());
    if report.ancestors.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for ancestor in &report.ancestors {
        println!("  {}", ancestor);
    }

    println!(
        "\n{} ({})",
        "Transformation paths".bold(),
        report.paths.len()
    );
    for path in &report.paths {
        println!("  {}", path.to_string().green());
    }
    if report.truncated {
        println!(
            "  {} limit reached, list is partial",
            "WARN".yellow().bold()
        );
    }

    if !report.skipped.is_empty() {
        println!(
            "\n{} ({})",
            "Skipped records".yellow().bold(),
            report.skipped.len()
        );
        for skipped in &report.skipped {
            println!("  {}", skipped.reason);
        }
    }

    println!("\nExported: {}", report.output.display());
    if let Some(path) = &report.render_path {
        println!("Graph:    {}", path.display());
    }
    if let Some(rendered) = &report.rendered {
        println!();
        print!("{}", rendered);
    }
}
