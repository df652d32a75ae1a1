//! pdfsift CLI - reconstruct text, images and tables from PDF primitive snapshots

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfsift::{
    extract_file, render, AlignmentPass, Document, ExtractOptions, GridMode, JsonFormat,
    PageSelection, StrategyKind,
};

#[derive(Parser)]
#[command(name = "pdfsift")]
#[command(version)]
#[command(about = "Reconstruct text, images and tables from PDF primitive snapshots", long_about = None)]
struct Cli {
    /// Input snapshot file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract everything (JSON, text, tables, images) into a directory
    Extract {
        /// Input snapshot file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Write the extracted document as JSON
    Json {
        /// Input snapshot file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Write the extracted tables as CSV
    Tables {
        /// Input snapshot file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Show document information
    Info {
        /// Input snapshot file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Extraction settings shared by the subcommands.
#[derive(clap::Args, Clone)]
struct Tuning {
    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// How grid-extractor profiles combine
    #[arg(long, value_enum, default_value = "first")]
    grid_mode: GridModeArg,

    /// When the text-alignment strategy runs
    #[arg(long, value_enum, default_value = "always")]
    alignment: AlignmentArg,

    /// Table strategy priority (e.g., "bordered,grid,text")
    #[arg(long)]
    strategies: Option<String>,

    /// Minimum fill ratio for accepted tables
    #[arg(long, env = "PDFSIFT_FILL_RATIO")]
    fill_ratio: Option<f32>,

    /// Skip image extraction
    #[arg(long)]
    no_images: bool,

    /// Skip table extraction
    #[arg(long)]
    no_tables: bool,

    /// Process pages one at a time
    #[arg(long)]
    sequential: bool,
}

impl Tuning {
    fn to_options(&self) -> Result<ExtractOptions, String> {
        let pages = match self.pages.as_deref() {
            Some(p) => PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?,
            None => PageSelection::All,
        };

        let mut options = ExtractOptions::new()
            .with_pages(pages)
            .with_grid_mode(self.grid_mode.into())
            .with_alignment_pass(self.alignment.into())
            .with_images(!self.no_images)
            .with_tables(!self.no_tables)
            .with_parallel(!self.sequential);
        if let Some(list) = self.strategies.as_deref() {
            let order = list
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .map(StrategyKind::parse)
                .collect::<Result<Vec<_>, _>>()?;
            if order.is_empty() {
                return Err("No table strategies given".to_string());
            }
            options = options.with_strategy_order(order);
        }
        if let Some(ratio) = self.fill_ratio {
            options = options.with_fill_ratio(ratio);
        }
        Ok(options)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            pages: None,
            grid_mode: GridModeArg::First,
            alignment: AlignmentArg::Always,
            strategies: None,
            fill_ratio: None,
            no_images: false,
            no_tables: false,
            sequential: false,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum GridModeArg {
    /// Stop at the first profile that finds tables
    First,
    /// Run every profile and merge the results
    All,
}

impl From<GridModeArg> for GridMode {
    fn from(mode: GridModeArg) -> Self {
        match mode {
            GridModeArg::First => GridMode::FirstSuccess,
            GridModeArg::All => GridMode::AccumulateAll,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum AlignmentArg {
    /// On every page
    Always,
    /// Only on pages without ruling lines
    WhenNoGrid,
}

impl From<AlignmentArg> for AlignmentPass {
    fn from(arg: AlignmentArg) -> Self {
        match arg {
            AlignmentArg::Always => AlignmentPass::Always,
            AlignmentArg::WhenNoGrid => AlignmentPass::WhenNoGrid,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Extract {
            input,
            output,
            tuning,
        }) => cmd_extract(&input, output.as_deref(), &tuning),
        Some(Commands::Json {
            input,
            output,
            compact,
            tuning,
        }) => cmd_json(&input, output.as_deref(), compact, &tuning),
        Some(Commands::Tables {
            input,
            output,
            tuning,
        }) => cmd_tables(&input, output.as_deref(), &tuning),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: extract if input is provided
            if let Some(input) = cli.input {
                cmd_extract(&input, cli.output.as_deref(), &Tuning::default())
            } else {
                println!("{}", "Usage: pdfsift <FILE> [OUTPUT]".yellow());
                println!("       pdfsift --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// `report.snapshot.json` -> `report.snapshot_output`
fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    PathBuf::from(format!("{}_output", stem))
}

/// Run an extraction, turning an unreadable input into a CLI error.
fn run_extraction(
    input: &Path,
    image_dir: &Path,
    options: &ExtractOptions,
) -> Result<Document, Box<dyn std::error::Error>> {
    let doc = extract_file(input, image_dir, options);
    if doc.is_open_failure() {
        let message = doc
            .errors
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_default();
        return Err(format!("Cannot open {}: {}", input.display(), message).into());
    }
    Ok(doc)
}

fn report_errors(doc: &Document) {
    if doc.errors.is_empty() {
        return;
    }
    eprintln!(
        "{} {} recoverable errors",
        "Warning:".yellow().bold(),
        doc.errors.len()
    );
    for error in &doc.errors {
        eprintln!("  {} {}", "-".dimmed(), error);
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    tuning: &Tuning,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = tuning.to_options()?;
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| default_output_dir(input));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(4);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Extracting...");
    let doc = run_extraction(input, &output_dir.join("images"), &options)?;
    pb.inc(1);

    pb.set_message("Writing JSON...");
    let json = render::to_json(&doc, JsonFormat::Pretty)?;
    fs::write(output_dir.join("content.json"), &json)?;
    pb.inc(1);

    pb.set_message("Writing text...");
    fs::write(output_dir.join("extract.txt"), &doc.text)?;
    pb.inc(1);

    pb.set_message("Writing tables...");
    fs::write(output_dir.join("tables.csv"), render::tables_to_csv(&doc.tables))?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    println!("  {} content.json", "├─".dimmed());
    println!("  {} extract.txt", "├─".dimmed());
    println!("  {} tables.csv ({} tables)", "├─".dimmed(), doc.tables.len());
    println!("  {} images/ ({} images)", "└─".dimmed(), doc.images.len());

    report_errors(&doc);
    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    tuning: &Tuning,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = tuning.to_options()?;
    let image_dir = output
        .and_then(Path::parent)
        .map(|p| p.join("images"))
        .unwrap_or_else(|| PathBuf::from("images"));
    let doc = run_extraction(input, &image_dir, &options)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = render::to_json(&doc, format)?;
    write_or_print(output, &json)?;
    report_errors(&doc);
    Ok(())
}

fn cmd_tables(
    input: &Path,
    output: Option<&Path>,
    tuning: &Tuning,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = tuning.to_options()?.with_images(false);
    let doc = run_extraction(input, Path::new("."), &options)?;

    if doc.tables.is_empty() {
        eprintln!("{}", "No tables found".yellow());
        report_errors(&doc);
        return Ok(());
    }

    write_or_print(output, &render::tables_to_csv(&doc.tables))?;
    report_errors(&doc);
    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Info never writes images
    let options = ExtractOptions::new().with_images(false);
    let doc = run_extraction(input, Path::new("."), &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc.metadata)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref source) = doc.metadata.source {
        println!("{}: {}", "Source".bold(), source);
    }
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);
    if let Some(page) = doc.pages.first() {
        let (w, h) = page.dimensions();
        println!("{}: {:.0} x {:.0} pt", "Page size".bold(), w, h);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = doc.plain_text();
    println!("{}: {}", "Spans".bold(), doc.positioned_text.len());
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), doc.metadata.text_length);
    println!("{}: {}", "Tables".bold(), doc.metadata.table_count);
    for (method, count) in &doc.metadata.tables_by_method {
        println!("  {} {}: {}", "-".dimmed(), method, count);
    }
    println!("{}: {}", "Errors".bold(), doc.metadata.error_count);
    if let Some(ms) = doc.metadata.duration_ms() {
        println!("{}: {} ms", "Elapsed".bold(), ms);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfsift".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Text, image and table reconstruction from PDF primitives");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfsift::{BBox, DocumentSnapshot, PageSnapshot, Span};

    #[test]
    fn test_default_output_dir() {
        assert_eq!(
            default_output_dir(Path::new("in/report.json")),
            PathBuf::from("report_output")
        );
    }

    #[test]
    fn test_tuning_to_options() {
        let tuning = Tuning {
            pages: Some("2-3".to_string()),
            grid_mode: GridModeArg::All,
            no_images: true,
            sequential: true,
            ..Tuning::default()
        };
        let options = tuning.to_options().unwrap();
        assert_eq!(options.pages, PageSelection::Range(2..=3));
        assert_eq!(options.grid_mode, GridMode::AccumulateAll);
        assert!(!options.extract_images);
        assert!(!options.parallel);

        let bad = Tuning {
            pages: Some("x".to_string()),
            ..Tuning::default()
        };
        assert!(bad.to_options().is_err());
    }

    #[test]
    fn test_tuning_strategy_order() {
        let tuning = Tuning {
            strategies: Some("text, grid".to_string()),
            ..Tuning::default()
        };
        let options = tuning.to_options().unwrap();
        assert_eq!(
            options.strategy_order,
            vec![StrategyKind::TextAlignment, StrategyKind::Grid]
        );

        assert_eq!(
            Tuning::default().to_options().unwrap().strategy_order,
            StrategyKind::default_order()
        );

        for bad in ["grid,ocr", " , "] {
            let tuning = Tuning {
                strategies: Some(bad.to_string()),
                ..Tuning::default()
            };
            assert!(tuning.to_options().is_err());
        }
    }

    #[test]
    fn test_cmd_extract_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.json");
        let snapshot = DocumentSnapshot::new().with_page(
            PageSnapshot::new(1).with_span(Span::new("Hello", BBox::new(10.0, 10.0, 50.0, 20.0))),
        );
        fs::write(&input, snapshot.to_json().unwrap()).unwrap();

        let out = dir.path().join("out");
        cmd_extract(&input, Some(&out), &Tuning::default()).unwrap();
        assert!(out.join("content.json").exists());
        let text = fs::read_to_string(out.join("extract.txt")).unwrap();
        assert!(text.contains("[Page 1]\nHello"));
    }

    #[test]
    fn test_missing_input_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_extraction(
            &dir.path().join("nope.json"),
            dir.path(),
            &ExtractOptions::default(),
        );
        assert!(result.is_err());
    }
}
