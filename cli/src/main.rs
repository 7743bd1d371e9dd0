//! unscan CLI - text and table extraction from OCR token streams

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unscan::{
    detect_format_from_path, render, CleanupPreset, Extraction, JsonFormat, OutputWriter,
    PageSelection, PageStatus, PipelineOptions, PipelineOrchestrator, ProgressObserver,
    ReaderRegistry, TextOptions,
};

#[derive(Parser)]
#[command(name = "unscan")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract text and tables from OCR token streams", long_about = None)]
struct Cli {
    /// Input file (OCR token dump)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Text cleanup preset
    #[arg(long, value_enum)]
    cleanup: Option<CleanupLevel>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the text file and one CSV per table into a directory
    Extract {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Text cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,

        /// Also write a combined text file with every table
        #[arg(long)]
        combined: bool,

        /// Also write a JSON report
        #[arg(long)]
        report: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print or save the document text
    Text {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Text cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print or save the reconstructed tables as CSV
    Tables {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory (stdout if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print or save the full extraction report as JSON
    Json {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Show document information and statistics
    Info {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Show version information
    Version,
}

/// Options shared by every command that runs the pipeline.
#[derive(Args, Clone, Default)]
struct PipelineArgs {
    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Pages processed at once (0 = one per CPU)
    #[arg(short = 'j', long, env = "UNSCAN_CONCURRENCY", default_value = "0")]
    concurrency: usize,

    /// Process pages one after another
    #[arg(long)]
    sequential: bool,

    /// Minimum number of rows for a table
    #[arg(long, value_name = "ROWS")]
    min_table_rows: Option<usize>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

impl PipelineArgs {
    fn options(&self) -> Result<PipelineOptions, Box<dyn std::error::Error>> {
        let page_selection = match self.pages.as_deref() {
            Some(p) => PageSelection::parse(p)?,
            None => PageSelection::All,
        };

        let mut options = PipelineOptions::new()
            .with_pages(page_selection)
            .with_concurrency(self.concurrency);
        if self.sequential {
            options = options.sequential();
        }
        if let Some(rows) = self.min_table_rows {
            options.layout = options.layout.with_min_table_rows(rows);
        }
        Ok(options)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Minimal cleanup (Unicode normalization and whitespace)
    Minimal,
    /// Standard cleanup (default)
    Standard,
    /// Aggressive cleanup (also drops page numbers)
    Aggressive,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
            CleanupLevel::Aggressive => CleanupPreset::Aggressive,
        }
    }
}

fn text_options(cleanup: Option<CleanupLevel>) -> TextOptions {
    match cleanup {
        Some(level) => TextOptions::new().with_cleanup_preset(level.into()),
        None => TextOptions::new(),
    }
}

/// Advances a progress bar as pages settle.
struct PageProgress {
    bar: ProgressBar,
}

impl ProgressObserver for PageProgress {
    fn page_finished(&self, page: usize, status: PageStatus) {
        if status != PageStatus::Completed {
            self.bar
                .println(format!("{} page {} {:?}", "!".yellow(), page + 1, status));
        }
        self.bar.inc(1);
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Extract {
            input,
            output,
            cleanup,
            combined,
            report,
            pipeline,
        }) => cmd_extract(&input, output.as_deref(), cleanup, combined, report, &pipeline),
        Some(Commands::Text {
            input,
            output,
            cleanup,
            pipeline,
        }) => cmd_text(&input, output.as_deref(), cleanup, &pipeline),
        Some(Commands::Tables {
            input,
            output,
            pipeline,
        }) => cmd_tables(&input, output.as_deref(), &pipeline),
        Some(Commands::Json {
            input,
            output,
            compact,
            pipeline,
        }) => cmd_json(&input, output.as_deref(), compact, &pipeline),
        Some(Commands::Info {
            input,
            json,
            pipeline,
        }) => cmd_info(&input, json, &pipeline),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: extract if input is provided
            if let Some(input) = cli.input {
                cmd_extract(
                    &input,
                    cli.output.as_deref(),
                    cli.cleanup,
                    false,
                    false,
                    &PipelineArgs::default(),
                )
            } else {
                println!("{}", "Usage: unscan <FILE> [OUTPUT]".yellow());
                println!("       unscan --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Read the input and run every selected page through the pipeline.
fn run_pipeline(
    input: &Path,
    args: &PipelineArgs,
) -> Result<Extraction, Box<dyn std::error::Error>> {
    let options = args.options()?;
    let pages = ReaderRegistry::with_defaults().read_path(input)?;
    let selected = pages
        .iter()
        .filter(|p| options.pages.includes_index(p.page))
        .count();
    log::info!("{}: {} pages, {} selected", input.display(), pages.len(), selected);

    let mut orchestrator = PipelineOrchestrator::with_options(options);
    let bar = if args.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(selected as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} pages {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        bar
    };
    orchestrator = orchestrator.with_observer(Arc::new(PageProgress { bar: bar.clone() }));

    let extraction = orchestrator.process(pages)?;
    bar.finish_and_clear();

    for diagnostic in extraction.diagnostics.iter().filter(|d| d.is_problem()) {
        eprintln!("{} {}", "Warning:".yellow().bold(), diagnostic);
    }

    Ok(extraction)
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    cleanup: Option<CleanupLevel>,
    combined: bool,
    report: bool,
    pipeline: &PipelineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(format!("{}_output", stem)));

    let extraction = run_pipeline(input, pipeline)?;

    let mut writer = OutputWriter::new(&output_dir)
        .with_stem(&stem)
        .with_text_options(text_options(cleanup))
        .with_combined(combined);
    if report {
        writer = writer.with_report(JsonFormat::Pretty);
    }
    let written = writer.write(&extraction)?;

    println!(
        "{} {} tables, {} words",
        "Done!".green().bold(),
        extraction.table_count(),
        extraction.stats.word_count
    );
    println!("\n{} {}", "Output files:".green().bold(), output_dir.display());
    let paths = written.all();
    for (i, path) in paths.iter().enumerate() {
        let branch = if i + 1 == paths.len() { "└─" } else { "├─" };
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        println!("  {} {}", branch.dimmed(), name);
    }

    Ok(())
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    cleanup: Option<CleanupLevel>,
    pipeline: &PipelineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let extraction = run_pipeline(input, pipeline)?;
    let text = render::to_text(&extraction, &text_options(cleanup))?;

    if let Some(path) = output {
        fs::write(path, &text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn cmd_tables(
    input: &Path,
    output: Option<&Path>,
    pipeline: &PipelineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let extraction = run_pipeline(input, pipeline)?;

    if let Some(dir) = output {
        let written = OutputWriter::new(dir).with_text(false).write(&extraction)?;
        for path in &written.tables {
            println!("{} {}", "Saved".green(), path.display());
        }
        println!(
            "\n{} {} tables extracted",
            "Done!".green().bold(),
            written.tables.len()
        );
        return Ok(());
    }

    for table in &extraction.tables {
        let title = table.title();
        let marker = if table.low_confidence {
            format!(" (low confidence {:.2})", table.confidence)
        } else {
            String::new()
        };
        println!("{}{}", title.cyan().bold(), marker.yellow());
        print!("{}", render::table_to_csv(table)?);
        println!();
    }

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    pipeline: &PipelineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let extraction = run_pipeline(input, pipeline)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = render::to_json(&extraction, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(
    input: &Path,
    json: bool,
    pipeline: &PipelineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = detect_format_from_path(input)?;
    let extraction = run_pipeline(input, pipeline)?;
    let stats = &extraction.stats;

    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", "Pages".bold(), stats.pages_total);
    println!("{}: {}", "Processed".bold(), stats.pages_processed);
    if stats.pages_skipped > 0 {
        println!("{}: {}", "Not selected".bold(), stats.pages_skipped);
    }
    if stats.pages_failed > 0 {
        println!("{}: {}", "Failed".bold(), stats.pages_failed.to_string().red());
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Tokens".bold(), stats.token_count);
    println!("{}: {}", "Regions".bold(), stats.region_count);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!(
        "{}: {}",
        "Low-confidence tables".bold(),
        stats.low_confidence_table_count
    );
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);

    for table in &extraction.tables {
        println!(
            "  {} {} ({}x{}, confidence {:.2})",
            "•".dimmed(),
            table.title(),
            table.row_count(),
            table.column_count(),
            table.confidence
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unscan".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Text and table extraction from OCR token streams");
    println!();
    println!("License: MIT");
}
