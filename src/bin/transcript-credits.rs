//! CLI binary for transcript-credits.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use transcript_credits::{
    process_file, write_csv_file, CancelToken, ClassifierProfile, ColumnKeywords, CourseRecord,
    DocumentKind, ExtractionConfig, ExtractionProgressCallback, PipelineOutput, ProgressCallback,
    RecordList,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar over the PDF's pages, first for table
/// detection and again for OCR if the fallback runs.
struct CliProgressCallback {
    bar: ProgressBar,
    page_errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until the page count is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening transcript…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize, prefix: &'static str) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(progress_style);
        self.bar.set_prefix(prefix);
        self.bar.reset_eta();
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_document_start(&self, total_pages: usize) {
        if total_pages == 0 {
            // Word-processor documents have no pages to count.
            self.bar.set_prefix("Reading");
            self.bar.set_message("tables…");
            return;
        }
        self.activate_bar(total_pages, "Tables");
    }

    fn on_page_tables(&self, page_num: usize, total_pages: usize, found: usize) {
        if found > 0 {
            self.bar.println(format!(
                "  {} Page {:>3}/{:<3}  {}",
                green("✓"),
                page_num,
                total_pages,
                dim(&format!("{found} table(s)")),
            ));
        }
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        self.page_errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = match error.char_indices().nth(79) {
            Some((idx, _)) => format!("{}\u{2026}", &error[..idx]),
            None => error.to_string(),
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total_pages,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_ocr_start(&self, total_pages: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold("No grades table found, falling back to OCR…")
        ));
        self.activate_bar(total_pages, "OCR");
    }

    fn on_ocr_page_complete(&self, page_num: usize, total_pages: usize, lines: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total_pages,
            dim(&format!("{lines:>4} lines")),
        ));
        self.bar.inc(1);
    }

    fn on_complete(&self, passed: usize, failed: usize, _total_credits: f64) {
        self.bar.finish_and_clear();
        let errors = self.page_errors.load(Ordering::SeqCst);
        if errors == 0 {
            eprintln!(
                "{} {} passed, {} failed",
                green("✔"),
                bold(&passed.to_string()),
                failed
            );
        } else {
            eprintln!(
                "{} {} passed, {} failed  ({} unreadable pages)",
                cyan("⚠"),
                bold(&passed.to_string()),
                failed,
                red(&errors.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Total the credits on a transcript
  transcript-credits transcript.pdf

  # Compare against a 132-credit graduation requirement
  transcript-credits --target 132 transcript.pdf

  # Export both lists as CSV (UTF-8 with BOM, opens cleanly in spreadsheets)
  transcript-credits transcript.docx --passed-csv passed.csv --failed-csv failed.csv

  # Require year and semester columns too, and skip OCR
  transcript-credits --strict --no-ocr transcript.pdf

  # Custom header vocabulary
  transcript-credits --keywords keywords.json transcript.pdf

  # JSON output
  transcript-credits --json transcript.pdf > result.json

KEYWORDS FILE:
  JSON object with any of the families credit, subject, grade, year,
  semester. Missing families keep their defaults:
    { "credit": ["學分", "credits"], "grade": ["成績", "mark"] }

ENVIRONMENT VARIABLES:
  Every flag can be set through TRANSCRIPT_<FLAG>, e.g. TRANSCRIPT_TARGET=132.
  RUST_LOG                Override the log filter (e.g. transcript_credits=debug)

SETUP:
  PDF input needs the pdfium shared library. It is looked up in the
  current directory, then on the system library path; --pdfium-lib points
  at a specific file or directory. OCR needs a build with the `tesseract`
  feature and the chi_tra/eng traineddata installed.
"#;

/// Total the credits earned on an academic transcript.
#[derive(Parser, Debug)]
#[command(
    name = "transcript-credits",
    version,
    about = "Extract course records from a transcript and total the passed credits",
    long_about = "Extract course records from a transcript PDF or .docx and total the credits \
of passed courses. Tables are found from ruling lines on PDF pages or read natively from \
.docx files; scanned PDFs fall back to OCR.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Transcript file (.pdf or .docx).
    input: PathBuf,

    /// Document kind: pdf or docx. Detected from the file when omitted.
    #[arg(long, env = "TRANSCRIPT_KIND")]
    kind: Option<DocumentKind>,

    /// Credits required; the shortfall against it is reported.
    #[arg(long, env = "TRANSCRIPT_TARGET", default_value_t = 128.0)]
    target: f64,

    /// Write passed courses to this CSV file.
    #[arg(long, env = "TRANSCRIPT_PASSED_CSV")]
    passed_csv: Option<PathBuf>,

    /// Write failed courses to this CSV file.
    #[arg(long, env = "TRANSCRIPT_FAILED_CSV")]
    failed_csv: Option<PathBuf>,

    /// Output structured JSON (PipelineOutput) instead of a listing.
    #[arg(long, env = "TRANSCRIPT_JSON")]
    json: bool,

    /// Ruling lines closer than this (pt) are snapped together.
    #[arg(long, env = "TRANSCRIPT_SNAP_TOLERANCE", default_value_t = 3.0)]
    snap_tolerance: f32,

    /// Collinear segments with gaps up to this (pt) are joined.
    #[arg(long, env = "TRANSCRIPT_JOIN_TOLERANCE", default_value_t = 5.0)]
    join_tolerance: f32,

    /// Ruling lines shorter than this (pt) are ignored.
    #[arg(long, env = "TRANSCRIPT_EDGE_MIN_LENGTH", default_value_t = 3.0)]
    edge_min_length: f32,

    /// Characters within this distance (pt) share a line or word.
    #[arg(long, env = "TRANSCRIPT_TEXT_TOLERANCE", default_value_t = 2.0)]
    text_tolerance: f32,

    /// Distance (pt) at which a horizontal and vertical rule intersect.
    #[arg(long, env = "TRANSCRIPT_INTERSECTION_TOLERANCE", default_value_t = 3.0)]
    intersection_tolerance: f32,

    /// Page upscale factor for OCR rendering (1–6).
    #[arg(long, env = "TRANSCRIPT_OCR_SCALE", default_value_t = 2.0)]
    ocr_scale: f32,

    /// OCR languages, comma separated or repeated.
    #[arg(long = "lang", env = "TRANSCRIPT_LANG", value_delimiter = ',',
          default_values_t = vec!["chi_tra".to_string(), "eng".to_string()])]
    languages: Vec<String>,

    /// Never fall back to OCR.
    #[arg(long, env = "TRANSCRIPT_NO_OCR")]
    no_ocr: bool,

    /// Also require academic-year and semester columns in a grades table.
    #[arg(long, env = "TRANSCRIPT_STRICT")]
    strict: bool,

    /// JSON file with header keyword overrides.
    #[arg(long, env = "TRANSCRIPT_KEYWORDS")]
    keywords: Option<PathBuf>,

    /// pdfium library file or the directory containing it.
    #[arg(long, env = "TRANSCRIPT_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "TRANSCRIPT_PASSWORD")]
    password: Option<String>,

    /// Disable progress bar.
    #[arg(long, env = "TRANSCRIPT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TRANSCRIPT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, env = "TRANSCRIPT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar provides the feedback that matters; library INFO
    // logs would only tear it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let cancel = CancelToken::new();
    let config = build_config(&cli, progress_cb, cancel.clone()).await?;

    // Stop OCR between pages on Ctrl-C and report what was read so far.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{} interrupted, finishing current page…", cyan("⚠"));
            cancel.cancel();
        }
    });

    // ── Run extraction ───────────────────────────────────────────────────
    let output = process_file(&cli.input, cli.kind, config)
        .await
        .with_context(|| format!("Failed to process {}", cli.input.display()))?;

    if let Some(ref path) = cli.passed_csv {
        write_csv_file(&output, RecordList::Passed, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    if let Some(ref path) = cli.failed_csv {
        write_csv_file(&output, RecordList::Failed, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_report(&output, cli.target);
    }

    if !cli.quiet {
        for path in [&cli.passed_csv, &cli.failed_csv].into_iter().flatten() {
            eprintln!("   {} {}", dim("→"), bold(&path.display().to_string()));
        }
    }

    Ok(())
}

fn print_report(output: &PipelineOutput, target: f64) {
    if output.is_empty() {
        println!("{}", dim("No course records found."));
    }

    if !output.passed.is_empty() {
        println!("{}", bold("Passed"));
        for course in &output.passed {
            print_course(course);
        }
    }
    if !output.failed.is_empty() {
        println!("{}", bold("Failed"));
        for course in &output.failed {
            print_course(course);
        }
    }

    println!();
    println!("Total credits:  {}", bold(&output.total_credits.to_string()));
    let shortfall = output.credit_shortfall(target);
    if shortfall > 0.0 {
        println!("Still missing:  {} (target {})", red(&shortfall.to_string()), target);
    } else {
        println!(
            "Target met:     {} (+{})",
            green(&target.to_string()),
            -shortfall
        );
    }
}

fn print_course(course: &CourseRecord) {
    println!(
        "  {:<4} {:<2} {}  {}  {}",
        course.academic_year,
        course.semester,
        course.subject_name,
        course.credit,
        dim(&course.grade_token),
    );
}

/// Map CLI args to `ExtractionConfig`.
async fn build_config(
    cli: &Cli,
    progress: Option<ProgressCallback>,
    cancel: CancelToken,
) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .snap_tolerance(cli.snap_tolerance)
        .join_tolerance(cli.join_tolerance)
        .edge_min_length(cli.edge_min_length)
        .text_tolerance(cli.text_tolerance)
        .intersection_tolerance(cli.intersection_tolerance)
        .ocr_scale(cli.ocr_scale)
        .ocr_languages(&cli.languages)
        .ocr_enabled(!cli.no_ocr)
        .profile(if cli.strict {
            ClassifierProfile::Strict
        } else {
            ClassifierProfile::Standard
        })
        .cancel_token(cancel);

    if let Some(ref path) = cli.keywords {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read keywords from {:?}", path))?;
        let keywords = ColumnKeywords::from_json(&json)
            .with_context(|| format!("Invalid keywords file {:?}", path))?;
        builder = builder.keywords(keywords);
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(path);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
