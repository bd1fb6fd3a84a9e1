//! Resume anonymizer CLI.
//!
//! Anonymizes a batch of PDF and DOCX resumes into an output directory, and
//! offers a few inspection subcommands for checking what the detectors see.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use resume_redactor::redaction::{output_stem, RedactionRoute};
use resume_redactor::{
    normalize_name, DocumentFormat, RedactionService, RedactorConfig, SignalDetector,
};

/// Resume Anonymizer
///
/// Removes contact details and personal information from resumes.
/// By default, anonymizes every input into the output directory.
#[derive(Parser)]
#[command(name = "resume-redactor")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input resume (.pdf or .docx); can be specified multiple times
    #[arg(short, long, value_name = "FILE")]
    input: Vec<PathBuf>,

    /// Directory for anonymized files
    #[arg(short, long, value_name = "DIR", default_value = "outputs")]
    output_dir: PathBuf,

    /// JSON configuration with thresholds and keyword lists
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a PDF or DOCX (for debugging and verification)
    Extract {
        /// Input file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output text file (optional, defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the candidate name found in a resume
    Name {
        /// Input file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },

    /// Classify a line of text and print the detected signals
    Signals {
        /// Text to classify
        text: String,
    },
}

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose {
        "resume_redactor=debug"
    } else {
        "resume_redactor=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")
}

fn load_config(path: Option<&Path>) -> Result<RedactorConfig> {
    match path {
        Some(path) => RedactorConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(RedactorConfig::default()),
    }
}

/// Command handler with dependency injection.
struct RedactionHandler {
    service: RedactionService,
    config: RedactorConfig,
    verbose: bool,
}

impl RedactionHandler {
    fn new(config: RedactorConfig, verbose: bool) -> Result<Self> {
        let service =
            RedactionService::new(config.clone()).context("Failed to build redactors")?;
        Ok(Self {
            service,
            config,
            verbose,
        })
    }

    /// Anonymizes every input into `output_dir`.
    fn anonymize(&self, inputs: &[PathBuf], output_dir: &Path) -> Result<()> {
        if inputs.is_empty() {
            anyhow::bail!("No input files specified. Use --input FILE (repeatable).");
        }

        if self.verbose {
            println!("Inputs: {} document(s)", inputs.len());
            println!("Output: {}", output_dir.display());
        }

        let batch = self.service.redact_batch(inputs, output_dir);

        for report in &batch.succeeded {
            let route = match &report.route {
                RedactionRoute::Direct => String::new(),
                RedactionRoute::Fallback(reason) => format!(" (fallback: {reason})"),
            };
            println!(
                "✓ {} → {}{}",
                report.input.display(),
                report.output.display(),
                route
            );
            if self.verbose {
                println!("  Units processed: {}", report.units_processed);
                println!("  Units modified:  {}", report.units_modified);
                println!("  Regions redacted: {}", report.regions_redacted);
                println!("  Content type: {}", report.format.content_type());
            }
        }
        for (input, err) in &batch.failed {
            eprintln!("✗ {}: {}", input.display(), err);
        }

        if !batch.is_success() {
            anyhow::bail!(
                "{} of {} document(s) failed",
                batch.failed.len(),
                batch.total()
            );
        }
        Ok(())
    }

    /// Extracts text from a PDF or DOCX.
    fn extract(&self, input: &Path, output: Option<&Path>) -> Result<()> {
        if !input.exists() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }

        let format = DocumentFormat::from_path(input)?;
        let text = match format {
            DocumentFormat::Pdf => resume_redactor::pdf::extract_text(input),
            DocumentFormat::Docx => resume_redactor::docx::extract_text(input),
        }
        .with_context(|| "Text extraction failed")?;

        if let Some(output_path) = output {
            std::fs::write(output_path, &text)
                .with_context(|| format!("Failed to write to {}", output_path.display()))?;
            println!(
                "✓ Extracted {} characters → {}",
                text.chars().count(),
                output_path.display()
            );
        } else {
            println!("{}", text);
        }

        Ok(())
    }

    /// Prints the raw and normalized candidate name.
    fn name(&self, input: &Path) -> Result<()> {
        if !input.exists() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }
        DocumentFormat::from_path(input)?;

        let candidate = self.service.extract_candidate_name(input);
        match &candidate {
            Some(raw) => {
                println!("Candidate:  {}", raw);
                match normalize_name(raw) {
                    Some(token) => println!("Normalized: {}", token),
                    None => println!("Normalized: (none)"),
                }
            }
            None => println!("⚠ No candidate name found"),
        }
        println!("Output stem: {}", output_stem(input, candidate.as_deref()));
        Ok(())
    }

    /// Prints the signals detected in `text`.
    fn signals(&self, text: &str) -> Result<()> {
        let detector = SignalDetector::new(self.config.lexicon.clone())
            .context("Failed to build signal detector")?;
        let signals = detector.classify(text);
        println!("{}", signals);
        if self.verbose {
            println!("  Deletes line: {}", signals.warrants_deletion());
            println!("  Block score:  {}", signals.block_score());
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = load_config(cli.config.as_deref())?;
    let handler = RedactionHandler::new(config, cli.verbose)?;

    match &cli.command {
        Some(Commands::Extract { input, output }) => {
            handler.extract(input, output.as_deref())?;
        }
        Some(Commands::Name { input }) => {
            handler.name(input)?;
        }
        Some(Commands::Signals { text }) => {
            handler.signals(text)?;
        }
        None => {
            handler.anonymize(&cli.input, &cli.output_dir)?;
        }
    }

    Ok(())
}
