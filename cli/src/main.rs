//! brandoc CLI - corporate template audit and conversion for DOCX files.

use brandoc::{AuditReport, ConvertOptions};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Corporate-template compliance tooling for DOCX documents
#[derive(Parser)]
#[command(
    name = "brandoc",
    version,
    about = "Audit and convert DOCX files against the corporate template",
    long_about = "brandoc - corporate template tooling for Word documents.\n\n\
                  Audit flags formatting that violates the template rules with\n\
                  yellow highlights; convert restyles a document's body into the\n\
                  template while keeping its cover and back pages intact."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a document against the template rules
    Audit {
        /// Input file path
        input: PathBuf,

        /// Output file path for the highlighted copy
        output: PathBuf,

        /// Print the violation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Restyle a document's body into the template
    Convert {
        /// Input file path
        input: PathBuf,

        /// Output file path
        output: PathBuf,

        /// Cover title (default: the input document's own title)
        #[arg(short, long)]
        title: Option<String>,

        /// Template package path
        #[arg(long, default_value = brandoc::DEFAULT_TEMPLATE_PATH)]
        template: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Audit {
            input,
            output,
            json,
        } => {
            let pb = create_spinner("Auditing document...");
            let report = brandoc::audit_file(&input, &output)?;
            pb.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
                println!(
                    "{} Highlighted copy written to {}",
                    "✓".green().bold(),
                    output.display()
                );
            }
        }

        Commands::Convert {
            input,
            output,
            title,
            template,
        } => {
            let pb = create_spinner("Converting document...");
            let options = ConvertOptions {
                title,
                template: Some(template),
            };
            brandoc::convert_file(&input, &output, &options)?;
            pb.finish_and_clear();

            println!(
                "{} Converted document written to {}",
                "✓".green().bold(),
                output.display()
            );
        }
    }

    Ok(())
}

fn print_report(report: &AuditReport) {
    if report.is_clean() {
        println!(
            "{} No violations in {} paragraph(s)",
            "✓".green().bold(),
            report.paragraphs_checked
        );
        return;
    }

    println!("{}", report.summary().yellow().bold());
    for violation in &report.violations {
        let text = if violation.text.is_empty() {
            "(empty paragraph)".to_string()
        } else {
            violation.text.clone()
        };
        println!(
            "  {} {}: expected {}, found {}",
            format!("[{}]", violation.rule.name()).red(),
            text,
            violation.expected.green(),
            violation.observed.red()
        );
    }

    println!();
    for (rule, count) in report.counts_by_rule() {
        println!("  {:>4}  {}", count, rule.name());
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
