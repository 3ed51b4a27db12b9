//! Template inspection command line
//!
//! Works directly on template files, without the catalog: lists the
//! placeholders a template uses, scaffolds a form schema from them,
//! writes the batch fill-in workbook, and summarizes document structure.
//!
//! # Usage
//!
//! ```bash
//! # List {{variable}} placeholders in document order
//! lexdraft variables contract.docx
//!
//! # Scaffold a form schema as JSON
//! lexdraft schema contract.docx
//!
//! # Write the spreadsheet users fill in for batch runs
//! lexdraft batch-template contract.docx -o contract_batch.xlsx
//!
//! # Show body, header and footer structure
//! lexdraft inspect contract.docx
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use lexdraft_docx::StructuredDocument;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lexdraft")]
#[command(version, about = "Inspect Word templates and prepare batch inputs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List {{variable}} placeholders in document order
    Variables {
        /// Template file (.docx)
        file: PathBuf,

        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Scaffold a form schema from the template's placeholders
    Schema {
        /// Template file (.docx)
        file: PathBuf,
    },

    /// Write the fill-in workbook for batch generation
    BatchTemplate {
        /// Template file (.docx)
        file: PathBuf,

        /// Output workbook path
        #[arg(short, long, default_value = "batch_template.xlsx")]
        output: PathBuf,
    },

    /// Summarize the structure of a document package
    Inspect {
        /// Document file (.docx)
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Variables { file, json } => variables(&file, json),
        Commands::Schema { file } => schema(&file),
        Commands::BatchTemplate { file, output } => batch_template(&file, &output),
        Commands::Inspect { file } => inspect(&file),
    }
}

/// Reads a template and extracts its placeholders. Unlike the catalog
/// paths, the CLI surfaces unreadable files instead of returning an empty
/// list.
fn read_variables(file: &Path) -> anyhow::Result<Vec<String>> {
    let document = lexdraft_docx::read_path(file)
        .with_context(|| format!("could not read {}", file.display()))?;
    Ok(lexdraft_docx::extract_variables(&document))
}

fn variables(file: &Path, json: bool) -> anyhow::Result<()> {
    let variables = read_variables(file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&variables)?);
    } else if variables.is_empty() {
        println!("no placeholders found");
    } else {
        for variable in &variables {
            println!("{variable}");
        }
    }
    Ok(())
}

fn schema(file: &Path) -> anyhow::Result<()> {
    let variables = read_variables(file)?;
    let fields = lexdraft_engine::scaffold_schema(&variables);
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}

fn batch_template(file: &Path, output: &Path) -> anyhow::Result<()> {
    let variables = read_variables(file)?;
    let bytes = lexdraft_engine::batch::template_workbook(&variables)?;
    std::fs::write(output, bytes)
        .with_context(|| format!("could not write {}", output.display()))?;
    println!(
        "wrote {} with {} variable column(s)",
        output.display(),
        variables.len()
    );
    Ok(())
}

fn inspect(file: &Path) -> anyhow::Result<()> {
    let document = lexdraft_docx::read_path(file)
        .with_context(|| format!("could not read {}", file.display()))?;

    let (paragraphs, tables) = StructuredDocument::count_blocks(&document.body);
    println!("body: {paragraphs} paragraph(s), {tables} table(s)");
    for header in &document.headers {
        let (paragraphs, tables) = StructuredDocument::count_blocks(&header.blocks);
        println!(
            "header [{}]: {paragraphs} paragraph(s), {tables} table(s)",
            header.variant
        );
    }
    for footer in &document.footers {
        let (paragraphs, tables) = StructuredDocument::count_blocks(&footer.blocks);
        println!(
            "footer [{}]: {paragraphs} paragraph(s), {tables} table(s)",
            footer.variant
        );
    }

    let variables = lexdraft_docx::extract_variables(&document);
    if variables.is_empty() {
        println!("variables: none");
    } else {
        println!("variables: {}", variables.join(", "));
    }
    Ok(())
}
