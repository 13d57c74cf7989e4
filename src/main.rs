//! CLI for bib2rst - Generate a reStructuredText publications page from BibTeX files.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use bib2rst::output::OutputError;
use bib2rst::{load_sections, render_body, render_widgets, splice, write_atomic};

/// Placeholder token the template must contain exactly once.
const PLACEHOLDER: &str = "<TAG>";

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Generate a reStructuredText publications page from BibTeX files
#[derive(Parser)]
#[command(name = "bib2rst")]
#[command(version)]
#[command(after_help = "\
The bibtex directory holds one full-collection file plus per-section files
named 'NN-Section Title.bib'. The defaults make a bare invocation work from
a project root:

  bib2rst
  bib2rst --bibtex-dir refs --full-bib 'All Papers.bib' -o publications.rst")]
struct Cli {
    /// Directory containing the full collection and per-section .bib files
    #[arg(long, default_value = "bibtex")]
    bibtex_dir: PathBuf,

    /// File name of the full collection inside the bibtex directory
    #[arg(long, default_value = "Full.bib")]
    full_bib: String,

    /// Template file containing the <TAG> placeholder
    #[arg(long, default_value = "research_template.rst")]
    template: PathBuf,

    /// Output file (overwritten if present)
    #[arg(short, long, default_value = "research.rst")]
    output: PathBuf,
}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

enum AppError {
    /// Bibtex directory, full collection, or a section file is missing or malformed
    Input(String),
    /// Template file missing or without the placeholder token
    Template(String),
    /// An entry cannot be rendered (missing required field)
    Entry(String),
    /// A section references a cite key absent from the full collection
    ReferenceNotFound(String),
    /// Cannot write the output file
    OutputFile(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Input(msg) => {
                write!(
                    f,
                    "{}\n  hint: the bibtex directory must contain the full-collection file plus 'NN-Section Title.bib' section files",
                    msg
                )
            }
            AppError::Template(msg) => {
                write!(
                    f,
                    "{}\n  hint: the template is a reStructuredText file containing the literal token {}",
                    msg, PLACEHOLDER
                )
            }
            AppError::Entry(msg) => {
                write!(f, "{}", msg)
            }
            AppError::ReferenceNotFound(msg) => {
                write!(
                    f,
                    "{}\n  hint: every cite key used by a section file must appear in the full collection",
                    msg
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    generate(&cli.bibtex_dir, &cli.full_bib, &cli.template, &cli.output)
}

/// Runs the whole pipeline once.
fn generate(
    bibtex_dir: &Path,
    full_bib: &str,
    template_path: &Path,
    output_path: &Path,
) -> Result<(), AppError> {
    // 1. Load the full collection and every section file
    let (collection, sections) =
        load_sections(bibtex_dir, full_bib).map_err(|e| AppError::Input(e.to_string()))?;

    // 2. Render the per-section body
    let body = render_body(&sections).map_err(|e| AppError::Entry(e.to_string()))?;

    // 3. Render one toggle widget per formatted entry
    let widgets =
        render_widgets(&collection, &sections).map_err(|e| AppError::ReferenceNotFound(e.to_string()))?;

    // 4. Read the template
    let template = fs::read_to_string(template_path).map_err(|e| {
        AppError::Template(format!("'{}': {}", template_path.display(), e))
    })?;

    // 5. Splice and write atomically
    let document = splice(&template, PLACEHOLDER, &body, &widgets).map_err(|e| match e {
        OutputError::PlaceholderMissing(_) => {
            AppError::Template(format!("'{}': {}", template_path.display(), e))
        }
        other => AppError::OutputFile(other.to_string()),
    })?;
    write_atomic(output_path, &document).map_err(|e| {
        AppError::OutputFile(format!("'{}': {}", output_path.display(), e))
    })?;

    let entry_count: usize = sections.iter().map(|s| s.entries.len()).sum();
    eprintln!(
        "rendered {} entries across {} section(s), wrote {}",
        entry_count,
        sections.len(),
        output_path.display()
    );

    Ok(())
}
