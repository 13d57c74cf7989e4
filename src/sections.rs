//! Input loading: the bibtex directory, the full collection, and section files.
//!
//! The bibtex directory holds one full-collection file plus per-section files
//! named `NN-Section Title.bib`. Section files are processed in sorted
//! filename order so output is deterministic across runs.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::bibtex::{self, BibtexError, Entry};
use crate::latex;

/// First-line marker of the boilerplate notice some export tools prepend.
const EXPORT_NOTICE_PREFIX: &str = "Automatically generated";

/// Number of boilerplate lines removed when the notice is present.
const EXPORT_NOTICE_LINES: usize = 5;

/// Errors that can occur while loading the bibtex directory.
#[derive(Error, Debug)]
pub enum SectionsError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("full collection file '{0}' not found in the bibtex directory")]
    MissingCollection(PathBuf),

    #[error("section file '{0}' is not named like 'NN-Section Title.bib'")]
    BadFileName(String),

    #[error("in '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: BibtexError,
    },
}

/// A named, ordered group of entries sourced from one section file.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Human-readable title derived from the file name.
    pub title: String,
    /// Entries in the file's natural order.
    pub entries: Vec<Entry>,
}

/// Removes the export-tool notice from the start of `path`, in place.
///
/// When the first line starts with `"Automatically generated"`, the first
/// five lines are dropped and the file is rewritten. Returns whether the
/// notice was removed. A second run over the same file is a no-op, which
/// keeps repeated runs byte-identical.
pub fn strip_export_notice(path: &Path) -> Result<bool, SectionsError> {
    let content = read_file(path)?;

    if !content.starts_with(EXPORT_NOTICE_PREFIX) {
        return Ok(false);
    }

    let remainder: String = content
        .split_inclusive('\n')
        .skip(EXPORT_NOTICE_LINES)
        .collect();
    fs::write(path, remainder).map_err(|source| SectionsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

/// Derives a section title from a file name like `01-Continual Learning.bib`.
///
/// The name is split on the first `-` and the `.bib` suffix is trimmed from
/// the second component.
pub fn section_title(file_name: &str) -> Result<String, SectionsError> {
    let title = file_name
        .splitn(2, '-')
        .nth(1)
        .and_then(|rest| rest.strip_suffix(".bib"))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SectionsError::BadFileName(file_name.to_string()))?;
    Ok(title.to_string())
}

/// Loads the full collection and every section file from `dir`.
///
/// `full_name` is the file name of the full collection inside `dir`; every
/// other `.bib` file is a section file. The export notice is stripped from
/// the full collection before parsing. Field values are LaTeX-decoded.
pub fn load_sections(dir: &Path, full_name: &str) -> Result<(Vec<Entry>, Vec<Section>), SectionsError> {
    let full_path = dir.join(full_name);
    if !full_path.is_file() {
        return Err(SectionsError::MissingCollection(full_path));
    }

    strip_export_notice(&full_path)?;
    let collection = parse_file(&full_path)?;

    let mut section_files: Vec<String> = Vec::new();
    let dir_entries = fs::read_dir(dir).map_err(|source| SectionsError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for dir_entry in dir_entries {
        let dir_entry = dir_entry.map_err(|source| SectionsError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        if name == full_name || !name.ends_with(".bib") || !dir_entry.path().is_file() {
            continue;
        }
        section_files.push(name);
    }
    section_files.sort();

    let mut sections = Vec::with_capacity(section_files.len());
    for name in section_files {
        let title = section_title(&name)?;
        let entries = parse_file(&dir.join(&name))?;
        sections.push(Section { title, entries });
    }

    Ok((collection, sections))
}

/// Reads and parses one BibTeX file, decoding LaTeX in field values.
fn parse_file(path: &Path) -> Result<Vec<Entry>, SectionsError> {
    let content = read_file(path)?;
    let entries = bibtex::parse(&content).map_err(|source| SectionsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(entries.into_iter().map(latex::decode_entry).collect())
}

fn read_file(path: &Path) -> Result<String, SectionsError> {
    fs::read_to_string(path).map_err(|source| SectionsError::Io {
        path: path.to_path_buf(),
        source,
    })
}
