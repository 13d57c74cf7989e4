//! bib2rst: CLI for generating a reStructuredText publications page from BibTeX files.
//!
//! This library provides functionality to:
//! - Parse BibTeX files into ordered entries, with LaTeX-to-Unicode decoding
//! - Load a full-collection file plus per-section files from a directory
//! - Render each section as a heading with one formatted list item per entry
//! - Emit a raw-HTML show/hide widget with each entry's citation text
//! - Splice the rendered body into a template and write the output atomically

pub mod bibtex;
pub mod latex;
pub mod output;
pub mod rst;
pub mod sections;
pub mod widget;

pub use bibtex::{parse, to_bibtex, BibtexError, Entry};
pub use output::{splice, write_atomic};
pub use rst::{format_authors, format_entry_line, render_body, section_slug};
pub use sections::{load_sections, strip_export_notice, Section};
pub use widget::{bibtex_to_html, extract_bibtex, render_widgets};
