//! reStructuredText rendering of sections and entries.
//!
//! Each section becomes a caret-underlined heading followed by one list item
//! per entry; each item ends in a substitution reference that a toggle widget
//! defines later in the document (see [`crate::widget`]).

use thiserror::Error;

use crate::bibtex::Entry;
use crate::sections::Section;

/// Width of the decorative caret underline below a section heading.
const HEADING_UNDERLINE_WIDTH: usize = 39;

/// Errors that can occur while rendering entries.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("entry '{key}' is missing required field '{field}'")]
    MissingField { key: String, field: String },
}

/// Reformats a BibTeX author field for display.
///
/// The input is `Surname, Given` pairs joined by `" and "`. Output is
/// `Given Surname` names separated by commas, with `and` before the final
/// author; a single author is emitted bare. Names without a `", "` separator
/// pass through verbatim.
pub fn format_authors(raw: &str) -> String {
    let authors: Vec<String> = raw
        .split(" and ")
        .map(|name| match name.split_once(", ") {
            Some((surname, given)) => format!("{} {}", given, surname),
            None => name.to_string(),
        })
        .collect();

    match authors.split_last() {
        None => String::new(),
        Some((only, [])) => only.clone(),
        Some((last, init)) => format!("{} and {}", init.join(", "), last),
    }
}

/// Renders an entry's title, stripped of literal braces and wrapped in an
/// external-hyperlink reference when a `url` field is present.
pub fn format_title(entry: &Entry) -> Result<String, FormatError> {
    let title = required(entry, "title")?.replace(['{', '}'], "");
    Ok(match entry.get("url") {
        Some(url) => format!("`{} <{}>`__", title, url),
        None => title,
    })
}

/// Renders an entry's venue in emphasis markup.
///
/// `journal` takes precedence over `booktitle`; `book` entries fall back to
/// `publisher`. When none is present a warning goes to stderr and the venue
/// is empty.
pub fn venue(entry: &Entry) -> String {
    let name = entry
        .get("journal")
        .or_else(|| entry.get("booktitle"))
        .or_else(|| (entry.kind == "book").then(|| entry.get("publisher")).flatten());

    match name {
        Some(name) => format!("*{}*", name),
        None => {
            eprintln!(
                "warning: entry '{}' has no venue (journal, booktitle, or publisher)",
                entry.key
            );
            String::new()
        }
    }
}

/// `", <pages>"` when the entry has a pages field, empty otherwise.
pub fn pages_suffix(entry: &Entry) -> String {
    match entry.get("pages") {
        Some(pages) => format!(", {}", pages),
        None => String::new(),
    }
}

/// Section title with spaces replaced by underscores, used to namespace
/// substitution references and widget DOM ids.
pub fn section_slug(title: &str) -> String {
    title.replace(' ', "_")
}

/// Renders one entry as a reStructuredText list item.
pub fn format_entry_line(entry: &Entry, section_title: &str) -> Result<String, FormatError> {
    let authors = format_authors(required(entry, "author")?);
    let year = required(entry, "year")?;
    Ok(format!(
        "- {} by {}. {}{}, {}. |{}{}|",
        format_title(entry)?,
        authors,
        venue(entry),
        pages_suffix(entry),
        year,
        entry.key,
        section_slug(section_title),
    ))
}

/// Renders one section: heading, caret underline, blank line, entry lines.
pub fn format_section(section: &Section) -> Result<String, FormatError> {
    let mut lines = Vec::with_capacity(section.entries.len());
    for entry in &section.entries {
        lines.push(format_entry_line(entry, &section.title)?);
    }
    Ok(format!(
        "{}\n{}\n\n{}",
        section.title,
        "^".repeat(HEADING_UNDERLINE_WIDTH),
        lines.join("\n")
    ))
}

/// Renders every section, joined by exactly one blank line with no trailing
/// separator after the last.
pub fn render_body(sections: &[Section]) -> Result<String, FormatError> {
    let mut blocks = Vec::with_capacity(sections.len());
    for section in sections {
        blocks.push(format_section(section)?);
    }
    Ok(blocks.join("\n\n"))
}

fn required<'a>(entry: &'a Entry, field: &str) -> Result<&'a str, FormatError> {
    entry.get(field).ok_or_else(|| FormatError::MissingField {
        key: entry.key.clone(),
        field: field.to_string(),
    })
}
