//! Toggle widgets exposing an entry's raw BibTeX.
//!
//! Every formatted entry line ends in a substitution reference; this module
//! emits the matching definition: a raw-HTML block with a button that shows
//! or hides the entry's citation text. The entry is looked up in the full
//! collection by cite key and re-serialized through the BibTeX serializer,
//! so the shown text is a faithful bibliography record rather than a
//! hand-assembled approximation.

use thiserror::Error;

use crate::bibtex::{self, Entry};
use crate::rst::section_slug;
use crate::sections::Section;

/// Errors that can occur while emitting widgets.
#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("unknown identifier '{id}' referenced by section '{section}'")]
    UnknownId { id: String, section: String },
}

/// Raw-HTML substitution definition for one entry's show/hide widget.
///
/// `[ID][SECTION]` namespaces the substitution name, the DOM ids, and the
/// toggle function, so the same entry cited from two sections yields two
/// independent widgets.
const TOGGLE_TEMPLATE: &str = r#"
.. |[ID][SECTION]| raw:: html

    <button onclick="[ID][SECTION]Function()" id="[ID][SECTION]_btt">Show Bib</button>
    <p style="background-color: #2980b929;"><span id="[ID][SECTION]_more" style="display: none">
        [BIBTEX]
    </span></p>
    <script>
        function [ID][SECTION]Function() {
          var moreText = document.getElementById("[ID][SECTION]_more");
          var btnText = document.getElementById("[ID][SECTION]_btt");

          if (moreText.style.display === "none") {
            btnText.innerHTML = "Hide Bib";
            moreText.style.display = "inline";
          } else {
            btnText.innerHTML = "Show Bib";
            moreText.style.display = "none";
          }
        }
    </script>
"#;

/// Finds the entry with cite key `id` in the full collection.
pub fn find_entry<'a>(collection: &'a [Entry], id: &str) -> Option<&'a Entry> {
    collection.iter().find(|entry| entry.key == id)
}

/// Re-serializes the entry with cite key `id` as BibTeX text.
pub fn extract_bibtex(collection: &[Entry], id: &str) -> Option<String> {
    let entry = find_entry(collection, id)?;
    Some(bibtex::to_bibtex(std::slice::from_ref(entry)))
}

/// Converts serialized BibTeX text into a single HTML line.
///
/// Abstract lines and blank lines are dropped (abstracts are long and not
/// wanted in the widget); each retained line is HTML-escaped and given a
/// forced line break, in original order.
pub fn bibtex_to_html(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        if line.is_empty() || line.trim_start().starts_with("abstract") {
            continue;
        }
        out.push_str(&escape_html(line));
        out.push_str("<br>");
    }
    out
}

fn escape_html(line: &str) -> String {
    line.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Emits the widget block for one entry of one section.
pub fn widget_block(
    collection: &[Entry],
    id: &str,
    section_title: &str,
) -> Result<String, WidgetError> {
    let raw = extract_bibtex(collection, id).ok_or_else(|| WidgetError::UnknownId {
        id: id.to_string(),
        section: section_title.to_string(),
    })?;

    Ok(TOGGLE_TEMPLATE
        .replace("[BIBTEX]", &bibtex_to_html(&raw))
        .replace("[ID]", id)
        .replace("[SECTION]", &section_slug(section_title)))
}

/// Emits the widget blocks for every entry of every section, concatenated
/// in section order.
pub fn render_widgets(collection: &[Entry], sections: &[Section]) -> Result<String, WidgetError> {
    let mut blocks = Vec::new();
    for section in sections {
        for entry in &section.entries {
            blocks.push(widget_block(collection, &entry.key, &section.title)?);
        }
    }
    Ok(blocks.concat())
}
