//! Shared fixtures and helpers for integration tests.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Full collection with two entries, `id1` and `id2`.
pub const FULL_BIB: &str = "@article{id1,
  author = {Doe, Jane and Smith, John},
  title = {A {Great} Paper},
  journal = {Nature},
  pages = {1--10},
  year = {2020},
  url = {http://example.org/great},
  abstract = {A long abstract that must never reach the widget.}
}

@book{id2,
  author = {Smith, John},
  title = {A Fine Book},
  publisher = {Acme Press},
  year = {2021}
}
";

/// Section file citing only `id1`.
pub const SURVEYS_BIB: &str = "@article{id1,
  author = {Doe, Jane and Smith, John},
  title = {A {Great} Paper},
  journal = {Nature},
  pages = {1--10},
  year = {2020},
  url = {http://example.org/great}
}
";

/// Minimal template with the placeholder on its own line.
pub const TEMPLATE: &str = "Research\n========\n\n<TAG>\n";

/// An on-disk project tree: a bibtex directory with a full collection and
/// section files, plus a template, inside one temp directory.
pub struct Project {
    pub root: TempDir,
}

impl Project {
    /// Creates the default tree: `bibtex/Full.bib`, `bibtex/01-Surveys.bib`,
    /// and `research_template.rst`.
    pub fn new() -> Self {
        let project = Self::empty();
        project.write_full(FULL_BIB);
        project.write_section("01-Surveys.bib", SURVEYS_BIB);
        project.write_template(TEMPLATE);
        project
    }

    /// Creates just the directory skeleton, no files.
    pub fn empty() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("bibtex")).unwrap();
        Self { root }
    }

    pub fn bibtex_dir(&self) -> PathBuf {
        self.root.path().join("bibtex")
    }

    pub fn template_path(&self) -> PathBuf {
        self.root.path().join("research_template.rst")
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.path().join("research.rst")
    }

    pub fn write_full(&self, content: &str) {
        fs::write(self.bibtex_dir().join("Full.bib"), content).unwrap();
    }

    pub fn write_section(&self, name: &str, content: &str) {
        fs::write(self.bibtex_dir().join(name), content).unwrap();
    }

    pub fn write_template(&self, content: &str) {
        fs::write(self.template_path(), content).unwrap();
    }
}
