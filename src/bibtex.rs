//! BibTeX parsing and serialization.
//!
//! Parses BibTeX text into ordered entries and serializes entries back to
//! BibTeX syntax, so a re-serialized entry is a faithful round-trip of the
//! parsed one. Handles braced and quoted values, nested braces, numeric
//! values, `@string` abbreviation expansion, and `@comment`/`@preamble`
//! blocks. Parsing is fail-fast: the first malformed entry aborts with the
//! offending line number.

use std::collections::{BTreeMap, HashMap};

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    sequence::preceded,
    IResult,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while parsing BibTeX text.
#[derive(Error, Debug)]
pub enum BibtexError {
    #[error("malformed BibTeX syntax at line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// A single bibliography record.
///
/// Field names and the entry kind are lowercased at parse time. Fields are
/// kept in a sorted map so serialization is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The cite key, unique within one collection.
    pub key: String,
    /// The entry kind, e.g. "article" or "book".
    pub kind: String,
    pub fields: BTreeMap<String, String>,
}

impl Entry {
    pub fn new(key: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: kind.into().to_lowercase(),
            fields: BTreeMap::new(),
        }
    }

    /// Field value by lowercased name.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into().to_lowercase(), value.into());
    }

    /// Serializes this entry back to BibTeX syntax.
    ///
    /// Fields are emitted in sorted order, braced unless purely numeric.
    pub fn to_bibtex_string(&self) -> String {
        let mut out = String::new();
        out.push('@');
        out.push_str(&self.kind);
        out.push('{');
        out.push_str(&self.key);
        out.push(',');
        let last = self.fields.len().saturating_sub(1);
        for (i, (name, value)) in self.fields.iter().enumerate() {
            out.push_str("\n  ");
            out.push_str(name);
            out.push_str(" = ");
            if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
                out.push_str(value);
            } else {
                out.push('{');
                out.push_str(value);
                out.push('}');
            }
            if i != last {
                out.push(',');
            }
        }
        out.push_str("\n}");
        out
    }
}

/// Serializes a sequence of entries to BibTeX text, separated by blank lines.
pub fn to_bibtex(entries: &[Entry]) -> String {
    let blocks: Vec<String> = entries.iter().map(Entry::to_bibtex_string).collect();
    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

/// Parses BibTeX text into an ordered sequence of entries.
///
/// `@string` definitions are expanded into subsequent field values;
/// `@comment` and `@preamble` blocks and `%` line comments are skipped.
///
/// # Errors
///
/// Returns [`BibtexError::Syntax`] on the first malformed entry.
pub fn parse(input: &str) -> Result<Vec<Entry>, BibtexError> {
    let mut entries = Vec::new();
    let mut strings = Strings::new();
    let mut remaining = input;

    loop {
        remaining = skip_to_entry(remaining);
        if remaining.is_empty() {
            return Ok(entries);
        }

        match directive(remaining, &strings) {
            Ok((rest, parsed)) => {
                match parsed {
                    Directive::Record(entry) => entries.push(entry),
                    Directive::Abbrev(name, value) => {
                        strings.insert(name, value);
                    }
                    Directive::Ignored => {}
                }
                remaining = rest;
            }
            Err(_) => {
                return Err(BibtexError::Syntax {
                    line: line_of(input, remaining),
                    message: "failed to parse entry".to_string(),
                });
            }
        }
    }
}

/// 1-based line number of `tail`'s start within `input`.
fn line_of(input: &str, tail: &str) -> usize {
    let consumed = input.len() - tail.len();
    input[..consumed].matches('\n').count() + 1
}

/// Accumulated `@string` abbreviations, threaded through the grammar.
type Strings = HashMap<String, String>;

/// Outcome of parsing one `@...` directive.
enum Directive {
    Record(Entry),
    Abbrev(String, String),
    Ignored,
}

/// Skips whitespace, `%` line comments, and stray text up to the next `@`.
fn skip_to_entry(input: &str) -> &str {
    let mut rest = input;
    loop {
        rest = rest.trim_start();
        if let Some(stripped) = rest.strip_prefix('%') {
            match stripped.find('\n') {
                Some(pos) => rest = &stripped[pos + 1..],
                None => return "",
            }
            continue;
        }
        if rest.is_empty() || rest.starts_with('@') {
            return rest;
        }
        // Stray text between entries: skip to the next @ or end.
        match rest.find('@') {
            Some(pos) => return &rest[pos..],
            None => return "",
        }
    }
}

/// Wraps a parser so it tolerates leading whitespace.
fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    preceded(multispace0, inner)
}

/// Field and abbreviation names.
fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(input)
}

/// Cite keys allow a wider character set than field names.
fn cite_key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || "_-:./+".contains(c))(input)
}

fn directive<'a>(input: &'a str, strings: &Strings) -> IResult<&'a str, Directive> {
    let (rest, _) = char('@')(input)?;
    let (rest, kind) = ws(take_while1(|c: char| c.is_ascii_alphanumeric()))(rest)?;

    match kind.to_lowercase().as_str() {
        "string" => {
            let (rest, (name, val)) = abbrev_block(rest, strings)?;
            Ok((rest, Directive::Abbrev(name, val)))
        }
        "preamble" => {
            let (rest, _) = ws(char('{'))(rest)?;
            let (rest, _) = value(rest, strings)?;
            let (rest, _) = ws(char('}'))(rest)?;
            Ok((rest, Directive::Ignored))
        }
        "comment" => {
            // Braced comment body, or the rest of the line.
            let (rest, _) = multispace0(rest)?;
            if rest.starts_with('{') {
                let (rest, _) = brace_group(rest)?;
                Ok((rest, Directive::Ignored))
            } else {
                let end = rest.find('\n').unwrap_or(rest.len());
                Ok((&rest[end..], Directive::Ignored))
            }
        }
        _ => {
            let (rest, entry) = record_block(rest, kind, strings)?;
            Ok((rest, Directive::Record(entry)))
        }
    }
}

/// `{name = value}` following `@string`.
fn abbrev_block<'a>(input: &'a str, strings: &Strings) -> IResult<&'a str, (String, String)> {
    let (rest, _) = ws(char('{'))(input)?;
    let (rest, name) = ws(ident)(rest)?;
    let (rest, _) = ws(char('='))(rest)?;
    let (rest, val) = value(rest, strings)?;
    let (rest, _) = ws(char('}'))(rest)?;
    Ok((rest, (name.to_string(), val)))
}

/// `{key, name = value, ...}` following an entry kind.
fn record_block<'a>(input: &'a str, kind: &str, strings: &Strings) -> IResult<&'a str, Entry> {
    let (rest, _) = ws(char('{'))(input)?;
    let (rest, key) = ws(cite_key)(rest)?;
    let (rest, _) = ws(char(','))(rest)?;

    let mut entry = Entry::new(key, kind);
    let mut remaining = rest;
    loop {
        let (rest, _) = multispace0(remaining)?;
        if let Some(after) = rest.strip_prefix('}') {
            return Ok((after, entry));
        }

        let (rest, name) = ident(rest)?;
        let (rest, _) = ws(char('='))(rest)?;
        let (rest, val) = value(rest, strings)?;
        entry.set(name, val);

        // The comma before the closing brace is optional.
        let (rest, _) = multispace0(rest)?;
        remaining = rest.strip_prefix(',').unwrap_or(rest);
    }
}

/// A field value: one or more parts joined with `#`.
fn value<'a>(input: &'a str, strings: &Strings) -> IResult<&'a str, String> {
    let (mut remaining, mut out) = value_part(input, strings)?;
    loop {
        let (rest, _) = multispace0(remaining)?;
        match rest.strip_prefix('#') {
            Some(after) => {
                let (rest, part) = value_part(after, strings)?;
                out.push_str(&part);
                remaining = rest;
            }
            None => return Ok((rest, out)),
        }
    }
}

/// One value part: braced, quoted, a bare number, or an abbreviation
/// reference. Unknown abbreviations fall back to their literal name.
fn value_part<'a>(input: &'a str, strings: &Strings) -> IResult<&'a str, String> {
    ws(alt((
        quoted,
        map(brace_group, |s: &str| s.to_string()),
        map(take_while1(|c: char| c.is_ascii_digit()), |s: &str| {
            s.to_string()
        }),
        map(ident, |name| {
            strings.get(name).cloned().unwrap_or_else(|| name.to_string())
        }),
    )))(input)
}

/// The text inside one balanced `{...}` group, nesting and backslash
/// escapes honored.
fn brace_group(input: &str) -> IResult<&str, &str> {
    let mut chars = input.char_indices();
    if !matches!(chars.next(), Some((_, '{'))) {
        return fail(input);
    }

    let mut depth = 1u32;
    while let Some((i, c)) = chars.next() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[i + 1..], &input[1..i]));
                }
            }
            '\\' => {
                chars.next();
            }
            _ => {}
        }
    }
    fail(input)
}

/// A `"..."` value; braces protect inner quotes.
fn quoted(input: &str) -> IResult<&str, String> {
    let mut chars = input.char_indices();
    if !matches!(chars.next(), Some((_, '"'))) {
        return fail(input);
    }

    let mut out = String::new();
    let mut depth = 0u32;
    while let Some((i, c)) = chars.next() {
        match c {
            '"' if depth == 0 => return Ok((&input[i + 1..], out)),
            '{' => {
                depth += 1;
                out.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                out.push(c);
            }
            '\\' => {
                out.push(c);
                if let Some((_, next)) = chars.next() {
                    out.push(next);
                }
            }
            c => out.push(c),
        }
    }
    fail(input)
}

fn fail<O>(input: &str) -> IResult<&str, O> {
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}
