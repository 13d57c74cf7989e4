//! LaTeX to Unicode decoding for parsed field values.
//!
//! BibTeX exported by reference managers encodes accented characters as LaTeX
//! control sequences (`{\'e}`, `\"{o}`, `\ss`). Field values are decoded to
//! composed Unicode after parsing, matching what citation text should look
//! like in rendered output.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;

use crate::bibtex::Entry;

lazy_static! {
    /// Accented forms: `{\'e}`, `\'{e}`, `\'e`, with or without wrapping braces.
    static ref ACCENT_RE: Regex =
        Regex::new(r#"\{?\\(['`^"~=.uvHck])\s*\{?([a-zA-Z])\}?\}?"#).unwrap();

    /// Letter macros: fully braced `{\ss}`, or bare `\ss` ended by a non-letter.
    static ref MACRO_RE: Regex = Regex::new(
        r"\{\\(ss|ae|AE|oe|OE|aa|AA|o|O|l|L|i|j)\}|\\(ss|ae|AE|oe|OE|aa|AA|o|O|l|L|i|j)(?:\s|\b|$)",
    )
    .unwrap();

    /// Dictionary mapping accent commands to precomposed characters.
    static ref ACCENTS: HashMap<(char, char), char> = {
        let mut m = HashMap::new();

        // Acute
        for (p, c) in [('a', 'á'), ('e', 'é'), ('i', 'í'), ('o', 'ó'), ('u', 'ú'),
                       ('y', 'ý'), ('c', 'ć'), ('n', 'ń'), ('s', 'ś'), ('z', 'ź'),
                       ('A', 'Á'), ('E', 'É'), ('I', 'Í'), ('O', 'Ó'), ('U', 'Ú'),
                       ('Y', 'Ý'), ('C', 'Ć'), ('N', 'Ń'), ('S', 'Ś'), ('Z', 'Ź')] {
            m.insert(('\'', p), c);
        }
        // Grave
        for (p, c) in [('a', 'à'), ('e', 'è'), ('i', 'ì'), ('o', 'ò'), ('u', 'ù'),
                       ('A', 'À'), ('E', 'È'), ('I', 'Ì'), ('O', 'Ò'), ('U', 'Ù')] {
            m.insert(('`', p), c);
        }
        // Circumflex
        for (p, c) in [('a', 'â'), ('e', 'ê'), ('i', 'î'), ('o', 'ô'), ('u', 'û'),
                       ('A', 'Â'), ('E', 'Ê'), ('I', 'Î'), ('O', 'Ô'), ('U', 'Û')] {
            m.insert(('^', p), c);
        }
        // Umlaut / diaeresis
        for (p, c) in [('a', 'ä'), ('e', 'ë'), ('i', 'ï'), ('o', 'ö'), ('u', 'ü'),
                       ('y', 'ÿ'), ('A', 'Ä'), ('E', 'Ë'), ('I', 'Ï'), ('O', 'Ö'),
                       ('U', 'Ü')] {
            m.insert(('"', p), c);
        }
        // Tilde
        for (p, c) in [('a', 'ã'), ('n', 'ñ'), ('o', 'õ'),
                       ('A', 'Ã'), ('N', 'Ñ'), ('O', 'Õ')] {
            m.insert(('~', p), c);
        }
        // Macron
        for (p, c) in [('a', 'ā'), ('e', 'ē'), ('i', 'ī'), ('o', 'ō'), ('u', 'ū')] {
            m.insert(('=', p), c);
        }
        // Dot above
        for (p, c) in [('z', 'ż'), ('Z', 'Ż'), ('e', 'ė'), ('E', 'Ė')] {
            m.insert(('.', p), c);
        }
        // Breve
        for (p, c) in [('a', 'ă'), ('A', 'Ă'), ('g', 'ğ'), ('G', 'Ğ')] {
            m.insert(('u', p), c);
        }
        // Caron
        for (p, c) in [('c', 'č'), ('s', 'š'), ('z', 'ž'), ('r', 'ř'), ('e', 'ě'),
                       ('n', 'ň'), ('d', 'ď'), ('t', 'ť'),
                       ('C', 'Č'), ('S', 'Š'), ('Z', 'Ž'), ('R', 'Ř'), ('E', 'Ě'),
                       ('N', 'Ň'), ('D', 'Ď'), ('T', 'Ť')] {
            m.insert(('v', p), c);
        }
        // Double acute
        for (p, c) in [('o', 'ő'), ('u', 'ű'), ('O', 'Ő'), ('U', 'Ű')] {
            m.insert(('H', p), c);
        }
        // Cedilla
        for (p, c) in [('c', 'ç'), ('C', 'Ç'), ('s', 'ş'), ('S', 'Ş')] {
            m.insert(('c', p), c);
        }
        // Ogonek
        for (p, c) in [('a', 'ą'), ('e', 'ę'), ('A', 'Ą'), ('E', 'Ę')] {
            m.insert(('k', p), c);
        }

        m
    };

    /// Dictionary mapping argumentless macros to their characters.
    static ref MACROS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("ss", "ß");
        m.insert("ae", "æ");
        m.insert("AE", "Æ");
        m.insert("oe", "œ");
        m.insert("OE", "Œ");
        m.insert("aa", "å");
        m.insert("AA", "Å");
        m.insert("o", "ø");
        m.insert("O", "Ø");
        m.insert("l", "ł");
        m.insert("L", "Ł");
        m.insert("i", "ı");
        m.insert("j", "ȷ");
        m
    };
}

/// Decodes LaTeX accent commands and letter macros in `text` to Unicode.
///
/// Sequences without a mapping are left untouched.
pub fn decode(text: &str) -> String {
    let pass1 = ACCENT_RE.replace_all(text, |caps: &Captures| {
        let accent = caps[1].chars().next().unwrap();
        let letter = caps[2].chars().next().unwrap();
        match ACCENTS.get(&(accent, letter)) {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    });
    MACRO_RE
        .replace_all(&pass1, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match MACROS.get(name) {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Decodes every field value of `entry` in place.
pub fn decode_entry(mut entry: Entry) -> Entry {
    for value in entry.fields.values_mut() {
        if value.contains('\\') {
            *value = decode(value);
        }
    }
    entry
}
