//! Romanization of Devanagari text.
//!
//! The transform stage depends only on the [`Transliterator`] trait.
//! [`SchemeTransliterator`] converts Devanagari into ITRANS or IAST using the
//! fixed tables in `tables.rs`. Characters outside the Devanagari block
//! (Latin text, punctuation, whitespace) pass through untouched.

mod tables;

use std::fmt;
use std::str::FromStr;

use storyvoice_shared::{Result, StoryVoiceError};
use tracing::trace;

use tables::{
    CONSONANTS, DIGIT_ZERO, INDEPENDENT_VOWELS, NUKTA, NUKTA_FORMS, Row, SIGNS, VIRAMA,
    VOWEL_SIGNS,
};

// ---------------------------------------------------------------------------
// Scheme
// ---------------------------------------------------------------------------

/// A script or romanization scheme name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Devanagari,
    Itrans,
    Iast,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Devanagari => "devanagari",
            Self::Itrans => "itrans",
            Self::Iast => "iast",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = StoryVoiceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devanagari" => Ok(Self::Devanagari),
            "itrans" => Ok(Self::Itrans),
            "iast" => Ok(Self::Iast),
            other => Err(StoryVoiceError::Transliteration(format!(
                "unknown scheme '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Transliterator
// ---------------------------------------------------------------------------

/// Converts text between scripts. Must be a pure function of its input.
pub trait Transliterator: Send + Sync {
    fn transliterate(&self, text: &str, from: &str, to: &str) -> Result<String>;
}

/// Table-driven Devanagari → ITRANS / IAST converter.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemeTransliterator;

impl Transliterator for SchemeTransliterator {
    fn transliterate(&self, text: &str, from: &str, to: &str) -> Result<String> {
        let from: Scheme = from.parse()?;
        let to: Scheme = to.parse()?;

        if text.is_empty() || from == to {
            return Ok(text.to_string());
        }

        match (from, to) {
            (Scheme::Devanagari, Scheme::Itrans) => Ok(romanize(text, Target::Itrans)),
            (Scheme::Devanagari, Scheme::Iast) => Ok(romanize(text, Target::Iast)),
            _ => Err(StoryVoiceError::Transliteration(format!(
                "unsupported scheme pair {from} -> {to}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Target {
    Itrans,
    Iast,
}

fn lookup(table: &[Row], c: char, target: Target) -> Option<&'static str> {
    table
        .iter()
        .find(|(dev, _, _)| *dev == c)
        .map(|(_, itrans, iast)| match target {
            Target::Itrans => *itrans,
            Target::Iast => *iast,
        })
}

fn digit(c: char) -> Option<char> {
    let offset = (c as u32).checked_sub(DIGIT_ZERO)?;
    if offset < 10 {
        char::from_digit(offset, 10)
    } else {
        None
    }
}

fn romanize(text: &str, target: Target) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;

        if let Some(mut consonant) = lookup(CONSONANTS, c, target) {
            if chars.get(i) == Some(&NUKTA) {
                if let Some(form) = lookup(NUKTA_FORMS, c, target) {
                    consonant = form;
                }
                i += 1;
            }
            out.push_str(consonant);

            // Inherent vowel unless a sign or virama follows.
            match chars.get(i).copied() {
                Some(VIRAMA) => i += 1,
                Some(next) => match lookup(VOWEL_SIGNS, next, target) {
                    Some(vowel) => {
                        out.push_str(vowel);
                        i += 1;
                    }
                    None => out.push('a'),
                },
                None => out.push('a'),
            }
            continue;
        }

        if let Some(s) = lookup(INDEPENDENT_VOWELS, c, target)
            .or_else(|| lookup(SIGNS, c, target))
            .or_else(|| lookup(VOWEL_SIGNS, c, target))
        {
            out.push_str(s);
        } else if let Some(d) = digit(c) {
            out.push(d);
        } else if c == NUKTA || c == VIRAMA {
            trace!(?c, "stray combining mark dropped");
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn itrans(text: &str) -> String {
        SchemeTransliterator
            .transliterate(text, "devanagari", "itrans")
            .unwrap()
    }

    fn iast(text: &str) -> String {
        SchemeTransliterator
            .transliterate(text, "devanagari", "iast")
            .unwrap()
    }

    #[test]
    fn empty_text_passes_through() {
        assert_eq!(itrans(""), "");
    }

    #[test]
    fn inherent_vowel_and_matras() {
        assert_eq!(itrans("कमल"), "kamala");
        assert_eq!(itrans("कहानी"), "kahAnI");
        assert_eq!(itrans("मेरी"), "merI");
        assert_eq!(itrans("दोस्त"), "dosta");
    }

    #[test]
    fn virama_suppresses_inherent_vowel() {
        assert_eq!(itrans("क्या"), "kyA");
        assert_eq!(itrans("प्यार"), "pyAra");
    }

    #[test]
    fn signs_and_independent_vowels() {
        assert_eq!(itrans("हिंदी"), "hiMdI");
        assert_eq!(itrans("आप"), "Apa");
        assert_eq!(itrans("दुःख"), "duHkha");
        assert_eq!(itrans("ॐ"), "OM");
    }

    #[test]
    fn nukta_forms() {
        // Combining nukta and the precomposed code point agree.
        assert_eq!(itrans("ज\u{093C}रा"), "zarA");
        assert_eq!(itrans("\u{095B}रा"), "zarA");
        assert_eq!(itrans("फ\u{093C}ोन"), "fona");
    }

    #[test]
    fn digits_punctuation_and_latin_pass() {
        assert_eq!(itrans("२०२४ में OK।"), "2024 meM OK|");
    }

    #[test]
    fn iast_output() {
        assert_eq!(iast("कहानी"), "kahānī");
        assert_eq!(iast("शांति"), "śāṃti");
        assert_eq!(iast("चाय"), "cāya");
    }

    #[test]
    fn same_scheme_is_identity() {
        let out = SchemeTransliterator
            .transliterate("already roman", "itrans", "itrans")
            .unwrap();
        assert_eq!(out, "already roman");
    }

    #[test]
    fn unsupported_pairs_error() {
        let err = SchemeTransliterator
            .transliterate("kahAnI", "itrans", "devanagari")
            .unwrap_err();
        assert!(err.to_string().contains("unsupported scheme pair"));

        let err = SchemeTransliterator
            .transliterate("x", "devanagari", "klingon")
            .unwrap_err();
        assert!(err.to_string().contains("unknown scheme"));
    }

    #[test]
    fn scheme_names_are_case_insensitive() {
        assert_eq!("ITRANS".parse::<Scheme>().unwrap(), Scheme::Itrans);
        assert_eq!(" Devanagari ".parse::<Scheme>().unwrap(), Scheme::Devanagari);
    }
}
