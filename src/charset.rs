//! Character set handling.
//!
//! Three concerns live here:
//! - choosing the input charset (command line, then locale, then UTF-8),
//! - decoding the raw input bytes into text,
//! - translating text into the single-byte code page the PDF fonts are
//!   encoded with, as described by a `<charset>.map` file.

use crate::config::DEFAULT_CHARSET;
use crate::error::{Error, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Locale variables consulted for the default charset, in priority order.
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_CTYPE", "LANG"];

/// Byte written for characters the PDF charset cannot represent.
pub const REPLACEMENT_BYTE: u8 = b'.';

/// Extract the charset from a POSIX locale string.
///
/// `hu_HU.ISO-8859-2@euro` gives `iso-8859-2`; locales without a codeset
/// part (`C`, `POSIX`, `en_US`) give `None`.
pub fn charset_from_locale(locale: &str) -> Option<String> {
    let (_, codeset) = locale.split_once('.')?;
    let codeset = codeset.split('@').next().unwrap_or(codeset).trim();
    if codeset.is_empty() {
        None
    } else {
        Some(codeset.to_lowercase())
    }
}

/// Default charset from the given environment lookup.
///
/// The first non-empty locale variable decides; if it carries no codeset,
/// or none is set, the result is `utf-8`.
pub fn default_charset_with<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    LOCALE_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .find(|value| !value.is_empty())
        .and_then(|value| charset_from_locale(&value))
        .unwrap_or_else(|| DEFAULT_CHARSET.to_string())
}

/// Default charset from the process environment.
pub fn default_charset() -> String {
    default_charset_with(|var| std::env::var(var).ok())
}

/// Resolve a charset label to an encoding.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::UnknownCharset(label.to_string()))
}

fn is_unicode(encoding: &'static Encoding) -> bool {
    encoding == UTF_8 || encoding == UTF_16LE || encoding == UTF_16BE
}

/// Input charset together with the charset used inside the PDF.
#[derive(Debug, Clone)]
pub struct CharsetSelection {
    /// Label as given by the user, lowercased
    pub label: String,
    /// Decoder for the input
    pub encoding: &'static Encoding,
    /// Single-byte charset the PDF fonts are encoded with
    pub pdf_charset: String,
}

impl CharsetSelection {
    /// Resolve `charset`; Unicode inputs are drawn with `unicode_pdf_charset`.
    pub fn resolve(charset: &str, unicode_pdf_charset: &str) -> Result<Self> {
        let label = charset.trim().to_lowercase();
        let encoding = resolve_encoding(&label)?;
        let pdf_charset = if is_unicode(encoding) {
            unicode_pdf_charset.trim().to_lowercase()
        } else {
            label.clone()
        };
        log::debug!(
            "input charset {} ({}), pdf charset {}",
            label,
            encoding.name(),
            pdf_charset
        );
        Ok(Self {
            label,
            encoding,
            pdf_charset,
        })
    }

    /// Decode raw input bytes.
    ///
    /// A byte order mark overrides the selected encoding. Malformed sequences
    /// become U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, used, had_errors) = self.encoding.decode(bytes);
        if used != self.encoding {
            log::debug!("byte order mark switched input decoding to {}", used.name());
        }
        if had_errors {
            log::warn!(
                "input is not valid {}; malformed sequences were replaced",
                used.name()
            );
        }
        text.into_owned()
    }
}

/// Translation table between Unicode text and a single-byte PDF charset.
#[derive(Debug, Clone)]
pub struct CharsetMap {
    to_byte: HashMap<char, u8>,
    glyph_names: Vec<String>,
}

impl CharsetMap {
    /// Load `<charset>.map` from `font_dir`.
    ///
    /// The lowercased name is tried first, then the canonical name of the
    /// encoding it labels (`latin2` finds `iso-8859-2.map`).
    pub fn load(font_dir: &Path, charset: &str) -> Result<Self> {
        let mut candidates = vec![charset.trim().to_lowercase()];
        if let Some(encoding) = Encoding::for_label(charset.trim().as_bytes()) {
            let canonical = encoding.name().to_lowercase();
            if !candidates.contains(&canonical) {
                candidates.push(canonical);
            }
        }

        let paths: Vec<PathBuf> = candidates
            .iter()
            .map(|name| font_dir.join(format!("{}.map", name)))
            .collect();
        match paths.iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(path),
            None => Err(Error::CharsetMap {
                path: paths[0].clone(),
                reason: "no such mapping file".to_string(),
            }),
        }
    }

    /// Read and parse a mapping file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::CharsetMap {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let map = Self::parse(&text).map_err(|reason| Error::CharsetMap {
            path: path.to_path_buf(),
            reason,
        })?;
        log::debug!("loaded charset mapping {:?} ({} codes)", path, map.to_byte.len());
        Ok(map)
    }

    /// Parse mapping text: one `!XX U+YYYY glyphname` line per code.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut to_byte = HashMap::new();
        let mut glyph_names = vec![".notdef".to_string(); 256];
        let mut entries = 0usize;

        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let lineno = idx + 1;
            let mut fields = line.split_whitespace();
            let (code, unicode, glyph) = match (fields.next(), fields.next(), fields.next()) {
                (Some(c), Some(u), Some(g)) => (c, u, g),
                _ => return Err(format!("line {}: expected 3 fields", lineno)),
            };

            let code = code
                .strip_prefix('!')
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| format!("line {}: bad code {:?}", lineno, code))?;
            let ch = unicode
                .strip_prefix("U+")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .and_then(char::from_u32)
                .ok_or_else(|| format!("line {}: bad code point {:?}", lineno, unicode))?;

            glyph_names[code as usize] = glyph.to_string();
            if code >= 0x80 && glyph != ".notdef" {
                to_byte.insert(ch, code);
            }
            entries += 1;
        }

        if entries == 0 {
            return Err("no mappings".to_string());
        }
        Ok(Self {
            to_byte,
            glyph_names,
        })
    }

    /// Translate text into the single-byte charset.
    ///
    /// ASCII passes through, mapped characters become their code, anything
    /// else becomes `.`.
    pub fn translate(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|ch| {
                if ch.is_ascii() {
                    ch as u8
                } else {
                    self.to_byte.get(&ch).copied().unwrap_or(REPLACEMENT_BYTE)
                }
            })
            .collect()
    }

    /// Glyph name for every code 0..=255.
    pub fn glyph_names(&self) -> &[String] {
        &self.glyph_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LATIN2_SNIPPET: &str = "!20 U+0020 space\n\
                                  !41 U+0041 A\n\
                                  !80 U+0080 .notdef\n\
                                  !D5 U+0150 Ohungarumlaut\n\
                                  !F5 U+0151 ohungarumlaut\n";

    #[test]
    fn test_charset_from_locale() {
        assert_eq!(charset_from_locale("hu_HU.ISO-8859-2"), Some("iso-8859-2".to_string()));
        assert_eq!(charset_from_locale("en_US.UTF-8"), Some("utf-8".to_string()));
        assert_eq!(charset_from_locale("de_DE.ISO-8859-15@euro"), Some("iso-8859-15".to_string()));
        assert_eq!(charset_from_locale("C"), None);
        assert_eq!(charset_from_locale("en_US."), None);
    }

    #[test]
    fn test_default_charset_priority() {
        let env = |var: &str| match var {
            "LC_ALL" => Some(String::new()),
            "LC_CTYPE" => Some("hu_HU.ISO-8859-2".to_string()),
            "LANG" => Some("en_US.UTF-8".to_string()),
            _ => None,
        };
        assert_eq!(default_charset_with(env), "iso-8859-2");
        assert_eq!(default_charset_with(|_| None), "utf-8");
        assert_eq!(default_charset_with(|_| Some("C".to_string())), "utf-8");
    }

    #[test]
    fn test_unknown_charset() {
        let err = resolve_encoding("no-such-charset").unwrap_err();
        assert!(matches!(err, Error::UnknownCharset(ref name) if name == "no-such-charset"));
    }

    #[test]
    fn test_selection_pdf_charset() {
        let utf8 = CharsetSelection::resolve("UTF-8", "iso-8859-2").unwrap();
        assert_eq!(utf8.pdf_charset, "iso-8859-2");

        let latin2 = CharsetSelection::resolve("ISO-8859-2", "iso-8859-2").unwrap();
        assert_eq!(latin2.label, "iso-8859-2");
        assert_eq!(latin2.pdf_charset, "iso-8859-2");

        let cp = CharsetSelection::resolve("windows-1250", "iso-8859-2").unwrap();
        assert_eq!(cp.pdf_charset, "windows-1250");
    }

    #[test]
    fn test_decode_single_byte_and_malformed() {
        let latin2 = CharsetSelection::resolve("iso-8859-2", "iso-8859-2").unwrap();
        assert_eq!(latin2.decode(&[0x54, 0xF5, 0x7A]), "Tőz");

        let utf8 = CharsetSelection::resolve("utf-8", "iso-8859-2").unwrap();
        assert_eq!(utf8.decode(&[b'a', 0xFF, b'b']), "a\u{FFFD}b");
    }

    #[test]
    fn test_parse_and_translate() {
        let map = CharsetMap::parse(LATIN2_SNIPPET).unwrap();
        assert_eq!(map.translate("AŐő"), vec![b'A', 0xD5, 0xF5]);
        // ASCII passes through even if unmapped, others become '.'
        assert_eq!(map.translate("z;€"), b"z;.".to_vec());
        // .notdef codes do not capture their code point
        assert_eq!(map.translate("\u{80}"), b".".to_vec());

        assert_eq!(map.glyph_names().len(), 256);
        assert_eq!(map.glyph_names()[0xD5], "Ohungarumlaut");
        assert_eq!(map.glyph_names()[0x42], ".notdef");
    }

    #[test]
    fn test_parse_errors() {
        assert!(CharsetMap::parse("").unwrap_err().contains("no mappings"));
        assert!(CharsetMap::parse("!ZZ U+0041 A").unwrap_err().contains("line 1"));
        assert!(CharsetMap::parse("!41 U+0041").unwrap_err().contains("3 fields"));
        assert!(CharsetMap::parse("!41 0041 A").unwrap_err().contains("code point"));
    }

    #[test]
    fn test_load_from_dir_with_canonical_fallback() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("iso-8859-2.map"), LATIN2_SNIPPET).unwrap();

        let map = CharsetMap::load(dir.path(), "ISO-8859-2").unwrap();
        assert_eq!(map.translate("ő"), vec![0xF5]);

        // "latin2" is a label of ISO-8859-2
        assert!(CharsetMap::load(dir.path(), "latin2").is_ok());

        let err = CharsetMap::load(dir.path(), "koi8-r").unwrap_err();
        assert!(matches!(err, Error::CharsetMap { ref path, .. } if path.ends_with("koi8-r.map")));
    }
}
