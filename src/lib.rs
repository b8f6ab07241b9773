// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

//! # csv2pdf
//!
//! Converts semicolon-separated CSV into a paginated PDF of tables.
//!
//! Input files often stack several tables with different columns on top of
//! each other. Every run of records with the same field count becomes its
//! own table, on its own page, sized from the widest value of each column.
//!
//! ## Pipeline
//!
//! - [`charset`]: choose and decode the input charset, translate text into
//!   the single-byte charset of the PDF fonts
//! - [`assets`]: stage the directory of `<charset>.map` files
//! - [`segment`]: split the records into [`Part`]s
//! - [`render`]: draw a part as a table
//! - [`convert`]: run the whole conversion, writing the PDF once
//!
//! ## Quick Start
//!
//! ```ignore
//! use csv2pdf::{CharsetMap, CharsetSelection, ConvertOptions, StageConfig};
//!
//! # fn main() -> csv2pdf::Result<()> {
//! let font_dir = csv2pdf::assets::stage_font_dir(None, &StageConfig::default())?;
//! let charset = CharsetSelection::resolve("utf-8", "iso-8859-2")?;
//! let map = CharsetMap::load(font_dir.path(), &charset.pdf_charset)?;
//!
//! let out = csv2pdf::convert::convert(b"a;b\n1;2\n", &charset, &map, &ConvertOptions::default())?;
//! std::fs::write("out.pdf", &out.pdf)?;
//! font_dir.close()?;
//! # Ok(())
//! # }
//! ```

pub mod error;

pub mod config;

pub mod object;

pub mod writer;

pub mod charset;

pub mod segment;

pub mod render;

pub mod assets;

pub mod convert;

pub use assets::{stage_font_dir, ExtractStats, FontDir};
pub use charset::{CharsetMap, CharsetSelection};
pub use config::{RenderConfig, RowStyle, StageConfig};
pub use convert::{ConvertOptions, Converted};
pub use error::{Error, Result};
pub use render::{RowWriter, TableRenderer};
pub use segment::{Part, Segmenter};
pub use writer::Orientation;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "csv2pdf");
    }
}
