//! PDF writing module for generating table documents.
//!
//! ## Architecture
//!
//! ```text
//! cells, lines, page breaks
//!     ↓
//! [TableDocument] (millimetre cursor canvas)
//!     ↓
//! [ContentStreamBuilder] (drawing operators → content stream bytes)
//!     ↓
//! [PdfWriter] (assembles complete PDF structure)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! PDF bytes
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use csv2pdf::writer::{Borders, CellAlign, Margins, Orientation, PdfWriter, TableDocument};
//!
//! let mut doc = TableDocument::new(PdfWriter::new(), Margins::default());
//! doc.add_page(Orientation::Portrait);
//! doc.cell(40.0, 7.0, b"Hello", Borders::ALL, CellAlign::Center, false)?;
//! let bytes = doc.output()?;
//! ```

mod content_stream;
mod document;
mod font_metrics;
mod object_serializer;
mod pdf_writer;

pub use content_stream::{ContentStreamBuilder, ContentStreamOp};
pub use document::{
    Borders, CellAlign, Margins, Orientation, Rgb, TableDocument, A4_MM, PT_PER_MM,
};
pub use font_metrics::{FontMetrics, FontStyle, HelveticaMetrics};
pub use object_serializer::ObjectSerializer;
pub use pdf_writer::{PageBuilder, PdfWriter, PdfWriterConfig};
