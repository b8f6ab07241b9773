//! PDF document writer.
//!
//! Assembles complete PDF documents with proper structure:
//! header, body, xref table, and trailer.

use super::content_stream::ContentStreamBuilder;
use super::font_metrics::FontStyle;
use super::object_serializer::ObjectSerializer;
use crate::error::Result;
use crate::object::{Dict, Object};
use std::io::Write;

/// Configuration for PDF generation.
#[derive(Debug, Clone)]
pub struct PdfWriterConfig {
    /// PDF version (e.g., "1.4")
    pub version: String,
    /// Document title
    pub title: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// Whether to compress content streams
    pub compress: bool,
}

impl Default for PdfWriterConfig {
    fn default() -> Self {
        Self {
            version: "1.4".to_string(),
            title: None,
            creator: Some(crate::NAME.to_string()),
            compress: true,
        }
    }
}

impl PdfWriterConfig {
    /// Set document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enable or disable stream compression.
    ///
    /// When enabled, page content streams are compressed with FlateDecode.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Compress data using Flate/Deflate compression.
fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// A page being built.
pub struct PageBuilder<'a> {
    writer: &'a mut PdfWriter,
    page_index: usize,
}

impl<'a> PageBuilder<'a> {
    /// Content stream of this page.
    pub fn content(&mut self) -> &mut ContentStreamBuilder {
        &mut self.writer.pages[self.page_index].content_builder
    }

    /// Finish building this page and return to the writer.
    pub fn finish(self) -> &'a mut PdfWriter {
        self.writer.pages[self.page_index].content_builder.end_text();
        self.writer
    }
}

struct PageData {
    width: f32,
    height: f32,
    content_builder: ContentStreamBuilder,
}

/// PDF document writer.
///
/// Builds a complete PDF document with pages, the two Helvetica fonts and
/// content. Text shown on the pages must already be encoded with the
/// single-byte encoding described by [`PdfWriter::set_font_encoding`].
pub struct PdfWriter {
    config: PdfWriterConfig,
    pages: Vec<PageData>,
    next_obj_id: u32,
    /// Glyph names for codes 0..=255, written as the fonts' /Differences
    differences: Option<Vec<String>>,
}

impl PdfWriter {
    /// Create a new PDF writer with default config.
    pub fn new() -> Self {
        Self::with_config(PdfWriterConfig::default())
    }

    /// Create a PDF writer with custom config.
    pub fn with_config(config: PdfWriterConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            next_obj_id: 1,
            differences: None,
        }
    }

    /// Use a custom single-byte encoding for the fonts.
    ///
    /// `glyph_names[code]` is the glyph drawn for byte `code`; the base
    /// encoding is WinAnsiEncoding.
    pub fn set_font_encoding(&mut self, glyph_names: Vec<String>) {
        self.differences = Some(glyph_names);
    }

    fn alloc_obj_id(&mut self) -> u32 {
        let id = self.next_obj_id;
        self.next_obj_id += 1;
        id
    }

    /// Add a page with the given dimensions in points.
    pub fn add_page(&mut self, width: f32, height: f32) -> PageBuilder<'_> {
        let page_index = self.pages.len();
        self.pages.push(PageData {
            width,
            height,
            content_builder: ContentStreamBuilder::new(),
        });
        PageBuilder {
            writer: self,
            page_index,
        }
    }

    /// Content stream of the most recently added page.
    pub fn last_page_content(&mut self) -> Option<&mut ContentStreamBuilder> {
        self.pages.last_mut().map(|p| &mut p.content_builder)
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn font_object(&self, style: FontStyle) -> Object {
        let encoding = match &self.differences {
            Some(names) => {
                // One run starting at code 32 covers every printable byte
                let mut diffs = Vec::with_capacity(names.len() + 1);
                diffs.push(Object::Integer(32));
                diffs.extend(names.iter().skip(32).map(|n| Object::name(n)));
                Object::dict([
                    ("Type", Object::name("Encoding")),
                    ("BaseEncoding", Object::name("WinAnsiEncoding")),
                    ("Differences", Object::Array(diffs)),
                ])
            },
            None => Object::name("WinAnsiEncoding"),
        };

        Object::dict([
            ("Type", Object::name("Font")),
            ("Subtype", Object::name("Type1")),
            ("BaseFont", Object::name(style.base_font())),
            ("Encoding", encoding),
        ])
    }

    /// Build the complete PDF document.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let serializer = ObjectSerializer::new();
        let mut output = Vec::new();
        let mut xref_offsets: Vec<(u32, usize)> = Vec::new();

        writeln!(output, "%PDF-{}", self.config.version)?;
        // Binary marker (recommended for binary content)
        output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let catalog_id = self.alloc_obj_id();
        let pages_id = self.alloc_obj_id();

        let mut font_resources = Dict::new();
        let mut font_objects = Vec::new();
        for style in FontStyle::all() {
            let font_id = self.alloc_obj_id();
            font_resources.insert(
                style.resource_name().to_string(),
                Object::reference(font_id),
            );
            font_objects.push((font_id, self.font_object(style)));
        }
        let resources = Object::dict([("Font", Object::Dictionary(font_resources))]);

        let page_count = self.pages.len();
        let mut page_ids: Vec<(u32, u32)> = Vec::with_capacity(page_count);
        for _ in 0..page_count {
            let page_id = self.alloc_obj_id();
            let content_id = self.alloc_obj_id();
            page_ids.push((page_id, content_id));
        }

        let mut page_refs: Vec<Object> = Vec::with_capacity(page_count);
        let mut page_objects: Vec<(u32, Object)> = Vec::with_capacity(page_count * 2);

        for (page_data, &(page_id, content_id)) in self.pages.iter().zip(&page_ids) {
            let raw_content = page_data.content_builder.build()?;

            let (content_bytes, is_compressed) = if self.config.compress {
                (compress_data(&raw_content)?, true)
            } else {
                (raw_content, false)
            };

            let mut content_dict = Dict::new();
            content_dict.insert("Length".to_string(), Object::Integer(content_bytes.len() as i64));
            if is_compressed {
                content_dict.insert("Filter".to_string(), Object::name("FlateDecode"));
            }

            let page_obj = Object::dict([
                ("Type", Object::name("Page")),
                ("Parent", Object::reference(pages_id)),
                (
                    "MediaBox",
                    Object::media_box(page_data.width, page_data.height),
                ),
                ("Contents", Object::reference(content_id)),
                ("Resources", resources.clone()),
            ]);

            page_refs.push(Object::reference(page_id));
            page_objects.push((page_id, page_obj));
            page_objects.push((
                content_id,
                Object::Stream {
                    dict: content_dict,
                    data: bytes::Bytes::from(content_bytes),
                },
            ));
        }

        let pages_obj = Object::dict([
            ("Type", Object::name("Pages")),
            ("Kids", Object::Array(page_refs)),
            ("Count", Object::Integer(page_count as i64)),
        ]);

        let catalog_obj = Object::dict([
            ("Type", Object::name("Catalog")),
            ("Pages", Object::reference(pages_id)),
        ]);

        let info_id = self.alloc_obj_id();
        let mut info_entries = Vec::new();
        if let Some(title) = &self.config.title {
            info_entries.push(("Title", Object::String(title.as_bytes().to_vec())));
        }
        if let Some(creator) = &self.config.creator {
            info_entries.push(("Creator", Object::String(creator.as_bytes().to_vec())));
        }
        let info_obj = Object::dict(info_entries);

        xref_offsets.push((catalog_id, output.len()));
        serializer.write_indirect(&mut output, catalog_id, &catalog_obj)?;

        xref_offsets.push((pages_id, output.len()));
        serializer.write_indirect(&mut output, pages_id, &pages_obj)?;

        for (font_id, font_obj) in &font_objects {
            xref_offsets.push((*font_id, output.len()));
            serializer.write_indirect(&mut output, *font_id, font_obj)?;
        }

        for (obj_id, obj) in &page_objects {
            xref_offsets.push((*obj_id, output.len()));
            serializer.write_indirect(&mut output, *obj_id, obj)?;
        }

        xref_offsets.push((info_id, output.len()));
        serializer.write_indirect(&mut output, info_id, &info_obj)?;

        let xref_start = output.len();
        writeln!(output, "xref")?;
        writeln!(output, "0 {}", self.next_obj_id)?;
        writeln!(output, "0000000000 65535 f ")?;

        xref_offsets.sort_by_key(|(id, _)| *id);
        for (_, offset) in &xref_offsets {
            writeln!(output, "{:010} 00000 n ", offset)?;
        }

        let trailer = Object::dict([
            ("Size", Object::Integer(self.next_obj_id as i64)),
            ("Root", Object::reference(catalog_id)),
            ("Info", Object::reference(info_id)),
        ]);

        writeln!(output, "trailer")?;
        serializer.write(&mut output, &trailer)?;
        writeln!(output)?;
        writeln!(output, "startxref")?;
        writeln!(output, "{}", xref_start)?;
        write!(output, "%%EOF")?;

        log::debug!("assembled PDF: {} pages, {} bytes", page_count, output.len());
        Ok(output)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uncompressed() -> PdfWriter {
        PdfWriter::with_config(PdfWriterConfig::default().with_compress(false))
    }

    #[test]
    fn test_create_empty_pdf() {
        let mut writer = uncompressed();
        writer.add_page(595.0, 842.0).finish();
        let bytes = writer.finish().unwrap();

        let content = String::from_utf8_lossy(&bytes);
        assert!(content.starts_with("%PDF-1.4"));
        assert!(content.contains("/Type /Catalog"));
        assert!(content.contains("/Type /Pages"));
        assert!(content.contains("/Count 1"));
        assert!(content.ends_with("%%EOF"));
    }

    #[test]
    fn test_page_content_and_fonts() {
        let mut writer = uncompressed();
        {
            let mut page = writer.add_page(595.0, 842.0);
            page.content()
                .set_font(FontStyle::Bold.resource_name(), 10.0)
                .text(b"Name", 30.0, 800.0);
            page.finish();
        }
        let bytes = writer.finish().unwrap();
        let content = String::from_utf8_lossy(&bytes);

        assert!(content.contains("/BaseFont /Helvetica-Bold"));
        assert!(content.contains("/BaseFont /Helvetica/"));
        assert!(content.contains("/F2 10 Tf"));
        assert!(content.contains("(Name) Tj"));
    }

    #[test]
    fn test_custom_encoding_differences() {
        let mut names: Vec<String> = (0..256).map(|_| ".notdef".to_string()).collect();
        names[32] = "space".to_string();
        names[0xD5] = "Ohungarumlaut".to_string();

        let mut writer = uncompressed();
        writer.set_font_encoding(names);
        writer.add_page(595.0, 842.0).finish();
        let content = String::from_utf8_lossy(&writer.finish().unwrap()).to_string();

        assert!(content.contains("/BaseEncoding /WinAnsiEncoding"));
        assert!(content.contains("/Differences [32 /space"));
        assert!(content.contains("/Ohungarumlaut"));
    }

    #[test]
    fn test_multiple_pages_orientations() {
        let mut writer = uncompressed();
        writer.add_page(595.28, 841.89).finish();
        writer.add_page(841.89, 595.28).finish();
        assert_eq!(writer.page_count(), 2);

        let content = String::from_utf8_lossy(&writer.finish().unwrap()).to_string();
        assert!(content.contains("/Count 2"));
        assert!(content.contains("[0 0 595.28003 841.89001]"));
        assert!(content.contains("[0 0 841.89001 595.28003]"));
    }

    #[test]
    fn test_compressed_streams() {
        let mut writer = PdfWriter::new();
        {
            let mut page = writer.add_page(595.0, 842.0);
            page.content().rect(0.0, 0.0, 10.0, 10.0).stroke();
            page.finish();
        }
        let content = String::from_utf8_lossy(&writer.finish().unwrap()).to_string();
        assert!(content.contains("/Filter /FlateDecode"));
        assert!(!content.contains("0 0 10 10 re"));
    }

    #[test]
    fn test_title_metadata() {
        let config = PdfWriterConfig::default().with_title("report.csv");
        let mut writer = PdfWriter::with_config(config);
        writer.add_page(595.0, 842.0).finish();
        let content = String::from_utf8_lossy(&writer.finish().unwrap()).to_string();
        assert!(content.contains("/Title (report.csv)"));
        assert!(content.contains("/Creator (csv2pdf)"));
    }
}
