//! CSV to PDF conversion.
//!
//! The decoded input is segmented once into [`Part`]s that own their rows;
//! every part then starts a page of its own orientation and is drawn as one
//! table. The document is serialized once, after the last part.

use crate::charset::{CharsetMap, CharsetSelection};
use crate::config::RenderConfig;
use crate::error::Result;
use crate::render::TableRenderer;
use crate::segment::{segment_str, Part};
use crate::writer::{Orientation, PdfWriter, PdfWriterConfig, TableDocument};

/// Options for one conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Table layout
    pub render: RenderConfig,
    /// Flate-compress page content
    pub compress: bool,
    /// Document title
    pub title: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            compress: true,
            title: None,
        }
    }
}

impl ConvertOptions {
    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enable or disable content compression.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Set the table layout.
    pub fn with_render_config(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }
}

/// A finished document.
#[derive(Debug, Clone)]
pub struct Converted {
    /// Serialized PDF
    pub pdf: Vec<u8>,
    /// Number of parts found in the input
    pub part_count: usize,
    /// Number of pages in the document
    pub page_count: usize,
}

/// Draw `parts` into a single PDF.
pub fn render_parts(parts: &[Part], map: &CharsetMap, options: &ConvertOptions) -> Result<Converted> {
    let mut writer_config = PdfWriterConfig::default().with_compress(options.compress);
    if let Some(title) = &options.title {
        writer_config = writer_config.with_title(title.as_str());
    }
    let mut writer = PdfWriter::with_config(writer_config);
    writer.set_font_encoding(map.glyph_names().to_vec());

    let mut doc = TableDocument::new(writer, options.render.margins);
    let renderer = TableRenderer::new(&options.render, |text: &str| map.translate(text));

    for part in parts {
        let orientation = Orientation::for_part(part, &options.render);
        log::info!(
            "head={:?}, colwidths={:?}, orientation={}",
            part.head,
            part.widths,
            orientation
        );
        doc.add_page(orientation);
        let printable_width = doc.printable_width();

        let mut rows = renderer.begin(&mut doc, &part.head, &part.widths)?;
        let table_width: f32 = rows.column_widths().iter().sum();
        if table_width > printable_width {
            log::warn!(
                "table of lines {}-{} is {:.1}mm wide and overflows the page",
                part.first_line,
                part.last_line,
                table_width
            );
        }
        for row in part.rows.iter().take(part.body_rows()) {
            rows.write_row(row.as_slice())?;
        }
    }

    let page_count = doc.page_count();
    let pdf = doc.output()?;
    log::debug!("{} parts on {} pages", parts.len(), page_count);
    Ok(Converted {
        pdf,
        part_count: parts.len(),
        page_count,
    })
}

/// Convert decoded CSV text.
pub fn convert_str(text: &str, map: &CharsetMap, options: &ConvertOptions) -> Result<Converted> {
    let parts = segment_str(text)?;
    render_parts(&parts, map, options)
}

/// Decode raw input with `charset` and convert it.
pub fn convert(
    input: &[u8],
    charset: &CharsetSelection,
    map: &CharsetMap,
    options: &ConvertOptions,
) -> Result<Converted> {
    let text = charset.decode(input);
    convert_str(&text, map, options)
}
