//! Table rendering.
//!
//! [`TableRenderer::begin`] draws a part's header row and hands back a
//! [`RowWriter`] that draws body rows under it, alternating the background
//! fill from one row to the next.

use crate::config::RenderConfig;
use crate::error::Result;
use crate::segment::Part;
use crate::writer::{Borders, CellAlign, FontStyle, Orientation, TableDocument};

impl Orientation {
    /// Orientation for a part: landscape once the summed display widths
    /// exceed the configured threshold.
    pub fn for_part(part: &Part, config: &RenderConfig) -> Self {
        Self::for_total_width(part.total_width(), config)
    }

    /// Orientation for a summed column width.
    pub fn for_total_width(total: usize, config: &RenderConfig) -> Self {
        if total > config.landscape_threshold {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Cell widths in millimetres for a header and its body width statistics.
pub fn column_widths(head: &[String], widths: &[usize], config: &RenderConfig) -> Vec<f32> {
    head.iter()
        .zip(widths)
        .map(|(label, &w)| {
            let body = w as f32 * config.body_char_ratio;
            let header = label.chars().count() as f32 * config.header_char_ratio;
            body.max(header)
        })
        .collect()
}

/// Draws tables into a [`TableDocument`].
pub struct TableRenderer<'a, T>
where
    T: Fn(&str) -> Vec<u8>,
{
    config: &'a RenderConfig,
    translate: T,
}

impl<'a, T> TableRenderer<'a, T>
where
    T: Fn(&str) -> Vec<u8>,
{
    /// Create a renderer; `translate` encodes text for the PDF fonts.
    pub fn new(config: &'a RenderConfig, translate: T) -> Self {
        Self { config, translate }
    }

    /// Draw the header row at the cursor and return the body row writer.
    pub fn begin<'d>(
        &'d self,
        doc: &'d mut TableDocument,
        head: &[String],
        widths: &[usize],
    ) -> Result<RowWriter<'d, 'a, T>> {
        let cfg = self.config;
        let col_widths = column_widths(head, widths, cfg);

        doc.set_fill_color(cfg.header.fill_color);
        doc.set_text_color(cfg.header.text_color);
        doc.set_draw_color(cfg.draw_color);
        doc.set_line_width(cfg.line_width);
        doc.set_font(FontStyle::Bold, cfg.header.font_size);
        for (label, &w) in head.iter().zip(&col_widths) {
            doc.cell(
                w,
                cfg.header.height,
                &(self.translate)(label),
                Borders::ALL,
                CellAlign::Center,
                true,
            )?;
        }
        doc.ln(cfg.header.height);

        doc.set_fill_color(cfg.body.fill_color);
        doc.set_text_color(cfg.body.text_color);
        doc.set_font(FontStyle::Regular, cfg.body.font_size);

        Ok(RowWriter {
            renderer: self,
            doc,
            col_widths,
            fill: false,
        })
    }
}

/// Draws body rows; the only state is the fill toggle.
pub struct RowWriter<'d, 'a, T>
where
    T: Fn(&str) -> Vec<u8>,
{
    renderer: &'d TableRenderer<'a, T>,
    doc: &'d mut TableDocument,
    col_widths: Vec<f32>,
    fill: bool,
}

impl<'d, 'a, T> RowWriter<'d, 'a, T>
where
    T: Fn(&str) -> Vec<u8>,
{
    /// Draw one record as a row.
    ///
    /// Fields beyond the header's column count are dropped.
    pub fn write_row<S: AsRef<str>>(&mut self, record: &[S]) -> Result<()> {
        let height = self.renderer.config.body.height;
        if record.len() > self.col_widths.len() {
            log::warn!(
                "record has {} fields, table has {} columns; extra fields dropped",
                record.len(),
                self.col_widths.len()
            );
        }
        for (field, &w) in record.iter().zip(&self.col_widths) {
            let encoded = (self.renderer.translate)(field.as_ref());
            self.doc
                .cell(w, height, &encoded, Borders::VERTICAL, CellAlign::Left, self.fill)?;
        }
        self.doc.ln(height);
        self.fill = !self.fill;
        Ok(())
    }

    /// Cell widths used for this table, in millimetres.
    pub fn column_widths(&self) -> &[f32] {
        &self.col_widths
    }

    /// Whether the next row will be filled.
    pub fn next_row_filled(&self) -> bool {
        self.fill
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segment_str;
    use crate::writer::{Margins, PdfWriter, PdfWriterConfig};

    fn ascii(text: &str) -> Vec<u8> {
        text.bytes().map(|b| if b.is_ascii() { b } else { b'.' }).collect()
    }

    fn doc() -> TableDocument {
        let writer = PdfWriter::with_config(PdfWriterConfig::default().with_compress(false));
        TableDocument::new(writer, Margins::default())
    }

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_column_widths() {
        let cfg = RenderConfig::default();
        let widths = column_widths(&s(&["id", "description"]), &[10, 3], &cfg);
        assert_eq!(widths, vec![17.5, 22.0]);
    }

    #[test]
    fn test_orientation_threshold() {
        let cfg = RenderConfig::default();
        assert_eq!(Orientation::for_total_width(190, &cfg), Orientation::Portrait);
        assert_eq!(Orientation::for_total_width(191, &cfg), Orientation::Landscape);

        let parts = segment_str("a;b\n1;2\n").unwrap();
        assert_eq!(Orientation::for_part(&parts[0], &cfg), Orientation::Portrait);
    }

    #[test]
    fn test_fill_toggle_alternates() {
        let cfg = RenderConfig::default();
        let renderer = TableRenderer::new(&cfg, ascii);
        let mut d = doc();
        d.add_page(Orientation::Portrait);

        let mut rows = renderer.begin(&mut d, &s(&["a", "b"]), &[1, 1]).unwrap();
        assert_eq!(rows.column_widths(), &[2.0, 2.0]);
        assert!(!rows.next_row_filled());
        rows.write_row(&["1", "2"]).unwrap();
        assert!(rows.next_row_filled());
        rows.write_row(&["3", "4"]).unwrap();
        assert!(!rows.next_row_filled());
    }

    #[test]
    fn test_cursor_after_header_and_rows() {
        let cfg = RenderConfig::default();
        let renderer = TableRenderer::new(&cfg, ascii);
        let mut d = doc();
        d.add_page(Orientation::Portrait);
        {
            let mut rows = renderer.begin(&mut d, &s(&["a"]), &[4]).unwrap();
            rows.write_row(&["x"]).unwrap();
            rows.write_row(&["y", "dropped"]).unwrap();
        }
        // 10mm top margin + 7mm header + 2 x 6mm rows
        assert_eq!(d.position(), (10.0, 29.0));
    }

    #[test]
    fn test_header_drawn_bold_and_translated() {
        let cfg = RenderConfig::default();
        let renderer = TableRenderer::new(&cfg, ascii);
        let mut d = doc();
        d.add_page(Orientation::Portrait);
        {
            let mut rows = renderer.begin(&mut d, &s(&["név"]), &[3]).unwrap();
            rows.write_row(&["ő"]).unwrap();
        }
        let pdf = String::from_utf8_lossy(&d.output().unwrap()).to_string();
        assert!(pdf.contains("/F2 10 Tf"));
        assert!(pdf.contains("/F1 8 Tf"));
        assert!(pdf.contains("(n..v) Tj"));
        assert!(pdf.contains("1 0 0 rg"));
    }
}
