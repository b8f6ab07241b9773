//! Cursor-based page canvas for drawing tables.
//!
//! [`TableDocument`] keeps a current position on the current page, measured in
//! millimetres from the top-left corner, and draws fixed-size cells at it.
//! Cells that would cross the bottom margin move to a fresh page of the same
//! orientation first.

use super::content_stream::ContentStreamBuilder;
use super::font_metrics::{FontMetrics, FontStyle, HelveticaMetrics};
use super::pdf_writer::PdfWriter;
use crate::error::{Error, Result};

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// A4 page size in millimetres (portrait).
pub const A4_MM: (f32, f32) = (210.0, 297.0);

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Taller than wide
    #[default]
    Portrait,
    /// Wider than tall
    Landscape,
}

impl Orientation {
    /// A4 page size in millimetres for this orientation.
    pub fn page_size(&self) -> (f32, f32) {
        match self {
            Orientation::Portrait => A4_MM,
            Orientation::Landscape => (A4_MM.1, A4_MM.0),
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Landscape => write!(f, "landscape"),
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    /// Left margin
    pub left: f32,
    /// Top margin
    pub top: f32,
    /// Right margin
    pub right: f32,
    /// Distance from the bottom edge that triggers a page break
    pub bottom: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 10.0,
            top: 10.0,
            right: 10.0,
            bottom: 20.0,
        }
    }
}

/// Which cell edges get a border line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Borders {
    /// Left edge
    pub left: bool,
    /// Top edge
    pub top: bool,
    /// Right edge
    pub right: bool,
    /// Bottom edge
    pub bottom: bool,
}

impl Borders {
    /// No borders.
    pub const NONE: Borders = Borders {
        left: false,
        top: false,
        right: false,
        bottom: false,
    };

    /// Full frame.
    pub const ALL: Borders = Borders {
        left: true,
        top: true,
        right: true,
        bottom: true,
    };

    /// Left and right edges only.
    pub const VERTICAL: Borders = Borders {
        left: true,
        top: false,
        right: true,
        bottom: false,
    };

    /// Whether every edge is drawn.
    pub fn is_all(&self) -> bool {
        self.left && self.top && self.right && self.bottom
    }
}

/// Horizontal alignment of cell text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellAlign {
    /// Align to the left
    #[default]
    Left,
    /// Center horizontally
    Center,
    /// Align to the right
    Right,
}

/// RGB color with 0-255 components.
pub type Rgb = (u8, u8, u8);

fn unit_rgb(color: Rgb) -> (f32, f32, f32) {
    (
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
    )
}

/// Graphics parameters already emitted into the current page.
#[derive(Debug, Default)]
struct EmittedState {
    line_width: Option<f32>,
    draw_color: Option<Rgb>,
}

/// Cursor-based document canvas.
pub struct TableDocument {
    writer: PdfWriter,
    margins: Margins,
    orientation: Orientation,
    page_size: (f32, f32),
    has_page: bool,
    x: f32,
    y: f32,
    font_style: FontStyle,
    font_size: f32,
    fill_color: Rgb,
    draw_color: Rgb,
    text_color: Rgb,
    line_width: f32,
    emitted: EmittedState,
}

impl TableDocument {
    /// Wrap a writer. No page exists until [`TableDocument::add_page`].
    pub fn new(writer: PdfWriter, margins: Margins) -> Self {
        Self {
            writer,
            margins,
            orientation: Orientation::Portrait,
            page_size: A4_MM,
            has_page: false,
            x: margins.left,
            y: margins.top,
            font_style: FontStyle::Regular,
            font_size: 12.0,
            fill_color: (255, 255, 255),
            draw_color: (0, 0, 0),
            text_color: (0, 0, 0),
            line_width: 0.2,
            emitted: EmittedState::default(),
        }
    }

    /// Start a new page and move the cursor to its top-left margin corner.
    pub fn add_page(&mut self, orientation: Orientation) {
        let (w, h) = orientation.page_size();
        self.writer.add_page(w * PT_PER_MM, h * PT_PER_MM).finish();
        self.orientation = orientation;
        self.page_size = (w, h);
        self.has_page = true;
        self.x = self.margins.left;
        self.y = self.margins.top;
        self.emitted = EmittedState::default();
    }

    /// Select font style and size in points.
    pub fn set_font(&mut self, style: FontStyle, size: f32) {
        self.font_style = style;
        self.font_size = size;
    }

    /// Color used to fill cell backgrounds.
    pub fn set_fill_color(&mut self, color: Rgb) {
        self.fill_color = color;
    }

    /// Color used for borders.
    pub fn set_draw_color(&mut self, color: Rgb) {
        self.draw_color = color;
    }

    /// Color used for text.
    pub fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    /// Border line width in millimetres.
    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    /// Current cursor position in millimetres.
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Orientation of the current page.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Width available between the left and right margins.
    pub fn printable_width(&self) -> f32 {
        self.page_size.0 - self.margins.left - self.margins.right
    }

    /// Number of pages started so far.
    pub fn page_count(&self) -> usize {
        self.writer.page_count()
    }

    fn content(&mut self) -> Result<&mut ContentStreamBuilder> {
        self.writer
            .last_page_content()
            .ok_or_else(|| Error::Pdf("cannot draw before the first page".to_string()))
    }

    fn sync_stroke_state(&mut self) -> Result<()> {
        let width = self.line_width;
        let color = self.draw_color;
        let emit_width = self.emitted.line_width != Some(width);
        let emit_color = self.emitted.draw_color != Some(color);
        let content = self.content()?;
        if emit_width {
            content.set_line_width(width * PT_PER_MM);
        }
        if emit_color {
            let (r, g, b) = unit_rgb(color);
            content.set_stroke_color(r, g, b);
        }
        self.emitted.line_width = Some(width);
        self.emitted.draw_color = Some(color);
        Ok(())
    }

    /// Draw a cell of `w` x `h` millimetres at the cursor and advance the
    /// cursor to its right edge.
    ///
    /// `text` must already be in the fonts' single-byte encoding.
    pub fn cell(
        &mut self,
        w: f32,
        h: f32,
        text: &[u8],
        borders: Borders,
        align: CellAlign,
        fill: bool,
    ) -> Result<()> {
        if !self.has_page {
            return Err(Error::Pdf("cannot draw before the first page".to_string()));
        }
        if self.y + h > self.page_size.1 - self.margins.bottom && self.y > self.margins.top {
            let x = self.x;
            log::debug!("page break at y={:.1}mm", self.y);
            self.add_page(self.orientation);
            self.x = x;
        }

        let k = PT_PER_MM;
        let page_h = self.page_size.1;
        let (x, y) = (self.x, self.y);
        let (left, bottom) = (x * k, (page_h - y - h) * k);
        let (right, top) = ((x + w) * k, (page_h - y) * k);

        let draw_frame = borders.is_all();
        let draw_edges = borders != Borders::NONE && !draw_frame;
        if draw_frame || draw_edges {
            self.sync_stroke_state()?;
        }

        let fill_rgb = unit_rgb(self.fill_color);
        let content = self.content()?;
        if fill || draw_frame {
            if fill {
                content.set_fill_color(fill_rgb.0, fill_rgb.1, fill_rgb.2);
            }
            content.rect(left, bottom, right - left, top - bottom);
            match (fill, draw_frame) {
                (true, true) => content.fill_stroke(),
                (true, false) => content.fill(),
                _ => content.stroke(),
            };
        }
        if draw_edges {
            if borders.left {
                content.move_to(left, top).line_to(left, bottom);
            }
            if borders.top {
                content.move_to(left, top).line_to(right, top);
            }
            if borders.right {
                content.move_to(right, top).line_to(right, bottom);
            }
            if borders.bottom {
                content.move_to(left, bottom).line_to(right, bottom);
            }
            content.stroke();
        }

        if !text.is_empty() {
            // Inner horizontal padding, as a fraction of the left margin
            let pad = self.margins.left / 10.0;
            let metrics = HelveticaMetrics::new(self.font_style);
            let text_w = metrics.text_width(text, self.font_size) / k;
            let text_x = match align {
                CellAlign::Left => x + pad,
                CellAlign::Center => x + (w - text_w) / 2.0,
                CellAlign::Right => x + w - pad - text_w,
            };
            let baseline = y + 0.5 * h + 0.3 * (self.font_size / k);

            let (r, g, b) = unit_rgb(self.text_color);
            let (style, size) = (self.font_style, self.font_size);
            let content = self.content()?;
            content
                .save_state()
                .set_fill_color(r, g, b)
                .set_font(style.resource_name(), size)
                .text(text, text_x * k, (page_h - baseline) * k)
                .end_text()
                .restore_state();
        }

        self.x += w;
        Ok(())
    }

    /// Line break: cursor back to the left margin, `h` millimetres down.
    pub fn ln(&mut self, h: f32) {
        self.x = self.margins.left;
        self.y += h;
    }

    /// Serialize the finished document.
    pub fn output(self) -> Result<Vec<u8>> {
        self.writer.finish()
    }
}
