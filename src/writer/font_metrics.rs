//! Advance widths for the standard fonts used by the table writer.
//!
//! Widths are standard PostScript/PDF metrics in units of 1/1000 em, taken
//! from the Helvetica and Helvetica-Bold AFM files for the printable ASCII
//! range. Text arrives already translated to the single-byte PDF charset, so
//! bytes outside ASCII use the average lowercase width.

/// Trait for font metrics needed for layout.
pub trait FontMetrics {
    /// Width of encoded text in points.
    fn text_width(&self, encoded: &[u8], font_size: f32) -> f32;
}

/// Standard font styles available to the table writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    /// Helvetica
    #[default]
    Regular,
    /// Helvetica-Bold
    Bold,
}

impl FontStyle {
    /// PDF base font name.
    pub fn base_font(&self) -> &'static str {
        match self {
            FontStyle::Regular => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
        }
    }

    /// Page resource name used in content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
        }
    }

    /// All styles, in resource order.
    pub fn all() -> [FontStyle; 2] {
        [FontStyle::Regular, FontStyle::Bold]
    }
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p'..'~'
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Metrics for the Helvetica family.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMetrics {
    style: FontStyle,
}

impl HelveticaMetrics {
    /// Metrics for the given style.
    pub fn new(style: FontStyle) -> Self {
        Self { style }
    }

    /// Width of a single byte code in 1/1000 em.
    pub fn code_width(&self, code: u8) -> f32 {
        let table = match self.style {
            FontStyle::Regular => &HELVETICA_WIDTHS,
            FontStyle::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        match code {
            0x20..=0x7E => table[(code - 0x20) as usize] as f32,
            0x00..=0x1F => 0.0,
            _ => 556.0,
        }
    }
}

impl FontMetrics for HelveticaMetrics {
    fn text_width(&self, encoded: &[u8], font_size: f32) -> f32 {
        let units: f32 = encoded.iter().map(|&c| self.code_width(c)).sum();
        units * font_size / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_widths() {
        let regular = HelveticaMetrics::new(FontStyle::Regular);
        assert_eq!(regular.code_width(b' '), 278.0);
        assert_eq!(regular.code_width(b'W'), 944.0);
        assert_eq!(regular.code_width(b'i'), 222.0);
        assert_eq!(regular.code_width(b'~'), 584.0);

        let bold = HelveticaMetrics::new(FontStyle::Bold);
        assert_eq!(bold.code_width(b'i'), 278.0);
        assert_eq!(bold.code_width(b'b'), 611.0);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let m = HelveticaMetrics::new(FontStyle::Regular);
        // "ab" = 556 + 556 units
        assert!((m.text_width(b"ab", 10.0) - 11.12).abs() < 1e-4);
        assert!((m.text_width(b"ab", 20.0) - 22.24).abs() < 1e-4);
        assert_eq!(m.text_width(b"", 10.0), 0.0);
    }

    #[test]
    fn test_high_bytes_use_average_width() {
        let m = HelveticaMetrics::new(FontStyle::Bold);
        assert_eq!(m.code_width(0xD5), 556.0);
        assert_eq!(m.code_width(0x0A), 0.0);
    }

    #[test]
    fn test_font_style_names() {
        assert_eq!(FontStyle::Bold.base_font(), "Helvetica-Bold");
        assert_eq!(FontStyle::Regular.resource_name(), "F1");
        assert_eq!(FontStyle::all().len(), 2);
    }
}
