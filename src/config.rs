//! Configuration for rendering and asset staging.

use crate::writer::{Margins, Rgb};

/// Charset assumed when neither the command line nor the locale names one.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Single-byte charset the PDF fonts use for UTF-8/UTF-16 input.
pub const DEFAULT_PDF_CHARSET: &str = "iso-8859-2";

/// Maximum number of archive entries extracted at the same time.
pub const DEFAULT_MAX_CONCURRENT_EXTRACTIONS: usize = 16;

/// Style of one kind of table row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowStyle {
    /// Font size in points
    pub font_size: f32,
    /// Cell height in millimetres
    pub height: f32,
    /// Background color of filled cells
    pub fill_color: Rgb,
    /// Text color
    pub text_color: Rgb,
}

/// Table layout configuration.
///
/// Lengths are in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Header row style (bold, fully bordered, centered, always filled)
    pub header: RowStyle,
    /// Body row style (regular, left/right bordered, alternately filled)
    pub body: RowStyle,
    /// Border color
    pub draw_color: Rgb,
    /// Border line width
    pub line_width: f32,
    /// Millimetres per character of the widest body field
    pub body_char_ratio: f32,
    /// Millimetres per character of the header label
    pub header_char_ratio: f32,
    /// Summed column widths (characters) above which a part goes landscape
    pub landscape_threshold: usize,
    /// Page margins
    pub margins: Margins,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            header: RowStyle {
                font_size: 10.0,
                height: 7.0,
                fill_color: (255, 0, 0),
                text_color: (0, 0, 0),
            },
            body: RowStyle {
                font_size: 8.0,
                height: 6.0,
                fill_color: (224, 235, 255),
                text_color: (0, 0, 0),
            },
            draw_color: (128, 0, 0),
            line_width: 0.3,
            body_char_ratio: 1.75,
            header_char_ratio: 2.0,
            landscape_threshold: 190,
            margins: Margins::default(),
        }
    }
}

impl RenderConfig {
    /// Create a configuration with the default table style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-character column width ratios.
    pub fn with_char_ratios(mut self, body: f32, header: f32) -> Self {
        self.body_char_ratio = body;
        self.header_char_ratio = header;
        self
    }

    /// Set the landscape threshold.
    pub fn with_landscape_threshold(mut self, threshold: usize) -> Self {
        self.landscape_threshold = threshold;
        self
    }

    /// Set the page margins.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Set the header row style.
    pub fn with_header_style(mut self, style: RowStyle) -> Self {
        self.header = style;
        self
    }

    /// Set the body row style.
    pub fn with_body_style(mut self, style: RowStyle) -> Self {
        self.body = style;
        self
    }
}

/// Font asset staging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageConfig {
    /// Upper bound on simultaneously running extraction tasks
    pub max_concurrent_extractions: usize,
    /// Prefix of the temporary directory name
    pub temp_prefix: String,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            max_concurrent_extractions: DEFAULT_MAX_CONCURRENT_EXTRACTIONS,
            temp_prefix: "csv2pdf-font-".to_string(),
        }
    }
}

impl StageConfig {
    /// Set the extraction concurrency bound (at least 1).
    pub fn with_max_concurrent_extractions(mut self, max: usize) -> Self {
        self.max_concurrent_extractions = max.max(1);
        self
    }

    /// Set the temporary directory prefix.
    pub fn with_temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults() {
        let cfg = RenderConfig::default();
        assert_eq!(cfg.header.font_size, 10.0);
        assert_eq!(cfg.header.height, 7.0);
        assert_eq!(cfg.header.fill_color, (255, 0, 0));
        assert_eq!(cfg.body.fill_color, (224, 235, 255));
        assert_eq!(cfg.draw_color, (128, 0, 0));
        assert_eq!(cfg.landscape_threshold, 190);
    }

    #[test]
    fn test_render_builder() {
        let cfg = RenderConfig::new()
            .with_char_ratios(2.5, 3.0)
            .with_landscape_threshold(100);
        assert_eq!(cfg.body_char_ratio, 2.5);
        assert_eq!(cfg.header_char_ratio, 3.0);
        assert_eq!(cfg.landscape_threshold, 100);
    }

    #[test]
    fn test_stage_config_floor() {
        let cfg = StageConfig::default().with_max_concurrent_extractions(0);
        assert_eq!(cfg.max_concurrent_extractions, 1);
        assert_eq!(StageConfig::default().max_concurrent_extractions, 16);
    }
}
