//! Text renderer configuration types.

use serde::{Deserialize, Serialize};

/// Glyph set used for decorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphMode {
    #[default]
    Unicode,
    Ascii,
}

/// Configuration for rendering parse results as terminal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextRenderConfig {
    /// Glyph mode (Unicode decorations vs ASCII fallback).
    pub glyph_mode: GlyphMode,
    /// Width of separators and heading underlines, in columns.
    pub width: usize,
    /// Columns of indentation per nested container.
    pub indent: usize,
    /// Gap units rendered as one blank line.
    pub gap_unit: f32,
    /// Render spacer gaps as blank lines.
    pub show_gaps: bool,
    /// Append a numbered list of buttons and links.
    pub show_actions: bool,
    /// Keep button labels on one line.
    pub non_breaking_labels: bool,
}

impl Default for TextRenderConfig {
    fn default() -> Self {
        Self {
            glyph_mode: GlyphMode::Unicode,
            width: 40,
            indent: 2,
            gap_unit: 10.0,
            show_gaps: true,
            show_actions: true,
            non_breaking_labels: false,
        }
    }
}

impl TextRenderConfig {
    /// ASCII-only output for terminals without Unicode support.
    #[must_use]
    pub fn ascii() -> Self {
        Self {
            glyph_mode: GlyphMode::Ascii,
            ..Self::default()
        }
    }

    /// Blank lines standing in for a gap of `height` units.
    #[must_use]
    pub fn gap_lines(&self, height: f32) -> usize {
        if !self.show_gaps || !height.is_finite() || height <= 0.0 {
            return 0;
        }
        if self.gap_unit <= 0.0 {
            return 1;
        }
        let lines = (height / self.gap_unit).round();
        if lines < 1.0 { 1 } else { lines as usize }
    }
}
