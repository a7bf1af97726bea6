//! Static font-metric tables for the two preview font families, plus the
//! A4 page geometry the preview lays content into.
//!
//! Character widths are in em units (relative to font size). Latin glyphs
//! use a per-character table covering ASCII 0x20..=0x7E (index = code - 32);
//! Hangul, CJK and full-width forms use a single wide width; anything else
//! falls back to the family's average width. The tables are an estimate of
//! what the browser will do, good enough to decide page breaks.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Default body font. Its Latin glyphs follow Inter.
    Pretendard,
    /// Serif option for cover letters.
    NotoSerifKr,
}

// ────────────────────────────────────────────────────────────────────────────
// Page geometry
// ────────────────────────────────────────────────────────────────────────────

/// Page frame in CSS pixels (96 dpi).
///
/// A4 is 210mm × 297mm → 793.7px × 1122.5px, rounded to 794 × 1123.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_px: f32,
    pub height_px: f32,
    /// Inner padding on all four sides (`.page-content`).
    pub padding_px: f32,
    pub font: FontFamily,
    pub font_size_px: f32,
    pub line_height: f32,
}

/// A4 with 15mm padding, 11pt (14.67px) Pretendard at 1.6 line height.
pub fn a4_geometry(font: FontFamily) -> PageGeometry {
    PageGeometry {
        width_px: 794.0,
        height_px: 1123.0,
        padding_px: 56.0,
        font,
        font_size_px: 14.67,
        line_height: 1.6,
    }
}

impl PageGeometry {
    pub fn content_width_px(&self) -> f32 {
        self.width_px - 2.0 * self.padding_px
    }

    pub fn content_height_px(&self) -> f32 {
        self.height_px - 2.0 * self.padding_px
    }

    /// Usable line width in em at `scale` × the body font size.
    pub fn text_width_em(&self, scale: f32) -> f32 {
        self.content_width_px() / (self.font_size_px * scale)
    }

    /// Height of one rendered line at `scale` × the body font size.
    pub fn line_px(&self, scale: f32) -> f32 {
        self.font_size_px * scale * self.line_height
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub font: FontFamily,
    widths: [f32; 95],
    /// Hangul syllables, CJK ideographs, kana and full-width forms.
    pub wide_char_width: f32,
    pub average_char_width: f32,
    pub space_width: f32,
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x11FF       // Hangul Jamo
        | 0x3000..=0x30FF     // CJK punctuation, kana
        | 0x3130..=0x318F     // Hangul compatibility Jamo
        | 0x4E00..=0x9FFF     // CJK unified ideographs
        | 0xAC00..=0xD7A3     // Hangul syllables
        | 0xFF00..=0xFF60)    // full-width forms
}

impl FontMetricTable {
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else if is_wide(c) {
            self.wide_char_width
        } else {
            self.average_char_width
        }
    }

    /// Rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Lines the text occupies when word-wrapped at `max_width_em`.
    ///
    /// Greedy wrap on whitespace; a single word wider than the line breaks
    /// across as many lines as it needs, the way the browser breaks long
    /// Hangul runs and URLs.
    pub fn estimated_lines(&self, s: &str, max_width_em: f32) -> u32 {
        let words: Vec<&str> = s.split_whitespace().collect();
        if words.is_empty() || max_width_em <= 0.0 {
            return 0;
        }
        let mut line_count = 1u32;
        let mut current_width = 0.0_f32;
        let mut first = true;

        for word in &words {
            let word_w = self.measure_str(word);
            let space_w = if first { 0.0 } else { self.space_width };

            if word_w > max_width_em {
                if !first {
                    line_count += 1;
                }
                let spill = (word_w / max_width_em).ceil() as u32;
                line_count += spill - 1;
                current_width = word_w - (spill - 1) as f32 * max_width_em;
            } else if !first && current_width + space_w + word_w > max_width_em {
                line_count += 1;
                current_width = word_w;
            } else {
                current_width += space_w + word_w;
            }
            first = false;
        }
        line_count
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static PRETENDARD_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::Pretendard,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    wide_char_width: 0.92,
    average_char_width: 0.56,
    space_width: 0.25,
};

static NOTO_SERIF_KR_TABLE: FontMetricTable = FontMetricTable {
    font: FontFamily::NotoSerifKr,
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.29, 0.37, 0.54, 0.54, 0.85, 0.64, 0.22, 0.32, 0.32, 0.38, 0.57, 0.27, 0.32, 0.27, 0.30,
        // 0     1     2     3     4     5     6     7     8     9
        0.54, 0.54, 0.54, 0.54, 0.54, 0.54, 0.54, 0.54, 0.54, 0.54,
        // :     ;     <     =     >     ?     @
        0.27, 0.27, 0.57, 0.57, 0.57, 0.48, 0.98,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.64, 0.59, 0.59, 0.64, 0.54, 0.48, 0.64, 0.64, 0.25, 0.38, 0.59, 0.51, 0.75,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.64, 0.69, 0.54, 0.69, 0.59, 0.48, 0.54, 0.64, 0.64, 0.85, 0.59, 0.59, 0.54,
        // [     \     ]     ^     _     `
        0.27, 0.30, 0.27, 0.45, 0.54, 0.33,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.54, 0.54, 0.48, 0.54, 0.54, 0.30, 0.54, 0.54, 0.22, 0.22, 0.51, 0.22, 0.80,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.54, 0.54, 0.54, 0.54, 0.32, 0.43, 0.38, 0.54, 0.48, 0.69, 0.48, 0.48, 0.43,
        // {     |     }     ~
        0.32, 0.25, 0.32, 0.57,
    ],
    wide_char_width: 0.96,
    average_char_width: 0.54,
    space_width: 0.25,
};

pub fn get_metrics(font: FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Pretendard => &PRETENDARD_TABLE,
        FontFamily::NotoSerifKr => &NOTO_SERIF_KR_TABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(get_metrics(FontFamily::Pretendard).measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        let metrics = get_metrics(FontFamily::Pretendard);
        // "Rust" = R(0.61) + u(0.56) + s(0.44) + t(0.39) = 2.00
        let width = metrics.measure_str("Rust");
        assert!((width - 2.00).abs() < 1e-3, "Rust width should be ~2.00, got {width}");
    }

    #[test]
    fn test_hangul_uses_wide_width() {
        let metrics = get_metrics(FontFamily::Pretendard);
        let width = metrics.measure_str("경력");
        assert!((width - 2.0 * metrics.wide_char_width).abs() < 1e-4);
        let other = metrics.measure_str("é");
        assert!((other - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_estimated_lines_wraps() {
        let metrics = get_metrics(FontFamily::Pretendard);
        assert_eq!(metrics.estimated_lines("", 10.0), 0);
        assert_eq!(metrics.estimated_lines("Rust", 10.0), 1);
        // Each "word" is 4 × 0.56 = 2.24em; four per 10em line.
        let text = "word ".repeat(8);
        assert_eq!(metrics.estimated_lines(&text, 10.0), 2);
    }

    #[test]
    fn test_long_unbroken_run_spills() {
        let metrics = get_metrics(FontFamily::Pretendard);
        // 20 Hangul syllables ≈ 18.4em → two 10em lines.
        let run = "가".repeat(20);
        assert_eq!(metrics.estimated_lines(&run, 10.0), 2);
        assert_eq!(metrics.estimated_lines(&format!("a {run}"), 10.0), 3);
    }

    #[test]
    fn test_a4_geometry() {
        let geo = a4_geometry(FontFamily::Pretendard);
        assert_eq!(geo.content_width_px(), 682.0);
        assert_eq!(geo.content_height_px(), 1011.0);
        assert!(geo.text_width_em(1.0) > 40.0 && geo.text_width_em(1.0) < 50.0);
        assert!(geo.line_px(1.0) > 23.0 && geo.line_px(1.0) < 24.0);
    }
}
