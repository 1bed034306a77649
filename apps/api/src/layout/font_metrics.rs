//! Static font-metric tables for the PDF standard fonts used by programme themes.
//!
//! Widths are in em units (AFM glyph widths ÷ 1000) and cover ASCII 0x20..=0x7E
//! (95 printable characters). Index = (char as usize) - 32. Kerning and ligatures
//! are ignored; both the preview reflow and the PDF renderer wrap with these tables,
//! so the two agree on where lines break even where they disagree with a browser.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

/// The standard PDF fonts referenced by the theme table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FontFamily {
    /// Serif body face (classic, forest themes).
    TimesRoman,
    /// Bold serif (drama theme, serif headings).
    TimesBold,
    /// Sans-serif (spy theme).
    Helvetica,
    /// Bold sans-serif (arabian theme, sans headings).
    HelveticaBold,
    /// Monospace (fairy theme).
    Courier,
}

impl FontFamily {
    pub const ALL: [FontFamily; 5] = [
        FontFamily::TimesRoman,
        FontFamily::TimesBold,
        FontFamily::Helvetica,
        FontFamily::HelveticaBold,
        FontFamily::Courier,
    ];

    /// PostScript name written into the PDF font dictionary.
    pub fn base_font(self) -> &'static str {
        match self {
            FontFamily::TimesRoman => "Times-Roman",
            FontFamily::TimesBold => "Times-Bold",
            FontFamily::Helvetica => "Helvetica",
            FontFamily::HelveticaBold => "Helvetica-Bold",
            FontFamily::Courier => "Courier",
        }
    }

    /// Resource name used in page content streams (`/F1 12 Tf`).
    pub fn resource_name(self) -> &'static str {
        match self {
            FontFamily::TimesRoman => "F1",
            FontFamily::TimesBold => "F2",
            FontFamily::Helvetica => "F3",
            FontFamily::HelveticaBold => "F4",
            FontFamily::Courier => "F5",
        }
    }

    /// Bold face of the same family. Courier has no bold table and maps to itself.
    pub fn bold(self) -> FontFamily {
        match self {
            FontFamily::TimesRoman | FontFamily::TimesBold => FontFamily::TimesBold,
            FontFamily::Helvetica | FontFamily::HelveticaBold => FontFamily::HelveticaBold,
            FontFamily::Courier => FontFamily::Courier,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font family.
///
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
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
    pub space_width: f32,
}

/// One line produced by [`FontMetricTable::wrap`].
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    /// Rendered width of `text` in em units.
    pub width_em: f32,
}

impl FontMetricTable {
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }

    /// Measures the rendered width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Greedy word wrap at `max_width_em`. Whitespace runs collapse to one space.
    ///
    /// With `break_words`, a word wider than the line is split between characters
    /// (CSS `word-wrap: break-word`); otherwise it stays whole and the line's
    /// `width_em` exceeds the limit. Empty input yields no lines.
    pub fn wrap(&self, text: &str, max_width_em: f32, break_words: bool) -> Vec<WrappedLine> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in text.split_whitespace() {
            let word_w = self.measure_str(word);

            if !current.is_empty() {
                if current_width + self.space_width + word_w <= max_width_em {
                    current.push(' ');
                    current.push_str(word);
                    current_width += self.space_width + word_w;
                    continue;
                }
                lines.push(WrappedLine {
                    text: std::mem::take(&mut current),
                    width_em: current_width,
                });
                current_width = 0.0;
            }

            if break_words && word_w > max_width_em {
                for ch in word.chars() {
                    let ch_w = self.char_width(ch);
                    if !current.is_empty() && current_width + ch_w > max_width_em {
                        lines.push(WrappedLine {
                            text: std::mem::take(&mut current),
                            width_em: current_width,
                        });
                        current_width = 0.0;
                    }
                    current.push(ch);
                    current_width += ch_w;
                }
            } else {
                current.push_str(word);
                current_width = word_w;
            }
        }

        if !current.is_empty() {
            lines.push(WrappedLine {
                text: current,
                width_em: current_width,
            });
        }
        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static TIMES_ROMAN_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.250, 0.333, 0.408, 0.500, 0.500, 0.833, 0.778, 0.180, 0.333, 0.333, 0.500, 0.564, 0.250, 0.333, 0.250, 0.278,
        // 0-9
        0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.564, 0.564, 0.564, 0.444, 0.921,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.667, 0.667, 0.722, 0.611, 0.556, 0.722, 0.722, 0.333, 0.389, 0.722, 0.611, 0.889,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.722, 0.556, 0.722, 0.667, 0.556, 0.611, 0.722, 0.722, 0.944, 0.722, 0.722, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.469, 0.500, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.444, 0.500, 0.444, 0.500, 0.444, 0.333, 0.500, 0.500, 0.278, 0.278, 0.500, 0.278, 0.778,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.500, 0.500, 0.500, 0.500, 0.333, 0.389, 0.278, 0.500, 0.500, 0.722, 0.500, 0.500, 0.444,
        // {      |      }      ~
        0.480, 0.200, 0.480, 0.541,
    ],
    average_char_width: 0.46,
    space_width: 0.250,
};

static TIMES_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.250, 0.333, 0.555, 0.500, 0.500, 1.000, 0.833, 0.278, 0.333, 0.333, 0.500, 0.570, 0.250, 0.333, 0.250, 0.278,
        // 0-9
        0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500, 0.500,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.570, 0.570, 0.570, 0.500, 0.930,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.778, 0.389, 0.500, 0.778, 0.667, 0.944,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.611, 0.778, 0.722, 0.556, 0.667, 0.722, 0.722, 1.000, 0.722, 0.722, 0.667,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.581, 0.500, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.500, 0.556, 0.444, 0.556, 0.444, 0.333, 0.500, 0.556, 0.278, 0.333, 0.556, 0.278, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.500, 0.556, 0.556, 0.444, 0.389, 0.333, 0.556, 0.500, 0.722, 0.500, 0.500, 0.444,
        // {      |      }      ~
        0.394, 0.220, 0.394, 0.520,
    ],
    average_char_width: 0.49,
    space_width: 0.250,
};

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0-9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.52,
    space_width: 0.278,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0-9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.56,
    space_width: 0.278,
};

/// Courier is monospaced: every glyph is 600 units.
static COURIER_TABLE: FontMetricTable = FontMetricTable {
    widths: [0.600; 95],
    average_char_width: 0.600,
    space_width: 0.600,
};

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::TimesRoman => &TIMES_ROMAN_TABLE,
        FontFamily::TimesBold => &TIMES_BOLD_TABLE,
        FontFamily::Helvetica => &HELVETICA_TABLE,
        FontFamily::HelveticaBold => &HELVETICA_BOLD_TABLE,
        FontFamily::Courier => &COURIER_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        let metrics = get_metrics(FontFamily::TimesRoman);
        assert_eq!(metrics.measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        let metrics = get_metrics(FontFamily::Helvetica);
        // H 0.722 + a 0.556 + m 0.833 + l 0.222 + e 0.556 + t 0.278
        let width = metrics.measure_str("Hamlet");
        assert!(
            (width - 3.167).abs() < 1e-3,
            "Hamlet width should be ~3.167, got {width}"
        );
    }

    #[test]
    fn test_measure_str_non_ascii_falls_back() {
        let metrics = get_metrics(FontFamily::TimesRoman);
        let width = metrics.measure_str("é");
        assert!((width - metrics.average_char_width).abs() < 1e-4);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let metrics = get_metrics(FontFamily::Courier);
        assert!((metrics.measure_str("iiii") - metrics.measure_str("MMMM")).abs() < 1e-6);
    }

    #[test]
    fn test_bold_is_wider_than_roman() {
        let text = "The Importance of Being Earnest";
        let roman = get_metrics(FontFamily::TimesRoman).measure_str(text);
        let bold = get_metrics(FontFamily::TimesBold).measure_str(text);
        assert!(bold > roman);
    }

    #[test]
    fn test_wrap_empty_text_has_no_lines() {
        let metrics = get_metrics(FontFamily::TimesRoman);
        assert!(metrics.wrap("   ", 20.0, true).is_empty());
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        let metrics = get_metrics(FontFamily::TimesRoman);
        let lines = metrics.wrap("Act One", 20.0, false);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Act One");
    }

    #[test]
    fn test_wrap_respects_width() {
        let metrics = get_metrics(FontFamily::TimesRoman);
        let text = "word ".repeat(40);
        let lines = metrics.wrap(&text, 10.0, false);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width_em <= 10.0 + 1e-4, "line too wide: {line:?}");
        }
    }

    #[test]
    fn test_wrap_long_word_without_breaking_overflows() {
        let metrics = get_metrics(FontFamily::Courier);
        let lines = metrics.wrap(&"x".repeat(30), 6.0, false);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].width_em > 6.0);
    }

    #[test]
    fn test_wrap_long_word_with_breaking_splits() {
        let metrics = get_metrics(FontFamily::Courier);
        // 30 glyphs × 0.6em = 18em; 10 glyphs fit per 6.3em line.
        let lines = metrics.wrap(&"x".repeat(30), 6.3, true);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.width_em <= 6.3));
    }

    #[test]
    fn test_resource_names_are_unique() {
        let mut names: Vec<&str> = FontFamily::ALL.iter().map(|f| f.resource_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), FontFamily::ALL.len());
    }
}
