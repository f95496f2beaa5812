//! Glyph widths of the standard Helvetica faces, for measuring and wrapping.
//!
//! Widths are in 1/1000 em for the printable ASCII range (WinAnsi code points
//! 32..=126). Anything outside that range is drawn as `?`.

const FIRST: u8 = 32;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    pub const ALL: [Font; 2] = [Font::Regular, Font::Bold];

    pub(crate) fn base_font(self) -> &'static [u8] {
        match self {
            Font::Regular => b"Helvetica",
            Font::Bold => b"Helvetica-Bold",
        }
    }

    /// Resource name used inside page content streams.
    pub(crate) fn resource_name(self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
        }
    }

    fn table(self) -> &'static [u16; 95] {
        match self {
            Font::Regular => &HELVETICA,
            Font::Bold => &HELVETICA_BOLD,
        }
    }

    /// Width of `text` set at `size` points.
    pub fn width(self, text: &str, size: f32) -> f32 {
        let table = self.table();
        let units: u32 = encode(text)
            .iter()
            .map(|b| u32::from(table[usize::from(b - FIRST)]))
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Single-byte encoding of `text` for a standard font; unsupported characters
/// become `?`.
pub(crate) fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u8::try_from(c) {
            Ok(b) if (FIRST..=126).contains(&b) => b,
            _ if c.is_whitespace() => b' ',
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap to `max_width` points. Words wider than a whole line are
/// split between characters. Explicit newlines always break.
pub fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if font.width(&candidate, size) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if font.width(word, size) <= max_width {
                line = word.to_string();
                continue;
            }
            for c in word.chars() {
                let mut next = line.clone();
                next.push(c);
                if !line.is_empty() && font.width(&next, size) > max_width {
                    lines.push(std::mem::take(&mut line));
                    line.push(c);
                } else {
                    line = next;
                }
            }
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_known_glyphs() {
        // "Rs." = R(722) + s(500) + .(278)
        assert!((Font::Regular.width("Rs.", 10.0) - 15.0).abs() < 1e-4);
        assert!(Font::Bold.width("TAX", 10.0) > Font::Regular.width("TAX", 10.0));
    }

    #[test]
    fn non_ascii_is_replaced() {
        assert_eq!(encode("Rs\u{20b9}é\t"), b"Rs?? ".to_vec());
    }

    #[test]
    fn wraps_on_word_boundaries_within_width() {
        let text = "This is a computer generated bill and does not require signature.";
        let lines = wrap(text, Font::Regular, 10.0, 120.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(Font::Regular.width(line, 10.0) <= 120.0, "{line}");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn splits_overlong_words_and_keeps_blank_lines() {
        let lines = wrap("AAAAAAAAAAAAAAAAAAAA", Font::Bold, 10.0, 30.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "AAAAAAAAAAAAAAAAAAAA");

        assert_eq!(wrap("one\n\ntwo", Font::Regular, 10.0, 200.0), vec!["one", "", "two"]);
        assert_eq!(wrap("", Font::Regular, 10.0, 200.0), vec![String::new()]);
    }
}
