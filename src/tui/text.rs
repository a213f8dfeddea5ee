//! Display-width aware text helpers.
//!
//! Everything here measures strings the way a terminal lays them out: escape sequences
//! take no room, wide characters (CJK, emoji, east-asian ambiguous) take two cells and
//! control characters take none.

use unicode_display_width::is_double_width;
use unicode_width::UnicodeWidthChar;

/// Horizontal alignment used by [`pad`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Text first, fill after
    #[default]
    Left,
    /// Fill first, text after
    Right,
    /// Fill split around the text, the extra cell going right
    Center,
}

/// Number of terminal cells used by `c`
#[inline]
pub fn char_width(c: char) -> usize {
    if (c as u32) < 0x20 {
        return 0;
    }
    if c == '\u{FE0F}' || is_double_width(c) || c.width_cjk() == Some(2) || is_ambiguous(c) {
        return 2;
    }
    1
}

/// Whether `c` is in the East Asian Ambiguous class (`A` in EastAsianWidth.txt)
fn is_ambiguous(c: char) -> bool {
    let cp = c as u32;
    AMBIGUOUS
        .binary_search_by(|&(lo, hi)| {
            if hi < cp {
                std::cmp::Ordering::Less
            } else if lo > cp {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Byte length of the escape sequence at the start of `s`, which must begin with ESC.
///
/// CSI runs end on their final byte, OSC runs on BEL or `ESC \`, anything else is a
/// two-character escape. Unterminated runs swallow the rest of the string.
fn escape_len(s: &str) -> usize {
    let mut chars = s.char_indices().skip(1).peekable();
    match chars.next() {
        None => 1,
        Some((_, '[')) => {
            for (pos, c) in chars {
                if ('\x40'..='\x7e').contains(&c) {
                    return pos + c.len_utf8();
                }
            }
            s.len()
        }
        Some((_, ']')) => {
            while let Some((pos, c)) = chars.next() {
                if c == '\x07' {
                    return pos + 1;
                }
                if c == '\x1b'
                    && let Some(&(end, '\\')) = chars.peek()
                {
                    return end + 1;
                }
            }
            s.len()
        }
        Some((pos, c)) => pos + c.len_utf8(),
    }
}

/// Pieces of a string as the terminal sees them
enum Chunk<'a> {
    Escape(&'a str),
    Char(char),
}

fn chunks(s: &str) -> impl Iterator<Item = Chunk<'_>> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let c = rest.chars().next()?;
        if c == '\x1b' {
            let len = escape_len(rest);
            let (esc, tail) = rest.split_at(len);
            rest = tail;
            Some(Chunk::Escape(esc))
        } else {
            rest = &rest[c.len_utf8()..];
            Some(Chunk::Char(c))
        }
    })
}

/// Removes every escape sequence from `text`
pub fn strip_ansi(text: &str) -> String {
    chunks(text)
        .filter_map(|chunk| match chunk {
            Chunk::Char(c) => Some(c),
            Chunk::Escape(_) => None,
        })
        .collect()
}

/// Number of terminal cells used by `text`, escape sequences excluded
pub fn display_width(text: &str) -> usize {
    chunks(text)
        .map(|chunk| match chunk {
            Chunk::Char(c) => char_width(c),
            Chunk::Escape(_) => 0,
        })
        .sum()
}

/// Pads `text` with `fill` until it is `width` cells wide.
///
/// Text that is already wide enough is returned untouched.
pub fn pad(text: &str, width: usize, align: Align, fill: char) -> String {
    let current = display_width(text);
    if current >= width {
        return text.to_string();
    }
    let missing = width - current;
    let filler = |n: usize| std::iter::repeat_n(fill, n).collect::<String>();
    match align {
        Align::Left => format!("{text}{}", filler(missing)),
        Align::Right => format!("{}{text}", filler(missing)),
        Align::Center => {
            let left = missing / 2;
            format!("{}{text}{}", filler(left), filler(missing - left))
        }
    }
}

/// Cuts `text` so that it fits in `max_width` cells, ending it with `ellipsis`.
///
/// Escape sequences that precede the cut are kept as-is, the ones after it are dropped.
/// A wide character that would straddle the limit is dropped whole. When even the
/// ellipsis does not fit, the result is empty.
pub fn truncate(text: &str, max_width: usize, ellipsis: &str) -> String {
    if display_width(text) <= max_width {
        return text.to_string();
    }
    let ellipsis_width = display_width(ellipsis);
    if max_width < ellipsis_width {
        return String::new();
    }
    let budget = max_width - ellipsis_width;

    let mut out = String::with_capacity(text.len());
    let mut width = 0;
    for chunk in chunks(text) {
        match chunk {
            Chunk::Escape(esc) => out.push_str(esc),
            Chunk::Char(c) => {
                let w = char_width(c);
                if width + w > budget {
                    break;
                }
                out.push(c);
                width += w;
            }
        }
    }
    out.push_str(ellipsis);
    out
}

// Unicode 14.0, inclusive ranges
#[rustfmt::skip]
const AMBIGUOUS: &[(u32, u32)] = &[
    (0x00A1, 0x00A1), (0x00A4, 0x00A4), (0x00A7, 0x00A8), (0x00AA, 0x00AA), (0x00AD, 0x00AE), (0x00B0, 0x00B4),
    (0x00B6, 0x00BA), (0x00BC, 0x00BF), (0x00C6, 0x00C6), (0x00D0, 0x00D0), (0x00D7, 0x00D8), (0x00DE, 0x00E1),
    (0x00E6, 0x00E6), (0x00E8, 0x00EA), (0x00EC, 0x00ED), (0x00F0, 0x00F0), (0x00F2, 0x00F3), (0x00F7, 0x00FA),
    (0x00FC, 0x00FC), (0x00FE, 0x00FE), (0x0101, 0x0101), (0x0111, 0x0111), (0x0113, 0x0113), (0x011B, 0x011B),
    (0x0126, 0x0127), (0x012B, 0x012B), (0x0131, 0x0133), (0x0138, 0x0138), (0x013F, 0x0142), (0x0144, 0x0144),
    (0x0148, 0x014B), (0x014D, 0x014D), (0x0152, 0x0153), (0x0166, 0x0167), (0x016B, 0x016B), (0x01CE, 0x01CE),
    (0x01D0, 0x01D0), (0x01D2, 0x01D2), (0x01D4, 0x01D4), (0x01D6, 0x01D6), (0x01D8, 0x01D8), (0x01DA, 0x01DA),
    (0x01DC, 0x01DC), (0x0251, 0x0251), (0x0261, 0x0261), (0x02C4, 0x02C4), (0x02C7, 0x02C7), (0x02C9, 0x02CB),
    (0x02CD, 0x02CD), (0x02D0, 0x02D0), (0x02D8, 0x02DB), (0x02DD, 0x02DD), (0x02DF, 0x02DF), (0x0300, 0x036F),
    (0x0391, 0x03A1), (0x03A3, 0x03A9), (0x03B1, 0x03C1), (0x03C3, 0x03C9), (0x0401, 0x0401), (0x0410, 0x044F),
    (0x0451, 0x0451), (0x2010, 0x2010), (0x2013, 0x2016), (0x2018, 0x2019), (0x201C, 0x201D), (0x2020, 0x2022),
    (0x2024, 0x2027), (0x2030, 0x2030), (0x2032, 0x2033), (0x2035, 0x2035), (0x203B, 0x203B), (0x203E, 0x203E),
    (0x2074, 0x2074), (0x207F, 0x207F), (0x2081, 0x2084), (0x20AC, 0x20AC), (0x2103, 0x2103), (0x2105, 0x2105),
    (0x2109, 0x2109), (0x2113, 0x2113), (0x2116, 0x2116), (0x2121, 0x2122), (0x2126, 0x2126), (0x212B, 0x212B),
    (0x2153, 0x2154), (0x215B, 0x215E), (0x2160, 0x216B), (0x2170, 0x2179), (0x2189, 0x2189), (0x2190, 0x2199),
    (0x21B8, 0x21B9), (0x21D2, 0x21D2), (0x21D4, 0x21D4), (0x21E7, 0x21E7), (0x2200, 0x2200), (0x2202, 0x2203),
    (0x2207, 0x2208), (0x220B, 0x220B), (0x220F, 0x220F), (0x2211, 0x2211), (0x2215, 0x2215), (0x221A, 0x221A),
    (0x221D, 0x2220), (0x2223, 0x2223), (0x2225, 0x2225), (0x2227, 0x222C), (0x222E, 0x222E), (0x2234, 0x2237),
    (0x223C, 0x223D), (0x2248, 0x2248), (0x224C, 0x224C), (0x2252, 0x2252), (0x2260, 0x2261), (0x2264, 0x2267),
    (0x226A, 0x226B), (0x226E, 0x226F), (0x2282, 0x2283), (0x2286, 0x2287), (0x2295, 0x2295), (0x2299, 0x2299),
    (0x22A5, 0x22A5), (0x22BF, 0x22BF), (0x2312, 0x2312), (0x2460, 0x24E9), (0x24EB, 0x254B), (0x2550, 0x2573),
    (0x2580, 0x258F), (0x2592, 0x2595), (0x25A0, 0x25A1), (0x25A3, 0x25A9), (0x25B2, 0x25B3), (0x25B6, 0x25B7),
    (0x25BC, 0x25BD), (0x25C0, 0x25C1), (0x25C6, 0x25C8), (0x25CB, 0x25CB), (0x25CE, 0x25D1), (0x25E2, 0x25E5),
    (0x25EF, 0x25EF), (0x2605, 0x2606), (0x2609, 0x2609), (0x260E, 0x260F), (0x261C, 0x261C), (0x261E, 0x261E),
    (0x2640, 0x2640), (0x2642, 0x2642), (0x2660, 0x2661), (0x2663, 0x2665), (0x2667, 0x266A), (0x266C, 0x266D),
    (0x266F, 0x266F), (0x269E, 0x269F), (0x26BF, 0x26BF), (0x26C6, 0x26CD), (0x26CF, 0x26D3), (0x26D5, 0x26E1),
    (0x26E3, 0x26E3), (0x26E8, 0x26E9), (0x26EB, 0x26F1), (0x26F4, 0x26F4), (0x26F6, 0x26F9), (0x26FB, 0x26FC),
    (0x26FE, 0x26FF), (0x273D, 0x273D), (0x2776, 0x277F), (0x2B56, 0x2B59), (0x3248, 0x324F), (0xE000, 0xF8FF),
    (0xFE00, 0xFE0F), (0xFFFD, 0xFFFD), (0x1F100, 0x1F10A), (0x1F110, 0x1F12D), (0x1F130, 0x1F169), (0x1F170, 0x1F18D),
    (0x1F18F, 0x1F190), (0x1F19B, 0x1F1AC), (0xE0100, 0xE01EF), (0xF0000, 0xFFFFD), (0x100000, 0x10FFFD),
];
