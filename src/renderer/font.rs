//! 3x5 block font for short labels
//!
//! Each glyph is five rows of three bits, most significant bit on the left.
//! Lowercase maps to uppercase; anything without a glyph draws as `?`.

pub const GLYPH_COLS: usize = 3;
pub const GLYPH_ROWS: usize = 5;
/// Horizontal cells consumed per character, including spacing
pub const ADVANCE: usize = GLYPH_COLS + 1;

const UNKNOWN: [u8; GLYPH_ROWS] = [0b110, 0b001, 0b010, 0b000, 0b010];

pub fn glyph(ch: char) -> [u8; GLYPH_ROWS] {
    match ch.to_ascii_uppercase() {
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b110, 0b001, 0b010, 0b100, 0b111],
        '3' => [0b110, 0b001, 0b010, 0b001, 0b110],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b110, 0b001, 0b110],
        '6' => [0b011, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b110],
        ' ' => [0; GLYPH_ROWS],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '&' => [0b010, 0b101, 0b010, 0b101, 0b011],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        _ => UNKNOWN,
    }
}

/// Lit cells of `ch` as (column, row)
pub fn cells(ch: char) -> impl Iterator<Item = (usize, usize)> {
    let rows = glyph(ch);
    (0..GLYPH_ROWS).flat_map(move |row| {
        (0..GLYPH_COLS)
            .filter(move |&col| (rows[row] >> (GLYPH_COLS - 1 - col)) & 1 == 1)
            .map(move |col| (col, row))
    })
}

/// Characters of `text` that fit in `max_cols` cells, with `..` when cut
pub fn fit(text: &str, max_cols: usize) -> String {
    let max_chars = max_cols / ADVANCE;
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    if max_chars < 3 {
        return trimmed.chars().take(max_chars).collect();
    }
    let mut out: String = trimmed.chars().take(max_chars - 2).collect();
    out.truncate(out.trim_end().len());
    out.push_str("..");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_shares_uppercase_glyph() {
        assert_eq!(glyph('q'), glyph('Q'));
        assert_eq!(glyph('~'), UNKNOWN);
        assert_eq!(cells(' ').count(), 0);
    }

    #[test]
    fn test_cells_read_left_to_right() {
        // L: left column plus the full bottom row
        let lit: Vec<(usize, usize)> = cells('L').collect();
        assert_eq!(lit.len(), 7);
        assert!(lit.contains(&(0, 0)));
        assert!(lit.contains(&(2, 4)));
        assert!(!lit.contains(&(2, 0)));
    }

    #[test]
    fn test_fit_truncates_long_titles() {
        assert_eq!(fit("  Lighthouse ", 40), "Lighthouse");
        assert_eq!(fit("Tidal Atlas Project", 24), "Tida..");
        assert_eq!(fit("Tidal Atlas", 28), "Tidal..");
        assert_eq!(fit("Anything", 4), "A");
        assert_eq!(fit("Anything", 0), "");
    }
}
