//! Advance widths of the standard Helvetica faces, in 1/1000 em.
//!
//! Printable ASCII comes from the Adobe font metrics. Accented Latin letters
//! share the width of their base letter, which holds for both faces.

const MM_PER_PT: f64 = 25.4 / 72.0;

#[rustfmt::skip]
const REGULAR: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p'..'~'
];

#[rustfmt::skip]
const BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width of `c` in 1/1000 em.
#[must_use]
pub fn char_units(c: char, bold: bool) -> u16 {
    let table = if bold { &BOLD } else { &REGULAR };
    let base = fold_accent(c);
    if (' '..='~').contains(&base) {
        return table[base as usize - 32];
    }
    match base {
        'ª' | 'º' => 370,
        '§' | '€' | '–' | '°' => 556,
        '—' | '…' => 1000,
        '•' => 350,
        '‘' | '’' => {
            if bold {
                278
            } else {
                222
            }
        }
        '“' | '”' => {
            if bold {
                500
            } else {
                333
            }
        }
        _ => 556,
    }
}

/// Width of `text` in millimetres at `size_pt`.
#[must_use]
pub fn text_width_mm(text: &str, bold: bool, size_pt: f64) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(char_units(c, bold))).sum();
    f64::from(units) / 1000.0 * size_pt * MM_PER_PT
}

/// Converts millimetres to PDF points.
#[must_use]
pub fn mm_to_pt(mm: f64) -> f64 {
    mm / MM_PER_PT
}

/// Base letter of a Portuguese/Latin-1 accented letter; other chars unchanged.
fn fold_accent(c: char) -> char {
    match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'Ç' => 'C',
        'ç' => 'c',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ñ' => 'N',
        'ñ' => 'n',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ý' => 'Y',
        'ý' | 'ÿ' => 'y',
        '\u{a0}' => ' ',
        other => other,
    }
}
