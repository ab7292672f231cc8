use std::ops::Deref;

use itertools::Itertools;

use super::metadata::Color;
use crate::builder::{Module, QR};

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(pattern: u8) -> Self {
        debug_assert!(pattern < 8, "Invalid masking pattern");
        Self(pattern)
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

mod mask_functions {
    pub fn checkerboard(r: i16, c: i16) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i16, _: i16) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i16, c: i16) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i16, c: i16) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i16, c: i16) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i16, c: i16) -> bool {
        ((r * c) & 1) + ((r * c) % 3) == 0
    }

    pub fn diamonds(r: i16, c: i16) -> bool {
        (((r * c) & 1) + ((r * c) % 3)) & 1 == 0
    }

    pub fn meadow(r: i16, c: i16) -> bool {
        (((r + c) & 1) + ((r * c) % 3)) & 1 == 0
    }
}

impl MaskPattern {
    pub fn mask_function(self) -> fn(i16, i16) -> bool {
        match self.0 {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!("Invalid masking pattern"),
        }
    }
}

// Penalty scoring
//------------------------------------------------------------------------------

// Candidate masks are scored against the unmasked grid; data modules are
// flipped on read instead of cloning the matrix per candidate.
struct MaskedView<'a> {
    qr: &'a QR,
    flip: fn(i16, i16) -> bool,
}

impl MaskedView<'_> {
    fn get(&self, r: i16, c: i16) -> Color {
        let module = self.qr.get(r, c);
        match module {
            Module::Data(clr) if (self.flip)(r, c) => !clr,
            _ => *module,
        }
    }

    fn width(&self) -> i16 {
        self.qr.width() as i16
    }
}

pub fn apply_best_mask(qr: &mut QR) -> MaskPattern {
    let mut best = MaskPattern::new(0);
    let mut lowest = u32::MAX;
    for pattern in 0..8 {
        let pattern = MaskPattern::new(pattern);
        let penalty = compute_total_penalty(qr, pattern);
        // Strict comparison keeps the lowest pattern on equal scores.
        if penalty < lowest {
            lowest = penalty;
            best = pattern;
        }
    }
    qr.mask(best);
    best
}

pub fn compute_total_penalty(qr: &QR, pattern: MaskPattern) -> u32 {
    let view = MaskedView { qr, flip: pattern.mask_function() };
    compute_adjacent_penalty(&view)
        + compute_block_penalty(&view)
        + compute_finder_pattern_penalty(&view)
        + compute_balance_penalty(&view)
}

// Runs of five or more identical modules; rows only.
fn compute_adjacent_penalty(view: &MaskedView) -> u32 {
    let w = view.width();
    let mut pen = 0;
    for r in 0..w {
        for (len, _) in (0..w).map(|c| view.get(r, c)).dedup_with_count() {
            if len >= 5 {
                pen += 3 + len as u32 - 5;
            }
        }
    }
    pen
}

// Uniform 2x2 blocks; only the windows spanning the top two rows are scored.
fn compute_block_penalty(view: &MaskedView) -> u32 {
    let w = view.width();
    let mut pen = 0;
    let r = 0;
    for c in 0..w - 1 {
        let clr = view.get(r, c);
        if clr == view.get(r, c + 1) && clr == view.get(r + 1, c) && clr == view.get(r + 1, c + 1)
        {
            pen += 3;
        }
    }
    pen
}

fn compute_finder_pattern_penalty(view: &MaskedView) -> u32 {
    let w = view.width();
    let mut count = 0;
    for i in 0..w {
        let row = (0..w).map(|c| view.get(i, c)).collect::<Vec<_>>();
        let col = (0..w).map(|r| view.get(r, i)).collect::<Vec<_>>();
        count += row.windows(11).filter(|win| *win == HORIZONTAL_SEQ).count();
        count += col.windows(11).filter(|win| *win == VERTICAL_SEQ).count();
    }
    count as u32 * 40
}

// Distance of the dark module share from 50%, in steps of five percent.
fn compute_balance_penalty(view: &MaskedView) -> u32 {
    let w = view.width();
    let total = w as u32 * w as u32;
    let mut dark = 0_u32;
    for r in 0..w {
        for c in 0..w {
            if view.get(r, c) == Color::Dark {
                dark += 1;
            }
        }
    }
    let lower = dark * 20 / total * 5;
    let down = lower.abs_diff(50) / 5;
    let up = (lower + 5).abs_diff(50) / 5;
    down.min(up) * 10
}


// Global constants
//------------------------------------------------------------------------------

use super::metadata::Color::{Dark, Light};

// Finder-like run scored in rows, and its counterpart scored in columns.
static HORIZONTAL_SEQ: [Color; 11] =
    [Dark, Light, Dark, Dark, Dark, Light, Dark, Light, Light, Light, Light];

static VERTICAL_SEQ: [Color; 11] =
    [Light, Light, Light, Light, Dark, Light, Dark, Dark, Dark, Light, Dark];
