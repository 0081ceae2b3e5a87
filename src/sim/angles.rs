//! Fixed-point trigonometry over 32 discrete directions.
//!
//! Direction 0 points straight down the screen (increasing y); direction 8
//! points right. Sine values are signed bytes scaled by 128.

const SINTBL: [i8; 32] = [
    0, 25, 49, 71, 90, 106, 117, 125, //
    127, 125, 117, 106, 90, 71, 49, 25, //
    0, -25, -49, -71, -90, -106, -117, -125, //
    -127, -125, -117, -106, -90, -71, -49, -25,
];

pub fn isin(dir: u8) -> i8 {
    SINTBL[(dir & 31) as usize]
}

pub fn icos(dir: u8) -> i8 {
    isin(dir.wrapping_add(8))
}

/// Sprite orientation derived from a direction index: one of 7 base shapes
/// plus mirroring flags. Rendering concern only; never fed back into motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Orientation {
    pub base_shape: u8,
    pub flip_x: bool,
    pub flip_y: bool,
}

pub fn orientation(dir: u8) -> Orientation {
    // Base shapes 0..=6 cover one quadrant; the other three quadrants are
    // mirrored copies. Shapes 6 and 7 within a quadrant share artwork.
    const SEQ: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 6];
    let d = dir & 31;
    let (base_shape, flip_x, flip_y) = match d >> 3 {
        0 => (SEQ[(d & 7) as usize], false, false),
        1 => (SEQ[(15 - d) as usize], true, true),
        2 => (SEQ[(d & 7) as usize], true, false),
        _ => (SEQ[(31 - d) as usize], false, true),
    };
    Orientation {
        base_shape,
        flip_x,
        flip_y,
    }
}
