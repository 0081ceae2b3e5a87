//! Player ship: input-driven horizontal motion, firing, and the explosion
//! overlay sequence.
//!
//! The ship is drawn as four fixed tiles whose columns are scrolled by the
//! player's x position, so moving the ship costs two scroll writes per tick.

use crate::hw::{DisplayOutput, InputState, BLANK};
use crate::sim::missiles::{Missile, PLAYER_MISSILE};
use crate::sim::round::Round;

pub const PLAYER_Y: u8 = 232;
pub const PLAYER_START_X: u8 = 112;
const PLAYER_MIN_X: u8 = 16;
const PLAYER_MAX_X: u8 = 224;

/// Number of animate steps before a destroyed player may respawn.
pub const RESPAWN_THRESHOLD: u8 = 32;

#[derive(Clone, Copy, Default)]
pub struct Player {
    pub x: u8,
    /// 0 = alive; otherwise progress through the explosion sequence.
    pub exploding: u8,
}

pub fn move_player(round: &mut Round, input: &InputState, display: &mut dyn DisplayOutput) {
    if input.p1.left && round.player.x > PLAYER_MIN_X {
        round.player.x -= 1;
    }
    if input.p1.right && round.player.x < PLAYER_MAX_X {
        round.player.x += 1;
    }
    if input.p1.fire && !round.missiles[PLAYER_MISSILE].active() {
        round.missiles[PLAYER_MISSILE] = Missile {
            // Must be a multiple of the missile speed so the position
            // wraps exactly to zero at the top of the field.
            y: 252 - PLAYER_Y,
            x: round.player.x.wrapping_add(8),
            dy: 4,
        };
    }
    display.set_column_scroll(29, round.player.x);
    display.set_column_scroll(30, round.player.x);
}

pub fn draw_player(display: &mut dyn DisplayOutput) {
    display.set_column_attribute(29, 1);
    display.set_column_attribute(30, 1);
    // Columns 31 and 30 sit in the wrapped margin and scroll into view.
    display.set_cell(31, 29, 0x60);
    display.set_cell(30, 29, 0x62);
    display.set_cell(31, 30, 0x61);
    display.set_cell(30, 30, 0x63);
}

pub fn new_player_ship(round: &mut Round, display: &mut dyn DisplayOutput) {
    round.player.exploding = 0;
    draw_player(display);
    round.player.x = PLAYER_START_X;
}

/// One step of the 5-phase explosion overlay: phases 1..=4 draw a 4x4 tile
/// block around the ship, phase 5 erases it. Beyond phase 5 the overlay is
/// left alone until respawn.
pub fn animate_player_explosion(round: &mut Round, display: &mut dyn DisplayOutput) {
    const COLS: [u8; 4] = [0, 31, 30, 29];
    const CODES: [[u8; 4]; 4] = [
        [0x0, 0x1, 0x4, 0x5],
        [0x2, 0x3, 0x6, 0x7],
        [0x8, 0x9, 0xc, 0xd],
        [0xa, 0xb, 0xe, 0xf],
    ];

    let z = round.player.exploding;
    if z > 5 {
        return;
    }
    if z == 5 {
        for col in COLS {
            for row in 28..32 {
                display.set_cell(col, row, BLANK);
            }
        }
    } else {
        let base = 0xb0 + (z << 4);
        display.set_column_scroll(28, round.player.x);
        display.set_column_scroll(31, round.player.x);
        for row in 28..32 {
            display.set_column_attribute(row, 2);
        }
        for (ci, col) in COLS.iter().enumerate() {
            for ri in 0..4u8 {
                display.set_cell(*col, 28 + ri, base + CODES[ci][ri as usize]);
            }
        }
    }
}
