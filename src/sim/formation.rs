//! The grid of dormant enemies and its slow lateral sway.

use crate::hw::{DisplayOutput, BLANK};

pub const ENEMIES_PER_ROW: usize = 8;
pub const ENEMY_ROWS: usize = 4;
pub const MAX_IN_FORMATION: usize = ENEMIES_PER_ROW * ENEMY_ROWS;

pub const FORMATION_X0: u8 = 18;
pub const FORMATION_Y0: u8 = 27;
pub const FORMATION_XSPACE: u8 = 24;
pub const FORMATION_YSPACE: u8 = 16;

const ENEMY_SHAPE: u8 = 0x43;
const SWAY_LIMIT: u8 = 40;

#[derive(Clone, Copy, Default)]
pub struct FormationSlot {
    pub shape: u8, // 0 = empty
}

pub struct Formation {
    slots: [FormationSlot; MAX_IN_FORMATION],
    pub offset_x: u8,
    pub direction: i8,
    current_row: u8,
}

impl Formation {
    pub fn new() -> Self {
        Self {
            slots: [FormationSlot::default(); MAX_IN_FORMATION],
            offset_x: 0,
            direction: 1,
            current_row: 0,
        }
    }

    /// Repopulates every slot. The first row holds the flagships, which
    /// carry the same shape identifier as the rest of the fleet.
    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.shape = ENEMY_SHAPE;
        }
    }

    pub fn shape(&self, index: u8) -> u8 {
        self.slots[index as usize].shape
    }

    pub fn clear_slot(&mut self, index: u8) {
        self.slots[index as usize].shape = 0;
    }

    pub fn restore_slot(&mut self, index: u8, shape: u8) {
        self.slots[index as usize].shape = shape;
    }

    /// Screen x of a slot, following the sway offset.
    pub fn slot_x(&self, index: u8) -> u8 {
        let column = index % ENEMIES_PER_ROW as u8;
        (FORMATION_XSPACE.wrapping_mul(column))
            .wrapping_add(FORMATION_X0)
            .wrapping_add(self.offset_x)
    }

    pub fn slot_y(&self, index: u8) -> u8 {
        let row = index / ENEMIES_PER_ROW as u8;
        FORMATION_YSPACE.wrapping_mul(row).wrapping_add(FORMATION_Y0)
    }

    /// Renders one grid row per call; after a full 4-row sweep, advances
    /// the sway one step, reversing at the bounds.
    pub fn draw_next_row(&mut self, display: &mut dyn DisplayOutput) {
        self.draw_row(self.current_row, display);
        self.current_row += 1;
        if self.current_row == ENEMY_ROWS as u8 {
            self.current_row = 0;
            self.offset_x = self.offset_x.wrapping_add_signed(self.direction);
            if self.offset_x == SWAY_LIMIT {
                self.direction = -1;
            } else if self.offset_x == 0 {
                self.direction = 1;
            }
        }
    }

    fn draw_row(&self, row: u8, display: &mut dyn DisplayOutput) {
        let y = 4 + row * 2;
        display.set_column_attribute(y, 0x2);
        display.set_column_scroll(y, self.offset_x);
        for i in 0..ENEMIES_PER_ROW as u8 {
            let x = i * 3;
            let shape = self.slots[(i + row * ENEMIES_PER_ROW as u8) as usize].shape;
            if shape != 0 {
                display.set_cell(x, y, shape);
                display.set_cell(x + 1, y, shape - 2);
            } else {
                display.set_cell(x, y, BLANK);
                display.set_cell(x + 1, y, BLANK);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::TerminalDisplay;

    #[test]
    fn reset_fills_every_slot() {
        let mut f = Formation::new();
        f.reset();
        assert!((0..MAX_IN_FORMATION as u8).all(|i| f.shape(i) != 0));
    }

    #[test]
    fn slot_mapping_follows_sway_offset() {
        let mut f = Formation::new();
        assert_eq!(f.slot_x(0), 18);
        assert_eq!(f.slot_y(0), 27);
        assert_eq!(f.slot_x(11), 3 * 24 + 18); // row 1, column 3
        assert_eq!(f.slot_y(11), 16 + 27);
        f.offset_x = 7;
        assert_eq!(f.slot_x(11), 3 * 24 + 18 + 7);
    }

    #[test]
    fn sway_reverses_at_bounds() {
        let mut f = Formation::new();
        f.reset();
        let mut d = TerminalDisplay::new();
        let mut seen_limit = false;
        for _ in 0..2000 {
            f.draw_next_row(&mut d);
            assert!(f.offset_x <= SWAY_LIMIT);
            if f.offset_x == SWAY_LIMIT {
                seen_limit = true;
                assert_eq!(f.direction, -1);
            }
            if seen_limit && f.offset_x == 0 {
                assert_eq!(f.direction, 1);
            }
        }
        assert!(seen_limit);
    }

    #[test]
    fn empty_slots_draw_blank_cells() {
        let mut f = Formation::new();
        f.reset();
        f.clear_slot(2);
        let mut d = TerminalDisplay::new();
        f.draw_next_row(&mut d); // row 0 lands on cell row 4
        assert_eq!(d.cells[4][6], BLANK);
        assert_eq!(d.cells[4][7], BLANK);
        assert_eq!(d.cells[4][0], 0x43);
        assert_eq!(d.cells[4][1], 0x41);
    }
}
