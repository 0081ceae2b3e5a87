//! Packed-decimal scoring: two decimal digits per byte, added with
//! decimal-carry semantics so the stored word reads as its displayed digits.

use crate::hw::DisplayOutput;

/// Adds two packed-decimal words digit by digit with decimal carry.
/// `0x09 + 0x01` yields `0x10`, not `0x0a`.
pub fn bcd_add(a: u16, b: u16) -> u16 {
    let mut result = 0u16;
    let mut carry = 0u16;
    for shift in (0..16).step_by(4) {
        let mut digit = ((a >> shift) & 0xf) + ((b >> shift) & 0xf) + carry;
        carry = if digit > 9 {
            digit -= 10;
            1
        } else {
            0
        };
        result |= digit << shift;
    }
    result
}

/// Four-digit packed-decimal score accumulator.
#[derive(Clone, Copy, Default)]
pub struct Score(u16);

impl Score {
    pub fn add(&mut self, bcd: u16) {
        self.0 = bcd_add(self.0, bcd);
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// Writes the four digits right-aligned at `(x+3, y)` down to `(x, y)`.
    pub fn draw(&self, display: &mut dyn DisplayOutput, x: u8, y: u8) {
        let mut x = x.wrapping_add(3);
        let mut bcd = self.0;
        for _ in 0..4 {
            display.set_cell(x, y, (bcd & 0xf) as u8);
            x = x.wrapping_sub(1);
            bcd >>= 4;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{bcd_add, Score};

    #[test]
    fn adds_without_carry() {
        assert_eq!(bcd_add(0x05, 0x03), 0x08);
    }

    #[test]
    fn carries_in_decimal() {
        assert_eq!(bcd_add(0x09, 0x01), 0x10);
        assert_eq!(bcd_add(0x0099, 0x0001), 0x0100);
        assert_eq!(bcd_add(0x1234, 0x0876), 0x2110);
    }

    #[test]
    fn wraps_past_four_digits() {
        assert_eq!(bcd_add(0x9999, 0x0001), 0x0000);
    }

    #[test]
    fn accumulator_keeps_packed_form() {
        let mut s = Score::default();
        for _ in 0..5 {
            s.add(0x2);
        }
        assert_eq!(s.value(), 0x10);
    }
}
