//! Vertical projectiles. Slots 0..=5 mirror the attacker slots, slot 7 is
//! the player's shot; slot 6 stays free (its sprite slot carries the shared
//! explosion effect instead).

use crate::hw::DisplayOutput;
use crate::sim::round::Round;

pub const MISSILE_SLOTS: usize = 8;
pub const PLAYER_MISSILE: usize = 7;

/// A missile is active iff `y != 0`. `y` is stored bottom-up: the screen
/// position is `255 - y`.
#[derive(Clone, Copy, Default)]
pub struct Missile {
    pub dy: i8,
    pub x: u8,
    pub y: u8,
}

impl Missile {
    pub fn active(&self) -> bool {
        self.y != 0
    }

    pub fn screen_y(&self) -> u8 {
        255u8.wrapping_sub(self.y)
    }
}

/// Advances every active missile and copies the whole shadow array to the
/// display, exactly once per tick. A position that wraps below 4 means the
/// missile left the play field: it is deactivated and parked off-screen.
pub fn move_missiles(round: &mut Round, display: &mut dyn DisplayOutput) {
    for missile in round.missiles.iter_mut() {
        if missile.y != 0 {
            missile.y = missile.y.wrapping_add_signed(missile.dy);
            if missile.y < 4 {
                missile.x = 0xff;
                missile.y = 0;
            }
        }
    }
    for (i, missile) in round.missiles.iter().enumerate() {
        display.set_missile(i, missile.x, missile.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::TerminalDisplay;
    use crate::sim::round::Round;

    #[test]
    fn player_missile_expires_on_exact_wrap() {
        let mut round = Round::new(1);
        round.missiles[PLAYER_MISSILE] = Missile { dy: 4, x: 120, y: 252 };
        let mut d = TerminalDisplay::new();
        move_missiles(&mut round, &mut d);
        assert!(!round.missiles[PLAYER_MISSILE].active());
        assert_eq!(round.missiles[PLAYER_MISSILE].x, 0xff);
    }

    #[test]
    fn enemy_missile_expires_below_threshold() {
        let mut round = Round::new(1);
        round.missiles[0] = Missile { dy: -2, x: 50, y: 5 };
        let mut d = TerminalDisplay::new();
        move_missiles(&mut round, &mut d);
        assert!(!round.missiles[0].active());
    }

    #[test]
    fn active_missiles_advance_and_shadow_copies() {
        let mut round = Round::new(1);
        round.missiles[PLAYER_MISSILE] = Missile { dy: 4, x: 120, y: 20 };
        let mut d = TerminalDisplay::new();
        move_missiles(&mut round, &mut d);
        assert_eq!(round.missiles[PLAYER_MISSILE].y, 24);
        assert_eq!(d.missiles[PLAYER_MISSILE], (120, 24));
    }
}
