//! Active attackers: wave dispatch out of the formation, the per-attacker
//! dive/return state machine, and the slower "thinking" pass that steers
//! and fires.

use crate::hw::{DisplayOutput, Sprite};
use crate::sim::angles::{icos, isin, orientation};
use crate::sim::formation::{Formation, ENEMIES_PER_ROW, MAX_IN_FORMATION};
use crate::sim::missiles::Missile;
use crate::sim::round::Round;

pub const MAX_ATTACKERS: usize = 6;

const SCREEN_CENTER_X: u8 = 112;
const DIVE_SPEED: i16 = 2;

/// An attacker occupies a slot iff `origin != 0`; `origin` is the 1-based
/// formation index it will return to. Positions are 8.8 fixed point.
#[derive(Clone, Copy, Default)]
pub struct Attacker {
    pub origin: u8,
    pub shape: u8,
    pub x: u16,
    pub y: u16,
    pub dir: u8,
    pub returning: bool,
}

impl Attacker {
    pub fn active(&self) -> bool {
        self.origin != 0
    }

    pub fn pixel_x(&self) -> u8 {
        (self.x >> 8) as u8
    }

    pub fn pixel_y(&self) -> u8 {
        (self.y >> 8) as u8
    }
}

/// Promotes one formation slot into the lowest free attacker slot.
/// Silently does nothing when the index is out of range, the slot is
/// empty, or every attacker slot is taken.
pub fn formation_to_attacker(round: &mut Round, formation_index: u8) {
    if formation_index as usize >= MAX_IN_FORMATION {
        return;
    }
    if round.formation.shape(formation_index) == 0 {
        return;
    }
    let Round {
        formation,
        attackers,
        ..
    } = round;
    if let Some(a) = attackers.iter_mut().find(|a| !a.active()) {
        a.x = (formation.slot_x(formation_index) as u16) << 8;
        a.y = (formation.slot_y(formation_index) as u16) << 8;
        a.shape = formation.shape(formation_index);
        a.origin = formation_index + 1;
        a.dir = 0;
        a.returning = false;
        formation.clear_slot(formation_index);
    }
}

/// Scans cyclically from a random start for an occupied slot and promotes
/// the 2x2 block anchored there.
pub fn new_attack_wave(round: &mut Round) {
    let start = round.rng.next_byte();
    scan_and_promote(round, start);
}

fn scan_and_promote(round: &mut Round, start: u8) {
    let mut i = start & (MAX_IN_FORMATION as u8 - 1);
    for _ in 0..MAX_IN_FORMATION {
        if round.formation.shape(i) != 0 {
            formation_to_attacker(round, i);
            formation_to_attacker(round, i + 1);
            formation_to_attacker(round, i + ENEMIES_PER_ROW as u8);
            formation_to_attacker(round, i + ENEMIES_PER_ROW as u8 + 1);
            break;
        }
        i = i.wrapping_add(1) & (MAX_IN_FORMATION as u8 - 1);
    }
}

fn fly(a: &mut Attacker) {
    a.x = a.x.wrapping_add_signed(isin(a.dir) as i16 * DIVE_SPEED);
    a.y = a.y.wrapping_add_signed(icos(a.dir) as i16 * DIVE_SPEED);
    if a.pixel_y() == 0 {
        a.returning = true;
    }
}

fn return_home(a: &mut Attacker, formation: &mut Formation) {
    let fi = a.origin - 1;
    let dest_x = formation.slot_x(fi);
    let dest_y = formation.slot_y(fi);
    let ydist = dest_y.wrapping_sub(a.pixel_y());
    if ydist == 0 {
        // Back in the slot: become a formation enemy again.
        formation.restore_slot(fi, a.shape);
        a.origin = 0;
    } else {
        a.dir = ydist.wrapping_add(16) & 31;
        a.x = (dest_x as u16) << 8;
        a.y = a.y.wrapping_add(128);
    }
}

pub fn move_attackers(round: &mut Round) {
    let Round {
        formation,
        attackers,
        ..
    } = round;
    for a in attackers.iter_mut() {
        if a.active() {
            if a.returning {
                return_home(a, formation);
            } else {
                fly(a);
            }
        }
    }
}

/// Lower-cadence pass: in the upper half of the screen (or while the
/// player is exploding) sweep the dive toward screen center; in the lower
/// half, fire the attacker's mirrored missile slot if it is free.
pub fn think_attackers(round: &mut Round) {
    let Round {
        attackers,
        missiles,
        player,
        ..
    } = round;
    for (i, a) in attackers.iter_mut().enumerate() {
        if !a.active() {
            continue;
        }
        let x = a.pixel_x();
        let y = a.pixel_y();
        if y < 128 || player.exploding != 0 {
            if x < SCREEN_CENTER_X {
                a.dir = a.dir.wrapping_add(1);
            } else {
                a.dir = a.dir.wrapping_sub(1);
            }
        } else if missiles[i].y == 0 {
            missiles[i] = Missile {
                y: 245u8.wrapping_sub(y),
                x: x.wrapping_add(8),
                dy: -2,
            };
        }
    }
}

pub fn draw_attackers(round: &Round, display: &mut dyn DisplayOutput) {
    for (i, a) in round.attackers.iter().enumerate() {
        if a.active() {
            let o = orientation(a.dir);
            display.set_sprite(
                i,
                Sprite {
                    x: a.pixel_x(),
                    y: a.pixel_y(),
                    shape: o.base_shape.wrapping_add(a.shape).wrapping_add(14),
                    flip_x: o.flip_x,
                    flip_y: o.flip_y,
                    color: 2,
                    visible: true,
                },
            );
        } else {
            display.set_sprite(
                i,
                Sprite {
                    y: 255,
                    visible: false,
                    ..Sprite::default()
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::round::Round;

    fn fresh_round() -> Round {
        let mut round = Round::new(1);
        round.formation.reset();
        round.enemies_left = MAX_IN_FORMATION as u8;
        round
    }

    fn active_count(round: &Round) -> usize {
        round.attackers.iter().filter(|a| a.active()).count()
    }

    #[test]
    fn wave_promotes_a_2x2_block() {
        let mut round = fresh_round();
        // The drawn index itself is probed first.
        scan_and_promote(&mut round, 5);
        assert_eq!(active_count(&round), 4);
        let origins: Vec<u8> = round.attackers[..4].iter().map(|a| a.origin).collect();
        assert_eq!(origins, vec![6, 7, 14, 15]); // 1-based slots 5, 6, 13, 14
        for slot in [5u8, 6, 13, 14] {
            assert_eq!(round.formation.shape(slot), 0);
        }
        // Dispatch alone never touches the kill counter.
        assert_eq!(round.enemies_left, MAX_IN_FORMATION as u8);
    }

    #[test]
    fn empty_block_members_are_skipped_independently() {
        let mut round = fresh_round();
        round.formation.clear_slot(6);
        scan_and_promote(&mut round, 5);
        assert_eq!(active_count(&round), 3);
        let origins: Vec<u8> = round
            .attackers
            .iter()
            .filter(|a| a.active())
            .map(|a| a.origin)
            .collect();
        assert_eq!(origins, vec![6, 14, 15]);
    }

    #[test]
    fn block_near_the_last_row_clips_out_of_range() {
        let mut round = fresh_round();
        for i in 0..28 {
            round.formation.clear_slot(i);
        }
        // Only the last row remains; the row-below members of the block at
        // slot 28 fall out of range.
        scan_and_promote(&mut round, 28);
        assert_eq!(active_count(&round), 2);
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let mut round = fresh_round();
        for start in 0..10 {
            scan_and_promote(&mut round, start * 3);
            assert!(active_count(&round) <= MAX_ATTACKERS);
        }
        assert_eq!(active_count(&round), MAX_ATTACKERS);
        // Origin slots stay unique among active attackers.
        let mut origins: Vec<u8> = round.attackers.iter().map(|a| a.origin).collect();
        origins.sort_unstable();
        origins.dedup();
        assert_eq!(origins.len(), MAX_ATTACKERS);
    }

    #[test]
    fn dive_transitions_to_returning_at_screen_top() {
        let mut a = Attacker {
            origin: 1,
            shape: 0x43,
            x: 100 << 8,
            y: 1 << 8,
            dir: 16, // straight up
            returning: false,
        };
        fly(&mut a);
        assert!(a.returning);
    }

    #[test]
    fn returning_attacker_reenters_its_slot() {
        let mut round = fresh_round();
        round.formation.clear_slot(0);
        round.attackers[0] = Attacker {
            origin: 1,
            shape: 0x43,
            x: 200 << 8,
            y: (round.formation.slot_y(0) as u16) << 8,
            dir: 5,
            returning: true,
        };
        move_attackers(&mut round);
        assert!(!round.attackers[0].active());
        assert_eq!(round.formation.shape(0), 0x43);
    }

    #[test]
    fn returning_attacker_steers_toward_its_column() {
        let mut round = fresh_round();
        round.attackers[0] = Attacker {
            origin: 1,
            shape: 0x43,
            x: 200 << 8,
            y: 20 << 8, // 7 above the slot row at y=27
            dir: 0,
            returning: true,
        };
        move_attackers(&mut round);
        let a = round.attackers[0];
        assert!(a.active());
        assert_eq!(a.dir, (7 + 16) & 31);
        assert_eq!(a.pixel_x(), round.formation.slot_x(0));
        assert_eq!(a.y, (20 << 8) + 128);
    }

    #[test]
    fn upper_half_sweeps_toward_center() {
        let mut round = fresh_round();
        round.attackers[0] = Attacker {
            origin: 1,
            shape: 0x43,
            x: 40 << 8,
            y: 60 << 8,
            dir: 0,
            returning: false,
        };
        round.attackers[1] = Attacker {
            origin: 2,
            shape: 0x43,
            x: 180 << 8,
            y: 60 << 8,
            dir: 0,
            returning: false,
        };
        think_attackers(&mut round);
        assert_eq!(round.attackers[0].dir, 1);
        assert_eq!(round.attackers[1].dir, 31);
    }

    #[test]
    fn lower_half_fires_the_mirrored_missile_slot() {
        let mut round = fresh_round();
        round.attackers[2] = Attacker {
            origin: 3,
            shape: 0x43,
            x: 100 << 8,
            y: 150 << 8,
            dir: 0,
            returning: false,
        };
        think_attackers(&mut round);
        let m = round.missiles[2];
        assert!(m.active());
        assert_eq!((m.x, m.y, m.dy), (108, 245 - 150, -2));

        // Slot still occupied: no double fire.
        round.missiles[2].y = 200;
        think_attackers(&mut round);
        assert_eq!(round.missiles[2].y, 200);
    }
}
