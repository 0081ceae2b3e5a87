//! Hit resolution and the shared explosion effect.
//!
//! All tests run over byte coordinates with wrapping subtraction; invalid
//! positions fall out of the subsequent range checks. At most one hit of
//! each kind resolves per tick, and a deferred overlap simply matches again
//! on the next tick because nothing has consumed it.

use crate::hw::{DisplayOutput, Sprite};
use crate::sim::formation::{
    ENEMIES_PER_ROW, ENEMY_ROWS, FORMATION_X0, FORMATION_XSPACE, FORMATION_Y0, FORMATION_YSPACE,
};
use crate::sim::missiles::PLAYER_MISSILE;
use crate::sim::player::PLAYER_Y;
use crate::sim::round::Round;

/// Sprite slot reserved for the one shared explosion animation.
pub const EXPLOSION_SPRITE: usize = 6;

const FORMATION_KILL_SCORE: u16 = 2;
const ATTACKER_KILL_SCORE: u16 = 5;
const HITBOX: u8 = 16;

/// Shared single-sprite explosion: `frame` is 0 when idle.
#[derive(Clone, Copy, Default)]
pub struct ExplosionEffect {
    pub frame: u8,
    pub x: u8,
    pub y: u8,
}

fn in_rect(x: u8, y: u8, x0: u8, y0: u8, w: u8, h: u8) -> bool {
    x.wrapping_sub(x0) < w && y.wrapping_sub(y0) < h
}

pub fn blowup_at(round: &mut Round, display: &mut dyn DisplayOutput, x: u8, y: u8) {
    display.set_sprite(
        EXPLOSION_SPRITE,
        Sprite {
            x,
            y,
            shape: 28,
            color: 1,
            visible: true,
            ..Sprite::default()
        },
    );
    round.explosion = ExplosionEffect { frame: 1, x, y };
}

/// Runs on a sub-cadence; hides the effect after 4 frames.
pub fn animate_enemy_explosion(round: &mut Round, display: &mut dyn DisplayOutput) {
    if round.explosion.frame == 0 {
        return;
    }
    let shape = 28 + round.explosion.frame;
    round.explosion.frame += 1;
    if round.explosion.frame > 4 {
        round.explosion.frame = 0;
        display.set_sprite(
            EXPLOSION_SPRITE,
            Sprite {
                y: 255,
                visible: false,
                ..Sprite::default()
            },
        );
    } else {
        display.set_sprite(
            EXPLOSION_SPRITE,
            Sprite {
                x: round.explosion.x,
                y: round.explosion.y,
                shape,
                color: 1,
                visible: true,
                ..Sprite::default()
            },
        );
    }
}

fn hide_player_missile(round: &mut Round) {
    round.missiles[PLAYER_MISSILE].y = 0;
    round.missiles[PLAYER_MISSILE].x = 0xff;
}

/// Maps the player's shot back to a formation cell by inverting the slot
/// mapping; a hit destroys exactly that cell.
pub fn player_shot_vs_formation(round: &mut Round, display: &mut dyn DisplayOutput) {
    let mx = round.missiles[PLAYER_MISSILE].x;
    let my = round.missiles[PLAYER_MISSILE].screen_y();
    let row = (my as i16 - FORMATION_Y0 as i16) / FORMATION_YSPACE as i16;
    if !(0..ENEMY_ROWS as i16).contains(&row) {
        return;
    }
    // Wrapping subtraction; out-of-range results are discarded below.
    let xoffset = mx
        .wrapping_sub(FORMATION_X0)
        .wrapping_sub(round.formation.offset_x);
    let column = xoffset / FORMATION_XSPACE;
    let localx = xoffset - column * FORMATION_XSPACE;
    if (column as usize) < ENEMIES_PER_ROW && localx < HITBOX {
        let index = column + row as u8 * ENEMIES_PER_ROW as u8;
        if round.formation.shape(index) != 0 {
            round.formation.clear_slot(index);
            round.enemies_left -= 1;
            let x = round.formation.slot_x(index);
            let y = round.formation.slot_y(index);
            blowup_at(round, display, x, y);
            hide_player_missile(round);
            round.add_score(display, FORMATION_KILL_SCORE);
        }
    }
}

/// Bounding-box test against each active attacker; the first overlap wins
/// and the attacker is destroyed outright, never returned to formation.
pub fn player_shot_vs_attacker(round: &mut Round, display: &mut dyn DisplayOutput) {
    let mx = round.missiles[PLAYER_MISSILE].x;
    let my = round.missiles[PLAYER_MISSILE].screen_y();
    for i in 0..round.attackers.len() {
        let a = round.attackers[i];
        if a.active() && in_rect(mx, my, a.pixel_x(), a.pixel_y(), HITBOX, HITBOX) {
            blowup_at(round, display, a.pixel_x(), a.pixel_y());
            round.attackers[i].origin = 0;
            round.enemies_left -= 1;
            hide_player_missile(round);
            round.add_score(display, ATTACKER_KILL_SCORE);
            break;
        }
    }
}

/// Starts the player explosion on the first enemy missile overlap; a
/// player already exploding cannot be hit again.
pub fn missile_hits_player(round: &mut Round) {
    if round.player.exploding != 0 {
        return;
    }
    for missile in round.missiles.iter().take(round.attackers.len()) {
        if missile.dy != 0
            && in_rect(
                missile.x,
                missile.screen_y(),
                round.player.x,
                PLAYER_Y,
                HITBOX,
                HITBOX,
            )
        {
            round.player.exploding = 1;
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::TerminalDisplay;
    use crate::sim::attackers::Attacker;
    use crate::sim::formation::MAX_IN_FORMATION;
    use crate::sim::missiles::Missile;
    use crate::sim::round::Round;

    fn fresh_round() -> Round {
        let mut round = Round::new(1);
        round.formation.reset();
        round.enemies_left = MAX_IN_FORMATION as u8;
        round
    }

    #[test]
    fn shot_destroys_exactly_one_formation_cell() {
        let mut round = fresh_round();
        let mut d = TerminalDisplay::new();
        // Aim at row 1, column 3: x = 3*24 + 18, y = 16 + 27.
        round.missiles[PLAYER_MISSILE] = Missile {
            dy: 4,
            x: 95,
            y: 255 - 50,
        };
        player_shot_vs_formation(&mut round, &mut d);

        let index = 3 + ENEMIES_PER_ROW as u8;
        assert_eq!(round.formation.shape(index), 0);
        assert_eq!(round.enemies_left, MAX_IN_FORMATION as u8 - 1);
        assert_eq!(round.score.value(), FORMATION_KILL_SCORE);
        assert!(!round.missiles[PLAYER_MISSILE].active());
        assert_eq!(round.explosion.frame, 1);
        // Every other cell is untouched.
        let occupied = (0..MAX_IN_FORMATION as u8)
            .filter(|&i| round.formation.shape(i) != 0)
            .count();
        assert_eq!(occupied, MAX_IN_FORMATION - 1);
    }

    #[test]
    fn shot_misses_between_cells() {
        let mut round = fresh_round();
        let mut d = TerminalDisplay::new();
        // Local x 20 within the 24-wide cell is past the 16-wide sprite.
        round.missiles[PLAYER_MISSILE] = Missile {
            dy: 4,
            x: 18 + 20,
            y: 255 - 30,
        };
        player_shot_vs_formation(&mut round, &mut d);
        assert_eq!(round.enemies_left, MAX_IN_FORMATION as u8);
    }

    #[test]
    fn inactive_shot_cannot_hit_the_formation() {
        let mut round = fresh_round();
        let mut d = TerminalDisplay::new();
        round.missiles[PLAYER_MISSILE] = Missile {
            dy: 4,
            x: 0xff,
            y: 0,
        };
        player_shot_vs_formation(&mut round, &mut d);
        assert_eq!(round.enemies_left, MAX_IN_FORMATION as u8);
    }

    #[test]
    fn first_attacker_overlap_wins() {
        let mut round = fresh_round();
        let mut d = TerminalDisplay::new();
        for i in 0..2 {
            round.attackers[i] = Attacker {
                origin: (i + 1) as u8,
                shape: 0x43,
                x: 100 << 8,
                y: 150 << 8,
                dir: 0,
                returning: false,
            };
        }
        round.missiles[PLAYER_MISSILE] = Missile {
            dy: 4,
            x: 105,
            y: 255 - 160,
        };
        player_shot_vs_attacker(&mut round, &mut d);

        assert!(!round.attackers[0].active());
        assert!(round.attackers[1].active()); // deferred to a later tick
        assert_eq!(round.enemies_left, MAX_IN_FORMATION as u8 - 1);
        assert_eq!(round.score.value(), ATTACKER_KILL_SCORE);
        assert!(!round.missiles[PLAYER_MISSILE].active());
    }

    #[test]
    fn destroyed_attacker_never_returns_to_formation() {
        let mut round = fresh_round();
        let mut d = TerminalDisplay::new();
        round.formation.clear_slot(4);
        round.attackers[0] = Attacker {
            origin: 5,
            shape: 0x43,
            x: 60 << 8,
            y: 90 << 8,
            dir: 0,
            returning: true,
        };
        round.missiles[PLAYER_MISSILE] = Missile {
            dy: 4,
            x: 60,
            y: 255 - 90,
        };
        player_shot_vs_attacker(&mut round, &mut d);
        assert!(!round.attackers[0].active());
        assert_eq!(round.formation.shape(4), 0);
    }

    #[test]
    fn enemy_missile_triggers_player_explosion_once() {
        let mut round = fresh_round();
        round.player.x = 112;
        round.missiles[0] = Missile {
            dy: -2,
            x: 117,
            y: 255 - 235,
        };
        missile_hits_player(&mut round);
        assert_eq!(round.player.exploding, 1);

        round.player.exploding = 9;
        missile_hits_player(&mut round);
        assert_eq!(round.player.exploding, 9);
    }

    #[test]
    fn explosion_effect_hides_after_four_frames() {
        let mut round = fresh_round();
        let mut d = TerminalDisplay::new();
        blowup_at(&mut round, &mut d, 80, 80);
        assert!(d.sprites[EXPLOSION_SPRITE].visible);
        for expected_shape in [29, 30, 31] {
            animate_enemy_explosion(&mut round, &mut d);
            assert_eq!(d.sprites[EXPLOSION_SPRITE].shape, expected_shape);
        }
        animate_enemy_explosion(&mut round, &mut d);
        assert!(!d.sprites[EXPLOSION_SPRITE].visible);
        assert_eq!(round.explosion.frame, 0);
    }
}
