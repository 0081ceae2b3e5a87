//! The per-round state aggregate and the fixed per-tick update order.

use crate::hw::{
    draw_text, AudioOutput, Chip, DisplayOutput, InputState, TimingSource,
};
use crate::sim::attackers::{self, Attacker, MAX_ATTACKERS};
use crate::sim::collision::{self, ExplosionEffect};
use crate::sim::formation::{Formation, MAX_IN_FORMATION};
use crate::sim::missiles::{self, Missile, MISSILE_SLOTS, PLAYER_MISSILE};
use crate::sim::player::{self, Player, RESPAWN_THRESHOLD};
use crate::sim::rng::Lfsr;
use crate::sim::score::Score;

/// Wave dispatch cadence: every 128 ticks.
const WAVE_INTERVAL_MASK: u16 = 0x7f;
/// Dispatch stops once the fleet is whittled down to this floor.
const WAVE_FLOOR: u8 = 8;
const END_TIMER_START: u8 = 255;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RoundStatus {
    Running,
    Ended,
}

/// All mutable state of one round. Created at round start, mutated every
/// tick by the component passes, discarded when the round ends.
pub struct Round {
    pub(crate) formation: Formation,
    pub(crate) attackers: [Attacker; MAX_ATTACKERS],
    pub(crate) missiles: [Missile; MISSILE_SLOTS],
    pub(crate) player: Player,
    pub(crate) explosion: ExplosionEffect,
    pub(crate) score: Score,
    pub(crate) enemies_left: u8,
    pub(crate) frame_count: u16,
    pub(crate) end_timer: u8,
    pub(crate) rng: Lfsr,
}

impl Round {
    pub fn new(seed: u16) -> Self {
        Self {
            formation: Formation::new(),
            attackers: [Attacker::default(); MAX_ATTACKERS],
            missiles: [Missile::default(); MISSILE_SLOTS],
            player: Player::default(),
            explosion: ExplosionEffect::default(),
            score: Score::default(),
            enemies_left: 0,
            frame_count: 0,
            end_timer: END_TIMER_START,
            rng: Lfsr::new(seed),
        }
    }

    /// Round prologue: fresh formation and entities, score cleared and
    /// drawn, tick counters realigned, player spawned.
    pub fn start(&mut self, display: &mut dyn DisplayOutput, timing: &mut dyn TimingSource) {
        self.formation.reset();
        self.formation.direction = 1;
        self.attackers = [Attacker::default(); MAX_ATTACKERS];
        self.missiles = [Missile::default(); MISSILE_SLOTS];
        self.explosion = ExplosionEffect::default();
        self.enemies_left = MAX_IN_FORMATION as u8;
        self.score = Score::default();
        self.end_timer = END_TIMER_START;
        self.frame_count = 0;

        draw_text(display, 0, 0, "PLAYER 1");
        self.add_score(display, 0);
        display.configure_missiles(4, 0);
        timing.reset_ticks();
        player::new_player_ship(self, display);
    }

    pub fn score_bcd(&self) -> u16 {
        self.score.value()
    }

    pub fn enemies_left(&self) -> u8 {
        self.enemies_left
    }

    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }

    pub fn player_exploding(&self) -> bool {
        self.player.exploding != 0
    }

    pub(crate) fn add_score(&mut self, display: &mut dyn DisplayOutput, bcd: u16) {
        self.score.add(bcd);
        self.score.draw(display, 0, 1);
        // Fixed trailing zero: awards are stored at a tenth of their
        // displayed value.
        display.set_cell(4, 1, 0);
    }

    /// One simulation tick. The pass order is load-bearing: collisions see
    /// entity positions from after this tick's motion, and dispatch sees
    /// the formation before any of this tick's kills are scored.
    pub fn tick(
        &mut self,
        input: &InputState,
        display: &mut dyn DisplayOutput,
        audio: &mut dyn AudioOutput,
        timing: &mut dyn TimingSource,
    ) -> RoundStatus {
        timing.set_irq_enabled(false);
        timing.set_irq_enabled(true);

        if self.player.exploding != 0 {
            if self.frame_count & 7 == 1 {
                player::animate_player_explosion(self, display);
                self.player.exploding += 1;
                if self.player.exploding > RESPAWN_THRESHOLD && self.enemies_left != 0 {
                    player::new_player_ship(self, display);
                }
            }
        } else {
            if self.frame_count & WAVE_INTERVAL_MASK == 0 && self.enemies_left > WAVE_FLOOR {
                attackers::new_attack_wave(self);
            }
            player::move_player(self, input, display);
            collision::missile_hits_player(self);
        }
        if self.frame_count & 3 == 0 {
            collision::animate_enemy_explosion(self, display);
        }
        attackers::move_attackers(self);
        missiles::move_missiles(self, display);
        collision::player_shot_vs_formation(self, display);
        collision::player_shot_vs_attacker(self, display);
        self.formation.draw_next_row(display);
        attackers::draw_attackers(self, display);
        if self.frame_count & 0xf == 0 {
            attackers::think_attackers(self);
        }
        self.set_sounds(audio);
        self.frame_count = self.frame_count.wrapping_add(1);
        timing.assert_liveness();

        if self.enemies_left == 0 {
            self.end_timer = self.end_timer.saturating_sub(1);
            if self.end_timer == 0 {
                return RoundStatus::Ended;
            }
        }
        RoundStatus::Running
    }

    /// Derives this tick's sound parameters: chip A carries the player
    /// shot, the shared explosion and the player's death; chip B carries
    /// one dive tone per low attacker slot.
    fn set_sounds(&self, audio: &mut dyn AudioOutput) {
        let mut enable = 0u8;
        let shot = &self.missiles[PLAYER_MISSILE];
        if shot.active() {
            audio.set_pitch(Chip::A, 0, shot.y);
            audio.set_envelope(Chip::A, 0, 15 - (shot.y >> 4));
            enable |= 0x1;
        }
        if self.explosion.frame != 0 {
            audio.set_pitch(Chip::A, 1, self.explosion.frame);
            audio.set_envelope(Chip::A, 1, 15);
            enable |= 0x2;
        }
        if self.player.exploding != 0 && self.player.exploding < 15 {
            audio.set_envelope(Chip::A, 2, 15 - self.player.exploding);
            enable |= 0x20;
        }
        audio.set_enable(Chip::A, enable);

        let mut enable = 0u8;
        for (i, a) in self.attackers.iter().take(3).enumerate() {
            let y = a.pixel_y();
            if a.active() && y >= 0x80 {
                audio.set_pitch(Chip::B, i, y);
                audio.set_envelope(Chip::B, i, 7);
                enable |= 1 << i;
            }
        }
        audio.set_enable(Chip::B, enable);
    }
}
