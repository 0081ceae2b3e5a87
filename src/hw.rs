//! Capability interfaces between the simulation core and the outside world,
//! plus their terminal-backed implementations.
//!
//! The core never touches the terminal directly: it writes cells, sprites,
//! missiles, scroll registers and sound parameters through these traits, and
//! reads input and timing the same way. `ui::render` consumes whatever the
//! adapters have latched.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};

/// Logical screen size in pixels (portrait, arcade orientation).
pub const SCREEN_WIDTH: u16 = 224;
pub const SCREEN_HEIGHT: u16 = 256;

/// Glyph code for an empty cell.
pub const BLANK: u8 = 0x10;

/// ASCII to glyph code. Digits land at 0x00..=0x09.
pub fn glyph(ch: u8) -> u8 {
    ch.wrapping_sub(0x30)
}

/// Writes a text label into the cell grid. Spaces become blank cells.
pub fn draw_text(display: &mut dyn DisplayOutput, x: u8, y: u8, text: &str) {
    for (i, ch) in text.bytes().enumerate() {
        let code = if ch == b' ' { BLANK } else { glyph(ch) };
        display.set_cell(x.wrapping_add(i as u8), y, code);
    }
}

#[derive(Clone, Copy, Default)]
pub struct Sprite {
    pub x: u8,
    pub y: u8,
    pub shape: u8,
    pub flip_x: bool,
    pub flip_y: bool,
    pub color: u8,
    pub visible: bool,
}

/// Write-only display surface: a 32x32 glyph grid with per-column scroll
/// and attribute bytes, 8 sprite slots and 8 missile slots. Column indices
/// wrap at 32, matching the modeled video hardware; cells written into the
/// wrapped margin scroll into view from the left edge.
pub trait DisplayOutput {
    fn set_cell(&mut self, col: u8, row: u8, glyph: u8);
    fn set_sprite(&mut self, slot: usize, sprite: Sprite);
    fn set_missile(&mut self, slot: usize, x: u8, y: u8);
    fn set_column_scroll(&mut self, col: u8, offset: u8);
    fn set_column_attribute(&mut self, col: u8, value: u8);
    fn configure_missiles(&mut self, width: u8, offset: u8);
    fn clear(&mut self);
}

/// The two independent halves of the sound chip: `A` carries player and
/// effect sounds, `B` the enemy dive tones.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Chip {
    A,
    B,
}

impl Chip {
    fn index(self) -> usize {
        match self {
            Chip::A => 0,
            Chip::B => 1,
        }
    }
}

/// Write-only audio parameters, refreshed once per tick.
pub trait AudioOutput {
    fn set_pitch(&mut self, chip: Chip, channel: usize, value: u8);
    fn set_envelope(&mut self, chip: Chip, channel: usize, value: u8);
    fn set_enable(&mut self, chip: Chip, mask: u8);
}

#[derive(Clone, Copy, Default)]
pub struct PlayerInputs {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
    pub bomb: bool,
}

/// Per-tick snapshot of the digital inputs.
#[derive(Clone, Copy, Default)]
pub struct InputState {
    pub p1: PlayerInputs,
    pub p2: PlayerInputs,
    pub coin1: bool,
    pub coin2: bool,
    pub start1: bool,
    pub start2: bool,
}

pub trait InputDevice {
    fn poll(&mut self) -> InputState;
}

/// External tick source and watchdog. `ticks` is incremented by an
/// asynchronous context (the event thread here, a vertical-sync interrupt
/// on the modeled board) and only ever read by the simulation.
pub trait TimingSource {
    fn ticks(&self) -> u8;
    fn reset_ticks(&mut self);
    fn set_irq_enabled(&mut self, enabled: bool);
    fn assert_liveness(&mut self);
}

/// True when at least one hardware tick has elapsed since software frame
/// `frame_count` was entered. Compares only the low two bits, which
/// tolerates the counter advancing between reads within the same tick.
pub fn frame_pending(timing: &dyn TimingSource, frame_count: u16) -> bool {
    (timing.ticks() ^ frame_count as u8) & 3 != 0
}

/// Blocks (polling) until the next hardware tick boundary.
pub fn wait_for_tick(timing: &dyn TimingSource, frame_count: u16) {
    while !frame_pending(timing, frame_count) {
        std::hint::spin_loop();
    }
}

// ── Terminal adapters ──────────────────────────────────────────────────

/// Shared tick counter incremented by the event thread.
#[derive(Clone)]
pub struct VsyncCounter {
    count: Arc<AtomicU8>,
}

impl VsyncCounter {
    pub fn new() -> Self {
        Self {
            count: Arc::new(AtomicU8::new(0)),
        }
    }

    /// Called from the event thread once per tick interval.
    pub fn pulse(&self) {
        let _ = self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u8 {
        self.count.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}

pub struct TerminalTiming {
    vsync: VsyncCounter,
    pub irq_enabled: bool,
    pub liveness_asserts: u64,
}

impl TerminalTiming {
    pub fn new(vsync: VsyncCounter) -> Self {
        Self {
            vsync,
            irq_enabled: false,
            liveness_asserts: 0,
        }
    }
}

impl TimingSource for TerminalTiming {
    fn ticks(&self) -> u8 {
        self.vsync.get()
    }

    fn reset_ticks(&mut self) {
        self.vsync.reset();
    }

    fn set_irq_enabled(&mut self, enabled: bool) {
        self.irq_enabled = enabled;
    }

    fn assert_liveness(&mut self) {
        self.liveness_asserts += 1;
    }
}

/// Latched display state read by `ui::render`.
pub struct TerminalDisplay {
    pub cells: [[u8; 32]; 32], // [row][col]
    pub scroll: [u8; 32],
    pub attrib: [u8; 32],
    pub sprites: [Sprite; 8],
    pub missiles: [(u8, u8); 8], // (x, raw ypos); active iff ypos != 0
    pub missile_width: u8,
    pub missile_offset: u8,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self {
            cells: [[BLANK; 32]; 32],
            scroll: [0; 32],
            attrib: [0; 32],
            sprites: [Sprite::default(); 8],
            missiles: [(0xff, 0); 8],
            missile_width: 0,
            missile_offset: 0,
        }
    }
}

impl DisplayOutput for TerminalDisplay {
    fn set_cell(&mut self, col: u8, row: u8, glyph: u8) {
        self.cells[(row & 31) as usize][(col & 31) as usize] = glyph;
    }

    fn set_sprite(&mut self, slot: usize, sprite: Sprite) {
        if slot < 8 {
            self.sprites[slot] = sprite;
        }
    }

    fn set_missile(&mut self, slot: usize, x: u8, y: u8) {
        if slot < 8 {
            self.missiles[slot] = (x, y);
        }
    }

    fn set_column_scroll(&mut self, col: u8, offset: u8) {
        self.scroll[(col & 31) as usize] = offset;
    }

    fn set_column_attribute(&mut self, col: u8, value: u8) {
        self.attrib[(col & 31) as usize] = value;
    }

    fn configure_missiles(&mut self, width: u8, offset: u8) {
        self.missile_width = width;
        self.missile_offset = offset;
    }

    fn clear(&mut self) {
        *self = TerminalDisplay::new();
    }
}

/// Records the last written sound parameters; a terminal has no sound chip,
/// but the status bar surfaces channel activity from the enable masks.
pub struct SilentAudio {
    pub pitch: [[u8; 3]; 2],
    pub envelope: [[u8; 3]; 2],
    pub enable: [u8; 2],
}

impl SilentAudio {
    pub fn new() -> Self {
        Self {
            pitch: [[0; 3]; 2],
            envelope: [[0; 3]; 2],
            enable: [0; 2],
        }
    }

    pub fn active_channels(&self) -> u32 {
        (self.enable[0] | self.enable[1]).count_ones()
    }
}

impl AudioOutput for SilentAudio {
    fn set_pitch(&mut self, chip: Chip, channel: usize, value: u8) {
        if channel < 3 {
            self.pitch[chip.index()][channel] = value;
        }
    }

    fn set_envelope(&mut self, chip: Chip, channel: usize, value: u8) {
        if channel < 3 {
            self.envelope[chip.index()][channel] = value;
        }
    }

    fn set_enable(&mut self, chip: Chip, mask: u8) {
        self.enable[chip.index()] = mask;
    }
}

// Terminals report key presses and auto-repeats, not releases, so each
// press arms a short hold window measured in polled ticks.
const HOLD_TICKS: u8 = 4;

#[derive(Default)]
pub struct TerminalInput {
    left: u8,
    right: u8,
    up: u8,
    down: u8,
    fire: u8,
    bomb: u8,
    coin: u8,
    start: u8,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('a') => self.left = HOLD_TICKS,
            KeyCode::Right | KeyCode::Char('d') => self.right = HOLD_TICKS,
            KeyCode::Up | KeyCode::Char('w') => self.up = HOLD_TICKS,
            KeyCode::Down | KeyCode::Char('s') => self.down = HOLD_TICKS,
            KeyCode::Char(' ') => self.fire = HOLD_TICKS,
            KeyCode::Char('b') => self.bomb = HOLD_TICKS,
            KeyCode::Char('c') => self.coin = HOLD_TICKS,
            KeyCode::Char('1') => self.start = HOLD_TICKS,
            _ => {}
        }
    }
}

fn drain(counter: &mut u8) -> bool {
    let held = *counter > 0;
    *counter = counter.saturating_sub(1);
    held
}

impl InputDevice for TerminalInput {
    fn poll(&mut self) -> InputState {
        InputState {
            p1: PlayerInputs {
                left: drain(&mut self.left),
                right: drain(&mut self.right),
                up: drain(&mut self.up),
                down: drain(&mut self.down),
                fire: drain(&mut self.fire),
                bomb: drain(&mut self.bomb),
            },
            p2: PlayerInputs::default(),
            coin1: drain(&mut self.coin),
            coin2: false,
            start1: drain(&mut self.start),
            start2: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTiming(u8);

    impl TimingSource for FixedTiming {
        fn ticks(&self) -> u8 {
            self.0
        }
        fn reset_ticks(&mut self) {
            self.0 = 0;
        }
        fn set_irq_enabled(&mut self, _enabled: bool) {}
        fn assert_liveness(&mut self) {}
    }

    #[test]
    fn frame_pending_compares_low_two_bits() {
        assert!(!frame_pending(&FixedTiming(0), 0));
        assert!(frame_pending(&FixedTiming(1), 0));
        assert!(frame_pending(&FixedTiming(3), 0));
        // Counter wrapped a full 4-step cycle: indistinguishable, blocked.
        assert!(!frame_pending(&FixedTiming(4), 0));
        assert!(!frame_pending(&FixedTiming(0xfd), 0x03fd));
    }

    #[test]
    fn wait_returns_once_a_tick_is_pending() {
        wait_for_tick(&FixedTiming(1), 0);
    }

    #[test]
    fn display_cell_indices_wrap() {
        let mut d = TerminalDisplay::new();
        d.set_cell(0xff, 29, 0x60);
        assert_eq!(d.cells[29][31], 0x60);
    }

    #[test]
    fn text_spaces_are_blank() {
        let mut d = TerminalDisplay::new();
        draw_text(&mut d, 0, 0, "A 1");
        assert_eq!(d.cells[0][0], glyph(b'A'));
        assert_eq!(d.cells[0][1], BLANK);
        assert_eq!(d.cells[0][2], 0x01);
    }

    #[test]
    fn input_hold_window_drains() {
        let mut input = TerminalInput::new();
        input.left = 2;
        assert!(input.poll().p1.left);
        assert!(input.poll().p1.left);
        assert!(!input.poll().p1.left);
    }
}
