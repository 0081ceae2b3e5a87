use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::Rng;

use crate::hw::{
    self, DisplayOutput, InputDevice, SilentAudio, TerminalDisplay, TerminalInput, TerminalTiming,
    VsyncCounter,
};
use crate::sim::{Round, RoundStatus};

pub struct App {
    pub should_quit: bool,
    pub paused: bool,
    pub round: Round,
    pub display: TerminalDisplay,
    pub audio: SilentAudio,
    pub input: TerminalInput,
    pub timing: TerminalTiming,
    pub high_score: u16, // packed decimal, like the live score
    pub rounds_played: u32,
}

impl App {
    pub fn new(vsync: VsyncCounter) -> Self {
        let seed: u16 = rand::thread_rng().gen();
        let mut round = Round::new(seed);
        let mut display = TerminalDisplay::new();
        let mut timing = TerminalTiming::new(vsync);
        display.clear();
        round.start(&mut display, &mut timing);

        Self {
            should_quit: false,
            paused: false,
            round,
            display,
            audio: SilentAudio::new(),
            input: TerminalInput::new(),
            timing,
            high_score: 0,
            rounds_played: 0,
        }
    }

    /// Runs every simulation tick that a hardware tick has been observed
    /// for since the last call. The event loop already slept at tick
    /// cadence, so instead of busy-waiting on the sync predicate we drain
    /// whatever frames are pending.
    pub fn on_tick(&mut self) {
        if self.paused {
            return;
        }
        let input = self.input.poll();
        while hw::frame_pending(&self.timing, self.round.frame_count()) {
            let status =
                self.round
                    .tick(&input, &mut self.display, &mut self.audio, &mut self.timing);
            self.track_high_score();
            if status == RoundStatus::Ended {
                self.next_round();
                break;
            }
        }
    }

    fn track_high_score(&mut self) {
        // Packed decimal compares correctly as a plain integer.
        if self.round.score_bcd() > self.high_score {
            self.high_score = self.round.score_bcd();
        }
    }

    fn next_round(&mut self) {
        self.rounds_played += 1;
        self.display.clear();
        self.round.start(&mut self.display, &mut self.timing);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.paused = !self.paused;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.display.clear();
                self.round.start(&mut self.display, &mut self.timing);
            }
            _ => self.input.handle_key(key),
        }
    }

    /// Displayed score is the packed word with a fixed trailing zero.
    pub fn score_display(&self) -> u32 {
        bcd_to_display(self.round.score_bcd())
    }

    pub fn high_score_display(&self) -> u32 {
        bcd_to_display(self.high_score)
    }
}

fn bcd_to_display(bcd: u16) -> u32 {
    let mut value = 0u32;
    for shift in [12, 8, 4, 0] {
        value = value * 10 + ((bcd >> shift) & 0xf) as u32;
    }
    value * 10
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::score::bcd_add;

    #[test]
    fn packed_score_formats_with_trailing_zero() {
        assert_eq!(bcd_to_display(0x0000), 0);
        assert_eq!(bcd_to_display(0x0012), 120);
        assert_eq!(bcd_to_display(0x9999), 99990);
        assert_eq!(bcd_to_display(bcd_add(0x09, 0x01)), 100);
    }

    #[test]
    fn ticks_only_run_when_vsync_advances() {
        let vsync = VsyncCounter::new();
        let mut app = App::new(vsync.clone());
        app.on_tick();
        assert_eq!(app.round.frame_count(), 0);
        vsync.pulse();
        app.on_tick();
        assert_eq!(app.round.frame_count(), 1);
    }
}
