//! Terminal presentation of the latched display state.
//!
//! The field is drawn the way the tile hardware would scan it: each cell row
//! carries its own scroll register, pixels past column 224 are blanked, and
//! sprites overlay the tile layer. Pixel art is stamped as braille dots so a
//! 224x256 field fits a normal terminal.

use std::collections::HashMap;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::hw::{TerminalDisplay, BLANK, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Sprites and missiles land this many pixels right of the tile grid.
const SPRITE_X_OFFSET: u8 = 16;

pub fn render(frame: &mut Frame, app: &mut App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(120, 200, 255)))
        .title(" Galaxide ")
        .title_style(
            Style::default()
                .fg(Color::Rgb(150, 220, 255))
                .add_modifier(Modifier::BOLD),
        );

    let inner = block.inner(frame.area());
    frame.render_widget(block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(inner);

    let status = Line::from(vec![
        Span::styled(
            format!(" Score: {:05} ", app.score_display()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("High: {:05} ", app.high_score_display()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("Fleet: {} ", app.round.enemies_left()),
            Style::default().fg(Color::Rgb(255, 120, 255)),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("Round: {} ", app.rounds_played + 1),
            Style::default().fg(Color::Green),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("Snd: {} ", app.audio.active_channels()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            if app.round.player_exploding() {
                " SHIP DOWN "
            } else {
                ""
            },
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(status), chunks[0]);

    let fw = chunks[1].width as usize;
    let fh = chunks[1].height as usize;
    if fw > 0 && fh > 0 {
        let lines = render_field(&app.display, fw, fh);
        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    if app.paused {
        let msg = Paragraph::new(Line::from(vec![Span::styled(
            " PAUSED - Press P to resume ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )]));
        frame.render_widget(msg, chunks[2]);
    } else {
        let help = Paragraph::new(Line::from(vec![
            Span::styled(" \u{2190}\u{2192} Move ", Style::default().fg(Color::DarkGray)),
            Span::styled("| ", Style::default().fg(Color::Rgb(60, 60, 60))),
            Span::styled(
                "Space Fire ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::Rgb(60, 60, 60))),
            Span::styled("P Pause ", Style::default().fg(Color::DarkGray)),
            Span::styled("| ", Style::default().fg(Color::Rgb(60, 60, 60))),
            Span::styled("R Restart ", Style::default().fg(Color::DarkGray)),
            Span::styled("| ", Style::default().fg(Color::Rgb(60, 60, 60))),
            Span::styled("Q Quit", Style::default().fg(Color::DarkGray)),
        ]));
        frame.render_widget(help, chunks[2]);
    }
}

// ── Braille rendering ──────────────────────────────────────────────────

fn braille_bit(sub_x: usize, sub_y: usize) -> u8 {
    match (sub_x, sub_y) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0,
    }
}

fn set_dot(map: &mut HashMap<(usize, usize), u8>, bx: i32, by: i32, bw: i32, bh: i32) {
    if bx < 0 || by < 0 || bx >= bw || by >= bh {
        return;
    }
    let cx = bx as usize / 2;
    let cy = by as usize / 4;
    let sx = bx as usize % 2;
    let sy = by as usize % 4;
    *map.entry((cx, cy)).or_insert(0) |= braille_bit(sx, sy);
}

fn write_layer(
    grid: &mut [Vec<(char, Style)>],
    map: &HashMap<(usize, usize), u8>,
    w: usize,
    h: usize,
    color: Color,
    bg: Color,
    bold: bool,
) {
    for (&(cx, cy), &bits) in map {
        if cx < w && cy < h && bits != 0 {
            let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
            let mut style = Style::default().fg(color).bg(bg);
            if bold {
                style = style.add_modifier(Modifier::BOLD);
            }
            grid[cy][cx] = (ch, style);
        }
    }
}

/// A dormant fleet enemy occupies two tiles; stamped once at the left tile.
fn stamp_fleet_enemy(map: &mut HashMap<(usize, usize), u8>, bx: i32, by: i32, bw: i32, bh: i32) {
    let dots = [
        (1, 0),
        (5, 0),
        (2, 1),
        (3, 1),
        (4, 1),
        (0, 2),
        (2, 2),
        (4, 2),
        (6, 2),
        (1, 3),
        (5, 3),
    ];
    for &(dx, dy) in &dots {
        set_dot(map, bx + dx, by + dy, bw, bh);
    }
}

/// The ship is a 4-tile block; stamped once at its top-left tile.
fn stamp_ship(map: &mut HashMap<(usize, usize), u8>, bx: i32, by: i32, bw: i32, bh: i32) {
    let dots = [
        (3, 0),
        (3, 1),
        (2, 2),
        (3, 2),
        (4, 2),
        (1, 3),
        (2, 3),
        (3, 3),
        (4, 3),
        (5, 3),
        (0, 4),
        (2, 4),
        (4, 4),
        (6, 4),
    ];
    for &(dx, dy) in &dots {
        set_dot(map, bx + dx, by + dy, bw, bh);
    }
}

/// Player-explosion overlay tiles. The tile code's low nibble seeds the
/// scatter so the block does not look uniform.
fn stamp_debris(map: &mut HashMap<(usize, usize), u8>, bx: i32, by: i32, code: u8, bw: i32, bh: i32) {
    let seed = (code & 0xf) as i32;
    let dots = [
        (seed & 3, (seed >> 2) & 3),
        ((seed + 1) & 3, (seed + 2) & 3),
        (3 - (seed & 3), (seed + 3) & 3),
    ];
    for &(dx, dy) in &dots {
        set_dot(map, bx + dx, by + dy, bw, bh);
    }
}

/// Diving raider, drawn from its sprite orientation: the 7 base shapes fold
/// into level flight, a bank and a vertical dive, with the flips applied on
/// top.
fn stamp_raider(
    map: &mut HashMap<(usize, usize), u8>,
    bx: i32,
    by: i32,
    orient: u8,
    flip_x: bool,
    flip_y: bool,
    bw: i32,
    bh: i32,
) {
    let dots: &[(i32, i32)] = match orient {
        0 | 1 => &[(3, 0), (1, 1), (3, 1), (5, 1), (0, 2), (2, 2), (4, 2), (6, 2), (3, 3)],
        2..=4 => &[(4, 0), (5, 0), (2, 1), (3, 1), (4, 1), (1, 2), (2, 2), (0, 3), (1, 3)],
        _ => &[(1, 0), (2, 0), (1, 1), (2, 1), (0, 2), (3, 2), (1, 3), (2, 3), (1, 4)],
    };
    for &(dx, dy) in dots {
        let x = if flip_x { 6 - dx } else { dx };
        let y = if flip_y { 4 - dy } else { dy };
        set_dot(map, bx + x, by + y, bw, bh);
    }
}

fn stamp_burst(map: &mut HashMap<(usize, usize), u8>, bx: i32, by: i32, phase: i32, bw: i32, bh: i32) {
    let r = phase.max(1);
    for &(dx, dy) in &[(0, 0), (r, 0), (-r, 0), (0, r), (0, -r), (r, r), (-r, -r)] {
        set_dot(map, bx + dx, by + dy, bw, bh);
    }
}

fn attribute_color(attrib: u8) -> Color {
    match attrib {
        1 => Color::Rgb(80, 255, 120),
        2 => Color::Rgb(255, 120, 255),
        _ => Color::Rgb(220, 220, 220),
    }
}

fn render_field(display: &TerminalDisplay, width: usize, height: usize) -> Vec<Line<'static>> {
    let w = width;
    let h = height;
    let bw = (w * 2) as i32;
    let bh = (h * 4) as i32;
    let bsx = bw as f32 / SCREEN_WIDTH as f32;
    let bsy = bh as f32 / SCREEN_HEIGHT as f32;

    let bg = Color::Rgb(0, 0, 5);
    let mut grid: Vec<Vec<(char, Style)>> = vec![vec![(' ', Style::default().bg(bg)); w]; h];

    // ── Tile layer ─────────────────────────────────────────────────────
    let mut player_map: HashMap<(usize, usize), u8> = HashMap::new();
    let mut fleet_map: HashMap<(usize, usize), u8> = HashMap::new();
    let mut debris_map: HashMap<(usize, usize), u8> = HashMap::new();
    let mut text_cells: Vec<(usize, usize, char, u8)> = Vec::new();

    for row in 0..32usize {
        let py = (row * 8) as u8;
        for col in 0..32usize {
            let code = display.cells[row][col];
            if code == BLANK {
                continue;
            }
            // Per-row scroll with byte wrap; the overscan strip is blanked.
            let px = (col as u8).wrapping_mul(8).wrapping_add(display.scroll[row]);
            if px >= SCREEN_WIDTH as u8 {
                continue;
            }
            let bx = (px as f32 * bsx) as i32;
            let by = (py as f32 * bsy) as i32;
            match code {
                0x00..=0x2f => {
                    let cx = (bx / 2) as usize;
                    let cy = (by / 4) as usize;
                    text_cells.push((cx, cy, (code + 0x30) as char, display.attrib[row]));
                }
                0x43 => stamp_fleet_enemy(&mut fleet_map, bx, by, bw, bh),
                0x41 => {} // right half of a fleet enemy
                0x60 => stamp_ship(&mut player_map, bx, by, bw, bh),
                0x61..=0x63 => {} // remaining quarters of the ship block
                0xc0..=0xff => stamp_debris(&mut debris_map, bx, by, code, bw, bh),
                _ => {}
            }
        }
    }

    write_layer(&mut grid, &fleet_map, w, h, Color::Rgb(255, 120, 255), bg, false);
    write_layer(&mut grid, &player_map, w, h, Color::Rgb(80, 255, 120), bg, true);
    write_layer(&mut grid, &debris_map, w, h, Color::Rgb(255, 160, 60), bg, true);

    // ── Sprites ────────────────────────────────────────────────────────
    for sprite in &display.sprites {
        if !sprite.visible {
            continue;
        }
        let px = sprite.x.wrapping_sub(SPRITE_X_OFFSET);
        if px >= SCREEN_WIDTH as u8 {
            continue;
        }
        let mut map: HashMap<(usize, usize), u8> = HashMap::new();
        let bx = (px as f32 * bsx) as i32;
        let by = (sprite.y as f32 * bsy) as i32;
        let color = match sprite.color {
            1 => Color::Rgb(255, 160, 60),
            2 => Color::Rgb(120, 200, 255),
            _ => Color::Rgb(220, 220, 220),
        };
        match sprite.shape {
            28..=31 => stamp_burst(&mut map, bx, by, (sprite.shape - 27) as i32, bw, bh),
            0x51..=0x57 => stamp_raider(
                &mut map,
                bx,
                by,
                sprite.shape - 0x51,
                sprite.flip_x,
                sprite.flip_y,
                bw,
                bh,
            ),
            _ => stamp_burst(&mut map, bx, by, 1, bw, bh),
        }
        write_layer(&mut grid, &map, w, h, color, bg, true);
    }

    // ── Missiles ───────────────────────────────────────────────────────
    let mut missile_map: HashMap<(usize, usize), u8> = HashMap::new();
    for &(x, ypos) in &display.missiles {
        if ypos == 0 {
            continue;
        }
        let px = x.wrapping_sub(SPRITE_X_OFFSET);
        if px >= SCREEN_WIDTH as u8 {
            continue;
        }
        let py = 255 - ypos;
        let bx = (px as f32 * bsx) as i32;
        let by = (py as f32 * bsy) as i32;
        for dy in 0..display.missile_width.max(1) as i32 {
            set_dot(&mut missile_map, bx, by + dy, bw, bh);
        }
    }
    write_layer(&mut grid, &missile_map, w, h, Color::Rgb(255, 255, 200), bg, true);

    // Text glyphs land on top of everything.
    for (cx, cy, ch, attrib) in text_cells {
        if cx < w && cy < h {
            grid[cy][cx] = (ch, Style::default().fg(attribute_color(attrib)).bg(bg));
        }
    }

    grid.into_iter()
        .map(|row| {
            let spans: Vec<Span<'static>> = row
                .into_iter()
                .map(|(ch, style)| Span::styled(String::from(ch), style))
                .collect();
            Line::from(spans)
        })
        .collect()
}
