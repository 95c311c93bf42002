use rand::Rng;
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::Screen;
use crate::entities::BulletTint;
use crate::play::PlayState;
use crate::sprites;

const ENEMY_PALETTE: &[Color] = &[
    Color::Rgb(255, 120, 120),
    Color::Rgb(255, 180, 120),
    Color::Rgb(120, 220, 120),
    Color::Rgb(120, 170, 255),
    Color::Rgb(220, 120, 220),
];

const COLOR_PLAYER: Color = Color::Rgb(90, 200, 255);
const COLOR_BOSS: Color = Color::Rgb(255, 90, 90);
const COLOR_ACCENT: Color = Color::Rgb(255, 220, 160);
const COLOR_HEART: Color = Color::Rgb(255, 60, 90);

/// Everything the renderer needs for one frame, borrowed from the app.
pub struct RenderView<'a> {
    pub screen: Screen,
    pub play: Option<&'a PlayState>,
    pub profile_name: &'a str,
    pub best_score: u32,
    pub name_buffer: &'a str,
    pub powerup_selection: usize,
    pub final_score: u32,
    pub new_record: bool,
    pub now_ms: u64,
}

/// Falling parallax star layers in logical playfield coordinates.
struct Starfield {
    layers: Vec<StarLayer>,
    width: f32,
    height: f32,
}

struct StarLayer {
    stars: Vec<(f32, f32)>,
    speed: f32,
}

impl Starfield {
    fn new(width: f32, height: f32) -> Self {
        let mut rng = rand::rng();
        let layers = [(60, 1.0), (40, 2.0), (20, 3.0)]
            .into_iter()
            .map(|(count, speed)| StarLayer {
                stars: (0..count)
                    .map(|_| (rng.random_range(0.0..width), rng.random_range(0.0..height)))
                    .collect(),
                speed,
            })
            .collect();
        Self {
            layers,
            width,
            height,
        }
    }

    fn update(&mut self) {
        let mut rng = rand::rng();
        for layer in &mut self.layers {
            for star in &mut layer.stars {
                star.1 += layer.speed;
                if star.1 >= self.height {
                    star.0 = rng.random_range(0.0..self.width);
                    star.1 = 0.0;
                }
            }
        }
    }

    fn draw(&self, buf: &mut Buffer, area: Rect) {
        for (depth, layer) in self.layers.iter().enumerate() {
            let shade = 140u8.saturating_sub(depth as u8 * 35);
            let style = Style::default().fg(Color::Rgb(shade, shade + 40, shade + 10));
            let symbol = if depth == 0 { "·" } else { "." };
            for &(x, y) in &layer.stars {
                let (cx, cy) = to_cell(area, self.width, self.height, x, y);
                put(buf, area, cx, cy, symbol, style);
            }
        }
    }
}

/// Draws every screen from a `RenderView`; owns only cosmetic state.
pub struct GameRenderer {
    starfield: Starfield,
}

impl GameRenderer {
    pub fn new(field_width: f32, field_height: f32) -> Self {
        Self {
            starfield: Starfield::new(field_width, field_height),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, view: &RenderView) {
        self.starfield.update();
        match view.screen {
            Screen::Menu | Screen::NameEntry => self.render_menu(frame, view),
            Screen::Playing => self.render_play(frame, view),
            Screen::Paused => {
                self.render_play(frame, view);
                self.render_pause_overlay(frame);
            }
            Screen::PowerUpChoice => {
                self.render_play(frame, view);
                self.render_powerup_overlay(frame, view);
            }
            Screen::GameOver => self.render_game_over(frame, view),
        }
    }

    fn render_menu(&self, frame: &mut Frame, view: &RenderView) {
        let area = frame.area();
        self.starfield.draw(frame.buffer_mut(), area);

        let title_y = area.height / 4;
        render_centered_line(
            frame,
            area,
            title_y,
            Line::from("I N V A D E R S").style(
                Style::default()
                    .fg(COLOR_ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
        );

        if view.screen == Screen::NameEntry {
            render_centered_line(
                frame,
                area,
                title_y + 4,
                Line::from("New Profile").bold().white(),
            );
            render_centered_line(
                frame,
                area,
                title_y + 6,
                Line::from(format!("Name (ENTER confirms): {}_", view.name_buffer)).gray(),
            );
            render_centered_line(
                frame,
                area,
                title_y + 8,
                Line::from("[ESC: back]").dark_gray(),
            );
        } else {
            render_centered_line(
                frame,
                area,
                title_y + 4,
                Line::from(format!("Profile: {}  (TAB to switch)", view.profile_name)).white(),
            );
            render_centered_line(
                frame,
                area,
                title_y + 5,
                Line::from(format!("High Score: {}", view.best_score)).gray(),
            );
            render_centered_line(
                frame,
                area,
                title_y + 8,
                Line::from("[Space: Play]  [N: New Profile]  [M: Music]  [Q: Quit]").dark_gray(),
            );
        }
    }

    fn render_play(&self, frame: &mut Frame, view: &RenderView) {
        let area = frame.area();
        let Some(play) = view.play else {
            return;
        };
        let fw = play.config.field_width;
        let fh = play.config.field_height;
        let now = view.now_ms;

        self.starfield.draw(frame.buffer_mut(), area);
        let buf = frame.buffer_mut();

        // Player, with hurt shake and blink applied at draw time only.
        let hurt = play.player.is_hurt(now);
        if !(hurt && (now / 40) % 2 == 0) {
            let (mut cx, mut cy) = to_cell(
                area,
                fw,
                fh,
                play.player.rect.centerx(),
                play.player.rect.centery(),
            );
            if hurt {
                let mut rng = rand::rng();
                cx += rng.random_range(-1..=1);
                cy += rng.random_range(-1..=1);
            }
            let color = if hurt { Color::White } else { COLOR_PLAYER };
            draw_sprite(buf, area, sprites::PLAYER, color, cx, cy);
        }

        if let Some(grid) = play.wave.grid() {
            for enemy in grid.enemies.iter().filter(|e| e.alive) {
                let pattern = sprites::ALIENS[enemy.style_seed % sprites::ALIENS.len()];
                let base = ENEMY_PALETTE[enemy.style_seed % ENEMY_PALETTE.len()];
                let color = if enemy.frame == 1 { brighten(base) } else { base };
                let (cx, cy) = to_cell(area, fw, fh, enemy.rect.centerx(), enemy.rect.centery());
                draw_sprite(buf, area, pattern, color, cx, cy);
            }
        }

        if let Some(boss) = play.wave.boss()
            && boss.alive
        {
            let color = if boss.is_hurt(now) {
                Color::White
            } else {
                COLOR_BOSS
            };
            let (cx, cy) = to_cell(
                area,
                fw,
                fh,
                boss.rect.centerx(),
                boss.rect.centery() + boss.bob_offset,
            );
            draw_sprite(buf, area, sprites::BOSS, color, cx, cy);
        }

        for bullet in &play.bullets {
            for spark in &bullet.trail {
                let style = if spark.alpha > 120 {
                    Style::default().fg(Color::White)
                } else if spark.alpha > 60 {
                    Style::default().fg(Color::Gray)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let (cx, cy) = to_cell(area, fw, fh, spark.x, spark.y);
                put(buf, area, cx, cy, "·", style);
            }
            let (cx, cy) = to_cell(area, fw, fh, bullet.rect.centerx(), bullet.rect.centery());
            put(buf, area, cx, cy, "|", Style::default().fg(Color::White).bold());
        }

        for eb in &play.enemy_bullets {
            let color = match eb.tint {
                BulletTint::Formation => Color::Rgb(255, 255, 120),
                BulletTint::Boss => COLOR_ACCENT,
            };
            let (cx, cy) = to_cell(area, fw, fh, eb.rect.centerx(), eb.rect.centery());
            put(buf, area, cx, cy, "!", Style::default().fg(color));
        }

        for pickup in &play.health_pickups {
            let color = if pickup.is_blinking(now) {
                Color::Rgb(255, 100, 120)
            } else {
                COLOR_HEART
            };
            let (cx, cy) = to_cell(area, fw, fh, pickup.rect.centerx(), pickup.rect.centery());
            draw_sprite(buf, area, sprites::HEART, color, cx, cy);
        }

        for explosion in &play.explosions {
            let t = explosion.progress(now);
            let (symbol, color) = if t < 0.4 {
                ("*", Color::White)
            } else if t < 0.7 {
                ("*", COLOR_ACCENT)
            } else {
                ("o", Color::DarkGray)
            };
            let (cx, cy) = to_cell(area, fw, fh, explosion.x, explosion.y);
            put(buf, area, cx, cy, symbol, Style::default().fg(color).bold());
        }

        self.render_hud(frame, view, play);
    }

    fn render_hud(&self, frame: &mut Frame, view: &RenderView, play: &PlayState) {
        let area = frame.area();

        let stats = Line::from(vec![
            Span::styled(view.profile_name, Style::default().fg(Color::White).bold()),
            Span::styled("  Score: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", play.score),
                Style::default().fg(Color::Yellow).bold(),
            ),
            Span::styled("  Lives: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}/{}", play.lives, play.config.max_lives),
                if play.lives > 1 {
                    Style::default().fg(Color::Green).bold()
                } else {
                    Style::default().fg(Color::Red).bold()
                },
            ),
            Span::styled("  Level: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", play.level),
                Style::default().fg(Color::Cyan).bold(),
            ),
            Span::styled("  Best: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", view.best_score),
                Style::default().fg(Color::Magenta).bold(),
            ),
        ]);
        render_line_at(frame, area, 1, 0, stats);

        let info = Line::from(vec![Span::styled(
            format!(
                "Bullets cap: {}  |  Cooldown: {} ms  |  Shot: x{}",
                play.max_bullets, play.fire_cooldown_ms, play.shot_count
            ),
            Style::default().fg(Color::DarkGray),
        )]);
        render_line_at(frame, area, 1, 1, info);

        if let Some(boss) = play.wave.boss() {
            render_centered_line(
                frame,
                area,
                2,
                Line::from(vec![
                    Span::styled("BOSS ", Style::default().fg(COLOR_ACCENT).bold()),
                    boss_healthbar(boss.hp_fraction()),
                ]),
            );
        }

        let controls = Line::from("[A/D or Arrows: Move] [Space: Fire] [P: Pause] [Esc: End run]")
            .dark_gray()
            .centered();
        if area.height > 1 {
            let controls_area = Rect {
                x: area.x,
                y: area.y + area.height - 1,
                width: area.width,
                height: 1,
            };
            frame.render_widget(Paragraph::new(controls), controls_area);
        }
    }

    fn render_pause_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let pause_text = vec![
            Line::from(""),
            Line::from("PAUSED").centered().bold().yellow(),
            Line::from(""),
            Line::from("P: resume  R: restart  M: music  Esc: end run")
                .centered()
                .white(),
        ];

        let width = 50.min(area.width);
        let pause_area = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + area.height.saturating_sub(6) / 2,
            width,
            height: 6.min(area.height),
        };

        frame.render_widget(
            Paragraph::new(pause_text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow)),
                )
                .alignment(Alignment::Center),
            pause_area,
        );
    }

    fn render_powerup_overlay(&self, frame: &mut Frame, view: &RenderView) {
        let area = frame.area();
        render_centered_line(
            frame,
            area,
            2,
            Line::from("Choose your upgrade!").style(
                Style::default()
                    .fg(COLOR_ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
        );

        let cards: [(&str, &[&str]); 3] = [
            ("Rapid Fire", sprites::ICON_RAPID_FIRE),
            ("Bullets +1", sprites::ICON_EXTRA_BULLET),
            ("Double Shot", sprites::ICON_DOUBLE_SHOT),
        ];

        let card_w: u16 = 18;
        let card_h: u16 = 9;
        let gap: u16 = 2;
        let total_w = card_w * 3 + gap * 2;
        if area.width < total_w || area.height < card_h + 4 {
            return;
        }
        let start_x = area.x + (area.width - total_w) / 2;
        let y = area.y + (area.height.saturating_sub(card_h)) / 2;

        for (idx, (title, icon)) in cards.iter().enumerate() {
            let card_area = Rect {
                x: start_x + idx as u16 * (card_w + gap),
                y,
                width: card_w,
                height: card_h,
            };
            let selected = idx == view.powerup_selection;
            let border_style = if selected {
                Style::default().fg(COLOR_ACCENT).bold()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Line::from(*title).centered().white().bold());
            let inner = block.inner(card_area);
            frame.render_widget(block, card_area);

            let buf = frame.buffer_mut();
            // Clear the card interior so the playfield doesn't bleed through.
            for row in inner.y..inner.y + inner.height {
                for col in inner.x..inner.x + inner.width {
                    put(buf, inner, col as i32, row as i32, " ", Style::default());
                }
            }
            draw_sprite(
                buf,
                inner,
                icon,
                COLOR_ACCENT,
                (inner.x + inner.width / 2) as i32,
                (inner.y + inner.height / 2) as i32,
            );
        }

        render_centered_line(
            frame,
            area,
            (y - area.y) + card_h + 1,
            Line::from("</> to choose - 1/2/3 or ENTER to confirm").dark_gray(),
        );
    }

    fn render_game_over(&self, frame: &mut Frame, view: &RenderView) {
        let area = frame.area();
        self.starfield.draw(frame.buffer_mut(), area);

        let record_line = if view.new_record {
            Line::from(format!("New record for {}!", view.profile_name))
                .centered()
                .style(Style::default().fg(Color::Rgb(255, 240, 120)).bold())
        } else {
            Line::from(format!("Record ({}): {}", view.profile_name, view.best_score))
                .centered()
                .gray()
        };

        let text = vec![
            Line::from(""),
            Line::from("GAME OVER").centered().red().bold(),
            Line::from(""),
            Line::from(format!("Final Score: {}", view.final_score))
                .centered()
                .yellow()
                .bold(),
            record_line,
            Line::from(""),
            Line::from("Press R to return to the menu").centered().white(),
            Line::from("Press Q to quit").centered().white(),
        ];

        let height = (text.len() as u16 + 2).min(area.height);
        let box_area = Rect {
            x: area.x + area.width / 6,
            y: area.y + (area.height.saturating_sub(height)) / 2,
            width: area.width - area.width / 3,
            height,
        };
        frame.render_widget(
            Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center),
            box_area,
        );
    }
}

/// Logical playfield position to an absolute terminal cell.
fn to_cell(area: Rect, field_w: f32, field_h: f32, x: f32, y: f32) -> (i32, i32) {
    let cx = area.x as f32 + x / field_w * area.width as f32;
    let cy = area.y as f32 + y / field_h * area.height as f32;
    (cx as i32, cy as i32)
}

/// Bounds-guarded single-cell write.
fn put(buf: &mut Buffer, area: Rect, x: i32, y: i32, symbol: &str, style: Style) {
    if x < area.x as i32
        || y < area.y as i32
        || x >= (area.x + area.width) as i32
        || y >= (area.y + area.height) as i32
    {
        return;
    }
    buf.set_string(x as u16, y as u16, symbol, style);
}

/// Blit a bitmask sprite centered on a cell, packing two pattern rows per
/// terminal row with half-block glyphs.
fn draw_sprite(buf: &mut Buffer, area: Rect, pattern: &[&str], color: Color, cx: i32, cy: i32) {
    let width = pattern[0].len() as i32;
    let rows = pattern.len();
    let cell_rows = rows.div_ceil(2) as i32;
    let x0 = cx - width / 2;
    let y0 = cy - cell_rows / 2;
    let style = Style::default().fg(color);

    for row in 0..cell_rows {
        let top = pattern.get(row as usize * 2);
        let bottom = pattern.get(row as usize * 2 + 1);
        for col in 0..width {
            let lit = |line: Option<&&str>| {
                line.is_some_and(|l| l.as_bytes().get(col as usize) == Some(&b'1'))
            };
            let symbol = match (lit(top), lit(bottom)) {
                (true, true) => "█",
                (true, false) => "▀",
                (false, true) => "▄",
                (false, false) => continue,
            };
            put(buf, area, x0 + col, y0 + row, symbol, style);
        }
    }
}

fn brighten(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            r.saturating_add(20),
            g.saturating_add(20),
            b.saturating_add(20),
        ),
        other => other,
    }
}

fn boss_healthbar(fraction: f32) -> Span<'static> {
    let width = 30usize;
    let filled = (fraction.clamp(0.0, 1.0) * width as f32).round() as usize;
    let bar: String = "█".repeat(filled) + &"░".repeat(width - filled);
    Span::styled(bar, Style::default().fg(Color::Rgb(255, 80, 80)))
}

fn render_centered_line(frame: &mut Frame, area: Rect, y: u16, line: Line) {
    if y >= area.height {
        return;
    }
    let row = Rect {
        x: area.x,
        y: area.y + y,
        width: area.width,
        height: 1,
    };
    frame.render_widget(Paragraph::new(line).centered(), row);
}

fn render_line_at(frame: &mut Frame, area: Rect, x: u16, y: u16, line: Line) {
    if y >= area.height || x >= area.width {
        return;
    }
    let row = Rect {
        x: area.x + x,
        y: area.y + y,
        width: area.width - x,
        height: 1,
    };
    frame.render_widget(Paragraph::new(line), row);
}
