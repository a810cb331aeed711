use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use webbrowser::Browser;

use lianzi::{
    board::{CellFlag, GRID_SIDE},
    celebration::Celebration,
    game::Outcome,
};

use crate::{App, AppState, KEY_GRID};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Columns one board cell occupies; CJK glyphs render two wide.
const CELL_WIDTH: usize = 4;
/// Glyph row + key row per board row, with a blank line between rows.
const GRID_LINES: u16 = (GRID_SIDE * 3 - 1) as u16;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let yellow_bold_style = Style::default().patch(bold_style).fg(Color::Yellow);

        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);

        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let cyan_italic_style = Style::default().patch(italic_style).fg(Color::Cyan);

        match self.state {
            AppState::Playing => {
                let game = &self.game;

                let block_height = 2 + 1 + GRID_LINES + 1 + 2;
                let top_pad = area.height.saturating_sub(block_height + 2) / 2;

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .constraints(
                        [
                            Constraint::Length(top_pad),
                            Constraint::Length(2),          // score + clock
                            Constraint::Length(1),
                            Constraint::Length(GRID_LINES), // the board
                            Constraint::Length(1),
                            Constraint::Length(2),          // selection echo
                            Constraint::Min(1),
                            Constraint::Length(1),          // legend
                        ]
                        .as_ref(),
                    )
                    .split(area);

                let header = Paragraph::new(vec![
                    Line::from(Span::styled(
                        format!("{} pts", game.display_score()),
                        bold_style,
                    )),
                    Line::from(Span::styled(format!("{}s", game.time_left()), dim_bold_style)),
                ])
                .alignment(Alignment::Center);

                header.render(chunks[1], buf);

                // A flash replays the judged board for a moment; the game has
                // already dealt the next one underneath.
                let cell_face = |index: usize| -> (char, Style) {
                    if let Some(flash) = &self.flash {
                        let report = &flash.report;
                        let hit_style = match report.outcome {
                            Outcome::Correct => green_bold_style,
                            Outcome::Wrong => red_bold_style,
                        };
                        let style = if report.picks.contains(&index) {
                            hit_style
                        } else {
                            dim_bold_style
                        };
                        (report.chars[index], style)
                    } else if let Some(board) = game.board() {
                        let cell = board.cells()[index];
                        let style = match cell.flag {
                            CellFlag::Selected => yellow_bold_style,
                            CellFlag::Correct => green_bold_style,
                            CellFlag::Wrong => red_bold_style,
                            CellFlag::Clear => bold_style,
                        };
                        (cell.ch, style)
                    } else {
                        (' ', bold_style)
                    }
                };

                let mut lines: Vec<Line> = Vec::with_capacity(GRID_LINES as usize);
                for row in 0..GRID_SIDE {
                    let mut glyphs = Vec::with_capacity(GRID_SIDE);
                    let mut keys = Vec::with_capacity(GRID_SIDE);

                    for col in 0..GRID_SIDE {
                        let index = row * GRID_SIDE + col;
                        let (ch, style) = cell_face(index);
                        let pad = CELL_WIDTH - 1 - ch.width().unwrap_or(1);
                        glyphs.push(Span::styled(
                            format!(" {}{}", ch, " ".repeat(pad)),
                            style,
                        ));
                        keys.push(Span::styled(
                            format!(" {}  ", KEY_GRID[row][col]),
                            dim_bold_style,
                        ));
                    }

                    lines.push(Line::from(glyphs));
                    lines.push(Line::from(keys));
                    if row + 1 < GRID_SIDE {
                        lines.push(Line::default());
                    }
                }

                let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
                board_widget.render(chunks[3], buf);

                let echo = if let Some(flash) = &self.flash {
                    let report = &flash.report;
                    let spelled: String =
                        report.picks.iter().map(|&pick| report.chars[pick]).collect();
                    let (style, verdict) = match report.outcome {
                        Outcome::Correct => (green_bold_style, "correct"),
                        Outcome::Wrong => (red_bold_style, "wrong"),
                    };
                    vec![
                        Line::from(Span::styled(spelled, style)),
                        Line::from(Span::styled(verdict, italic_style)),
                    ]
                } else {
                    let (spelled, count) = match game.board() {
                        Some(board) => (
                            board.spelled(game.selection().picks()),
                            game.selection().len(),
                        ),
                        None => (String::new(), 0),
                    };
                    vec![
                        Line::from(Span::styled(spelled, yellow_bold_style)),
                        Line::from(Span::styled(format!("{count} of 4"), dim_bold_style)),
                    ]
                };

                let echo_widget = Paragraph::new(echo).alignment(Alignment::Center);
                echo_widget.render(chunks[5], buf);

                let legend = Paragraph::new(Span::styled(
                    "(1234 qwer asdf zxcv) pick / (space) skip / (esc) end",
                    italic_style,
                ));

                legend.render(chunks[7], buf);
            }
            AppState::Summary => {
                let Some(summary) = self.game.summary() else {
                    return;
                };

                let max_chars_per_line =
                    area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
                let occupied_lines = |text: &str| {
                    ((text.width() as f64 / max_chars_per_line as f64).ceil() as u16).max(1)
                };

                let solved_text = if summary.solved.is_empty() {
                    String::from("no idioms solved this round")
                } else {
                    format!("solved: {}", summary.solved.join("  "))
                };
                let seen_text = self.reveal_all.then(|| {
                    format!("answers: {}", summary.shown.iter().unique().join("  "))
                });

                let solved_lines = occupied_lines(&solved_text);
                let seen_lines = seen_text.as_deref().map(occupied_lines).unwrap_or(0);

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints(
                        [
                            Constraint::Min(1),
                            Constraint::Length(1), // final score
                            Constraint::Length(1), // simulated global rank
                            Constraint::Length(1), // padding
                            Constraint::Length(solved_lines),
                            Constraint::Length(seen_lines),
                            Constraint::Min(1),
                            Constraint::Length(1), // legend
                        ]
                        .as_ref(),
                    )
                    .split(area);

                let score = Paragraph::new(Span::styled(
                    format!("{} pts", summary.final_score),
                    bold_style,
                ))
                .alignment(Alignment::Center);

                score.render(chunks[1], buf);

                let rank = Paragraph::new(Span::styled(
                    format!("top {}% of idiom matchers", summary.rank),
                    cyan_italic_style,
                ))
                .alignment(Alignment::Center);

                rank.render(chunks[2], buf);

                let solved_style = if summary.solved.is_empty() {
                    Style::default()
                        .patch(italic_style)
                        .add_modifier(Modifier::DIM)
                } else {
                    bold_style
                };
                let solved = Paragraph::new(Span::styled(solved_text, solved_style))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });

                solved.render(chunks[4], buf);

                if let Some(seen_text) = seen_text {
                    let seen = Paragraph::new(Span::styled(seen_text, dim_bold_style))
                        .alignment(Alignment::Center)
                        .wrap(Wrap { trim: true });

                    seen.render(chunks[5], buf);
                }

                let legend = Paragraph::new(Span::styled(
                    String::from(if Browser::is_available() {
                        "(r)estart / (a)nswers / (t)weet / (esc)ape"
                    } else {
                        "(r)estart / (a)nswers / (esc)ape"
                    }),
                    italic_style,
                ));

                legend.render(chunks[7], buf);
            }
        }

        // Render the celebration burst on top of whatever state drew first
        if self.celebration.is_active {
            render_celebration_sparks(&self.celebration, area, buf);
        }
    }
}

/// Paint celebration sparks over the rendered frame
fn render_celebration_sparks(celebration: &Celebration, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Yellow,
        Color::Magenta,
        Color::Cyan,
        Color::Green,
        Color::Red,
        Color::Blue,
        Color::LightYellow,
    ];

    for spark in &celebration.sparks {
        let x = spark.x as u16;
        let y = spark.y as u16;

        // Check bounds
        if x < area.width && y < area.height {
            let color = colors[spark.color_index % colors.len()];

            // Fade with age
            let alpha = 1.0 - (spark.age / spark.max_age);

            let style = if spark.is_glyph {
                // Idiom glyphs stay bright until late in the burst
                if alpha > 0.4 {
                    Style::default().fg(color).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(color)
                }
            } else if alpha > 0.7 {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else if alpha > 0.3 {
                Style::default().fg(color)
            } else {
                Style::default().fg(color).add_modifier(Modifier::DIM)
            };

            if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                cell.set_symbol(&spark.symbol.to_string());
                cell.set_style(style);
            }
        }
    }
}
