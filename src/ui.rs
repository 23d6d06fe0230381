use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{self, Canvas},
        Block, Borders, Paragraph, Widget, Wrap,
    },
};

use crate::app::{App, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::render::Glyph;
use crate::session::Phase;

const PANEL_WIDTH: u16 = 34;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(PANEL_WIDTH), Constraint::Min(1)])
            .split(area);

        render_panel(self, chunks[0], buf);
        render_canvas(self, chunks[1], buf);
    }
}

fn render_panel(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let mut lines: Vec<Line> = Vec::new();
    match app.phase() {
        Phase::Idle => {
            lines.push(Line::from(Span::styled("Press s to start", bold)));
        }
        Phase::Running | Phase::Paused => {
            let status = if app.phase() == Phase::Paused {
                Span::styled("Paused", Style::default().fg(Color::Yellow).patch(bold))
            } else {
                Span::styled("Look here", Style::default().fg(Color::Green).patch(bold))
            };
            lines.push(Line::from(status));
            lines.push(Line::default());
            if let Some(size) = app.controller().stimulus_size() {
                lines.push(Line::from(format!("Size = {size}")));
            }
            if let Some(pos) = app.controller().position() {
                lines.push(Line::from(format!("Cell {pos}")));
            }
            if let Some(remaining) = app.controller().remaining() {
                lines.push(Line::from(format!("{remaining} cells left")));
            }
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "arrows: bigger/smaller is +/-",
                dim,
            )));
            lines.push(Line::from(Span::styled(
                "space if you still see movement",
                dim,
            )));
            lines.push(Line::from(Span::styled("p pause, esc stop", dim)));
        }
        Phase::Finished => {
            lines.push(Line::from(Span::styled(
                "Done!",
                Style::default().fg(Color::Green).patch(bold),
            )));
            lines.push(Line::default());
            if let Some(err) = app.export_error() {
                lines.push(Line::from(Span::styled(
                    format!("export failed: {err}"),
                    Style::default().fg(Color::Red),
                )));
            } else if let Some(path) = app.export_path() {
                lines.push(Line::from(format!("scores: {}", path.display())));
            }
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("s again, q quit", dim)));
        }
    }

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("knipper"))
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_canvas(app: &App, area: Rect, buf: &mut Buffer) {
    Canvas::default()
        .block(Block::default().borders(Borders::ALL))
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, CANVAS_WIDTH as f64])
        .y_bounds([0.0, CANVAS_HEIGHT as f64])
        .paint(|ctx| {
            for glyph in app.surface().iter() {
                match glyph {
                    Glyph::Line {
                        x1,
                        y1,
                        x2,
                        y2,
                        thickness,
                    } => paint_line(ctx, *x1, *y1, *x2, *y2, *thickness),
                    Glyph::Text { x, y, text } => {
                        ctx.print(
                            *x as f64,
                            flip_y(*y),
                            Span::styled(text.clone(), Style::default().fg(Color::Gray)),
                        );
                    }
                }
            }
        })
        .render(area, buf);
}

/// Canvas pixel coordinates have the origin at the top left; the ratatui
/// canvas grows upward.
fn flip_y(y: i32) -> f64 {
    (CANVAS_HEIGHT as i32 - y) as f64
}

/// Draws one stimulus line; thickness is rendered as parallel lines offset
/// along the perpendicular axis.
fn paint_line(ctx: &mut canvas::Context, x1: i32, y1: i32, x2: i32, y2: i32, thickness: u32) {
    let half = thickness as i32 / 2;
    let vertical = x1 == x2;
    for offset in -half..=half {
        let (dx, dy) = if vertical { (offset, 0) } else { (0, offset) };
        ctx.draw(&canvas::Line {
            x1: (x1 + dx) as f64,
            y1: flip_y(y1 + dy),
            x2: (x2 + dx) as f64,
            y2: flip_y(y2 + dy),
            color: Color::White,
        });
    }
}
