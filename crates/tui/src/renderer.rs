use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Paragraph,
};
use tracelens_core::render::timescale::format_duration;
use tracelens_core::{ClickOutcome, ContentKind, Controller, LayoutConfig, Selection, Toggle, TraceSession, render};
use tracelens_protocol::{Paint, Point, RenderCommand, TextAlign, Theme, ThemeToken};

/// Logical canvas pixels per terminal cell.
pub const CELL_W: f64 = 8.0;
pub const CELL_H: f64 = 16.0;

/// Snap band and row heights to whole cells so rows line up with the grid.
pub fn terminal_config(base: &LayoutConfig) -> LayoutConfig {
    LayoutConfig {
        row_height: CELL_H,
        timescale_height: 2.0 * CELL_H,
        interaction_track_height: 2.0 * CELL_H,
        milestone_track_height: CELL_H,
        network_row_height: CELL_H,
        compact_row_height: CELL_H,
        char_width_px: CELL_W,
        ..base.clone()
    }
}

pub fn canvas_size(area: Rect) -> (f64, f64) {
    (f64::from(area.width) * CELL_W, f64::from(area.height) * CELL_H)
}

/// Canvas coordinates of the center of a terminal cell, if it lies in `area`.
pub fn cell_to_canvas(area: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
    let inside = column >= area.x && column < area.right() && row >= area.y && row < area.bottom();
    inside.then(|| {
        (
            (f64::from(column - area.x) + 0.5) * CELL_W,
            (f64::from(row - area.y) + 0.5) * CELL_H,
        )
    })
}

fn to_color(paint: Paint, theme: Theme) -> (Color, f32) {
    let c = theme.paint(paint);
    let [r, g, b, _] = c.to_rgba8();
    (Color::Rgb(r, g, b), c.a)
}

fn blend(over: Color, under: Color, alpha: f32) -> Color {
    match (over, under) {
        (Color::Rgb(r, g, b), Color::Rgb(ur, ug, ub)) => {
            let mix = |a: u8, u: u8| (f32::from(a) * alpha + f32::from(u) * (1.0 - alpha)).round() as u8;
            Color::Rgb(mix(r, ur), mix(g, ug), mix(b, ub))
        }
        _ => over,
    }
}

/// Interprets render commands as terminal cells.
struct CellPainter<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    clip: Rect,
    theme: Theme,
}

impl CellPainter<'_> {
    fn cells(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        let col0 = (x0 / CELL_W).round().max(0.0);
        let row0 = (y0 / CELL_H).round().max(0.0);
        // Anything wider than zero keeps at least one cell.
        let col1 = (x1 / CELL_W).round().max(col0 + if x1 > x0 { 1.0 } else { 0.0 });
        let row1 = (y1 / CELL_H).round().max(row0 + if y1 > y0 { 1.0 } else { 0.0 });
        let to_u16 = |v: f64| v.min(f64::from(u16::MAX)) as u16;
        Rect::new(
            self.area.x.saturating_add(to_u16(col0)),
            self.area.y.saturating_add(to_u16(row0)),
            to_u16(col1 - col0),
            to_u16(row1 - row0),
        )
        .intersection(self.clip)
    }

    fn in_clip(&self, col: u16, row: u16) -> bool {
        col >= self.clip.left() && col < self.clip.right() && row >= self.clip.top() && row < self.clip.bottom()
    }

    fn fill(&mut self, cells: Rect, paint: Paint) {
        let (color, alpha) = to_color(paint, self.theme);
        if alpha <= 0.0 {
            return;
        }
        for y in cells.top()..cells.bottom() {
            for x in cells.left()..cells.right() {
                let cell = &mut self.buf[(x, y)];
                if alpha < 1.0 {
                    // Translucent overlays tint what is already there.
                    let bg = blend(color, cell.bg, alpha);
                    cell.set_bg(bg);
                } else {
                    cell.set_char(' ').set_bg(color);
                }
            }
        }
    }

    fn text(&mut self, position: Point, text: &str, paint: Paint, align: TextAlign) {
        let (fg, _) = to_color(paint, self.theme);
        let len = text.chars().count() as f64 * CELL_W;
        let x = match align {
            TextAlign::Left => position.x,
            TextAlign::Center => position.x - len / 2.0,
            TextAlign::Right => position.x - len,
        };
        let row = (position.y / CELL_H).floor();
        if row < 0.0 {
            return;
        }
        let y = self.area.y.saturating_add(row as u16);
        for (i, ch) in text.chars().enumerate() {
            let col = (x / CELL_W).round() + i as f64;
            if col < 0.0 {
                continue;
            }
            let col = self.area.x.saturating_add(col as u16);
            if self.in_clip(col, y) {
                self.buf[(col, y)].set_char(ch).set_fg(fg);
            }
        }
    }

    fn line(&mut self, from: Point, to: Point, paint: Paint, head: bool) {
        let (fg, _) = to_color(paint, self.theme);
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let (glyph, tip) = if dx.abs() < CELL_W / 2.0 {
            ('│', if dy >= 0.0 { '▼' } else { '▲' })
        } else if dy.abs() < CELL_H / 2.0 {
            ('─', if dx >= 0.0 { '▶' } else { '◀' })
        } else {
            ('·', '●')
        };
        let steps = (dx.abs() / CELL_W).max(dy.abs() / CELL_H).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let col = self.area.x.saturating_add(((from.x + dx * t) / CELL_W).floor().max(0.0) as u16);
            let row = self.area.y.saturating_add(((from.y + dy * t) / CELL_H).floor().max(0.0) as u16);
            if self.in_clip(col, row) {
                let ch = if head && i == steps { tip } else { glyph };
                self.buf[(col, row)].set_char(ch).set_fg(fg);
            }
        }
    }

    fn outline(&mut self, cells: Rect) {
        for y in cells.top()..cells.bottom() {
            for x in cells.left()..cells.right() {
                let cell = &mut self.buf[(x, y)];
                cell.modifier.insert(Modifier::BOLD | Modifier::UNDERLINED);
            }
        }
    }
}

/// Paint a command list into `area` of `buf`.
pub fn paint_commands(buf: &mut Buffer, area: Rect, commands: &[RenderCommand], theme: Theme) {
    let mut painter = CellPainter {
        buf,
        area,
        clip: area,
        theme,
    };
    for cmd in commands {
        match cmd {
            RenderCommand::Clear { paint } => painter.fill(area, *paint),
            RenderCommand::DrawRect { rect, paint, border, .. } => {
                let cells = painter.cells(rect.x, rect.y, rect.right(), rect.bottom());
                painter.fill(cells, *paint);
                if matches!(
                    border,
                    Some(Paint::Theme(ThemeToken::SelectionOutline | ThemeToken::HoverOutline))
                ) {
                    painter.outline(cells);
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                paint,
                align,
                ..
            } => painter.text(*position, text, *paint, *align),
            RenderCommand::DrawLine { from, to, paint, .. } => painter.line(*from, *to, *paint, false),
            RenderCommand::DrawArrow { from, to, paint, .. } => painter.line(*from, *to, *paint, true),
            RenderCommand::SetClip { rect } => {
                painter.clip = painter.cells(rect.x, rect.y, rect.right(), rect.bottom()).intersection(area);
            }
            RenderCommand::ClearClip => painter.clip = area,
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
}

fn status_line(controller: &Controller, session: &TraceSession) -> String {
    let view = controller.view();
    let selection = match controller.selection() {
        Some(Selection::Frame(id)) => session
            .trace()
            .frame(id)
            .map_or_else(|| format!("frame #{id}"), |f| f.name.clone()),
        Some(Selection::Request(idx)) => session
            .network()
            .requests
            .get(idx)
            .map_or_else(|| format!("request #{idx}"), |r| r.short_name().to_string()),
        Some(Selection::Interaction(idx)) => format!("interaction #{idx}"),
        Some(Selection::Annotation(idx)) => format!("annotation #{idx}"),
        None => "nothing selected".into(),
    };
    format!(
        " {} visible | rows {:.0}+ | {selection} ",
        format_duration(view.range()),
        view.top_depth,
    )
}

fn header_line(session: &TraceSession) -> String {
    let what = match session.mode() {
        ContentKind::Flame => format!("{} frames", session.trace().frames.len()),
        ContentKind::Network => format!("{} requests", session.network().requests.len()),
    };
    format!(
        " tracelens | {what} | wheel/+- zoom | drag/arrows pan | 0 reset | a i m c toggle | n mode | esc clear | q quit "
    )
}

pub fn render_tui(session: &mut TraceSession, base: &LayoutConfig, theme: Theme) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, session, base, theme);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    session: &mut TraceSession,
    base: &LayoutConfig,
    theme: Theme,
) -> Result<()> {
    let config = terminal_config(base);
    let size = terminal.size()?;
    let canvas_area = |width: u16, height: u16| Rect::new(0, 1, width, height.saturating_sub(2));
    let area = canvas_area(size.width, size.height);
    let (w, h) = canvas_size(area);
    let mut controller = Controller::new(config, w, h, &session.data());
    let started = Instant::now();

    loop {
        if session.poll(started.elapsed()) {
            controller.reset(&session.data());
        }

        let data = session.data();
        let commands = render(&controller.scene(data));
        let header = header_line(session);
        let status = status_line(&controller, session);

        terminal.draw(|frame| {
            let full = frame.area();
            let area = canvas_area(full.width, full.height);
            frame.render_widget(
                Paragraph::new(Line::from(header.as_str())).style(Style::default().fg(Color::White).bg(Color::DarkGray)),
                Rect::new(0, 0, full.width, 1),
            );
            paint_commands(frame.buffer_mut(), area, &commands, theme);
            frame.render_widget(
                Paragraph::new(Line::from(status.as_str())).style(Style::default().fg(Color::Gray).bg(Color::Black)),
                Rect::new(0, full.height.saturating_sub(1), full.width, 1),
            );
        })?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let data = session.data();
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let (w, _) = controller.size();
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Esc => controller.clear_selection(),
                    KeyCode::Char('+') | KeyCode::Char('=') => controller.zoom_in(&data),
                    KeyCode::Char('-') => controller.zoom_out(&data),
                    KeyCode::Left => controller.pan(-w * 0.1, 0.0, &data),
                    KeyCode::Right => controller.pan(w * 0.1, 0.0, &data),
                    KeyCode::Up => controller.scroll_depth(-1.0, &data),
                    KeyCode::Down => controller.scroll_depth(1.0, &data),
                    KeyCode::Char('0') => controller.reset(&data),
                    KeyCode::Char('a') => controller.toggle(Toggle::Annotations, &data),
                    KeyCode::Char('i') => controller.toggle(Toggle::Interactions, &data),
                    KeyCode::Char('m') => controller.toggle(Toggle::Milestones, &data),
                    KeyCode::Char('c') => controller.toggle(Toggle::Compact, &data),
                    KeyCode::Char('1') => controller.toggle(Toggle::FirstParty, &data),
                    KeyCode::Char('3') => controller.toggle(Toggle::ThirdParty, &data),
                    KeyCode::Char('n') => {
                        let next = match session.mode() {
                            ContentKind::Flame => ContentKind::Network,
                            ContentKind::Network => ContentKind::Flame,
                        };
                        session.set_mode(next);
                        controller.reset(&session.data());
                    }
                    _ => {}
                }
            }
            Event::Mouse(mouse) => {
                let full = terminal.size()?;
                let area = canvas_area(full.width, full.height);
                let Some((x, y)) = cell_to_canvas(area, mouse.column, mouse.row) else {
                    controller.pointer_leave();
                    continue;
                };
                tracing::trace!(kind = ?mouse.kind, x, y, "mouse");
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => controller.pointer_down(x, y),
                    MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                        controller.pointer_move(x, y, &data);
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        controller.pointer_up(x, y);
                        if let ClickOutcome::ZoomTo { start, end } = controller.click(x, y, &data) {
                            tracing::debug!(start, end, "zoomed to selection");
                        }
                    }
                    MouseEventKind::ScrollUp => controller.wheel(-1.0, x, &data),
                    MouseEventKind::ScrollDown => controller.wheel(1.0, x, &data),
                    MouseEventKind::ScrollLeft => controller.pan(-CELL_W * 4.0, 0.0, &data),
                    MouseEventKind::ScrollRight => controller.pan(CELL_W * 4.0, 0.0, &data),
                    _ => {}
                }
            }
            Event::Resize(width, height) => {
                let (w, h) = canvas_size(canvas_area(width, height));
                controller.resize(w, h, &data);
            }
            _ => {}
        }
    }
    Ok(())
}
