//! UI rendering for the terminal user interface.
//!
//! `draw` is a pure function of the `App` model; all state changes happen
//! in the reducer.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{
        Block, Borders, Cell, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Row,
        Table, TableState, Wrap,
    },
};

use crate::app::keymap::{HELP, hints};
use crate::app::{App, Focus, LeftPanel};
use crate::browser::FileBrowser;
use crate::engine::PlayState;
use crate::library::LibBrowser;

const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 15;

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn panel(title: String, focused: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().fg(Color::Cyan))
    } else {
        block
    }
}

fn highlight(focused: bool) -> Style {
    if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = Paragraph::new(format!(
            "Terminal too small\n{}x{} (need {MIN_WIDTH}x{MIN_HEIGHT})",
            area.width, area.height
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(msg, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let left_pct = app.options.library_width_percent.clamp(10, 90);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(left_pct),
            Constraint::Percentage(100 - left_pct),
        ])
        .split(rows[0]);

    draw_left(frame, app, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(6),
            Constraint::Length(3),
        ])
        .split(columns[1]);
    draw_playlist(frame, app, right[0]);
    draw_track_info(frame, app, right[1]);
    draw_progress(frame, app, right[2]);

    draw_footer(frame, app, rows[1]);

    if app.show_help {
        draw_help(frame, area);
    }
}

fn draw_left(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Browser;
    let title = app.left.title();
    match &app.left {
        LeftPanel::Scanning { root } => {
            let text = Paragraph::new(format!("Scanning {}...", root.display()))
                .block(panel(format!(" {title} "), focused))
                .wrap(Wrap { trim: true });
            frame.render_widget(text, area);
        }
        LeftPanel::Library(browser) => draw_library(frame, browser, title, focused, area),
        LeftPanel::Files(browser) => draw_files(frame, browser, title, focused, area),
    }
}

fn draw_library(frame: &mut Frame, browser: &LibBrowser, title: &str, focused: bool, area: Rect) {
    let block = panel(format!(" {title} "), focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let items: Vec<ListItem> = browser
        .rows()
        .iter()
        .map(|node| {
            let indent = "  ".repeat(node.depth());
            ListItem::new(format!("{indent}{}", browser.label(node)))
        })
        .collect();
    let list = List::new(items)
        .highlight_style(highlight(focused))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !browser.rows().is_empty() {
        state.select(Some(browser.selected()));
    }
    frame.render_stateful_widget(list, parts[0], &mut state);

    let library = browser.library();
    let status = if library.is_empty() {
        "No tracks found".to_string()
    } else {
        format!(
            "{} tracks in {}",
            library.track_count(),
            library.root().display()
        )
    };
    frame.render_widget(Paragraph::new(status).dim(), parts[1]);
}

fn draw_files(frame: &mut Frame, browser: &FileBrowser, title: &str, focused: bool, area: Rect) {
    let title = format!(" {title}: {} ", browser.dir().display());
    let items: Vec<ListItem> = browser
        .entries()
        .iter()
        .map(|e| {
            if e.is_dir {
                ListItem::new(format!("{}/", e.name)).bold()
            } else {
                ListItem::new(e.name.as_str())
            }
        })
        .collect();
    let empty = items.is_empty();
    let list = List::new(items)
        .block(panel(title, focused))
        .highlight_style(highlight(focused))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !empty {
        state.select(Some(browser.selected()));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_playlist(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Playlist;
    let playlist = &app.playlist;
    let current = playlist.current_index();
    let pending = app.pending_index();

    let rows: Vec<Row> = playlist
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let marker = if Some(i) == current {
                ">"
            } else if Some(i) == pending {
                "~"
            } else {
                " "
            };
            let duration = if t.duration.is_zero() {
                "--:--".to_string()
            } else {
                format_mmss(t.duration)
            };
            let row = Row::new(vec![
                Cell::from(format!("{marker}{}", i + 1)),
                Cell::from(duration),
                Cell::from(t.title.as_str()),
                Cell::from(t.game.as_str()),
            ]);
            if Some(i) == current {
                row.style(Style::default().fg(Color::Green))
            } else {
                row
            }
        })
        .collect();

    let header = Row::new(vec!["#", "Duration", "Title", "Game"]).bold();
    let title = format!(
        " {} (loop: {}) ",
        playlist.title(),
        playlist.loop_mode().label()
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(8),
            Constraint::Fill(3),
            Constraint::Fill(2),
        ],
    )
    .header(header)
    .block(panel(title, focused))
    .row_highlight_style(highlight(focused));

    let mut state = TableState::default();
    if !playlist.is_empty() {
        state.select(Some(playlist.selected_index()));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_track_info(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.is_loading() {
        " Track Info (loading) "
    } else {
        " Track Info "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        });

    let Some(info) = &app.current_info else {
        let empty = Paragraph::new("No track loaded").dim().block(block);
        frame.render_widget(empty, area);
        return;
    };

    let system = if info.chips.is_empty() {
        info.system.clone()
    } else {
        let chips: Vec<&str> = info.chips.iter().map(|c| c.name.as_str()).collect();
        format!("{} ({})", info.system, chips.join(", "))
    };
    let lines = vec![
        Line::from(format!("Track:    {}", info.title)),
        Line::from(format!("Game:     {}", info.game)),
        Line::from(format!("System:   {system}")),
        Line::from(format!("Composer: {}", info.composer)),
    ];
    let text = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(text, area);
}

fn state_icon(state: PlayState) -> &'static str {
    match state {
        PlayState::Playing => "▶",
        PlayState::Paused => "⏸",
        PlayState::Fading => "↘",
        PlayState::Stopped => "■",
    }
}

fn progress_label(app: &App) -> String {
    let p = &app.playback;
    let mut label = format!(
        "{} {} / {}",
        state_icon(p.state),
        format_mmss(p.position),
        format_mmss(p.duration)
    );
    if p.state.is_running() {
        label.push_str(&format!("  -{}", format_mmss(p.remaining())));
    }
    if p.has_loop {
        label.push_str(&format!("  Loop {}/{}", p.current_loop, p.total_loops));
    }
    label.push_str(&format!("  Vol {:.0}%", app.volume * 100.0));
    label
}

fn draw_progress(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" {} ", app.playback.state.label());
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(app.playback.progress())
        .label(progress_label(app));
    frame.render_widget(gauge, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let footer = match &app.error {
        Some(err) => Paragraph::new(format!(" {}", err.message)).fg(Color::Red),
        None => Paragraph::new(format!(
            " {}",
            hints(app.focus == Focus::Browser, app.left.is_library())
        ))
        .dim(),
    };
    frame.render_widget(footer, area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let height = u16::try_from(HELP.len() + 2).unwrap_or(u16::MAX);
    let popup = centered_rect_sized(48, height, area);
    frame.render_widget(Clear, popup);

    let lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, what)| Line::from(format!("{keys:<14} {what}")))
        .collect();
    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help (? closes) ")
            .title_alignment(Alignment::Center)
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            }),
    );
    frame.render_widget(help, popup);
}
