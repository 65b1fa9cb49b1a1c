// Terminal front-end: draws menus, board and overlays, dispatches input,
// and reacts to session/menu outcomes once per frame

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use rand::SeedableRng;
use rand::rngs::{StdRng, ThreadRng};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use std::error::Error;
use std::io;
use std::time::Duration;
use tracing::{debug, error, info};
use unicode_width::UnicodeWidthStr;

use crate::mns_color::Palette;
use crate::mns_game::{Config, PRESETS, Preset, PresetChoice, save_config};
use crate::mns_lang::Lang;
use crate::mns_menu::{MenuFlow, MenuItem, MenuOutcome, MenuScreen};
use crate::mns_session::{GameSession, HitRect, Point, SessionOutcome, SessionState, Shared};

const MENU_MIN_W: u16 = 48;
const MENU_MIN_H: u16 = 20;
const OVERLAY_MIN_W: u16 = 40;
const BUTTON_W: u16 = 14;

enum Screen {
    Menu(Shared<MenuFlow>),
    Game(Shared<GameSession>),
}

#[derive(Clone, Copy)]
struct Glyphs {
    hidden: &'static str,
    mine: &'static str,
    mark: &'static str,
}

impl Glyphs {
    fn new(ascii: bool) -> Self {
        if ascii {
            Glyphs { hidden: "#", mine: "*", mark: "F" }
        } else {
            Glyphs { hidden: "■", mine: "☼", mark: "⚑" }
        }
    }
}

// Runtime UI variables that outlive a single frame
struct UiState {
    pointer: Point,
    notice: Option<String>,
    // second overlay line, picked once per overlay
    overlay_line: Option<(SessionState, &'static str)>,
    glyphs: Glyphs,
    palette: Palette,
    rng: ThreadRng,
}

pub fn run(cfg: &mut Config, lang: &Lang) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    info!("terminal ui started");

    let result = event_loop(&mut terminal, cfg, lang);
    if let Err(e) = &result {
        error!(error = %e, "ui loop failed");
    }

    // Remember the last started preset
    save_config(cfg);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, cfg: &mut Config, lang: &Lang) -> Result<(), Box<dyn Error>> {
    let mut screen = menu_screen(cfg);
    let mut ui = UiState {
        pointer: Point::default(),
        notice: None,
        overlay_line: None,
        glyphs: Glyphs::new(cfg.ascii_icons),
        palette: Palette::detect(),
        rng: rand::thread_rng(),
    };
    let frame_time = Duration::from_millis(50);

    loop {
        // render first so the hit rectangles match what the player sees
        terminal.draw(|f| match &screen {
            Screen::Menu(menu) => draw_menu(f, &mut menu.lock(), &ui, lang),
            Screen::Game(session) => draw_game(f, &mut session.lock(), &mut ui, lang),
        })?;

        if event::poll(frame_time)? {
            match event::read()? {
                Event::Key(KeyEvent { code, modifiers, kind: KeyEventKind::Press, .. }) => {
                    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
                        info!("interrupted");
                        break;
                    }
                    if code == KeyCode::Esc {
                        if let Screen::Game(session) = &screen {
                            session.lock().notify_escape();
                        }
                    }
                }
                Event::Mouse(me) => {
                    ui.pointer = Point::new(i32::from(me.column), i32::from(me.row));
                    match (me.kind, &screen) {
                        (MouseEventKind::Up(MouseButton::Left), Screen::Menu(menu)) => menu.lock().notify_primary_click(),
                        (MouseEventKind::Up(MouseButton::Left), Screen::Game(session)) => session.lock().notify_primary_click(),
                        (MouseEventKind::Up(MouseButton::Right), Screen::Game(session)) => session.lock().notify_secondary_click(),
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        let next = match &screen {
            Screen::Menu(menu) => {
                let outcome = menu.lock().update(ui.pointer);
                match outcome {
                    MenuOutcome::Stay => None,
                    MenuOutcome::Quit => break,
                    MenuOutcome::StartGame(index) => start_game(index, cfg, &mut ui, lang),
                }
            }
            Screen::Game(session) => {
                let outcome = session.lock().update(ui.pointer);
                match outcome {
                    SessionOutcome::InGame => None,
                    SessionOutcome::RequestRetry => {
                        let retried = session.lock().retry(StdRng::from_entropy());
                        match retried {
                            Ok(fresh) => Some(Screen::Game(Shared::new(fresh))),
                            Err(e) => {
                                error!(error = %e, "retry failed");
                                ui.notice = Some(format!("{} {}", lang.assets.notice_cannot_start, e));
                                Some(menu_screen(cfg))
                            }
                        }
                    }
                    SessionOutcome::RequestQuit => {
                        debug!("back to menu");
                        Some(menu_screen(cfg))
                    }
                }
            }
        };
        if let Some(s) = next {
            screen = s;
            ui.overlay_line = None;
        }
    }
    Ok(())
}

fn menu_screen(cfg: &Config) -> Screen {
    Screen::Menu(Shared::new(MenuFlow::new(&PRESETS).with_preset(cfg.preset.index())))
}

fn start_game(index: usize, cfg: &mut Config, ui: &mut UiState, lang: &Lang) -> Option<Screen> {
    let preset = Preset::by_index(index);
    match GameSession::new(preset, StdRng::from_entropy()) {
        Ok(session) => {
            cfg.preset = PresetChoice(index);
            ui.notice = None;
            Some(Screen::Game(Shared::new(session)))
        }
        Err(e) => {
            error!(preset = preset.name, error = %e, "game not started");
            ui.notice = Some(format!("{} {}", lang.assets.notice_cannot_start, e));
            None
        }
    }
}

fn draw_menu<B: Backend>(f: &mut Frame<B>, menu: &mut MenuFlow, ui: &UiState, lang: &Lang) {
    let size = f.size();
    if size.width < MENU_MIN_W || size.height < MENU_MIN_H {
        draw_too_small(f, lang, MENU_MIN_W, MENU_MIN_H);
        menu.clear_hit_rects();
        return;
    }
    let p = &ui.palette;
    f.render_widget(Block::default().style(Style::default().bg(p.bg)), size);

    let focus = menu.focus(ui.pointer);
    let item_style = |item: MenuItem| {
        if item == MenuItem::Hexagon {
            Style::default().fg(p.disabled)
        } else if focus == Some(item) {
            Style::default().fg(p.hover).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(p.acc).add_modifier(Modifier::BOLD)
        }
    };

    match menu.screen() {
        MenuScreen::Main => {
            // three 3-row entries with one blank row between them
            let area = center_rect(30, 11, size);
            for (i, &item) in menu.items().iter().enumerate() {
                let rect = Rect::new(area.x, area.y + i as u16 * 4, area.width, 3);
                let label = match item {
                    MenuItem::Normal => lang.assets.menu_normal,
                    MenuItem::Hexagon => lang.assets.menu_hexagon,
                    _ => lang.assets.menu_quit_game,
                };
                let style = item_style(item);
                let entry = Paragraph::new(Spans::from(Span::styled(label, style)))
                    .block(Block::default().borders(Borders::ALL).border_style(style))
                    .alignment(Alignment::Center);
                f.render_widget(entry, rect);
                menu.set_item_rect(item, hit_rect(rect));
            }
        }
        MenuScreen::DifficultySelect => {
            let preset = menu.selected_preset();
            let chooser = Rect::new(size.x + (size.width - 36) / 2, size.y + size.height / 3 - 3, 36, 7);
            let info = format!(
                "{}{}x{}  {}{}",
                lang.assets.field_size, preset.width, preset.height, lang.assets.mine_count, preset.mine_count
            );
            let lines = vec![
                Spans::from(""),
                Spans::from(Span::styled(
                    lang.preset_name(menu.preset_index()),
                    Style::default().fg(p.fg).add_modifier(Modifier::BOLD),
                )),
                Spans::from(""),
                Spans::from(Span::styled(info, Style::default().fg(p.acc))),
            ];
            let chooser_widget = Paragraph::new(Text::from(lines))
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(p.acc)))
                .alignment(Alignment::Center);
            f.render_widget(chooser_widget, chooser);
            menu.set_item_rect(MenuItem::Chooser, hit_rect(chooser));

            // arrows only where the cursor can still move
            let arrows = [
                (MenuItem::Prev, menu.can_prev(), lang.assets.prev_arrow, chooser.x - 5),
                (MenuItem::Next, menu.can_next(), lang.assets.next_arrow, chooser.x + chooser.width + 2),
            ];
            for (item, visible, label, x) in arrows {
                if !visible {
                    menu.set_item_rect(item, HitRect::default());
                    continue;
                }
                let rect = Rect::new(x, chooser.y + 2, 3, 3);
                let style = item_style(item);
                let arrow = Paragraph::new(Spans::from(Span::styled(label, style)))
                    .block(Block::default().borders(Borders::ALL).border_style(style))
                    .alignment(Alignment::Center);
                f.render_widget(arrow, rect);
                menu.set_item_rect(item, hit_rect(rect));
            }

            let center_x = size.x + size.width / 2;
            let y = chooser.y + chooser.height + 2;
            let buttons = [
                (MenuItem::Back, lang.assets.back, center_x - 2 - BUTTON_W),
                (MenuItem::Start, lang.assets.start_game, center_x + 2),
            ];
            for (item, label, x) in buttons {
                let rect = Rect::new(x, y, BUTTON_W, 3);
                let text = if focus == Some(item) { lang.decorate(label) } else { label.to_string() };
                draw_button(f, rect, text, item_style(item));
                menu.set_item_rect(item, hit_rect(rect));
            }
        }
    }

    if let Some(notice) = &ui.notice {
        let line = Rect::new(size.x, size.y + size.height - 2, size.width, 1);
        let text = Paragraph::new(Spans::from(Span::styled(notice.as_str(), Style::default().fg(p.level(5)))))
            .alignment(Alignment::Center);
        f.render_widget(text, line);
    }
}

fn draw_game<B: Backend>(f: &mut Frame<B>, session: &mut GameSession, ui: &mut UiState, lang: &Lang) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([Constraint::Min(3), Constraint::Length(3)].as_ref())
        .split(size);
    let (w, h) = (session.board().width(), session.board().height());

    // two columns per cell when there is room, otherwise one
    let area = chunks[0];
    let cell_w: usize = if w * 2 + 3 <= area.width as usize { 2 } else { 1 };
    let need_w = w * cell_w + 2 + (cell_w - 1);
    let need_h = h + 2;
    if need_w > area.width as usize || need_h > area.height as usize || size.width < OVERLAY_MIN_W {
        let min_w = need_w.max(OVERLAY_MIN_W as usize).min(u16::MAX as usize) as u16;
        let min_h = (need_h + 3).min(u16::MAX as usize) as u16;
        draw_too_small(f, lang, min_w, min_h);
        session.clear_hit_rects();
        return;
    }

    let p = ui.palette;
    let g = ui.glyphs;
    f.render_widget(Block::default().style(Style::default().bg(p.bg)), size);
    let board_area = center_rect(need_w as u16, need_h as u16, area);
    let inner = Rect::new(board_area.x + 1, board_area.y + 1, board_area.width - 2, board_area.height - 2);
    for y in 0..h {
        for x in 0..w {
            let rect = HitRect::new(
                i32::from(inner.x) + (x * cell_w) as i32,
                i32::from(inner.y) + y as i32,
                cell_w as i32,
                1,
            );
            session.set_cell_rect(x, y, rect);
        }
    }

    let playing = session.state() == SessionState::Playing;
    let hovered = if playing { session.cell_at(ui.pointer) } else { None };
    let board = session.board();
    let mut lines = Vec::with_capacity(h);
    for y in 0..h {
        let mut spans = Vec::with_capacity(w + 1);
        for x in 0..w {
            let cell = board.cell(x, y);
            let (glyph, fg) = if cell.is_revealed() {
                if cell.is_mine() {
                    (g.mine.to_string(), p.level(5))
                } else if board.adjacent_mine_count(x, y) > 0 {
                    let n = board.adjacent_mine_count(x, y);
                    (n.to_string(), p.level(n))
                } else {
                    (" ".to_string(), p.fg)
                }
            } else if cell.is_marked() {
                (g.mark.to_string(), p.level(5))
            } else {
                (g.hidden.to_string(), p.acc)
            };
            let mut style = Style::default().fg(fg).bg(p.bg);
            if hovered == Some((x, y)) && !cell.is_revealed() && !cell.is_marked() {
                style = style.fg(p.hover).add_modifier(Modifier::BOLD);
            }
            let text = if cell_w == 2 { format!(" {}", glyph) } else { glyph };
            spans.push(Span::styled(text, style));
        }
        if cell_w == 2 {
            // right-side padding column in the board background
            spans.push(Span::styled(" ", Style::default().bg(p.bg)));
        }
        lines.push(Spans::from(spans));
    }
    let title = format!(" {} {}x{} / {} ", preset_title(session.preset(), lang), w, h, board.mine_count());
    let board_widget = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.acc))
                .title(title)
                .title_alignment(Alignment::Center),
        )
        .alignment(Alignment::Left);
    f.render_widget(board_widget, board_area);

    // status row (left mine counter + right-aligned pause hint)
    let left_text = lang.assets.status_mines_fmt.replacen("{}", &board.remaining_mines().to_string(), 1);
    let right_text = lang.assets.status_pause_hint;
    let inner_w = chunks[1].width.saturating_sub(2) as usize;
    let used = left_text.as_str().width() + right_text.width();
    let mid_spaces = inner_w.saturating_sub(used).max(1);
    let status = Paragraph::new(Spans::from(vec![
        Span::styled(left_text, Style::default().fg(p.fg)),
        Span::raw(" ".repeat(mid_spaces)),
        Span::styled(right_text, Style::default().fg(p.acc).add_modifier(Modifier::BOLD)),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(p.acc)));
    f.render_widget(status, chunks[1]);

    draw_overlay(f, session, ui, lang);
}

/// Pause and game-over overlay: two text lines and the retry/quit buttons
fn draw_overlay<B: Backend>(f: &mut Frame<B>, session: &mut GameSession, ui: &mut UiState, lang: &Lang) {
    let a = &lang.assets;
    let state = session.state();
    let (title, variants, retry_label) = match state {
        SessionState::Playing => {
            session.set_retry_rect(HitRect::default());
            session.set_quit_rect(HitRect::default());
            return;
        }
        SessionState::Paused => (a.paused, a.esc_to_resume, a.restart),
        SessionState::GameOverLoss => (a.game_over, a.game_over_2nd, a.retry),
        SessionState::GameOverWin => (a.you_won, a.you_won_2nd, a.retry),
    };
    let line = match ui.overlay_line {
        Some((shown_for, line)) if shown_for == state => line,
        _ => {
            let line = Lang::pick(variants, &mut ui.rng);
            ui.overlay_line = Some((state, line));
            line
        }
    };

    let size = f.size();
    let p = ui.palette;
    let text_w = title.width().max(line.width()) as u16 + 4;
    let box_w = text_w.max(OVERLAY_MIN_W).min(size.width);
    let overlay = center_rect(box_w, 9.min(size.height), size);
    f.render_widget(Clear, overlay);
    let lines = vec![
        Spans::from(""),
        Spans::from(Span::styled(title, Style::default().fg(p.fg).add_modifier(Modifier::BOLD))),
        Spans::from(""),
        Spans::from(Span::styled(line, Style::default().fg(p.fg))),
    ];
    let text = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.acc))
                .style(Style::default().bg(p.bg)),
        )
        .alignment(Alignment::Center);
    f.render_widget(text, overlay);

    let center_x = overlay.x + overlay.width / 2;
    let y = overlay.y + 5;
    let retry_rect = Rect::new(center_x.saturating_sub(2 + BUTTON_W), y, BUTTON_W, 3);
    let quit_rect = Rect::new(center_x + 2, y, BUTTON_W, 3);
    session.set_retry_rect(hit_rect(retry_rect));
    session.set_quit_rect(hit_rect(quit_rect));

    let focus = session.focus(ui.pointer);
    let buttons = [(retry_rect, retry_label, focus.retry), (quit_rect, a.quit, focus.quit)];
    for (rect, label, focused) in buttons {
        let (text, style) = if focused {
            (lang.decorate(label), Style::default().fg(p.hover).bg(p.bg).add_modifier(Modifier::BOLD))
        } else {
            (label.to_string(), Style::default().fg(p.acc).bg(p.bg))
        };
        draw_button(f, rect, text, style);
    }
}

fn draw_button<B: Backend>(f: &mut Frame<B>, rect: Rect, text: String, style: Style) {
    let button = Paragraph::new(Spans::from(Span::styled(text, style)))
        .block(Block::default().borders(Borders::ALL).border_style(style))
        .alignment(Alignment::Center);
    f.render_widget(button, rect);
}

fn draw_too_small<B: Backend>(f: &mut Frame<B>, lang: &Lang, min_w: u16, min_h: u16) {
    let size = f.size();
    let a = &lang.assets;
    let second = a.tsmsg_line2.replacen("{}", &min_w.to_string(), 1).replacen("{}", &min_h.to_string(), 1);
    let warn = Paragraph::new(Text::from(vec![Spans::from(a.tsmsg_line1), Spans::from(second)]))
        .block(Block::default().borders(Borders::ALL).title(a.tsmsg_title))
        .alignment(Alignment::Center);
    f.render_widget(Clear, size);
    let area = center_rect(40u16.min(size.width), 4u16.min(size.height), size);
    f.render_widget(warn, area);
}

/// Localized name of a catalog preset, falling back to its stable name
fn preset_title(preset: Preset, lang: &Lang) -> &'static str {
    Preset::index_of(preset.name).map_or(preset.name, |i| lang.preset_name(i))
}

fn hit_rect(r: Rect) -> HitRect {
    HitRect::new(i32::from(r.x), i32::from(r.y), i32::from(r.width), i32::from(r.height))
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_rect_stays_inside() {
        let outer = Rect::new(0, 0, 80, 24);
        assert_eq!(center_rect(40, 10, outer), Rect::new(20, 7, 40, 10));
        assert_eq!(center_rect(100, 30, outer), Rect::new(0, 0, 80, 24));
    }

    #[test]
    fn test_hit_rect_matches_terminal_cells() {
        let r = hit_rect(Rect::new(5, 2, 14, 3));
        assert!(r.contains(Point::new(5, 2)));
        assert!(r.contains(Point::new(18, 4)));
        assert!(!r.contains(Point::new(19, 4)));
    }

    #[test]
    fn test_preset_titles_localized() {
        let de = Lang::new("de");
        assert_eq!(preset_title(PRESETS[5], &de), "Wahnsinn");
        let custom = Preset { name: "Custom", width: 9, height: 9, mine_count: 10 };
        assert_eq!(preset_title(custom, &de), "Custom");
    }

    #[test]
    fn test_ascii_glyphs() {
        let g = Glyphs::new(true);
        assert_eq!((g.hidden, g.mine, g.mark), ("#", "*", "F"));
    }
}
