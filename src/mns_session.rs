// Game session: per-game UI state and the input state machine
// Turns click/escape signals into board mutations and session transitions

use rand::Rng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::mns_board::{Board, BoardError, RevealResult};
use crate::mns_game::Preset;

/// Pointer position in renderer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Screen region owned by the renderer and reported back for click resolution.
/// The default (empty) rectangle contains no point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl HitRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        HitRect { x, y, width, height }
    }

    /// Half-open containment: left/top edges inside, right/bottom edges outside
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Playing,
    Paused,
    GameOverLoss,
    GameOverWin,
}

/// What the host loop should do after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    InGame,
    RequestRetry,
    RequestQuit,
}

/// Which overlay button the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayFocus {
    pub retry: bool,
    pub quit: bool,
}

// One-shot input signals, cleared when an update consumes them
#[derive(Debug, Clone, Copy, Default)]
struct Signals {
    primary: bool,
    secondary: bool,
    escape: bool,
}

impl Signals {
    fn any(&self) -> bool {
        self.primary || self.secondary || self.escape
    }
}

/// One game on one preset. Replaced wholesale on retry.
pub struct GameSession<R: Rng = StdRng> {
    preset: Preset,
    board: Board<R>,
    state: SessionState,
    pending: Signals,
    cell_rects: Vec<HitRect>,
    retry_rect: HitRect,
    quit_rect: HitRect,
}

impl<R: Rng> GameSession<R> {
    /// Start a game on `preset`. An overfull preset is rejected here, before any click.
    pub fn new(preset: Preset, rng: R) -> Result<Self, BoardError> {
        let board = Board::new(preset.width, preset.height, preset.mine_count, rng)
            .inspect_err(|e| warn!(preset = preset.name, error = %e, "cannot start session"))?;
        info!(
            preset = preset.name,
            width = preset.width,
            height = preset.height,
            mines = preset.mine_count,
            "new game session"
        );
        Ok(Self::with_board(preset, board))
    }

    /// Fresh session on the same preset
    pub fn retry<Q: Rng>(&self, rng: Q) -> Result<GameSession<Q>, BoardError> {
        GameSession::new(self.preset, rng)
    }

    fn with_board(preset: Preset, board: Board<R>) -> Self {
        let cells = board.width() * board.height();
        GameSession {
            preset,
            board,
            state: SessionState::Playing,
            pending: Signals::default(),
            cell_rects: vec![HitRect::default(); cells],
            retry_rect: HitRect::default(),
            quit_rect: HitRect::default(),
        }
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn board(&self) -> &Board<R> {
        &self.board
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == SessionState::Paused
    }

    /// The game has ended, won or lost
    pub fn is_game_over(&self) -> bool {
        matches!(self.state, SessionState::GameOverLoss | SessionState::GameOverWin)
    }

    pub fn is_won(&self) -> bool {
        self.state == SessionState::GameOverWin
    }

    pub fn notify_primary_click(&mut self) {
        self.pending.primary = true;
    }

    pub fn notify_secondary_click(&mut self) {
        self.pending.secondary = true;
    }

    pub fn notify_escape(&mut self) {
        self.pending.escape = true;
    }

    pub fn set_cell_rect(&mut self, x: usize, y: usize, rect: HitRect) {
        assert!(x < self.board.width() && y < self.board.height(), "cell ({x}, {y}) out of range");
        let idx = y * self.board.width() + x;
        self.cell_rects[idx] = rect;
    }

    pub fn set_retry_rect(&mut self, rect: HitRect) {
        self.retry_rect = rect;
    }

    pub fn set_quit_rect(&mut self, rect: HitRect) {
        self.quit_rect = rect;
    }

    /// Forget every rectangle, e.g. when the board could not be laid out this frame
    pub fn clear_hit_rects(&mut self) {
        self.cell_rects.fill(HitRect::default());
        self.retry_rect = HitRect::default();
        self.quit_rect = HitRect::default();
    }

    /// The cell whose last rendered rectangle contains `pointer`
    pub fn cell_at(&self, pointer: Point) -> Option<(usize, usize)> {
        let w = self.board.width();
        self.cell_rects
            .iter()
            .position(|r| r.contains(pointer))
            .map(|i| (i % w, i / w))
    }

    pub fn focus(&self, pointer: Point) -> OverlayFocus {
        OverlayFocus {
            retry: self.retry_rect.contains(pointer),
            quit: self.quit_rect.contains(pointer),
        }
    }

    /// Consume pending signals against the pointer position. Called once per frame.
    pub fn update(&mut self, pointer: Point) -> SessionOutcome {
        if !self.pending.any() {
            return SessionOutcome::InGame;
        }

        if self.pending.escape {
            self.pending.escape = false;
            if !self.is_game_over() {
                // clicks from the same frame stay pending for the next update
                self.state = match self.state {
                    SessionState::Paused => SessionState::Playing,
                    _ => SessionState::Paused,
                };
                info!(paused = self.is_paused(), "pause toggled");
                return SessionOutcome::InGame;
            }
        }

        if self.pending.secondary && self.state == SessionState::Playing {
            self.pending.secondary = false;
            if let Some((x, y)) = self.cell_at(pointer) {
                self.board.toggle_mark(x, y);
            }
            return SessionOutcome::InGame;
        }

        let primary = self.pending.primary;
        self.pending = Signals::default();
        if !primary {
            return SessionOutcome::InGame;
        }

        if self.state != SessionState::Playing {
            let focus = self.focus(pointer);
            let outcome = if focus.retry {
                SessionOutcome::RequestRetry
            } else if focus.quit {
                SessionOutcome::RequestQuit
            } else {
                SessionOutcome::InGame
            };
            if outcome != SessionOutcome::InGame {
                info!(state = ?self.state, won = self.is_won(), ?outcome, "overlay button clicked");
            }
            return outcome;
        }

        let Some((x, y)) = self.cell_at(pointer) else {
            return SessionOutcome::InGame;
        };
        // marked cells are immune to reveal; a click only lifts the mark
        if self.board.cell(x, y).is_marked() {
            self.board.toggle_mark(x, y);
            return SessionOutcome::InGame;
        }
        if !self.board.mines_placed() {
            debug!(x, y, "first reveal, placing mines");
        }
        match self.board.reveal(x, y) {
            RevealResult::Mine => {
                self.board.reveal_all_mines();
                self.state = SessionState::GameOverLoss;
                info!(
                    preset = self.preset.name,
                    x,
                    y,
                    revealed = self.board.revealed_count(),
                    marked = self.board.marked_count(),
                    "game lost"
                );
            }
            RevealResult::Safe if self.board.is_cleared() => {
                self.state = SessionState::GameOverWin;
                info!(preset = self.preset.name, "game won");
            }
            RevealResult::Safe => {}
            RevealResult::AlreadyRevealed => debug!(x, y, "cell already revealed"),
        }
        SessionOutcome::InGame
    }

    #[cfg(test)]
    pub(crate) fn from_board(preset: Preset, board: Board<R>) -> Self {
        Self::with_board(preset, board)
    }
}

/// Coarse-grained lock around state shared by the input source and the update loop
#[derive(Debug, Default)]
pub struct Shared<T>(Arc<Mutex<T>>);

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Arc::clone(&self.0))
    }
}

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Shared(Arc::new(Mutex::new(value)))
    }

    /// Lock the state. A poisoned lock is recovered; the state is plain data.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mns_game::PRESETS;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::thread;

    const RETRY: HitRect = HitRect { x: 10, y: 50, width: 8, height: 3 };
    const QUIT: HitRect = HitRect { x: 30, y: 50, width: 8, height: 3 };

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    /// Lay cells out as 2x1 rectangles starting at the origin, like the terminal renderer
    fn layout<R: Rng>(session: &mut GameSession<R>) {
        let (w, h) = (session.board().width(), session.board().height());
        for y in 0..h {
            for x in 0..w {
                session.set_cell_rect(x, y, HitRect::new(x as i32 * 2, y as i32, 2, 1));
            }
        }
        session.set_retry_rect(RETRY);
        session.set_quit_rect(QUIT);
    }

    fn at(x: usize, y: usize) -> Point {
        Point::new(x as i32 * 2, y as i32)
    }

    /// Easy-sized session whose mines form a wall in column 2 plus one at (6, 6)
    fn walled_session() -> GameSession<ChaCha8Rng> {
        let mut mines: Vec<(usize, usize)> = (0..7).map(|y| (2, y)).collect();
        mines.push((6, 6));
        let board = Board::with_layout(7, 7, &mines, rng(0));
        let mut session = GameSession::from_board(PRESETS[0], board);
        layout(&mut session);
        session
    }

    fn click(session: &mut GameSession<ChaCha8Rng>, p: Point) -> SessionOutcome {
        session.notify_primary_click();
        session.update(p)
    }

    #[test]
    fn test_hit_rect_contains_is_half_open() {
        let r = HitRect::new(2, 3, 4, 2);
        assert!(r.contains(Point::new(2, 3)));
        assert!(r.contains(Point::new(5, 4)));
        assert!(!r.contains(Point::new(6, 4)));
        assert!(!r.contains(Point::new(5, 5)));
        assert!(!HitRect::default().contains(Point::new(0, 0)));
    }

    #[test]
    fn test_no_signal_is_noop() {
        let mut session = walled_session();
        assert_eq!(session.update(at(0, 0)), SessionOutcome::InGame);
        assert_eq!(session.board().revealed_count(), 0);
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn test_new_rejects_overfull_preset() {
        let bad = Preset { name: "Broken", width: 4, height: 4, mine_count: 7 };
        assert!(matches!(
            GameSession::new(bad, rng(1)),
            Err(BoardError::TooManyMines { mines: 7, available: 7, .. })
        ));
        assert!(GameSession::new(PRESETS[0], rng(1)).is_ok());
    }

    #[test]
    fn test_first_click_on_easy_is_safe() {
        let mut session = GameSession::new(PRESETS[0], rng(9)).unwrap();
        layout(&mut session);
        assert_eq!(click(&mut session, at(3, 3)), SessionOutcome::InGame);
        assert!(session.board().cell(3, 3).is_revealed());
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn test_click_on_marked_cell_only_unmarks() {
        let mut session = walled_session();
        session.notify_secondary_click();
        session.update(at(0, 0));
        assert!(session.board().cell(0, 0).is_marked());

        assert_eq!(click(&mut session, at(0, 0)), SessionOutcome::InGame);
        assert!(!session.board().cell(0, 0).is_marked());
        assert!(!session.board().cell(0, 0).is_revealed());
        assert_eq!(session.board().revealed_count(), 0);
    }

    #[test]
    fn test_secondary_click_twice_restores_cell() {
        let mut session = walled_session();
        for _ in 0..2 {
            session.notify_secondary_click();
            session.update(at(4, 4));
        }
        assert!(!session.board().cell(4, 4).is_marked());
        assert_eq!(session.board().marked_count(), 0);
    }

    #[test]
    fn test_click_outside_cells_does_nothing() {
        let mut session = walled_session();
        assert_eq!(click(&mut session, Point::new(100, 100)), SessionOutcome::InGame);
        assert_eq!(session.board().revealed_count(), 0);
        // the click was consumed
        assert_eq!(session.update(at(0, 0)), SessionOutcome::InGame);
        assert_eq!(session.board().revealed_count(), 0);
    }

    #[test]
    fn test_mine_click_loses_and_shows_mines() {
        let mut session = walled_session();
        click(&mut session, at(2, 3));
        assert_eq!(session.state(), SessionState::GameOverLoss);
        assert!(session.is_game_over());
        assert!(!session.is_won());
        assert!(session.board().cell(6, 6).is_revealed());
        assert!(session.board().cell(2, 0).is_revealed());
        assert!(!session.board().cell(0, 0).is_revealed());
    }

    #[test]
    fn test_last_safe_reveal_wins() {
        let mut session = walled_session();
        click(&mut session, at(0, 0));
        assert_eq!(session.state(), SessionState::Playing);
        assert!(!session.board().is_cleared());

        // the right-hand side floods open in one go and clears the board
        click(&mut session, at(4, 0));
        assert!(session.board().is_cleared());
        assert_eq!(session.state(), SessionState::GameOverWin);
        assert!(session.is_won());
        assert!(!session.board().cell(6, 6).is_revealed());
    }

    #[test]
    fn test_escape_toggles_pause() {
        let mut session = walled_session();
        session.notify_escape();
        assert_eq!(session.update(at(0, 0)), SessionOutcome::InGame);
        assert!(session.is_paused());
        session.notify_escape();
        session.update(at(0, 0));
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn test_paused_quit_click_leaves_board_untouched() {
        let mut session = walled_session();
        session.notify_escape();
        session.update(at(0, 0));

        let outcome = click(&mut session, Point::new(QUIT.x + 1, QUIT.y + 1));
        assert_eq!(outcome, SessionOutcome::RequestQuit);
        assert_eq!(session.board().revealed_count(), 0);
        assert_eq!(session.board().marked_count(), 0);
        assert!(session.is_paused());
    }

    #[test]
    fn test_paused_board_ignores_cells() {
        let mut session = walled_session();
        session.notify_escape();
        session.update(at(0, 0));

        assert_eq!(click(&mut session, at(0, 0)), SessionOutcome::InGame);
        session.notify_secondary_click();
        session.update(at(1, 1));
        assert_eq!(session.board().revealed_count(), 0);
        assert_eq!(session.board().marked_count(), 0);
        assert!(session.is_paused());
    }

    #[test]
    fn test_game_over_buttons() {
        let mut session = walled_session();
        click(&mut session, at(2, 0));
        assert_eq!(click(&mut session, Point::new(RETRY.x, RETRY.y)), SessionOutcome::RequestRetry);
        assert_eq!(click(&mut session, Point::new(QUIT.x, QUIT.y)), SessionOutcome::RequestQuit);
        assert_eq!(click(&mut session, Point::new(0, 0)), SessionOutcome::InGame);
    }

    #[test]
    fn test_escape_after_game_over_is_discarded() {
        let mut session = walled_session();
        click(&mut session, at(2, 0));
        session.notify_escape();
        assert_eq!(session.update(at(0, 0)), SessionOutcome::InGame);
        assert_eq!(session.state(), SessionState::GameOverLoss);
        // and it does not linger
        assert_eq!(session.update(Point::new(RETRY.x, RETRY.y)), SessionOutcome::InGame);
    }

    #[test]
    fn test_click_in_pause_frame_waits_for_next_update() {
        let mut session = walled_session();
        session.notify_escape();
        session.notify_primary_click();
        session.update(Point::new(QUIT.x, QUIT.y));
        assert!(session.is_paused());
        assert_eq!(session.update(Point::new(QUIT.x, QUIT.y)), SessionOutcome::RequestQuit);
    }

    #[test]
    fn test_focus_follows_pointer() {
        let session = walled_session();
        assert_eq!(session.focus(Point::new(RETRY.x, RETRY.y)), OverlayFocus { retry: true, quit: false });
        assert_eq!(session.focus(Point::new(QUIT.x + 7, QUIT.y + 2)), OverlayFocus { retry: false, quit: true });
        assert_eq!(session.focus(Point::new(0, 0)), OverlayFocus::default());
    }

    #[test]
    fn test_cleared_rects_hit_nothing() {
        let mut session = walled_session();
        session.clear_hit_rects();
        assert_eq!(session.cell_at(at(0, 0)), None);
        assert_eq!(session.focus(Point::new(RETRY.x, RETRY.y)), OverlayFocus::default());
        assert_eq!(click(&mut session, at(0, 0)), SessionOutcome::InGame);
        assert_eq!(session.board().revealed_count(), 0);
    }

    #[test]
    fn test_retry_builds_fresh_session() {
        let mut session = walled_session();
        click(&mut session, at(2, 0));
        let fresh = session.retry(rng(4)).unwrap();
        assert_eq!(fresh.preset(), session.preset());
        assert_eq!(fresh.state(), SessionState::Playing);
        assert!(!fresh.board().mines_placed());
        assert_eq!(fresh.cell_at(at(0, 0)), None);
    }

    #[test]
    fn test_shared_session_across_threads() {
        let mut inner = walled_session();
        inner.clear_hit_rects();
        let shared = Shared::new(inner);
        {
            let mut s = shared.lock();
            layout(&mut *s);
        }

        let input = shared.clone();
        thread::spawn(move || input.lock().notify_primary_click())
            .join()
            .unwrap();

        assert_eq!(shared.lock().update(at(0, 0)), SessionOutcome::InGame);
        assert_eq!(shared.lock().board().revealed_count(), 14);
    }
}
