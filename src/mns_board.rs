// Minefield board: cells, adjacency, mine placement, reveal propagation and marking
// The board knows nothing about screens or input; the game session drives it

use derive_more::{Display, Error};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Grid topology of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardShape {
    /// Square cells with 8-connectivity (orthogonal and diagonal neighbours)
    #[default]
    Rectangular,
}

impl BoardShape {
    /// Number of cells a `w` x `h` board of this shape holds
    pub fn cell_count(self, w: usize, h: usize) -> usize {
        match self {
            BoardShape::Rectangular => w * h,
        }
    }

    /// Largest first-click exclusion zone (the clamped 3x3 block) the board can contain
    pub fn max_exclusion(self, w: usize, h: usize) -> usize {
        match self {
            BoardShape::Rectangular => w.min(3) * h.min(3),
        }
    }

    /// Coordinates adjacent to (x, y), bounds-checked, never including (x, y) itself.
    /// Requires a non-empty board.
    pub fn neighbors(
        self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
    ) -> impl Iterator<Item = (usize, usize)> {
        match self {
            BoardShape::Rectangular => {
                let xs = x.saturating_sub(1)..=(x + 1).min(w - 1);
                let ys = y.saturating_sub(1)..=(y + 1).min(h - 1);
                ys.flat_map(move |ny| xs.clone().map(move |nx| (nx, ny)))
                    .filter(move |&(nx, ny)| nx != x || ny != y)
            }
        }
    }
}

/// A single cell of the minefield
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    mine: bool,
    revealed: bool,
    marked: bool,
    adjacent_mines: u8, // cached once mines are placed
}

impl Cell {
    pub fn is_mine(&self) -> bool {
        self.mine
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Mined neighbours (0-8); always 0 before mines are placed
    pub fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }
}

/// Result of a single reveal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealResult {
    AlreadyRevealed,
    Safe,
    Mine,
}

/// Board configuration errors, reported when a board is built
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    #[display("board dimensions must be non-zero (got {width}x{height})")]
    EmptyBoard { width: usize, height: usize },
    #[display(
        "{mines} mines do not fit on a {width}x{height} board: only {available} cells lie outside the first-click zone"
    )]
    TooManyMines {
        width: usize,
        height: usize,
        mines: usize,
        available: usize,
    },
}

/// The minefield itself
///
/// Cells live in a flat row-major vector; neighbours are computed on demand from
/// the [`BoardShape`]. Mines are placed lazily by the first reveal so that the
/// clicked cell and its neighbours are always free.
pub struct Board<R: Rng = StdRng> {
    shape: BoardShape,
    width: usize,
    height: usize,
    mine_count: usize,
    cells: Vec<Cell>,
    mines_placed: bool,
    revealed_safe: usize,
    marked: usize,
    rng: R,
}

impl<R: Rng> Board<R> {
    /// Create an empty rectangular board. Fails when the mines could not be placed
    /// around any first click.
    pub fn new(width: usize, height: usize, mine_count: usize, rng: R) -> Result<Self, BoardError> {
        let shape = BoardShape::Rectangular;
        if width == 0 || height == 0 {
            return Err(BoardError::EmptyBoard { width, height });
        }
        let available = shape.cell_count(width, height) - shape.max_exclusion(width, height);
        if mine_count >= available {
            return Err(BoardError::TooManyMines {
                width,
                height,
                mines: mine_count,
                available,
            });
        }
        Ok(Board {
            shape,
            width,
            height,
            mine_count,
            cells: vec![Cell::default(); shape.cell_count(width, height)],
            mines_placed: false,
            revealed_safe: 0,
            marked: 0,
            rng,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    /// Cell state at (x, y), for rendering
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.cells[self.index(x, y)]
    }

    /// Number of revealed non-mine cells
    pub fn revealed_count(&self) -> usize {
        self.revealed_safe
    }

    pub fn marked_count(&self) -> usize {
        self.marked
    }

    /// Mine counter shown to the player: mines minus marks, negative when over-marked
    pub fn remaining_mines(&self) -> isize {
        self.mine_count as isize - self.marked as isize
    }

    pub fn adjacent_mine_count(&self, x: usize, y: usize) -> u8 {
        self.cell(x, y).adjacent_mines()
    }

    /// True iff every non-mine cell is revealed
    pub fn is_cleared(&self) -> bool {
        self.revealed_safe == self.cells.len() - self.mine_count
    }

    /// Reveal (x, y). The first call places the mines around it.
    /// A `Mine` result leaves the other mines hidden; the caller decides whether
    /// to expose them with [`Board::reveal_all_mines`].
    pub fn reveal(&mut self, x: usize, y: usize) -> RevealResult {
        let idx = self.index(x, y);
        if !self.mines_placed {
            self.place_mines(x, y);
        }
        if self.cells[idx].revealed {
            return RevealResult::AlreadyRevealed;
        }
        if self.cells[idx].mine {
            self.cells[idx].revealed = true;
            info!(x, y, "mine revealed");
            return RevealResult::Mine;
        }
        let before = self.revealed_safe;
        self.flood_reveal(idx);
        debug!(x, y, opened = self.revealed_safe - before, "cells revealed");
        RevealResult::Safe
    }

    /// Flip the mark on an unrevealed cell; revealed cells are left alone
    pub fn toggle_mark(&mut self, x: usize, y: usize) {
        let idx = self.index(x, y);
        let cell = &mut self.cells[idx];
        if cell.revealed {
            return;
        }
        cell.marked = !cell.marked;
        if cell.marked {
            self.marked += 1;
        } else {
            self.marked -= 1;
        }
        debug!(x, y, marked = self.cells[idx].marked, "mark toggled");
    }

    /// Expose every mine (loss display)
    pub fn reveal_all_mines(&mut self) {
        for cell in self.cells.iter_mut().filter(|c| c.mine) {
            cell.revealed = true;
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) is outside the {}x{} board",
            self.width,
            self.height
        );
        y * self.width + x
    }

    /// Pick `mine_count` cells uniformly without replacement, skipping the clamped
    /// 3x3 block around (x, y), then cache the adjacency counts
    fn place_mines(&mut self, x: usize, y: usize) {
        let w = self.width;
        let mut candidates: Vec<usize> = (0..self.cells.len())
            .filter(|&i| (i % w).abs_diff(x) > 1 || (i / w).abs_diff(y) > 1)
            .collect();
        for _ in 0..self.mine_count {
            let pick = self.rng.gen_range(0..candidates.len());
            let idx = candidates.swap_remove(pick);
            self.cells[idx].mine = true;
        }
        self.mines_placed = true;
        self.count_adjacent();
        info!(x, y, mines = self.mine_count, "mines placed");
    }

    fn count_adjacent(&mut self) {
        let (w, h, shape) = (self.width, self.height, self.shape);
        for idx in 0..self.cells.len() {
            let count = shape
                .neighbors(idx % w, idx / w, w, h)
                .filter(|&(nx, ny)| self.cells[ny * w + nx].mine)
                .count();
            self.cells[idx].adjacent_mines = count as u8;
        }
    }

    // Worklist flood fill: zero cells push their neighbours, numbered cells stop the
    // frontier. Marks on cells opened this way are dropped.
    fn flood_reveal(&mut self, start: usize) {
        let (w, h, shape) = (self.width, self.height, self.shape);
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let cell = &mut self.cells[idx];
            if cell.revealed || cell.mine {
                continue;
            }
            cell.revealed = true;
            if cell.marked {
                cell.marked = false;
                self.marked -= 1;
            }
            let zero = cell.adjacent_mines == 0;
            self.revealed_safe += 1;
            if zero {
                stack.extend(
                    shape
                        .neighbors(idx % w, idx / w, w, h)
                        .map(|(nx, ny)| ny * w + nx)
                        .filter(|&n| !self.cells[n].revealed),
                );
            }
        }
    }

    /// Board with mines at fixed positions, already placed
    #[cfg(test)]
    pub(crate) fn with_layout(width: usize, height: usize, mines: &[(usize, usize)], rng: R) -> Self {
        let mut board = Board {
            shape: BoardShape::Rectangular,
            width,
            height,
            mine_count: mines.len(),
            cells: vec![Cell::default(); width * height],
            mines_placed: true,
            revealed_safe: 0,
            marked: 0,
            rng,
        };
        for &(x, y) in mines {
            let idx = board.index(x, y);
            board.cells[idx].mine = true;
        }
        board.count_adjacent();
        board
    }
}
