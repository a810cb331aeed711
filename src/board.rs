use rand::seq::index;
use rand::Rng;

use crate::corpus::{Corpus, Idiom};

pub const GRID_SIDE: usize = 4;
pub const GRID_CELLS: usize = GRID_SIDE * GRID_SIDE;

/// Transient display state for a single cell. Presentation only; match
/// evaluation and scoring never read these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CellFlag {
    #[default]
    Clear,
    Selected,
    Correct,
    Wrong,
}

#[derive(Clone, Copy, Debug)]
pub struct Cell {
    pub index: usize,
    pub ch: char,
    pub flag: CellFlag,
}

/// One round's 4x4 playing field. The target idiom occupies four positions
/// drawn without replacement; the draw order is retained because a match
/// requires picking those characters in exactly that order.
#[derive(Clone, Debug)]
pub struct Board {
    cells: [Cell; GRID_CELLS],
    answer: [usize; Idiom::LEN],
    target: Idiom,
}

impl Board {
    /// Deal a fresh board: one idiom drawn uniformly from the corpus, four
    /// distinct positions drawn uniformly (i-th drawn position receives
    /// idiom character i), every other position filled independently from
    /// the filler alphabet. Fillers may collide with each other or with
    /// idiom characters; collisions are left as dealt.
    pub fn deal<R: Rng>(corpus: &Corpus, rng: &mut R) -> Self {
        let idioms = corpus.idioms();
        let target = idioms[rng.gen_range(0..idioms.len())].clone();

        let mut answer = [0usize; Idiom::LEN];
        for (slot, pos) in answer
            .iter_mut()
            .zip(index::sample(rng, GRID_CELLS, Idiom::LEN))
        {
            *slot = pos;
        }

        let mut chars = [' '; GRID_CELLS];
        for (i, &pos) in answer.iter().enumerate() {
            chars[pos] = target.char_at(i);
        }

        let fillers = corpus.fillers();
        for (pos, slot) in chars.iter_mut().enumerate() {
            if !answer.contains(&pos) {
                *slot = fillers[rng.gen_range(0..fillers.len())];
            }
        }

        let cells = std::array::from_fn(|i| Cell {
            index: i,
            ch: chars[i],
            flag: CellFlag::Clear,
        });

        Self {
            cells,
            answer,
            target,
        }
    }

    pub fn cells(&self) -> &[Cell; GRID_CELLS] {
        &self.cells
    }

    /// The grid characters alone, in position order.
    pub fn chars(&self) -> [char; GRID_CELLS] {
        std::array::from_fn(|i| self.cells[i].ch)
    }

    pub fn target(&self) -> &Idiom {
        &self.target
    }

    /// The four designated positions, in the order the idiom characters
    /// were placed on them.
    pub fn answer(&self) -> &[usize; Idiom::LEN] {
        &self.answer
    }

    /// True iff the picked cells' characters, concatenated in pick order,
    /// spell the target idiom exactly. Strict order; no partial credit. A
    /// filler cell that happens to duplicate the right character at the
    /// right step counts, since evaluation compares characters, not
    /// positions.
    pub fn is_match(&self, picks: &[usize]) -> bool {
        picks.len() == Idiom::LEN
            && picks
                .iter()
                .zip(self.target.chars())
                .all(|(&pick, &expected)| self.cells[pick].ch == expected)
    }

    /// The picked characters joined in pick order, for the selection echo.
    pub fn spelled(&self, picks: &[usize]) -> String {
        picks.iter().map(|&pick| self.cells[pick].ch).collect()
    }

    pub fn set_flag(&mut self, index: usize, flag: CellFlag) {
        if index < GRID_CELLS {
            self.cells[index].flag = flag;
        }
    }

    pub fn clear_flags(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.flag = CellFlag::Clear;
        }
    }
}
