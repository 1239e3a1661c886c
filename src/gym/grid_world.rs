use std::{collections::HashMap, fmt, str::FromStr};

use strum::{Display, VariantArray};

use crate::error::{Error, Result};

/// A `(row, column)` coordinate into the grid
///
/// Signed so that action deltas can step off the board before being clamped.
pub type Pos = (i32, i32);

/// The kind of a single grid cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Normal,
    Target,
    Wall,
}

impl Cell {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Cell::Normal),
            'T' => Some(Cell::Target),
            '#' => Some(Cell::Wall),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Cell::Normal => '.',
            Cell::Target => 'T',
            Cell::Wall => '#',
        }
    }
}

/// Moves available to the agent
///
/// `Fly1` and `Fly6` are long-range shortcuts, legal only from the source state
/// the grid reserves them for.
#[derive(VariantArray, Display, Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Up,
    Right,
    Down,
    Left,
    Fly1,
    Fly6,
}

impl Action {
    /// Coordinate offset applied by this action
    pub fn delta(self) -> (i32, i32) {
        match self {
            Action::Up => (-1, 0),
            Action::Right => (0, 1),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Fly1 => (-2, -3),
            Action::Fly6 => (0, -3),
        }
    }
}

/// A rectangular arrangement of [cells](Cell), stored row-major
///
/// Parses from text with one line per row: `T` is the target, `#` a wall and `.` a
/// normal cell. Blank lines and surrounding whitespace are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Layout {
    /// Build a layout from explicit rows, checking that it is non-empty and rectangular
    pub fn new(rows: Vec<Vec<Cell>>) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if cols == 0 {
            return Err(Error::EmptyLayout);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(Error::RaggedLayout {
                row,
                expected: cols,
                got: r.len(),
            });
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The cell at `pos`, or `None` if `pos` is off the board
    pub fn get(&self, pos: Pos) -> Option<Cell> {
        let (row, col) = pos;
        if row < 0 || col < 0 || row as usize >= self.rows || col as usize >= self.cols {
            return None;
        }
        Some(self.cells[row as usize * self.cols + col as usize])
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let rows = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .filter(|c| !c.is_whitespace())
                    .enumerate()
                    .map(|(col, character)| {
                        Cell::from_char(character).ok_or(Error::InvalidCell {
                            character,
                            row,
                            col,
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(rows)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: String = row.iter().map(|c| c.as_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

const SLIDES_LAYOUT: &str = "
    T.....
    ....#.
    .#.#..
    ......
";

/// Hand-written starting policy for the slides grid, one preferred action per start state
///
/// Seeding each pair with a value above zero makes it the greedy choice before training.
pub const SLIDES_POLICY: &[(Pos, Action)] = &[
    ((0, 1), Action::Left),
    ((0, 2), Action::Left),
    ((0, 3), Action::Left),
    ((0, 4), Action::Right),
    ((0, 5), Action::Left),
    ((1, 0), Action::Right),
    ((1, 1), Action::Right),
    ((1, 2), Action::Down),
    ((1, 3), Action::Up),
    ((1, 5), Action::Up),
    ((2, 0), Action::Up),
    ((2, 2), Action::Down),
    ((2, 4), Action::Right),
    ((2, 5), Action::Up),
    ((3, 0), Action::Up),
    ((3, 1), Action::Left),
    ((3, 2), Action::Left),
    ((3, 3), Action::Right),
    ((3, 4), Action::Left),
    ((3, 5), Action::Left),
];

/// A deterministic grid world with walls, a single absorbing target and
/// action shortcuts that are only legal from one source state each
#[derive(Debug, Clone)]
pub struct GridWorld {
    layout: Layout,
    exclusive: HashMap<Action, Pos>,
}

impl GridWorld {
    /// Initialize a grid world from a layout and a table of exclusive actions
    ///
    /// Each `(action, state)` pair in `exclusive` restricts `action` to be legal
    /// only from `state`. Actions not listed are legal everywhere.
    pub fn new(
        layout: Layout,
        exclusive: impl IntoIterator<Item = (Action, Pos)>,
    ) -> Result<Self> {
        let exclusive: HashMap<_, _> = exclusive.into_iter().collect();
        for (&action, &state) in &exclusive {
            if layout.get(state) != Some(Cell::Normal) {
                return Err(Error::InvalidExclusiveSource { action, state });
            }
        }
        Ok(Self { layout, exclusive })
    }

    /// The 4×6 grid from the lecture slides, target in the top-left corner
    pub fn slides() -> Self {
        let layout: Layout = SLIDES_LAYOUT
            .parse()
            .expect("Built-in layout is well-formed");
        Self::new(layout, [(Action::Fly1, (1, 3)), (Action::Fly6, (2, 4))])
            .expect("Built-in shortcut sources are normal cells")
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    pub fn cols(&self) -> usize {
        self.layout.cols()
    }

    pub fn cell(&self, pos: Pos) -> Option<Cell> {
        self.layout.get(pos)
    }

    pub fn is_target(&self, pos: Pos) -> bool {
        self.cell(pos) == Some(Cell::Target)
    }

    /// States an episode may start from, in row-major order
    pub fn valid_states(&self) -> Vec<Pos> {
        (0..self.rows() as i32)
            .flat_map(|row| (0..self.cols() as i32).map(move |col| (row, col)))
            .filter(|&pos| self.cell(pos) == Some(Cell::Normal))
            .collect()
    }

    /// Apply `action` from `state`
    ///
    /// Moves that leave the board or run into a wall leave the state unchanged.
    pub fn transition(&self, state: Pos, action: Action) -> Pos {
        let (dr, dc) = action.delta();
        let next = (state.0 + dr, state.1 + dc);
        match self.cell(next) {
            None | Some(Cell::Wall) => state,
            Some(_) => next,
        }
    }

    /// Whether the exclusive-action table allows `action` from `state`
    pub fn permits(&self, state: Pos, action: Action) -> bool {
        self.exclusive
            .get(&action)
            .map_or(true, |&source| source == state)
    }

    /// Actions that are permitted from `state` and actually move the agent
    pub fn legal_actions(&self, state: Pos) -> Vec<Action> {
        Action::VARIANTS
            .iter()
            .copied()
            .filter(|&a| self.permits(state, a) && self.transition(state, a) != state)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_parses_slides() {
        let env = GridWorld::slides();
        assert_eq!(env.rows(), 4, "Row count");
        assert_eq!(env.cols(), 6, "Column count");
        assert_eq!(env.cell((0, 0)), Some(Cell::Target), "Target in the corner");
        assert_eq!(env.cell((1, 4)), Some(Cell::Wall), "Wall at (1,4)");
        assert_eq!(env.cell((2, 1)), Some(Cell::Wall), "Wall at (2,1)");
        assert_eq!(env.cell((2, 3)), Some(Cell::Wall), "Wall at (2,3)");
        assert_eq!(env.cell((4, 0)), None, "Off the board");
        assert_eq!(env.valid_states().len(), 20, "Twenty start states");
        assert_eq!(env.valid_states()[0], (0, 1), "Row-major order skips the target");
    }

    #[test]
    fn layout_display_round_trips() {
        let layout: Layout = SLIDES_LAYOUT.parse().unwrap();
        assert_eq!(layout.to_string(), "T.....\n....#.\n.#.#..\n......\n");
    }

    #[test]
    fn layout_rejects_bad_input() {
        assert_eq!("".parse::<Layout>(), Err(Error::EmptyLayout));
        assert_eq!(
            "T..\n..".parse::<Layout>(),
            Err(Error::RaggedLayout {
                row: 1,
                expected: 3,
                got: 2
            })
        );
        assert_eq!(
            "T.x".parse::<Layout>(),
            Err(Error::InvalidCell {
                character: 'x',
                row: 0,
                col: 2
            })
        );
    }

    #[test]
    fn exclusive_source_must_be_normal() {
        let layout: Layout = "T.\n#.".parse().unwrap();
        let err = GridWorld::new(layout, [(Action::Fly1, (1, 0))]).err();
        assert_eq!(
            err,
            Some(Error::InvalidExclusiveSource {
                action: Action::Fly1,
                state: (1, 0)
            })
        );
    }

    #[test]
    fn transition_moves_into_open_cells() {
        let env = GridWorld::slides();
        for state in env.valid_states() {
            for &action in Action::VARIANTS {
                let (dr, dc) = action.delta();
                let target = (state.0 + dr, state.1 + dc);
                let expected = match env.cell(target) {
                    Some(Cell::Normal | Cell::Target) => target,
                    _ => state,
                };
                assert_eq!(
                    env.transition(state, action),
                    expected,
                    "{action} from {state:?}"
                );
            }
        }
    }

    #[test]
    fn transition_clamps_at_walls_and_edges() {
        let env = GridWorld::slides();
        assert_eq!(env.transition((1, 3), Action::Right), (1, 3), "Wall to the right");
        assert_eq!(env.transition((3, 5), Action::Down), (3, 5), "Bottom edge");
        assert_eq!(env.transition((0, 1), Action::Left), (0, 0), "Into the target");
        assert_eq!(env.transition((1, 3), Action::Fly1), (1, 3), "Shortcut leaves the board");
        assert_eq!(env.transition((2, 4), Action::Fly6), (2, 4), "Shortcut hits a wall");
    }

    #[test]
    fn shortcuts_are_exclusive() {
        let env = GridWorld::slides();
        for state in env.valid_states() {
            assert_eq!(env.permits(state, Action::Fly1), state == (1, 3), "fly1 at {state:?}");
            assert_eq!(env.permits(state, Action::Fly6), state == (2, 4), "fly6 at {state:?}");
            assert!(env.permits(state, Action::Up), "Directional moves are unrestricted");
        }
    }

    #[test]
    fn legal_actions_exclude_self_transitions() {
        let env = GridWorld::slides();
        assert_eq!(env.legal_actions((3, 5)), vec![Action::Up, Action::Left]);
        assert_eq!(
            env.legal_actions((1, 3)),
            vec![Action::Up, Action::Left],
            "fly1 degenerates to a self-transition on this board"
        );
        assert_eq!(
            env.legal_actions((2, 4)),
            vec![Action::Right, Action::Down],
            "fly6 degenerates to a self-transition on this board"
        );
    }

    #[test]
    fn shortcut_is_legal_from_its_source_when_it_moves() {
        let layout: Layout = SLIDES_LAYOUT.parse().unwrap();
        let env = GridWorld::new(layout, [(Action::Fly6, (3, 5))]).unwrap();
        assert!(env.legal_actions((3, 5)).contains(&Action::Fly6));
        assert_eq!(env.transition((3, 5), Action::Fly6), (3, 2));
        assert!(!env.legal_actions((3, 4)).contains(&Action::Fly6));
        assert_eq!(env.transition((3, 4), Action::Fly1), (1, 1));
        assert!(
            env.legal_actions((3, 4)).contains(&Action::Fly1),
            "Unlisted actions are unrestricted"
        );
    }
}
