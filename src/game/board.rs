use serde::{Deserialize, Serialize};

pub const BOARD_CELLS: usize = 9;

/// 八条获胜连线：三行、三列、两条对角线。
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }
}

impl std::str::FromStr for Mark {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "X" | "x" => Ok(Mark::X),
            "O" | "o" | "0" => Ok(Mark::O),
            _ => Err(()),
        }
    }
}

/// 棋盘格子。前端以 `null | "X" | "O"` 表示，序列化时空格为 `null`。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(from = "Option<Mark>", into = "Option<Mark>")]
pub enum Cell {
    #[default]
    Empty,
    X,
    O,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
        }
    }
}

impl From<Option<Mark>> for Cell {
    fn from(value: Option<Mark>) -> Self {
        value.map(Mark::to_cell).unwrap_or(Cell::Empty)
    }
}

impl From<Cell> for Option<Mark> {
    fn from(value: Cell) -> Self {
        value.mark()
    }
}

/// 终局结果。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Outcome {
    Winner { mark: Mark },
    Draw,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct Board {
    cells: [Cell; BOARD_CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以 `"XX. .O. ..."` 形式的字符串构建棋盘，忽略空白；`.`、`_`、`-` 表示空格。
    pub fn parse(layout: &str) -> Option<Self> {
        let mut cells = [Cell::Empty; BOARD_CELLS];
        let mut count = 0;
        for ch in layout.chars().filter(|ch| !ch.is_whitespace()) {
            if count >= BOARD_CELLS {
                return None;
            }
            cells[count] = match ch {
                '.' | '_' | '-' => Cell::Empty,
                'X' | 'x' => Cell::X,
                'O' | 'o' => Cell::O,
                _ => return None,
            };
            count += 1;
        }
        (count == BOARD_CELLS).then_some(Self { cells })
    }

    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn is_empty_at(&self, index: usize) -> bool {
        self.get(index).map(Cell::is_empty).unwrap_or(false)
    }

    /// 在副本上落子，原棋盘保持不变。
    pub fn with_move(&self, index: usize, mark: Mark) -> Board {
        let mut next = *self;
        next.place(index, mark);
        next
    }

    pub(crate) fn place(&mut self, index: usize, mark: Mark) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = mark.to_cell();
        }
    }

    pub(crate) fn clear(&mut self, index: usize) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = Cell::Empty;
        }
    }

    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    pub fn winner(&self) -> Option<Mark> {
        WINNING_LINES.iter().find_map(|&[a, b, c]| {
            let mark = self.cells[a].mark()?;
            (self.cells[a] == self.cells[b] && self.cells[a] == self.cells[c]).then_some(mark)
        })
    }
}

/// 终局判定：有三连返回胜者，满盘无三连返回平局，否则 `None`。
pub fn check_winner(board: &Board) -> Option<Outcome> {
    if let Some(mark) = board.winner() {
        return Some(Outcome::Winner { mark });
    }
    if board.is_full() {
        return Some(Outcome::Draw);
    }
    None
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (row, chunk) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for cell in chunk {
                let ch = match cell {
                    Cell::Empty => '.',
                    Cell::X => 'X',
                    Cell::O => 'O',
                };
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_row_column_and_diagonal_wins() {
        let row = Board::parse("XXX OO. ...").expect("valid layout");
        assert_eq!(check_winner(&row), Some(Outcome::Winner { mark: Mark::X }));

        let column = Board::parse("OX. OX. O..").expect("valid layout");
        assert_eq!(
            check_winner(&column),
            Some(Outcome::Winner { mark: Mark::O })
        );

        let diagonal = Board::parse("..X .X. XOO").expect("valid layout");
        assert_eq!(
            check_winner(&diagonal),
            Some(Outcome::Winner { mark: Mark::X })
        );
    }

    #[test]
    fn full_board_without_line_is_draw() {
        let board = Board::parse("XOX XOO OXX").expect("valid layout");
        assert!(board.is_full());
        assert_eq!(check_winner(&board), Some(Outcome::Draw));
    }

    #[test]
    fn open_board_has_no_outcome() {
        let board = Board::parse("XO. ... ...").expect("valid layout");
        assert_eq!(check_winner(&board), None);
        assert_eq!(board.empty_cells(), vec![2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn parse_rejects_wrong_length_and_symbols() {
        assert!(Board::parse("XO").is_none());
        assert!(Board::parse("XO. ... ... .").is_none());
        assert!(Board::parse("XOZ ... ...").is_none());
    }

    #[test]
    fn serializes_empty_cells_as_null() {
        let board = Board::parse("X.. .O. ...").expect("valid layout");
        let json = serde_json::to_string(&board).expect("serialize");
        assert_eq!(json, r#"["X",null,null,null,"O",null,null,null,null]"#);
        let back: Board = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, board);
    }
}
