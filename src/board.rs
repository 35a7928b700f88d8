use std::fmt;
use crate::movegen::{Move, MoveKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    /// Material value in centipawns. The king is never scored since it can't be captured.
    pub fn value(&self) -> i32 {
        match self {
            Piece::Pawn => 100,
            Piece::Knight => 300,
            Piece::Bishop => 300,
            Piece::Rook => 500,
            Piece::Queen => 800,
            Piece::King => 0,
        }
    }

    fn symbol(&self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a forward pawn step. White starts on rows 6-7 and advances toward row 0.
    pub fn forward(&self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// The row a pawn of this colour promotes on.
    pub fn promotion_row(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Side owning a piece that starts on `row`.
    pub fn from_starting_row(row: usize) -> Color {
        if row > 3 {
            Color::White
        } else {
            Color::Black
        }
    }

    fn index(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// A piece standing on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardPiece {
    pub piece: Piece,
    pub color: Color,
    /// Cleared the first time the piece is relocated, castling included.
    pub unmoved: bool,
}

impl BoardPiece {
    pub fn new(piece: Piece, color: Color) -> Self {
        Self {
            piece,
            color,
            unmoved: true,
        }
    }

    pub fn moved(mut self) -> Self {
        self.unmoved = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

impl Square {
    pub fn new(row: usize, col: usize) -> Self {
        debug_assert!(row < 8 && col < 8, "square ({}, {}) is off the board", row, col);
        Self { row, col }
    }

    /// The square `(dr, dc)` away, if it is still on the board.
    pub fn offset(&self, dr: i32, dc: i32) -> Option<Square> {
        let row = self.row as i32 + dr;
        let col = self.col as i32 + dc;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square::new(row as usize, col as usize))
        } else {
            None
        }
    }

    /// All 64 squares in row-major order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8).flat_map(|row| (0..8).map(move |col| Square::new(row, col)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

pub const ORTHOGONALS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
pub const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Result of walking outward from a square in one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ray {
    /// Squares visited, including the blocker if there is one.
    pub len: usize,
    /// First occupied square, or `None` when the ray ran off the board.
    pub blocker: Option<Square>,
}

#[derive(Debug, Clone, Copy)]
pub struct Board {
    pub squares: [[Option<BoardPiece>; 8]; 8],
    pub side_to_move: Color,
    /// Square of the pawn that double-stepped on the previous half-move.
    pub en_passant: Option<Square>,
    /// Consecutive half-moves per side without a capture or pawn move.
    pub no_progress: [u32; 2],
}

const BACK_RANK: [Piece; 8] = [
    Piece::Rook,
    Piece::Knight,
    Piece::Bishop,
    Piece::Queen,
    Piece::King,
    Piece::Bishop,
    Piece::Knight,
    Piece::Rook,
];

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let mut board = Self::empty();
        for col in 0..8 {
            for row in [0, 7] {
                board.place(Square::new(row, col), BACK_RANK[col], Color::from_starting_row(row));
            }
            for row in [1, 6] {
                board.place(Square::new(row, col), Piece::Pawn, Color::from_starting_row(row));
            }
        }
        board
    }

    /// A board with no pieces and White to move, for composing positions.
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
            side_to_move: Color::White,
            en_passant: None,
            no_progress: [0, 0],
        }
    }

    /// Puts an unmoved piece on `square`, replacing whatever was there.
    pub fn place(&mut self, square: Square, piece: Piece, color: Color) {
        self.set(square, Some(BoardPiece::new(piece, color)));
    }

    pub fn get(&self, square: Square) -> Option<BoardPiece> {
        self.squares[square.row][square.col]
    }

    pub fn set(&mut self, square: Square, value: Option<BoardPiece>) {
        self.squares[square.row][square.col] = value;
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.get(square).is_none()
    }

    pub fn no_progress_count(&self, color: Color) -> u32 {
        self.no_progress[color.index()]
    }

    pub fn set_no_progress_count(&mut self, color: Color, count: u32) {
        self.no_progress[color.index()] = count;
    }

    /// Occupied squares in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, BoardPiece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, BoardPiece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, p)| p.piece == Piece::King)
            .map(|(sq, _)| sq)
    }

    pub fn ray(&self, from: Square, (dr, dc): (i32, i32)) -> Ray {
        let mut len = 0;
        let mut current = from;
        while let Some(next) = current.offset(dr, dc) {
            len += 1;
            if !self.is_empty(next) {
                return Ray { len, blocker: Some(next) };
            }
            current = next;
        }
        Ray { len, blocker: None }
    }

    /// Rays up, down, left and right.
    pub fn horizontal(&self, from: Square) -> [Ray; 4] {
        ORTHOGONALS.map(|dir| self.ray(from, dir))
    }

    /// Rays up-left, up-right, down-left and down-right.
    pub fn diagonal(&self, from: Square) -> [Ray; 4] {
        DIAGONALS.map(|dir| self.ray(from, dir))
    }

    /// Applies a move already accepted by the legality checks and passes the turn.
    pub fn make_move(&mut self, mv: Move) {
        let mover = self
            .get(mv.from)
            .unwrap_or_else(|| panic!("move {} starts on an empty square", mv));
        let color = mover.color;

        if mv.kind == MoveKind::Castle {
            // The move is encoded king -> own rook.
            let step: i32 = if mv.to.col < mv.from.col { -1 } else { 1 };
            let row = mv.from.row;
            let king_to = Square::new(row, (mv.from.col as i32 + 2 * step) as usize);
            let rook_to = Square::new(row, (mv.from.col as i32 + step) as usize);
            let rook = self.get(mv.to);
            self.set(mv.from, None);
            self.set(mv.to, None);
            self.set(king_to, Some(mover.moved()));
            self.set(rook_to, rook.map(BoardPiece::moved));
            self.en_passant = None;
            self.set_no_progress_count(color, self.no_progress_count(color) + 1);
            self.side_to_move = self.side_to_move.opposite();
            return;
        }

        let mut captured = self.get(mv.to).is_some();
        if mv.kind == MoveKind::EnPassant {
            self.set(Square::new(mv.from.row, mv.to.col), None);
            captured = true;
        }

        let placed = if mover.piece == Piece::Pawn && mv.to.row == color.promotion_row() {
            BoardPiece::new(Piece::Queen, color).moved()
        } else {
            mover.moved()
        };
        self.set(mv.from, None);
        self.set(mv.to, Some(placed));

        self.en_passant = if mv.kind == MoveKind::DoubleStep {
            Some(mv.to)
        } else {
            None
        };

        if captured || mover.piece == Piece::Pawn {
            self.set_no_progress_count(color, 0);
        } else {
            self.set_no_progress_count(color, self.no_progress_count(color) + 1);
        }

        self.side_to_move = self.side_to_move.opposite();
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = String::new();
        result.push_str("  0 1 2 3 4 5 6 7\n");
        for row in 0..8 {
            result.push_str(&row.to_string());
            for col in 0..8 {
                result.push(' ');
                result.push(match self.squares[row][col] {
                    Some(p) if p.color == Color::White => p.piece.symbol().to_ascii_uppercase(),
                    Some(p) => p.piece.symbol(),
                    None => '.',
                });
            }
            result.push('\n');
        }
        write!(f, "{}", result)
    }
}
