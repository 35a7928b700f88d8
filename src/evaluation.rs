use crate::board::{Board, Color, Piece};
use crate::movegen::MoveGenerator;

/// Score of a lost position. Negating it is safe, unlike `i32::MIN`.
pub const INFINITY: i32 = 1_000_000;

/// Number of consecutive quiet half-moves each side must make before the game is drawn.
pub const NO_PROGRESS_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Normal,
    Check,
    Checkmate(Color), // Color is the winner
    Stalemate,
    Draw(DrawReason),
}

impl GameState {
    pub fn is_over(&self) -> bool {
        matches!(self, GameState::Checkmate(_) | GameState::Stalemate | GameState::Draw(_))
    }
}

pub struct Evaluator {
    move_generator: MoveGenerator,
    /// Penalty for being in check.
    pub check_penalty: i32,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            move_generator: MoveGenerator::new(),
            check_penalty: 500,
        }
    }

    pub fn in_check(&self, board: &Board, color: Color) -> bool {
        self.move_generator.is_king_in_check(board, color)
    }

    /// `color` is in check and has no move that gets it out.
    pub fn checkmate(&self, board: &Board, color: Color) -> bool {
        if !self.in_check(board, color) {
            return false;
        }
        let mut position = *board;
        position.side_to_move = color;
        !self.move_generator.has_legal_move(&position)
    }

    /// The side to move is not in check but has no legal move.
    pub fn stalemate(&self, board: &Board) -> bool {
        !self.in_check(board, board.side_to_move) && !self.move_generator.has_legal_move(board)
    }

    pub fn draw(&self, board: &Board) -> Option<DrawReason> {
        if self.stalemate(board) {
            return Some(DrawReason::Stalemate);
        }
        if self.insufficient_material(board) {
            return Some(DrawReason::InsufficientMaterial);
        }
        if board.no_progress_count(Color::White) >= NO_PROGRESS_LIMIT
            && board.no_progress_count(Color::Black) >= NO_PROGRESS_LIMIT
        {
            return Some(DrawReason::FiftyMoveRule);
        }
        None
    }

    /// No rook, queen or pawn is left, and the knights and bishops of both
    /// sides together are fewer than two knights alone or two bishops alone.
    fn insufficient_material(&self, board: &Board) -> bool {
        let mut knights = 0;
        let mut bishops = 0;
        for (_, p) in board.pieces() {
            match p.piece {
                Piece::Pawn | Piece::Rook | Piece::Queen => return false,
                Piece::Knight => knights += 1,
                Piece::Bishop => bishops += 1,
                Piece::King => {}
            }
        }
        (knights < 2 && bishops == 0) || (bishops < 2 && knights == 0)
    }

    /// Total material value of `color`'s pieces.
    pub fn material(&self, board: &Board, color: Color) -> i32 {
        board.pieces_of(color).map(|(_, p)| p.piece.value()).sum()
    }

    /// Static score of the position for `color`.
    pub fn evaluate(&self, board: &Board, color: Color) -> i32 {
        if self.checkmate(board, color) {
            return -INFINITY;
        }
        if self.draw(board).is_some() {
            return 0;
        }
        let score = self.material(board, color) - self.material(board, color.opposite());
        if self.in_check(board, color) {
            score - self.check_penalty
        } else {
            score
        }
    }

    pub fn get_game_state(&self, board: &Board) -> GameState {
        let side = board.side_to_move;
        if self.checkmate(board, side) {
            return GameState::Checkmate(side.opposite());
        }
        match self.draw(board) {
            Some(DrawReason::Stalemate) => GameState::Stalemate,
            Some(reason) => GameState::Draw(reason),
            None if self.in_check(board, side) => GameState::Check,
            None => GameState::Normal,
        }
    }
}
