use crate::board::{Board, Square};
use crate::evaluation::{Evaluator, GameState};
use crate::movegen::{Move, MoveError, MoveGenerator};
use crate::search::Opponent;

/// A live game: the board plus everything a front end needs to drive it.
pub struct Game {
    board: Board,
    move_generator: MoveGenerator,
    evaluator: Evaluator,
    opponent: Opponent,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::from_board(Board::new())
    }

    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            move_generator: MoveGenerator::new(),
            evaluator: Evaluator::new(),
            opponent: Opponent::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn opponent_mut(&mut self) -> &mut Opponent {
        &mut self.opponent
    }

    /// Validates and plays a move for the side to move. On failure the board is untouched.
    pub fn apply_user_move(&mut self, from: Square, to: Square) -> Result<Move, MoveError> {
        let kind = self.move_generator.check_move(&self.board, from, to)?;
        let mv = Move::new(from, to, kind);
        self.board.make_move(mv);
        Ok(mv)
    }

    pub fn legal_destinations(&self, square: Square) -> Vec<Square> {
        self.move_generator.legal_destinations(&self.board, square)
    }

    pub fn status(&self) -> GameState {
        self.evaluator.get_game_state(&self.board)
    }

    /// Lets the built-in opponent play for the side to move.
    pub fn opponent_move(&mut self) -> Option<Move> {
        self.opponent.make_move(&mut self.board)
    }
}
