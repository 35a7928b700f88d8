use std::fmt;
use thiserror::Error;
use crate::board::{Board, BoardPiece, Color, Piece, Square, DIAGONALS, ORTHOGONALS};

/// How an accepted move has to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    /// A pawn's two-square opening advance; the pawn becomes capturable en passant.
    DoubleStep,
    EnPassant,
    /// King onto one of its own rooks.
    Castle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
}

impl Move {
    pub fn new(from: Square, to: Square, kind: MoveKind) -> Self {
        Self { from, to, kind }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)?;
        match self.kind {
            MoveKind::Normal => Ok(()),
            MoveKind::DoubleStep => write!(f, " (double step)"),
            MoveKind::EnPassant => write!(f, " (en passant)"),
            MoveKind::Castle => write!(f, " (castle)"),
        }
    }
}

/// Why a proposed move was refused. The message is meant for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("there isn't a piece on the selected square")]
    EmptySource,
    #[error("the piece hasn't moved")]
    NoMovement,
    #[error("that piece belongs to your opponent")]
    OpponentsPiece,
    #[error("you can't capture your own piece")]
    OwnPieceCapture,
    #[error("not a valid castle")]
    InvalidCastle,
    #[error("a {0:?} can't move like that")]
    IllegalMovement(Piece),
    #[error("the king would be in check")]
    KingInCheck,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Whether `piece` on `from` could reach `to` under its own movement rule.
    ///
    /// Ownership of the destination and king safety are not considered here, so
    /// the same rule serves both move validation and attack detection.
    pub fn movement(&self, board: &Board, piece: BoardPiece, from: Square, to: Square) -> Option<MoveKind> {
        let dr = to.row as i32 - from.row as i32;
        let dc = to.col as i32 - from.col as i32;
        if dr == 0 && dc == 0 {
            return None;
        }

        let legal = match piece.piece {
            Piece::Pawn => return self.pawn_movement(board, piece, from, to),
            Piece::Knight => (dr.abs() == 2 && dc.abs() == 1) || (dr.abs() == 1 && dc.abs() == 2),
            Piece::Bishop => self.slides(board, from, dr, dc, &DIAGONALS),
            Piece::Rook => self.slides(board, from, dr, dc, &ORTHOGONALS),
            Piece::Queen => {
                self.slides(board, from, dr, dc, &ORTHOGONALS) || self.slides(board, from, dr, dc, &DIAGONALS)
            }
            Piece::King => dr.abs() <= 1 && dc.abs() <= 1,
        };
        legal.then_some(MoveKind::Normal)
    }

    // The destination must lie on one of `directions` no further than the first blocker.
    fn slides(&self, board: &Board, from: Square, dr: i32, dc: i32, directions: &[(i32, i32); 4]) -> bool {
        let distance = dr.abs().max(dc.abs());
        let dir = (dr.signum(), dc.signum());
        if (dr, dc) != (dir.0 * distance, dir.1 * distance) || !directions.contains(&dir) {
            return false;
        }
        distance as usize <= board.ray(from, dir).len
    }

    fn pawn_movement(&self, board: &Board, pawn: BoardPiece, from: Square, to: Square) -> Option<MoveKind> {
        let forward = pawn.color.forward();
        let dr = to.row as i32 - from.row as i32;
        let dc = to.col as i32 - from.col as i32;

        if dr == 2 * forward && dc == 0 {
            let between = from.offset(forward, 0)?;
            let clear = board.is_empty(between) && board.is_empty(to);
            return (pawn.unmoved && clear).then_some(MoveKind::DoubleStep);
        }
        if dr != forward {
            return None;
        }

        match dc.abs() {
            0 => board.is_empty(to).then_some(MoveKind::Normal),
            1 => match board.get(to) {
                Some(target) => (target.color != pawn.color).then_some(MoveKind::Normal),
                None => {
                    let beside = Square::new(from.row, to.col);
                    let capturable = board.en_passant == Some(beside)
                        && matches!(
                            board.get(beside),
                            Some(p) if p.piece == Piece::Pawn && p.color != pawn.color
                        );
                    capturable.then_some(MoveKind::EnPassant)
                }
            },
            _ => None,
        }
    }

    /// Validates a move for the side to move.
    pub fn check_move(&self, board: &Board, from: Square, to: Square) -> Result<MoveKind, MoveError> {
        let piece = board.get(from).ok_or(MoveError::EmptySource)?;
        if from == to {
            return Err(MoveError::NoMovement);
        }
        if piece.color != board.side_to_move {
            return Err(MoveError::OpponentsPiece);
        }
        if let Some(occupant) = board.get(to) {
            if occupant.color == piece.color {
                if piece.piece == Piece::King && occupant.piece == Piece::Rook {
                    return if self.castle(board, from, to) {
                        Ok(MoveKind::Castle)
                    } else {
                        Err(MoveError::InvalidCastle)
                    };
                }
                return Err(MoveError::OwnPieceCapture);
            }
        }

        let kind = self
            .movement(board, piece, from, to)
            .ok_or(MoveError::IllegalMovement(piece.piece))?;

        let mut scratch = *board;
        scratch.make_move(Move::new(from, to, kind));
        if self.is_king_in_check(&scratch, piece.color) {
            return Err(MoveError::KingInCheck);
        }
        Ok(kind)
    }

    /// Castling sub-protocol for a king on `king_sq` moving onto its own rook on `rook_sq`.
    pub fn castle(&self, board: &Board, king_sq: Square, rook_sq: Square) -> bool {
        let (Some(king), Some(rook)) = (board.get(king_sq), board.get(rook_sq)) else {
            return false;
        };
        if king.piece != Piece::King || rook.piece != Piece::Rook || king.color != rook.color {
            return false;
        }
        if !(king.unmoved && rook.unmoved) || king_sq.row != rook_sq.row {
            return false;
        }

        let step: i32 = if rook_sq.col < king_sq.col { -1 } else { 1 };
        let Some(landing) = king_sq.offset(0, 2 * step) else {
            return false;
        };
        let toward_rook = board.horizontal(king_sq)[if step < 0 { 2 } else { 3 }];
        if toward_rook.blocker != Some(rook_sq) {
            return false;
        }
        if self.is_king_in_check(board, king.color) {
            return false;
        }

        // Walk the king toward the rook one square at a time, ending no
        // earlier than its landing square.
        let mut path: Vec<Square> = (1..)
            .map_while(|i| king_sq.offset(0, i * step))
            .take_while(|&sq| sq != rook_sq)
            .collect();
        if !path.contains(&landing) {
            path.push(landing);
        }
        path.into_iter().all(|sq| {
            let mut scratch = *board;
            scratch.set(king_sq, None);
            scratch.set(sq, Some(king));
            !self.is_king_in_check(&scratch, king.color)
        })
    }

    /// Whether any piece of the other side could move onto `color`'s king.
    pub fn is_king_in_check(&self, board: &Board, color: Color) -> bool {
        let Some(king_square) = board.find_king(color) else {
            return false;
        };
        board
            .pieces_of(color.opposite())
            .any(|(sq, piece)| self.movement(board, piece, sq, king_square).is_some())
    }

    /// Every legal move for the side to move, piece by piece in row-major order.
    pub fn generate_moves(&self, board: &Board) -> Vec<Move> {
        board
            .pieces_of(board.side_to_move)
            .flat_map(|(from, _)| {
                Square::all().filter_map(move |to| {
                    self.check_move(board, from, to)
                        .ok()
                        .map(|kind| Move::new(from, to, kind))
                })
            })
            .collect()
    }

    /// Like `generate_moves(..).is_empty()` but stops at the first legal move.
    pub fn has_legal_move(&self, board: &Board) -> bool {
        board.pieces_of(board.side_to_move).any(|(from, _)| {
            Square::all().any(|to| self.check_move(board, from, to).is_ok())
        })
    }

    /// Squares the piece on `square` may legally move to. Castling shows up as the rook's square.
    pub fn legal_destinations(&self, board: &Board, square: Square) -> Vec<Square> {
        Square::all()
            .filter(|&to| self.check_move(board, square, to).is_ok())
            .collect()
    }
}
