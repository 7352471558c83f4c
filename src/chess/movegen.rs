use std::{fmt, str::FromStr};

use super::{
    bitboard::{self, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks},
    board::Board,
    types::{castling, Color, PieceType, Square},
};
use crate::error::MoveError;

/// A move in from-to form. Castling is encoded as the king moving two squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl Move {
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to, promotion: None }
    }
}

impl FromStr for Move {
    type Err = MoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !(4..=5).contains(&s.len()) || !s.is_ascii() {
            return Err(MoveError::Parse(s.to_string()));
        }

        let from = s[0..2].parse().map_err(|_| MoveError::Parse(s.to_string()))?;
        let to = s[2..4].parse().map_err(|_| MoveError::Parse(s.to_string()))?;
        let promotion = match s.chars().nth(4) {
            None => None,
            Some(ch) => match PieceType::from_char(ch) {
                Some(kind @ (PieceType::Knight | PieceType::Bishop | PieceType::Rook | PieceType::Queen)) => Some(kind),
                _ => return Err(MoveError::Parse(s.to_string())),
            },
        };

        Ok(Self { from, to, promotion })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.to_char())?;
        }
        Ok(())
    }
}

const PROMOTIONS: [PieceType; 4] = [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight];

fn push_targets(moves: &mut Vec<Move>, from: Square, targets: u64) {
    moves.extend(bitboard::squares(targets).map(|to| Move::new(from, to)));
}

fn pseudo_legal(board: &Board) -> Vec<Move> {
    let stm = board.stm();
    let occ = board.occupied();
    let own = board.color_bb(stm);
    let enemy = board.color_bb(!stm);
    let mut moves = Vec::with_capacity(64);

    let promo_rank = if stm == Color::White { 7 } else { 0 };
    let start_rank = if stm == Color::White { 1 } else { 6 };
    let dir = if stm == Color::White { 1 } else { -1 };
    let ep_bb = board.ep().map_or(0, Square::bb);

    for from in bitboard::squares(board.piece_bb(PieceType::Pawn, stm)) {
        let mut targets = pawn_attacks(from, stm) & (enemy | ep_bb);
        if let Some(one) = from.offset(0, dir) {
            if occ & one.bb() == 0 {
                targets |= one.bb();
                if from.rank() == start_rank {
                    if let Some(two) = from.offset(0, 2 * dir) {
                        targets |= two.bb() & !occ;
                    }
                }
            }
        }

        for to in bitboard::squares(targets) {
            if to.rank() == promo_rank {
                moves.extend(PROMOTIONS.iter().map(|&kind| Move { from, to, promotion: Some(kind) }));
            } else {
                moves.push(Move::new(from, to));
            }
        }
    }

    for from in bitboard::squares(board.piece_bb(PieceType::Knight, stm)) {
        push_targets(&mut moves, from, knight_attacks(from) & !own);
    }

    for from in bitboard::squares(board.piece_bb(PieceType::Bishop, stm)) {
        push_targets(&mut moves, from, bishop_attacks(from, occ) & !own);
    }

    for from in bitboard::squares(board.piece_bb(PieceType::Rook, stm)) {
        push_targets(&mut moves, from, rook_attacks(from, occ) & !own);
    }

    for from in bitboard::squares(board.piece_bb(PieceType::Queen, stm)) {
        push_targets(&mut moves, from, (bishop_attacks(from, occ) | rook_attacks(from, occ)) & !own);
    }

    let ksq = board.king_sq(stm);
    push_targets(&mut moves, ksq, king_attacks(ksq) & !own);

    let (short, long) = match stm {
        Color::White => (castling::WHITE_OO, castling::WHITE_OOO),
        Color::Black => (castling::BLACK_OO, castling::BLACK_OOO),
    };

    let rank = ksq.rank();
    let rook = board.piece_bb(PieceType::Rook, stm);
    if ksq.file() == 4 && board.castling() & (short | long) != 0 && !board.in_check() {
        let safe = |file: usize| !board.is_attacked(Square::new(file, rank), !stm);

        let h = Square::new(7, rank);
        if board.castling() & short != 0
            && rook & h.bb() != 0
            && bitboard::between(ksq, h) & occ == 0
            && safe(5)
            && safe(6)
        {
            moves.push(Move::new(ksq, Square::new(6, rank)));
        }

        let a = Square::new(0, rank);
        if board.castling() & long != 0
            && rook & a.bb() != 0
            && bitboard::between(ksq, a) & occ == 0
            && safe(3)
            && safe(2)
        {
            moves.push(Move::new(ksq, Square::new(2, rank)));
        }
    }

    moves
}

/// Every legal move in the position.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let stm = board.stm();
    pseudo_legal(board)
        .into_iter()
        .filter(|&mv| {
            let mut next = *board;
            next.apply(mv);
            !next.is_attacked(next.king_sq(stm), !stm)
        })
        .collect()
}

/// Counts leaf nodes of the legal move tree to the given depth.
pub fn perft(board: &Board, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(board);
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .into_iter()
        .map(|mv| {
            let mut next = *board;
            next.apply(mv);
            perft(&next, depth - 1)
        })
        .sum()
}
