use super::{
    bitboard::{self, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks},
    movegen::Move,
    types::{castling, Color, Piece, PieceType, Square},
};

/// A single physical piece changing placement, `None` meaning off the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PieceChange {
    pub from: Option<(Piece, Square)>,
    pub to: Option<(Piece, Square)>,
}

/// The placement changes caused by one move, at most two pieces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Changes {
    list: [PieceChange; 2],
    len: usize,
}

impl Changes {
    fn push(&mut self, change: PieceChange) {
        assert!(self.len < 2, "A move changes at most two pieces!");
        self.list[self.len] = change;
        self.len += 1;
    }

    pub fn as_slice(&self) -> &[PieceChange] {
        &self.list[..self.len]
    }
}

const CASTLING_MASK: [u8; 64] = {
    let mut mask = [castling::ALL; 64];
    mask[0] &= !castling::WHITE_OOO;
    mask[4] &= !(castling::WHITE_OO | castling::WHITE_OOO);
    mask[7] &= !castling::WHITE_OO;
    mask[56] &= !castling::BLACK_OOO;
    mask[60] &= !(castling::BLACK_OO | castling::BLACK_OOO);
    mask[63] &= !castling::BLACK_OO;
    mask
};

/// Plain board state without any feature bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Board {
    mailbox: [Option<Piece>; 64],
    colors: [u64; 2],
    pieces: [u64; 6],
    stm: Color,
    castling: u8,
    ep: Option<Square>,
    halfmove: u16,
    ply: u16,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            mailbox: [None; 64],
            colors: [0; 2],
            pieces: [0; 6],
            stm: Color::White,
            castling: 0,
            ep: None,
            halfmove: 0,
            ply: 0,
        }
    }
}

impl Board {
    pub(crate) fn set_state(&mut self, stm: Color, castling: u8, ep: Option<Square>, halfmove: u16, ply: u16) {
        self.stm = stm;
        self.castling = castling;
        self.ep = ep;
        self.halfmove = halfmove;
        self.ply = ply;
    }

    pub(crate) fn put(&mut self, piece: Piece, sq: Square) {
        debug_assert!(self.mailbox[sq.index()].is_none());
        self.mailbox[sq.index()] = Some(piece);
        self.colors[piece.color.index()] |= sq.bb();
        self.pieces[piece.kind.index()] |= sq.bb();
    }

    pub(crate) fn remove(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.mailbox[sq.index()].take()?;
        self.colors[piece.color.index()] &= !sq.bb();
        self.pieces[piece.kind.index()] &= !sq.bb();
        Some(piece)
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.mailbox[sq.index()]
    }

    #[inline]
    pub fn occupied(&self) -> u64 {
        self.colors[0] | self.colors[1]
    }

    #[inline]
    pub fn color_bb(&self, color: Color) -> u64 {
        self.colors[color.index()]
    }

    #[inline]
    pub fn kind_bb(&self, kind: PieceType) -> u64 {
        self.pieces[kind.index()]
    }

    #[inline]
    pub fn piece_bb(&self, kind: PieceType, color: Color) -> u64 {
        self.pieces[kind.index()] & self.colors[color.index()]
    }

    pub fn king_sq(&self, color: Color) -> Square {
        let bb = self.piece_bb(PieceType::King, color);
        debug_assert_eq!(bb.count_ones(), 1);
        Square::from_index(bb.trailing_zeros() as usize & 63)
    }

    #[inline]
    pub fn stm(&self) -> Color {
        self.stm
    }

    #[inline]
    pub fn castling(&self) -> u8 {
        self.castling
    }

    #[inline]
    pub fn ep(&self) -> Option<Square> {
        self.ep
    }

    #[inline]
    pub fn halfmove(&self) -> u16 {
        self.halfmove
    }

    /// Number of half moves since the start of the game.
    #[inline]
    pub fn ply(&self) -> u16 {
        self.ply
    }

    /// Number of pieces on the board, kings included.
    #[inline]
    pub fn piece_count(&self) -> u32 {
        self.occupied().count_ones()
    }

    pub fn attackers_to(&self, sq: Square, occ: u64) -> u64 {
        let diag = self.kind_bb(PieceType::Bishop) | self.kind_bb(PieceType::Queen);
        let orth = self.kind_bb(PieceType::Rook) | self.kind_bb(PieceType::Queen);

        (pawn_attacks(sq, Color::White) & self.piece_bb(PieceType::Pawn, Color::Black))
            | (pawn_attacks(sq, Color::Black) & self.piece_bb(PieceType::Pawn, Color::White))
            | (knight_attacks(sq) & self.kind_bb(PieceType::Knight))
            | (bishop_attacks(sq, occ) & diag)
            | (rook_attacks(sq, occ) & orth)
            | (king_attacks(sq) & self.kind_bb(PieceType::King))
    }

    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        self.attackers_to(sq, self.occupied()) & self.color_bb(by) != 0
    }

    pub fn in_check(&self) -> bool {
        self.is_attacked(self.king_sq(self.stm), !self.stm)
    }

    /// Squares attacked by each piece type of `color`.
    pub fn attacks_by_type(&self, color: Color) -> [u64; 6] {
        let occ = self.occupied();
        let mut attacks = [0; 6];

        attacks[0] = bitboard::pawn_attacks_bb(self.piece_bb(PieceType::Pawn, color), color);

        for sq in bitboard::squares(self.piece_bb(PieceType::Knight, color)) {
            attacks[1] |= knight_attacks(sq);
        }

        for sq in bitboard::squares(self.piece_bb(PieceType::Bishop, color)) {
            attacks[2] |= bishop_attacks(sq, occ);
        }

        for sq in bitboard::squares(self.piece_bb(PieceType::Rook, color)) {
            attacks[3] |= rook_attacks(sq, occ);
        }

        for sq in bitboard::squares(self.piece_bb(PieceType::Queen, color)) {
            attacks[4] |= bishop_attacks(sq, occ) | rook_attacks(sq, occ);
        }

        attacks[5] = king_attacks(self.king_sq(color));

        attacks
    }

    /// Pieces of either colour that are the only blocker between `color`'s king and an enemy slider.
    pub fn blockers_for_king(&self, color: Color) -> u64 {
        let ksq = self.king_sq(color);
        let enemy = self.color_bb(!color);
        let queens = self.kind_bb(PieceType::Queen);

        let snipers = ((rook_attacks(ksq, 0) & (self.kind_bb(PieceType::Rook) | queens))
            | (bishop_attacks(ksq, 0) & (self.kind_bb(PieceType::Bishop) | queens)))
            & enemy;

        let occ = self.occupied() ^ snipers;
        let mut blockers = 0;
        for sniper in bitboard::squares(snipers) {
            let between = bitboard::between(ksq, sniper) & occ;
            if between.count_ones() == 1 {
                blockers |= between;
            }
        }

        blockers
    }

    /// Plays a move assumed to be pseudo-legal, returning the placement changes.
    pub fn apply(&mut self, mv: Move) -> Changes {
        let mut changes = Changes::default();
        let stm = self.stm;

        let Some(piece) = self.piece_on(mv.from) else {
            panic!("No piece on {}!", mv.from);
        };
        debug_assert_eq!(piece.color, stm);

        let mut captured_sq = self.piece_on(mv.to).map(|_| mv.to);
        if piece.kind == PieceType::Pawn && Some(mv.to) == self.ep {
            captured_sq = mv.to.offset(0, if stm == Color::White { -1 } else { 1 });
        }

        if let Some(sq) = captured_sq {
            if let Some(captured) = self.remove(sq) {
                changes.push(PieceChange { from: Some((captured, sq)), to: None });
            }
        }

        self.remove(mv.from);
        let placed = match mv.promotion {
            Some(kind) => Piece::new(kind, stm),
            None => piece,
        };
        self.put(placed, mv.to);
        changes.push(PieceChange { from: Some((piece, mv.from)), to: Some((placed, mv.to)) });

        if piece.kind == PieceType::King && mv.from.file().abs_diff(mv.to.file()) == 2 {
            let rank = mv.from.rank();
            let (rook_from, rook_to) =
                if mv.to.file() == 6 { (Square::new(7, rank), Square::new(5, rank)) } else { (Square::new(0, rank), Square::new(3, rank)) };

            if let Some(rook) = self.remove(rook_from) {
                self.put(rook, rook_to);
                changes.push(PieceChange { from: Some((rook, rook_from)), to: Some((rook, rook_to)) });
            }
        }

        self.ep = None;
        if piece.kind == PieceType::Pawn && mv.from.rank().abs_diff(mv.to.rank()) == 2 {
            self.ep = Some(Square::new(mv.from.file(), (mv.from.rank() + mv.to.rank()) / 2));
        }

        if piece.kind == PieceType::Pawn || captured_sq.is_some() {
            self.halfmove = 0;
        } else {
            self.halfmove += 1;
        }

        self.castling &= CASTLING_MASK[mv.from.index()] & CASTLING_MASK[mv.to.index()];
        self.stm = !stm;
        self.ply += 1;

        changes
    }

    /// Passes the turn without moving a piece.
    pub fn apply_null(&mut self) {
        self.ep = None;
        self.halfmove += 1;
        self.stm = !self.stm;
        self.ply += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::types::sq;

    fn start() -> Board {
        crate::chess::fen::parse_board(crate::chess::fen::STARTPOS).unwrap()
    }

    #[test]
    fn start_position_counts() {
        let board = start();
        assert_eq!(board.piece_count(), 32);
        assert_eq!(board.king_sq(Color::White), sq::E1);
        assert_eq!(board.king_sq(Color::Black), sq::E8);
        assert_eq!(board.castling(), castling::ALL);
        assert!(!board.in_check());
    }

    #[test]
    fn double_push_sets_ep() {
        let mut board = start();
        let changes = board.apply("e2e4".parse().unwrap());
        assert_eq!(changes.as_slice().len(), 1);
        assert_eq!(board.ep(), Some("e3".parse().unwrap()));
        assert_eq!(board.stm(), Color::Black);
        assert_eq!(board.ply(), 1);
    }

    #[test]
    fn castling_moves_rook() {
        let mut board = crate::chess::fen::parse_board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let changes = board.apply("e1g1".parse().unwrap());
        assert_eq!(changes.as_slice().len(), 2);
        assert_eq!(board.piece_on(sq::F1), Some(Piece::new(PieceType::Rook, Color::White)));
        assert_eq!(board.castling(), castling::BLACK_OO | castling::BLACK_OOO);
    }

    #[test]
    fn pinned_pieces_are_blockers() {
        let board = crate::chess::fen::parse_board("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        assert_eq!(board.blockers_for_king(Color::White), sq::E2.bb());
        assert_eq!(board.blockers_for_king(Color::Black), 0);
    }
}
