use super::{FeatureType, IncrementalFeature, IndexList, RefreshTrigger};
use crate::chess::{
    bitboard::{self, bishop_attacks, knight_attacks, rook_attacks},
    Board, Color, PieceType, Snapshot,
};

const PIECE_TYPES: [PieceType; 4] = [PieceType::Knight, PieceType::Bishop, PieceType::Rook, PieceType::Queen];
const MAX_PIECES: usize = 2;
/// Counts run `0..=28`, where `0` marks a missing piece.
const MAX_COUNT: usize = 29;

/// Mobility of the first two knights, bishops, rooks and queens of the perspective.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Mobility;

impl Mobility {
    pub const DIMENSIONS: usize = PIECE_TYPES.len() * MAX_PIECES * MAX_COUNT;

    #[inline]
    fn make_index(entry: usize, count: u8) -> usize {
        entry * MAX_COUNT + usize::from(count)
    }

    fn mobility_area(board: &Board, perspective: Color) -> u64 {
        let occ = board.occupied();
        let pawns = board.piece_bb(PieceType::Pawn, perspective);
        let low_ranks = match perspective {
            Color::White => bitboard::rank_bb(1) | bitboard::rank_bb(2),
            Color::Black => bitboard::rank_bb(6) | bitboard::rank_bb(5),
        };

        let blocked_or_low = pawns & (bitboard::forward(occ, !perspective) | low_ranks);
        let king_queen = board.piece_bb(PieceType::King, perspective) | board.piece_bb(PieceType::Queen, perspective);
        let enemy_pawn_attacks = bitboard::pawn_attacks_bb(board.piece_bb(PieceType::Pawn, !perspective), !perspective);

        !(blocked_or_low | king_queen | board.blockers_for_king(perspective) | enemy_pawn_attacks)
    }

    /// Counts for one perspective, `[type * 2 + n]`.
    fn compute(board: &Board, perspective: Color) -> [u8; 8] {
        let area = Self::mobility_area(board, perspective);
        let occ = board.occupied();
        let queens = board.kind_bb(PieceType::Queen);
        let own_rooks = board.piece_bb(PieceType::Rook, perspective);

        let mut counts = [0; 8];
        for (i, &kind) in PIECE_TYPES.iter().enumerate() {
            let mut squares: Vec<_> = bitboard::squares(board.piece_bb(kind, perspective)).collect();
            squares.sort_by_key(|sq| sq.orient(perspective));

            for (n, &sq) in squares.iter().take(MAX_PIECES).enumerate() {
                let attacks = match kind {
                    PieceType::Knight => knight_attacks(sq),
                    PieceType::Bishop => bishop_attacks(sq, occ ^ queens),
                    PieceType::Rook => rook_attacks(sq, occ ^ queens ^ own_rooks),
                    _ => bishop_attacks(sq, occ) | rook_attacks(sq, occ),
                };

                counts[i * MAX_PIECES + n] = (attacks & area).count_ones() as u8 + 1;
            }
        }

        counts
    }

    fn counts(snap: &Snapshot, perspective: Color) -> [u8; 8] {
        snap.mobility_cache().get_or_init(|| [Self::compute(snap.board(), Color::White), Self::compute(snap.board(), Color::Black)])
            [perspective.index()]
    }
}

impl FeatureType for Mobility {
    fn name(&self) -> String {
        "Mobility".to_string()
    }

    fn hash(&self) -> u32 {
        0x6292_4F91
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }

    fn max_active(&self) -> usize {
        PIECE_TYPES.len() * MAX_PIECES
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::Never
    }

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        for (entry, &count) in Self::counts(snap, perspective).iter().enumerate() {
            active.push(Self::make_index(entry, count));
        }
    }
}

impl IncrementalFeature for Mobility {
    fn append_changed(&self, prev: &Snapshot, cur: &Snapshot, perspective: Color, removed: &mut IndexList, added: &mut IndexList) {
        let before = Self::counts(prev, perspective);
        let after = Self::counts(cur, perspective);

        for (entry, (&old, &new)) in before.iter().zip(after.iter()).enumerate() {
            if old != new {
                removed.push(Self::make_index(entry, old));
                added.push(Self::make_index(entry, new));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chess::Position,
        features::test_util::{active, check_diff},
    };

    #[test]
    fn startpos_counts() {
        let pos = Position::startpos();
        let counts = Mobility::counts(pos.current(), Color::White);

        // pawns on their home rank are outside the area, minor pieces are not
        assert_eq!(counts, [3, 3, 1, 1, 2, 2, 2, 0]);
        assert_eq!(Mobility::counts(pos.current(), Color::Black), counts);
        assert_eq!(active(&Mobility, &pos, Color::White).len(), 8);
    }

    #[test]
    fn pinned_piece_is_outside_the_area() {
        let pos = Position::from_fen("4k3/8/8/8/1b6/8/3N4/3RK3 w - - 0 1").unwrap();
        let counts = Mobility::counts(pos.current(), Color::White);
        assert_eq!(counts[0], 7);
        assert_eq!(counts[1], 0);
        // the rook sees a1, b1 and c1 but not the pinned knight or its king
        assert_eq!(counts[4], 4);
    }

    #[test]
    fn diff() {
        let mut pos = Position::startpos();
        for uci in ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5c6", "d7c6", "e1g1", "d8d3"] {
            pos.make_uci(uci).unwrap();
            check_diff(&Mobility, &pos);
        }
    }
}
