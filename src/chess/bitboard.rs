use super::types::{Color, Square};

pub const FILE_A: u64 = 0x0101_0101_0101_0101;
pub const FILE_H: u64 = FILE_A << 7;
pub const RANK_1: u64 = 0xFF;

pub const fn file_bb(file: usize) -> u64 {
    FILE_A << file
}

pub const fn rank_bb(rank: usize) -> u64 {
    RANK_1 << (8 * rank)
}

/// Shifts every square one rank towards the opponent of `color`.
#[inline]
pub const fn forward(bb: u64, color: Color) -> u64 {
    match color {
        Color::White => bb << 8,
        Color::Black => bb >> 8,
    }
}

#[inline]
pub const fn east(bb: u64) -> u64 {
    (bb & !FILE_H) << 1
}

#[inline]
pub const fn west(bb: u64) -> u64 {
    (bb & !FILE_A) >> 1
}

/// Squares attacked by a set of pawns of `color`.
#[inline]
pub const fn pawn_attacks_bb(pawns: u64, color: Color) -> u64 {
    let fwd = forward(pawns, color);
    east(fwd) | west(fwd)
}

/// Squares attacked twice by a set of pawns of `color`.
#[inline]
pub const fn pawn_double_attacks_bb(pawns: u64, color: Color) -> u64 {
    let fwd = forward(pawns, color);
    east(fwd) & west(fwd)
}

/// Fills every square in front of the set, as seen by `color`, excluding the set itself.
pub const fn forward_fill(bb: u64, color: Color) -> u64 {
    let mut fill = 0;
    let mut cur = forward(bb, color);
    while cur != 0 {
        fill |= cur;
        cur = forward(cur, color);
    }
    fill
}

pub const fn adjacent_files(sq: Square) -> u64 {
    let file = file_bb(sq.file());
    east(file) | west(file)
}

/// Ranks strictly in front of `sq` from `color`'s point of view.
pub const fn forward_ranks(sq: Square, color: Color) -> u64 {
    match color {
        Color::White => {
            if sq.rank() == 7 {
                0
            } else {
                !0 << (8 * (sq.rank() + 1))
            }
        }
        Color::Black => {
            if sq.rank() == 0 {
                0
            } else {
                !0 >> (8 * (8 - sq.rank()))
            }
        }
    }
}

pub const fn forward_file(sq: Square, color: Color) -> u64 {
    forward_ranks(sq, color) & file_bb(sq.file())
}

pub const fn pawn_attack_span(sq: Square, color: Color) -> u64 {
    forward_ranks(sq, color) & adjacent_files(sq)
}

pub const fn passed_pawn_span(sq: Square, color: Color) -> u64 {
    pawn_attack_span(sq, color) | forward_file(sq, color)
}

const fn leaper_table(deltas: &[(i32, i32)]) -> [u64; 64] {
    let mut table = [0; 64];
    let mut sq = 0;
    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut i = 0;
        while i < deltas.len() {
            let f = file + deltas[i].0;
            let r = rank + deltas[i].1;
            if f >= 0 && f < 8 && r >= 0 && r < 8 {
                table[sq] |= 1 << (r * 8 + f);
            }
            i += 1;
        }
        sq += 1;
    }
    table
}

const KNIGHT: [u64; 64] = leaper_table(&[(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)]);
const KING: [u64; 64] = leaper_table(&[(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)]);
const PAWN: [[u64; 64]; 2] = [leaper_table(&[(-1, 1), (1, 1)]), leaper_table(&[(-1, -1), (1, -1)])];

const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const fn ray_attacks(sq: usize, occ: u64, dirs: &[(i32, i32); 4]) -> u64 {
    let mut attacks = 0;
    let mut d = 0;
    while d < 4 {
        let mut f = (sq % 8) as i32 + dirs[d].0;
        let mut r = (sq / 8) as i32 + dirs[d].1;
        while f >= 0 && f < 8 && r >= 0 && r < 8 {
            let bit = 1u64 << (r * 8 + f);
            attacks |= bit;
            if occ & bit != 0 {
                break;
            }
            f += dirs[d].0;
            r += dirs[d].1;
        }
        d += 1;
    }
    attacks
}

#[inline]
pub fn knight_attacks(sq: Square) -> u64 {
    KNIGHT[sq.index()]
}

#[inline]
pub fn king_attacks(sq: Square) -> u64 {
    KING[sq.index()]
}

#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> u64 {
    PAWN[color.index()][sq.index()]
}

#[inline]
pub fn rook_attacks(sq: Square, occ: u64) -> u64 {
    ray_attacks(sq.index(), occ, &ORTHOGONAL)
}

#[inline]
pub fn bishop_attacks(sq: Square, occ: u64) -> u64 {
    ray_attacks(sq.index(), occ, &DIAGONAL)
}

#[inline]
pub fn queen_attacks(sq: Square, occ: u64) -> u64 {
    rook_attacks(sq, occ) | bishop_attacks(sq, occ)
}

/// Squares strictly between two aligned squares, empty otherwise.
pub fn between(a: Square, b: Square) -> u64 {
    let df = b.file() as i32 - a.file() as i32;
    let dr = b.rank() as i32 - a.rank() as i32;
    if (df, dr) == (0, 0) || (df != 0 && dr != 0 && df.abs() != dr.abs()) {
        return 0;
    }

    let (step_f, step_r) = (df.signum(), dr.signum());
    let mut bb = 0;
    let mut cur = a.offset(step_f, step_r);
    while let Some(sq) = cur {
        if sq == b {
            break;
        }
        bb |= sq.bb();
        cur = sq.offset(step_f, step_r);
    }
    bb
}

/// Iterates the squares of a bitboard from a1 towards h8.
pub struct Squares(u64);

impl Iterator for Squares {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }

        let sq = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(Square::from_index(sq))
    }
}

#[inline]
pub fn squares(bb: u64) -> Squares {
    Squares(bb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::types::sq;

    #[test]
    fn leapers() {
        assert_eq!(knight_attacks(sq::A1).count_ones(), 2);
        assert_eq!(knight_attacks(sq::E4).count_ones(), 8);
        assert_eq!(king_attacks(sq::H8).count_ones(), 3);
        assert_eq!(pawn_attacks(sq::E2, Color::White), (1 << 19) | (1 << 21));
        assert_eq!(pawn_attacks(sq::E7, Color::Black), (1 << 43) | (1 << 45));
    }

    #[test]
    fn sliders_stop_at_blockers() {
        let occ = sq::E4.bb() | sq::E7.bb();
        let attacks = rook_attacks(sq::E1, occ);
        assert!(attacks & sq::E4.bb() != 0);
        assert!(attacks & sq::E7.bb() == 0);
        assert_eq!(rook_attacks(sq::A1, 0).count_ones(), 14);
        assert_eq!(bishop_attacks(sq::A1, 0).count_ones(), 7);
        assert_eq!(queen_attacks(sq::E4, 0).count_ones(), 27);
    }

    #[test]
    fn lines_between() {
        assert_eq!(between(sq::E1, sq::E4).count_ones(), 2);
        assert_eq!(between(sq::A1, sq::H8).count_ones(), 6);
        assert_eq!(between(sq::A1, sq::E2), 0);
        assert_eq!(between(sq::E1, sq::E2), 0);
    }

    #[test]
    fn spans() {
        assert_eq!(forward_file(sq::E2, Color::White).count_ones(), 6);
        assert_eq!(forward_file(sq::E2, Color::Black).count_ones(), 1);
        assert_eq!(passed_pawn_span(sq::A1, Color::White).count_ones(), 14);
        assert_eq!(forward_ranks(sq::H8, Color::White), 0);
        assert_eq!(forward_ranks(sq::A1, Color::Black), 0);
        assert_eq!(forward_fill(sq::E2.bb(), Color::White), forward_file(sq::E2, Color::White));
        assert_eq!(squares(0b1010).collect::<Vec<_>>(), vec![Square::from_index(1), Square::from_index(3)]);
    }
}
