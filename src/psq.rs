//! Perspective-relative piece-square codes.
//!
//! Every piece gets a code in `1..769`, laid out as blocks of 64 squares:
//! friend pawn, enemy pawn, friend knight, ... enemy queen, then the kings.
//! Code `0` means "no piece". Squares are rotated by 180 degrees for black.

use crate::chess::{Color, Piece, PieceType, Square};

pub const PS_NONE: u16 = 0;

/// End of the non-king codes.
pub const PS_END: usize = 641;

/// End of all codes, kings included.
pub const PS_END2: usize = 769;

const KING_BASE: usize = PS_END;

/// Code of `piece` on `sq` seen from `perspective`.
#[inline]
pub const fn encode(piece: Piece, sq: Square, perspective: Color) -> u16 {
    let oriented = sq.orient(perspective).index();
    let enemy = (piece.color as usize) ^ (perspective as usize);

    let code = match piece.kind {
        PieceType::King => KING_BASE + 64 * enemy + oriented,
        kind => 1 + (2 * kind.index() + enemy) * 64 + oriented,
    };

    code as u16
}

/// Codes of a placement from both perspectives, `[white, black]`.
#[inline]
pub fn encode_pair(placement: Option<(Piece, Square)>) -> [u16; 2] {
    match placement {
        Some((piece, sq)) => [encode(piece, sq, Color::White), encode(piece, sq, Color::Black)],
        None => [PS_NONE; 2],
    }
}

/// Inverse of [`encode`], `None` for [`PS_NONE`].
pub fn decode(code: u16, perspective: Color) -> Option<(Piece, Square)> {
    let code = usize::from(code);
    debug_assert!(code < PS_END2, "Invalid piece-square code {code}!");

    if code == 0 {
        return None;
    }

    let (kind, enemy, oriented) = if code >= KING_BASE {
        let rel = code - KING_BASE;
        (PieceType::King, rel / 64, rel % 64)
    } else {
        let block = (code - 1) / 64;
        (PieceType::from_index(block / 2), block % 2, (code - 1) % 64)
    };

    let color = if enemy == 1 { !perspective } else { perspective };
    let sq = Square::from_index(oriented).orient(perspective);

    Some((Piece::new(kind, color), sq))
}

/// The kind of a non-king code, `0..10`, friend and enemy pieces kept apart.
#[inline]
pub const fn kind_of(code: u16) -> usize {
    (code as usize - 1) / 64
}

/// Oriented square of a code.
#[inline]
pub const fn square_of(code: u16) -> Square {
    Square::from_index((code as usize - 1) % 64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::types::sq;

    #[test]
    fn block_layout() {
        let wp = Piece::new(PieceType::Pawn, Color::White);
        let bq = Piece::new(PieceType::Queen, Color::Black);
        let wk = Piece::new(PieceType::King, Color::White);

        assert_eq!(encode(wp, sq::A1, Color::White), 1);
        assert_eq!(encode(wp, sq::A1, Color::Black), 65 + 63);
        assert_eq!(encode(bq, sq::D8, Color::White), 577 + 59);
        assert_eq!(encode(bq, sq::D8, Color::Black), 513 + 4);
        assert_eq!(encode(wk, sq::E1, Color::White), 641 + 4);
        assert_eq!(encode(wk, sq::E1, Color::Black), 705 + 59);
    }

    #[test]
    fn codes_are_unique_and_invertible() {
        for perspective in Color::ALL {
            let mut seen = vec![false; PS_END2];
            for color in Color::ALL {
                for kind in PieceType::ALL {
                    for sq in Square::iter() {
                        let piece = Piece::new(kind, color);
                        let code = encode(piece, sq, perspective);
                        assert!(code != PS_NONE);
                        assert!(!seen[usize::from(code)]);
                        seen[usize::from(code)] = true;
                        assert_eq!(decode(code, perspective), Some((piece, sq)));
                    }
                }
            }
            assert_eq!(seen.iter().filter(|&&x| x).count(), PS_END2 - 1);
        }

        assert_eq!(decode(PS_NONE, Color::White), None);
    }

    #[test]
    fn non_king_helpers() {
        let code = encode(Piece::new(PieceType::Rook, Color::Black), sq::H8, Color::White);
        assert_eq!(kind_of(code), 7);
        assert_eq!(square_of(code), sq::H8);
    }
}
