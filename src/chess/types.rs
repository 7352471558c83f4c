use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn flip(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    fn not(self) -> Self::Output {
        self.flip()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    pub const ALL: [PieceType; 6] =
        [PieceType::Pawn, PieceType::Knight, PieceType::Bishop, PieceType::Rook, PieceType::Queen, PieceType::King];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(idx: usize) -> PieceType {
        match idx {
            0 => PieceType::Pawn,
            1 => PieceType::Knight,
            2 => PieceType::Bishop,
            3 => PieceType::Rook,
            4 => PieceType::Queen,
            5 => PieceType::King,
            _ => panic!("Invalid piece type index!"),
        }
    }

    pub fn from_char(ch: char) -> Option<PieceType> {
        Some(match ch.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        })
    }

    pub const fn to_char(self) -> char {
        ['p', 'n', 'b', 'r', 'q', 'k'][self as usize]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceType, color: Color) -> Self {
        Self { kind, color }
    }

    pub fn from_char(ch: char) -> Option<Piece> {
        let kind = PieceType::from_char(ch)?;
        let color = if ch.is_ascii_uppercase() { Color::White } else { Color::Black };
        Some(Piece::new(kind, color))
    }

    pub fn to_char(self) -> char {
        let ch = self.kind.to_char();
        match self.color {
            Color::White => ch.to_ascii_uppercase(),
            Color::Black => ch,
        }
    }
}

/// A square on the 8x8 board, `a1 = 0`, `h8 = 63`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    pub const NUM: usize = 64;

    #[inline]
    pub const fn from_index(idx: usize) -> Square {
        assert!(idx < 64, "Square index out of range!");
        Square(idx as u8)
    }

    #[inline]
    pub const fn new(file: usize, rank: usize) -> Square {
        Square::from_index(rank * 8 + file)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn file(self) -> usize {
        (self.0 & 7) as usize
    }

    #[inline]
    pub const fn rank(self) -> usize {
        (self.0 >> 3) as usize
    }

    #[inline]
    pub const fn bb(self) -> u64 {
        1 << self.0
    }

    /// Rotates the board by 180 degrees.
    #[inline]
    pub const fn rotate(self) -> Square {
        Square(self.0 ^ 63)
    }

    /// The square as seen by `perspective`: unchanged for white, rotated for black.
    #[inline]
    pub const fn orient(self, perspective: Color) -> Square {
        match perspective {
            Color::White => self,
            Color::Black => self.rotate(),
        }
    }

    #[inline]
    pub const fn relative_rank(self, color: Color) -> usize {
        match color {
            Color::White => self.rank(),
            Color::Black => 7 - self.rank(),
        }
    }

    pub fn offset(self, files: i32, ranks: i32) -> Option<Square> {
        let file = self.file() as i32 + files;
        let rank = self.rank() as i32 + ranks;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square::new(file as usize, rank as usize))
        } else {
            None
        }
    }

    pub fn iter() -> impl Iterator<Item = Square> {
        (0..64).map(Square::from_index)
    }
}

impl std::str::FromStr for Square {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(format!("Invalid square: {s}"));
        }

        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file > 7 || rank > 7 {
            return Err(format!("Invalid square: {s}"));
        }

        Ok(Square::new(usize::from(file), usize::from(rank)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file() as u8) as char, self.rank() + 1)
    }
}

pub mod sq {
    use super::Square;

    pub const A1: Square = Square::from_index(0);
    pub const C1: Square = Square::from_index(2);
    pub const D1: Square = Square::from_index(3);
    pub const E1: Square = Square::from_index(4);
    pub const F1: Square = Square::from_index(5);
    pub const G1: Square = Square::from_index(6);
    pub const H1: Square = Square::from_index(7);
    pub const E2: Square = Square::from_index(12);
    pub const E4: Square = Square::from_index(28);
    pub const E7: Square = Square::from_index(52);
    pub const A8: Square = Square::from_index(56);
    pub const C8: Square = Square::from_index(58);
    pub const D8: Square = Square::from_index(59);
    pub const E8: Square = Square::from_index(60);
    pub const F8: Square = Square::from_index(61);
    pub const G8: Square = Square::from_index(62);
    pub const H8: Square = Square::from_index(63);
}

/// Castling rights bits.
pub mod castling {
    pub const WHITE_OO: u8 = 1;
    pub const WHITE_OOO: u8 = 2;
    pub const BLACK_OO: u8 = 4;
    pub const BLACK_OOO: u8 = 8;
    pub const ALL: u8 = 15;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_geometry() {
        let e2: Square = "e2".parse().unwrap();
        assert_eq!(e2, sq::E2);
        assert_eq!(e2.file(), 4);
        assert_eq!(e2.rank(), 1);
        assert_eq!(e2.rotate(), "d7".parse().unwrap());
        assert_eq!(e2.orient(Color::White), e2);
        assert_eq!(e2.relative_rank(Color::Black), 6);
        assert_eq!(e2.offset(4, 0), None);
        assert_eq!(e2.offset(-1, 2), Some("d4".parse().unwrap()));
        assert_eq!(e2.to_string(), "e2");
        assert!("i9".parse::<Square>().is_err());
    }

    #[test]
    fn piece_chars() {
        for ch in "PNBRQKpnbrqk".chars() {
            assert_eq!(Piece::from_char(ch).unwrap().to_char(), ch);
        }
        assert!(Piece::from_char('x').is_none());
    }
}
