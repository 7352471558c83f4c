use super::{
    board::Board,
    types::{castling, Color, Piece, PieceType, Square},
};
use crate::error::FenError;

pub const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parses a FEN string. The halfmove and fullmove counters are optional.
pub fn parse_board(fen: &str) -> Result<Board, FenError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(FenError::MissingFields(fields.len()));
    }

    let mut board = Board::default();

    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::Placement(fields[0].to_string()));
    }

    for (i, row) in ranks.iter().enumerate() {
        let rank = 7 - i;
        let mut file = 0;
        for ch in row.chars() {
            if let Some(skip) = ch.to_digit(10) {
                file += skip as usize;
                continue;
            }

            let piece = Piece::from_char(ch).ok_or_else(|| FenError::Placement(fields[0].to_string()))?;
            if file > 7 {
                return Err(FenError::Placement(fields[0].to_string()));
            }

            board.put(piece, Square::new(file, rank));
            file += 1;
        }

        if file != 8 {
            return Err(FenError::Placement(fields[0].to_string()));
        }
    }

    let stm = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(FenError::SideToMove(other.to_string())),
    };

    let mut rights = 0;
    if fields[2] != "-" {
        for ch in fields[2].chars() {
            rights |= match ch {
                'K' => castling::WHITE_OO,
                'Q' => castling::WHITE_OOO,
                'k' => castling::BLACK_OO,
                'q' => castling::BLACK_OOO,
                _ => return Err(FenError::Castling(fields[2].to_string())),
            };
        }
    }

    let ep = match fields[3] {
        "-" => None,
        sq => Some(sq.parse::<Square>().map_err(|_| FenError::EnPassant(sq.to_string()))?),
    };

    let counter = |idx: usize, default: u16| -> Result<u16, FenError> {
        fields.get(idx).map_or(Ok(default), |s| s.parse().map_err(|_| FenError::Counter(s.to_string())))
    };

    let halfmove = counter(4, 0)?;
    let fullmove = counter(5, 1)?.max(1);
    let ply = (fullmove - 1).saturating_mul(2).saturating_add(u16::from(stm == Color::Black));

    for color in Color::ALL {
        if board.piece_bb(PieceType::King, color).count_ones() != 1 {
            return Err(FenError::Kings);
        }
    }

    // rights without the king and rook on their home squares are dropped
    for (bit, king, rook) in [(castling::WHITE_OO, 4, 7), (castling::WHITE_OOO, 4, 0), (castling::BLACK_OO, 60, 63), (castling::BLACK_OOO, 60, 56)] {
        let color = if bit < castling::BLACK_OO { Color::White } else { Color::Black };
        let home = |sq: usize, kind| board.piece_on(Square::from_index(sq)) == Some(Piece::new(kind, color));
        if !home(king, PieceType::King) || !home(rook, PieceType::Rook) {
            rights &= !bit;
        }
    }

    board.set_state(stm, rights, ep, halfmove, ply);

    Ok(board)
}

pub fn to_fen(board: &Board) -> String {
    let mut placement = String::new();
    for rank in (0..8).rev() {
        let mut empty = 0;
        for file in 0..8 {
            match board.piece_on(Square::new(file, rank)) {
                Some(piece) => {
                    if empty > 0 {
                        placement.push_str(&empty.to_string());
                        empty = 0;
                    }
                    placement.push(piece.to_char());
                }
                None => empty += 1,
            }
        }

        if empty > 0 {
            placement.push_str(&empty.to_string());
        }

        if rank > 0 {
            placement.push('/');
        }
    }

    let stm = if board.stm() == Color::White { "w" } else { "b" };

    let mut rights: String = [
        (castling::WHITE_OO, 'K'),
        (castling::WHITE_OOO, 'Q'),
        (castling::BLACK_OO, 'k'),
        (castling::BLACK_OOO, 'q'),
    ]
    .iter()
    .filter(|(bit, _)| board.castling() & bit != 0)
    .map(|&(_, ch)| ch)
    .collect();

    if rights.is_empty() {
        rights.push('-');
    }

    let ep = board.ep().map_or("-".to_string(), |sq| sq.to_string());
    let fullmove = board.ply() / 2 + 1;

    format!("{placement} {stm} {rights} {ep} {} {fullmove}", board.halfmove())
}
