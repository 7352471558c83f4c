//! Interop with bullet's packed training positions.
//!
//! A [`ChessBoard`] is stored from the side to move's point of view, so a
//! position read back from one always has white to move, no castling rights
//! and no move history.

use std::{fs, mem::MaybeUninit, path::Path, slice};

use bulletformat::{BulletFormat, ChessBoard};

use crate::{
    chess::{Board, Color, Piece, PieceType, Position, Square},
    error::{DataError, FenError},
    feature_set::FeatureSet,
    features::IndexList,
};

/// Packs the current board of `pos`, with `score` and `result` given from white's side.
pub fn to_chess_board(pos: &Position, score: i16, result: f32) -> Result<ChessBoard, FenError> {
    let board = pos.board();

    let mut bbs = [0; 8];
    bbs[0] = board.color_bb(Color::White);
    bbs[1] = board.color_bb(Color::Black);
    for kind in PieceType::ALL {
        bbs[2 + kind.index()] = board.kind_bb(kind);
    }

    ChessBoard::from_raw(bbs, board.stm().index(), score, result).map_err(FenError::Convert)
}

pub fn position_from_chess_board(packed: &ChessBoard) -> Result<Position, FenError> {
    let mut board = Board::default();

    for (piece, square) in packed.into_iter() {
        let color = if piece & 8 > 0 { Color::Black } else { Color::White };
        let kind = PieceType::ALL
            .get(usize::from(piece & 7))
            .copied()
            .ok_or_else(|| FenError::Convert(format!("invalid piece {piece}")))?;

        board.put(Piece::new(kind, color), Square::from_index(usize::from(square)));
    }

    for color in Color::ALL {
        if board.piece_bb(PieceType::King, color).count_ones() != 1 {
            return Err(FenError::Kings);
        }
    }

    board.set_state(Color::White, 0, None, 0, 0);
    Position::from_board(board)
}

/// Active sets of a packed position, side to move first.
pub fn training_inputs(set: &FeatureSet, packed: &ChessBoard) -> Result<[IndexList; 2], FenError> {
    let pos = position_from_chess_board(packed)?;
    let snap = pos.current();
    Ok([set.active(snap, Color::White), set.active(snap, Color::Black)])
}

/// Score and game result of a packed position from the side to move.
pub fn targets(packed: &ChessBoard) -> (i16, f32) {
    (packed.score(), packed.result())
}

/// Reads a file of packed positions as written by [`write_chess_boards`].
pub fn read_chess_boards(path: impl AsRef<Path>) -> Result<Vec<ChessBoard>, DataError> {
    let bytes = fs::read(path)?;
    let size = size_of::<ChessBoard>();

    if bytes.len() % size != 0 {
        return Err(DataError::Size { len: bytes.len(), size });
    }

    let mut boards = zeroed_boxed_slice(bytes.len() / size);

    // any bit pattern is a valid `ChessBoard`
    unsafe { slice::from_raw_parts_mut(boards.as_mut_ptr().cast::<u8>(), bytes.len()) }.copy_from_slice(&bytes);

    Ok(boards.into_vec())
}

pub fn write_chess_boards(path: impl AsRef<Path>, boards: &[ChessBoard]) -> Result<(), DataError> {
    let len = std::mem::size_of_val(boards);
    let bytes = unsafe { slice::from_raw_parts(boards.as_ptr().cast::<u8>(), len) };
    fs::write(path, bytes)?;
    Ok(())
}

fn zeroed_boxed_slice(cap: usize) -> Box<[ChessBoard]> {
    let mut buf = Box::<[ChessBoard]>::new_uninit_slice(cap);

    for elem in buf.iter_mut() {
        let bytes: &mut [MaybeUninit<u8>] =
            unsafe { slice::from_raw_parts_mut(elem.as_mut_ptr().cast(), size_of::<ChessBoard>()) };

        for byte in bytes {
            byte.write(0);
        }
    }

    unsafe { buf.assume_init() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch;

    #[test]
    fn round_trip_white_to_move() {
        let pos = Position::startpos();
        let packed = to_chess_board(&pos, 35, 1.0).unwrap();
        let back = position_from_chess_board(&packed).unwrap();

        assert_eq!(back.fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1");
        assert_eq!(targets(&packed), (35, 1.0));
    }

    #[test]
    fn black_to_move_is_flipped() {
        let mut pos = Position::startpos();
        pos.make_uci("e2e4").unwrap();

        let packed = to_chess_board(&pos, 20, 0.0).unwrap();
        let back = position_from_chess_board(&packed).unwrap();

        // black is now at the bottom as white
        assert_eq!(back.fen(), "rnbqkbnr/pppp1ppp/8/4p3/8/8/PPPPPPPP/RNBQKBNR w - - 0 1");
        assert_eq!(targets(&packed), (-20, 1.0));
    }

    #[test]
    fn inputs_are_seen_from_the_side_to_move() {
        let set = arch::halfkp_kk_pp();
        let mut pos = Position::startpos();
        pos.make_uci("g1f3").unwrap();

        let packed = to_chess_board(&pos, 0, 0.5).unwrap();
        let [stm, nstm] = training_inputs(&set, &packed).unwrap();
        let kk = set.offsets()[1];

        assert_eq!(stm.len(), 30 + 1 + 435);
        assert_eq!(nstm.len(), 30 + 1 + 435);
        // black's king sits on e1 of the packed board
        assert!(stm.iter().any(|&idx| idx == kk + 4 * 64 + 60));
        assert!(nstm.iter().any(|&idx| idx == kk + 3 * 64 + 59));
    }

    #[test]
    fn packed_file_round_trip() {
        let mut pos = Position::startpos();
        let mut boards = vec![to_chess_board(&pos, 10, 0.5).unwrap()];
        for uci in ["d2d4", "g8f6", "c2c4"] {
            pos.make_uci(uci).unwrap();
            boards.push(to_chess_board(&pos, -15, 0.0).unwrap());
        }

        let path = std::env::temp_dir().join(format!("nnue-features-{}.bin", std::process::id()));
        write_chess_boards(&path, &boards).unwrap();
        let back = read_chess_boards(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(back.len(), 4);
        assert_eq!(targets(&back[0]), (10, 0.5));
        assert_eq!(targets(&back[1]), (15, 1.0));
        assert_eq!(targets(&back[2]), (-15, 0.0));
        for (a, b) in boards.iter().zip(&back) {
            assert_eq!(position_from_chess_board(a).unwrap().fen(), position_from_chess_board(b).unwrap().fen());
        }
    }

    #[test]
    fn truncated_file_is_rejected() {
        let path = std::env::temp_dir().join(format!("nnue-features-short-{}.bin", std::process::id()));
        std::fs::write(&path, [0u8; 7]).unwrap();
        let result = read_chess_boards(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(DataError::Size { len: 7, .. })));
    }
}
