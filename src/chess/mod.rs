//! Minimal board layer: enough chess to drive feature extraction,
//! incremental updates and the property tests.

pub mod bitboard;
pub mod board;
pub mod fen;
pub mod movegen;
pub mod position;
pub mod types;

pub use board::{Board, PieceChange};
pub use movegen::{legal_moves, Move};
pub use position::{CodePair, DirtyEntry, DirtyPiece, Position, Snapshot};
pub use types::{Color, Piece, PieceType, Square};
