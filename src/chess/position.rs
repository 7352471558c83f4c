use std::cell::OnceCell;

use super::{
    board::Board,
    fen,
    movegen::{self, Move},
    types::{Color, Piece, PieceType, Square},
};
use crate::{
    error::{FenError, MoveError},
    psq,
};

/// Number of piece slots, the last two are reserved for the kings.
pub const SLOTS: usize = 32;
pub const WHITE_KING_SLOT: u8 = 30;
pub const BLACK_KING_SLOT: u8 = 31;
pub const NON_KING_SLOTS: usize = 30;

/// Codes of one placement, indexed by perspective.
pub type CodePair = [u16; 2];

/// One changed slot in a [`DirtyPiece`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyEntry {
    pub slot: u8,
    pub old: CodePair,
    pub new: CodePair,
    pub from: Option<(Piece, Square)>,
    pub to: Option<(Piece, Square)>,
}

impl DirtyEntry {
    #[inline]
    pub fn is_king(&self) -> bool {
        self.slot >= WHITE_KING_SLOT
    }
}

/// Record of the slots changed by the move leading to a snapshot.
/// Any slot not listed kept its codes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyPiece {
    entries: [DirtyEntry; 2],
    len: u8,
}

impl DirtyPiece {
    fn push(&mut self, entry: DirtyEntry) {
        assert!(self.len < 2, "At most two slots change per move!");
        self.entries[usize::from(self.len)] = entry;
        self.len += 1;
    }

    #[inline]
    pub fn entries(&self) -> &[DirtyEntry] {
        &self.entries[..usize::from(self.len)]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn contains_slot(&self, slot: u8) -> bool {
        self.entries().iter().any(|entry| entry.slot == slot)
    }
}

/// Per-pawn structure flags from one perspective, ordered by oriented square.
pub type PawnFlags = [Option<u16>; 8];

/// One position in the game together with its slot tables and memoised derived data.
#[derive(Clone, Debug)]
pub struct Snapshot {
    board: Board,
    codes: [[u16; SLOTS]; 2],
    slot_on: [Option<u8>; 64],
    dirty: DirtyPiece,
    previous: Option<usize>,
    attacks: OnceCell<[[u64; 6]; 2]>,
    mobility: OnceCell<[[u8; 8]; 2]>,
    pawns: OnceCell<[PawnFlags; 2]>,
}

impl Snapshot {
    fn from_board(board: Board) -> Result<Self, FenError> {
        let mut codes = [[psq::PS_NONE; SLOTS]; 2];
        let mut slot_on = [None; 64];

        let non_kings = board.occupied() & !board.kind_bb(PieceType::King);
        let count = non_kings.count_ones() as usize;
        if count > NON_KING_SLOTS {
            return Err(FenError::TooManyPieces(count));
        }

        let mut place = |slot: u8, sq: Square| {
            if let Some(piece) = board.piece_on(sq) {
                let pair = psq::encode_pair(Some((piece, sq)));
                codes[0][usize::from(slot)] = pair[0];
                codes[1][usize::from(slot)] = pair[1];
                slot_on[sq.index()] = Some(slot);
            }
        };

        for (slot, sq) in super::bitboard::squares(non_kings).enumerate() {
            place(slot as u8, sq);
        }

        place(WHITE_KING_SLOT, board.king_sq(Color::White));
        place(BLACK_KING_SLOT, board.king_sq(Color::Black));

        Ok(Self {
            board,
            codes,
            slot_on,
            dirty: DirtyPiece::default(),
            previous: None,
            attacks: OnceCell::new(),
            mobility: OnceCell::new(),
            pawns: OnceCell::new(),
        })
    }

    fn successor(board: Board, dirty: DirtyPiece, codes: [[u16; SLOTS]; 2], slot_on: [Option<u8>; 64], previous: usize) -> Self {
        Self {
            board,
            codes,
            slot_on,
            dirty,
            previous: Some(previous),
            attacks: OnceCell::new(),
            mobility: OnceCell::new(),
            pawns: OnceCell::new(),
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Slot to code table from `perspective`.
    #[inline]
    pub fn codes(&self, perspective: Color) -> &[u16; SLOTS] {
        &self.codes[perspective.index()]
    }

    /// Codes of the non-king slots from `perspective`, zero for empty slots.
    #[inline]
    pub fn piece_codes(&self, perspective: Color) -> &[u16] {
        &self.codes[perspective.index()][..NON_KING_SLOTS]
    }

    #[inline]
    pub fn slot_on(&self, sq: Square) -> Option<u8> {
        self.slot_on[sq.index()]
    }

    #[inline]
    pub fn dirty(&self) -> &DirtyPiece {
        &self.dirty
    }

    #[inline]
    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    /// King square of `color` oriented to `perspective`.
    #[inline]
    pub fn oriented_king(&self, color: Color, perspective: Color) -> Square {
        self.board.king_sq(color).orient(perspective)
    }

    /// Attack bitmaps per colour and piece type, computed on first use.
    pub fn attacks(&self) -> &[[u64; 6]; 2] {
        self.attacks.get_or_init(|| [self.board.attacks_by_type(Color::White), self.board.attacks_by_type(Color::Black)])
    }

    pub(crate) fn mobility_cache(&self) -> &OnceCell<[[u8; 8]; 2]> {
        &self.mobility
    }

    pub(crate) fn pawn_cache(&self) -> &OnceCell<[PawnFlags; 2]> {
        &self.pawns
    }
}

/// A game as an arena of snapshots with a cursor on the current one.
///
/// Making a move writes the successor right after the cursor, discarding any
/// snapshots left over from unmade moves. Unmaking only moves the cursor.
#[derive(Clone, Debug)]
pub struct Position {
    snapshots: Vec<Snapshot>,
    current: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    pub fn startpos() -> Self {
        match Self::from_fen(fen::STARTPOS) {
            Ok(pos) => pos,
            Err(err) => unreachable!("start position is valid: {err}"),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Self::from_board(fen::parse_board(fen)?)
    }

    pub fn from_board(board: Board) -> Result<Self, FenError> {
        Ok(Self { snapshots: vec![Snapshot::from_board(board)?], current: 0 })
    }

    pub fn fen(&self) -> String {
        fen::to_fen(self.board())
    }

    #[inline]
    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.current]
    }

    /// The immediate predecessor of the current snapshot, if any.
    #[inline]
    pub fn previous(&self) -> Option<&Snapshot> {
        self.current().previous.map(|idx| &self.snapshots[idx])
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.current().board
    }

    /// Index of the current snapshot, equal to the number of moves made since setup.
    #[inline]
    pub fn generation(&self) -> usize {
        self.current
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(self.board())
    }

    fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.truncate(self.current + 1);
        self.snapshots.push(snapshot);
        self.current += 1;
    }

    /// Plays a move that is known to be legal.
    pub fn make_move(&mut self, mv: Move) {
        let cur = self.current();
        let mut board = cur.board;
        let changes = board.apply(mv);

        let mut codes = cur.codes;
        let mut slot_on = cur.slot_on;
        let mut dirty = DirtyPiece::default();

        let mut slots = [None; 2];
        for (slot, change) in slots.iter_mut().zip(changes.as_slice()) {
            *slot = change.from.and_then(|(_, sq)| cur.slot_on(sq));
        }

        for change in changes.as_slice() {
            if let Some((_, sq)) = change.from {
                slot_on[sq.index()] = None;
            }
        }

        for (change, slot) in changes.as_slice().iter().zip(slots) {
            let Some(slot) = slot else {
                panic!("Piece without a slot in {}!", fen::to_fen(&cur.board));
            };

            let old = [codes[0][usize::from(slot)], codes[1][usize::from(slot)]];
            let new = psq::encode_pair(change.to);
            codes[0][usize::from(slot)] = new[0];
            codes[1][usize::from(slot)] = new[1];

            if let Some((_, sq)) = change.to {
                slot_on[sq.index()] = Some(slot);
            }

            dirty.push(DirtyEntry { slot, old, new, from: change.from, to: change.to });
        }

        let next = Snapshot::successor(board, dirty, codes, slot_on, self.current);
        self.push(next);
    }

    /// Plays a move after checking it against the legal move list.
    pub fn try_make_move(&mut self, mv: Move) -> Result<(), MoveError> {
        if !self.legal_moves().contains(&mv) {
            return Err(MoveError::Illegal { mv: mv.to_string(), fen: self.fen() });
        }

        self.make_move(mv);
        Ok(())
    }

    /// Plays a move given in UCI notation.
    pub fn make_uci(&mut self, uci: &str) -> Result<(), MoveError> {
        self.try_make_move(uci.parse()?)
    }

    pub fn make_null_move(&mut self) {
        let cur = self.current();
        debug_assert!(!cur.board.in_check(), "Null move while in check!");

        let mut board = cur.board;
        board.apply_null();

        let next = Snapshot::successor(board, DirtyPiece::default(), cur.codes, cur.slot_on, self.current);
        self.push(next);
    }

    pub fn unmake_move(&mut self) -> Result<(), MoveError> {
        if self.current == 0 {
            return Err(MoveError::AtRoot);
        }

        self.current -= 1;
        Ok(())
    }
}
