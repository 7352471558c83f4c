use super::{FeatureType, IncrementalFeature, IndexList, RefreshTrigger};
use crate::chess::{
    bitboard::{self, adjacent_files, forward, forward_file, forward_ranks, passed_pawn_span, pawn_attacks, pawn_attacks_bb},
    position::PawnFlags,
    Board, Color, PieceType, Snapshot,
};

const MAX_PAWNS: usize = 8;
const FLAG_COUNT: usize = 11;
const PAWN_STRIDE: usize = (1 << FLAG_COUNT) + 1;
const ELEMENT_STRIDE: usize = 3;

/// Structural properties of a single pawn, most significant bit first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PawnFlag {
    Neighbours,
    Stoppers,
    Support,
    Phalanx,
    Opposed,
    Lever,
    LeverPush,
    Blocked,
    Backward,
    Passed,
    Doubled,
}

impl PawnFlag {
    pub const ALL: [PawnFlag; FLAG_COUNT] = [
        PawnFlag::Neighbours,
        PawnFlag::Stoppers,
        PawnFlag::Support,
        PawnFlag::Phalanx,
        PawnFlag::Opposed,
        PawnFlag::Lever,
        PawnFlag::LeverPush,
        PawnFlag::Blocked,
        PawnFlag::Backward,
        PawnFlag::Passed,
        PawnFlag::Doubled,
    ];

    /// Position of the flag in the packed bits.
    #[inline]
    pub fn bit(self) -> usize {
        FLAG_COUNT - 1 - self as usize
    }

    #[inline]
    pub fn is_set(self, bits: u16) -> bool {
        (bits >> self.bit()) & 1 == 1
    }
}

fn flags_of(board: &Board, us: Color) -> PawnFlags {
    let them = !us;
    let ours = board.piece_bb(PieceType::Pawn, us);
    let theirs = board.piece_bb(PieceType::Pawn, them);
    let double_attack_them = bitboard::pawn_double_attacks_bb(theirs, them);

    let mut squares: Vec<_> = bitboard::squares(ours).collect();
    squares.sort_by_key(|sq| sq.orient(us));

    let mut flags = [None; MAX_PAWNS];
    for (k, sq) in squares.into_iter().take(MAX_PAWNS).enumerate() {
        let bb = sq.bb();
        let push = forward(bb, us);
        let rank = bitboard::rank_bb(sq.rank());

        let opposed = theirs & forward_file(sq, us);
        let blocked = theirs & push;
        let stoppers = theirs & passed_pawn_span(sq, us);
        let lever = theirs & pawn_attacks(sq, us);
        let lever_push = theirs & pawn_attacks_bb(push, us);
        let doubled = ours & forward(bb, them);
        let neighbours = ours & adjacent_files(sq);
        let phalanx = neighbours & rank;
        let support = neighbours & forward(rank, them);

        // no neighbour level with or behind it and it cannot advance
        let backward = neighbours & !forward_ranks(sq, us) == 0 && lever_push | blocked != 0;

        let mut passed = stoppers ^ lever == 0
            || (stoppers ^ lever_push == 0 && phalanx.count_ones() >= lever_push.count_ones())
            || (stoppers == blocked
                && sq.relative_rank(us) >= 4
                && forward(support, us) & !(theirs | double_attack_them) != 0);
        passed &= forward_file(sq, us) & ours == 0;

        let bits = [
            neighbours != 0,
            stoppers != 0,
            support != 0,
            phalanx != 0,
            opposed != 0,
            lever != 0,
            lever_push != 0,
            blocked != 0,
            backward,
            passed,
            doubled != 0,
        ]
        .iter()
        .fold(0u16, |acc, &set| (acc << 1) | u16::from(set));

        flags[k] = Some(bits);
    }

    flags
}

/// Flags of the first eight pawns of `perspective`, cached on the snapshot.
fn pawn_flags(snap: &Snapshot, perspective: Color) -> PawnFlags {
    snap.pawn_cache().get_or_init(|| [flags_of(snap.board(), Color::White), flags_of(snap.board(), Color::Black)])
        [perspective.index()]
}

/// Pawn structure of the perspective's pawns, all eleven flags per pawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pawn;

impl Pawn {
    pub const DIMENSIONS: usize = PAWN_STRIDE * MAX_PAWNS;

    #[inline]
    pub fn make_index(k: usize, flags: Option<u16>) -> usize {
        PAWN_STRIDE * k + flags.map_or(0, |bits| 1 + usize::from(bits))
    }

    /// Splits an index into the pawn number and its flags, `None` for a missing pawn.
    pub fn split_index(idx: usize) -> (usize, Option<u16>) {
        let k = idx / PAWN_STRIDE;
        match idx % PAWN_STRIDE {
            0 => (k, None),
            r => (k, Some((r - 1) as u16)),
        }
    }
}

impl FeatureType for Pawn {
    fn name(&self) -> String {
        "Pawn".to_string()
    }

    fn hash(&self) -> u32 {
        0x7292_4F91
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }

    fn max_active(&self) -> usize {
        MAX_PAWNS
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::Never
    }

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        for (k, &flags) in pawn_flags(snap, perspective).iter().enumerate() {
            active.push(Self::make_index(k, flags));
        }
    }
}

impl IncrementalFeature for Pawn {
    fn append_changed(&self, prev: &Snapshot, cur: &Snapshot, perspective: Color, removed: &mut IndexList, added: &mut IndexList) {
        let before = pawn_flags(prev, perspective);
        let after = pawn_flags(cur, perspective);

        for (k, (&old, &new)) in before.iter().zip(after.iter()).enumerate() {
            if old != new {
                removed.push(Self::make_index(k, old));
                added.push(Self::make_index(k, new));
            }
        }
    }
}

/// A single pawn flag per pawn. Has no incremental update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PawnElement {
    flag: PawnFlag,
}

impl PawnElement {
    pub const DIMENSIONS: usize = ELEMENT_STRIDE * MAX_PAWNS;

    pub fn new(flag: PawnFlag) -> Self {
        Self { flag }
    }

    pub fn flag(&self) -> PawnFlag {
        self.flag
    }

    #[inline]
    pub fn make_index(&self, k: usize, flags: Option<u16>) -> usize {
        ELEMENT_STRIDE * k + flags.map_or(0, |bits| 1 + usize::from(self.flag.is_set(bits)))
    }

    /// Projects a [`Pawn`] index onto this element.
    pub fn project(&self, pawn_idx: usize) -> usize {
        let (k, flags) = Pawn::split_index(pawn_idx);
        self.make_index(k, flags)
    }
}

impl FeatureType for PawnElement {
    fn name(&self) -> String {
        format!("PawnElement({:?})", self.flag)
    }

    fn hash(&self) -> u32 {
        0x8292_4F91
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }

    fn max_active(&self) -> usize {
        MAX_PAWNS
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::AnyPieceMoved
    }

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        for (k, &flags) in pawn_flags(snap, perspective).iter().enumerate() {
            active.push(self.make_index(k, flags));
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

    fn flags(fen: &str, perspective: Color) -> PawnFlags {
        let pos = Position::from_fen(fen).unwrap();
        pawn_flags(pos.current(), perspective)
    }

    fn set(bits: u16) -> Vec<PawnFlag> {
        PawnFlag::ALL.into_iter().filter(|flag| flag.is_set(bits)).collect()
    }

    #[test]
    fn startpos() {
        let pos = Position::startpos();
        let white = pawn_flags(pos.current(), Color::White);
        assert_eq!(white, pawn_flags(pos.current(), Color::Black));

        // a2 only has b2 beside it, everyone is opposed and a phalanx member
        assert_eq!(
            set(white[0].unwrap()),
            vec![PawnFlag::Neighbours, PawnFlag::Stoppers, PawnFlag::Phalanx, PawnFlag::Opposed]
        );
        assert_eq!(active(&Pawn, &pos, Color::White).len(), 8);
    }

    #[test]
    fn lone_passer() {
        let white = flags("4k3/8/8/8/3P4/8/8/4K3 w - - 0 1", Color::White);
        assert_eq!(set(white[0].unwrap()), vec![PawnFlag::Passed]);
        assert!(white[1..].iter().all(Option::is_none));

        // no pawns at all from black's side
        let black = flags("4k3/8/8/8/3P4/8/8/4K3 w - - 0 1", Color::Black);
        assert_eq!(black, [None; MAX_PAWNS]);
    }

    #[test]
    fn doubled_and_blocked() {
        let white = flags("4k3/8/8/3p4/3P4/3P4/8/4K3 w - - 0 1", Color::White);

        // d3 sorts first, it is behind d4
        let d3 = set(white[0].unwrap());
        assert!(d3.contains(&PawnFlag::Opposed) && !d3.contains(&PawnFlag::Doubled));
        let d4 = set(white[1].unwrap());
        assert!(d4.contains(&PawnFlag::Blocked) && d4.contains(&PawnFlag::Doubled));
        assert!(!d4.contains(&PawnFlag::Passed));
    }

    #[test]
    fn backward_pawn() {
        // d3 lags behind c4 and e5 guards its push square
        let white = flags("4k3/8/8/4p3/2P5/3P4/8/4K3 w - - 0 1", Color::White);
        let d3 = set(white[0].unwrap());
        assert!(d3.contains(&PawnFlag::Backward));
        assert!(d3.contains(&PawnFlag::LeverPush));
    }

    #[test]
    fn element_projection() {
        let pos = Position::from_fen("4k3/8/8/8/3P4/8/8/4K3 w - - 0 1").unwrap();
        let passed = PawnElement::new(PawnFlag::Passed);
        let doubled = PawnElement::new(PawnFlag::Doubled);

        assert_eq!(active(&passed, &pos, Color::White), vec![2, 3, 6, 9, 12, 15, 18, 21]);
        assert_eq!(active(&doubled, &pos, Color::White), vec![1, 3, 6, 9, 12, 15, 18, 21]);

        for idx in active(&Pawn, &pos, Color::White) {
            assert!(active(&passed, &pos, Color::White).contains(&passed.project(idx)));
        }
    }

    #[test]
    fn diff() {
        let mut pos = Position::startpos();
        for uci in ["e2e4", "d7d5", "e4d5", "c7c6", "d5c6", "b7c6", "a2a4", "e8d7"] {
            pos.make_uci(uci).unwrap();
            check_diff(&Pawn, &pos);
        }
    }
}
