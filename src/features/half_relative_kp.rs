use super::{FeatureType, HalfKP, IncrementalFeature, IndexList, RefreshTrigger, Side};
use crate::{
    chess::{Color, Snapshot, Square},
    psq,
};

const WIDTH: usize = 15;
const HEIGHT: usize = 15;
const KINDS: usize = 10;

/// Non-king pieces by their displacement from one king.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalfRelativeKP {
    inner: HalfKP,
}

impl HalfRelativeKP {
    pub const DIMENSIONS: usize = KINDS * WIDTH * HEIGHT;

    pub fn new(side: Side) -> Self {
        Self { inner: HalfKP::new(side) }
    }

    pub fn side(&self) -> Side {
        self.inner.side()
    }

    /// Index of a non-king code relative to the oriented king square `ksq`.
    pub fn make_index(ksq: Square, code: u16) -> usize {
        debug_assert!(code != 0 && usize::from(code) < psq::PS_END);

        let sq = psq::square_of(code);
        let file = sq.file() + 7 - ksq.file();
        let rank = sq.rank() + 7 - ksq.rank();

        WIDTH * HEIGHT * psq::kind_of(code) + HEIGHT * file + rank
    }
}

impl FeatureType for HalfRelativeKP {
    fn name(&self) -> String {
        format!("HalfRelativeKP({:?})", self.side())
    }

    fn hash(&self) -> u32 {
        0xF918_0919 ^ self.side().hash_bit()
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }

    fn max_active(&self) -> usize {
        HalfKP::MAX_ACTIVE
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::KingMoved(self.side())
    }

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        let ksq = self.inner.anchor(snap, perspective);
        for &code in snap.piece_codes(perspective) {
            if code != 0 {
                active.push(Self::make_index(ksq, code));
            }
        }
    }
}

impl IncrementalFeature for HalfRelativeKP {
    fn append_changed(&self, _: &Snapshot, cur: &Snapshot, perspective: Color, removed: &mut IndexList, added: &mut IndexList) {
        let ksq = self.inner.anchor(cur, perspective);
        let p = perspective.index();

        for entry in cur.dirty().entries().iter().filter(|entry| !entry.is_king()) {
            if entry.old[p] != 0 {
                removed.push(Self::make_index(ksq, entry.old[p]));
            }

            if entry.new[p] != 0 {
                added.push(Self::make_index(ksq, entry.new[p]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chess::Position, features::test_util::check_diff};

    #[test]
    fn displacement_extremes() {
        let a1 = Square::from_index(0);
        let h8 = Square::from_index(63);

        // friend pawn on h8 seen from a king on a1
        assert_eq!(HalfRelativeKP::make_index(a1, 1 + 63), 15 * 14 + 14);
        // enemy queen on a1 seen from a king on h8
        assert_eq!(HalfRelativeKP::make_index(h8, 577), 225 * 9);
        assert!(HalfRelativeKP::make_index(h8, 640) < HalfRelativeKP::DIMENSIONS);
    }

    #[test]
    fn diff() {
        let mut pos = Position::startpos();
        for uci in ["g1f3", "b8c6", "e2e4", "c6d4", "f3d4"] {
            pos.make_uci(uci).unwrap();
            check_diff(&HalfRelativeKP::new(Side::Friend), &pos);
            check_diff(&HalfRelativeKP::new(Side::Enemy), &pos);
        }
    }
}
