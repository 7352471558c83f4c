use super::{FeatureType, IncrementalFeature, IndexList, RefreshTrigger, Side};
use crate::{
    chess::{Color, Snapshot, Square},
    psq::PS_END,
};

/// Non-king pieces relative to one king's square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalfKP {
    side: Side,
}

impl HalfKP {
    pub const DIMENSIONS: usize = 64 * PS_END;
    pub const MAX_ACTIVE: usize = 30;

    pub fn new(side: Side) -> Self {
        Self { side }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn make_index(ksq: Square, code: u16) -> usize {
        PS_END * ksq.index() + usize::from(code)
    }

    pub(crate) fn anchor(&self, snap: &Snapshot, perspective: Color) -> Square {
        snap.oriented_king(self.side.color(perspective), perspective)
    }

    /// Appends the king-relative index of every piece with `offset` added.
    pub(crate) fn append_with_offset(&self, snap: &Snapshot, perspective: Color, offset: usize, active: &mut IndexList) {
        let ksq = self.anchor(snap, perspective);
        for &code in snap.piece_codes(perspective) {
            if code != 0 {
                active.push(offset + Self::make_index(ksq, code));
            }
        }
    }

    /// Appends the changed king-relative indices, removals with `old_offset`
    /// and additions with `new_offset`.
    pub(crate) fn append_changed_with_offsets(
        &self,
        cur: &Snapshot,
        perspective: Color,
        (old_offset, new_offset): (usize, usize),
        removed: &mut IndexList,
        added: &mut IndexList,
    ) {
        let ksq = self.anchor(cur, perspective);
        let p = perspective.index();

        for entry in cur.dirty().entries().iter().filter(|entry| !entry.is_king()) {
            if entry.old[p] != 0 {
                removed.push(old_offset + Self::make_index(ksq, entry.old[p]));
            }

            if entry.new[p] != 0 {
                added.push(new_offset + Self::make_index(ksq, entry.new[p]));
            }
        }
    }
}

impl FeatureType for HalfKP {
    fn name(&self) -> String {
        format!("HalfKP({:?})", self.side)
    }

    fn hash(&self) -> u32 {
        0x5D69_D5B9 ^ self.side.hash_bit()
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }

    fn max_active(&self) -> usize {
        Self::MAX_ACTIVE
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::KingMoved(self.side)
    }

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        self.append_with_offset(snap, perspective, 0, active);
    }
}

impl IncrementalFeature for HalfKP {
    fn append_changed(&self, _: &Snapshot, cur: &Snapshot, perspective: Color, removed: &mut IndexList, added: &mut IndexList) {
        self.append_changed_with_offsets(cur, perspective, (0, 0), removed, added);
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
    fn startpos() {
        let pos = Position::startpos();
        let feature = HalfKP::new(Side::Friend);

        let white = active(&feature, &pos, Color::White);
        let black = active(&feature, &pos, Color::Black);
        assert_eq!(white.len(), 30);
        assert_eq!(black.len(), 30);
        assert!(white.iter().all(|&idx| idx / PS_END == 4));
        // e8 rotated is d1
        assert!(black.iter().all(|&idx| idx / PS_END == 3));
    }

    #[test]
    fn quiet_pawn_move() {
        let mut pos = Position::startpos();
        pos.make_uci("e2e4").unwrap();

        let feature = HalfKP::new(Side::Friend);
        let mut removed = IndexList::with_capacity(4);
        let mut added = IndexList::with_capacity(4);
        feature.append_changed(pos.previous().unwrap(), pos.current(), Color::White, &mut removed, &mut added);

        assert_eq!(removed.as_slice(), &[PS_END * 4 + 1 + 12]);
        assert_eq!(added.as_slice(), &[PS_END * 4 + 1 + 28]);
        check_diff(&feature, &pos);
    }

    #[test]
    fn captures_and_enemy_anchor() {
        let mut pos = Position::from_fen("r3k3/8/8/3p4/4P3/8/8/4K2R w Kq - 0 1").unwrap();
        for uci in ["e4d5", "a8a2", "e1g1", "e8d7", "d5d6", "d7d6"] {
            pos.make_uci(uci).unwrap();
            check_diff(&HalfKP::new(Side::Friend), &pos);
            check_diff(&HalfKP::new(Side::Enemy), &pos);
        }
    }
}
