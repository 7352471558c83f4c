use super::{FeatureType, IncrementalFeature, IndexList, RefreshTrigger};
use crate::{
    chess::{position::NON_KING_SLOTS, Color, Snapshot},
    psq::PS_END,
};

/// Every unordered pair of non-king pieces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PP;

impl PP {
    pub const DIMENSIONS: usize = PS_END * (PS_END - 1) / 2;
    pub const MAX_ACTIVE: usize = NON_KING_SLOTS * (NON_KING_SLOTS - 1) / 2;

    #[inline]
    pub fn make_index(a: u16, b: u16) -> usize {
        debug_assert!(a != b && a != 0 && b != 0);
        let (max, min) = if a > b { (usize::from(a), usize::from(b)) } else { (usize::from(b), usize::from(a)) };
        max * (max - 1) / 2 + min
    }

    /// Inverse of [`PP::make_index`], `(max, min)`.
    pub fn split_index(idx: usize) -> (usize, usize) {
        debug_assert!(idx < Self::DIMENSIONS);

        // smallest i with idx < i * (i + 1) / 2
        let mut max = ((2.0 * idx as f64).sqrt()) as usize;
        while max * (max + 1) / 2 <= idx {
            max += 1;
        }
        while max > 0 && (max - 1) * max / 2 > idx {
            max -= 1;
        }

        let min = max - (max * (max + 1) / 2 - idx);
        (max, min)
    }
}

impl FeatureType for PP {
    fn name(&self) -> String {
        "PP".to_string()
    }

    fn hash(&self) -> u32 {
        0x6292_3F91
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }

    fn max_active(&self) -> usize {
        Self::MAX_ACTIVE
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::Never
    }

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        let codes = snap.piece_codes(perspective);
        for (i, &a) in codes.iter().enumerate() {
            if a == 0 {
                continue;
            }

            for &b in codes[..i].iter().filter(|&&code| code != 0) {
                active.push(Self::make_index(a, b));
            }
        }
    }
}

impl IncrementalFeature for PP {
    fn append_changed(&self, _: &Snapshot, cur: &Snapshot, perspective: Color, removed: &mut IndexList, added: &mut IndexList) {
        let p = perspective.index();
        let entries = cur.dirty().entries();

        for (slot, &other) in cur.piece_codes(perspective).iter().enumerate() {
            if other == 0 || cur.dirty().contains_slot(slot as u8) {
                continue;
            }

            for entry in entries.iter().filter(|entry| !entry.is_king()) {
                if entry.old[p] != 0 {
                    removed.push(Self::make_index(other, entry.old[p]));
                }

                if entry.new[p] != 0 {
                    added.push(Self::make_index(other, entry.new[p]));
                }
            }
        }

        if let [first, second] = entries {
            if first.is_king() || second.is_king() {
                return;
            }

            if first.old[p] != 0 && second.old[p] != 0 {
                removed.push(Self::make_index(first.old[p], second.old[p]));
            }

            if first.new[p] != 0 && second.new[p] != 0 {
                added.push(Self::make_index(first.new[p], second.new[p]));
            }
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

    #[test]
    fn index_round_trip() {
        for (a, b) in [(1, 2), (640, 639), (2, 640), (300, 17)] {
            let idx = PP::make_index(a, b);
            assert!(idx < PP::DIMENSIONS);
            assert_eq!(PP::split_index(idx), (usize::from(a.max(b)), usize::from(a.min(b))));
        }
    }

    #[test]
    fn startpos_pairs() {
        let pos = Position::startpos();
        let pairs = active(&PP, &pos, Color::White);
        assert_eq!(pairs.len(), PP::MAX_ACTIVE);
        pairs.windows(2).for_each(|w| assert!(w[0] < w[1]));
    }

    #[test]
    fn capture_removes_all_pairs_of_victim() {
        let mut pos = Position::from_fen("4k3/8/2n5/8/3P4/8/8/R3K3 w - - 0 1").unwrap();
        pos.make_uci("d4d5").unwrap();
        pos.make_uci("c6b4").unwrap();
        pos.make_uci("a1a4").unwrap();
        let slot = pos.current().slot_on("b4".parse().unwrap()).unwrap();
        let knight = pos.current().codes(Color::White)[usize::from(slot)];

        pos.make_uci("e8d7").unwrap();
        pos.make_uci("a4b4").unwrap();

        let (prev, cur) = (pos.previous().unwrap(), pos.current());
        let mut removed = IndexList::with_capacity(2 * PP::MAX_ACTIVE);
        let mut added = IndexList::with_capacity(2 * PP::MAX_ACTIVE);
        PP.append_changed(prev, cur, Color::White, &mut removed, &mut added);

        let with_knight = |list: &IndexList| {
            let knight = usize::from(knight);
            list.iter().map(|&idx| PP::split_index(idx)).filter(|&(max, min)| max == knight || min == knight).count()
        };

        // pawn-knight and rook-knight
        assert_eq!(with_knight(&removed), 2);
        assert_eq!(with_knight(&added), 0);
        check_diff(&PP, &pos);
    }

    #[test]
    fn castling_only_moves_the_rook() {
        let mut pos = Position::from_fen("4k3/pp6/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        pos.make_uci("e1g1").unwrap();
        check_diff(&PP, &pos);
        pos.make_uci("a7a5").unwrap();
        check_diff(&PP, &pos);
    }
}
