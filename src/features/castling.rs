use super::{FeatureType, IncrementalFeature, IndexList, RefreshTrigger};
use crate::chess::{Color, Snapshot};

/// Remaining castling rights: own short, own long, enemy short, enemy long.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CastlingRight;

impl CastlingRight {
    /// Rights bits of the snapshot relative to `perspective`.
    pub fn relative_rights(snap: &Snapshot, perspective: Color) -> u8 {
        let rights = snap.board().castling();
        match perspective {
            Color::White => rights,
            Color::Black => ((rights & 3) << 2) | (rights >> 2),
        }
    }
}

impl FeatureType for CastlingRight {
    fn name(&self) -> String {
        "CastlingRight".to_string()
    }

    fn hash(&self) -> u32 {
        0x9139_68AA
    }

    fn dimensions(&self) -> usize {
        4
    }

    fn max_active(&self) -> usize {
        4
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::Never
    }

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        let rights = Self::relative_rights(snap, perspective);
        for i in (0..4).filter(|i| rights & (1 << i) != 0) {
            active.push(i);
        }
    }
}

impl IncrementalFeature for CastlingRight {
    fn append_changed(&self, prev: &Snapshot, cur: &Snapshot, perspective: Color, removed: &mut IndexList, added: &mut IndexList) {
        let before = Self::relative_rights(prev, perspective);
        let after = Self::relative_rights(cur, perspective);

        for i in 0..4 {
            let bit = 1 << i;
            match (before & bit != 0, after & bit != 0) {
                (true, false) => removed.push(i),
                (false, true) => added.push(i),
                _ => {}
            }
        }
    }
}
