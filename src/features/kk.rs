use super::{FeatureType, IncrementalFeature, IndexList, RefreshTrigger};
use crate::chess::{Color, Snapshot};

/// The pair of king squares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KK;

impl FeatureType for KK {
    fn name(&self) -> String {
        "KK".to_string()
    }

    fn hash(&self) -> u32 {
        0x6292_4F92
    }

    fn dimensions(&self) -> usize {
        64 * 64
    }

    fn max_active(&self) -> usize {
        1
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::AnyKingMoved
    }

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        let own = snap.oriented_king(perspective, perspective);
        let enemy = snap.oriented_king(!perspective, perspective);
        active.push(64 * own.index() + enemy.index());
    }
}

impl IncrementalFeature for KK {
    /// Only king moves change the index and those always refresh.
    fn append_changed(&self, _: &Snapshot, _: &Snapshot, _: Color, _: &mut IndexList, _: &mut IndexList) {}
}
