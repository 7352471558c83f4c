use super::{FeatureType, IncrementalFeature, IndexList, RefreshTrigger};
use crate::{
    chess::{Color, Snapshot},
    psq::PS_END,
};

/// Non-king pieces by their piece-square code alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct P;

impl FeatureType for P {
    fn name(&self) -> String {
        "P".to_string()
    }

    fn hash(&self) -> u32 {
        0x764C_FB4B
    }

    fn dimensions(&self) -> usize {
        PS_END
    }

    fn max_active(&self) -> usize {
        30
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::Never
    }

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        for &code in snap.piece_codes(perspective) {
            if code != 0 {
                active.push(usize::from(code));
            }
        }
    }
}

impl IncrementalFeature for P {
    fn append_changed(&self, _: &Snapshot, cur: &Snapshot, perspective: Color, removed: &mut IndexList, added: &mut IndexList) {
        let p = perspective.index();
        for entry in cur.dirty().entries().iter().filter(|entry| !entry.is_king()) {
            if entry.old[p] != 0 {
                removed.push(usize::from(entry.old[p]));
            }

            if entry.new[p] != 0 {
                added.push(usize::from(entry.new[p]));
            }
        }
    }
}
