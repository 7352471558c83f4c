mod bucketed;
mod castling;
mod half_kp;
mod half_kpe4;
mod half_relative_kp;
mod king_line;
mod kk;
mod mobility;
mod p;
mod pawn;
mod pp;

pub use bucketed::{BucketScalar, Bucketing, BucketedHalfKP};
pub use castling::CastlingRight;
pub use half_kp::HalfKP;
pub use half_kpe4::{AttackPolicy, HalfKPE4};
pub use half_relative_kp::HalfRelativeKP;
pub use king_line::{HalfKPKingLine, KingLine};
pub use kk::KK;
pub use mobility::Mobility;
pub use p::P;
pub use pawn::{Pawn, PawnElement, PawnFlag};
pub use pp::PP;

use crate::chess::{Color, Snapshot};

/// Which king a king-relative feature is anchored to, relative to the perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Friend,
    Enemy,
}

impl Side {
    #[inline]
    pub fn color(self, perspective: Color) -> Color {
        match self {
            Side::Friend => perspective,
            Side::Enemy => !perspective,
        }
    }

    /// Hash contribution of the anchor, `1` for the friend king.
    pub(crate) fn hash_bit(self) -> u32 {
        u32::from(self == Side::Friend)
    }
}

/// Events that invalidate an incremental update of a feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshTrigger {
    Never,
    KingMoved(Side),
    AnyKingMoved,
    /// Fires on every transition, such features are always recomputed.
    AnyPieceMoved,
    KingMovedOrBucketChanged(Side, Bucketing),
}

impl RefreshTrigger {
    /// Whether the transition `prev -> cur` requires a full recompute from `perspective`.
    pub fn fired(&self, prev: &Snapshot, cur: &Snapshot, perspective: Color) -> bool {
        let king_moved = |color: Color| prev.board().king_sq(color) != cur.board().king_sq(color);

        match *self {
            RefreshTrigger::Never => false,
            RefreshTrigger::KingMoved(side) => king_moved(side.color(perspective)),
            RefreshTrigger::AnyKingMoved => king_moved(Color::White) || king_moved(Color::Black),
            RefreshTrigger::AnyPieceMoved => true,
            RefreshTrigger::KingMovedOrBucketChanged(side, bucketing) => {
                king_moved(side.color(perspective)) || bucketing.bucket(prev.board()) != bucketing.bucket(cur.board())
            }
        }
    }

    pub fn description(&self) -> String {
        match self {
            RefreshTrigger::Never => "never".to_string(),
            RefreshTrigger::KingMoved(side) => format!("{side:?} king moved").to_lowercase(),
            RefreshTrigger::AnyKingMoved => "any king moved".to_string(),
            RefreshTrigger::AnyPieceMoved => "any piece moved".to_string(),
            RefreshTrigger::KingMovedOrBucketChanged(side, bucketing) => {
                format!("{} king moved or {} bucket changed", format!("{side:?}").to_lowercase(), bucketing.shorthand())
            }
        }
    }
}

/// A list of active feature indices with a fixed capacity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexList {
    indices: Vec<usize>,
    capacity: usize,
}

impl IndexList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { indices: Vec::with_capacity(capacity), capacity }
    }

    #[inline]
    pub fn push(&mut self, idx: usize) {
        assert!(self.indices.len() < self.capacity, "Index list capacity {} exceeded!", self.capacity);
        self.indices.push(idx);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Adds `offset` to every index pushed at or after `start`.
    pub(crate) fn shift_from(&mut self, start: usize, offset: usize) {
        for idx in &mut self.indices[start..] {
            *idx += offset;
        }
    }

    /// Removes one occurrence of `idx`, returning whether it was present.
    pub fn remove(&mut self, idx: usize) -> bool {
        match self.indices.iter().position(|&x| x == idx) {
            Some(at) => {
                self.indices.swap_remove(at);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.indices.iter()
    }

    /// Indices sorted ascending, for comparing sets as multisets.
    pub fn sorted(&self) -> Vec<usize> {
        let mut indices = self.indices.clone();
        indices.sort_unstable();
        indices
    }
}

impl<'a> IntoIterator for &'a IndexList {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}

/// A single sparse encoding of a position.
pub trait FeatureType {
    /// Name of the feature, e.g. `HalfKP(Friend)`.
    fn name(&self) -> String;

    /// Value folded into the network's architecture hash.
    fn hash(&self) -> u32;

    /// The total number of inputs.
    fn dimensions(&self) -> usize;

    /// The maximum number of active inputs.
    fn max_active(&self) -> usize;

    fn refresh_trigger(&self) -> RefreshTrigger;

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList);
}

/// Features that can be updated from the change record between a snapshot and its predecessor.
pub trait IncrementalFeature: FeatureType {
    /// Must only be called when the refresh trigger did not fire.
    fn append_changed(&self, prev: &Snapshot, cur: &Snapshot, perspective: Color, removed: &mut IndexList, added: &mut IndexList);
}

/// Every feature type the crate knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    HalfKP(HalfKP),
    Bucketed(BucketedHalfKP),
    KingLine(HalfKPKingLine),
    HalfKPE4(HalfKPE4),
    HalfRelativeKP(HalfRelativeKP),
    P(P),
    KK(KK),
    PP(PP),
    Mobility(Mobility),
    Pawn(Pawn),
    PawnElement(PawnElement),
    CastlingRight(CastlingRight),
}

macro_rules! dispatch {
    ($self:ident, $f:ident => $body:expr) => {
        match $self {
            Feature::HalfKP($f) => $body,
            Feature::Bucketed($f) => $body,
            Feature::KingLine($f) => $body,
            Feature::HalfKPE4($f) => $body,
            Feature::HalfRelativeKP($f) => $body,
            Feature::P($f) => $body,
            Feature::KK($f) => $body,
            Feature::PP($f) => $body,
            Feature::Mobility($f) => $body,
            Feature::Pawn($f) => $body,
            Feature::PawnElement($f) => $body,
            Feature::CastlingRight($f) => $body,
        }
    };
}

macro_rules! dispatch_incremental {
    ($self:ident, $f:ident => $body:expr, $otherwise:expr) => {
        match $self {
            Feature::HalfKP($f) => $body,
            Feature::Bucketed($f) => $body,
            Feature::KingLine($f) => $body,
            Feature::HalfKPE4($f) => $body,
            Feature::HalfRelativeKP($f) => $body,
            Feature::P($f) => $body,
            Feature::KK($f) => $body,
            Feature::PP($f) => $body,
            Feature::Mobility($f) => $body,
            Feature::Pawn($f) => $body,
            Feature::CastlingRight($f) => $body,
            Feature::PawnElement(_) => $otherwise,
        }
    };
}

impl Feature {
    /// Whether the feature can be updated without a full recompute.
    pub fn is_incremental(&self) -> bool {
        dispatch_incremental!(self, _f => true, false)
    }

    /// Appends the changed indices, returning `false` if the feature has no incremental path.
    pub fn append_changed(
        &self,
        prev: &Snapshot,
        cur: &Snapshot,
        perspective: Color,
        removed: &mut IndexList,
        added: &mut IndexList,
    ) -> bool {
        dispatch_incremental!(
            self,
            f => {
                f.append_changed(prev, cur, perspective, removed, added);
                true
            },
            false
        )
    }
}

impl FeatureType for Feature {
    fn name(&self) -> String {
        dispatch!(self, f => f.name())
    }

    fn hash(&self) -> u32 {
        dispatch!(self, f => f.hash())
    }

    fn dimensions(&self) -> usize {
        dispatch!(self, f => f.dimensions())
    }

    fn max_active(&self) -> usize {
        dispatch!(self, f => f.max_active())
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        dispatch!(self, f => f.refresh_trigger())
    }

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        dispatch!(self, f => f.append_active(snap, perspective, active))
    }
}

macro_rules! impl_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Feature {
                fn from(feature: $variant) -> Self {
                    Feature::$variant(feature)
                }
            }
        )*
    };
}

impl_from!(HalfKP, HalfKPE4, HalfRelativeKP, P, KK, PP, Mobility, Pawn, PawnElement, CastlingRight);

impl From<BucketedHalfKP> for Feature {
    fn from(feature: BucketedHalfKP) -> Self {
        Feature::Bucketed(feature)
    }
}

impl From<HalfKPKingLine> for Feature {
    fn from(feature: HalfKPKingLine) -> Self {
        Feature::KingLine(feature)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::Position;

    #[test]
    fn index_list_capacity() {
        let mut list = IndexList::with_capacity(2);
        list.push(3);
        list.push(1);
        assert_eq!(list.sorted(), vec![1, 3]);
        assert_eq!(list.as_slice(), &[3, 1]);
        let result = std::panic::catch_unwind(move || list.push(0));
        assert!(result.is_err());
    }

    #[test]
    fn triggers() {
        let mut pos = Position::startpos();
        pos.make_uci("e2e4").unwrap();
        pos.make_uci("e7e5").unwrap();
        pos.make_uci("e1e2").unwrap();

        let (prev, cur) = (pos.previous().unwrap(), pos.current());
        assert!(!RefreshTrigger::Never.fired(prev, cur, Color::White));
        assert!(RefreshTrigger::KingMoved(Side::Friend).fired(prev, cur, Color::White));
        assert!(!RefreshTrigger::KingMoved(Side::Friend).fired(prev, cur, Color::Black));
        assert!(RefreshTrigger::KingMoved(Side::Enemy).fired(prev, cur, Color::Black));
        assert!(RefreshTrigger::AnyKingMoved.fired(prev, cur, Color::Black));
        assert!(RefreshTrigger::AnyPieceMoved.fired(prev, cur, Color::Black));
    }

    #[test]
    fn incremental_dispatch() {
        let element = Feature::from(PawnElement::new(PawnFlag::Passed));
        assert!(!element.is_incremental());
        assert!(Feature::from(KK).is_incremental());

        let mut pos = Position::startpos();
        pos.make_uci("d2d4").unwrap();
        let mut removed = IndexList::with_capacity(16);
        let mut added = IndexList::with_capacity(16);
        assert!(!element.append_changed(pos.previous().unwrap(), pos.current(), Color::White, &mut removed, &mut added));
        assert!(removed.is_empty() && added.is_empty());
    }
}
