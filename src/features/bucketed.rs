use super::{FeatureType, HalfKP, IncrementalFeature, IndexList, RefreshTrigger, Side};
use crate::chess::{Board, Color, Snapshot};

/// The game quantity a bucketed feature splits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BucketScalar {
    GamePly,
    /// Kings included.
    PieceCount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bucketing {
    pub scalar: BucketScalar,
    pub width: usize,
    pub count: usize,
}

impl Bucketing {
    pub const GAME_PLY_40X4: Self = Self { scalar: BucketScalar::GamePly, width: 40, count: 4 };
    pub const PIECE_COUNT_8X4: Self = Self { scalar: BucketScalar::PieceCount, width: 8, count: 4 };

    pub fn scalar_of(&self, board: &Board) -> usize {
        match self.scalar {
            BucketScalar::GamePly => usize::from(board.ply()),
            BucketScalar::PieceCount => board.piece_count() as usize,
        }
    }

    #[inline]
    pub fn bucket(&self, board: &Board) -> usize {
        (self.scalar_of(board).saturating_sub(1) / self.width).min(self.count - 1)
    }

    /// Shorthand for the bucketing e.g. `GamePly40x4`
    pub fn shorthand(&self) -> String {
        let scalar = match self.scalar {
            BucketScalar::GamePly => "GamePly",
            BucketScalar::PieceCount => "PieceCount",
        };

        format!("{scalar}{}x{}", self.width, self.count)
    }
}

/// [`HalfKP`] split into buckets on game ply or piece count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketedHalfKP {
    inner: HalfKP,
    bucketing: Bucketing,
}

impl BucketedHalfKP {
    pub fn new(side: Side, bucketing: Bucketing) -> Self {
        assert!(bucketing.width > 0 && bucketing.count > 0, "Bucketing must have a positive width and count!");
        Self { inner: HalfKP::new(side), bucketing }
    }

    pub fn game_ply(side: Side) -> Self {
        Self::new(side, Bucketing::GAME_PLY_40X4)
    }

    pub fn piece_count(side: Side) -> Self {
        Self::new(side, Bucketing::PIECE_COUNT_8X4)
    }

    pub fn side(&self) -> Side {
        self.inner.side()
    }

    pub fn bucketing(&self) -> Bucketing {
        self.bucketing
    }

    fn offset(&self, board: &Board) -> usize {
        self.bucketing.bucket(board) * HalfKP::DIMENSIONS
    }
}

impl FeatureType for BucketedHalfKP {
    fn name(&self) -> String {
        format!("HalfKP_{}({:?})", self.bucketing.shorthand(), self.side())
    }

    fn hash(&self) -> u32 {
        let base = match self.bucketing.scalar {
            BucketScalar::GamePly => 0x1D69_D5B9,
            BucketScalar::PieceCount => 0x1D71_D5B9,
        };

        base ^ self.side().hash_bit()
    }

    fn dimensions(&self) -> usize {
        HalfKP::DIMENSIONS * self.bucketing.count
    }

    fn max_active(&self) -> usize {
        HalfKP::MAX_ACTIVE
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::KingMovedOrBucketChanged(self.side(), self.bucketing)
    }

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        self.inner.append_with_offset(snap, perspective, self.offset(snap.board()), active);
    }
}

impl IncrementalFeature for BucketedHalfKP {
    fn append_changed(&self, prev: &Snapshot, cur: &Snapshot, perspective: Color, removed: &mut IndexList, added: &mut IndexList) {
        let offsets = (self.offset(prev.board()), self.offset(cur.board()));
        self.inner.append_changed_with_offsets(cur, perspective, offsets, removed, added);
    }
}
