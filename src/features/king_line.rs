use super::{FeatureType, HalfKP, IncrementalFeature, IndexList, RefreshTrigger, Side};
use crate::{
    chess::{Color, Piece, PieceType, Snapshot, Square},
    psq,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KingLine {
    Rank,
    File,
}

impl KingLine {
    fn of(self, sq: Square) -> usize {
        match self {
            KingLine::Rank => sq.rank(),
            KingLine::File => sq.file(),
        }
    }
}

/// [`HalfKP`] extended by the rank or file of the other king.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalfKPKingLine {
    inner: HalfKP,
    line: KingLine,
}

impl HalfKPKingLine {
    pub fn new(side: Side, line: KingLine) -> Self {
        Self { inner: HalfKP::new(side), line }
    }

    pub fn side(&self) -> Side {
        self.inner.side()
    }

    pub fn line(&self) -> KingLine {
        self.line
    }

    fn offset(&self, snap: &Snapshot, perspective: Color) -> usize {
        let other = !self.side().color(perspective);
        HalfKP::DIMENSIONS * self.line.of(snap.oriented_king(other, perspective))
    }
}

impl FeatureType for HalfKPKingLine {
    fn name(&self) -> String {
        let line = match self.line {
            KingLine::Rank => "rank",
            KingLine::File => "file",
        };

        format!("HalfKPK{line}({:?})", self.side())
    }

    fn hash(&self) -> u32 {
        let base = match self.line {
            KingLine::Rank => 0x1D39_D5B9,
            KingLine::File => 0x1D49_D5B9,
        };

        base ^ self.side().hash_bit()
    }

    fn dimensions(&self) -> usize {
        HalfKP::DIMENSIONS * 8
    }

    fn max_active(&self) -> usize {
        HalfKP::MAX_ACTIVE
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::AnyKingMoved
    }

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        self.inner.append_with_offset(snap, perspective, self.offset(snap, perspective), active);
    }
}

impl IncrementalFeature for HalfKPKingLine {
    fn append_changed(&self, _: &Snapshot, cur: &Snapshot, perspective: Color, removed: &mut IndexList, added: &mut IndexList) {
        let ksq = self.inner.anchor(cur, perspective);
        let offset = self.offset(cur, perspective);
        let index = |(piece, sq): (Piece, Square)| offset + HalfKP::make_index(ksq, psq::encode(piece, sq, perspective));

        for entry in cur.dirty().entries() {
            if let Some(from) = entry.from.filter(|(piece, _)| piece.kind != PieceType::King) {
                removed.push(index(from));
            }

            if let Some(to) = entry.to.filter(|(piece, _)| piece.kind != PieceType::King) {
                added.push(index(to));
            }
        }
    }
}
