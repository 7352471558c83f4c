use super::{FeatureType, HalfKP, IncrementalFeature, IndexList, RefreshTrigger, Side};
use crate::{
    chess::{Color, Snapshot, Square},
    psq,
};

/// Which attackers count when flagging a piece as attacked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttackPolicy {
    All,
    /// Only attackers up to a threshold type, pawns for minor pieces and
    /// pawns, up to bishops for rooks, up to rooks for queens.
    FromSmallerPiecesOnly,
}

impl AttackPolicy {
    const THRESHOLD: [usize; 6] = [0, 0, 0, 2, 3, 5];

    fn shorthand(self) -> char {
        match self {
            AttackPolicy::All => 'A',
            AttackPolicy::FromSmallerPiecesOnly => 'S',
        }
    }
}

/// Squares attacked by one colour under each attack policy, indexed by the attacked piece type.
struct AttackMaps {
    all: u64,
    cumulative: [u64; 6],
}

impl AttackMaps {
    fn new(by_type: &[u64; 6]) -> Self {
        let mut cumulative = [0; 6];
        let mut acc = 0;
        for (slot, attacks) in cumulative.iter_mut().zip(by_type) {
            acc |= attacks;
            *slot = acc;
        }

        Self { all: acc, cumulative }
    }

    fn attacks(&self, policy: AttackPolicy, attacked: usize) -> u64 {
        match policy {
            AttackPolicy::All => self.all,
            AttackPolicy::FromSmallerPiecesOnly => self.cumulative[AttackPolicy::THRESHOLD[attacked]],
        }
    }
}

/// [`HalfKP`] extended by whether each piece is attacked by its own side and by the other side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalfKPE4 {
    inner: HalfKP,
    own: AttackPolicy,
    enemy: AttackPolicy,
}

impl HalfKPE4 {
    pub fn new(side: Side, own: AttackPolicy, enemy: AttackPolicy) -> Self {
        Self { inner: HalfKP::new(side), own, enemy }
    }

    pub fn side(&self) -> Side {
        self.inner.side()
    }

    fn maps(snap: &Snapshot) -> [AttackMaps; 2] {
        let attacks = snap.attacks();
        [AttackMaps::new(&attacks[0]), AttackMaps::new(&attacks[1])]
    }

    fn flag_offset(&self, maps: &[AttackMaps; 2], code: u16, perspective: Color) -> usize {
        let Some((piece, sq)) = psq::decode(code, perspective) else {
            unreachable!("flag of an empty slot");
        };

        let kind = piece.kind.index();
        let hit = |color: Color, policy| maps[color.index()].attacks(policy, kind) & sq.bb() != 0;
        let by_own = hit(piece.color, self.own);
        let by_enemy = hit(!piece.color, self.enemy);

        HalfKP::DIMENSIONS * (2 * usize::from(by_own) + usize::from(by_enemy))
    }

    fn make_index(&self, maps: &[AttackMaps; 2], ksq: Square, code: u16, perspective: Color) -> usize {
        self.flag_offset(maps, code, perspective) + HalfKP::make_index(ksq, code)
    }
}

impl FeatureType for HalfKPE4 {
    fn name(&self) -> String {
        format!("HalfKPE4{}{}({:?})", self.own.shorthand(), self.enemy.shorthand(), self.side())
    }

    fn hash(&self) -> u32 {
        0x5D69_D3B9 ^ self.side().hash_bit()
    }

    fn dimensions(&self) -> usize {
        HalfKP::DIMENSIONS * 4
    }

    fn max_active(&self) -> usize {
        HalfKP::MAX_ACTIVE
    }

    fn refresh_trigger(&self) -> RefreshTrigger {
        RefreshTrigger::KingMoved(self.side())
    }

    fn append_active(&self, snap: &Snapshot, perspective: Color, active: &mut IndexList) {
        let maps = Self::maps(snap);
        let ksq = self.inner.anchor(snap, perspective);

        for &code in snap.piece_codes(perspective) {
            if code != 0 {
                active.push(self.make_index(&maps, ksq, code, perspective));
            }
        }
    }
}

impl IncrementalFeature for HalfKPE4 {
    fn append_changed(&self, prev: &Snapshot, cur: &Snapshot, perspective: Color, removed: &mut IndexList, added: &mut IndexList) {
        let prev_maps = Self::maps(prev);
        let cur_maps = Self::maps(cur);
        let ksq = self.inner.anchor(cur, perspective);
        let p = perspective.index();

        for entry in cur.dirty().entries().iter().filter(|entry| !entry.is_king()) {
            if entry.old[p] != 0 {
                removed.push(self.make_index(&prev_maps, ksq, entry.old[p], perspective));
            }

            if entry.new[p] != 0 {
                added.push(self.make_index(&cur_maps, ksq, entry.new[p], perspective));
            }
        }

        // pieces that did not move can still gain or lose attackers
        for (slot, &code) in cur.piece_codes(perspective).iter().enumerate() {
            if code == 0 || cur.dirty().contains_slot(slot as u8) {
                continue;
            }

            let old = self.make_index(&prev_maps, ksq, code, perspective);
            let new = self.make_index(&cur_maps, ksq, code, perspective);
            if old != new {
                removed.push(old);
                added.push(new);
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

    const POLICIES: [AttackPolicy; 2] = [AttackPolicy::All, AttackPolicy::FromSmallerPiecesOnly];

    #[test]
    fn attack_flags() {
        // white rook on d4 defended by a pawn and attacked by a black knight and bishop
        let pos = Position::from_fen("4k3/8/8/1b3n2/3R4/2P5/8/4K3 w - - 0 1").unwrap();
        let rook = 3 * 64 * 2 + 1 + 27;
        let base = HalfKP::make_index(Square::from_index(4), rook as u16);

        let all = active(&HalfKPE4::new(Side::Friend, AttackPolicy::All, AttackPolicy::All), &pos, Color::White);
        assert!(all.contains(&(3 * HalfKP::DIMENSIONS + base)));

        let ss = HalfKPE4::new(Side::Friend, AttackPolicy::FromSmallerPiecesOnly, AttackPolicy::FromSmallerPiecesOnly);
        assert!(active(&ss, &pos, Color::White).contains(&(3 * HalfKP::DIMENSIONS + base)));

        // a black queen alone does not count against a rook under the smaller-pieces policy
        let pos = Position::from_fen("4k3/8/8/8/3R2q1/8/8/4K3 w - - 0 1").unwrap();
        assert!(active(&ss, &pos, Color::White).contains(&base));
        let all = HalfKPE4::new(Side::Friend, AttackPolicy::All, AttackPolicy::All);
        assert!(active(&all, &pos, Color::White).contains(&(HalfKP::DIMENSIONS + base)));
    }

    #[test]
    fn diff_catches_attack_flips() {
        let mut pos = Position::startpos();
        for uci in ["e2e4", "d7d5", "e4d5", "g8f6", "f1b5", "c7c6", "d5c6", "b8c6", "g1f3", "c8g4"] {
            pos.make_uci(uci).unwrap();
            for own in POLICIES {
                for enemy in POLICIES {
                    check_diff(&HalfKPE4::new(Side::Friend, own, enemy), &pos);
                    check_diff(&HalfKPE4::new(Side::Enemy, own, enemy), &pos);
                }
            }
        }
    }
}
