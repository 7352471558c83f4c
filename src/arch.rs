//! Named input architectures, each the feature set of one network family.

use crate::{
    error::FeatureError,
    feature_set::{FeatureSet, FeatureSetSettings, RefreshPolicy},
    features::{AttackPolicy, BucketedHalfKP, Feature, FeatureType, HalfKP, HalfKPE4, HalfKPKingLine, KingLine, Mobility, Pawn, Side, KK, PP},
};

/// Every name [`by_name`] accepts.
pub const ARCHITECTURES: [&str; 8] = [
    "halfkp",
    "halfkp_gameply40x4",
    "halfkp_piececount",
    "halfkpe4ss",
    "halfkp_mobility_pawn",
    "halfkp_kk_pp",
    "halfkpkrank",
    "halfkpkfile",
];

fn preset(members: Vec<Feature>) -> FeatureSet {
    let capacity = members.iter().map(FeatureType::max_active).sum();
    let settings = FeatureSetSettings { capacity, refresh_policy: RefreshPolicy::PerFeature };

    match FeatureSet::new(members, settings) {
        Ok(set) => set,
        Err(err) => unreachable!("presets are never empty and sized exactly: {err}"),
    }
}

pub fn halfkp() -> FeatureSet {
    preset(vec![HalfKP::new(Side::Friend).into()])
}

pub fn halfkp_gameply40x4() -> FeatureSet {
    preset(vec![BucketedHalfKP::game_ply(Side::Friend).into()])
}

pub fn halfkp_piececount() -> FeatureSet {
    preset(vec![BucketedHalfKP::piece_count(Side::Friend).into()])
}

pub fn halfkpe4ss() -> FeatureSet {
    let policy = AttackPolicy::FromSmallerPiecesOnly;
    preset(vec![HalfKPE4::new(Side::Friend, policy, policy).into()])
}

pub fn halfkp_mobility_pawn() -> FeatureSet {
    preset(vec![HalfKP::new(Side::Friend).into(), Mobility.into(), Pawn.into()])
}

pub fn halfkp_kk_pp() -> FeatureSet {
    preset(vec![HalfKP::new(Side::Friend).into(), KK.into(), PP.into()])
}

pub fn by_name(name: &str) -> Result<FeatureSet, FeatureError> {
    let set = match name.to_lowercase().replace('-', "_").as_str() {
        "halfkp" => halfkp(),
        "halfkp_gameply40x4" => halfkp_gameply40x4(),
        "halfkp_piececount" => halfkp_piececount(),
        "halfkpe4ss" => halfkpe4ss(),
        "halfkp_mobility_pawn" => halfkp_mobility_pawn(),
        "halfkp_kk_pp" => halfkp_kk_pp(),
        "halfkpkrank" => preset(vec![HalfKPKingLine::new(Side::Friend, KingLine::Rank).into()]),
        "halfkpkfile" => preset(vec![HalfKPKingLine::new(Side::Friend, KingLine::File).into()]),
        _ => return Err(FeatureError::UnknownArch(name.to_string())),
    };

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_resolves() {
        for name in ARCHITECTURES {
            let set = by_name(name).unwrap();
            assert_eq!(set.settings().capacity, set.max_active());
        }

        assert_eq!(by_name("HalfKP-Mobility-Pawn").unwrap(), halfkp_mobility_pawn());
        assert_eq!(by_name("halfka"), Err(FeatureError::UnknownArch("halfka".to_string())));
    }

    #[test]
    fn sizes() {
        assert_eq!(halfkp().dimensions(), 41024);
        assert_eq!(halfkp_gameply40x4().dimensions(), 4 * 41024);
        assert_eq!(halfkpe4ss().dimensions(), 4 * 41024);
        assert_eq!(halfkp_mobility_pawn().dimensions(), 41024 + 232 + 16392);
        assert_eq!(halfkp_mobility_pawn().max_active(), 30 + 8 + 8);
        assert_eq!(halfkp_kk_pp().max_active(), 30 + 1 + 435);
    }

    #[test]
    fn hashes_differ() {
        let hashes: Vec<_> = ARCHITECTURES.iter().map(|name| by_name(name).unwrap().hash()).collect();
        for (i, a) in hashes.iter().enumerate() {
            assert!(hashes[i + 1..].iter().all(|b| a != b));
        }

        assert_eq!(halfkp().hash(), 0x5D69_D5B8);
    }
}
