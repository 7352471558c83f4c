//! Training-time expansion of a feature into correlated, lower dimensional factors.
//!
//! Every base index is projected onto each factor of its tree. The factor
//! weights are trained alongside the base weights and folded back into
//! them with [`Factorizer::merge`] before the network is used for inference.

use crate::{
    chess::Square,
    error::FeatureError,
    features::{Feature, FeatureType, HalfKP, HalfRelativeKP, PawnElement, PawnFlag, PP},
    logger::ansi,
    psq::PS_END,
};

/// One projection of a base index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Factor {
    /// The base feature itself.
    Base(Feature),
    /// The king-relative part of a bucketed, flagged or king-line index.
    HalfKP,
    /// The anchor king square alone.
    HalfK,
    /// The piece-square code alone.
    P,
    HalfRelativeKP,
    /// The larger code of a piece pair.
    PairMax,
    /// The smaller code of a piece pair.
    PairMin,
    PawnElement(PawnElement),
}

impl Factor {
    pub fn name(&self) -> String {
        match self {
            Factor::Base(feature) => feature.name(),
            Factor::HalfKP => "HalfKP".to_string(),
            Factor::HalfK => "HalfK".to_string(),
            Factor::P => "P".to_string(),
            Factor::HalfRelativeKP => "HalfRelativeKP".to_string(),
            Factor::PairMax => "P(max)".to_string(),
            Factor::PairMin => "P(min)".to_string(),
            Factor::PawnElement(element) => element.name(),
        }
    }

    pub fn dimensions(&self) -> usize {
        match self {
            Factor::Base(feature) => feature.dimensions(),
            Factor::HalfKP => HalfKP::DIMENSIONS,
            Factor::HalfK => 64,
            Factor::P | Factor::PairMax | Factor::PairMin => PS_END,
            Factor::HalfRelativeKP => HalfRelativeKP::DIMENSIONS,
            Factor::PawnElement(_) => PawnElement::DIMENSIONS,
        }
    }

    /// Index of `base` within this factor's own range, `None` if the factor
    /// has nothing to say about it.
    pub fn project(&self, base: usize) -> Option<usize> {
        let king_relative = base % HalfKP::DIMENSIONS;
        let (ksq, code) = (king_relative / PS_END, king_relative % PS_END);

        match self {
            Factor::Base(_) => Some(base),
            Factor::HalfKP => Some(king_relative),
            Factor::HalfK => Some(ksq),
            Factor::P => (code != 0).then_some(code),
            Factor::HalfRelativeKP => {
                (code != 0).then(|| HalfRelativeKP::make_index(Square::from_index(ksq), code as u16))
            }
            Factor::PairMax => Some(PP::split_index(base).0),
            Factor::PairMin => Some(PP::split_index(base).1),
            Factor::PawnElement(element) => Some(element.project(base)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Level {
    pub factor: Factor,
    /// Levels that are not inherited take no part in training.
    pub inherited: bool,
}

impl Level {
    fn new(factor: Factor) -> Self {
        Self { factor, inherited: true }
    }

    fn skipped(factor: Factor) -> Self {
        Self { factor, inherited: false }
    }

    fn dimensions(&self) -> usize {
        if self.inherited {
            self.factor.dimensions()
        } else {
            0
        }
    }
}

/// A single active input of the expanded training space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrainingFeature {
    /// Position of the producing level in [`Factorizer::levels`].
    pub level: usize,
    /// Index already offset into the training space.
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Factorizer {
    base: Feature,
    levels: Vec<Level>,
}

impl Factorizer {
    pub fn new(base: Feature) -> Self {
        let king_relative = [Level::skipped(Factor::HalfK), Level::new(Factor::P), Level::new(Factor::HalfRelativeKP)];

        let mut levels = vec![Level::new(Factor::Base(base))];
        match base {
            Feature::HalfKP(_) => levels.extend(king_relative),
            Feature::Bucketed(_) | Feature::KingLine(_) | Feature::HalfKPE4(_) => {
                levels.push(Level::new(Factor::HalfKP));
                levels.extend(king_relative);
            }
            Feature::PP(_) => levels.extend([Level::new(Factor::PairMax), Level::new(Factor::PairMin)]),
            Feature::Pawn(_) => {
                levels.extend(PawnFlag::ALL.map(|flag| Level::new(Factor::PawnElement(PawnElement::new(flag)))))
            }
            _ => {}
        }

        Self { base, levels }
    }

    pub fn base(&self) -> Feature {
        self.base
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Size of the training input space.
    pub fn dimensions(&self) -> usize {
        self.levels.iter().map(Level::dimensions).sum()
    }

    /// Upper bound on training features per active base feature.
    pub fn features_per_base(&self) -> usize {
        self.levels.iter().filter(|level| level.inherited).count()
    }

    pub fn append_training_features(&self, base: usize, features: &mut Vec<TrainingFeature>) {
        debug_assert!(base < self.base.dimensions(), "Base index {base} out of range!");

        let mut offset = 0;
        for (level, entry) in self.levels.iter().enumerate() {
            if !entry.inherited {
                continue;
            }

            if let Some(index) = entry.factor.project(base) {
                debug_assert!(index < entry.factor.dimensions(), "{} index {index} out of range!", entry.factor.name());
                features.push(TrainingFeature { level, index: offset + index });
            }

            offset += entry.factor.dimensions();
        }

        assert_eq!(offset, self.dimensions());
    }

    pub fn training_features(&self, base: usize) -> Vec<TrainingFeature> {
        let mut features = Vec::with_capacity(self.features_per_base());
        self.append_training_features(base, &mut features);
        features
    }

    /// Folds trained factor weights into the base weights.
    ///
    /// Weights are laid out row-major, one row of equal length per training input.
    pub fn merge(&self, unmerged: &[f32]) -> Result<Vec<f32>, FeatureError> {
        let src_size = self.dimensions();
        if unmerged.is_empty() || unmerged.len() % src_size != 0 {
            return Err(FeatureError::WeightShape { len: unmerged.len(), dimensions: src_size });
        }

        let layer_size = unmerged.len() / src_size;
        let base_size = self.base.dimensions();
        let mut merged = vec![0.0; base_size * layer_size];
        let mut features = Vec::with_capacity(self.features_per_base());

        for (feat, row) in merged.chunks_exact_mut(layer_size).enumerate() {
            features.clear();
            self.append_training_features(feat, &mut features);

            for training in &features {
                let src = &unmerged[layer_size * training.index..layer_size * (training.index + 1)];
                for (dst, &weight) in row.iter_mut().zip(src) {
                    *dst += weight;
                }
            }
        }

        Ok(merged)
    }

    pub fn display(&self) {
        println!("Factorizer             : {}", ansi(self.base.name(), "32;1"));

        for level in &self.levels {
            let size = if level.inherited { ansi(level.factor.dimensions(), 31) } else { "not inherited".to_string() };
            println!("  {:<21}: {size}", level.factor.name());
        }

        println!("Training Dimensions    : {}", ansi(self.dimensions(), 31));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{BucketedHalfKP, Pawn, Side, KK};

    const HALFKP_TRAINING: usize = HalfKP::DIMENSIONS + PS_END + HalfRelativeKP::DIMENSIONS;

    #[test]
    fn halfkp_tree() {
        let factorizer = Factorizer::new(HalfKP::new(Side::Friend).into());
        assert_eq!(factorizer.dimensions(), HALFKP_TRAINING);
        assert_eq!(factorizer.levels().len(), 4);

        // friend pawn on e2 with the king on e1
        let features = factorizer.training_features(PS_END * 4 + 13);
        assert_eq!(
            features,
            vec![
                TrainingFeature { level: 0, index: PS_END * 4 + 13 },
                TrainingFeature { level: 2, index: HalfKP::DIMENSIONS + 13 },
                TrainingFeature { level: 3, index: HalfKP::DIMENSIONS + PS_END + 15 * 7 + 8 },
            ]
        );
    }

    #[test]
    fn bucketed_inherits_halfkp() {
        let factorizer = Factorizer::new(BucketedHalfKP::game_ply(Side::Friend).into());
        let base_dims = 4 * HalfKP::DIMENSIONS;
        assert_eq!(factorizer.dimensions(), base_dims + HALFKP_TRAINING);

        let features = factorizer.training_features(3 * HalfKP::DIMENSIONS + 100);
        assert_eq!(features[1], TrainingFeature { level: 1, index: base_dims + 100 });
        assert_eq!(features.len(), 4);
    }

    #[test]
    fn pp_pairs() {
        let factorizer = Factorizer::new(PP.into());
        let features = factorizer.training_features(PP::make_index(300, 17));
        assert_eq!(features[1].index, PP::DIMENSIONS + 300);
        assert_eq!(features[2].index, PP::DIMENSIONS + PS_END + 17);
    }

    #[test]
    fn pawn_elements() {
        let factorizer = Factorizer::new(Pawn.into());
        assert_eq!(factorizer.dimensions(), Pawn::DIMENSIONS + 11 * PawnElement::DIMENSIONS);

        // second pawn missing
        let features = factorizer.training_features(Pawn::make_index(1, None));
        assert_eq!(features.len(), 12);
        for (n, training) in features[1..].iter().enumerate() {
            assert_eq!(training.index, Pawn::DIMENSIONS + n * PawnElement::DIMENSIONS + 3);
        }

        // only passed
        let bits = 1 << PawnFlag::Passed.bit();
        let features = factorizer.training_features(Pawn::make_index(0, Some(bits)));
        let passed = Pawn::DIMENSIONS + 9 * PawnElement::DIMENSIONS + 2;
        let doubled = Pawn::DIMENSIONS + 10 * PawnElement::DIMENSIONS + 1;
        assert_eq!(features[10].index, passed);
        assert_eq!(features[11].index, doubled);
    }

    #[test]
    fn empty_code_only_feeds_king_factors() {
        let factorizer = Factorizer::new(HalfKP::new(Side::Friend).into());
        assert_eq!(factorizer.training_features(PS_END * 7).len(), 1);
    }

    #[test]
    fn every_index_stays_in_range() {
        for base in [Feature::from(KK), PP.into(), Pawn.into(), HalfKP::new(Side::Enemy).into()] {
            let factorizer = Factorizer::new(base);
            for idx in (0..base.dimensions()).step_by(97) {
                for training in factorizer.training_features(idx) {
                    assert!(training.index < factorizer.dimensions());
                }
            }
        }
    }

    #[test]
    fn merge_folds_factors() {
        let factorizer = Factorizer::new(HalfKP::new(Side::Friend).into());
        let mut weights = vec![0.0; 2 * factorizer.dimensions()];

        let e1_e2 = PS_END * 4 + 13;
        let relative = HalfKP::DIMENSIONS + PS_END + 15 * 7 + 8;
        weights[2 * e1_e2 + 1] = 1.0;
        weights[2 * (HalfKP::DIMENSIONS + 13) + 1] = 2.0;
        weights[2 * relative + 1] = 4.0;

        let merged = factorizer.merge(&weights).unwrap();
        assert_eq!(merged.len(), 2 * HalfKP::DIMENSIONS);
        assert_eq!(merged[2 * e1_e2], 0.0);
        assert_eq!(merged[2 * e1_e2 + 1], 7.0);

        // same pawn with the king on f1 only shares the piece factor
        let f1_e2 = PS_END * 5 + 13;
        assert_eq!(merged[2 * f1_e2 + 1], 2.0);

        assert_eq!(
            factorizer.merge(&weights[1..]),
            Err(FeatureError::WeightShape { len: weights.len() - 1, dimensions: factorizer.dimensions() })
        );
    }
}
