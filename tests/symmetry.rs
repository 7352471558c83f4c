use nnue_features::{
    arch,
    features::{
        AttackPolicy, BucketedHalfKP, CastlingRight, HalfKPE4, HalfKPKingLine, HalfRelativeKP, KingLine, Mobility,
        Pawn, Side, KK, P, PP,
    },
    Color, FeatureSet, Position, RefreshPolicy,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Board part of `fen` with fixed state fields, so both sides of a pair share a bucket.
fn normalised(placement: &str, stm: &str) -> String {
    format!("{placement} {stm} - - 0 10")
}

/// Rotates the board by 180 degrees and swaps the colours.
fn mirrored(fen: &str) -> (String, String) {
    let mut fields = fen.split_whitespace();
    let placement = fields.next().unwrap();
    let stm = fields.next().unwrap();

    let flipped: String = placement
        .chars()
        .rev()
        .map(|c| if c.is_ascii_uppercase() { c.to_ascii_lowercase() } else { c.to_ascii_uppercase() })
        .collect();
    let other = if stm == "w" { "b" } else { "w" };

    (normalised(placement, stm), normalised(&flipped, other))
}

fn random_positions(seed: u64, count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pos = Position::startpos();
    let mut fens = Vec::with_capacity(count);

    while fens.len() < count {
        let moves = pos.legal_moves();
        if moves.is_empty() {
            pos = Position::startpos();
            continue;
        }

        pos.make_move(moves[rng.gen_range(0..moves.len())]);
        if pos.generation() % 3 == 0 {
            fens.push(pos.fen());
        }
    }

    fens
}

fn assert_symmetric(set: &FeatureSet, fens: &[String]) {
    for fen in fens {
        let (original, mirror) = mirrored(fen);
        let a = Position::from_fen(&original).unwrap();
        let b = Position::from_fen(&mirror).unwrap();

        for perspective in Color::ALL {
            assert_eq!(
                set.active(a.current(), perspective).sorted(),
                set.active(b.current(), !perspective).sorted(),
                "{} differs between {original} and {mirror}",
                set.name(),
            );
        }
    }
}

#[test]
fn mirror_of_startpos() {
    let (original, mirror) = mirrored("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    assert_eq!(original, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 10");
    assert_eq!(mirror, "rnbkqbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKQBNR b - - 0 10");
}

#[test]
fn architectures_are_colour_symmetric() {
    let fens = random_positions(7, 40);
    for name in arch::ARCHITECTURES {
        assert_symmetric(&arch::by_name(name).unwrap(), &fens);
    }
}

#[test]
fn features_are_colour_symmetric() {
    let fens = random_positions(11, 40);

    let set = FeatureSet::exact(
        vec![
            BucketedHalfKP::piece_count(Side::Enemy).into(),
            HalfKPKingLine::new(Side::Enemy, KingLine::File).into(),
            HalfKPE4::new(Side::Enemy, AttackPolicy::All, AttackPolicy::FromSmallerPiecesOnly).into(),
            HalfRelativeKP::new(Side::Friend).into(),
            HalfRelativeKP::new(Side::Enemy).into(),
            P.into(),
            KK.into(),
            PP.into(),
            Mobility.into(),
            Pawn.into(),
            CastlingRight.into(),
        ],
        RefreshPolicy::PerFeature,
    )
    .unwrap();

    assert_symmetric(&set, &fens);
}
