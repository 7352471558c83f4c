use anyhow::Context;
use nnue_features::{arch, logger::ansi, Color, FeatureSet, FeatureType, IndexList, Position, Update};
use structopt::StructOpt;

#[derive(StructOpt)]
pub struct FeaturesOptions {
    arch: String,
    #[structopt(short, long, default_value = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")]
    fen: String,
    /// Moves in UCI notation played from the FEN, the last one is shown as an update.
    #[structopt(short, long)]
    moves: Vec<String>,
}

impl FeaturesOptions {
    pub fn run(&self) -> anyhow::Result<()> {
        let set = arch::by_name(&self.arch)?;
        let mut pos = Position::from_fen(&self.fen).with_context(|| format!("Invalid FEN: {}", self.fen))?;

        for uci in &self.moves {
            pos.make_uci(uci)?;
        }

        println!("Position               : {}", ansi(pos.fen(), "32;1"));

        for perspective in Color::ALL {
            let active = set.active(pos.current(), perspective);
            println!("{perspective:?} ({} active)", ansi(active.len(), 31));
            print_indices(&set, &active);

            if pos.previous().is_some() {
                match set.update(&pos, perspective) {
                    Update::Refresh => println!("  last move: {}", ansi("refresh", 35)),
                    Update::Incremental { removed, added, refreshed } => {
                        println!("  last move: {} members recomputed", ansi(refreshed, 35));
                        println!("  removed:");
                        print_indices(&set, &removed);
                        println!("  added:");
                        print_indices(&set, &added);
                    }
                }
            }
        }

        Ok(())
    }
}

fn print_indices(set: &FeatureSet, list: &IndexList) {
    for idx in list.sorted() {
        if let Some((member, local)) = set.member_of(idx) {
            println!("    {idx:>8} {:<24} {local}", member.name());
        }
    }
}
