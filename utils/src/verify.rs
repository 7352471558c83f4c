use std::time::Instant;

use anyhow::bail;
use nnue_features::{arch, logger, ActiveIndices, FeatureSet, FeatureSetSettings, Position, RefreshPolicy};
use rand::{rngs::StdRng, Rng, SeedableRng};
use structopt::StructOpt;

#[derive(StructOpt)]
pub struct VerifyOptions {
    arch: String,
    #[structopt(short, long, default_value = "100")]
    games: usize,
    #[structopt(short, long, default_value = "200")]
    plies: usize,
    #[structopt(short, long, default_value = "0")]
    seed: u64,
    /// Refresh the whole set when any member cannot be diffed.
    #[structopt(long)]
    whole_set: bool,
}

impl VerifyOptions {
    pub fn run(&self) -> anyhow::Result<()> {
        let preset = arch::by_name(&self.arch)?;
        let refresh_policy = if self.whole_set { RefreshPolicy::WholeSet } else { RefreshPolicy::PerFeature };
        let settings = FeatureSetSettings { refresh_policy, ..preset.settings() };
        let set = FeatureSet::new(preset.members().to_vec(), settings)?;

        set.display();
        println!();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let timer = Instant::now();
        let (mut transitions, mut refreshes) = (0, 0);

        for game in 1..=self.games {
            let mut pos = Position::startpos();
            let mut tracker = ActiveIndices::new(&set, &pos);

            for _ in 0..self.plies {
                let roll = rng.gen_range(0..100);

                if roll < 5 && pos.generation() > 0 {
                    pos.unmake_move()?;
                    tracker.pop();
                    continue;
                }

                if roll < 10 && !pos.board().in_check() {
                    pos.make_null_move();
                } else {
                    let moves = pos.legal_moves();
                    if moves.is_empty() {
                        break;
                    }

                    pos.make_move(moves[rng.gen_range(0..moves.len())]);
                }

                tracker.push(&pos);
                if !tracker.matches(&pos) {
                    println!();
                    bail!("Incremental update diverged in game {game} at {}", pos.fen());
                }
            }

            transitions += tracker.transitions();
            refreshes += tracker.refreshes();
            logger::report_verify_progress(game, self.games, transitions, refreshes);
        }

        println!();
        logger::report_verify_finished(self.games, transitions, refreshes, timer.elapsed().as_secs_f32());

        Ok(())
    }
}
