use std::path::PathBuf;

use anyhow::Context;
use nnue_features::{arch, logger::ansi, training};
use structopt::StructOpt;

#[derive(StructOpt)]
pub struct InputsOptions {
    arch: String,
    #[structopt(required = true, short, long)]
    input: PathBuf,
    /// Number of positions to print.
    #[structopt(short, long, default_value = "8")]
    count: usize,
}

impl InputsOptions {
    pub fn run(&self) -> anyhow::Result<()> {
        let set = arch::by_name(&self.arch)?;
        let boards = training::read_chess_boards(&self.input)
            .with_context(|| format!("Failed to read {}", self.input.display()))?;

        println!("Positions              : {}", ansi(boards.len(), 31));

        for (n, packed) in boards.iter().take(self.count).enumerate() {
            let pos = training::position_from_chess_board(packed)
                .with_context(|| format!("Position {n} is not a valid board"))?;
            let [stm, nstm] = training::training_inputs(&set, packed)?;
            let (score, result) = training::targets(packed);

            println!("{n:>6} {} score {score} result {result}", pos.fen());
            println!("       stm  {:?}", stm.sorted());
            println!("       nstm {:?}", nstm.sorted());
        }

        Ok(())
    }
}
