mod describe;
mod features;
mod inputs;
mod verify;

use structopt::StructOpt;

#[derive(StructOpt)]
pub enum Options {
    /// Print the layout of an architecture and its factorizers.
    Describe(describe::DescribeOptions),
    /// Print the active indices of a position.
    Features(features::FeaturesOptions),
    /// Print the training inputs of a file of packed positions.
    Inputs(inputs::InputsOptions),
    /// Check incremental updates against full recomputes over random games.
    Verify(verify::VerifyOptions),
}

fn main() -> anyhow::Result<()> {
    match Options::from_args() {
        Options::Describe(options) => options.run(),
        Options::Features(options) => options.run(),
        Options::Inputs(options) => options.run(),
        Options::Verify(options) => options.run(),
    }
}
