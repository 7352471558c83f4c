use anyhow::Context;
use nnue_features::{arch, logger, Factorizer};
use structopt::StructOpt;

#[derive(StructOpt)]
pub struct DescribeOptions {
    arch: String,
    /// Also print the factor tree of every member.
    #[structopt(short, long)]
    factors: bool,
    /// Colour-blind friendly highlighting.
    #[structopt(long)]
    cbcs: bool,
}

impl DescribeOptions {
    pub fn run(&self) -> anyhow::Result<()> {
        logger::set_cbcs(self.cbcs);
        let set = arch::by_name(&self.arch).with_context(|| format!("Supported: {}", arch::ARCHITECTURES.join(", ")))?;

        set.display();

        if self.factors {
            for &member in set.members() {
                println!();
                Factorizer::new(member).display();
            }
        }

        logger::clear_colours();
        Ok(())
    }
}
