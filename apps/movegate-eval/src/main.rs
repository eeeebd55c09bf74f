use clap::Parser;

use movegate_eval::Args;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	movegate_eval::run(args)
}
