use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = depsweep::cli::Cli::parse();
    depsweep::init(cli.verbose);

    depsweep::cli::run(cli)
}
