use clap::Parser;
use clibate_cli::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();
    std::process::exit(cli::run(&cli));
}
