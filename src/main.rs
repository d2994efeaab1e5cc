use clap::Parser;
use diptrader::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
