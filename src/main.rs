use clap::Parser;
use stratlab::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
