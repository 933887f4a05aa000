mod analyzer;
mod cli;
mod config;
mod csv_io;
mod error;
mod git;
mod identity;
mod pipeline;
mod report;
mod tree;

use clap::{CommandFactory, Parser};

use cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Report(args) => {
            if let Err(err) = pipeline::run(&args.options(), args.json) {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "om", &mut std::io::stdout());
        }
    }
}
