use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};

mod anonymize;
mod archive;
mod commands;
mod compile_check;
mod report;
mod toolchain;
mod types;
mod walker;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: SubCommand,
}

#[derive(Debug, Subcommand)]
enum SubCommand {
    /// Compile-check every student's submissions and write a CSV report
    Check {
        /// Zipped submission tree, or a directory of student folders
        submissions: PathBuf,
        /// Check every submission attempt instead of only the final one
        #[arg(short, long)]
        all: bool,
        /// Worker threads used to check students
        #[arg(short, long, default_value_t = 4)]
        jobs: usize,
    },
    /// Replace student folder names with random Student NNNNN labels and
    /// repackage the tree
    Anonymize {
        /// Zipped submission tree, or a directory of student folders
        submissions: PathBuf,
    },
}

fn main() -> ExitCode {
    let start = Instant::now();
    let cli = Args::parse();

    let ok = match cli.command {
        SubCommand::Check {
            submissions,
            all,
            jobs,
        } => commands::check(
            &submissions,
            Path::new("."),
            &toolchain::Toolchain::cpp17(),
            all,
            jobs,
        ),
        SubCommand::Anonymize { submissions } => commands::anonymize(&submissions),
    };
    if !ok {
        return ExitCode::FAILURE;
    }

    println!("Finished! Total runtime was {:.2?}", start.elapsed());
    ExitCode::SUCCESS
}
