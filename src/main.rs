//! # fm_analyzer
//!
//! `fm_analyzer` is a command-line front end for the feature model analysis
//! library. It reads feature models exported as DIMACS CNF, where comment lines
//! of the form `c <index> <name>` name the variables after their features.
//!
//! ## Usage
//!
//! ```sh
//! fm_analyzer [GLOBAL_OPTIONS] [SUBCOMMAND]
//! ```
//!
//! A path given without a subcommand is analysed.
//!
//! ### Subcommands
//!
//! 1.  **`analyze`**: void check, core and dead variables, and with `--print` an
//!     explanation for every dead variable.
//!     ```sh
//!     fm_analyzer analyze --path model.dimacs --print
//!     ```
//!
//! 2.  **`sample`**: build a configuration sample.
//!     ```sh
//!     fm_analyzer sample --path model.dimacs -t 2 -m 3
//!     fm_analyzer sample --path model.dimacs --algorithm random --limit 50 --seed 7
//!     fm_analyzer sample --path models/ --algorithm all --limit 1000
//!     fm_analyzer sample --path model.dimacs --features Root,Logging,Encryption
//!     ```
//!     `--features` slices the model down to the listed features before sampling.
//!
//! 3.  **`slice`**: project the model onto some features and write it as DIMACS.
//!     ```sh
//!     fm_analyzer slice --path model.dimacs --features Root,Logging -o sliced.dimacs
//!     ```
//!
//! 4.  **`completions`**: print a shell completion script.
//!
//! A directory path processes every `.dimacs` and `.cnf` file below it.
//!
//! ### Common options
//!
//! -   `-d, --debug`: debug logging.
//! -   `-s, --stats`: statistics table (default: `true`).
//! -   `-p, --print`: print configurations and explanations.
//! -   `--timeout-ms`, `--max-decisions`: budget of every oracle query.
//! -   `--phase negative|positive`: polarity the oracle tries first.

use clap::{CommandFactory, Parser};
use command_line::cli::{Cli, Commands, CommonOptions, Task, run};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

mod command_line;

/// Global allocator using `tikv-jemallocator`, which also provides the memory
/// figures of the statistics table.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_logging(common: &CommonOptions) {
    let level = if common.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn main() {
    let cli = Cli::parse();

    let (path, task, common) = match cli.command {
        Some(Commands::Analyze { path, common }) => (path, Task::Analyze, common),
        Some(Commands::Sample {
            path,
            algorithm,
            t,
            m,
            limit,
            seed,
            partial,
            features,
            common,
        }) => (
            path,
            Task::Sample {
                algorithm,
                t,
                m,
                limit,
                seed,
                partial,
                features,
            },
            common,
        ),
        Some(Commands::Slice {
            path,
            features,
            output,
            common,
        }) => (path, Task::Slice { features, output }, common),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            return;
        }
        None => {
            let Some(path) = cli.input else {
                eprintln!("No command provided. Use --help for more information.");
                std::process::exit(1);
            };
            (path, Task::Analyze, cli.common)
        }
    };

    init_logging(&common);
    if let Err(e) = run(&path, &task, &common) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
