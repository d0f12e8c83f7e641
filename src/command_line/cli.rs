#![allow(clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand, ValueEnum};
use fm_analyzer::analysis::core_and_dead_variables;
use fm_analyzer::config::{ExplanationConfig, MusConfig, OracleBudget, Phase, SamplingConfig};
use fm_analyzer::explain::{Explainable, ExplanationCreator};
use fm_analyzer::monitor::LogMonitor;
use fm_analyzer::sampling::{AllConfigurations, RandomSampler, Sample, TWiseSampler};
use fm_analyzer::sat::cnf::Cnf;
use fm_analyzer::sat::dimacs::{parse_file, write_dimacs};
use fm_analyzer::sat::dpll::DpllOracle;
use fm_analyzer::sat::literal::Variable;
use fm_analyzer::sat::slice::slice;
use fm_analyzer::sat::solver::{OracleStats, SatOracle, minimal_unsat_subsets};
use fm_analyzer::{Error, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface of the feature model analyser.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(name = "fm_analyzer", version, about = "Feature model analysis and t-wise sampling")]
pub(crate) struct Cli {
    /// An optional global path argument. If provided without a subcommand, the
    /// DIMACS file (or every `.dimacs`/`.cnf` file below the directory) is analysed.
    #[arg(global = true)]
    pub input: Option<PathBuf>,

    /// Specifies the subcommand to execute (`analyze`, `sample`, `slice`, `completions`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Report whether the model is void, its core and dead variables, and why each dead one is dead.
    Analyze {
        /// A DIMACS file or a directory of them.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate a configuration sample.
    Sample {
        /// A DIMACS file or a directory of them.
        #[arg(long)]
        path: PathBuf,

        /// The sampling algorithm.
        #[arg(short, long, default_value_t = Algorithm::Yasa)]
        algorithm: Algorithm,

        /// Interaction strength of the t-wise sampler.
        #[arg(short, long, default_value_t = 2)]
        t: usize,

        /// Number of passes of the t-wise sampler. More passes can shrink the sample.
        #[arg(short, long, default_value_t = 1)]
        m: usize,

        /// Maximum number of configurations. Required by the random sampler.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Seed of the random sampler.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Keep t-wise configurations partial instead of completing them.
        #[arg(long, default_value_t = false)]
        partial: bool,

        /// Comma separated features to sample over. The model is sliced down to them first.
        #[arg(short = 'f', long, value_delimiter = ',')]
        features: Vec<String>,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Project the model onto some of its features and write the result as DIMACS.
    Slice {
        /// A DIMACS file or a directory of them.
        #[arg(long)]
        path: PathBuf,

        /// Comma separated features to keep.
        #[arg(short = 'f', long, value_delimiter = ',', required = true)]
        features: Vec<String>,

        /// Output file. Standard output if absent; needs a single input file.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Algorithm {
    /// Greedy incremental t-wise sampling.
    Yasa,
    /// Seeded random valid configurations.
    Random,
    /// Every valid configuration (up to the limit).
    All,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yasa => write!(f, "yasa"),
            Self::Random => write!(f, "random"),
            Self::All => write!(f, "all"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum PhaseArg {
    #[default]
    Negative,
    Positive,
}

impl std::fmt::Display for PhaseArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Negative => write!(f, "negative"),
            Self::Positive => write!(f, "positive"),
        }
    }
}

impl From<PhaseArg> for Phase {
    fn from(value: PhaseArg) -> Self {
        match value {
            PhaseArg::Negative => Self::Negative,
            PhaseArg::Positive => Self::Positive,
        }
    }
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CommonOptions {
    /// Enable debug logging.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Enable printing of performance and problem statistics.
    #[arg(short, long, default_value_t = true)]
    pub(crate) stats: bool,

    /// Print every configuration of a sample and every explanation of an analysis.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print: bool,

    /// Wall-clock budget of a single oracle query, in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Decision budget of a single oracle query.
    #[arg(long)]
    max_decisions: Option<u64>,

    /// Polarity the oracle tries first.
    #[arg(long, default_value_t = PhaseArg::Negative)]
    phase: PhaseArg,
}

impl CommonOptions {
    fn oracle(&self, cnf: Cnf) -> DpllOracle {
        let budget = OracleBudget {
            timeout: self.timeout_ms.map(Duration::from_millis),
            max_decisions: self.max_decisions,
        };
        DpllOracle::with_config(cnf, budget, self.phase.into())
    }
}

/// What to do with every input file.
#[derive(Debug, Clone)]
pub(crate) enum Task {
    Analyze,
    Sample {
        algorithm: Algorithm,
        t: usize,
        m: usize,
        limit: Option<usize>,
        seed: u64,
        partial: bool,
        features: Vec<String>,
    },
    Slice {
        features: Vec<String>,
        output: Option<PathBuf>,
    },
}

/// Feature names of a `--features` list, trimmed and unquoted. Empty entries are dropped.
pub(crate) fn feature_filter(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|name| name.trim().trim_matches('"').trim().to_owned())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Runs `task` on the file at `path`, or on every DIMACS file below it if it is a directory.
///
/// # Errors
///
/// The first parse or analysis error.
pub(crate) fn run(path: &Path, task: &Task, common: &CommonOptions) -> Result<()> {
    if !path.is_dir() {
        return run_file(path, task, common);
    }
    if matches!(task, Task::Slice { output: Some(_), .. }) {
        return Err(Error::PreconditionViolation(
            "--output needs a single input file",
        ));
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }
        if file_path
            .extension()
            .is_none_or(|ext| ext != "dimacs" && ext != "cnf")
        {
            log::debug!("skipping non-DIMACS file {}", file_path.display());
            continue;
        }
        run_file(file_path, task, common)?;
    }
    Ok(())
}

fn run_file(path: &Path, task: &Task, common: &CommonOptions) -> Result<()> {
    let time = Instant::now();
    let cnf = parse_file(path)?;
    let parse_time = time.elapsed();
    if !matches!(task, Task::Slice { .. }) {
        println!("{}", path.display());
    }

    let _ = epoch::advance();
    let time = Instant::now();
    let oracle_stats = match task {
        Task::Analyze => analyze(&cnf, common)?,
        Task::Sample {
            algorithm,
            t,
            m,
            limit,
            seed,
            partial,
            features,
        } => {
            let sliced;
            let cnf = if features.is_empty() {
                &cnf
            } else {
                sliced = slice_features(&cnf, features)?;
                &sliced
            };
            let (sample, oracle_stats) =
                sample(cnf, *algorithm, *t, *m, *limit, *seed, *partial, common)?;
            report_sample(&sample, common.print);
            oracle_stats
        }
        Task::Slice { features, output } => {
            let sliced = slice_features(&cnf, features)?;
            return match output {
                Some(output) => write_dimacs(&sliced, BufWriter::new(File::create(output)?)),
                None => write_dimacs(&sliced, std::io::stdout().lock()),
            };
        }
    };
    let elapsed = time.elapsed();

    if common.stats {
        print_stats(parse_time, elapsed, &cnf, &oracle_stats);
    }
    Ok(())
}

/// Projects `cnf` onto the named features. Unknown names are skipped with a warning.
fn slice_features(cnf: &Cnf, features: &[String]) -> Result<Cnf> {
    let variables = cnf.variables();
    let mut keep: Vec<Variable> = Vec::new();
    for name in feature_filter(features) {
        match variables.get(&name) {
            Some(var) => keep.push(var),
            None => log::warn!("no feature named '{name}', ignoring it"),
        }
    }
    let monitor = LogMonitor::new("variables eliminated", 1000);
    let sliced = slice(cnf, &keep, &[], &monitor)?;
    log::info!(
        "sliced to {} variables and {} clauses",
        sliced.num_vars(),
        sliced.clause_count()
    );
    Ok(sliced)
}

fn analyze(cnf: &Cnf, common: &CommonOptions) -> Result<OracleStats> {
    let mut oracle = common.oracle(cnf.clone());
    let monitor = LogMonitor::new("variables decided", 1000);
    let Some((core, dead)) = core_and_dead_variables(&mut oracle, &monitor)? else {
        println!("VOID");
        if common.print {
            for (i, mus) in minimal_unsat_subsets(&mut oracle, &[], &MusConfig::default())?
                .iter()
                .enumerate()
            {
                println!("conflict {}:", i + 1);
                for &ci in mus {
                    println!("  {}", cnf.clauses()[ci]);
                }
            }
        }
        return Ok(oracle.stats());
    };

    let variables = cnf.variables();
    let names = |vars: &[u32]| -> String {
        vars.iter()
            .map(|&v| variables.name(v).map_or_else(|| v.to_string(), str::to_owned))
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("core ({}): {}", core.len(), names(&core));
    println!("dead ({}): {}", dead.len(), names(&dead));

    if common.print {
        let mut creator = ExplanationCreator::new(cnf, &[], ExplanationConfig::default());
        for &var in &dead {
            creator.set_subject(Explainable::DeadFeature(var));
            match creator.explanation()? {
                Some(explanation) => {
                    println!("{}:", names(&[var]));
                    print!("{}", explanation.describe(variables));
                }
                None => println!("{}: no explanation by unit propagation", names(&[var])),
            }
        }
    }
    Ok(oracle.stats())
}

#[allow(clippy::too_many_arguments)]
fn sample(
    cnf: &Cnf,
    algorithm: Algorithm,
    t: usize,
    m: usize,
    limit: Option<usize>,
    seed: u64,
    partial: bool,
    common: &CommonOptions,
) -> Result<(Sample, OracleStats)> {
    let monitor = LogMonitor::new("tuples processed", 10_000);
    let oracle = common.oracle(cnf.clone());
    match algorithm {
        Algorithm::Yasa => {
            let config = SamplingConfig {
                t,
                iterations: m,
                limit,
                complete: !partial,
                use_graph_filter: false,
            };
            let mut sampler = TWiseSampler::new(oracle, config);
            let sample = sampler.sample(&monitor)?;
            Ok((sample, sampler.oracle().stats()))
        }
        Algorithm::Random => {
            let limit = limit.ok_or(Error::PreconditionViolation(
                "the random sampler needs --limit",
            ))?;
            let sample = RandomSampler::new(oracle, limit, seed).sample(&monitor)?;
            let stats = OracleStats {
                queries: sample.metadata().oracle_calls,
                ..OracleStats::default()
            };
            Ok((sample, stats))
        }
        Algorithm::All => {
            let sample = AllConfigurations::new(oracle, limit).sample(&monitor)?;
            let stats = OracleStats {
                queries: sample.metadata().oracle_calls,
                ..OracleStats::default()
            };
            Ok((sample, stats))
        }
    }
}

fn report_sample(sample: &Sample, print: bool) {
    let metadata = sample.metadata();
    println!("configurations: {}", sample.len());
    println!("{metadata}");
    println!(
        "infeasible tuple ratio: {:.4}",
        metadata.infeasible_ratio()
    );
    if print {
        for (i, config) in sample.iter().enumerate() {
            println!("{i}: {config}");
        }
    }
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: u64, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and oracle statistics, with jemalloc memory figures.
pub(crate) fn print_stats(parse_time: Duration, elapsed: Duration, cnf: &Cnf, s: &OracleStats) {
    let elapsed_secs = elapsed.as_secs_f64();
    let _ = epoch::advance();
    let mib = |bytes: Option<usize>| bytes.map_or(0.0, |b| b as f64 / (1024.0 * 1024.0));
    let allocated = mib(stats::allocated::read().ok());
    let resident = mib(stats::resident::read().ok());

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars());
    stat_line("Clauses", cnf.clause_count());
    stat_line(
        "Literals",
        cnf.iter().map(fm_analyzer::sat::clause::Clause::len).sum::<usize>(),
    );

    println!("========================[ Oracle Statistics ]=========================");
    stat_line_with_rate("Queries", s.queries, elapsed_secs);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}
