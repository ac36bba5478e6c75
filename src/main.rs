use std::process;

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use reinv::config::{
    DEFAULT_CONTINUE_PROBABILITY, DEFAULT_MAX_ATTEMPTS, DEFAULT_REPEAT_CAP, GeneratorConfig,
};
use reinv::selfcheck::{self, SAMPLE_PATTERNS};
use reinv::trace::{PrintTracer, Verbosity};
use reinv::{InverseRegex, Regex};

#[derive(Parser)]
#[command(name = "reinv", version, about = "Random strings that match a regular expression")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate strings matching a pattern
    Gen(GenArgs),

    /// Check whether an input fully matches a pattern
    Check(CheckArgs),

    /// Generate samples for the built-in pattern battery
    Selfcheck(SelfcheckArgs),
}

#[derive(Args)]
struct GenArgs {
    /// Pattern to generate matches for
    pattern: String,

    /// Number of strings to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Report attempts on stderr (-v for every candidate)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    tuning: TuningArgs,
}

#[derive(Args)]
struct CheckArgs {
    pattern: String,
    input: String,
}

#[derive(Args)]
struct SelfcheckArgs {
    /// Strings generated per pattern
    #[arg(long, default_value_t = 5)]
    samples: usize,

    #[command(flatten)]
    tuning: TuningArgs,
}

#[derive(Args)]
struct TuningArgs {
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Generate-then-verify cycles before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: usize,

    /// Iteration ceiling for `*`, `+` and `{n,}`
    #[arg(long, default_value_t = DEFAULT_REPEAT_CAP)]
    repeat_cap: u32,

    /// Chance of one more repetition once the minimum is reached
    #[arg(long, default_value_t = DEFAULT_CONTINUE_PROBABILITY)]
    continue_probability: f64,
}

impl TuningArgs {
    fn config(&self) -> GeneratorConfig {
        GeneratorConfig {
            continue_probability: self.continue_probability,
            max_attempts: self.max_attempts,
            repeat_cap: self.repeat_cap,
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn run_gen(args: GenArgs) {
    let inv = InverseRegex::with_config(&args.pattern, args.tuning.config())
        .unwrap_or_else(|e| fail(e));
    let mut rng = args.tuning.rng();
    let verbosity = if args.verbose > 0 {
        Verbosity::Verbose
    } else {
        Verbosity::Default
    };
    for _ in 0..args.count {
        let generated = if args.verbose > 0 {
            inv.generate_traced(&mut rng, &mut PrintTracer::stderr(verbosity))
        } else {
            inv.generate(&mut rng)
        };
        match generated {
            Ok(s) => println!("{s}"),
            Err(e) => fail(e),
        }
    }
}

fn run_check(args: CheckArgs) {
    let re = Regex::new(&args.pattern).unwrap_or_else(|e| fail(e));
    let Some(result) = re.captures(&args.input) else {
        println!("NO_MATCH");
        return;
    };
    println!("MATCH:{}", args.input);
    for i in 1..=re.pattern().group_count {
        match result.group(i) {
            Some((s, e)) => {
                let group_text: String = args.input.chars().skip(s).take(e - s).collect();
                println!("GROUP {}:{}", i, group_text);
            }
            None => println!("GROUP {}:", i),
        }
    }
}

fn run_selfcheck(args: SelfcheckArgs) {
    let mut rng = args.tuning.rng();
    let mut stdout = std::io::stdout().lock();
    let summary = selfcheck::run(
        SAMPLE_PATTERNS,
        args.samples,
        args.tuning.config(),
        &mut rng,
        &mut stdout,
    )
    .unwrap_or_else(|e| fail(e));
    drop(stdout);
    println!(
        "\n{} generated, {} failed",
        summary.generated, summary.failed
    );
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Gen(args) => run_gen(args),
        Command::Check(args) => run_check(args),
        Command::Selfcheck(args) => run_selfcheck(args),
    }
}
