use std::{fs, path::PathBuf, process::ExitCode};

use clap::{Args as ClapArgs, FromArgMatches, Parser, Subcommand, ValueEnum};

use selectway::{
    host::{StdConsole, StdRandom},
    scripts, ExecutionContext, Interpreter, PlusSplit, Repl, SelectwayError,
};

#[derive(Parser)]
#[command(author, version, about = "SELECTWAY language interpreter")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a SELECTWAY script file
    Run {
        script: PathBuf,
        #[command(flatten)]
        options: RunOptions,
    },
    /// Evaluate a snippet of SELECTWAY code
    Eval {
        source: String,
        #[command(flatten)]
        options: RunOptions,
    },
    /// Create a new, empty .sw script
    New { script: PathBuf },
    /// Start an interactive session
    Repl {
        #[command(flatten)]
        options: RunOptions,
    },
}

#[derive(ClapArgs, Default)]
struct RunOptions {
    /// How expressions containing `+` are split into concatenation segments
    #[arg(long, value_enum, default_value_t = SplitArg::Naive)]
    split: SplitArg,
    /// Coerce numeric-looking strings assigned inside blocks into numbers
    #[arg(long)]
    coerce_block_assignments: bool,
    /// Abort when a single `/while` loop runs more iterations than this
    #[arg(long, env = "SELECTWAY_MAX_ITERATIONS")]
    max_iterations: Option<u64>,
    /// Seed for `/random`, for reproducible runs
    #[arg(long, env = "SELECTWAY_SEED")]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum SplitArg {
    #[default]
    Naive,
    QuoteAware,
}

impl RunOptions {
    /// Options for a bare `selectway` invocation: no flags, but environment
    /// fallbacks and defaults still go through clap.
    fn from_env() -> Self {
        let matches = Self::augment_args(clap::Command::new("selectway"))
            .get_matches_from(["selectway"]);
        Self::from_arg_matches(&matches).unwrap_or_default()
    }

    fn context(&self) -> ExecutionContext {
        let split = match self.split {
            SplitArg::Naive => PlusSplit::Naive,
            SplitArg::QuoteAware => PlusSplit::QuoteAware,
        };
        let context = ExecutionContext::default()
            .with_split(split)
            .with_block_coercion(self.coerce_block_assignments);
        match self.max_iterations {
            Some(limit) => context.with_max_loop_iterations(limit),
            None => context,
        }
    }

    fn interpreter(&self) -> Interpreter {
        let random = match self.seed {
            Some(seed) => StdRandom::seeded(seed),
            None => StdRandom::new(),
        };
        Interpreter::with_host(StdConsole, random).with_context(self.context())
    }
}

fn main() -> ExitCode {
    selectway::init_tracing();
    let args = Args::parse();
    let command = args.command.unwrap_or_else(|| Command::Repl {
        options: RunOptions::from_env(),
    });
    let result = match command {
        Command::Run { script, options } => run_script(script, &options),
        Command::Eval { source, options } => options.interpreter().run(&source),
        Command::New { script } => scripts::create_script(&script)
            .map(|()| println!("Created new file: {}", script.display())),
        Command::Repl { options } => Repl::with_interpreter(options.interpreter()).run(),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(SelectwayError::Diagnostic(diag)) => {
            eprintln!("{}", diag.summary());
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_script(path: PathBuf, options: &RunOptions) -> Result<(), SelectwayError> {
    let source = fs::read_to_string(&path)?;
    options.interpreter().run(&source)
}
