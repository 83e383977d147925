//! UCT analysis of an explicit MDP
//!
//! Loads a JSON model file, runs a bounded-horizon UCT search, extracts the
//! greedy policy and evaluates the Markov chain it induces.

use clap::Parser;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use uct_mdp::analysis::analyze;
use uct_mdp::logging::setup_logging;
use uct_mdp::mcts::config::{BiasPolicy, UctConfig};
use uct_mdp::model::explicit::ModelFile;

#[derive(Parser, Debug)]
#[command(name = "uct_mdp", version, about = "Bounded-horizon UCT search over an explicit MDP")]
struct Args {
    /// JSON model file
    model: PathBuf,

    /// JSON search configuration; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Horizon (probabilistic steps per rollout)
    #[arg(short, long)]
    depth: Option<usize>,

    /// Number of rollouts
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Exploration bias: `root-mean` or a number
    #[arg(short, long)]
    bias: Option<BiasPolicy>,

    /// Stop searching after this many milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Write the induced chain as an explicit transition file
    #[arg(long)]
    export_tra: Option<PathBuf>,

    /// Write the induced chain as JSON
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write logs to rotated files in this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn uct_config(&self) -> Result<UctConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => UctConfig::from_json_file(path)?,
            None => UctConfig::default(),
        };
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(bias) = self.bias {
            config.bias = bias;
        }
        if let Some(limit) = self.time_limit_ms {
            config.time_limit_ms = Some(limit);
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let _logger = setup_logging(&args.log_level, args.log_dir.as_deref())?;

    let config = args.uct_config()?;
    let file = ModelFile::from_json_file(&args.model)?;

    log::info!("🎲 UCT MDP analysis");
    log::info!(
        "Model: {} ({} states)",
        file.name.as_deref().unwrap_or("unnamed"),
        file.model.num_states()
    );
    log::info!("Config: {}", config.to_config_string());

    let rewards = file.reward_structure();
    let report = analyze(file.model, rewards, config)?;

    println!("Estimated value:      {:.6}", report.estimate);
    println!("Induced chain value:  {:.6}", report.chain_value);
    println!("Best actions:         {}", report.best_actions.join(" -> "));
    println!(
        "Induced chain:        {} states, {} transitions",
        report.chain.num_states(),
        report.chain.num_transitions()
    );
    println!("Search:               {}", report.stats);

    if let Some(path) = &args.export_tra {
        report.chain.export_tra(BufWriter::new(File::create(path)?))?;
        log::info!("💾 Transitions written to {}", path.display());
    }
    if let Some(path) = &args.export_json {
        std::fs::write(path, report.chain.to_json()?)?;
        log::info!("💾 Chain written to {}", path.display());
    }

    Ok(())
}
