//! GraspLab: experiment tooling for grasp-RL agents.
//!
//! Provides subcommands for the pieces of the experiment workflow:
//!
//! - `rebuild` -- reconstruct the replay-buffer pair from recorded trajectories
//! - `inspect` -- summarize a persisted replay-buffer artifact
//! - `envs`    -- list the registered simulation environments
//! - `locate`  -- resolve a pretrained model artifact path
//! - `debug`   -- load a model and drive the slider harness

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use grasplab::algo::Algo;
use grasplab::config::GraspLabConfig;
use grasplab::env::{default_registry, EnvRegistry};
use grasplab::harness::{DebugSession, ScriptedPanel};
use grasplab::model::{load_model, resolve_or_fetch, LocalHub, ModelHub, ModelSelection};
use grasplab::replay::{
    GoalReplayBuffer, PlainReplayBuffer, ReplayBuffer, ReplayRebuilder, TrajectorySource,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// GraspLab: experiment tooling for grasp-RL agents.
#[derive(Parser)]
#[command(name = "grasplab", version, about)]
struct Cli {
    /// Path to a JSON configuration file (uses defaults if not provided).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the goal-conditioned and plain replay buffers from recorded
    /// trajectories.
    Rebuild {
        /// Directory of recorded trajectory files (overrides the config).
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Buffer capacity (overrides the config).
        #[arg(long)]
        capacity: Option<usize>,

        /// Environment whose spaces size the buffer slots.
        #[arg(long)]
        env: Option<String>,
    },

    /// Summarize a persisted replay-buffer artifact.
    Inspect {
        /// Path to the buffer artifact JSON file.
        path: PathBuf,

        /// Also print the rewards of this many sampled transitions
        /// (seeded from the config).
        #[arg(long)]
        sample: Option<usize>,
    },

    /// List the registered simulation environments.
    Envs,

    /// Resolve a pretrained model artifact path.
    Locate {
        /// RL algorithm key.
        #[arg(long, default_value = "sac")]
        algo: String,

        /// Environment id.
        #[arg(long, default_value = "GraspStageThree-v1")]
        env: String,

        /// Experiment id (0 = latest run).
        #[arg(long, default_value_t = 0)]
        exp_id: u32,

        /// Resolve the best model instead of the final one.
        #[arg(long, default_value_t = false)]
        load_best: bool,

        /// Resolve the checkpoint saved at this step count.
        #[arg(long)]
        load_checkpoint: Option<u64>,

        /// Resolve the most recent checkpoint.
        #[arg(long, default_value_t = false)]
        load_last_checkpoint: bool,
    },

    /// Load a pretrained model and drive the slider harness.
    Debug {
        /// RL algorithm key.
        #[arg(long, default_value = "sac")]
        algo: String,

        /// Environment id.
        #[arg(long, default_value = "GraspStageThree-v1")]
        env: String,

        /// Experiment id (0 = latest run).
        #[arg(long, default_value_t = 0)]
        exp_id: u32,

        /// Simulation ticks to drive.
        #[arg(long, default_value_t = 480)]
        ticks: usize,
    },
}

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // Initialise tracing (reads RUST_LOG env var, defaults to info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load or create configuration.
    let config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str::<GraspLabConfig>(&text)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        }
        None => GraspLabConfig::default(),
    };

    let registry = default_registry();

    match cli.command {
        Commands::Rebuild {
            input_dir,
            capacity,
            env,
        } => cmd_rebuild(&config, &registry, input_dir, capacity, env),
        Commands::Inspect { path, sample } => cmd_inspect(&config, &path, sample),
        Commands::Envs => cmd_envs(&registry),
        Commands::Locate {
            algo,
            env,
            exp_id,
            load_best,
            load_checkpoint,
            load_last_checkpoint,
        } => {
            let selection = ModelSelection {
                load_best,
                load_checkpoint,
                load_last_checkpoint,
            };
            cmd_locate(&config, &algo, &env, exp_id, &selection)
        }
        Commands::Debug {
            algo,
            env,
            exp_id,
            ticks,
        } => cmd_debug(&config, &registry, &algo, &env, exp_id, ticks),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_rebuild(
    config: &GraspLabConfig,
    registry: &EnvRegistry,
    input_dir: Option<PathBuf>,
    capacity: Option<usize>,
    env: Option<String>,
) -> Result<()> {
    let input_dir = input_dir.unwrap_or_else(|| config.rebuild.input_dir.clone());
    let capacity = capacity.unwrap_or(config.rebuild.capacity);
    let env_id = env.unwrap_or_else(|| config.rebuild.env_id.clone());

    let spec = registry.get(&env_id)?;
    tracing::info!(
        env = %spec.id,
        capacity,
        input = %input_dir.display(),
        "Rebuilding replay buffers"
    );

    let rebuilder = ReplayRebuilder::new(
        capacity,
        spec.observation_space.clone(),
        spec.action_space.clone(),
    )?;
    let source = TrajectorySource::new(input_dir);

    let summary = rebuilder.rebuild_to_files(
        &source,
        &config.rebuild.goal_output,
        &config.rebuild.plain_output,
    )?;

    tracing::info!(
        records = summary.records,
        transitions = summary.transitions,
        goal = %config.rebuild.goal_output.display(),
        plain = %config.rebuild.plain_output.display(),
        "Replay buffers written"
    );
    Ok(())
}

fn cmd_inspect(config: &GraspLabConfig, path: &PathBuf, sample: Option<usize>) -> Result<()> {
    // The two artifact kinds differ only in observation shape; try the
    // goal-conditioned layout first, then the plain one.
    if let Ok(buffer) = GoalReplayBuffer::load_from_file(path) {
        println!("Goal-conditioned replay buffer: {}", path.display());
        print_buffer_summary(config, &buffer, sample);
        return Ok(());
    }

    let buffer = PlainReplayBuffer::load_from_file(path)
        .with_context(|| format!("{} is not a replay-buffer artifact", path.display()))?;
    println!("Plain replay buffer: {}", path.display());
    print_buffer_summary(config, &buffer, sample);
    Ok(())
}

fn print_buffer_summary<O>(config: &GraspLabConfig, buffer: &ReplayBuffer<O>, sample: Option<usize>)
where
    O: Clone + serde::Serialize + serde::de::DeserializeOwned,
{
    println!("  Capacity:        {}", buffer.capacity());
    println!("  Stored:          {}", buffer.len());
    println!("  Write cursor:    {}", buffer.pos());
    println!("  Total inserted:  {}", buffer.total_inserted());
    println!("  Observation dim: {}", buffer.observation_dim());
    println!("  Action dim:      {}", buffer.action_dim());

    if let Some(n) = sample {
        let mut rng = StdRng::seed_from_u64(config.seed);
        match buffer.sample(&mut rng, n) {
            Some(batch) => {
                let rewards: Vec<f32> = batch.iter().map(|t| t.reward).collect();
                println!("  Sampled rewards: {rewards:?}");
            }
            None => println!("  Sampled rewards: (buffer is empty)"),
        }
    }
}

fn cmd_envs(registry: &EnvRegistry) -> Result<()> {
    println!("Registered environments ({}):", registry.len());
    for spec in registry.specs() {
        println!("  {}", spec.id);
        println!("    Entry point: {}", spec.entry_point);
        println!(
            "    Max steps: {}, reward threshold: {}",
            spec.max_episode_steps, spec.reward_threshold
        );
        println!(
            "    Observation: {} (+ goals {}/{}), action: {}",
            spec.observation_space.observation_dim(),
            spec.observation_space.achieved_goal.flat_dim(),
            spec.observation_space.desired_goal.flat_dim(),
            spec.action_space.flat_dim()
        );
    }
    Ok(())
}

fn cmd_locate(
    config: &GraspLabConfig,
    algo: &str,
    env_id: &str,
    exp_id: u32,
    selection: &ModelSelection,
) -> Result<()> {
    let algo = Algo::from_str(algo)?;
    let hub = config.hub_mirror.as_ref().map(|root| LocalHub::new(root));
    let hub_ref: Option<&dyn ModelHub> = hub.as_ref().map(|h| h as &dyn ModelHub);

    let resolved = resolve_or_fetch(
        &config.log_folder,
        algo,
        env_id,
        Some(exp_id),
        selection,
        hub_ref,
    )?;

    println!("{}", resolved.model_path.display());
    Ok(())
}

fn cmd_debug(
    config: &GraspLabConfig,
    registry: &EnvRegistry,
    algo: &str,
    env_id: &str,
    exp_id: u32,
    ticks: usize,
) -> Result<()> {
    let algo = Algo::from_str(algo)?;
    let spec = registry.get(env_id)?;

    let hub = config.hub_mirror.as_ref().map(|root| LocalHub::new(root));
    let hub_ref: Option<&dyn ModelHub> = hub.as_ref().map(|h| h as &dyn ModelHub);

    let (model, resolved) = load_model(
        &config.log_folder,
        algo,
        env_id,
        Some(exp_id),
        &ModelSelection::default(),
        hub_ref,
    )?;
    tracing::info!(
        path = %resolved.model_path.display(),
        timesteps = model.timesteps,
        "Loaded model"
    );

    let mut panel = ScriptedPanel::new();
    let mut session = DebugSession::new(&mut panel, &config.harness);
    if session.action_dim() != spec.action_space.flat_dim() {
        tracing::warn!(
            session = session.action_dim(),
            env = spec.action_space.flat_dim(),
            "Harness action layout does not match the environment's action space"
        );
    }

    let summary = session.run(&mut panel, ticks);
    tracing::info!(
        ticks = summary.ticks,
        resets = summary.resets,
        final_action = ?summary.final_action,
        "Debug session finished"
    );
    Ok(())
}
