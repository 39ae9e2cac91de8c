//! Salescast — train, promote and serve sales-forecast experiments.

use clap::{Parser, Subcommand};
use salescast_pipeline::{run_batch, ExperimentOutcome, ProjectConfig};
use salescast_server::{deploy_api, experiment_api, AppState, ServerConfig};
use salescast_store::DeployOutcome;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "salescast", about = "Sales forecasting experiment harness")]
struct Cli {
    /// Path to the server config file
    #[arg(short, long, default_value = "salescast.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train every experiment listed in a YAML manifest
    Train {
        /// Execution name grouping this batch of experiments
        execution_name: String,
        /// YAML manifest mapping experiment names to params files
        experiments_list: PathBuf,
    },
    /// Promote a trained experiment to the deployed slot
    Deploy {
        execution_name: String,
        experiment_id: String,
        /// Free-text description recorded alongside the deployed model
        description: String,
    },
    /// Serve the experiment browsing/deployment API
    ServeExperiments {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Serve the deployed-model inference API
    ServeModel {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "salescast=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load_or_default(&cli.config)?;
    let project = ProjectConfig {
        root: config.project_root.clone(),
        db_path: config.db_path.clone(),
    };

    match cli.command {
        Commands::Train {
            execution_name,
            experiments_list,
        } => {
            let outcomes = run_batch(&project, &execution_name, &experiments_list)?;
            for outcome in &outcomes {
                match outcome {
                    ExperimentOutcome::Completed { name, id, metrics } => {
                        println!(
                            "{name}: completed as {id} (valid RMSE {:.4})",
                            metrics.valid_rmse
                        );
                    }
                    ExperimentOutcome::Skipped { name, reason } => {
                        println!("{name}: skipped ({reason})");
                    }
                    ExperimentOutcome::Failed { name, error } => {
                        println!("{name}: failed ({error})");
                    }
                }
            }
        }

        Commands::Deploy {
            execution_name,
            experiment_id,
            description,
        } => {
            let outcome = salescast_store::deploy(
                &project.root,
                &execution_name,
                &experiment_id,
                &description,
            )?;
            match outcome {
                DeployOutcome::Success => println!("deployed {execution_name}/{experiment_id}"),
                DeployOutcome::Failed { missing } => {
                    anyhow::bail!("deployment incomplete, missing files: {missing:?}")
                }
            }
        }

        Commands::ServeExperiments { port } => {
            let state = Arc::new(AppState::new(project));
            experiment_api::serve(state, port.unwrap_or(config.experiment_port)).await?;
        }

        Commands::ServeModel { port } => {
            let state = Arc::new(AppState::new(project));
            deploy_api::serve(state, port.unwrap_or(config.model_port)).await?;
        }
    }

    Ok(())
}
