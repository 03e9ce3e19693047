use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tp_fluids::FluidProperties;
use tp_pipe::{PipeConfiguration, PipeHeatTransfer, PipeReport};
use tp_project::{Project, ScenarioDef};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tp-cli")]
#[command(about = "ThermoPipe CLI - Transient pipe and soil heat transfer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// List pipes in a project
    Pipes {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Run the project scenario
    Run {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Only run this pipe
        #[arg(long)]
        pipe: Option<String>,
        /// Host evaluations per time step; extra evaluations repeat the same instant
        #[arg(long, default_value_t = 1)]
        iterations: usize,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Project(#[from] tp_project::ProjectError),

    #[error("Pipe model error in '{pipe}': {source}")]
    Pipe {
        pipe: String,
        source: tp_pipe::PipeError,
    },

    #[error("Project '{0}' has no scenario to run")]
    NoScenario(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Serialize)]
struct StepRecord {
    time_s: f64,
    #[serde(flatten)]
    report: PipeReport,
}

#[derive(Serialize)]
struct PipeRun {
    pipe: String,
    environment: &'static str,
    unconverged_sub_steps: usize,
    records: Vec<StepRecord>,
}

fn main() -> CliResult<()> {
    // Initialize tracing; RUST_LOG=tp_pipe=trace shows every soil sweep.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Pipes { project_path } => cmd_pipes(&project_path),
        Commands::Run {
            project_path,
            pipe,
            iterations,
            format,
            output,
        } => cmd_run(
            &project_path,
            pipe.as_deref(),
            iterations.max(1),
            format,
            output.as_deref(),
        ),
    }
}

fn cmd_validate(project_path: &Path) -> CliResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = tp_project::load_yaml(project_path)?;
    tp_project::build_pipes(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_pipes(project_path: &Path) -> CliResult<()> {
    let project = tp_project::load_yaml(project_path)?;
    let pipes = tp_project::build_pipes(&project)?;

    if pipes.is_empty() {
        println!("No pipes found in project");
    } else {
        println!("Pipes in project:");
        for config in pipes {
            let g = config.geometry();
            println!(
                "  {} - {} ({:.3} m ID, {:.1} m, {} sections)",
                config.name(),
                config.environment().kind(),
                g.inner_diameter_m,
                g.length_m,
                g.sections
            );
        }
    }
    Ok(())
}

fn cmd_run(
    project_path: &Path,
    pipe: Option<&str>,
    iterations: usize,
    format: OutputFormat,
    output: Option<&Path>,
) -> CliResult<()> {
    let project = tp_project::load_yaml(project_path)?;
    let scenario = project
        .scenario
        .clone()
        .ok_or_else(|| CliError::NoScenario(project.name.clone()))?;
    let configs = select_pipes(&project, pipe)?;
    let fluid = tp_project::build_fluid(&project.fluid);

    println!(
        "Running {} pipe(s) for {:.1} h at {:.0} s steps",
        configs.len(),
        scenario.duration_h,
        scenario.step_s
    );

    let started = Instant::now();
    let runs = configs
        .into_par_iter()
        .map(|config| run_pipe(config, fluid.as_ref(), &scenario, iterations))
        .collect::<CliResult<Vec<_>>>()?;
    let elapsed = started.elapsed().as_secs_f64();

    print_summary(&runs, elapsed);

    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&runs)?,
        OutputFormat::Csv => to_csv(&runs),
    };
    if let Some(path) = output {
        std::fs::write(path, content)?;
        let points: usize = runs.iter().map(|r| r.records.len()).sum();
        println!("✓ Exported {} data points to {}", points, path.display());
    } else {
        print!("{}", content);
    }

    Ok(())
}

fn select_pipes(project: &Project, pipe: Option<&str>) -> CliResult<Vec<PipeConfiguration>> {
    Ok(match pipe {
        Some(id) => vec![tp_project::build_pipe(project, id)?],
        None => tp_project::build_pipes(project)?,
    })
}

/// Drive one pipe through the scenario the way a building simulation host would.
fn run_pipe(
    config: PipeConfiguration,
    fluid: &dyn FluidProperties,
    scenario: &ScenarioDef,
    iterations: usize,
) -> CliResult<PipeRun> {
    let name = config.name().to_string();
    let environment = config.environment().kind();
    let mut model = PipeHeatTransfer::new(config);
    model.begin_environment(scenario.start_day);

    let steps = scenario.step_count();
    let mut records = Vec::with_capacity(steps);
    for n in 1..=steps {
        let mut report = PipeReport::default();
        for iteration in 0..iterations {
            let inputs = scenario.step_inputs(n, iteration == 0);
            report = model
                .simulate(fluid, &inputs)
                .map_err(|source| CliError::Pipe {
                    pipe: name.clone(),
                    source,
                })?;
        }
        records.push(StepRecord {
            time_s: n as f64 * scenario.step_s,
            report,
        });
    }

    tracing::debug!(pipe = %name, steps, "scenario finished");

    Ok(PipeRun {
        pipe: name,
        environment,
        unconverged_sub_steps: model.unconverged_sub_steps(),
        records,
    })
}

fn print_summary(runs: &[PipeRun], elapsed_s: f64) {
    println!("\nRun summary:");
    for run in runs {
        let Some(last) = run.records.last() else {
            println!("  {} ({}): no steps", run.pipe, run.environment);
            continue;
        };
        let fluid_j: f64 = run
            .records
            .iter()
            .map(|r| r.report.fluid_heat_loss_j)
            .sum();
        println!(
            "  {} ({}): outlet {:.2} °C, drop {:.2} K, fluid loss {:.3} MJ",
            run.pipe,
            run.environment,
            last.report.outlet_temperature_c,
            last.report.temperature_drop(),
            fluid_j / 1.0e6
        );
        if run.unconverged_sub_steps > 0 {
            println!(
                "    soil solver hit its iteration cap in {} sub-steps",
                run.unconverged_sub_steps
            );
        }
    }
    println!("  Total: {:.3}s", elapsed_s);
}

fn to_csv(runs: &[PipeRun]) -> String {
    let mut csv = String::from(
        "pipe,time_s,inlet_c,outlet_c,mass_flow_kgps,fluid_loss_w,environment_loss_w,\
         zone_gain_w,wall_inlet_c,wall_outlet_c,soil_iterations\n",
    );
    for run in runs {
        for record in &run.records {
            let r = &record.report;
            let soil_iterations = r
                .soil
                .map(|s| s.iterations.to_string())
                .unwrap_or_default();
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{}\n",
                run.pipe,
                record.time_s,
                r.inlet_temperature_c,
                r.outlet_temperature_c,
                r.mass_flow_kgps,
                r.fluid_heat_loss_w,
                r.environment_heat_loss_w,
                r.zone_heat_gain_w,
                r.wall_temperature_inlet_c,
                r.wall_temperature_outlet_c,
                soil_iterations
            ));
        }
    }
    csv
}
