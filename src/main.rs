//! setpoint-sweep command-line interface
//!
//! Usage:
//!
//! ```text
//! setpoint-sweep run <plan.toml> [--output-dir DIR]
//! setpoint-sweep columns <recording.csv> [--data]
//! setpoint-sweep plot <recording.csv> --columns "0,2:5" [--output plot.png] [--title T]
//! setpoint-sweep molar-mass <recording.csv> --columns "4:33" --name "MW [g/mol]" [--table oil]
//! setpoint-sweep tune --y-min 45 --y-max 47.8 --u-min 16.31 --u-max 18.12 --tau1 14 --tau-c 7
//! ```
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` to see flushes.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};

use setpoint_sweep::analysis::{
    append_molar_mass, parse_indices, select_columns, simc_tuning, ComponentTable, CsvTable, StepResponse,
};
use setpoint_sweep::config::PlanFile;
use setpoint_sweep::experiment::ExperimentRunner;
use setpoint_sweep::output::visualization::{plot_columns, PlotConfig};

#[derive(Parser, Debug)]
#[command(name = "setpoint-sweep")]
#[command(about = "Setpoint sweeps on process simulators: sample, record, post-process")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an experiment plan against the plant described in the plan file
    Run {
        /// TOML plan file
        plan: PathBuf,

        /// Override the plan's output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// List the columns of a recording with their indices
    Columns {
        recording: PathBuf,

        /// Number data columns from 0, skipping the time column (plot indices)
        #[arg(long)]
        data: bool,
    },

    /// Plot selected columns, one y-axis per unit
    Plot {
        recording: PathBuf,

        /// Data-column selection, e.g. "0,1,3:10"
        #[arg(long)]
        columns: String,

        /// Output image (.png or .svg); defaults to the recording name with .png
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, default_value_t = 1400)]
        width: u32,

        #[arg(long, default_value_t = 700)]
        height: u32,
    },

    /// Append a weighted molar-mass column computed from mole-percent columns
    MolarMass {
        recording: PathBuf,

        /// Column selection in component order, time column included, e.g. "4:33"
        #[arg(long)]
        columns: String,

        /// Name of the new column
        #[arg(long)]
        name: String,

        /// Component table: basic, oil or gas
        #[arg(long, default_value = "oil")]
        table: String,

        /// Output file; defaults to "<recording>_upgraded.csv"
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// SIMC PI tuning from an open-loop step test
    Tune(TuneArgs),
}

#[derive(Args, Debug)]
struct TuneArgs {
    /// Desired closed-loop time constant
    #[arg(long)]
    tau_c: f64,

    /// Process time constant
    #[arg(long)]
    tau1: f64,

    /// Process delay
    #[arg(long, default_value_t = 0.0)]
    delay: f64,

    /// Read the step test from a recording instead of explicit bounds
    #[arg(long, requires_all = ["input_column", "output_column"])]
    recording: Option<PathBuf>,

    /// Column index of the manipulated input u (time column is 0)
    #[arg(long)]
    input_column: Option<usize>,

    /// Column index of the measured output y (time column is 0)
    #[arg(long)]
    output_column: Option<usize>,

    #[arg(long, required_unless_present = "recording")]
    y_min: Option<f64>,

    #[arg(long, required_unless_present = "recording")]
    y_max: Option<f64>,

    #[arg(long, required_unless_present = "recording")]
    u_min: Option<f64>,

    #[arg(long, required_unless_present = "recording")]
    u_max: Option<f64>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = execute(cli.command) {
        error!("{e}");
        process::exit(1);
    }
}

fn execute(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Run { plan, output_dir } => run(&plan, output_dir),
        Command::Columns { recording, data } => columns(&recording, data),
        Command::Plot {
            recording,
            columns,
            output,
            title,
            width,
            height,
        } => {
            let output = output.unwrap_or_else(|| recording.with_extension("png"));
            let config = PlotConfig::recording(title).with_size(width, height);
            plot(&recording, &columns, &output, &config)
        }
        Command::MolarMass {
            recording,
            columns,
            name,
            table,
            output,
        } => {
            let output = output.unwrap_or_else(|| upgraded_path(&recording));
            molar_mass(&recording, &columns, &name, &table, &output)
        }
        Command::Tune(args) => tune(&args),
    }
}

// =================================================================================================
// Subcommands
// =================================================================================================

fn run(plan_path: &Path, output_dir: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let file = PlanFile::load(plan_path)?;

    let mut plan = file.to_plan()?;
    if let Some(dir) = output_dir {
        plan = plan.with_output_dir(dir);
    }
    std::fs::create_dir_all(&plan.output_dir)?;

    let Some(mut plant) = file.build_plant() else {
        return Err(format!(
            "{} has no [plant] section; an external simulator binding is needed to run it",
            plan_path.display()
        )
        .into());
    };

    let runner = ExperimentRunner::new(plan)?.with_csv_config(file.csv_config()?);
    let report = runner.run(&mut plant)?;

    for state in &report.states {
        info!(
            "state {}: {} rows in {} flushes -> {}",
            state.state,
            state.rows_written,
            state.flushes,
            state.path.display()
        );
    }
    Ok(())
}

fn columns(recording: &Path, data_only: bool) -> Result<(), Box<dyn Error>> {
    let table = CsvTable::from_path(recording)?;
    let skip = usize::from(data_only);

    println!("Available columns:");
    for (index, header) in table.list_columns().into_iter().skip(skip) {
        println!("  {}: {}", index - skip, header);
    }
    Ok(())
}

fn plot(recording: &Path, columns: &str, output: &Path, config: &PlotConfig) -> Result<(), Box<dyn Error>> {
    let table = CsvTable::from_path(recording)?;
    let selection = select_columns(columns, table.ncols().saturating_sub(1));

    let output = output.to_str().ok_or("output path is not valid UTF-8")?;
    plot_columns(&table, &selection, output, Some(config))?;
    info!("Plot saved to {output}");
    Ok(())
}

fn molar_mass(
    recording: &Path,
    columns: &str,
    name: &str,
    table_name: &str,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let components =
        ComponentTable::by_name(table_name).ok_or_else(|| format!("unknown component table '{table_name}'"))?;

    let mut table = CsvTable::from_path(recording)?;
    let selection = parse_indices(columns, table.ncols());
    let result = append_molar_mass(&mut table, &selection, components, name)?;

    if result.mapping.len() < selection.len() {
        warn!(
            "{} of {} selected columns were used",
            result.mapping.len(),
            selection.len()
        );
    }

    table.write(output)?;
    info!("File saved as {}", output.display());
    Ok(())
}

fn tune(args: &TuneArgs) -> Result<(), Box<dyn Error>> {
    let response = match &args.recording {
        Some(path) => {
            let table = CsvTable::from_path(path)?;
            let column = |index: Option<usize>| {
                index
                    .and_then(|i| table.column(i))
                    .ok_or_else(|| format!("column {index:?} not found in {}", path.display()))
            };
            let u = column(args.input_column)?;
            let y = column(args.output_column)?;
            StepResponse::from_series(&u, &y, args.tau1, args.delay)?
        }
        None => StepResponse {
            y_min: args.y_min.ok_or("--y-min is required")?,
            y_max: args.y_max.ok_or("--y-max is required")?,
            u_min: args.u_min.ok_or("--u-min is required")?,
            u_max: args.u_max.ok_or("--u-max is required")?,
            tau_1: args.tau1,
            delay: args.delay,
        },
    };

    let tuning = simc_tuning(&response, args.tau_c)?;
    println!("Process gain:      {}", tuning.process_gain);
    println!("Proportional gain: {}", tuning.kc);
    println!("Integral time:     {}", tuning.tau_i);
    Ok(())
}

/// `dir/name.csv` -> `dir/name_upgraded.csv`
fn upgraded_path(recording: &Path) -> PathBuf {
    let stem = recording
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording".to_string());
    recording.with_file_name(format!("{stem}_upgraded.csv"))
}
