//! Integration tests: recording → post-processing
//!
//! Recordings produced by the sampler are loaded back as tables and fed
//! through molar mass, unit grouping, plotting and SIMC tuning.

use std::fs;

use approx::assert_relative_eq;
use setpoint_sweep::analysis::{
    append_molar_mass, group_by_unit, parse_indices, select_columns, simc_tuning, CsvTable, StepResponse, BASIC,
};
use setpoint_sweep::experiment::{ExperimentPlan, ExperimentRunner, StateStep};
use setpoint_sweep::models::{FirstOrderLag, FirstOrderPlant};
use setpoint_sweep::output::visualization::{plot_columns, PlotConfig};
use setpoint_sweep::sampler::{run_buffered, Adjustment, ParameterAdjustment};
use setpoint_sweep::simulation::Signal;
use tempfile::tempdir;

mod common;
use common::{read_recording, signals, RampSimulation};

/// Step test recorded from a unit-gain lag: u 16.31 → 18.12 over τ₁ = 14 s
fn record_step_test(dir: &std::path::Path) -> std::path::PathBuf {
    let mut plant = FirstOrderPlant::new("tuning")
        .with_parameter("A", "u", 16.31)
        .with_parameter("A", "y", 45.0)
        .with_lag("A", FirstOrderLag::new("u", "y", 2.8 / 1.81, 14.0).bias(45.0 - 16.31 * 2.8 / 1.81));

    let plan = ExperimentPlan::new("Step", vec![Signal::new("u", "%"), Signal::new("y", "barg")])
        .with_output_dir(dir)
        .with_state(
            StateStep::new(0, "A", 1)
                .adjust(ParameterAdjustment::new("u", Adjustment::Additive(1.81)))
                .then(None, 10),
        );

    let runner = ExperimentRunner::new(plan).unwrap();
    let report = runner.run(&mut plant).unwrap();
    report.states[0].path.clone()
}

// =================================================================================================
// Table loading
// =================================================================================================

#[test]
fn test_recording_loads_as_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ramp.csv");
    run_buffered(&mut RampSimulation::new(), "A", &signals(3), 2, 50, &path).unwrap();

    let table = CsvTable::from_path(&path).unwrap();
    assert_eq!(table.nrows(), 120);
    assert_eq!(table.ncols(), 4);
    assert_eq!(table.headers()[0], "ModelTime [s]");

    let time = table.time().unwrap();
    assert_eq!(time[0], 1.0);
    assert_eq!(time[119], 120.0);
    assert_eq!(table.column(2).unwrap()[9], 10.0 * 10.0 + 1.0);
}

#[test]
fn test_unit_groups_of_a_recording() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("units.csv");
    let signals = vec![
        Signal::new("P1", "barg"),
        Signal::new("T1", "K"),
        Signal::new("P2", "barg"),
        Signal::new("F1", "kg/h"),
    ];
    run_buffered(&mut RampSimulation::new(), "A", &signals, 1, 60, &path).unwrap();

    let table = CsvTable::from_path(&path).unwrap();
    let selection: Vec<usize> = select_columns("0:3", table.ncols() - 1).iter().map(|i| i + 1).collect();
    let groups = group_by_unit(table.headers(), &selection);

    let summary: Vec<(&str, Vec<usize>)> = groups.iter().map(|g| (g.unit.as_str(), g.columns.clone())).collect();
    assert_eq!(summary, vec![("barg", vec![1, 3]), ("K", vec![2]), ("kg/h", vec![4])]);
}

// =================================================================================================
// Molar mass
// =================================================================================================

#[test]
fn test_molar_mass_round_trip_through_files() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("composition.csv");
    let output = dir.path().join("composition_upgraded.csv");

    // H2O, CO2, C6H6 in mole percent
    fs::write(
        &input,
        "ModelTime [s],x1 [%],x2 [%],x3 [%]\n1,100,0,0\n2,50,50,0\n3,0,0,100\n",
    )
    .unwrap();

    let mut table = CsvTable::from_path(&input).unwrap();
    let selection = parse_indices("1:3", table.ncols());
    let result = append_molar_mass(&mut table, &selection, &BASIC, "MW [g/mol]").unwrap();
    assert_eq!(result.mapping.len(), 3);
    table.write(&output).unwrap();

    let recording = read_recording(&output);
    assert_eq!(recording.header.last().unwrap(), "MW [g/mol]");
    let mw: Vec<f64> = recording.rows.iter().map(|r| *r.last().unwrap()).collect();
    assert_relative_eq!(mw[0], 18.015, epsilon = 1e-9);
    assert_relative_eq!(mw[1], 0.5 * 18.015 + 0.5 * 44.01, epsilon = 1e-9);
    assert_relative_eq!(mw[2], 78.11, epsilon = 1e-9);
}

#[test]
fn test_molar_mass_skips_out_of_range_but_keeps_slot() {
    let mut table =
        CsvTable::from_reader("t [s],a [%],b [%]\n1,40,60\n".as_bytes()).unwrap();

    // 9 is out of range and consumes H2O's slot; column 1 pairs with CO2, column 2 with C6H6
    let result = append_molar_mass(&mut table, &[9, 1, 2], &BASIC, "MW").unwrap();

    let names: Vec<&str> = result.mapping.iter().map(|m| m.component.name).collect();
    assert_eq!(names, vec!["CO2", "C6H6"]);
    assert_relative_eq!(result.values[0], 0.4 * 44.01 + 0.6 * 78.11, epsilon = 1e-9);
    assert_eq!(table.ncols(), 4);
}

// =================================================================================================
// Plotting a recorded state
// =================================================================================================

#[test]
fn test_plot_recorded_state() {
    let dir = tempdir().unwrap();
    let recording = record_step_test(dir.path());
    let table = CsvTable::from_path(&recording).unwrap();

    let selection = select_columns("0,1", table.ncols() - 1);
    let output = dir.path().join("step.png");
    let config = PlotConfig::recording("Step test");

    plot_columns(&table, &selection, output.to_str().unwrap(), Some(&config)).unwrap();
    assert!(fs::metadata(&output).unwrap().len() > 0);
}

// =================================================================================================
// Tuning from a recorded step test
// =================================================================================================

#[test]
fn test_tuning_from_recorded_step() {
    let dir = tempdir().unwrap();
    let recording = record_step_test(dir.path());
    let table = CsvTable::from_path(&recording).unwrap();

    let u = table.column(1).unwrap();
    let y = table.column(2).unwrap();
    let response = StepResponse::from_series(&u, &y, 14.0, 0.0).unwrap();

    assert_relative_eq!(response.u_min, 16.31, epsilon = 1e-9);
    assert_relative_eq!(response.u_max, 18.12, epsilon = 1e-9);
    assert_relative_eq!(response.y_min, 45.0, epsilon = 1e-9);
    // Ten minutes is ~43 time constants: fully settled
    assert_relative_eq!(response.y_max, 47.8, epsilon = 1e-6);

    let tuning = simc_tuning(&response, 7.0).unwrap();
    let k = 2.8 / 1.81;
    assert_relative_eq!(tuning.process_gain, k, max_relative = 1e-6);
    assert_relative_eq!(tuning.kc, (1.0 / k) * (14.0 / 7.0), max_relative = 1e-6);
    assert_relative_eq!(tuning.tau_i, 14.0);
}
