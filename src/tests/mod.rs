#[cfg(test)]
use crate::prelude::*;

#[test]
fn read_parameters() {
    let settings = settings::read("src/tests/config.toml").unwrap();
    assert_eq!(settings.parameters, Parameters::new(0.5, 0.25, 0.1, 0.02));
}

#[test]
fn read_initial_state() {
    let settings = settings::read("src/tests/config.toml").unwrap();
    assert_eq!(settings.initial, State::new(9990.0, 5.0, 5.0, 0.0, 0.0));
    assert_eq!(settings.initial.total(), 10_000.0);
}

#[test]
fn read_grid() {
    let settings = settings::read("src/tests/config.toml").unwrap();
    let grid = settings.grid.time_grid();
    assert_eq!(grid.len(), 101);
    assert_eq!(grid.times()[1], 2.0);
    assert_eq!(grid.times()[100], 200.0);
}

#[test]
fn read_analysis_and_solver() {
    let settings = settings::read("src/tests/config.toml").unwrap();
    assert_eq!(settings.analysis.compartment, Compartment::Exposed);
    assert_eq!(settings.analysis.threshold, 25.0);
    assert_eq!(settings.analysis.decimals, 1);
    assert_eq!(settings.solver.rtol, 1e-8);
    assert!(!settings.output.write);
}

#[test]
fn missing_sections_use_defaults() {
    let settings = settings::read("src/tests/partial.toml").unwrap();
    assert_eq!(settings.initial, State::default());
    assert_eq!(settings.grid.start, 0.0);
    assert_eq!(settings.grid.end, 150.0);
    assert_eq!(settings.grid.points, 25);
    assert_eq!(settings.analysis.threshold, 10.0);
    assert_eq!(settings.log.level, "info");
    assert!(settings.output.write);
}

#[test]
fn invalid_settings_are_rejected() {
    let err = settings::read("src/tests/invalid.toml").unwrap_err();
    assert!(err.to_string().contains("epsilon"));
}

#[test]
fn missing_file_is_an_error() {
    assert!(settings::read("src/tests/does_not_exist.toml").is_err());
}

#[test]
fn configured_run() {
    let settings = settings::read("src/tests/config.toml").unwrap();
    let result = run_internal(&settings).unwrap();
    let summary = result.summary();

    assert_eq!(summary.compartment, Compartment::Exposed);
    assert!(summary.peak.index > 0 && summary.peak.index < 100);
    if let Crossing::Found { time, .. } = summary.crossing {
        assert!(time > summary.peak.time);
    }
}
