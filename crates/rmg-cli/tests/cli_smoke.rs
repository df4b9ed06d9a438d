use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const TARGETS: [&str; 13] = [
    "H298", "S298", "Cp300", "Cp400", "Cp500", "Cp600", "Cp800", "Cp1000", "Cp1500", "Cp2000",
    "Cp2400", "Cp0", "CpInf",
];

fn workspace_root() -> PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn fixture_dir() -> PathBuf {
    workspace_root().join("fixtures").join("psi4")
}

fn rmg(args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_rmg-rs"));
    command.args(args).env_remove("RMG_ML_MODEL_DIR").env_remove("RUST_LOG");
    command
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|error| {
        panic!(
            "stdout is not JSON ({error}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn zeros(rows: usize, cols: usize) -> Value {
    json!(vec![vec![0.0; cols]; rows])
}

fn write_constant_model(directory: &Path, name: &str) {
    let hidden = 2;
    let means = [
        217.2, 264.8, 54.3, 71.6, 86.2, 98.3, 117.0, 130.6, 151.9, 162.6, 167.9, 33.15, 232.2,
    ];
    let artifact = json!({
        "name": name,
        "architecture": "attn_mpn",
        "hidden_size": hidden,
        "depth": 2,
        "atom_fdim": 31,
        "bond_fdim": 5,
        "w_i": zeros(hidden, 36),
        "w_h": zeros(hidden, hidden),
        "w_o": zeros(hidden, 31 + hidden),
        "b_o": vec![0.0; hidden],
        "w_a": zeros(hidden, hidden),
        "w_b": zeros(hidden, hidden),
        "b_b": vec![0.0; hidden],
        "ffn": [{ "weight": zeros(TARGETS.len(), hidden), "bias": vec![0.0; TARGETS.len()] }],
        "targets": TARGETS,
        "target_means": means,
        "target_stds": vec![1.0; TARGETS.len()],
    });
    fs::write(
        directory.join(format!("{name}.json")),
        serde_json::to_string_pretty(&artifact).unwrap(),
    )
    .unwrap();
}

#[test]
fn log_command_prints_summary() {
    let path = fixture_dir().join("opt_freq_ts.out");
    let output = rmg(&["log", path.to_str().unwrap()]).output().unwrap();
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));

    let summary = stdout_json(&output);
    assert_eq!(summary["program"], "Psi4");
    assert_eq!(summary["atoms"], 4);
    assert_eq!(summary["spin_multiplicity"], 1);
    let negative = summary["negative_frequency_cm1"].as_f64().unwrap();
    assert!((negative + 653.3950).abs() < 1.0e-6);
}

#[test]
fn log_command_reports_failed_job_with_log_exit_code() {
    let path = fixture_dir().join("IO_error.out");
    let output = rmg(&["log", path.to_str().unwrap()]).output().unwrap();
    assert_eq!(output.status.code(), Some(6));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("LOG.REPORTED_FAILURE"), "{stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn logs_command_summarizes_directory() {
    let directory = fixture_dir();
    let output = rmg(&["logs", directory.to_str().unwrap()]).output().unwrap();
    assert_eq!(output.status.code(), Some(6));

    let entries = stdout_json(&output);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 5);
    let failed: Vec<&Value> = entries.iter().filter(|entry| entry.get("error").is_some()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["error"]["placeholder"], "LOG.REPORTED_FAILURE");
}

#[test]
fn logs_command_honours_patterns() {
    let directory = fixture_dir();
    let output = rmg(&[
        "logs",
        directory.to_str().unwrap(),
        "--pattern",
        "opt_freq_dft*.out",
    ])
    .output()
    .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let entries = stdout_json(&output);
    assert_eq!(entries.as_array().map(Vec::len), Some(2));

    let empty = TempDir::new().unwrap();
    let output = rmg(&["logs", empty.path().to_str().unwrap()]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn thermo_command_uses_model_directory() {
    let temp = TempDir::new().unwrap();
    write_constant_model(temp.path(), "attn_mpn");

    let output = rmg(&[
        "thermo",
        "C1C2C1C2",
        "--model-dir",
        temp.path().to_str().unwrap(),
        "--mode",
        "from_rdkit_mol",
        "--wilhoit-b",
        "1000",
    ])
    .output()
    .unwrap();
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));

    let report = stdout_json(&output);
    assert_eq!(report["mode"], "from_rdkit_mol");
    let comment = report["thermo"]["comment"].as_str().unwrap();
    assert!(comment.starts_with("ML Estimation using from_rdkit"));
    assert_eq!(report["thermo"]["cpdata"]["values"].as_array().map(Vec::len), Some(9));
    assert!(report["wilhoit"]["b"].as_f64().is_some());
}

#[test]
fn thermo_command_reads_model_directory_from_environment() {
    let temp = TempDir::new().unwrap();
    write_constant_model(temp.path(), "custom");

    let output = rmg(&["thermo", "CCO", "--model", "custom"])
        .env("RMG_ML_MODEL_DIR", temp.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    let report = stdout_json(&output);
    assert!(report.get("wilhoit").is_none());
    assert_eq!(report["model"], "custom");
}

#[test]
fn thermo_command_rejects_unknown_model_and_bad_input() {
    let temp = TempDir::new().unwrap();
    let output = rmg(&["thermo", "CCO", "--model-dir", temp.path().to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("INPUT.MODEL"));

    write_constant_model(temp.path(), "attn_mpn");
    let output = rmg(&["thermo", "C1CC", "--model-dir", temp.path().to_str().unwrap()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("INPUT.SMILES"));

    let output = rmg(&["thermo", "CCO", "--mode", "inchi"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let output = rmg(&[]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("INPUT.CLI_USAGE"));
}
