//! CLI command parsing and end-to-end tests.
//!
//! Argument parsing is checked with clap `try_parse_from` on a mirror of the
//! binary's argument structs; the commands themselves are exercised by
//! running the `qreuse` binary.

// ============================================================================
// Clap argument parsing (test via try_parse_from on equivalent structs)
// ============================================================================

mod clap_parsing {
    use std::path::PathBuf;

    use clap::{Parser, Subcommand};

    // Mirror the CLI struct for testing (since main.rs is a binary)
    #[derive(Parser)]
    #[command(name = "qreuse")]
    struct TestCli {
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        verbose: u8,

        #[command(subcommand)]
        command: TestCommands,
    }

    #[derive(Subcommand)]
    enum TestCommands {
        Reduce {
            #[arg(short, long)]
            input: String,
            #[arg(short, long)]
            output: Option<String>,
            #[arg(short, long)]
            mode: Option<String>,
            #[arg(short, long)]
            config: Option<PathBuf>,
            #[arg(short, long)]
            target: Option<String>,
            #[arg(long)]
            verify: bool,
        },
        Cones {
            #[arg(short, long)]
            input: String,
            #[arg(long)]
            json: bool,
        },
        Version,
    }

    #[test]
    fn test_parse_reduce_minimal() {
        let cli = TestCli::try_parse_from(["qreuse", "reduce", "-i", "circuit.json"]).unwrap();
        match cli.command {
            TestCommands::Reduce {
                input,
                output,
                mode,
                config,
                target,
                verify,
            } => {
                assert_eq!(input, "circuit.json");
                assert!(output.is_none());
                assert!(mode.is_none());
                assert!(config.is_none());
                assert!(target.is_none());
                assert!(!verify);
            }
            _ => panic!("Expected Reduce command"),
        }
    }

    #[test]
    fn test_parse_reduce_with_all_args() {
        let cli = TestCli::try_parse_from([
            "qreuse",
            "reduce",
            "-i",
            "in.json",
            "-o",
            "out.json",
            "-m",
            "dual",
            "-c",
            "reuse.yaml",
            "-t",
            "linear:5",
            "--verify",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Reduce {
                output,
                mode,
                config,
                target,
                verify,
                ..
            } => {
                assert_eq!(output.unwrap(), "out.json");
                assert_eq!(mode.unwrap(), "dual");
                assert_eq!(config.unwrap(), PathBuf::from("reuse.yaml"));
                assert_eq!(target.unwrap(), "linear:5");
                assert!(verify);
            }
            _ => panic!("Expected Reduce command"),
        }
    }

    #[test]
    fn test_parse_reduce_requires_input() {
        assert!(TestCli::try_parse_from(["qreuse", "reduce"]).is_err());
    }

    #[test]
    fn test_parse_cones_and_verbosity() {
        let cli =
            TestCli::try_parse_from(["qreuse", "-vv", "cones", "-i", "c.json", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, TestCommands::Cones { json: true, .. }));
    }

    #[test]
    fn test_parse_version() {
        let cli = TestCli::try_parse_from(["qreuse", "version"]).unwrap();
        assert!(matches!(cli.command, TestCommands::Version));
    }

    #[test]
    fn test_parse_unknown_subcommand() {
        assert!(TestCli::try_parse_from(["qreuse", "compile"]).is_err());
    }
}

// ============================================================================
// Running the binary
// ============================================================================

mod binary {
    use std::fs;
    use std::path::Path;

    use assert_cmd::Command;
    use predicates::str::contains;

    /// Two independent single-qubit experiments.
    const PAIR: &str = r#"{
        "name": "pair",
        "qubits": [0, 1],
        "clbits": [0, 1],
        "cregs": [{ "name": "c", "clbits": [0, 1] }],
        "instructions": [
            { "kind": { "Gate": { "kind": { "Standard": "H" } } }, "qubits": [0] },
            { "kind": "Measure", "qubits": [0], "clbits": [0] },
            { "kind": { "Gate": { "kind": { "Standard": "X" } } }, "qubits": [1] },
            { "kind": "Measure", "qubits": [1], "clbits": [1] }
        ]
    }"#;

    fn cmd() -> Command {
        let mut cmd = Command::cargo_bin("qreuse").unwrap();
        cmd.env_remove("QREUSE_MODE")
            .env_remove("QREUSE_VERIFY")
            .env_remove("QREUSE_TARGET");
        cmd
    }

    fn write_pair(dir: &Path) -> String {
        let path = dir.join("pair.json");
        fs::write(&path, PAIR).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_reduce_writes_smaller_circuit() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pair(dir.path());
        let output = dir.path().join("out.json");

        cmd()
            .args(["reduce", "-i", &input, "-o"])
            .arg(&output)
            .args(["--mode", "normal", "--target", "linear:1", "--verify"])
            .assert()
            .success()
            .stdout(contains("Reduction complete"))
            .stdout(contains("fits"));

        let reduced: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(reduced["name"], "pair");
        assert_eq!(reduced["qubits"].as_array().unwrap().len(), 1);
        assert_eq!(reduced["clbits"].as_array().unwrap().len(), 2);
        assert_eq!(reduced["instructions"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_reduce_default_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pair(dir.path());

        cmd().args(["reduce", "-i", &input]).assert().success();

        assert!(dir.path().join("pair_reused.json").exists());
    }

    #[test]
    fn test_reduce_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pair(dir.path());
        let config = dir.path().join("reuse.yaml");
        fs::write(&config, "mode: dual\ntarget: \"star:1\"\n").unwrap();

        cmd()
            .args(["reduce", "-i", &input, "-c"])
            .arg(&config)
            .assert()
            .success()
            .stdout(contains("dual mode"))
            .stdout(contains("fits"));
    }

    #[test]
    fn test_env_selects_mode() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pair(dir.path());

        cmd()
            .env("QREUSE_MODE", "dual")
            .args(["reduce", "-i", &input])
            .assert()
            .success()
            .stdout(contains("dual mode"));
    }

    #[test]
    fn test_reduce_rejects_bad_mode() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pair(dir.path());

        cmd()
            .args(["reduce", "-i", &input, "--mode", "sideways"])
            .assert()
            .failure()
            .stderr(contains("unknown reuse mode"));
    }

    #[test]
    fn test_reduce_missing_file() {
        cmd()
            .args(["reduce", "-i", "/nonexistent/qreuse_circuit.json"])
            .assert()
            .failure()
            .stderr(contains("File not found"));
    }

    #[test]
    fn test_reduce_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.json");
        fs::write(&input, "{ not json").unwrap();

        cmd()
            .args(["reduce", "-i"])
            .arg(&input)
            .assert()
            .failure()
            .stderr(contains("Failed to parse circuit"));
    }

    #[test]
    fn test_cones_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pair(dir.path());

        let output = cmd()
            .args(["cones", "-i", &input, "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let cones: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(cones[0]["qubit"], 0);
        assert_eq!(cones[0]["cone"], serde_json::json!([0]));
        assert_eq!(cones[1]["cone"], serde_json::json!([1]));
    }

    #[test]
    fn test_version() {
        cmd()
            .arg("version")
            .assert()
            .success()
            .stdout(contains("qreuse"));
    }
}
