//! Integration tests for the chemcache CLI
//!
//! Every test runs against the JSON fixture remote with its own state
//! directory and config path, so nothing touches the network or the user's
//! real cache.

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/compounds.json");

    /// Isolated state and config for one test
    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("chemcache");
            cmd.env_remove("RUST_LOG")
                .env("CHEMCACHE_PLAIN", "1")
                .arg("--state-dir")
                .arg(self.dir.path().join("state"))
                .arg("--config")
                .arg(self.dir.path().join("config.toml"))
                .arg("--fixture")
                .arg(FIXTURE);
            cmd
        }
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("chemcache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("compound lookups"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("chemcache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("chemcache"));
    }

    #[test]
    fn lookup_by_name_prints_record() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["lookup", "Aspirin", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"id\": 2244"))
            .stdout(predicate::str::contains("C9H8O4"));
    }

    #[test]
    fn lookup_by_id_plain() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["lookup", "2519", "--format", "plain"])
            .assert()
            .success()
            .stdout("2519\n");
    }

    #[test]
    fn lookup_table_lists_properties() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["lookup", "caffeine"])
            .assert()
            .success()
            .stdout(predicate::str::contains("CID 2519"))
            .stdout(predicate::str::contains("MolecularFormula: C8H10N4O2"));
    }

    #[test]
    fn lookup_unknown_compound_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["lookup", "invalid-xyz", "--format", "json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No compound found for 'invalid-xyz'"));
    }

    #[test]
    fn lookup_service_failure_is_reported() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["lookup", "flaky-compound"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("service unavailable"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn batch_collects_failures() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args([
                "batch",
                "aspirin",
                "invalid-xyz",
                "caffeine",
                "--delay-ms",
                "0",
                "--format",
                "json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"total_processed\": 3"))
            .stdout(predicate::str::contains("Compound not found"))
            .stdout(predicate::str::contains("\"cancelled\": false"));
    }

    #[test]
    fn batch_reads_identifier_file() {
        let sandbox = Sandbox::new();
        let list = sandbox.dir.path().join("compounds.txt");
        std::fs::write(&list, "# solvents\nethanol\n\n2244\n").unwrap();

        sandbox
            .cmd()
            .args(["batch", "--delay-ms", "0", "--chunk-size", "1", "--format", "plain", "--file"])
            .arg(&list)
            .assert()
            .success()
            .stdout(predicate::str::contains("ethanol\t702"))
            .stdout(predicate::str::contains("2244\t2244"));
    }

    #[test]
    fn batch_table_shows_progress_and_summary() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["batch", "aspirin", "ethanol", "--delay-ms", "0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[2/2] 100% ethanol"))
            .stdout(predicate::str::contains("2 succeeded, 0 failed"));
    }

    #[test]
    fn batch_without_identifiers_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .arg("batch")
            .assert()
            .failure()
            .stderr(predicate::str::contains("No identifiers given"));
    }

    #[test]
    fn offline_mode_serves_only_cached_compounds() {
        let sandbox = Sandbox::new();
        sandbox.cmd().args(["lookup", "aspirin"]).assert().success();
        sandbox.cmd().args(["offline", "on"]).assert().success();

        sandbox
            .cmd()
            .args(["offline", "status"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline mode: on"));

        sandbox
            .cmd()
            .args(["lookup", "ASPIRIN", "--format", "plain"])
            .assert()
            .success()
            .stdout("2244\n");

        sandbox
            .cmd()
            .args(["lookup", "caffeine"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not available offline"))
            .stderr(predicate::str::contains("chemcache offline off"));

        sandbox.cmd().args(["offline", "off"]).assert().success();
        sandbox.cmd().args(["lookup", "caffeine"]).assert().success();
    }

    #[test]
    fn offline_batch_fails_per_item() {
        let sandbox = Sandbox::new();
        sandbox.cmd().args(["offline", "on"]).assert().success();

        sandbox
            .cmd()
            .args(["batch", "aspirin", "2519", "--delay-ms", "0", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("aspirin\tCompound 'aspirin' is not available offline"))
            .stdout(predicate::str::contains("2519\tCompound '2519' is not available offline"));
    }

    #[test]
    fn cache_stats_and_clear() {
        let sandbox = Sandbox::new();
        sandbox.cmd().args(["lookup", "aspirin"]).assert().success();

        sandbox
            .cmd()
            .args(["cache", "stats", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("compound-by-id\t1"))
            .stdout(predicate::str::contains("name-to-id\t1"));

        sandbox
            .cmd()
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared cached lookups"));

        sandbox
            .cmd()
            .args(["cache", "stats", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"compound-by-id\": 0"));
    }

    #[test]
    fn cache_clear_without_yes_keeps_entries() {
        let sandbox = Sandbox::new();
        sandbox.cmd().args(["lookup", "aspirin"]).assert().success();

        sandbox
            .cmd()
            .args(["cache", "clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Nothing removed"));

        sandbox
            .cmd()
            .args(["cache", "stats", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("compound-by-id\t1"));
    }

    #[test]
    fn cache_prune_runs() {
        let sandbox = Sandbox::new();
        sandbox.cmd().args(["lookup", "ethanol"]).assert().success();
        sandbox
            .cmd()
            .args(["cache", "prune"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Pruned 0 expired entries"));
    }

    #[test]
    fn structures_lifecycle() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["structures", "save", "ring", "--json", r#"{"smiles": "C1CCCCC1"}"#])
            .assert()
            .success();

        sandbox
            .cmd()
            .args(["structures", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout("ring\n");

        sandbox
            .cmd()
            .args(["structures", "show", "ring"])
            .assert()
            .success()
            .stdout(predicate::str::contains("C1CCCCC1"));

        // Clearing the lookup cache leaves saved structures alone
        sandbox.cmd().args(["cache", "clear", "--yes"]).assert().success();

        sandbox
            .cmd()
            .args(["structures", "delete", "ring", "--yes"])
            .assert()
            .success();

        sandbox
            .cmd()
            .args(["structures", "show", "ring"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Saved structure not found: ring"));
    }

    #[test]
    fn structures_save_rejects_invalid_json() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["structures", "save", "bad", "--json", "{not json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not valid JSON"));
    }

    #[test]
    fn config_path_and_show() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));

        sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("max_per_second = 5"));
    }

    #[test]
    fn config_set_persists() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "set", "cache.ttl_days", "3"])
            .assert()
            .success();

        sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ttl_days = 3"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "set", "cache.colour", "x"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("Valid keys"));
    }

    #[test]
    fn invalid_config_suggests_init() {
        let sandbox = Sandbox::new();
        std::fs::write(sandbox.dir.path().join("config.toml"), "[cache]\nttl_days = \"soon\"").unwrap();

        sandbox
            .cmd()
            .args(["cache", "stats"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("config init --force"));

        sandbox
            .cmd()
            .args(["config", "init", "--force"])
            .assert()
            .success();

        sandbox.cmd().args(["cache", "stats"]).assert().success();
    }
}
