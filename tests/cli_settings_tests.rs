//! End-to-end tests for `blasti settings` commands.

use serde_json::Value;
use std::fs;

mod fixtures;
use fixtures::*;

/// Path to the blasti binary (set by cargo at compile time)
fn blasti_bin() -> &'static str {
    env!("CARGO_BIN_EXE_blasti")
}

#[test]
fn test_show_defaults_without_settings_file() {
    let env = TestEnv::empty();
    let output = env.run(blasti_bin(), &["settings", "show", "--json"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let json: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["general"]["max_accessories"], 50);
    assert_eq!(json["general"]["mobile_optimization"], true);
    assert_eq!(json["display"]["default_theme"], "default");
    assert_eq!(json["display"]["default_width"], "100%");
    assert_eq!(json["performance"]["model_quality"], "auto");
    assert_eq!(json["advanced"]["debug_mode"], false);
    assert!(!env.settings_path().exists());
}

#[test]
fn test_show_human_readable_tabs() {
    let env = TestEnv::empty();
    let output = env.run(blasti_bin(), &["settings", "show"]);
    assert_eq!(output.status.code(), Some(0));

    let stdout = stdout(&output);
    for tab in ["General:", "Display:", "Performance:", "Advanced:"] {
        assert!(stdout.contains(tab), "missing {tab}");
    }
    assert!(stdout.contains("Max Accessories:     50"));
}

#[test]
fn test_show_single_tab() {
    let env = TestEnv::empty();
    let output = env.run(blasti_bin(), &["settings", "show", "--tab", "#performance", "--json"]);
    assert_eq!(output.status.code(), Some(0));

    let json: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["model_caching"], true);
    assert!(json.get("general").is_none());
}

#[test]
fn test_set_persists_values() {
    let env = TestEnv::empty();
    let output = env.run(
        blasti_bin(),
        &[
            "settings", "set", "--max-accessories", "25", "--theme", "dark", "--height", "70vh",
            "--model-quality", "low", "--api-endpoint", "https://shop.example/wp-json",
        ],
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(env.settings_path().exists());

    let content = fs::read_to_string(env.settings_path()).unwrap();
    assert!(content.contains("max_accessories = 25"));

    let output = env.run(blasti_bin(), &["settings", "show", "--json"]);
    let json: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["general"]["max_accessories"], 25);
    assert_eq!(json["display"]["default_theme"], "dark");
    assert_eq!(json["display"]["default_height"], "70vh");
    assert_eq!(json["performance"]["model_quality"], "low");
    assert_eq!(json["advanced"]["api_endpoint"], "https://shop.example/wp-json");
}

#[test]
fn test_set_keeps_unrelated_values() {
    let env = TestEnv::empty();
    env.run(blasti_bin(), &["settings", "set", "--theme", "light"]);
    env.run(blasti_bin(), &["settings", "set", "--debug", "true"]);

    let output = env.run(blasti_bin(), &["settings", "show", "--json"]);
    let json: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["display"]["default_theme"], "light");
    assert_eq!(json["advanced"]["debug_mode"], true);
}

#[test]
fn test_set_requires_an_option() {
    let env = TestEnv::empty();
    let output = env.run(blasti_bin(), &["settings", "set"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("At least one setting"));
}

#[test]
fn test_set_rejects_invalid_values() {
    let env = TestEnv::empty();
    let cases: &[&[&str]] = &[
        &["--max-accessories", "0"],
        &["--max-accessories", "101"],
        &["--theme", "neon"],
        &["--width", "wide"],
        &["--model-quality", "ultra"],
        &["--debug", "maybe"],
        &["--api-endpoint", "not a url"],
    ];

    for case in cases {
        let mut args = vec!["settings", "set"];
        args.extend_from_slice(case);
        let output = env.run(blasti_bin(), &args);
        assert_eq!(output.status.code(), Some(1), "args: {case:?}");
    }

    assert!(!env.settings_path().exists());
}

#[test]
fn test_corrupt_settings_file_is_io_error() {
    let env = TestEnv::empty();
    fs::write(env.settings_path(), "[general\nmax_accessories = ").unwrap();

    let output = env.run(blasti_bin(), &["settings", "show"]);
    assert_eq!(output.status.code(), Some(2));
}
