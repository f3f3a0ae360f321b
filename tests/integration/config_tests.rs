use clap::Parser;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use finddup::cli::Cli;
use finddup::config::{Config, ENV_PREFIX};
use finddup::duplicates::DuplicateFinder;
use finddup::scanner::Field;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.format, "5s");
    assert!(!config.print_tree);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("FINDDUP_FORMAT", "-s5");
    std::env::set_var("FINDDUP_NORMALIZE_UNICODE", "true");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .unwrap();

    assert_eq!(config.format, "-s5");
    assert!(config.normalize_unicode);
    assert!(!config.include_zero);

    // Hash-only listings and numeric switches read as integers
    std::env::set_var("FINDDUP_FORMAT", "5");
    std::env::set_var("FINDDUP_NORMALIZE_UNICODE", "1");

    let config: Config = Config::figment(None).extract().unwrap();
    assert_eq!(config.format, "5");
    assert!(config.normalize_unicode);
    let finder_config = config.finder_config().unwrap();
    assert_eq!(finder_config.format.fields(), [Field::Hash]);

    std::env::remove_var("FINDDUP_FORMAT");
    std::env::remove_var("FINDDUP_NORMALIZE_UNICODE");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
include_zero = true
child_groups = true
print_tree = true
"#,
    )
    .unwrap();

    let config: Config = Config::figment(Some(&config_path)).extract().unwrap();
    assert!(config.include_zero);
    assert!(config.child_groups);
    assert!(config.print_tree);
    assert!(!config.equal_only);
}

#[test]
fn test_config_rejects_wrong_types() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "equal_only = \"sometimes\"\n").unwrap();

    let result: Result<Config, _> = Config::figment(Some(&config_path)).extract();
    assert!(result.is_err());
}

#[test]
fn test_cli_flags_win_over_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "child_groups = false\ninclude_zero = false\n").unwrap();

    let cli = Cli::try_parse_from([
        "finddup",
        "--config",
        config_path.to_str().unwrap(),
        "groups",
        "--child-groups",
        "--zero",
        "listing.md5",
    ])
    .unwrap();
    let config = Config::load(&cli).unwrap();
    assert!(config.child_groups);
    assert!(config.include_zero);
}

#[test]
fn test_file_settings_reach_the_finder() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "equal_only = true\n").unwrap();

    let cli = Cli::try_parse_from([
        "finddup",
        "--config",
        config_path.to_str().unwrap(),
        "groups",
    ])
    .unwrap();
    let finder_config = Config::load(&cli).unwrap().finder_config().unwrap();
    assert!(finder_config.equal_only);

    let listing = "\
11111111111111111111111111111111 100 a/x
22222222222222222222222222222222 50 a/y
11111111111111111111111111111111 100 b/x
";
    let analysis = DuplicateFinder::new(finder_config)
        .analyze_reader(listing.as_bytes(), "listing")
        .unwrap();
    assert_eq!(analysis.summary.grouping.master_slave_passes, 0);
}

#[test]
fn test_config_toml_output_reloads() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    let original = Config {
        child_groups: true,
        ..Config::default()
    };
    fs::write(&config_path, original.to_toml().unwrap()).unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();
    assert_eq!(config, original);
}
