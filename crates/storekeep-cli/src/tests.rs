use super::*;

#[test]
fn parses_status_defaults() {
    let cli = Cli::try_parse_from(["storekeep", "status"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Status {
            json: false,
            fail_on_problems: false
        }
    ));
}

#[test]
fn parses_status_flags() {
    let cli = Cli::try_parse_from(["storekeep", "status", "--json", "--fail-on-problems"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Status {
            json: true,
            fail_on_problems: true
        }
    ));
}

#[test]
fn parses_duplicates_command() {
    let cli = Cli::try_parse_from(["storekeep", "duplicates"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Duplicates { json: false }));
}

#[test]
fn parses_products_and_env_check() {
    let cli = Cli::try_parse_from(["storekeep", "products"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Products));

    let cli = Cli::try_parse_from(["storekeep", "env-check"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::EnvCheck));
}

#[test]
fn parses_stamp_version_with_index() {
    let cli = Cli::try_parse_from(["storekeep", "stamp-version", "--index", "public/index.html"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::StampVersion { index: Some(ref p) } if p == &PathBuf::from("public/index.html")
    ));
}

#[test]
fn parses_fix_mappings_dry_run() {
    let cli = Cli::try_parse_from(["storekeep", "fix-mappings", "--dry-run"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::FixMappings { dry_run: true }));

    let cli = Cli::try_parse_from(["storekeep", "fix-mappings"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::FixMappings { dry_run: false }));
}

#[test]
fn log_directive_prefers_rust_log_then_configured_level() {
    let env = |pairs: &'static [(&'static str, &'static str)]| {
        move |var: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == var)
                .map(|(_, v)| (*v).to_string())
        }
    };
    assert_eq!(log_directive(env(&[])), "info");
    assert_eq!(log_directive(env(&[("STOREKEEP_LOG_LEVEL", "debug")])), "debug");
    assert_eq!(
        log_directive(env(&[("RUST_LOG", "warn"), ("STOREKEEP_LOG_LEVEL", "debug")])),
        "warn"
    );
}

#[test]
fn bad_log_level_falls_back_to_info() {
    let lookup = |var: &str| (var == "STOREKEEP_LOG_LEVEL").then(|| "storekeep=verbose".to_string());
    assert_eq!(log_directive(lookup), "info");
}

#[test]
fn missing_command_is_an_error() {
    assert!(Cli::try_parse_from(["storekeep"]).is_err());
}

#[test]
fn unknown_command_is_an_error() {
    assert!(Cli::try_parse_from(["storekeep", "sync"]).is_err());
}
