//! Unit tests for CLI commands

use crate::cli::{check_body, resolve_config, start, Cli, Commands, ServeArgs};
use crate::config::ServiceConfig;
use crate::runtime_config::RuntimeConfig;
use crate::store::CorruptStorePolicy;
use crate::survey::{SurveyAnswer, SurveySubmission};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_serve_command_flags() {
    let cli = Cli::try_parse_from([
        "survey-intake",
        "serve",
        "--addr",
        "127.0.0.1:9999",
        "--data-dir",
        "/tmp/surveys",
        "--store-file",
        "s.json",
        "--on-corrupt-store",
        "overwrite",
    ])
    .unwrap();

    match cli.command {
        Commands::Serve(args) => {
            assert_eq!(args.addr.as_deref(), Some("127.0.0.1:9999"));
            assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/surveys")));
            assert_eq!(args.store_file.as_deref(), Some("s.json"));
            assert_eq!(args.on_corrupt_store, Some(CorruptStorePolicy::Overwrite));
            assert!(args.config.is_none());
        }
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_serve_rejects_unknown_policy() {
    let result = Cli::try_parse_from(["survey-intake", "serve", "--on-corrupt-store", "shrug"]);
    assert!(result.is_err());
}

#[test]
fn test_check_command_exists() {
    let cli = Cli::try_parse_from(["survey-intake", "check", "--body", "body.json"]).unwrap();
    match cli.command {
        Commands::Check { body } => assert_eq!(body, PathBuf::from("body.json")),
        _ => panic!("Expected Check command"),
    }
}

#[test]
fn test_flags_override_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "server:\n  addr: 127.0.0.1:1000\nstore:\n  file_name: from_file.json\n  on_corrupt: overwrite"
    )
    .unwrap();

    let args = ServeArgs {
        config: Some(file.path().to_path_buf()),
        addr: Some("127.0.0.1:2000".to_string()),
        ..ServeArgs::default()
    };
    let cfg = resolve_config(&args).unwrap();
    assert_eq!(cfg.server.addr, "127.0.0.1:2000");
    assert_eq!(cfg.store.file_name, "from_file.json");
    assert_eq!(cfg.store.on_corrupt, CorruptStorePolicy::Overwrite);
}

#[test]
fn test_resolve_config_validates() {
    let args = ServeArgs {
        store_file: Some("nested/file.json".to_string()),
        ..ServeArgs::default()
    };
    assert!(resolve_config(&args).is_err());
}

#[test]
fn test_check_body() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.json");
    std::fs::write(
        &good,
        r#"{"submissionId":"s1","groupId":"g1","answers":[{"questionId":1,"answer":"A"}],"timestamp":"2024-05-01T10:00:00Z"}"#,
    )
    .unwrap();
    assert!(check_body(&good).is_ok());

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"submissionId":"s1","groupId":"  ","answers":[1],"timestamp":"t"}"#)
        .unwrap();
    let err = check_body(&bad).unwrap_err();
    assert_eq!(err.to_string(), "GroupId cannot be empty");

    assert!(check_body(&dir.path().join("missing.json")).is_err());
}

#[test]
fn test_shutdown_drains_writer() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = ServiceConfig::default();
    config.server.addr = "127.0.0.1:0".to_string();
    config.store.data_dir = dir.path().join("data");

    let running = start(&config, RuntimeConfig::default()).unwrap();
    let writer = running.writer.clone();
    let appender = std::thread::spawn(move || {
        for i in 0..5 {
            let sub = SurveySubmission::new(
                format!("s-{i}"),
                "g",
                vec![SurveyAnswer::new(1, "x")],
                "t",
            );
            writer.append(sub).unwrap();
        }
    });
    appender.join().unwrap();

    running.shutdown().unwrap();
    let text = std::fs::read_to_string(config.file_store().path()).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 5);
}
