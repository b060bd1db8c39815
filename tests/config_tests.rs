// Tests for TOML config loading and defaults.

use std::fs;

use talkdrill::questions::Level;
use talkdrill::Config;

#[test]
fn defaults_are_sensible() {
    let cfg = Config::default();

    assert_eq!(cfg.service.name, "talkdrill");
    assert_eq!(cfg.service.http.bind, "127.0.0.1");
    assert_eq!(cfg.service.http.port, 8080);
    assert_eq!(cfg.audio.sample_rate, 16000);
    assert_eq!(cfg.audio.channels, 1);
    assert_eq!(cfg.speech.language, "en-US");
    assert!(cfg.speech.nats_url.is_none());
    assert!(cfg.store.base_url.is_none());
    assert!(cfg.coach.perturbation_seed.is_none());
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("talkdrill.toml");
    fs::write(
        &path,
        r#"
[service.http]
port = 9090

[speech]
language = "en-GB"
nats_url = "nats://localhost:4222"

[coach]
level = "advanced"
"#,
    )
    .expect("write config");

    let name = dir.path().join("talkdrill");
    let cfg = Config::load(name.to_str().expect("utf-8 path")).expect("load config");

    assert_eq!(cfg.service.http.port, 9090);
    assert_eq!(cfg.service.http.bind, "127.0.0.1", "unset keys keep defaults");
    assert_eq!(cfg.speech.language, "en-GB");
    assert_eq!(cfg.speech.nats_url.as_deref(), Some("nats://localhost:4222"));
    assert_eq!(cfg.coach.level, Level::Advanced);
    assert!(cfg.store.base_url.is_none());
}

#[test]
fn missing_file_is_an_error() {
    assert!(Config::load("definitely/not/here").is_err());
}
