// File: tests/config.rs
use serial_test::serial;
use std::env;
use std::fs;
use taskboard::config::{API_URL_ENV, Config, DEFAULT_PAGE_SIZE};
use taskboard::context::{AppContext, TestContext};

fn write_config(ctx: &TestContext, body: &str) {
    fs::write(ctx.get_config_file_path().unwrap(), body).unwrap();
}

#[test]
#[serial]
fn missing_file_is_reported_as_missing() {
    unsafe { env::remove_var(API_URL_ENV) };
    let ctx = TestContext::new();
    let err = Config::load(&ctx).unwrap_err();
    assert!(Config::is_missing_config_error(&err));
}

#[test]
#[serial]
fn broken_file_is_not_treated_as_missing() {
    unsafe { env::remove_var(API_URL_ENV) };
    let ctx = TestContext::new();
    write_config(&ctx, "api_url = [");
    let err = Config::load(&ctx).unwrap_err();
    assert!(!Config::is_missing_config_error(&err));
}

#[test]
#[serial]
fn defaults_fill_in_and_zero_page_size_is_reset() {
    unsafe { env::remove_var(API_URL_ENV) };
    let ctx = TestContext::new();
    write_config(&ctx, "api_url = \"http://localhost:5000/api\"\npage_size = 0\n");

    let cfg = Config::load(&ctx).unwrap();
    assert_eq!(cfg.api_url, "http://localhost:5000/api");
    assert_eq!(cfg.page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.log_level_filter(), log::LevelFilter::Info);
}

#[test]
#[serial]
fn env_var_overrides_file() {
    let ctx = TestContext::new();
    write_config(&ctx, "api_url = \"http://from-file/api\"\n");

    unsafe { env::set_var(API_URL_ENV, "https://from-env.example.com/api") };
    let cfg = Config::load(&ctx).unwrap();
    assert_eq!(cfg.api_url, "https://from-env.example.com/api");

    // Blank values do not count.
    unsafe { env::set_var(API_URL_ENV, "   ") };
    let cfg = Config::load(&ctx).unwrap();
    assert_eq!(cfg.api_url, "http://from-file/api");

    unsafe { env::remove_var(API_URL_ENV) };
}

#[test]
#[serial]
fn save_then_load_keeps_values() {
    unsafe { env::remove_var(API_URL_ENV) };
    let ctx = TestContext::new();
    let cfg = Config {
        api_url: "https://tasks.example.com/api".into(),
        page_size: 25,
        log_level: "debug".into(),
    };
    cfg.save(&ctx).unwrap();
    assert_eq!(Config::load(&ctx).unwrap(), cfg);
    assert_eq!(cfg.log_level_filter(), log::LevelFilter::Debug);
}
