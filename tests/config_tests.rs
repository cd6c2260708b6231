use std::time::Duration;

use rust_photo_gallery::config::Configuration;

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
endpoint: "http://localhost:8080/photos"
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.endpoint, "http://localhost:8080/photos");
    assert_eq!(cfg.page_size, 24);
    assert_eq!(cfg.swipe_page_size, 4);
    assert!(cfg.lazy_loading);
    assert!(cfg.lightbox.enabled);
    assert_eq!(cfg.lightbox.fade, Duration::from_millis(250));
}

#[test]
fn parse_with_overrides() {
    let yaml = r#"
endpoint: "https://gallery.example/photos"
page-size: 12
swipe-max-width: 768
lazy-loading: false
lightbox:
  fade: 400ms
columns:
  - min-width: 0
    columns: 2
  - min-width: 1000
    columns: 5
viewport:
  width: 1440
  height: 900
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.page_size, 12);
    assert_eq!(cfg.swipe_max_width, 768);
    assert!(!cfg.lazy_loading);
    assert_eq!(cfg.lightbox.fade, Duration::from_millis(400));
    assert_eq!(cfg.columns.len(), 2);
    assert_eq!(cfg.columns[1].columns, 5);
    assert_eq!(cfg.viewport.width, 1440);
}

#[test]
fn validated_accepts_defaults_with_endpoint() {
    let cfg = Configuration {
        endpoint: "http://localhost:8080/photos".into(),
        ..Configuration::default()
    };
    assert!(cfg.validated().is_ok());
}

#[test]
fn validated_rejects_relative_endpoint() {
    let cfg = Configuration {
        endpoint: "/photos".into(),
        ..Configuration::default()
    };
    assert!(cfg.validated().is_err());
}

#[test]
fn validated_rejects_oversized_page() {
    let cfg = Configuration {
        endpoint: "http://localhost:8080/photos".into(),
        page_size: 101,
        ..Configuration::default()
    };
    assert!(cfg.validated().is_err());
}

#[test]
fn validated_requires_base_breakpoint() {
    let yaml = r#"
endpoint: "http://localhost:8080/photos"
columns:
  - min-width: 600
    columns: 2
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("min-width 0"));
}

#[test]
fn from_yaml_file_reads_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "endpoint: \"http://localhost:8080/photos\"\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.endpoint, "http://localhost:8080/photos");
}
