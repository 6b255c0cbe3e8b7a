use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use kamishibai::config::Configuration;

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
collection-path: "/var/lib/kamishibai/scenes-demo"
overlay:
  status-delay: 250ms
  controls-delay: 600ms
  idle-timeout: 4s
  pointer-grace: 400ms
autoplay:
  base-interval: 1800ms
  min-speed: 0.25
  max-speed: 4.0
  manual-pause: 3s
notice:
  duration: 1500ms
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        cfg.collection_path,
        Some(PathBuf::from("/var/lib/kamishibai/scenes-demo"))
    );
    assert_eq!(cfg.overlay.status_delay, Duration::from_millis(250));
    assert_eq!(cfg.overlay.controls_delay, Duration::from_millis(600));
    assert_eq!(cfg.overlay.idle_timeout, Duration::from_secs(4));
    assert_eq!(cfg.overlay.pointer_grace, Duration::from_millis(400));
    assert_eq!(cfg.autoplay.base_interval, Duration::from_millis(1800));
    assert!((cfg.autoplay.min_speed - 0.25).abs() < f32::EPSILON);
    assert!((cfg.autoplay.max_speed - 4.0).abs() < f32::EPSILON);
    assert_eq!(cfg.autoplay.manual_pause, Duration::from_secs(3));
    assert_eq!(cfg.notice.duration, Duration::from_millis(1500));
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.collection_path, None);
    assert_eq!(cfg.overlay.status_delay, Duration::from_millis(200));
    assert_eq!(cfg.overlay.controls_delay, Duration::from_millis(500));
    assert_eq!(cfg.overlay.idle_timeout, Duration::from_secs(3));
    assert_eq!(cfg.overlay.pointer_grace, Duration::from_millis(500));
    assert_eq!(cfg.autoplay.base_interval, Duration::from_millis(2400));
    assert!((cfg.autoplay.min_speed - 0.5).abs() < f32::EPSILON);
    assert!((cfg.autoplay.max_speed - 3.0).abs() < f32::EPSILON);
    assert_eq!(cfg.autoplay.manual_pause, Duration::from_millis(2400));
    assert_eq!(cfg.notice.duration, Duration::from_secs(2));
}

#[test]
fn partial_sections_keep_the_other_defaults() {
    let yaml = r#"
overlay:
  status-delay: 100ms
autoplay:
  max-speed: 2.0
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.overlay.status_delay, Duration::from_millis(100));
    assert_eq!(cfg.overlay.controls_delay, Duration::from_millis(500));
    assert!((cfg.autoplay.min_speed - 0.5).abs() < f32::EPSILON);
    assert!((cfg.autoplay.max_speed - 2.0).abs() < f32::EPSILON);
}

#[test]
fn defaults_pass_validation() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert!(cfg.validated().is_ok());
}

#[test]
fn rejects_inverted_reveal_delays() {
    let yaml = r#"
overlay:
  status-delay: 800ms
  controls-delay: 300ms
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err().to_string();
    assert!(err.contains("status-delay"), "unexpected error: {err}");
}

#[test]
fn rejects_idle_timeout_inside_the_reveal() {
    let yaml = r#"
overlay:
  idle-timeout: 400ms
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err().to_string();
    assert!(err.contains("idle-timeout"), "unexpected error: {err}");
}

#[test]
fn rejects_zero_base_interval() {
    let yaml = r#"
autoplay:
  base-interval: 0s
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err().to_string();
    assert!(err.contains("base-interval"), "unexpected error: {err}");
}

#[test]
fn rejects_inverted_speed_bounds() {
    let yaml = r#"
autoplay:
  min-speed: 2.0
  max-speed: 1.0
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err().to_string();
    assert!(err.contains("min-speed"), "unexpected error: {err}");
}

#[test]
fn rejects_zero_notice_duration() {
    let yaml = r#"
notice:
  duration: 0s
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn loads_from_a_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "collection-path: /data/scenes-demo").unwrap();
    writeln!(file, "autoplay:").unwrap();
    writeln!(file, "  base-interval: 5s").unwrap();

    let cfg = Configuration::from_yaml_file(file.path()).unwrap();
    assert_eq!(
        cfg.collection_path,
        Some(PathBuf::from("/data/scenes-demo"))
    );
    assert_eq!(cfg.autoplay.base_interval, Duration::from_secs(5));
}

#[test]
fn missing_file_reports_the_path() {
    let err = Configuration::from_yaml_file(std::path::Path::new("/no/such/config.yaml"))
        .unwrap_err()
        .to_string();
    assert!(
        err.contains("/no/such/config.yaml"),
        "unexpected error: {err}"
    );
}
