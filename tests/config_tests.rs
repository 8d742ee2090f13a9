use std::io::Write;

use retro_frame::config::{Configuration, from_yaml_file};
use retro_frame::kernels::{FilterKind, UpscalerKind};
use retro_frame::source::TimingStandard;

#[test]
fn parse_empty_config_applies_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.upscaler, UpscalerKind::Bypass);
    assert_eq!(cfg.filter, FilterKind::Smooth);
    assert!(!cfg.fullscreen);
    assert!(cfg.keep_aspect_ratio);
    assert!(cfg.show_emulated_display);
    assert_eq!(cfg.timing_standard, TimingStandard::Pal);
    assert!(cfg.background_image.is_none());
}

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
upscaler: epx
filter: crt
fullscreen: true
keep-aspect-ratio: false
timing-standard: ntsc
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.upscaler, UpscalerKind::Epx);
    assert_eq!(cfg.filter, FilterKind::Crt);
    assert!(cfg.fullscreen);
    assert!(!cfg.keep_aspect_ratio);
    assert_eq!(cfg.timing_standard, TimingStandard::Ntsc);
}

#[test]
fn unknown_fields_are_rejected() {
    let yaml = "scanlines: extra-thick\n";
    assert!(serde_yaml::from_str::<Configuration>(yaml).is_err());
}

#[test]
fn unknown_kernel_name_is_rejected() {
    let yaml = "filter: hqx\n";
    assert!(serde_yaml::from_str::<Configuration>(yaml).is_err());
}

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "upscaler: xbr").unwrap();
    let cfg = from_yaml_file(file.path()).unwrap();
    assert_eq!(cfg.upscaler, UpscalerKind::Xbr);
    cfg.validate().unwrap();
}

#[test]
fn validate_rejects_missing_background_image() {
    let yaml = "background-image: /definitely/not/here.png\n";
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn initial_view_state_mirrors_config() {
    let yaml = "fullscreen: true\nshow-emulated-display: false\n";
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let view = cfg.initial_view_state();
    assert!(view.fullscreen);
    assert!(!view.show_emulated_display);
    assert_eq!(view.upscaler, cfg.upscaler);
    assert_eq!(view.filter, cfg.filter);
}
