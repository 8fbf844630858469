use otaup_core::{CpuModel, UNKNOWN};

use crate::config::{Config, StoreConfig};

#[test]
fn parses_a_full_config() {
    let config: Config = toml::from_str(
        r#"
        [store]
        kind = "http"
        endpoint = "https://updates.example.com"
        bucket = "head-unit"
        access_key = "secret"

        [device]
        cpu_model = "uis8581a"
        resolution = "1280x800"
        system_build_date = "20250101"
        app_build_timestamp = "20250102"

        [paths]
        work_root = "/data/otaup"
        target_root = "/mnt/sdcard"
        "#,
    )
    .expect("config must parse");

    let probe = config.probe();
    assert_eq!(probe.cpu, CpuModel::Uis8581a);
    assert_eq!(probe.system_build_date, "20250101");
    assert!(matches!(config.store, StoreConfig::Http { .. }));
}

#[test]
fn device_section_is_optional_and_defaults_to_unknown() {
    let config: Config = toml::from_str(
        r#"
        [store]
        kind = "dir"
        root = "/media/usb/updates"

        [paths]
        work_root = "/data/otaup"
        target_root = "/mnt/sdcard"
        "#,
    )
    .expect("config must parse");

    let probe = config.probe();
    assert_eq!(probe.cpu, CpuModel::Unknown);
    assert_eq!(probe.resolution, UNKNOWN);
}

#[test]
fn unknown_keys_are_rejected() {
    let result: Result<Config, _> = toml::from_str(
        r#"
        [store]
        kind = "dir"
        root = "/media/usb/updates"

        [paths]
        work_root = "/data/otaup"
        target_root = "/mnt/sdcard"
        bogus = true
        "#,
    );
    assert!(result.is_err());
}
