use super::*;

#[test]
fn cpu_model_round_trip() {
    assert_eq!(CpuModel::parse("UIS8581A"), CpuModel::Uis8581a);
    assert_eq!(CpuModel::parse("uis8141e"), CpuModel::Uis8141e);
    assert_eq!(CpuModel::parse("RK3566"), CpuModel::Unknown);
    assert_eq!(CpuModel::Uis8581a.as_str(), "UIS8581A");
}

#[test]
fn mcu_tag_follows_cpu_model() {
    assert_eq!(CpuModel::Uis8581a.mcu_tag(), McuTag::L6315);
    assert_eq!(CpuModel::Uis8141e.mcu_tag(), McuTag::L6523);
    // Unknown hardware still gets the default firmware line.
    assert_eq!(CpuModel::Unknown.mcu_tag(), McuTag::L6315);
    assert_eq!(McuTag::L6523.archive_name(), "L6523_MCU.zip");
    assert_eq!(McuTag::L6315.version_token(), "L6315_MCU");
}

#[test]
fn resolution_swaps_larger_dimension_first_reading() {
    // The catalog stores the smaller dimension first; a landscape reading
    // must be swapped before matching.
    let fp = DeviceFingerprint::new(CpuModel::Uis8581a, "1280x800");
    assert_eq!(fp.resolution, "800x1280");
    assert_eq!(fp.catalog_token(), "UIS8581A_800x1280");

    let fp = DeviceFingerprint::new(CpuModel::Uis8581a, "800x1280");
    assert_eq!(fp.resolution, "800x1280");
}

#[test]
fn resolution_keeps_unparseable_input() {
    let fp = DeviceFingerprint::new(CpuModel::Unknown, "Unknown");
    assert_eq!(fp.resolution, "Unknown");
    let fp = DeviceFingerprint::new(CpuModel::Unknown, "800xabc");
    assert_eq!(fp.resolution, "800xabc");
}

#[test]
fn version_dates_compare_numerically() {
    assert!(update_available("20250306", "20250101"));
    assert!(!update_available("20250101", "20250306"));
    assert!(!update_available("20250306", "20250306"));
    // Numeric, not lexical: 20250101 > 20241231.
    assert!(update_available("20250101", "20241231"));
    assert!(!update_available("20241231", "20250101"));
}

#[test]
fn unknown_local_version_counts_as_older() {
    assert!(update_available("20250306", UNKNOWN));
    assert!(update_available("20250306", ""));
}

#[test]
fn unparseable_remote_version_is_never_an_update() {
    assert!(!update_available(UNKNOWN, "20250101"));
    assert!(!update_available("2025030", "20250101"));
    assert!(!update_available("202503066", "20250101"));
}

#[test]
fn candidate_rejects_empty_object_key() {
    assert!(UpdateCandidate::new("20250306", "").is_none());
    let candidate =
        UpdateCandidate::new("20250306", "firmware/System/UIS8581A_800x1280_20250306.zip")
            .expect("valid candidate");
    assert_eq!(candidate.version, "20250306");
}

#[test]
fn system_object_names_parse() {
    let (token, date) =
        parse_system_object_name("UIS8581A_800x1280_20250306.zip").expect("must parse");
    assert_eq!(token, "UIS8581A_800x1280");
    assert_eq!(date, "20250306");

    assert!(parse_system_object_name("UIS8581A_20250306.zip").is_none());
    assert!(parse_system_object_name("UIS8581A_800x1280_2025.zip").is_none());
    assert!(parse_system_object_name("readme.txt").is_none());
}

#[test]
fn app_object_names_parse_new_and_legacy_formats() {
    let (token, date) =
        parse_app_object_name("ALLApp_UIS8581A_800x1280_20250306.zip").expect("must parse");
    assert_eq!(token.as_deref(), Some("UIS8581A_800x1280"));
    assert_eq!(date, "20250306");

    // Legacy bundles carry no device token and match by date alone.
    let (token, date) = parse_app_object_name("ALLApp_20250101.zip").expect("must parse");
    assert!(token.is_none());
    assert_eq!(date, "20250101");

    assert!(parse_app_object_name("ALLApp.zip").is_none());
}

#[test]
fn mcu_name_patterns() {
    assert!(is_mcu_dir_name("L6315_MCU"));
    assert!(is_mcu_dir_name("L123_MCU"));
    assert!(!is_mcu_dir_name("L_MCU"));
    assert!(!is_mcu_dir_name("X6315_MCU"));
    assert!(!is_mcu_dir_name("L6315_MCU.zip"));

    assert!(is_mcu_archive_name("L6315_MCU.zip"));
    assert!(!is_mcu_archive_name("L6315_MCU.tar"));
}

#[test]
fn numeric_prefixed_zip_detection() {
    assert!(is_numeric_prefixed_zip("6316_update.zip"));
    assert!(is_numeric_prefixed_zip("63160000.zip"));
    assert!(!is_numeric_prefixed_zip("631_update.zip"));
    assert!(!is_numeric_prefixed_zip("update_6316.zip"));
    assert!(!is_numeric_prefixed_zip("6316_update.tar"));
}

#[test]
fn key_file_name_extraction() {
    assert_eq!(
        file_name_of_key("firmware/MCU/L6315_MCU.zip"),
        "L6315_MCU.zip"
    );
    assert_eq!(file_name_of_key("plain.zip"), "plain.zip");
}

#[test]
fn cancel_flag_is_shared_and_resettable() {
    let flag = CancelFlag::new();
    let clone = flag.clone();
    assert!(!flag.is_cancelled());
    clone.cancel();
    assert!(flag.is_cancelled());
    flag.reset();
    assert!(!clone.is_cancelled());
}
