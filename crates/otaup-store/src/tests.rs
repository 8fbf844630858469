use super::*;

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use otaup_core::{CancelFlag, CpuModel, DeviceFingerprint, McuTag};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

fn test_dir() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let sequence = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut path = std::env::temp_dir();
    path.push(format!(
        "otaup-store-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        sequence
    ));
    fs::create_dir_all(&path).expect("must create test dir");
    path
}

fn put_object(root: &PathBuf, key: &str, contents: &[u8]) {
    let path = root.join(key);
    fs::create_dir_all(path.parent().expect("object key has parent")).expect("mkdir");
    fs::write(path, contents).expect("write object");
}

fn fingerprint_a() -> DeviceFingerprint {
    // Landscape reading; must be swapped before matching.
    DeviceFingerprint::new(CpuModel::Uis8581a, "1280x800")
}

#[test]
fn system_scan_matches_swapped_resolution_and_picks_latest() {
    let root = test_dir();
    put_object(
        &root,
        "firmware/System/UIS8581A_800x1280_20250101.zip",
        b"old",
    );
    put_object(
        &root,
        "firmware/System/UIS8581A_800x1280_20250306.zip",
        b"new",
    );
    put_object(
        &root,
        "firmware/System/UIS8141E_800x1280_20990101.zip",
        b"other-cpu",
    );
    let store = DirStore::new(&root);

    let candidate = find_system_update(&store, &fingerprint_a())
        .expect("scan must succeed")
        .expect("candidate expected");
    assert_eq!(candidate.version, "20250306");
    assert_eq!(
        candidate.object_key,
        "firmware/System/UIS8581A_800x1280_20250306.zip"
    );
}

#[test]
fn system_scan_compares_dates_numerically() {
    let root = test_dir();
    put_object(
        &root,
        "firmware/System/UIS8581A_800x1280_20241231.zip",
        b"older",
    );
    put_object(
        &root,
        "firmware/System/UIS8581A_800x1280_20250101.zip",
        b"newer",
    );
    let store = DirStore::new(&root);

    let candidate = find_system_update(&store, &fingerprint_a())
        .expect("scan must succeed")
        .expect("candidate expected");
    assert_eq!(candidate.version, "20250101");
}

#[test]
fn system_scan_skips_empty_objects() {
    let root = test_dir();
    put_object(&root, "firmware/System/UIS8581A_800x1280_20250306.zip", b"");
    let store = DirStore::new(&root);

    assert!(find_system_update(&store, &fingerprint_a())
        .expect("scan must succeed")
        .is_none());
}

#[test]
fn empty_catalog_folder_yields_no_candidate() {
    let root = test_dir();
    let store = DirStore::new(&root);
    assert!(find_system_update(&store, &fingerprint_a())
        .expect("scan must succeed")
        .is_none());
}

#[test]
fn mcu_scan_matches_exact_archive_name() {
    let root = test_dir();
    put_object(&root, "firmware/MCU/L6315_MCU.zip", b"mcu");
    put_object(&root, "firmware/MCU/L6523_MCU.zip", b"other");
    let store = DirStore::new(&root);

    let candidate = find_mcu_update(&store, McuTag::L6315)
        .expect("scan must succeed")
        .expect("candidate expected");
    assert_eq!(candidate.version, "L6315_MCU");
    assert_eq!(candidate.object_key, "firmware/MCU/L6315_MCU.zip");

    assert!(find_mcu_update(&DirStore::new(test_dir()), McuTag::L6315)
        .expect("scan must succeed")
        .is_none());
}

#[test]
fn app_scan_accepts_new_and_legacy_names() {
    let root = test_dir();
    put_object(
        &root,
        "firmware/System APP/ALLApp_UIS8581A_800x1280_20250201.zip",
        b"new-format",
    );
    put_object(
        &root,
        "firmware/System APP/ALLApp_20250306.zip",
        b"legacy-format",
    );
    put_object(
        &root,
        "firmware/System APP/ALLApp_UIS8141E_800x1280_20990101.zip",
        b"other-device",
    );
    let store = DirStore::new(&root);

    // The legacy name has no device token, so it competes on date alone.
    let candidate = find_app_update(&store, &fingerprint_a())
        .expect("scan must succeed")
        .expect("candidate expected");
    assert_eq!(candidate.version, "20250306");
    assert_eq!(candidate.object_key, "firmware/System APP/ALLApp_20250306.zip");
}

#[test]
fn download_reports_progress_and_writes_bytes() {
    let root = test_dir();
    let payload = vec![7u8; 20000];
    put_object(&root, "firmware/MCU/L6315_MCU.zip", &payload);
    let store = DirStore::new(&root);

    let dest = root.join("work/L6315_MCU.zip");
    let mut samples = Vec::new();
    store
        .download(
            "firmware/MCU/L6315_MCU.zip",
            &dest,
            &mut |transferred, total| samples.push((transferred, total)),
            &CancelFlag::new(),
        )
        .expect("download must succeed");

    assert_eq!(fs::read(&dest).expect("dest readable"), payload);
    assert!(samples.len() >= 2, "chunked transfer expected");
    assert_eq!(samples.last().copied(), Some((20000, 20000)));
    // Non-decreasing progress.
    assert!(samples.windows(2).all(|w| w[0].0 <= w[1].0));
}

#[test]
fn cancelled_download_removes_partial_file() {
    let root = test_dir();
    put_object(&root, "firmware/MCU/L6315_MCU.zip", &vec![1u8; 50000]);
    let store = DirStore::new(&root);
    let cancel = CancelFlag::new();
    cancel.cancel();

    let dest = root.join("work/L6315_MCU.zip");
    let result = store.download(
        "firmware/MCU/L6315_MCU.zip",
        &dest,
        &mut |_, _| {},
        &cancel,
    );
    assert!(matches!(result, Err(DownloadError::Cancelled)));
    assert!(!dest.exists(), "partial download must be cleaned up");
}

#[test]
fn missing_object_is_an_io_error() {
    let root = test_dir();
    let store = DirStore::new(&root);
    let result = store.download(
        "firmware/MCU/L9999_MCU.zip",
        &root.join("out.zip"),
        &mut |_, _| {},
        &CancelFlag::new(),
    );
    assert!(matches!(result, Err(DownloadError::Io(_))));
}

#[test]
fn catalog_listing_document_parses_from_a_reader() {
    let document = br#"[
        {"key": "firmware/MCU/L6315_MCU.zip", "size": 4096,
         "sha256": "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"},
        {"key": "firmware/System/", "size": 0}
    ]"#;

    let objects: Vec<ObjectSummary> =
        serde_json::from_reader(&document[..]).expect("listing must parse");
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].key, "firmware/MCU/L6315_MCU.zip");
    assert_eq!(objects[0].size, 4096);
    assert!(objects[0].sha256.is_some());
    // The digest is optional in the listing document.
    assert_eq!(objects[1].sha256, None);
}

#[test]
fn listing_keys_use_forward_slashes_and_sizes() {
    let root = test_dir();
    put_object(&root, "firmware/System APP/ALLApp_20250306.zip", b"12345");
    let store = DirStore::new(&root);

    let objects = store
        .list_objects("firmware/System APP/")
        .expect("listing must succeed");
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].key, "firmware/System APP/ALLApp_20250306.zip");
    assert_eq!(objects[0].size, 5);
}
