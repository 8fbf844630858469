use otaup_core::{
    file_name_of_key, parse_app_object_name, parse_system_object_name, parse_version_date,
    DeviceFingerprint, McuTag, UpdateCandidate, APP_PREFIX, MCU_PREFIX, SYSTEM_PREFIX,
};
use tracing::debug;

use crate::{CatalogError, ObjectSummary, PackageStore};

/// Newest system image matching the device fingerprint, if any.
pub fn find_system_update(
    store: &dyn PackageStore,
    fingerprint: &DeviceFingerprint,
) -> Result<Option<UpdateCandidate>, CatalogError> {
    let objects = store.list_objects(SYSTEM_PREFIX)?;
    let want = fingerprint.catalog_token();
    debug!(token = %want, objects = objects.len(), "scanning system catalog");

    let mut best: Option<(u64, UpdateCandidate)> = None;
    for object in objects.iter().filter(|o| is_real_object(o)) {
        let Some((token, date)) = parse_system_object_name(file_name_of_key(&object.key)) else {
            continue;
        };
        if !token.eq_ignore_ascii_case(&want) {
            continue;
        }
        consider(&mut best, &date, object);
    }
    Ok(best.map(|(_, candidate)| candidate))
}

/// MCU firmware for the given tag. The catalog holds exactly one archive
/// per firmware line, matched by name.
pub fn find_mcu_update(
    store: &dyn PackageStore,
    tag: McuTag,
) -> Result<Option<UpdateCandidate>, CatalogError> {
    let objects = store.list_objects(MCU_PREFIX)?;
    let want = tag.archive_name();
    debug!(archive = %want, objects = objects.len(), "scanning MCU catalog");

    for object in objects.iter().filter(|o| is_real_object(o)) {
        if file_name_of_key(&object.key).eq_ignore_ascii_case(&want) {
            let candidate = UpdateCandidate::new(tag.version_token(), &object.key)
                .map(|c| c.with_sha256(object.sha256.clone()));
            return Ok(candidate);
        }
    }
    Ok(None)
}

/// Newest app bundle for the device. New-format names must match the
/// fingerprint token; legacy names (date suffix only) are accepted as-is.
pub fn find_app_update(
    store: &dyn PackageStore,
    fingerprint: &DeviceFingerprint,
) -> Result<Option<UpdateCandidate>, CatalogError> {
    let objects = store.list_objects(APP_PREFIX)?;
    let want = fingerprint.catalog_token();
    debug!(token = %want, objects = objects.len(), "scanning app catalog");

    let mut best: Option<(u64, UpdateCandidate)> = None;
    for object in objects.iter().filter(|o| is_real_object(o)) {
        let Some((token, date)) = parse_app_object_name(file_name_of_key(&object.key)) else {
            continue;
        };
        if let Some(token) = token {
            if !token.eq_ignore_ascii_case(&want) {
                continue;
            }
        }
        consider(&mut best, &date, object);
    }
    Ok(best.map(|(_, candidate)| candidate))
}

// Directory placeholders and zero-size objects are never candidates.
fn is_real_object(object: &ObjectSummary) -> bool {
    !object.key.ends_with('/') && object.size > 0
}

fn consider(best: &mut Option<(u64, UpdateCandidate)>, date: &str, object: &ObjectSummary) {
    let Some(numeric) = parse_version_date(date) else {
        return;
    };
    if best.as_ref().is_some_and(|(current, _)| numeric <= *current) {
        return;
    }
    if let Some(candidate) = UpdateCandidate::new(date, &object.key) {
        debug!(key = %object.key, version = date, "new best candidate");
        *best = Some((numeric, candidate.with_sha256(object.sha256.clone())));
    }
}
