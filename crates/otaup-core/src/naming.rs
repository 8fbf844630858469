//! Catalog object naming. These formats are the wire contract with the
//! existing remote bucket layout and must be preserved exactly.

/// Catalog folder holding full system images: `<CPU>_<WxH>_<YYYYMMDD>.zip`.
pub const SYSTEM_PREFIX: &str = "firmware/System/";
/// Catalog folder holding MCU firmware: `<Tag>_MCU.zip`.
pub const MCU_PREFIX: &str = "firmware/MCU/";
/// Catalog folder holding app bundles: `ALLApp_<CPU>_<WxH>_<YYYYMMDD>.zip`.
pub const APP_PREFIX: &str = "firmware/System APP/";

/// Last path segment of an object key.
pub fn file_name_of_key(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Parsed system-image object name: the `<CPU>_<WxH>` device token and the
/// 8-digit date suffix.
pub fn parse_system_object_name(file_name: &str) -> Option<(String, String)> {
    let stem = file_name.strip_suffix(".zip")?;
    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 3 {
        return None;
    }
    let date = *parts.last()?;
    if !is_date_token(date) {
        return None;
    }
    Some((format!("{}_{}", parts[0], parts[1]), date.to_string()))
}

/// Parsed app-bundle object name. New-format names carry a device token
/// (`ALLApp_<CPU>_<WxH>_<date>.zip`); legacy names are matched by their
/// date suffix alone and yield no token.
pub fn parse_app_object_name(file_name: &str) -> Option<(Option<String>, String)> {
    let stem = file_name.strip_suffix(".zip")?;
    let parts: Vec<&str> = stem.split('_').collect();
    let date = *parts.last()?;
    if !is_date_token(date) {
        return None;
    }
    if parts.len() >= 4 {
        Some((Some(format!("{}_{}", parts[1], parts[2])), date.to_string()))
    } else if parts.len() > 1 {
        Some((None, date.to_string()))
    } else {
        None
    }
}

/// `L<digits>_MCU` directory naming used by MCU packages.
pub fn is_mcu_dir_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix('L') else {
        return false;
    };
    let Some(digits) = rest.strip_suffix("_MCU") else {
        return false;
    };
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `L<digits>_MCU.zip` archive naming used by MCU packages.
pub fn is_mcu_archive_name(name: &str) -> bool {
    name.strip_suffix(".zip").is_some_and(is_mcu_dir_name)
}

/// Vendor system-update inner archives are named with a numeric prefix,
/// e.g. `6316_xxx.zip`. Four leading digits are required so date-suffixed
/// bundle names never match.
pub fn is_numeric_prefixed_zip(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(".zip") else {
        return false;
    };
    stem.len() >= 4 && stem.bytes().take(4).all(|b| b.is_ascii_digit())
}

fn is_date_token(token: &str) -> bool {
    token.len() == 8 && token.bytes().all(|b| b.is_ascii_digit())
}
