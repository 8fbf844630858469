use std::fs;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::VerifyError;

const BUFFER_SIZE: usize = 8192;

/// Hex sha256 of a file's contents.
pub fn sha256_hex(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; BUFFER_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Checks a downloaded archive against the digest the catalog advertised.
pub fn verify_archive(path: &Path, expected_hex: &str) -> Result<(), VerifyError> {
    let actual = sha256_hex(path)?;
    if actual.eq_ignore_ascii_case(expected_hex) {
        debug!(archive = %path.display(), "archive digest verified");
        Ok(())
    } else {
        Err(VerifyError::Mismatch {
            expected: expected_hex.to_ascii_lowercase(),
            actual,
        })
    }
}
