/// One discoverable remote package: an opaque version token plus the
/// object-store key of its archive. The version is used only for ordering
/// and display, never for addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCandidate {
    pub version: String,
    pub object_key: String,
    /// Hex sha256 of the archive, when the catalog advertises one.
    pub sha256: Option<String>,
}

impl UpdateCandidate {
    pub fn new(version: impl Into<String>, object_key: impl Into<String>) -> Option<Self> {
        let object_key = object_key.into();
        if object_key.is_empty() {
            return None;
        }
        Some(Self {
            version: version.into(),
            object_key,
            sha256: None,
        })
    }

    pub fn with_sha256(mut self, sha256: Option<String>) -> Self {
        self.sha256 = sha256;
        self
    }
}

/// Parses an 8-digit `YYYYMMDD` version token into its numeric value.
pub fn parse_version_date(token: &str) -> Option<u64> {
    if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// An update exists iff the remote date is numerically newer than the local
/// one. A local version that cannot be parsed (including the `Unknown`
/// sentinel) counts as older than anything; an unparseable remote version
/// never counts as an update.
pub fn update_available(remote_version: &str, local_version: &str) -> bool {
    let Some(remote) = parse_version_date(remote_version) else {
        return false;
    };
    match parse_version_date(local_version) {
        Some(local) => remote > local,
        None => true,
    }
}
