use std::fs;
use std::path::Path;
use std::time::Duration;

use otaup_core::CancelFlag;
use tracing::{debug, warn};

use crate::dir_store::copy_with_progress;
use crate::{CatalogError, DownloadError, ObjectSummary, PackageStore};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const ACCESS_KEY_HEADER: &str = "x-ota-access-key";

/// Package store backed by an HTTP object endpoint. Objects are fetched at
/// `<endpoint>/<bucket>/<key>`; the catalog is a JSON listing document at
/// `<endpoint>/<bucket>/catalog.json` with one `{key, size, sha256?}` entry
/// per object.
pub struct HttpStore {
    endpoint: String,
    bucket: String,
    access_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpStore {
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>) -> Result<Self, CatalogError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None)
            .build()
            .map_err(|err| CatalogError::Other(format!("failed to build http client: {err}")))?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            access_key: None,
            client,
        })
    }

    pub fn with_access_key(mut self, access_key: Option<String>) -> Self {
        self.access_key = access_key;
        self
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, reqwest::Error> {
        let mut request = self.client.get(url);
        if let Some(access_key) = &self.access_key {
            request = request.header(ACCESS_KEY_HEADER, access_key);
        }
        request.send()
    }
}

impl PackageStore for HttpStore {
    fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, CatalogError> {
        let url = self.object_url("catalog.json");
        debug!(%url, prefix, "fetching catalog listing");
        let response = self.get(&url).map_err(transport_catalog_error)?;

        match response.status() {
            status if status.is_success() => {}
            reqwest::StatusCode::FORBIDDEN | reqwest::StatusCode::UNAUTHORIZED => {
                return Err(CatalogError::CredentialsInvalid);
            }
            reqwest::StatusCode::NOT_FOUND => {
                return Err(CatalogError::NotFound(url));
            }
            status => {
                return Err(CatalogError::Other(format!(
                    "catalog listing returned {status}"
                )));
            }
        }

        let objects: Vec<ObjectSummary> = serde_json::from_reader(response)
            .map_err(|err| CatalogError::Other(format!("malformed catalog listing: {err}")))?;
        Ok(objects
            .into_iter()
            .filter(|object| object.key.starts_with(prefix))
            .collect())
    }

    fn download(
        &self,
        key: &str,
        dest: &Path,
        on_progress: &mut dyn FnMut(u64, u64),
        cancel: &CancelFlag,
    ) -> Result<(), DownloadError> {
        let url = self.object_url(key);
        debug!(%url, "starting download");
        let mut response = self.get(&url).map_err(transport_download_error)?;
        if !response.status().is_success() {
            return Err(DownloadError::Network(format!(
                "object fetch returned {}",
                response.status()
            )));
        }
        let total = response.content_length().unwrap_or(0);

        let result = copy_with_progress(&mut response, dest, total, on_progress, cancel);
        if result.is_err() {
            if let Err(err) = fs::remove_file(dest) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %dest.display(), %err, "failed to remove partial download");
                }
            }
        }
        result
    }
}

fn transport_catalog_error(err: reqwest::Error) -> CatalogError {
    CatalogError::Network(err.to_string())
}

fn transport_download_error(err: reqwest::Error) -> DownloadError {
    DownloadError::Network(err.to_string())
}
