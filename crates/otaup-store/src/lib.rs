mod catalog;
mod dir_store;
mod error;
mod http_store;
mod store;

pub use catalog::{find_app_update, find_mcu_update, find_system_update};
pub use dir_store::DirStore;
pub use error::{CatalogError, DownloadError};
pub use http_store::HttpStore;
pub use store::{ObjectSummary, PackageStore};

#[cfg(test)]
mod tests;
