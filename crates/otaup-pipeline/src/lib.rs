mod error;
mod pipeline;
mod progress;
mod state;

pub use error::PipelineError;
pub use pipeline::{PipelineEvent, UpdateChannel, UpdatePipeline};
pub use progress::{DownloadProgress, RateWindow};
pub use state::PipelineState;
