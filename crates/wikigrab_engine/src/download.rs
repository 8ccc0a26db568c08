use std::path::Path;

use engine_logging::{engine_debug, engine_warn};
use url::Url;

use crate::fetch::{FetchRequest, Fetcher, ProgressSink};
use crate::filename::resolve_filename;
use crate::persist::{write_new_file, PersistError};
use crate::skip::SkipFilter;
use crate::{DownloadOutcome, DownloadReport, EngineEvent};

/// Fetches single images and stores them under their resolved filename.
pub struct Downloader<'a> {
    fetcher: &'a dyn Fetcher,
    skip_filter: &'a SkipFilter,
}

impl<'a> Downloader<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, skip_filter: &'a SkipFilter) -> Self {
        Self {
            fetcher,
            skip_filter,
        }
    }

    /// Only filesystem failures are errors; everything else, including fetch
    /// failures, is an outcome.
    pub async fn download(
        &self,
        image_url: &Url,
        page_url: &Url,
        dest_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<DownloadReport, PersistError> {
        let filename = resolve_filename(image_url.as_str());
        let outcome = self
            .fetch_and_store(image_url, page_url, dest_dir, &filename, sink)
            .await?;
        Ok(DownloadReport { filename, outcome })
    }

    async fn fetch_and_store(
        &self,
        image_url: &Url,
        page_url: &Url,
        dest_dir: &Path,
        filename: &str,
        sink: &dyn ProgressSink,
    ) -> Result<DownloadOutcome, PersistError> {
        if self.skip_filter.should_skip(filename) {
            return Ok(DownloadOutcome::SkippedPattern);
        }

        if dest_dir.join(filename).exists() {
            return Ok(DownloadOutcome::SkippedDuplicate);
        }

        sink.emit(EngineEvent::ImageDownloadStarted {
            filename: filename.to_string(),
            image_url: image_url.to_string(),
        });

        let request = FetchRequest::image(image_url.clone(), page_url.clone());
        let output = match self.fetcher.fetch(&request).await {
            Ok(output) => output,
            Err(err) => {
                engine_warn!("Image fetch failed for {}: {}", image_url, err);
                return Ok(DownloadOutcome::Failed(err));
            }
        };

        let content_type = output
            .metadata
            .content_type
            .as_deref()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !content_type.starts_with("image/") && content_type.contains("text/html") {
            return Ok(DownloadOutcome::SkippedNonImageResponse { content_type });
        }

        match write_new_file(dest_dir, filename, &output.bytes) {
            Ok(path) => {
                engine_debug!("Wrote {} bytes to {:?}", output.bytes.len(), path);
                Ok(DownloadOutcome::Saved {
                    bytes: output.bytes.len() as u64,
                    path,
                })
            }
            Err(PersistError::AlreadyExists(_)) => Ok(DownloadOutcome::SkippedDuplicate),
            Err(err) => Err(err),
        }
    }
}
