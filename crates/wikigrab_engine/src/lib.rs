//! Wikigrab engine: crawl, extract and download pipeline for Pukiwiki sites.
mod crawl;
mod decode;
mod download;
mod engine;
mod fetch;
mod filename;
mod images;
mod links;
mod pages;
mod persist;
pub mod rules;
mod run;
mod skip;
mod types;

pub use crawl::{crawl, CrawlRequest, CrawlSettings, DEFAULT_PAGE_DELAY};
pub use decode::{decode_html, DecodedHtml};
pub use download::Downloader;
pub use engine::EngineHandle;
pub use fetch::{
    ChannelProgressSink, FetchRequest, FetchSettings, Fetcher, ProgressSink, ReqwestFetcher,
    DEFAULT_MAX_BYTES,
};
pub use filename::{resolve_filename, resolve_filename_at};
pub use images::{classify_image_url, extract_images, image_references};
pub use links::{collect_links, resolve_reference, LinkKind};
pub use pages::{candidate_pages, is_candidate_page, list_pages};
pub use persist::{ensure_output_dir, write_new_file, AtomicFileWriter, PersistError};
pub use rules::ImageRule;
pub use run::{RunContext, RunCounters};
pub use skip::SkipFilter;
pub use types::{
    DownloadOutcome, DownloadReport, EngineEvent, FailureKind, FetchError, FetchMetadata,
    FetchOutput, ProgressSnapshot, RunPhase, RunStatus, RunSummary,
};
