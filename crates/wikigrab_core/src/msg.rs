use crate::RunTotals;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the wiki URL.
    UrlChanged(String),
    /// User edited the destination folder.
    SavePathChanged(String),
    /// User asked to start a run.
    StartClicked,
    /// User asked to stop the active run.
    StopClicked,

    // Engine progress, mirrored one-to-one from the engine event stream.
    ListingStarted,
    PagesListed {
        total: usize,
    },
    OutputDirCreated {
        path: String,
    },
    PageStarted {
        index: usize,
        total: usize,
        url: String,
    },
    ImagesFound {
        page_url: String,
        count: usize,
    },
    ImageDownloading {
        filename: String,
        image_url: String,
    },
    ImageDone {
        filename: String,
        image_url: String,
        result: ImageResultKind,
    },
    PageFailed {
        page_url: String,
        message: String,
    },
    PageFinished {
        index: usize,
        total: usize,
        skipped: usize,
    },
    RunFinished {
        outcome: RunEndKind,
        totals: RunTotals,
    },

    /// Render tick to coalesce output.
    Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageResultKind {
    Saved { bytes: u64 },
    SkippedPattern,
    SkippedDuplicate,
    SkippedHtml,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEndKind {
    Completed,
    Stopped,
    Failed { reason: String },
}
