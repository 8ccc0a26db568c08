//! Site-specific tuning for Pukiwiki installs.
//!
//! Everything in here encodes knowledge of one wiki engine's bundled assets
//! and URL dialect. Keep the tables verbatim; they are matched as data.

/// User agent sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// `Accept` header sent with image requests.
pub const IMAGE_ACCEPT: &str = "image/webp,image/apng,image/*,*/*;q=0.8";

/// Extensions treated as downloadable images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Query fragments that mark a link as a wiki content page.
pub const PAGE_QUERY_MARKERS: &[&str] = &["cmd=", "page="];

/// Query parameters that carry the real attachment filename, in priority order.
pub const FILENAME_PARAMETERS: &[&str] = &["src", "openfile"];

/// UI icons bundled with the wiki engine. Glob syntax, matched against the
/// lower-cased filename.
pub const SKIP_PATTERNS: &[&str] = &[
    "backup_*.png",
    "copy_*.png",
    "diff_*.png",
    "edit_*.png",
    "file_*.png",
    "freeze_*.png",
    "help_*.png",
    "index_*.png",
    "list_*.png",
    "new_*.png",
    "pukiwiki_*.png",
    "recentchanges_*.png",
    "reload_*.png",
    "rename_*.png",
    "rss_*.png",
    "search_*.png",
    "smile_*.png",
    "top_*.png",
    "unfreeze_*.png",
];

/// Which URL-shape heuristic recognised an image reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRule {
    /// Path ends in an image extension, optionally followed by a query.
    PathExtension,
    /// `src=<name>.<ext>` query parameter.
    SrcParameter,
    /// `plugin=attach` / `plugin=ref` anywhere in the URL, plus an image
    /// extension somewhere.
    AttachPlugin,
}

/// A rule fires when every regex in its list matches the absolute URL.
/// Rules are tried in order; the first match wins.
pub const IMAGE_RULES: &[(ImageRule, &[&str])] = &[
    (
        ImageRule::PathExtension,
        &[r"(?i)^[^?#]*\.(png|jpg|jpeg)(\?[^#]*)?(#.*)?$"],
    ),
    (
        ImageRule::SrcParameter,
        &[r"(?i)[?&]src=[^&#]*\.(png|jpg|jpeg)(&|#|$)"],
    ),
    (
        ImageRule::AttachPlugin,
        &[r"(?i)plugin=(attach|ref)", r"(?i)\.(png|jpg|jpeg)"],
    ),
];
