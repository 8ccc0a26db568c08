use regex::RegexSet;

use crate::rules::SKIP_PATTERNS;

/// Case-insensitive glob deny list for bundled UI icons.
#[derive(Debug, Clone)]
pub struct SkipFilter {
    patterns: RegexSet,
}

impl SkipFilter {
    /// Compile glob patterns (`*` and `?` wildcards, everything else literal).
    pub fn new<I, S>(globs: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = RegexSet::new(
            globs
                .into_iter()
                .map(|glob| glob_to_regex(&glob.as_ref().to_lowercase())),
        )?;
        Ok(Self { patterns })
    }

    pub fn should_skip(&self, filename: &str) -> bool {
        self.patterns.is_match(&filename.to_lowercase())
    }
}

impl Default for SkipFilter {
    fn default() -> Self {
        Self::new(SKIP_PATTERNS).expect("built-in skip patterns are valid")
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    out.push_str("(?s)^");
    let mut buf = [0u8; 4];
    for ch in glob.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    out.push('$');
    out
}
