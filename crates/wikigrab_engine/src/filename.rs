use std::time::{SystemTime, UNIX_EPOCH};

use url::Url;

use crate::rules::{FILENAME_PARAMETERS, IMAGE_EXTENSIONS};

/// Filename to store `image_url` under.
///
/// Pukiwiki serves attachments through query parameters, so `src=` and
/// `openfile=` take priority over the path. When nothing usable is found a
/// timestamped name is synthesized.
pub fn resolve_filename(image_url: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    resolve_filename_at(image_url, now)
}

/// [`resolve_filename`] with an explicit clock for the synthesized fallback.
pub fn resolve_filename_at(image_url: &str, unix_ts: u64) -> String {
    let parsed = Url::parse(image_url).ok();

    let from_query = parsed.as_ref().and_then(filename_from_query);
    let candidate = from_query.unwrap_or_else(|| last_path_segment(parsed.as_ref(), image_url));

    if candidate.is_empty() || !candidate.contains('.') {
        let ext = if image_url.to_ascii_lowercase().contains("png") {
            "png"
        } else {
            "jpg"
        };
        return format!("image_{unix_ts}.{ext}");
    }
    sanitize_filename(&candidate)
}

fn filename_from_query(url: &Url) -> Option<String> {
    FILENAME_PARAMETERS.iter().find_map(|param| {
        url.query_pairs()
            .filter(|(key, _)| key == param)
            .map(|(_, value)| value.into_owned())
            .find(|value| has_image_extension(value))
    })
}

fn last_path_segment(url: Option<&Url>, raw: &str) -> String {
    let path = match url {
        Some(url) => url.path().to_string(),
        None => raw.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    path.rsplit('/').next().unwrap_or_default().to_string()
}

fn has_image_extension(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.strip_suffix(ext).is_some_and(|rest| rest.ends_with('.')))
}

/// Keep a decoded name inside the destination directory and valid on Windows.
fn sanitize_filename(input: &str) -> String {
    let base = input.rsplit(['/', '\\']).next().unwrap_or(input);
    let mut cleaned: String = base
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(' ').to_string();

    let stem = cleaned.split('.').next().unwrap_or_default();
    if is_reserved_windows_name(stem) {
        cleaned.insert(stem.len(), '_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::{resolve_filename_at, sanitize_filename};

    #[test]
    fn src_parameter_beats_the_path() {
        assert_eq!(
            resolve_filename_at("http://h/attach.php?src=cat.jpg&amp;x=1", 0),
            "cat.jpg"
        );
    }

    #[test]
    fn src_parameter_is_url_decoded() {
        assert_eq!(
            resolve_filename_at("http://h/index.php?plugin=ref&src=%E7%8C%AB.png", 0),
            "猫.png"
        );
    }

    #[test]
    fn openfile_parameter_is_second_choice() {
        assert_eq!(
            resolve_filename_at(
                "http://h/index.php?plugin=attach&pcmd=open&openfile=dog.jpeg&refer=A",
                0
            ),
            "dog.jpeg"
        );
    }

    #[test]
    fn non_image_src_falls_through_to_the_path() {
        assert_eq!(
            resolve_filename_at("http://h/image/photo.png?src=thumb", 0),
            "photo.png"
        );
    }

    #[test]
    fn extensionless_urls_get_a_timestamped_name() {
        assert_eq!(
            resolve_filename_at(
                "http://h/?plugin=attach&pcmd=open&file=photo.png&refer=Page",
                1_700_000_000
            ),
            "image_1700000000.png"
        );
        assert_eq!(
            resolve_filename_at("http://h/gallery/", 42),
            "image_42.jpg"
        );
    }

    #[test]
    fn unparsable_input_still_resolves() {
        assert_eq!(resolve_filename_at("not a url/pic.jpg?x", 0), "pic.jpg");
        assert_eq!(resolve_filename_at("", 7), "image_7.jpg");
    }

    #[test]
    fn decoded_names_cannot_escape_the_directory() {
        assert_eq!(sanitize_filename("../../etc/evil.png"), "evil.png");
        assert_eq!(sanitize_filename("a:b|c.png"), "a_b_c.png");
        assert_eq!(sanitize_filename("con.png"), "con_.png");
    }
}
