use crate::constants::FALLBACK_FILE_NAME;
use reqwest::Url;

/// Case-insensitive suffix match of a file name against a list of suffixes (with the dot)
pub fn has_suffix(name: &str, suffixes: &[&str]) -> bool {
    let lower = name.to_lowercase();
    suffixes.iter().any(|suffix| lower.ends_with(suffix))
}

/// Derive a file name from the last path segment of a URL
pub fn file_name_from_url(url: &str) -> String {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string)),
        // Not an absolute URL; fall back to plain splitting
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    };

    match segment {
        Some(name) if !name.trim().is_empty() => name,
        _ => FALLBACK_FILE_NAME.to_string(),
    }
}
