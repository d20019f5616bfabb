//! Clipboard and drag-and-drop payloads, and turning their URL entries into local paths.

use std::path::Path;
use std::path::PathBuf;

/// Content offered by a paste or a drop onto the composer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeData {
    /// `text/uri-list` entries, one per dropped item.
    pub urls: Vec<String>,
    /// Raw encoded image bytes (`image/*`), if the source offered one.
    pub image: Option<Vec<u8>>,
    /// Plain text, restored into the composer when the paste is cancelled.
    pub text: Option<String>,
}

impl MimeData {
    pub fn has_image(&self) -> bool {
        self.image.as_ref().is_some_and(|bytes| !bytes.is_empty())
    }
}

/// A single URL entry classified by where its content lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DroppedUrl {
    Local(PathBuf),
    /// Anything that is not on this machine, e.g. `https://…`.
    Remote(String),
}

/// Classify every non-empty URL entry of `data`.
pub fn read_mime_urls(data: &MimeData) -> Vec<DroppedUrl> {
    data.urls
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty() && !entry.starts_with('#'))
        .map(|entry| match normalize_dropped_path(entry) {
            Some(path) => DroppedUrl::Local(path),
            None => DroppedUrl::Remote(entry.to_string()),
        })
        .collect()
}

/// Normalize a dropped or pasted string that may name a local file.
///
/// Supports:
/// - `file://` URLs (converted to local paths)
/// - paths of existing files, taken verbatim even with spaces or quotes in them
/// - Windows/UNC paths
/// - shell-escaped single paths (via `shlex`)
///
/// Returns `None` for URLs with any other scheme.
pub fn normalize_dropped_path(dropped: &str) -> Option<PathBuf> {
    let dropped = dropped.trim();

    if let Ok(url) = url::Url::parse(dropped) {
        if url.scheme() == "file" {
            return url.to_file_path().ok();
        }
        // `C:\foo` parses as a URL with scheme `c`; let the Windows check below handle it.
        if url.scheme().len() > 1 {
            return None;
        }
    }

    let verbatim = Path::new(dropped);
    if verbatim.exists() {
        return Some(verbatim.to_path_buf());
    }

    // Detect unquoted Windows paths and bypass POSIX shlex which
    // treats backslashes as escapes (e.g., C:\Users\Alice\file.png).
    let looks_like_windows_path = {
        let drive = dropped
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && dropped.get(1..2) == Some(":")
            && dropped
                .get(2..3)
                .is_some_and(|s| s == "\\" || s == "/");
        let unc = dropped.starts_with("\\\\");
        drive || unc
    };
    if looks_like_windows_path {
        #[cfg(target_os = "linux")]
        {
            if is_probably_wsl()
                && let Some(converted) = convert_windows_path_to_wsl(dropped)
            {
                return Some(converted);
            }
        }
        return Some(PathBuf::from(dropped));
    }

    let parts: Vec<String> = shlex::Shlex::new(dropped).collect();
    if parts.len() == 1 {
        return parts.into_iter().next().map(PathBuf::from);
    }

    None
}

#[cfg(target_os = "linux")]
fn is_probably_wsl() -> bool {
    if let Ok(version) = std::fs::read_to_string("/proc/version") {
        let version_lower = version.to_lowercase();
        if version_lower.contains("microsoft") || version_lower.contains("wsl") {
            return true;
        }
    }
    std::env::var_os("WSL_DISTRO_NAME").is_some() || std::env::var_os("WSL_INTEROP").is_some()
}

#[cfg(target_os = "linux")]
fn convert_windows_path_to_wsl(input: &str) -> Option<PathBuf> {
    if input.starts_with("\\\\") {
        return None;
    }

    let drive_letter = input.chars().next()?.to_ascii_lowercase();
    if !drive_letter.is_ascii_lowercase() || input.get(1..2) != Some(":") {
        return None;
    }

    let mut result = PathBuf::from(format!("/mnt/{drive_letter}"));
    for component in input
        .get(2..)?
        .trim_start_matches(['\\', '/'])
        .split(['\\', '/'])
        .filter(|component| !component.is_empty())
    {
        result.push(component);
    }

    Some(result)
}
