use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use story_reply::ReplyAreaConfig;
use story_reply_protocol::SendFilesWay;
use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;
use toml_edit::Table as TomlTable;
use toml_edit::value;

use crate::atomic_write::write_atomic_text;

const REPLY_TABLE: &str = "reply";
const ATTACH_DELAY_KEY: &str = "attach_delay_ms";
const SEND_FILES_WAY_KEY: &str = "send_files_way";

/// `~/.story-reply/config.toml`. Only the `[reply]` table is read or written; everything else
/// in the file (including comments) is preserved.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn new_default() -> anyhow::Result<Self> {
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("cannot determine home directory for config path");
        };
        Ok(Self::new(default_config_path(&home)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Settings for a [`story_reply::ReplyArea`], defaults filled in for missing keys.
    pub fn reply_config(&self) -> anyhow::Result<ReplyAreaConfig> {
        let mut config = ReplyAreaConfig::default();
        if let Some(delay) = self.attach_delay()? {
            config.attach_ripple_delay = delay;
        }
        if let Some(way) = self.send_files_way()? {
            config.send_files_way = way;
        }
        Ok(config)
    }

    pub fn attach_delay(&self) -> anyhow::Result<Option<Duration>> {
        Ok(self
            .read_reply_integer(ATTACH_DELAY_KEY)?
            .and_then(|ms| u64::try_from(ms).ok())
            .map(Duration::from_millis))
    }

    /// The last way confirmed with "remember", stored in its compact integer form.
    pub fn send_files_way(&self) -> anyhow::Result<Option<SendFilesWay>> {
        let Some(raw) = self.read_reply_integer(SEND_FILES_WAY_KEY)? else {
            return Ok(None);
        };
        let way = i32::try_from(raw)
            .ok()
            .and_then(SendFilesWay::from_serialized);
        if way.is_none() {
            tracing::warn!("ignoring invalid {SEND_FILES_WAY_KEY} = {raw} in config");
        }
        Ok(way)
    }

    pub fn set_send_files_way(&self, way: SendFilesWay) -> anyhow::Result<()> {
        let content = read_document_string(&self.path)?.unwrap_or_default();
        let serialized = way.serialize();
        let updated = match content.parse::<DocumentMut>() {
            Ok(mut doc) => {
                let reply = ensure_table_for_write(&mut doc, REPLY_TABLE);
                reply[SEND_FILES_WAY_KEY] = value(i64::from(serialized));
                doc.to_string()
            }
            Err(_) => append_reply_fallback(&content, SEND_FILES_WAY_KEY, serialized),
        };
        write_atomic_text(&self.path, &updated)
    }

    fn read_reply_integer(&self, key: &str) -> anyhow::Result<Option<i64>> {
        let Some(content) = read_document_string(&self.path)? else {
            return Ok(None);
        };
        match content.parse::<DocumentMut>() {
            Ok(doc) => Ok(doc
                .get(REPLY_TABLE)
                .and_then(TomlItem::as_table)
                .and_then(|reply| reply.get(key))
                .and_then(TomlItem::as_integer)),
            Err(_) => Ok(parse_reply_integer_fallback(&content, key)),
        }
    }
}

fn default_config_path(home: &Path) -> PathBuf {
    home.join(".story-reply").join("config.toml")
}

/// Line-based lookup for when the file is not valid TOML; the last assignment wins.
fn parse_reply_integer_fallback(contents: &str, key: &str) -> Option<i64> {
    let mut in_reply = false;
    let mut result = None;

    for line in contents.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            in_reply = parse_table_header_name(trimmed) == Some(REPLY_TABLE);
            continue;
        }
        if !in_reply {
            continue;
        }

        let Some(line) = strip_toml_comment(trimmed) else {
            continue;
        };
        let Some((name, raw)) = line.split_once('=') else {
            continue;
        };
        if name.trim() != key {
            continue;
        }
        if let Ok(parsed) = raw.trim().replace('_', "").parse::<i64>() {
            result = Some(parsed);
        }
    }

    result
}

fn parse_table_header_name(line: &str) -> Option<&str> {
    let end = line.find(']')?;
    let name = line.get(1..end)?.trim();
    if name.is_empty() { None } else { Some(name) }
}

fn strip_toml_comment(line: &str) -> Option<&str> {
    let line = line.split_once('#').map_or(line, |(head, _)| head).trim();
    if line.is_empty() { None } else { Some(line) }
}

fn ensure_table_for_write<'a>(doc: &'a mut DocumentMut, key: &str) -> &'a mut TomlTable {
    if !doc.get(key).is_some_and(TomlItem::is_table) {
        let mut table = TomlTable::new();
        table.set_implicit(false);
        doc[key] = TomlItem::Table(table);
    }
    match &mut doc[key] {
        TomlItem::Table(table) => table,
        _ => unreachable!("expected `{key}` to be a table"),
    }
}

fn append_reply_fallback(existing: &str, key: &str, serialized: i32) -> String {
    let mut out = existing.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&format!("[{REPLY_TABLE}]\n{key} = {serialized}\n"));
    out
}

fn read_document_string(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context(format!("read {}", path.display()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store_with(contents: &str) -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).expect("write config");
        (dir, ConfigStore::new(path))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::new(dir.path().join("config.toml"));
        assert_eq!(
            store.reply_config().expect("read"),
            ReplyAreaConfig::default()
        );
    }

    #[test]
    fn reads_reply_table() {
        let (_dir, store) = store_with(
            r#"
[reply]
attach_delay_ms = 350
send_files_way = 6 # files, separate, high quality
"#,
        );
        let config = store.reply_config().expect("read");
        assert_eq!(config.attach_ripple_delay, Duration::from_millis(350));
        assert_eq!(
            config.send_files_way,
            SendFilesWay {
                group_files: false,
                send_images_as_photos: false,
                send_high_quality: true,
            }
        );
    }

    #[test]
    fn invalid_way_is_ignored() {
        let (_dir, store) = store_with("[reply]\nsend_files_way = 42\n");
        assert_eq!(store.send_files_way().expect("read"), None);
    }

    #[test]
    fn remembering_way_preserves_comments() {
        let (_dir, store) = store_with(
            r#"# top comment

[reply] # keep me
# inner comment
attach_delay_ms = 100

[other]
key = 1
"#,
        );
        let way = SendFilesWay {
            group_files: true,
            send_images_as_photos: false,
            send_high_quality: false,
        };
        store.set_send_files_way(way).expect("write");

        let updated = std::fs::read_to_string(store.path()).expect("read back");
        assert!(updated.contains("# top comment"));
        assert!(updated.contains("# inner comment"));
        assert!(updated.contains("[other]"));
        assert!(updated.contains("send_files_way = 3"));
        assert_eq!(store.send_files_way().expect("read"), Some(way));
        assert_eq!(
            store.attach_delay().expect("read"),
            Some(Duration::from_millis(100))
        );
    }

    #[test]
    fn reads_reply_keys_when_toml_is_invalid() {
        let (_dir, store) = store_with(
            r#"# broken table header makes this TOML invalid
[other
key = 1

[reply]
attach_delay_ms = 1_000 # keep me
"#,
        );
        assert_eq!(
            store.attach_delay().expect("read"),
            Some(Duration::from_secs(1))
        );
    }

    #[test]
    fn remembering_way_appends_to_invalid_toml() {
        let (_dir, store) = store_with("[broken\n");
        store
            .set_send_files_way(SendFilesWay::default())
            .expect("write");
        assert_eq!(
            store.send_files_way().expect("read"),
            Some(SendFilesWay::default())
        );
    }

    #[test]
    fn default_config_path_uses_story_reply_home_dir() {
        let home = Path::new("home");
        assert_eq!(
            default_config_path(home),
            home.join(".story-reply").join("config.toml")
        );
    }
}
