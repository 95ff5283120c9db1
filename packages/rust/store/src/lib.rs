//! Flat-file record store for stage handoff files.
//!
//! Each stage persists its output as one pretty-printed JSON array of
//! [`StoryRecord`]s. The next stage loads that file unmodified.
//!
//! **Rules:**
//! - [`load`] distinguishes a missing file ([`StoryVoiceError::NotFound`]) from
//!   unparsable content ([`StoryVoiceError::Malformed`]); individual bad entries
//!   are dropped with a warning instead of failing the whole file.
//! - [`save`] writes to a temp file and renames it into place, so a stage file
//!   is either complete or absent.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use storyvoice_shared::{Result, StoryRecord, StoryVoiceError};
use tracing::{debug, info, warn};

/// Load all records from `path`.
pub fn load(path: &Path) -> Result<Vec<StoryRecord>> {
    let content = match std::fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StoryVoiceError::not_found(path));
        }
        Err(e) => return Err(StoryVoiceError::io(path, e)),
    };

    let entries: Vec<Value> = serde_json::from_slice(&content)
        .map_err(|e| StoryVoiceError::malformed(path, e.to_string()))?;

    let total = entries.len();
    let mut records = Vec::with_capacity(total);

    for (index, entry) in entries.into_iter().enumerate() {
        match parse_entry(entry) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(path = %path.display(), index, error = %e, "dropping unreadable record");
            }
        }
    }

    if records.is_empty() {
        warn!(path = %path.display(), "no records found in input file");
    } else {
        debug!(path = %path.display(), count = records.len(), total, "loaded records");
    }

    Ok(records)
}

/// Persist `records` to `path` atomically.
pub fn save(path: &Path, records: &[StoryRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StoryVoiceError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(records).map_err(|e| {
        StoryVoiceError::validation(format!("JSON serialization failed: {e}"))
    })?;

    let temp = temp_path(path);
    std::fs::write(&temp, json).map_err(|e| StoryVoiceError::io(&temp, e))?;

    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(StoryVoiceError::io(path, e));
    }

    info!(path = %path.display(), count = records.len(), "saved records");
    Ok(())
}

/// Convert one array entry, requiring an object with a non-empty string `id`.
fn parse_entry(entry: Value) -> Result<StoryRecord> {
    let Value::Object(ref map) = entry else {
        return Err(StoryVoiceError::validation("entry is not an object"));
    };

    match map.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => {}
        _ => return Err(StoryVoiceError::validation("entry has no string id")),
    }

    serde_json::from_value(entry).map_err(|e| StoryVoiceError::validation(e.to_string()))
}

/// Hidden sibling used for the write-then-rename.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "records.json".into());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sv-store-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn record(id: &str, text: &str) -> StoryRecord {
        StoryRecord {
            id: id.into(),
            source: "confessions".into(),
            title: "A confession".into(),
            text: text.into(),
            score: 7,
            comment_count: 2,
            timestamp: "2024-05-05T05:05:05Z".into(),
            title_translated_romanized: None,
            text_translated_romanized: None,
            audio_file: None,
        }
    }

    #[test]
    fn save_then_load_preserves_records() {
        let dir = temp_dir();
        let path = dir.join("stories.json");
        let records = vec![record("a", "पहली कहानी"), record("b", "second story")];

        save(&path, &records).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, records);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("पहली कहानी"), "non-ASCII must not be escaped");
        assert!(!dir.join(".stories.json.tmp").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = temp_dir();
        let err = load(&dir.join("absent.json")).unwrap_err();
        assert!(matches!(err, StoryVoiceError::NotFound { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn garbage_is_malformed() {
        let dir = temp_dir();
        let path = dir.join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load(&path).unwrap_err(), StoryVoiceError::Malformed { .. }));

        std::fs::write(&path, r#"{"id": "x"}"#).unwrap();
        assert!(matches!(load(&path).unwrap_err(), StoryVoiceError::Malformed { .. }));

        std::fs::write(&path, b"[{\"id\":\"a\",\"title\":\"\xff\xfe\"}]").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, StoryVoiceError::Malformed { .. }));
        assert!(err.is_input_error());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn bad_entries_are_dropped() {
        let dir = temp_dir();
        let path = dir.join("mixed.json");
        std::fs::write(
            &path,
            r#"[{"id":"ok","title":"t"}, 42, {"title":"no id"}, {"id":""}, {"id":"bad","score":"high"}]"#,
        )
        .unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "ok");
        assert_eq!(loaded[0].score, 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_array_loads_empty() {
        let dir = temp_dir();
        let path = dir.join("empty.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(load(&path).unwrap().is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = temp_dir();
        let path = dir.join("nested").join("out").join("stories.json");
        save(&path, &[record("a", "x")]).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_into_unwritable_location_is_io_error() {
        let dir = temp_dir();
        let blocker = dir.join("file");
        std::fs::write(&blocker, "x").unwrap();
        // Parent path is a regular file, so the directory cannot be created.
        let err = save(&blocker.join("stories.json"), &[record("a", "x")]).unwrap_err();
        assert!(matches!(err, StoryVoiceError::Io { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn loads_shared_fixture() {
        let records = load(Path::new("../../../fixtures/json/stories.fixture.json")).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].source, "tifu");
    }
}
