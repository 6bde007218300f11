//! Local persisted state: display preferences and offline form drafts
//!
//! Everything lives in one JSON file, rewritten atomically on each change.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::{SyncError, SyncResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Density {
    #[default]
    Comfortable,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
    pub language: String,
    pub density: Density,
    pub compact_view: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            language: "fr".to_string(),
            density: Density::Comfortable,
            compact_view: false,
        }
    }
}

/// Unsent form content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDraft {
    pub id: Uuid,
    pub form_type: String,
    pub data: Value,
    pub meta: Option<Value>,
    /// Record being edited, taken from `meta.formId`
    pub form_id: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    preferences: Preferences,
    #[serde(default)]
    drafts: Vec<FormDraft>,
}

pub struct LocalStore {
    path: PathBuf,
    state: StoreFile,
}

impl LocalStore {
    /// Open the store at `path`; a missing file starts empty
    pub fn open(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)
                .map_err(|e| SyncError::Data(format!("Corrupt local store {}: {}", path.display(), e)))?
        } else {
            StoreFile::default()
        };
        Ok(Self { path, state })
    }

    /// Write `next` to disk, then make it the in-memory state. A failed write
    /// leaves both untouched.
    fn commit(&mut self, next: StoreFile) -> SyncResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&next)?)?;
        fs::rename(&tmp, &self.path)?;
        self.state = next;
        Ok(())
    }

    pub fn preferences(&self) -> &Preferences {
        &self.state.preferences
    }

    pub fn set_preferences(&mut self, preferences: Preferences) -> SyncResult<()> {
        let mut next = self.state.clone();
        next.preferences = preferences;
        self.commit(next)
    }

    pub fn save_draft<T: Serialize>(
        &mut self,
        form_type: &str,
        data: &T,
        meta: Option<Value>,
    ) -> SyncResult<Uuid> {
        let now = Utc::now();
        let draft = FormDraft {
            id: Uuid::new_v4(),
            form_type: form_type.to_string(),
            data: serde_json::to_value(data)?,
            form_id: form_id(meta.as_ref()),
            meta,
            created_at: now,
            updated_at: now,
        };
        let id = draft.id;
        let mut next = self.state.clone();
        next.drafts.push(draft);
        self.commit(next)?;
        tracing::debug!("Saved {} draft {}", form_type, id);
        Ok(id)
    }

    /// Replace a draft's data; `meta` is kept when `None`
    pub fn update_draft<T: Serialize>(&mut self, id: Uuid, data: &T, meta: Option<Value>) -> SyncResult<()> {
        let data = serde_json::to_value(data)?;
        let mut next = self.state.clone();
        let draft = next
            .drafts
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| SyncError::NotFound(format!("Draft {} not found", id)))?;

        draft.data = data;
        if meta.is_some() {
            draft.form_id = form_id(meta.as_ref());
            draft.meta = meta;
        }
        draft.updated_at = Utc::now().max(draft.updated_at);
        self.commit(next)
    }

    pub fn get_draft(&self, id: Uuid) -> Option<&FormDraft> {
        self.state.drafts.iter().find(|d| d.id == id)
    }

    /// Returns whether a draft was removed
    pub fn delete_draft(&mut self, id: Uuid) -> SyncResult<bool> {
        if !self.state.drafts.iter().any(|d| d.id == id) {
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.drafts.retain(|d| d.id != id);
        self.commit(next)?;
        Ok(true)
    }

    /// Drafts of one form, most recently updated first (latest saved wins ties)
    pub fn drafts(&self, form_type: &str) -> Vec<&FormDraft> {
        let mut drafts: Vec<&FormDraft> = self
            .state
            .drafts
            .iter()
            .rev()
            .filter(|d| d.form_type == form_type)
            .collect();
        drafts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        drafts
    }

    pub fn recent_draft(&self, form_type: &str) -> Option<&FormDraft> {
        self.drafts(form_type).into_iter().next()
    }
}

fn form_id(meta: Option<&Value>) -> Option<Value> {
    meta.and_then(|m| m.get("formId")).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("state.json")).unwrap();
        assert_eq!(store.preferences(), &Preferences::default());
        assert!(store.drafts("intervention").is_empty());
    }

    #[test]
    fn test_preferences_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = LocalStore::open(&path).unwrap();
        store
            .set_preferences(Preferences {
                theme: Theme::Dark,
                language: "en".into(),
                density: Density::Compact,
                compact_view: true,
            })
            .unwrap();

        let reopened = LocalStore::open(&path).unwrap();
        assert_eq!(reopened.preferences().theme, Theme::Dark);
        assert!(reopened.preferences().compact_view);
    }

    #[test]
    fn test_draft_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drafts").join("state.json");
        let mut store = LocalStore::open(&path).unwrap();

        let first = store
            .save_draft("intervention", &json!({"title": "Leak"}), Some(json!({"formId": 12})))
            .unwrap();
        let second = store.save_draft("intervention", &json!({"title": "Noise"}), None).unwrap();
        store.save_draft("observation", &json!({"type": "wear"}), None).unwrap();

        assert_eq!(store.get_draft(first).unwrap().form_id, Some(json!(12)));
        assert_eq!(store.drafts("intervention").len(), 2);
        assert_eq!(store.recent_draft("intervention").unwrap().id, second);

        store.update_draft(first, &json!({"title": "Oil leak"}), None).unwrap();
        let recent = store.recent_draft("intervention").unwrap();
        assert_eq!(recent.id, first);
        assert_eq!(recent.data["title"], "Oil leak");
        assert_eq!(recent.form_id, Some(json!(12)));

        assert!(store.delete_draft(second).unwrap());
        assert!(!store.delete_draft(second).unwrap());

        let reopened = LocalStore::open(&path).unwrap();
        assert_eq!(reopened.drafts("intervention").len(), 1);
        assert_eq!(reopened.drafts("observation").len(), 1);
    }

    #[test]
    fn test_update_unknown_draft() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path().join("state.json")).unwrap();
        let err = store.update_draft(Uuid::new_v4(), &json!({}), None).unwrap_err();
        assert!(matches!(err, SyncError::NotFound(_)));
    }

    #[test]
    fn test_corrupt_file_is_a_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(LocalStore::open(&path), Err(SyncError::Data(_))));
    }

    #[test]
    fn test_failed_write_keeps_memory_in_sync_with_disk() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let mut store = LocalStore::open(blocker.join("state.json")).unwrap();
        assert!(store.save_draft("intervention", &json!({"title": "x"}), None).is_err());
        assert!(store.drafts("intervention").is_empty());

        let dark = Preferences { theme: Theme::Dark, ..Default::default() };
        assert!(store.set_preferences(dark).is_err());
        assert_eq!(store.preferences(), &Preferences::default());
    }
}
