use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use crate::foundation::error::{StoryError, StoryResult};

/// Default document name, relative to the working directory.
pub const DEFAULT_STORE_FILE: &str = "gamedata.json";

/// Most recent confirmed menu selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuChoice {
    /// Options that were on offer.
    pub options: Vec<String>,
    /// Selected option text.
    pub choice: String,
}

/// A choice tagged with a story id.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoryChoice {
    /// Caller-defined tag, compared as a string. Numeric ids on disk are read as their text.
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    /// Selected option text.
    pub choice: String,
}

fn id_as_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize as _;
    match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "story id must be a string or a number, got {other}"
        ))),
    }
}

/// In-memory form of the persisted choice document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChoiceRecord {
    /// Overwritten by every persisted untagged confirmation.
    pub last_menu_choice: Option<MenuChoice>,
    /// Appended to by every persisted tagged confirmation; duplicates are kept.
    pub story_choices: Vec<StoryChoice>,
}

impl ChoiceRecord {
    /// Text of the last untagged choice.
    pub fn last_choice(&self) -> Option<&str> {
        self.last_menu_choice.as_ref().map(|m| m.choice.as_str())
    }

    /// First story choice recorded under `id`.
    pub fn story_choice(&self, id: &str) -> Option<&str> {
        self.story_choices
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.choice.as_str())
    }

    /// Read-back by optional id: `None` or `""` reads the last menu choice.
    pub fn lookup(&self, id: Option<&str>) -> Option<&str> {
        match id {
            None | Some("") => self.last_choice(),
            Some(id) => self.story_choice(id),
        }
    }
}

// On disk: `[ {menu slot}, {"story": [...]} ]`.
#[derive(serde::Serialize, serde::Deserialize)]
struct MenuSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    choice: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct StorySlot {
    #[serde(default)]
    story: Vec<StoryChoice>,
}

type Document = (MenuSlot, StorySlot);

impl From<&ChoiceRecord> for Document {
    fn from(record: &ChoiceRecord) -> Self {
        let menu = match &record.last_menu_choice {
            Some(m) => MenuSlot {
                state: None,
                options: Some(m.options.clone()),
                choice: Some(m.choice.clone()),
            },
            None => MenuSlot {
                state: Some(String::new()),
                options: None,
                choice: None,
            },
        };
        (
            menu,
            StorySlot {
                story: record.story_choices.clone(),
            },
        )
    }
}

impl From<Document> for ChoiceRecord {
    fn from((menu, story): Document) -> Self {
        let last_menu_choice = menu.choice.map(|choice| MenuChoice {
            options: menu.options.unwrap_or_default(),
            choice,
        });
        Self {
            last_menu_choice,
            story_choices: story.story,
        }
    }
}

/// File-backed choice document.
///
/// Single process, single loop: every mutation is a read-modify-write from the caller's thread.
#[derive(Clone, Debug)]
pub struct ChoiceStore {
    path: PathBuf,
}

impl Default for ChoiceStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_FILE)
    }
}

impl ChoiceStore {
    /// Store backed by `path`. Nothing is touched until the first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record, creating the default document when it is missing.
    ///
    /// Fails with [`StoryError::CorruptStore`] when the document exists but has the wrong shape.
    #[tracing::instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn try_load(&self) -> StoryResult<ChoiceRecord> {
        if !self.path.exists() {
            let record = ChoiceRecord::default();
            self.save(&record)?;
            tracing::debug!("created fresh choice document");
            return Ok(record);
        }
        let f = File::open(&self.path)?;
        let doc: Document = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            StoryError::corrupt_store(format!("parse '{}': {e}", self.path.display()))
        })?;
        Ok(doc.into())
    }

    /// Load the record, recovering to the empty default on any failure.
    pub fn load(&self) -> ChoiceRecord {
        match self.try_load() {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "choice store unreadable; using empty record");
                ChoiceRecord::default()
            }
        }
    }

    /// Replace the document. Writes a sibling temporary file, then renames it into place.
    #[tracing::instrument(level = "debug", skip(self, record), fields(path = %self.path.display()))]
    pub fn save(&self, record: &ChoiceRecord) -> StoryResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let doc = Document::from(record);
        let bytes = serde_json::to_vec(&doc).map_err(anyhow::Error::from)?;

        let tmp = self.temp_path();
        {
            let mut f = File::create(&tmp)?;
            f.write_all(&bytes)?;
            f.sync_all()?;
        }
        if let Err(err) = std::fs::rename(&tmp, &self.path) {
            std::fs::remove_file(&tmp).ok();
            return Err(err.into());
        }
        Ok(())
    }

    /// Overwrite the last menu choice.
    ///
    /// Fails with [`StoryError::CorruptStore`] and leaves the file untouched when the existing
    /// document cannot be read.
    pub fn record_menu_choice(&self, options: &[String], choice: &str) -> StoryResult<()> {
        let mut record = self.try_load()?;
        record.last_menu_choice = Some(MenuChoice {
            options: options.to_vec(),
            choice: choice.to_owned(),
        });
        self.save(&record)
    }

    /// Append a tagged story choice. Same failure mode as [`ChoiceStore::record_menu_choice`].
    pub fn record_story_choice(&self, id: &str, choice: &str) -> StoryResult<()> {
        let mut record = self.try_load()?;
        record.story_choices.push(StoryChoice {
            id: id.to_owned(),
            choice: choice.to_owned(),
        });
        self.save(&record)
    }

    /// Text of the last persisted untagged choice.
    pub fn get_last_choice(&self) -> Option<String> {
        self.load().last_choice().map(str::to_owned)
    }

    /// First persisted choice tagged `id`.
    pub fn get_story_choice(&self, id: &str) -> Option<String> {
        self.load().story_choice(id).map(str::to_owned)
    }

    /// Combined read-back: `None` or `""` reads the last menu choice, otherwise a story id.
    pub fn lookup(&self, id: Option<&str>) -> Option<String> {
        self.load().lookup(id).map(str::to_owned)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_STORE_FILE.into());
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/choice.rs"]
mod tests;
