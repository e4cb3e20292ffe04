use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::store::schema::LockData;

const LOCK_FILE: &str = "lock_state.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("patternlock");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Reads `name`. A missing file is `None`; an unreadable or
    /// unparsable one is logged and also treated as absent.
    fn load<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.file_path(name);
        if !path.exists() {
            return None;
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %path.display(), %err, "could not read saved state");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(data) => Some(data),
            Err(err) => {
                warn!(path = %path.display(), %err, "discarding unparsable saved state");
                None
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Loads the lock state, or `None` if there is none or it is stale or
    /// corrupt.
    pub fn load_lock_data(&self) -> Option<LockData> {
        let data: LockData = self.load(LOCK_FILE)?;
        if data.needs_reset() {
            warn!(version = data.schema_version, "discarding lock state from another schema");
            return None;
        }
        Some(data)
    }

    pub fn save_lock_data(&self, data: &LockData) -> Result<()> {
        let stamped = LockData {
            saved_at: Utc::now(),
            ..data.clone()
        };
        self.save(LOCK_FILE, &stamped)
    }

    pub fn clear(&self) -> Result<()> {
        let path = self.file_path(LOCK_FILE);
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
        }
        Ok(())
    }

    /// Removes a temp file left behind by a save that was interrupted before
    /// its rename. Returns true if one was found.
    pub fn cleanup_interrupted_save(&self) -> bool {
        let tmp_path = self.file_path(LOCK_FILE).with_extension("tmp");
        if tmp_path.exists() {
            let _ = fs::remove_file(&tmp_path);
            return true;
        }
        false
    }
}
