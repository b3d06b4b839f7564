//! Durable storage for the signed-in identity.
//!
//! One JSON file holds the serialized [`Identity`]; absence means anonymous.
//! Reads self-heal: a blob that no longer parses is deleted and treated as if
//! it never existed, so a corrupt file can only ever cost the session, never
//! wedge startup.

use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use crate::api::Identity;

const SESSION_FILE: &str = "session.json";

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn open_default() -> Self {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "chatline")
            .expect("Failed to determine data directory");
        Self {
            path: proj_dirs.data_dir().join(SESSION_FILE),
        }
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the persisted identity, if any. Malformed contents are cleared as
    /// a side effect and reported as absent.
    pub fn load(&self) -> Option<Identity> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return None,
        };

        match serde_json::from_str(&contents) {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "discarding corrupt session file");
                self.clear();
                None
            }
        }
    }

    /// Persist the identity atomically (write to a sibling temp file, then
    /// rename over the target).
    pub fn save(&self, identity: &Identity) -> io::Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = serde_json::to_vec(identity)?;
        let temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };
        fs::write(temp_file.path(), contents)?;
        temp_file.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }

    pub fn clear(&self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to remove session file");
            }
        }
    }
}
