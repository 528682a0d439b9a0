//! Recently opened libraries.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File extension of persisted libraries.
pub const LIBRARY_EXTENSION: &str = "matlib";

#[derive(Debug, Error)]
pub enum RecentError {
    #[error("recent list i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("recent list json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentLibrary {
    pub name: String,
    /// Directory prefix, including its trailing separator.
    pub path: String,
}

impl RecentLibrary {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        RecentLibrary {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn full_path(&self) -> String {
        format!("{}{}.{}", self.path, self.name, LIBRARY_EXTENSION)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentLibraries {
    #[serde(default)]
    pub libraries: Vec<RecentLibrary>,
    #[serde(default)]
    pub most_recent: Option<usize>,
}

impl Default for RecentLibraries {
    fn default() -> Self {
        RecentLibraries {
            libraries: vec![RecentLibrary::new("DefaultLibrary", "./")],
            most_recent: None,
        }
    }
}

impl RecentLibraries {
    pub fn from_json_str(json: &str) -> Result<Self, RecentError> {
        let mut recent: RecentLibraries = serde_json::from_str(json)?;
        if recent.libraries.is_empty() {
            recent = RecentLibraries::default();
        }
        if recent.most_recent.is_some_and(|i| i >= recent.libraries.len()) {
            recent.most_recent = None;
        }
        Ok(recent)
    }

    pub fn to_json_string(&self) -> Result<String, RecentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load the list stored at `file`. A missing file yields the default list;
    /// entries whose library no longer exists are dropped.
    pub fn load(file: impl AsRef<Path>) -> Result<Self, RecentError> {
        let file = file.as_ref();
        if !file.exists() {
            return Ok(RecentLibraries::default());
        }
        let mut recent = Self::from_json_str(&std::fs::read_to_string(file)?)?;
        recent.prune_missing();
        Ok(recent)
    }

    pub fn save(&self, file: impl AsRef<Path>) -> Result<(), RecentError> {
        std::fs::write(file, self.to_json_string()?)?;
        Ok(())
    }

    /// Remove entries whose library file is gone. The most recent selection is
    /// reset when anything was removed.
    pub fn prune_missing(&mut self) -> usize {
        let before = self.libraries.len();
        self.libraries.retain(|lib| {
            let exists = Path::new(&lib.full_path()).is_file();
            if !exists {
                log::debug!("dropping missing library {}", lib.full_path());
            }
            exists
        });
        let removed = before - self.libraries.len();
        if removed > 0 {
            self.most_recent = None;
        }
        removed
    }

    pub fn is_name_used(&self, name: &str) -> bool {
        self.libraries.iter().any(|lib| lib.name == name)
    }

    /// Append an entry; returns its index.
    pub fn add_recent(&mut self, path: impl Into<String>, name: impl Into<String>) -> usize {
        self.libraries.push(RecentLibrary::new(name, path));
        self.libraries.len() - 1
    }

    /// Append an entry from a complete library path such as `dir/name.matlib`.
    pub fn add_recent_path(&mut self, complete: &str) -> usize {
        let (dir, name) = split_library_path(complete);
        self.add_recent(dir, name)
    }

    /// A path can be added when it names an existing file not yet listed.
    pub fn is_valid_for_adding(&self, complete: &str) -> bool {
        !complete.is_empty()
            && !self.libraries.iter().any(|lib| lib.full_path() == complete)
            && Path::new(complete).is_file()
    }

    /// A new library can be created under an unused name where no file exists yet.
    pub fn is_valid_for_creating(&self, path: &str, name: &str) -> bool {
        !path.is_empty()
            && !name.is_empty()
            && !self.is_name_used(name)
            && !Path::new(&RecentLibrary::new(name, path).full_path()).exists()
    }

    pub fn set_most_recent(&mut self, index: Option<usize>) {
        self.most_recent = index.filter(|i| *i < self.libraries.len());
    }

    pub fn most_recent_path(&self) -> Option<String> {
        self.libraries
            .get(self.most_recent?)
            .map(RecentLibrary::full_path)
    }
}

/// Split `dir/name.ext` into (`dir/`, `name`).
fn split_library_path(complete: &str) -> (String, String) {
    let path = Path::new(complete);
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = match complete.rfind(['/', '\\']) {
        Some(i) => complete[..=i].to_string(),
        None => String::new(),
    };
    (dir, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_path_appends_the_extension() {
        let lib = RecentLibrary::new("Bricks", "libs/");
        assert_eq!(lib.full_path(), "libs/Bricks.matlib");
    }

    #[test]
    fn complete_paths_are_split() {
        let mut recent = RecentLibraries::default();
        let i = recent.add_recent_path("some/dir/Wood.matlib");
        assert_eq!(recent.libraries[i], RecentLibrary::new("Wood", "some/dir/"));
        assert_eq!(split_library_path("Flat.matlib"), (String::new(), "Flat".to_string()));
        assert!(recent.is_name_used("Wood"));
    }

    #[test]
    fn json_round_trip_and_bounds() {
        let mut recent = RecentLibraries::default();
        recent.add_recent("a/", "One");
        recent.set_most_recent(Some(1));
        assert_eq!(recent.most_recent_path().as_deref(), Some("a/One.matlib"));
        recent.set_most_recent(Some(7));
        assert_eq!(recent.most_recent, None);

        let json = r#"{ "libraries": [], "most_recent": 3 }"#;
        let parsed = RecentLibraries::from_json_str(json).unwrap();
        assert_eq!(parsed, RecentLibraries::default());
    }

    #[test]
    fn creation_requires_path_name_and_a_free_slot() {
        let recent = RecentLibraries::default();
        assert!(!recent.is_valid_for_creating("", "X"));
        assert!(!recent.is_valid_for_creating("./", ""));
        assert!(!recent.is_valid_for_creating("./", "DefaultLibrary"));
        assert!(recent.is_valid_for_creating("./no-such-dir/", "Fresh"));
        assert!(!recent.is_valid_for_adding(""));
        assert!(!recent.is_valid_for_adding("./no-such-dir/Fresh.matlib"));
    }

    #[test]
    fn load_without_a_file_gives_the_default_list() {
        let recent = RecentLibraries::load("./definitely/missing/recent.json").unwrap();
        assert_eq!(recent, RecentLibraries::default());
    }
}
