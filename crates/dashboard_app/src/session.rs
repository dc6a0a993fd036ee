use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::Utc;
use dashboard_engine::{AtomicFileWriter, PersistError};
use dashboard_logging::{dash_info, dash_warn};
use serde::{Deserialize, Serialize};

/// Login state kept between CLI invocations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionFlags {
    pub logged_in: bool,
    pub name: String,
    pub role: String,
    /// Cookie header issued by the auth service.
    pub cookie: Option<String>,
    /// RFC 3339 timestamp of the last save.
    pub saved_at: Option<String>,
}

impl SessionFlags {
    pub fn logged_in(
        name: impl Into<String>,
        role: impl Into<String>,
        cookie: Option<String>,
    ) -> Self {
        Self {
            logged_in: true,
            name: name.into(),
            role: role.into(),
            cookie,
            saved_at: None,
        }
    }
}

/// RON file holding the [`SessionFlags`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Missing or unreadable files count as logged out.
    pub fn load(&self) -> SessionFlags {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return SessionFlags::default(),
            Err(err) => {
                dash_warn!("Failed to read session from {:?}: {}", self.path, err);
                return SessionFlags::default();
            }
        };
        match ron::from_str(&content) {
            Ok(flags) => flags,
            Err(err) => {
                dash_warn!("Failed to parse session from {:?}: {}", self.path, err);
                SessionFlags::default()
            }
        }
    }

    pub fn save(&self, flags: &SessionFlags) -> Result<(), PersistError> {
        let mut flags = flags.clone();
        flags.saved_at = Some(Utc::now().to_rfc3339());

        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&flags, pretty)
            .map_err(|err| PersistError::Serialize(err.to_string()))?;
        let (dir, filename) = self.split()?;
        AtomicFileWriter::new(dir).write(&filename, content.as_bytes())?;
        dash_info!("Saved session for {:?} to {:?}", flags.name, self.path);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), PersistError> {
        let (dir, filename) = self.split()?;
        AtomicFileWriter::new(dir).remove(&filename)
    }

    fn split(&self) -> Result<(PathBuf, String), PersistError> {
        let filename = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                PersistError::OutputDir(format!("{} has no file name", self.path.display()))
            })?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok((dir, filename.to_string()))
    }
}
