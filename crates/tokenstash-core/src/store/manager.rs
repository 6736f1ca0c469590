use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::{Credential, SessionId};
use crate::config::{OAuthClientConfig, StoreConfig};
use crate::error::{Result, StoreError};
use crate::store::record::StoredToken;

/// Suffix of the scratch file a record is written to before being renamed into place
const TMP_SUFFIX: &str = ".tmp";

/// File-backed token store, one JSON record per session.
#[derive(Debug, Clone)]
pub struct SessionTokenStore {
    base_dir: PathBuf,
    client: OAuthClientConfig,
}

impl SessionTokenStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
            client: config.client,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn record_path(&self, session: &SessionId) -> PathBuf {
        self.base_dir.join(session.file_name())
    }

    /// Load the credential saved for `session_id`.
    ///
    /// Returns `Ok(None)` when nothing was ever saved. An unreadable or
    /// malformed record is an error, logged before it is returned. An
    /// unparseable expiry is not: the credential comes back without one.
    pub fn load<C: Credential>(&self, session_id: &str) -> Result<Option<C>> {
        let result = self.load_inner(session_id);
        if let Err(ref e) = result {
            error!(session = session_id, error = %e, "Failed to load credentials");
        }
        result
    }

    fn load_inner<C: Credential>(&self, session_id: &str) -> Result<Option<C>> {
        let Some(record) = self.load_record(session_id)? else {
            return Ok(None);
        };
        let email = record.email.clone();
        let credential = record.into_credential(&self.client);
        info!(session = session_id, user = %email, "Loaded credentials");
        Ok(Some(credential))
    }

    /// Like `load`, but any failure reads as "no credential".
    pub fn load_or_none<C: Credential>(&self, session_id: &str) -> Option<C> {
        self.load(session_id).ok().flatten()
    }

    /// Read the raw record for `session_id` without building a credential
    pub fn load_record(&self, session_id: &str) -> Result<Option<StoredToken>> {
        let session = SessionId::parse(session_id)?;
        let path = self.record_path(&session);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(session = %session, path = %path.display(), "No token file for session");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        let record = serde_json::from_str(&contents)
            .map_err(|source| StoreError::Parse { path, source })?;
        Ok(Some(record))
    }

    /// Persist `credential` for `session_id`, replacing any earlier record.
    pub fn save<C: Credential>(&self, session_id: &str, email: &str, credential: &C) -> Result<()> {
        let result = self.save_inner(session_id, email, credential);
        match result {
            Ok(()) => info!(session = session_id, user = email, "Saved credentials"),
            Err(ref e) => error!(session = session_id, error = %e, "Failed to save credentials"),
        }
        result
    }

    fn save_inner<C: Credential>(&self, session_id: &str, email: &str, credential: &C) -> Result<()> {
        let session = SessionId::parse(session_id)?;
        fs::create_dir_all(&self.base_dir).map_err(|e| StoreError::io(&self.base_dir, e))?;

        let record = StoredToken::from_credential(&session, email, credential);
        let contents = serde_json::to_string_pretty(&record)?;
        self.write_atomic(&self.record_path(&session), contents.as_bytes())
    }

    /// Save and drop the outcome. Failures are still logged by `save`.
    pub fn save_or_log<C: Credential>(&self, session_id: &str, email: &str, credential: &C) {
        let _ = self.save(session_id, email, credential);
    }

    /// Remove the record for `session_id`. Returns whether one existed.
    pub fn delete(&self, session_id: &str) -> Result<bool> {
        let session = SessionId::parse(session_id)?;
        let path = self.record_path(&session);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(session = %session, "Deleted credentials");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Sessions with a stored record, sorted
    pub fn list_sessions(&self) -> Result<Vec<SessionId>> {
        let entries = match fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.base_dir, e)),
        };

        let mut sessions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.base_dir, e))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name();
            match name.to_str().and_then(SessionId::from_file_name) {
                Some(session) => sessions.push(session),
                None => debug!(file = ?name, "Skipping non-record file"),
            }
        }
        sessions.sort();
        Ok(sessions)
    }

    /// Write to a scratch file next to `path`, then rename it into place.
    /// Each call gets its own scratch file, so concurrent writers never share one.
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(format!(".{}{}", Uuid::new_v4().simple(), TMP_SUFFIX));
        let tmp_path = PathBuf::from(tmp_name);

        let written = create_private(&tmp_path)
            .and_then(|mut file| {
                file.write_all(bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp_path, path));

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = %tmp_path.display(), error = %cleanup, "Failed to remove temp token file");
                }
            }
            return Err(StoreError::io(path, e));
        }
        Ok(())
    }
}

/// Create (or truncate) a file readable only by the owner on Unix
#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    fs::File::create(path)
}

// ============================================================================
// Tests
// ============================================================================
