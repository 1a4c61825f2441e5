//! Bearer token storage.

use std::{fs, io, path::PathBuf};

use crate::TokenError;

/// Persists the single bearer token attached to every request.
pub trait TokenStore: Send {
    /// Stored token, if any.
    fn load(&self) -> Result<Option<String>, TokenError>;

    /// Replace the stored token.
    fn store(&mut self, token: &str) -> Result<(), TokenError>;

    /// Forget the stored token. Succeeds if there was none.
    fn clear(&mut self) -> Result<(), TokenError>;
}

/// Token kept in memory for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Option<String>,
}

impl MemoryTokenStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenError> {
        Ok(self.token.clone())
    }

    fn store(&mut self, token: &str) -> Result<(), TokenError> {
        self.token = Some(token.to_owned());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), TokenError> {
        self.token = None;
        Ok(())
    }
}

/// Token kept in a file so separate CLI invocations share a login.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store backed by `path`. The file is created on first login.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> TokenError {
        TokenError::Io { path: self.path.clone(), source }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_owned()))
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn store(&mut self, token: &str) -> Result<(), TokenError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, token).map_err(|e| self.io_error(e))
    }

    fn clear(&mut self) -> Result<(), TokenError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
