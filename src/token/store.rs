//! Single-slot bearer token storage.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The legacy API bearer credential.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Opaque bearer value. Empty until the first fetch.
    pub value: String,
    /// Absolute expiry. `None` means never fetched.
    pub expires_at: Option<DateTime<Utc>>,
    /// When this value was written to the store.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Token {
    /// True if the token expires strictly after `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at > now)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

// Never print the credential itself.
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("fetched_at", &self.fetched_at)
            .finish()
    }
}

struct Inner {
    slot: ArcSwap<Token>,
    /// Serializes writers so slot swaps and file writes land in the same order.
    writer: Mutex<()>,
    persistence_path: Option<PathBuf>,
}

/// Shared store for the single legacy API token.
///
/// Readers load the current slot without locking. `replace` swaps in a
/// complete new `Token`, so a reader sees either the old token or the new
/// one, never a mix of both.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<Inner>,
}

impl TokenStore {
    /// Create an empty, memory-only store.
    pub fn new() -> Self {
        Self::with_slot(Token::default(), None)
    }

    fn with_slot(token: Token, persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: ArcSwap::from_pointee(token),
                writer: Mutex::new(()),
                persistence_path,
            }),
        }
    }

    /// Open a file-backed store, loading the slot if the file exists.
    pub fn load_from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let token = if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let token: Token = serde_json::from_reader(reader)?;
            tracing::info!(
                path = %path.display(),
                expires_at = ?token.expires_at,
                "Loaded legacy token from cache file"
            );
            token
        } else {
            Token::default()
        };

        Ok(Self::with_slot(token, Some(path.to_path_buf())))
    }

    /// The current token if it has not expired.
    pub fn get_valid(&self) -> Option<Token> {
        self.get_valid_at(Utc::now())
    }

    pub fn get_valid_at(&self, now: DateTime<Utc>) -> Option<Token> {
        let current = self.inner.slot.load();
        if current.is_valid_at(now) {
            Some(Token::clone(&current))
        } else {
            None
        }
    }

    /// The current slot regardless of validity.
    pub fn snapshot(&self) -> Token {
        Token::clone(&self.inner.slot.load())
    }

    /// Overwrite the slot with freshly fetched credential data.
    pub fn replace(&self, value: String, expires_at: DateTime<Utc>) -> Token {
        let _guard = self
            .inner
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let token = Token {
            value,
            expires_at: Some(expires_at),
            fetched_at: Some(Utc::now()),
        };
        self.inner.slot.store(Arc::new(token.clone()));

        if let Some(path) = &self.inner.persistence_path {
            // The in-memory slot is authoritative; a failed write only costs a refetch after restart.
            if let Err(e) = save_to_file(path, &token) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to persist legacy token");
            }
        }

        token
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

fn save_to_file(path: &Path, token: &Token) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    {
        let writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(writer, token)?;
    }
    fs::rename(&tmp, path)
}
