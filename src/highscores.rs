//! Best score persistence
//!
//! The best score is a single non-negative integer stored as a decimal string
//! under [`BEST_SCORE_KEY`]. Stores report failures as [`StoreError`]; callers
//! treat every failure as non-fatal and keep the in-memory value.

use std::fmt;

/// Storage key for the best score
pub const BEST_SCORE_KEY: &str = "universoAL_bestScore";

/// Why the best score could not be read or written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No backing storage (private mode, no window, native build)
    Unavailable,
    /// Stored value is not a non-negative integer
    Corrupt(String),
    WriteFailed(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "storage unavailable"),
            StoreError::Corrupt(value) => write!(f, "stored best score is corrupt: {:?}", value),
            StoreError::WriteFailed(reason) => write!(f, "failed to save best score: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

/// Persistent best-score storage
pub trait BestScoreStore {
    /// Stored best score; a missing entry reads as 0
    fn load(&self) -> Result<u64, StoreError>;

    fn save(&mut self, score: u64) -> Result<(), StoreError>;
}

/// Parse a stored best score.
///
/// Accepts surrounding whitespace and trailing garbage after the leading
/// digits ("120px" reads as 120). Negative or digit-less values are corrupt.
pub fn parse_best_score(raw: &str) -> Result<u64, StoreError> {
    let trimmed = raw.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return Err(StoreError::Corrupt(raw.to_string()));
    }
    digits[..end]
        .parse::<u64>()
        .map_err(|_| StoreError::Corrupt(raw.to_string()))
}

/// In-memory store for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<String>,
    /// Make every call fail with `Unavailable`
    pub unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with a raw string value
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            value: Some(raw.into()),
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            value: None,
            unavailable: true,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl BestScoreStore for MemoryStore {
    fn load(&self) -> Result<u64, StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        match &self.value {
            Some(raw) => parse_best_score(raw),
            None => Ok(0),
        }
    }

    fn save(&mut self, score: u64) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable);
        }
        self.value = Some(score.to_string());
        Ok(())
    }
}

/// Browser LocalStorage store
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl BestScoreStore for LocalStorageStore {
    fn load(&self) -> Result<u64, StoreError> {
        let storage = Self::storage()?;
        match storage.get_item(BEST_SCORE_KEY) {
            Ok(Some(raw)) => {
                let score = parse_best_score(&raw)?;
                log::info!("Loaded best score {}", score);
                Ok(score)
            }
            Ok(None) => {
                log::info!("No best score found, starting fresh");
                Ok(0)
            }
            Err(_) => Err(StoreError::Unavailable),
        }
    }

    fn save(&mut self, score: u64) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        storage
            .set_item(BEST_SCORE_KEY, &score.to_string())
            .map_err(|e| StoreError::WriteFailed(format!("{:?}", e)))
    }
}
