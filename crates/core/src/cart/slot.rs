//! Durable key-value slot for the cart snapshot.
//!
//! Mirrors the browser-local storage the cart lives in between sessions:
//! one fixed key, a JSON string value, read once at startup and written
//! synchronously on every mutation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::CartState;

/// Fixed storage key for the cart snapshot.
pub const CART_KEY: &str = "cart";

/// Errors from reading or writing a cart slot.
#[derive(Debug, thiserror::Error)]
pub enum CartSlotError {
    /// The underlying storage could not be read or written.
    #[error("cart slot I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The stored snapshot is not valid JSON for a cart state.
    #[error("cart snapshot is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A durable slot holding at most one cart snapshot.
pub trait CartSlot {
    /// Load the stored snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read or the snapshot cannot
    /// be deserialized.
    fn load(&self) -> Result<Option<CartState>, CartSlotError>;

    /// Overwrite the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or written.
    fn save(&self, state: &CartState) -> Result<(), CartSlotError>;
}

/// File-backed slot: `<dir>/cart.json`.
#[derive(Debug, Clone)]
pub struct FileCartSlot {
    path: PathBuf,
}

impl FileCartSlot {
    /// Create a slot rooted at `dir`. The directory must already exist.
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{CART_KEY}.json")),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartSlot for FileCartSlot {
    fn load(&self) -> Result<Option<CartState>, CartSlotError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &CartState) -> Result<(), CartSlotError> {
        let json = serde_json::to_vec(state)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory slot for tests.
///
/// Stores the serialized JSON string, not the state itself, so it exercises
/// the same round trip as the file-backed slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartSlot {
    value: Arc<Mutex<Option<String>>>,
}

impl CartSlot for MemoryCartSlot {
    fn load(&self) -> Result<Option<CartState>, CartSlotError> {
        let guard = self.value.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match guard.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &CartState) -> Result<(), CartSlotError> {
        let json = serde_json::to_string(state)?;
        let mut guard = self.value.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Some(json);
        Ok(())
    }
}
