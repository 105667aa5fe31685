//! # Scan Cursor
//!
//! The highest height whose records are all durably stored.
//!
//! The cursor has its own key, written after a height is sealed. Stores
//! written before that key existed, or a crash before the first cursor write,
//! leave only records behind; the cursor is then rebuilt from the highest
//! record height. A rebuilt height may be partially written, so the scan
//! resumes at it rather than after it. Re-inserting its records is a no-op.

use shared_types::BlockHeight;

/// Where the cursor value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorOrigin {
    /// Empty store. The scan starts at genesis.
    Empty,
    /// Read from the cursor key. The height is fully processed.
    Persisted,
    /// Rebuilt as the highest stored record height.
    Replayed,
}

/// Monotonic high-water mark of processed heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanCursor {
    height: BlockHeight,
    origin: CursorOrigin,
}

impl Default for ScanCursor {
    fn default() -> Self {
        Self::empty()
    }
}

impl ScanCursor {
    pub fn empty() -> Self {
        Self {
            height: 0,
            origin: CursorOrigin::Empty,
        }
    }

    pub fn persisted(height: BlockHeight) -> Self {
        Self {
            height,
            origin: CursorOrigin::Persisted,
        }
    }

    pub fn replayed(height: BlockHeight) -> Self {
        Self {
            height,
            origin: CursorOrigin::Replayed,
        }
    }

    /// Build the startup cursor from the cursor key and the replayed records.
    pub fn rebuild(stored: Option<BlockHeight>, max_record_height: Option<BlockHeight>) -> Self {
        match (stored, max_record_height) {
            (Some(cursor), Some(max)) if max > cursor => Self::replayed(max),
            (Some(cursor), _) => Self::persisted(cursor),
            (None, Some(max)) => Self::replayed(max),
            (None, None) => Self::empty(),
        }
    }

    /// Current height; zero for an empty store.
    pub fn load(&self) -> BlockHeight {
        self.height
    }

    pub fn origin(&self) -> CursorOrigin {
        self.origin
    }

    /// First height the next scan must process.
    pub fn resume_height(&self) -> BlockHeight {
        match self.origin {
            CursorOrigin::Empty => 0,
            CursorOrigin::Persisted => self.height.saturating_add(1),
            CursorOrigin::Replayed => self.height,
        }
    }

    /// Whether sealing `height` moves the cursor.
    ///
    /// Heights at or below a persisted value are absorbed as no-ops.
    pub fn accepts(&self, height: BlockHeight) -> bool {
        match self.origin {
            CursorOrigin::Empty => true,
            CursorOrigin::Persisted => height > self.height,
            CursorOrigin::Replayed => height >= self.height,
        }
    }
}
