use alloy_primitives::{Address, B256, U256};

/// One reversible state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    /// A new account was inserted; undo removes it.
    AccountCreated { address: Address },
    /// An account nonce moved away from `previous`.
    NonceChanged { address: Address, previous: u64 },
    /// A storage slot was overwritten; `previous` is the value before the write.
    StorageChanged {
        address: Address,
        slot: U256,
        previous: B256,
    },
}

/// Position in the journal a frame or transaction can roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(usize);

/// Ordered log of state changes made by the transaction in flight.
///
/// Frames take a [`Checkpoint`] on entry and, on failure, undo every entry
/// recorded after it. A committed transaction drains the journal.
#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.entries.len())
    }

    pub fn record(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    /// Remove every entry after `checkpoint`, newest first, for the caller to undo.
    pub fn revert_to(&mut self, checkpoint: Checkpoint) -> Vec<JournalEntry> {
        let start = checkpoint.0.min(self.entries.len());
        let mut undone = self.entries.split_off(start);
        undone.reverse();
        undone
    }

    /// Drain all entries, oldest first (the transaction committed).
    pub fn take(&mut self) -> Vec<JournalEntry> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
