use std::collections::HashMap;

use marshal_api::MarshalError;

/// Per-message list of interned strings, indexed from 0 in definition order.
///
/// Decoding side. Scoped to a single decode call and dropped with it.
/// Entries borrow from the message being parsed, so resolving a reference
/// copies a `&str`, not the text.
#[derive(Debug, Default)]
pub struct InternTable<'a> {
    entries: Vec<&'a str>,
}

impl<'a> InternTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a definition read from the wire; returns its index.
    pub fn push(&mut self, s: &'a str) -> Result<u32, MarshalError> {
        let index = next_index(self.entries.len())?;
        self.entries.push(s);
        Ok(index)
    }

    /// Resolve a reference. Only earlier definitions exist, so forward
    /// references fail like any other out-of-range index.
    pub fn resolve(&self, index: u32) -> Result<&'a str, MarshalError> {
        self.entries
            .get(index as usize)
            .copied()
            .ok_or(MarshalError::BadReference { index, len: self.entries.len() })
    }
}

/// Outcome of offering a string to the `Interner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interned {
    /// First occurrence: emit a definition; it now lives at this index.
    Defined(u32),
    /// Seen before: emit a reference to this index.
    Existing(u32),
}

/// Encoding side of the intern table.
///
/// Owns its keys so one message can be assembled from values that do not
/// outlive the encoder (rows streamed into an envelope).
#[derive(Debug, Default)]
pub struct Interner {
    positions: HashMap<String, u32>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Define `s` on first sight, reference it afterwards.
    pub fn intern(&mut self, s: &str) -> Result<Interned, MarshalError> {
        if let Some(&index) = self.positions.get(s) {
            return Ok(Interned::Existing(index));
        }
        let index = next_index(self.positions.len())?;
        self.positions.insert(s.to_owned(), index);
        Ok(Interned::Defined(index))
    }
}

/// Index for the entry after `len` existing ones; references are 4 bytes wide.
fn next_index(len: usize) -> Result<u32, MarshalError> {
    u32::try_from(len).map_err(|_| MarshalError::LengthOverflow { len })
}
