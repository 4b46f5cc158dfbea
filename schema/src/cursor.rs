/// The position shared by a message flyweight and every group nested in it.
///
/// `limit` marks the first byte past everything consumed so far. A message
/// codec owns its `Cursor`; group codecs hold a `&mut Cursor` borrowed from
/// their parent, so advancing through a group moves the message's limit too.
/// `acting_version` is the schema version the bytes were encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    limit:          usize,
    acting_version: u64,
}

impl Cursor {
    pub const fn new(limit: usize, acting_version: u64) -> Self {
        Cursor { limit, acting_version }
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    #[inline]
    pub fn acting_version(&self) -> u64 {
        self.acting_version
    }

    /// Moves the limit forward by `length` bytes and returns where it was.
    pub fn advance(&mut self, length: usize) -> usize {
        let start = self.limit;
        self.limit += length;
        start
    }
}
