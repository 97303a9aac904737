use chirp_types::UserId;

/// Monotonic user id counter.
///
/// Hands out 1, 2, 3, ... and never goes back, regardless of what happens to
/// the users holding earlier ids. The allocator has no lock of its own: it
/// lives inside the store's critical section and is only advanced under the
/// store's write lock.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    /// Create an allocator whose first id is [`UserId::FIRST`].
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Issue the next id, strictly greater than every id issued before.
    ///
    /// Returns `None` once `u64::MAX` has been issued; the allocator stays
    /// exhausted from then on.
    pub fn next(&mut self) -> Option<UserId> {
        self.last = self.last.checked_add(1)?;
        Some(UserId::new(self.last))
    }

    /// The most recently issued id, if any.
    pub fn last(&self) -> Option<UserId> {
        (self.last > 0).then_some(UserId::new(self.last))
    }

    #[cfg(test)]
    pub(crate) const fn after(last: u64) -> Self {
        Self { last }
    }
}
