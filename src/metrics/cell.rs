use std::cell::Cell;

/// A counter that can be bumped through `&self`.
///
/// Used for counters recorded from read-only operations such as `get`.
/// The wrapped `Cell` makes the owning map `!Sync`; share a map across
/// threads only behind a lock that hands out `&mut` access.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get() + 1);
    }

    #[inline]
    pub fn reset(&self) {
        self.0.set(0);
    }
}
