use std::iter::FromIterator;
use unwrap::unwrap;

/// Fixed capacity ring buffer of undo records, the newest record is popped first
/// and the oldest record is dropped when a push doesn't fit.
///
/// # Example
/// ```
/// # use rtlsim::data_structures::History;
/// let mut history = History::new(2);
///
/// history.push(1);
/// history.push(2);
/// history.push(3);
///
/// assert_eq!(history.pop(), Some(3));
/// assert_eq!(history.pop(), Some(2));
///
/// // 1 was evicted by 3.
/// assert_eq!(history.pop(), None);
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct History<T> {
    slots: Vec<Option<T>>,
    // Slot of the oldest record.
    head: usize,
    len: usize,
}

impl<T> History<T> {
    /// Returns an empty [History] that holds at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
        }
    }

    /// Returns the slot index of the `n`th oldest record.
    #[inline(always)]
    fn slot(&self, n: usize) -> usize {
        (self.head + n) % self.slots.len()
    }

    /// Pushes `record` as the newest record.
    ///
    /// If the history is full the oldest record is dropped and returned.
    /// With a capacity of 0 `record` itself is returned.
    pub fn push(&mut self, record: T) -> Option<T> {
        if self.slots.is_empty() {
            return Some(record);
        }
        if self.len == self.slots.len() {
            let oldest = self.slots[self.head].replace(record);
            self.head = self.slot(1);
            return oldest;
        }
        let idx = self.slot(self.len);
        self.slots[idx] = Some(record);
        self.len += 1;
        None
    }

    /// Removes the newest record and returns it.
    /// Returns None if the history is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let idx = self.slot(self.len - 1);
        self.len -= 1;
        Some(unwrap!(
            self.slots[idx].take(),
            "History slot {} is inside the live range but empty",
            idx
        ))
    }

    /// Returns a reference to the newest record.
    pub fn peek(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.slots[self.slot(self.len - 1)].as_ref()
    }

    /// Changes the capacity to `capacity`, keeping the newest records that fit.
    pub fn set_capacity(&mut self, capacity: usize) {
        if capacity == self.slots.len() {
            return;
        }
        let keep = self.len.min(capacity);
        let skip = self.len - keep;
        let mut slots: Vec<Option<T>> = Vec::with_capacity(capacity);
        for n in skip..self.len {
            let idx = self.slot(n);
            slots.push(self.slots[idx].take());
        }
        slots.resize_with(capacity, || None);

        self.slots = slots;
        self.head = 0;
        self.len = keep;
    }

    /// Drops every record, the capacity is unchanged.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }

    /// Returns the maximum number of records.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns an iterator over the records, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len)
            .rev()
            .filter_map(move |n| self.slots[self.slot(n)].as_ref())
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_HISTORY_DEPTH)
    }
}

impl<T> FromIterator<T> for History<T> {
    /// Collects the items oldest first into a [History] exactly as large as the iterator.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let slots: Vec<_> = iter.into_iter().map(Some).collect();
        Self {
            len: slots.len(),
            slots,
            head: 0,
        }
    }
}
