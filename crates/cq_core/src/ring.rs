use crate::{QueueError, Slot};

/// Fixed-capacity ring with one sentinel slot.
///
/// Holds `capacity + 1` slots so that the two indices alone distinguish an
/// empty ring from a full one. The slot just behind `head` is never readable
/// data when the ring is full; it is the sentinel.
pub struct Ring {
    slots: Box<[Slot]>,
    head: usize,
    tail: usize,
}

impl Ring {
    /// Allocates a ring with room for `capacity` values.
    ///
    /// Fails with `InvalidCapacity` for zero or when the sentinel slot would
    /// overflow `usize`, and with `Allocation` when the slots cannot be
    /// reserved. Storage is reserved fallibly so a huge capacity reports an
    /// error instead of aborting the process.
    pub fn try_new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity(capacity));
        }
        let max_size = capacity
            .checked_add(1)
            .ok_or(QueueError::InvalidCapacity(capacity))?;

        let mut vec = Vec::new();
        vec.try_reserve_exact(max_size)
            .map_err(|_| QueueError::Allocation(max_size))?;
        vec.resize(max_size, 0);

        Ok(Self {
            slots: vec.into_boxed_slice(),
            head: 0,
            tail: 0,
        })
    }

    /// Physical slot count, sentinel included.
    #[inline(always)]
    pub fn max_size(&self) -> usize {
        self.slots.len()
    }

    /// Number of values the ring can hold at once.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.max_size() - 1
    }

    #[inline(always)]
    pub fn head(&self) -> usize {
        self.head
    }

    #[inline(always)]
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Logical length, `(tail - head) mod max_size`.
    #[inline(always)]
    pub fn len(&self) -> usize {
        if self.tail >= self.head {
            self.tail - self.head
        } else {
            self.max_size() - self.head + self.tail
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.advance(self.tail, 1) == self.head
    }

    #[inline(always)]
    fn advance(&self, index: usize, by: usize) -> usize {
        // by <= capacity, so index + by never exceeds 2 * max_size - 2.
        let next = index + by;
        if next >= self.max_size() {
            next - self.max_size()
        } else {
            next
        }
    }

    /// Writes `value` at the tail, dropping the oldest value first if full.
    ///
    /// Returns the value that was overwritten, if any.
    pub fn push_overwrite(&mut self, value: Slot) -> Option<Slot> {
        let dropped = if self.is_full() {
            let oldest = self.slots[self.head];
            self.head = self.advance(self.head, 1);
            Some(oldest)
        } else {
            None
        };

        self.slots[self.tail] = value;
        self.tail = self.advance(self.tail, 1);
        dropped
    }

    /// Moves up to `out.len()` values into `out` in FIFO order.
    ///
    /// The length is read once before copying. Returns the number of values
    /// written; the remainder of `out` is left untouched.
    pub fn drain_into(&mut self, out: &mut [Slot]) -> usize {
        let n = self.len().min(out.len());
        if n == 0 {
            return 0;
        }

        // At most two contiguous runs: head..end, then 0..rest.
        let first = n.min(self.max_size() - self.head);
        out[..first].copy_from_slice(&self.slots[self.head..self.head + first]);
        let rest = n - first;
        if rest > 0 {
            out[first..n].copy_from_slice(&self.slots[..rest]);
        }

        self.head = self.advance(self.head, n);
        n
    }

    /// Discards every value by resetting both indices to zero.
    ///
    /// Returns how many values were discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.len();
        self.head = 0;
        self.tail = 0;
        discarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn drain_all(ring: &mut Ring) -> Vec<Slot> {
        let mut out = vec![0; ring.capacity()];
        let n = ring.drain_into(&mut out);
        out.truncate(n);
        out
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            Ring::try_new(0).err(),
            Some(QueueError::InvalidCapacity(0))
        );
    }

    #[test]
    fn sentinel_overflow_is_rejected() {
        assert_eq!(
            Ring::try_new(usize::MAX).err(),
            Some(QueueError::InvalidCapacity(usize::MAX))
        );
    }

    #[test]
    fn oversized_allocation_is_reported() {
        let capacity = usize::MAX / 2;
        assert!(matches!(
            Ring::try_new(capacity),
            Err(QueueError::Allocation(_))
        ));
    }

    #[test]
    fn new_ring_is_empty_with_sentinel_slot() {
        let ring = Ring::try_new(3).unwrap();
        assert_eq!(ring.max_size(), 4);
        assert_eq!(ring.capacity(), 3);
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn full_when_tail_is_one_behind_head() {
        let mut ring = Ring::try_new(3).unwrap();
        for v in 1..=3 {
            assert_eq!(ring.push_overwrite(v), None);
        }
        assert!(ring.is_full());
        assert_eq!(ring.len(), 3);
        assert_eq!((ring.head(), ring.tail()), (0, 3));
    }

    #[test]
    fn overwrite_drops_oldest() {
        let mut ring = Ring::try_new(3).unwrap();
        let dropped: Vec<_> = (1..=5).filter_map(|v| ring.push_overwrite(v)).collect();
        assert_eq!(dropped, vec![1, 2]);
        assert_eq!(drain_all(&mut ring), vec![3, 4, 5]);
        assert!(ring.is_empty());
    }

    #[test]
    fn drain_wraps_around_the_end() {
        let mut ring = Ring::try_new(4).unwrap();
        for v in 0..4 {
            ring.push_overwrite(v);
        }
        let mut two = [0; 2];
        assert_eq!(ring.drain_into(&mut two), 2);
        assert_eq!(two, [0, 1]);

        for v in 4..6 {
            assert_eq!(ring.push_overwrite(v), None);
        }
        assert!(ring.is_full());
        assert!(ring.tail() < ring.head());
        assert_eq!(drain_all(&mut ring), vec![2, 3, 4, 5]);
    }

    #[test]
    fn partial_drain_leaves_rest_of_output_untouched() {
        let mut ring = Ring::try_new(5).unwrap();
        ring.push_overwrite(7);
        let mut out = [-1; 4];
        assert_eq!(ring.drain_into(&mut out), 1);
        assert_eq!(out, [7, -1, -1, -1]);
    }

    #[test]
    fn clear_resets_indices() {
        let mut ring = Ring::try_new(2).unwrap();
        ring.push_overwrite(1);
        ring.push_overwrite(2);
        ring.push_overwrite(3);
        assert_eq!(ring.clear(), 2);
        assert!(ring.is_empty());
        assert_eq!((ring.head(), ring.tail()), (0, 0));
    }

    proptest! {
        #[test]
        fn fifo_within_capacity(capacity in 1usize..32, values in prop::collection::vec(any::<i32>(), 0..32)) {
            let mut ring = Ring::try_new(capacity).unwrap();
            let kept: Vec<_> = values.iter().copied().take(capacity).collect();
            for &v in &kept {
                prop_assert_eq!(ring.push_overwrite(v), None);
            }
            prop_assert_eq!(drain_all(&mut ring), kept);
        }

        #[test]
        fn overwrite_keeps_last_capacity_values(capacity in 1usize..16, extra in 1usize..40) {
            let mut ring = Ring::try_new(capacity).unwrap();
            let total = (capacity + extra) as i32;
            for v in 0..total {
                ring.push_overwrite(v);
            }
            let expected: Vec<_> = (total - capacity as i32..total).collect();
            prop_assert_eq!(drain_all(&mut ring), expected);
        }

        #[test]
        fn indices_and_length_stay_in_range(
            capacity in 1usize..12,
            ops in prop::collection::vec((any::<bool>(), 0usize..8), 0..64),
        ) {
            let mut ring = Ring::try_new(capacity).unwrap();
            let mut next = 0;
            for (push, max) in ops {
                if push {
                    ring.push_overwrite(next);
                    next += 1;
                } else {
                    let before = ring.len();
                    let mut out = vec![0; max];
                    let n = ring.drain_into(&mut out);
                    prop_assert_eq!(n, before.min(max));
                }
                prop_assert!(ring.head() < ring.max_size());
                prop_assert!(ring.tail() < ring.max_size());
                prop_assert!(ring.len() <= ring.capacity());
                prop_assert_eq!(ring.is_empty(), ring.len() == 0);
                prop_assert_eq!(ring.is_full(), ring.len() == ring.capacity());
            }
        }
    }
}
