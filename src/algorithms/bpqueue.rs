// Bounded priority queue of gain records, the gain bucket of FM.
//
// Keys are integers in `[a, b]`, stored shifted by `offset = a - 1` so that
// bucket 0 stays empty and marks the bottom of the downward scan.

use super::dllist::DllArena;

#[derive(Debug, Clone)]
pub(crate) struct BPQueue {
    offset: i32,
    high: usize,
    max: usize,
    keys: Vec<i32>,
    arena: DllArena,
}

impl BPQueue {
    /// A queue for the records `0..num_items` with keys in `[a, b]`.
    pub(crate) fn new(num_items: usize, a: i32, b: i32) -> Self {
        assert!(a <= b, "empty key range [{a}, {b}]");
        let offset = a - 1;
        let high = (b - offset) as usize;
        Self {
            offset,
            high,
            max: 0,
            keys: vec![0; num_items],
            // buckets 0..=high, then the holding list
            arena: DllArena::new(num_items, high + 2),
        }
    }

    fn holding_list(&self) -> usize {
        self.high + 1
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.max == 0
    }

    /// The largest key in the queue. Meaningless when the queue is empty.
    pub(crate) fn get_max(&self) -> i32 {
        self.max as i32 + self.offset
    }

    pub(crate) fn get_key(&self, item: usize) -> i32 {
        self.keys[item] + self.offset
    }

    #[cfg(test)]
    pub(crate) fn custody(&self, item: usize) -> super::dllist::Custody {
        self.arena.custody(item)
    }

    #[cfg(test)]
    pub(crate) fn is_locked(&self, item: usize) -> bool {
        self.arena.is_locked(item)
    }

    /// Empty every bucket and the holding list, and unlock every record.
    pub(crate) fn clear(&mut self) {
        self.max = 0;
        self.arena.reset();
    }

    fn shifted(&self, key: i32) -> usize {
        let shifted = key - self.offset;
        assert!(
            shifted > 0 && shifted as usize <= self.high,
            "key {key} is outside [{}, {}]",
            self.offset + 1,
            self.offset + self.high as i32
        );
        shifted as usize
    }

    pub(crate) fn append(&mut self, item: usize, key: i32) {
        let bucket = self.shifted(key);
        self.keys[item] = bucket as i32;
        self.max = self.max.max(bucket);
        self.arena.append(bucket, item);
    }

    pub(crate) fn appendleft(&mut self, item: usize, key: i32) {
        let bucket = self.shifted(key);
        self.keys[item] = bucket as i32;
        self.max = self.max.max(bucket);
        self.arena.appendleft(bucket, item);
    }

    /// Remove and return a record with the largest key.
    pub(crate) fn popleft(&mut self) -> usize {
        let Some(item) = self.arena.popleft(self.max) else {
            panic!("popleft on an empty gain bucket");
        };
        self.settle_max();
        item
    }

    fn settle_max(&mut self) {
        while self.max > 0 && self.arena.is_empty(self.max) {
            self.max -= 1;
        }
    }

    /// Park a popped record. It returns to a bucket on its next key change.
    pub(crate) fn hold(&mut self, item: usize) {
        let holding = self.holding_list();
        self.arena.append(holding, item);
    }

    /// Withdraw a record for the rest of the pass.
    pub(crate) fn lock(&mut self, item: usize) {
        self.arena.lock(item);
        self.settle_max();
    }

    /// Raise the key and reinsert at the front of its new bucket.
    pub(crate) fn increase_key(&mut self, item: usize, delta: i32) {
        self.arena.detach(item);
        let key = self.get_key(item) + delta;
        self.appendleft(item, key);
    }

    /// Lower the key and reinsert at the back of its new bucket.
    pub(crate) fn decrease_key(&mut self, item: usize, delta: i32) {
        self.arena.detach(item);
        let key = self.get_key(item) - delta;
        self.append(item, key);
        self.settle_max();
    }

    pub(crate) fn modify_key(&mut self, item: usize, delta: i32) {
        if self.arena.is_locked(item) {
            return;
        }
        if delta > 0 {
            self.increase_key(item, delta);
        } else if delta < 0 {
            self.decrease_key(item, -delta);
        }
    }

    /// Records in the bucket holding `key`, front to back.
    #[cfg(test)]
    pub(crate) fn iter_bucket(&self, key: i32) -> impl Iterator<Item = usize> + '_ {
        self.arena.iter(self.shifted(key))
    }

    /// Records in any bucket, from the largest key down.
    #[cfg(test)]
    pub(crate) fn iter_buckets(&self) -> impl Iterator<Item = usize> + '_ {
        (1..=self.high).rev().flat_map(|bucket| self.arena.iter(bucket))
    }
}

#[cfg(test)]
mod tests {
    use itertools::assert_equal;

    use super::*;
    use crate::algorithms::dllist::Custody;

    #[test]
    fn test_popleft_returns_max_and_scans_down() {
        // Arrange
        let mut bpq = BPQueue::new(4, -3, 3);
        bpq.append(0, -3);
        bpq.append(1, 2);
        bpq.append(2, 2);
        bpq.append(3, 0);

        // Act and Assert
        assert_eq!(bpq.get_max(), 2);
        assert_eq!(bpq.popleft(), 1);
        assert_eq!(bpq.popleft(), 2);
        assert_eq!(bpq.get_max(), 0);
        assert_eq!(bpq.popleft(), 3);
        assert_eq!(bpq.get_max(), -3);
        assert_eq!(bpq.popleft(), 0);
        assert!(bpq.is_empty());
    }

    #[test]
    fn test_increase_is_lifo_and_decrease_is_fifo() {
        // Arrange
        let mut bpq = BPQueue::new(4, -5, 5);
        bpq.append(0, 1);
        bpq.append(1, 1);
        bpq.append(2, 3);
        bpq.append(3, 3);

        // Act
        bpq.increase_key(0, 2);
        bpq.increase_key(1, 1);
        bpq.modify_key(1, -2);

        // Assert
        assert_equal(bpq.iter_bucket(3), [0, 2, 3]);
        assert_equal(bpq.iter_bucket(0), [1]);
        assert_eq!(bpq.get_key(1), 0);
    }

    #[test]
    fn test_decrease_of_the_only_max_lowers_max() {
        // Arrange
        let mut bpq = BPQueue::new(2, -5, 5);
        bpq.append(0, 4);
        bpq.append(1, -1);

        // Act
        bpq.decrease_key(0, 6);

        // Assert
        assert_eq!(bpq.get_max(), -1);
        assert_equal(bpq.iter_bucket(-2), [0]);
    }

    #[test]
    fn test_held_record_is_revived_by_modify_key() {
        // Arrange
        let mut bpq = BPQueue::new(2, -2, 2);
        bpq.append(0, 1);
        bpq.append(1, -1);
        let popped = bpq.popleft();
        bpq.hold(popped);

        // Act
        bpq.modify_key(popped, 1);

        // Assert
        assert_eq!(popped, 0);
        assert_eq!(bpq.get_max(), 2);
        assert_equal(bpq.iter_bucket(2), [0]);
    }

    #[test]
    fn test_locked_record_ignores_modify_key() {
        // Arrange
        let mut bpq = BPQueue::new(2, -2, 2);
        bpq.append(0, 2);
        bpq.append(1, 0);

        // Act
        bpq.lock(0);
        bpq.modify_key(0, -1);

        // Assert
        assert!(bpq.is_locked(0));
        assert_eq!(bpq.get_key(0), 2);
        assert_eq!(bpq.get_max(), 0);
        assert_equal(bpq.iter_buckets(), [1]);
    }

    #[test]
    fn test_clear_unlocks_everything() {
        // Arrange
        let mut bpq = BPQueue::new(2, -2, 2);
        bpq.append(0, 2);
        bpq.lock(1);

        // Act
        bpq.clear();

        // Assert
        assert!(bpq.is_empty());
        assert_eq!(bpq.custody(1), Custody::Free);
    }

    #[test]
    #[should_panic(expected = "empty gain bucket")]
    fn test_popleft_on_empty_queue_panics() {
        let mut bpq = BPQueue::new(1, -1, 1);
        bpq.popleft();
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_key_out_of_bounds_panics() {
        let mut bpq = BPQueue::new(1, -1, 1);
        bpq.append(0, 2);
    }
}
