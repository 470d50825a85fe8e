// Doubly linked lists over a shared slab of records.
//
// Records are addressed by index and never owned by a list: a record detached
// from one list may be appended to any other list of the same arena. Each list
// is a circular chain through its own sentinel slot.

/// Where a record currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Custody {
    /// Not in any list.
    Free,
    /// In the list with the given id.
    Listed(usize),
    /// Withdrawn until the arena is reset.
    Locked,
}

#[derive(Debug, Clone)]
pub(crate) struct DllArena {
    next: Vec<usize>,
    prev: Vec<usize>,
    custody: Vec<Custody>,
    num_items: usize,
}

impl DllArena {
    pub(crate) fn new(num_items: usize, num_lists: usize) -> Self {
        let size = num_items + num_lists;
        Self {
            next: (0..size).collect(),
            prev: (0..size).collect(),
            custody: vec![Custody::Free; num_items],
            num_items,
        }
    }

    pub(crate) fn num_lists(&self) -> usize {
        self.next.len() - self.num_items
    }

    fn sentinel(&self, list: usize) -> usize {
        debug_assert!(list < self.num_lists());
        self.num_items + list
    }

    #[cfg(test)]
    pub(crate) fn custody(&self, item: usize) -> Custody {
        self.custody[item]
    }

    pub(crate) fn is_locked(&self, item: usize) -> bool {
        self.custody[item] == Custody::Locked
    }

    pub(crate) fn is_empty(&self, list: usize) -> bool {
        let head = self.sentinel(list);
        self.next[head] == head
    }

    /// Insert `item` at the back of `list`.
    pub(crate) fn append(&mut self, list: usize, item: usize) {
        let head = self.sentinel(list);
        let last = self.prev[head];
        self.link(last, item, head, list);
    }

    /// Insert `item` at the front of `list`.
    pub(crate) fn appendleft(&mut self, list: usize, item: usize) {
        let head = self.sentinel(list);
        let first = self.next[head];
        self.link(head, item, first, list);
    }

    fn link(&mut self, before: usize, item: usize, after: usize, list: usize) {
        assert_eq!(
            self.custody[item],
            Custody::Free,
            "record {item} must be free to be linked"
        );
        self.next[before] = item;
        self.prev[item] = before;
        self.next[item] = after;
        self.prev[after] = item;
        self.custody[item] = Custody::Listed(list);
    }

    /// Remove `item` from whatever list holds it. Detaching a free record is a
    /// no-op; detaching a locked record is a bug.
    pub(crate) fn detach(&mut self, item: usize) {
        match self.custody[item] {
            Custody::Locked => panic!("cannot detach locked record {item}"),
            Custody::Free => {}
            Custody::Listed(_) => {
                let (before, after) = (self.prev[item], self.next[item]);
                self.next[before] = after;
                self.prev[after] = before;
                self.next[item] = item;
                self.prev[item] = item;
                self.custody[item] = Custody::Free;
            }
        }
    }

    /// Withdraw `item` from every list until the next `reset`.
    pub(crate) fn lock(&mut self, item: usize) {
        if !self.is_locked(item) {
            self.detach(item);
            self.custody[item] = Custody::Locked;
        }
    }

    pub(crate) fn popleft(&mut self, list: usize) -> Option<usize> {
        let head = self.sentinel(list);
        let first = self.next[head];
        if first == head {
            return None;
        }
        self.detach(first);
        Some(first)
    }

    #[cfg(test)]
    pub(crate) fn pop(&mut self, list: usize) -> Option<usize> {
        let head = self.sentinel(list);
        let last = self.prev[head];
        if last == head {
            return None;
        }
        self.detach(last);
        Some(last)
    }

    /// Empty every list and free every record, locked ones included.
    pub(crate) fn reset(&mut self) {
        for (slot, (next, prev)) in self.next.iter_mut().zip(self.prev.iter_mut()).enumerate() {
            *next = slot;
            *prev = slot;
        }
        self.custody.fill(Custody::Free);
    }

    /// Records of `list` from front to back.
    #[cfg(test)]
    pub(crate) fn iter(&self, list: usize) -> DllIter<'_> {
        let head = self.sentinel(list);
        DllIter {
            arena: self,
            head,
            cursor: self.next[head],
        }
    }
}

#[cfg(test)]
pub(crate) struct DllIter<'a> {
    arena: &'a DllArena,
    head: usize,
    cursor: usize,
}

#[cfg(test)]
impl Iterator for DllIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.cursor == self.head {
            return None;
        }
        let item = self.cursor;
        self.cursor = self.arena.next[item];
        Some(item)
    }
}
