//! Recency list
//!
//! Doubly linked list of keys, most recently used at the head. Nodes live in
//! an arena and link to each other by slot index; freed slots are reused.

use replay_foundation::CacheKey;

#[derive(Debug, Clone)]
struct Node {
    key: CacheKey,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Default)]
pub(crate) struct RecencyList {
    slots: Vec<Node>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl RecencyList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of linked nodes
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Allocate a node for `key` and link it at the head
    pub(crate) fn push_front(&mut self, key: CacheKey) -> usize {
        let node = Node {
            key,
            prev: None,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = node;
                slot
            }
            None => {
                self.slots.push(node);
                self.slots.len() - 1
            }
        };
        self.attach_front(slot);
        slot
    }

    pub(crate) fn move_to_front(&mut self, slot: usize) {
        if self.head == Some(slot) {
            return;
        }
        self.detach(slot);
        self.attach_front(slot);
    }

    /// Unlink the least recently used node and free its slot
    pub(crate) fn pop_back(&mut self) -> Option<CacheKey> {
        let slot = self.tail?;
        self.detach(slot);
        self.free.push(slot);
        Some(self.slots[slot].key)
    }

    /// Unlink `slot` but keep it allocated; relink with [`Self::attach_front`]
    pub(crate) fn detach(&mut self, slot: usize) {
        let (prev, next) = {
            let node = &self.slots[slot];
            (node.prev, node.next)
        };

        match prev {
            Some(prev) => self.slots[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next].prev = prev,
            None => self.tail = prev,
        }

        let node = &mut self.slots[slot];
        node.prev = None;
        node.next = None;
        self.len -= 1;
    }

    /// Link an allocated, unlinked `slot` at the head
    pub(crate) fn attach_front(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let node = &mut self.slots[slot];
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(old) => self.slots[old].prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
        self.len += 1;
    }

    /// Drop every node
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Keys from most to least recently used
    pub(crate) fn keys(&self) -> Keys<'_> {
        Keys {
            list: self,
            cursor: self.head,
        }
    }
}

pub(crate) struct Keys<'a> {
    list: &'a RecencyList,
    cursor: Option<usize>,
}

impl Iterator for Keys<'_> {
    type Item = CacheKey;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = &self.list.slots[slot];
        self.cursor = node.next;
        Some(node.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(v: u64) -> CacheKey {
        CacheKey::new(v)
    }

    fn order(list: &RecencyList) -> Vec<u64> {
        list.keys().map(CacheKey::as_u64).collect()
    }

    #[test]
    fn test_push_front_orders_mru_first() {
        let mut list = RecencyList::new();
        list.push_front(k(1));
        list.push_front(k(2));
        list.push_front(k(3));
        assert_eq!(order(&list), vec![3, 2, 1]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_move_to_front() {
        let mut list = RecencyList::new();
        let a = list.push_front(k(1));
        list.push_front(k(2));
        list.push_front(k(3));

        list.move_to_front(a);
        assert_eq!(order(&list), vec![1, 3, 2]);

        // already at head
        list.move_to_front(a);
        assert_eq!(order(&list), vec![1, 3, 2]);
    }

    #[test]
    fn test_pop_back() {
        let mut list = RecencyList::new();
        list.push_front(k(1));
        list.push_front(k(2));

        assert_eq!(list.pop_back(), Some(k(1)));
        assert_eq!(list.pop_back(), Some(k(2)));
        assert_eq!(list.pop_back(), None);
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_detach_middle_and_reattach() {
        let mut list = RecencyList::new();
        list.push_front(k(1));
        let b = list.push_front(k(2));
        list.push_front(k(3));

        list.detach(b);
        assert_eq!(order(&list), vec![3, 1]);
        assert_eq!(list.len(), 2);

        list.attach_front(b);
        assert_eq!(order(&list), vec![2, 3, 1]);
    }

    #[test]
    fn test_detach_only_node() {
        let mut list = RecencyList::new();
        let a = list.push_front(k(7));
        list.detach(a);
        assert_eq!(list.pop_back(), None);
        list.attach_front(a);
        assert_eq!(list.pop_back(), Some(k(7)));
    }

    #[test]
    fn test_slots_are_reused() {
        let mut list = RecencyList::new();
        list.push_front(k(1));
        list.push_front(k(2));
        list.pop_back();
        list.push_front(k(3));
        assert_eq!(list.slots.len(), 2);
        assert_eq!(order(&list), vec![3, 2]);
    }
}
