//! An index-stable doubly linked list
//!
//! The summary needs O(1) splicing in the middle of a long ordered sequence
//! while walking it front to back. Nodes live in a single `Vec` arena and link
//! to each other by index, so a `Handle` stays valid until its own node is
//! removed no matter what happens around it. Vacated slots are recycled
//! through a free list.
use std::ops::{Index, IndexMut};

/// Stable address of a node in a `List`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Handle(usize);

#[derive(Debug, Clone)]
struct Node<T> {
    elem: T,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Clone)]
pub(crate) struct List<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> List<T> {
    pub fn new() -> List<T> {
        List {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    pub fn head(&self) -> Option<Handle> {
        self.head.map(Handle)
    }

    pub fn tail(&self) -> Option<Handle> {
        self.tail.map(Handle)
    }

    pub fn next(&self, h: Handle) -> Option<Handle> {
        self.node(h.0).next.map(Handle)
    }

    #[cfg(test)]
    pub fn prev(&self, h: Handle) -> Option<Handle> {
        self.node(h.0).prev.map(Handle)
    }

    pub fn push_back(&mut self, elem: T) -> Handle {
        let idx = self.alloc(Node {
            elem,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(t) => self.node_mut(t).next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        Handle(idx)
    }

    /// Insert `elem` immediately ahead of the node at `at`
    pub fn insert_before(&mut self, at: Handle, elem: T) -> Handle {
        let prev = self.node(at.0).prev;
        let idx = self.alloc(Node {
            elem,
            prev,
            next: Some(at.0),
        });
        self.node_mut(at.0).prev = Some(idx);
        match prev {
            Some(p) => self.node_mut(p).next = Some(idx),
            None => self.head = Some(idx),
        }
        Handle(idx)
    }

    /// Unlink the node at `h`, invalidating `h`
    pub fn remove(&mut self, h: Handle) -> T {
        let node = match self.slots[h.0].take() {
            Some(node) => node,
            None => panic!("remove of vacant handle {:?}", h),
        };
        match node.prev {
            Some(p) => self.node_mut(p).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.node_mut(n).prev = node.prev,
            None => self.tail = node.prev,
        }
        self.free.push(h.0);
        self.len -= 1;
        node.elem
    }

    pub fn iter(&self) -> Iter<T> {
        Iter {
            list: self,
            cur: self.head,
            remaining: self.len,
        }
    }

    fn alloc(&mut self, node: Node<T>) -> usize {
        self.len += 1;
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn node(&self, idx: usize) -> &Node<T> {
        match self.slots[idx] {
            Some(ref node) => node,
            None => panic!("vacant slot {}", idx),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<T> {
        match self.slots[idx] {
            Some(ref mut node) => node,
            None => panic!("vacant slot {}", idx),
        }
    }
}

impl<T> Index<Handle> for List<T> {
    type Output = T;

    fn index(&self, h: Handle) -> &T {
        &self.node(h.0).elem
    }
}

impl<T> IndexMut<Handle> for List<T> {
    fn index_mut(&mut self, h: Handle) -> &mut T {
        &mut self.node_mut(h.0).elem
    }
}

#[derive(Debug)]
pub(crate) struct Iter<'a, T> {
    list: &'a List<T>,
    cur: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cur?;
        let node = self.list.node(idx);
        self.cur = node.next;
        self.remaining -= 1;
        Some(&node.elem)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
