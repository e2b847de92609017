//! Node-based containers used throughout the simulator.
//!
//! Every container here is a chain of boxed nodes. Each node is owned by exactly one
//! predecessor (or the container head) and is released when it is unlinked.

mod list;
mod queue;
mod stack;

pub use list::{IntoIter, List};
pub use queue::Queue;
pub use stack::Stack;

type Chain<T> = Option<Box<Node<T>>>;

struct Node<T> {
    value: T,
    next: Chain<T>,
}

impl<T> Node<T> {
    fn boxed(value: T, next: Chain<T>) -> Box<Self> {
        Box::new(Node { value, next })
    }
}

/// Releases a chain one node at a time, the default recursive drop would overflow on long chains
fn release<T>(head: &mut Chain<T>) {
    let mut cursor = head.take();
    while let Some(mut node) = cursor {
        cursor = node.next.take();
    }
}

/// Borrowing iterator over any chain, front to back
pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn new(head: &'a Chain<T>, len: usize) -> Self {
        Self {
            next: head.as_deref(),
            remaining: len,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.next.map(|node| {
            self.next = node.next.as_deref();
            self.remaining -= 1;
            &node.value
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Mutable iterator over any chain, front to back
pub struct IterMut<'a, T> {
    next: Option<&'a mut Node<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        self.next.take().map(|node| {
            self.next = node.next.as_deref_mut();
            &mut node.value
        })
    }
}
