use std::fmt::{Debug, Formatter};

use educe::Educe;

use super::{Iter, List};
use crate::feedback::ContainerError;

/// FIFO queue of packets or records, built on [`List`]
#[derive(Educe, Clone, PartialEq, Eq)]
#[educe(Default(bound()))]
pub struct Queue<T> {
    items: List<T>,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self { items: List::new() }
    }

    pub fn enqueue(&mut self, value: T) {
        self.items.push_back(value);
    }

    pub fn dequeue(&mut self) -> Result<T, ContainerError> {
        self.items.pop_front().ok_or(ContainerError::EmptyQueue)
    }

    /// The element that the next `dequeue` returns
    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.items.iter()
    }
}

impl<T: Debug> Debug for Queue<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a Queue<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_in_first_out() {
        let mut queue = Queue::new();
        queue.enqueue(1);
        queue.enqueue(2);
        assert_eq!(queue.peek(), Some(&1));
        assert_eq!(queue.dequeue(), Ok(1));
        queue.enqueue(3);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), [2, 3]);
        assert_eq!(queue.dequeue(), Ok(2));
        assert_eq!(queue.dequeue(), Ok(3));
        assert!(queue.is_empty());
    }

    #[test]
    fn dequeue_on_empty_fails() {
        let mut queue: Queue<u8> = Queue::default();
        assert_eq!(queue.dequeue(), Err(ContainerError::EmptyQueue));
        assert_eq!(queue.peek(), None);
        assert_eq!(queue.len(), 0);
    }
}
