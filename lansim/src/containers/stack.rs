use std::fmt::{Debug, Formatter};

use educe::Educe;

use super::{release, Chain, Iter, Node};
use crate::feedback::ContainerError;

/// LIFO stack, iterated from the most recent push downwards
#[derive(Educe)]
#[educe(Default(bound()))]
pub struct Stack<T> {
    top: Chain<T>,
    len: usize,
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self { top: None, len: 0 }
    }

    pub fn push(&mut self, value: T) {
        let below = self.top.take();
        self.top = Some(Node::boxed(value, below));
        self.len += 1;
    }

    pub fn pop(&mut self) -> Result<T, ContainerError> {
        let node = self.top.take().ok_or(ContainerError::EmptyStack)?;
        let Node { value, next } = *node;
        self.top = next;
        self.len -= 1;
        Ok(value)
    }

    pub fn peek(&self) -> Option<&T> {
        self.top.as_deref().map(|node| &node.value)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.top, self.len)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }
}

impl<T> Drop for Stack<T> {
    fn drop(&mut self) {
        release(&mut self.top);
    }
}

impl<T: Clone> Clone for Stack<T> {
    fn clone(&self) -> Self {
        // pushing top-down reverses once, pushing again restores the order
        let mut reversed = Stack::new();
        for value in self.iter() {
            reversed.push(value.clone());
        }
        let mut copy = Stack::new();
        while let Ok(value) = reversed.pop() {
            copy.push(value);
        }
        copy
    }
}

impl<T: PartialEq> PartialEq for Stack<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Stack<T> {}

impl<T: Debug> Debug for Stack<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a Stack<T> {
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
    fn last_in_first_out() {
        let mut stack = Stack::new();
        stack.push("first");
        stack.push("second");
        assert_eq!(stack.peek(), Some(&"second"));
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), ["second", "first"]);
        assert_eq!(stack.pop(), Ok("second"));
        assert_eq!(stack.pop(), Ok("first"));
        assert_eq!(stack.pop(), Err(ContainerError::EmptyStack));
    }

    #[test]
    fn clone_preserves_order() {
        let mut stack = Stack::new();
        for i in 0..5 {
            stack.push(i);
        }
        let copy = stack.clone();
        assert_eq!(copy, stack);
        assert_eq!(copy.iter().copied().collect::<Vec<_>>(), [4, 3, 2, 1, 0]);
        assert_eq!(copy.len(), 5);
    }
}
