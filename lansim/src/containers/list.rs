use std::fmt::{Debug, Formatter};

use educe::Educe;

use super::{release, Chain, Iter, IterMut, Node};

/// Singly-linked ordered list. Appends walk the chain, there is no random access.
#[derive(Educe)]
#[educe(Default(bound()))]
pub struct List<T> {
    head: Chain<T>,
    len: usize,
}

impl<T> List<T> {
    pub fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub fn push_back(&mut self, value: T) {
        let mut slot = &mut self.head;
        while let Some(node) = slot {
            slot = &mut node.next;
        }
        *slot = Some(Node::boxed(value, None));
        self.len += 1;
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.head.take().map(|node| {
            let Node { value, next } = *node;
            self.head = next;
            self.len -= 1;
            value
        })
    }

    pub fn front(&self) -> Option<&T> {
        self.head.as_deref().map(|node| &node.value)
    }

    pub fn back(&self) -> Option<&T> {
        self.iter().last()
    }

    /// Unlinks the first element matching `predicate` and returns it
    pub fn remove_first<P>(&mut self, mut predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        let mut slot = &mut self.head;
        while slot.as_ref().is_some_and(|node| !predicate(&node.value)) {
            slot = &mut slot.as_mut()?.next;
        }
        let node = slot.take()?;
        let Node { value, next } = *node;
        *slot = next;
        self.len -= 1;
        Some(value)
    }

    pub fn find<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().find(|value| predicate(value))
    }

    pub fn contains<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        self.find(predicate).is_some()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.head, self.len)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            next: self.head.as_deref_mut(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn clear(&mut self) {
        release(&mut self.head);
        self.len = 0;
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        release(&mut self.head);
    }
}

impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let mut slot = &mut self.head;
        while let Some(node) = slot {
            slot = &mut node.next;
        }
        for value in iter {
            let node = slot.insert(Node::boxed(value, None));
            slot = &mut node.next;
            self.len += 1;
        }
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = List::new();
        list.extend(iter);
        list
    }
}

impl<T: Clone> Clone for List<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for List<T> {}

impl<T: Debug> Debug for List<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator, drains the list from the front
pub struct IntoIter<T>(List<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.pop_front()
    }
}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_append_order() {
        let mut list = List::new();
        list.push_back("a");
        list.push_back("b");
        list.push_back("c");
        assert_eq!(list.len(), 3);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(list.front(), Some(&"a"));
        assert_eq!(list.back(), Some(&"c"));
    }

    #[test]
    fn remove_first_unlinks_only_one_match() {
        let mut list: List<i32> = [1, 2, 3, 2].into_iter().collect();
        assert_eq!(list.remove_first(|x| *x == 2), Some(2));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 3, 2]);

        // head and tail removal
        assert_eq!(list.remove_first(|x| *x == 1), Some(1));
        assert_eq!(list.remove_first(|x| *x == 2), Some(2));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), [3]);

        assert_eq!(list.remove_first(|x| *x == 42), None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn extend_appends_after_existing_nodes() {
        let mut list: List<i32> = [1, 2].into_iter().collect();
        list.extend([3, 4]);
        assert_eq!(list.len(), 4);
        assert_eq!(list.clone().into_iter().collect::<Vec<_>>(), [1, 2, 3, 4]);
        assert_eq!(list, [1, 2, 3, 4].into_iter().collect());
    }

    #[test]
    fn iter_mut_edits_in_place() {
        let mut list: List<String> = ["r1", "s1"].iter().map(|x| x.to_string()).collect();
        for name in list.iter_mut() {
            name.make_ascii_uppercase();
        }
        assert!(list.contains(|x| x == "R1"));
        assert!(!list.contains(|x| x == "r1"));
    }

    #[test]
    fn long_chains_drop_without_recursion() {
        let list: List<u32> = (0..200_000).collect();
        assert_eq!(list.len(), 200_000);
        drop(list);
    }
}
