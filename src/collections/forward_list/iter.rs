use core::iter::FusedIterator;
use core::marker::PhantomData;

use super::{ForwardList, ForwardListNode, Link};

pub struct ForwardListIter<'a, T> {
    curr: Link<T>,
    remaining: usize,
    _ll: PhantomData<&'a ForwardListNode<T>>,
}

impl<'a, T> ForwardListIter<'a, T> {
    pub(super) fn new(head: Link<T>, len: usize) -> Self {
        Self {
            curr: head,
            remaining: len,
            _ll: PhantomData,
        }
    }
}

impl<'a, T> Iterator for ForwardListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.curr.map(|node| {
            // SAFETY: the list is borrowed for 'a, so every node reachable
            // from the head stays alive and unmodified
            let node = unsafe { &*node.as_ptr() };
            self.curr = node.next;
            self.remaining -= 1;
            &node.data
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for ForwardListIter<'a, T> {}

impl<'a, T> FusedIterator for ForwardListIter<'a, T> {}

impl<'a, T> Clone for ForwardListIter<'a, T> {
    fn clone(&self) -> Self {
        Self {
            curr: self.curr,
            remaining: self.remaining,
            _ll: PhantomData,
        }
    }
}

pub struct ForwardListIterMut<'a, T> {
    curr: Link<T>,
    remaining: usize,
    _ll: PhantomData<&'a mut ForwardListNode<T>>,
}

impl<'a, T> ForwardListIterMut<'a, T> {
    pub(super) fn new(head: Link<T>, len: usize) -> Self {
        Self {
            curr: head,
            remaining: len,
            _ll: PhantomData,
        }
    }
}

impl<'a, T> Iterator for ForwardListIterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        self.curr.map(|node| {
            // SAFETY: the list is mutably borrowed for 'a and each node is
            // yielded at most once
            let node = unsafe { &mut *node.as_ptr() };
            self.curr = node.next;
            self.remaining -= 1;
            &mut node.data
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for ForwardListIterMut<'a, T> {}

impl<'a, T> FusedIterator for ForwardListIterMut<'a, T> {}

/// an owning iterator, popping values off the front of the list
pub struct ForwardListIntoIter<T> {
    ll: ForwardList<T>,
}

impl<T> ForwardListIntoIter<T> {
    pub(super) fn new(ll: ForwardList<T>) -> Self {
        Self { ll }
    }
}

impl<T> Iterator for ForwardListIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.ll.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.ll.len(), Some(self.ll.len()))
    }
}

impl<T> ExactSizeIterator for ForwardListIntoIter<T> {}

impl<T> FusedIterator for ForwardListIntoIter<T> {}

// SAFETY: the iterators hand out references exactly like `&ForwardList` and
// `&mut ForwardList` would
unsafe impl<'a, T: Sync> Send for ForwardListIter<'a, T> {}
unsafe impl<'a, T: Sync> Sync for ForwardListIter<'a, T> {}
unsafe impl<'a, T: Send> Send for ForwardListIterMut<'a, T> {}
unsafe impl<'a, T: Sync> Sync for ForwardListIterMut<'a, T> {}
