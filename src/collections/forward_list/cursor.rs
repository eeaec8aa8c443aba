use core::fmt;
use core::ptr::NonNull;

use super::{ForwardList, ForwardListError, ForwardListNode, ForwardListResult, Link};

/// where a cursor sits: on the sentinel, on an element, or one past the last
/// element
pub(super) enum Position<T> {
    BeforeBegin,
    Node(NonNull<ForwardListNode<T>>),
    End,
}

impl<T> Position<T> {
    /// the position a link points at
    pub(super) fn from_link(link: Link<T>) -> Self {
        link.map_or(Self::End, Self::Node)
    }

    fn is_before_begin(&self) -> bool {
        matches!(self, Self::BeforeBegin)
    }

    fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    /// the position following this one. `head` is the list's sentinel link.
    /// the end position is terminal
    fn next(self, head: Link<T>) -> Self {
        match self {
            Self::BeforeBegin => Self::from_link(head),
            // SAFETY: cursors only hold nodes of the list they borrow
            Self::Node(node) => Self::from_link(unsafe { (*node.as_ptr()).next }),
            Self::End => Self::End,
        }
    }
}

impl<T> Clone for Position<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Position<T> {}

impl<T> PartialEq for Position<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::BeforeBegin, Self::BeforeBegin) | (Self::End, Self::End) => true,
            (Self::Node(a), Self::Node(b)) => a == b,
            _ => false,
        }
    }
}

/// a read-only position in a `ForwardList`. cursors compare equal when they
/// sit on the same node of the same list, regardless of the values involved
pub struct ForwardListCursor<'a, T> {
    list: &'a ForwardList<T>,
    position: Position<T>,
}

impl<'a, T> ForwardListCursor<'a, T> {
    pub(super) fn new(list: &'a ForwardList<T>, position: Position<T>) -> Self {
        Self { list, position }
    }

    /// get the data of the current node, or None on the sentinel or the end
    pub fn current(&self) -> Option<&'a T> {
        match self.position {
            // SAFETY: the node belongs to `self.list`, borrowed for 'a
            Position::Node(node) => Some(unsafe { &(*node.as_ptr()).data }),
            Position::BeforeBegin | Position::End => None,
        }
    }

    /// get the data of the node after the current one, if there is one
    pub fn peek_next(&self) -> Option<&'a T> {
        let mut next = *self;
        next.move_next();
        next.current()
    }

    /// move the cursor forward one element. a cursor at the end stays there
    pub fn move_next(&mut self) {
        self.position = self.position.next(self.list.head);
    }

    /// returns true if the cursor is on the sentinel
    pub fn is_before_begin(&self) -> bool {
        self.position.is_before_begin()
    }

    /// returns true if the cursor is one past the last element
    pub fn is_end(&self) -> bool {
        self.position.is_end()
    }
}

impl<'a, T> Clone for ForwardListCursor<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for ForwardListCursor<'a, T> {}

impl<'a, 'b, T> PartialEq<ForwardListCursor<'b, T>> for ForwardListCursor<'a, T> {
    fn eq(&self, other: &ForwardListCursor<'b, T>) -> bool {
        core::ptr::eq(self.list, other.list) && self.position == other.position
    }
}

impl<'a, T> Eq for ForwardListCursor<'a, T> {}

impl<'a, 'b, T> PartialEq<ForwardListCursorMut<'b, T>> for ForwardListCursor<'a, T> {
    fn eq(&self, other: &ForwardListCursorMut<'b, T>) -> bool {
        core::ptr::eq(self.list, &*other.list) && self.position == other.position
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for ForwardListCursor<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Position::BeforeBegin => f.write_str("ForwardListCursor(BeforeBegin)"),
            Position::Node(_) => f
                .debug_tuple("ForwardListCursor")
                .field(&self.current())
                .finish(),
            Position::End => f.write_str("ForwardListCursor(End)"),
        }
    }
}

/// a mutable position in a `ForwardList`, able to insert and remove the node
/// after the one it sits on. it starts on the sentinel, so the first
/// `insert_after` places a new front element
pub struct ForwardListCursorMut<'a, T> {
    list: &'a mut ForwardList<T>,
    position: Position<T>,
}

impl<'a, T> ForwardListCursorMut<'a, T> {
    pub(super) fn new(list: &'a mut ForwardList<T>) -> Self {
        Self {
            list,
            position: Position::BeforeBegin,
        }
    }

    /// get the data of the current node, or None on the sentinel or the end
    pub fn current(&mut self) -> Option<&mut T> {
        match self.position {
            // SAFETY: the node belongs to `self.list`, which we borrow mutably
            Position::Node(node) => Some(unsafe { &mut (*node.as_ptr()).data }),
            Position::BeforeBegin | Position::End => None,
        }
    }

    /// get the data of the node after the current one, if there is one
    pub fn peek_next(&mut self) -> Option<&mut T> {
        match self.position.next(self.list.head) {
            // SAFETY: as in `current`
            Position::Node(node) => Some(unsafe { &mut (*node.as_ptr()).data }),
            Position::BeforeBegin | Position::End => None,
        }
    }

    /// move the cursor forward one element. a cursor at the end stays there
    pub fn move_next(&mut self) {
        self.position = self.position.next(self.list.head);
    }

    /// returns true if the cursor is on the sentinel
    pub fn is_before_begin(&self) -> bool {
        self.position.is_before_begin()
    }

    /// returns true if the cursor is one past the last element
    pub fn is_end(&self) -> bool {
        self.position.is_end()
    }

    /// a read-only cursor at the same position
    pub fn as_cursor(&self) -> ForwardListCursor<'_, T> {
        ForwardListCursor::new(self.list, self.position)
    }

    /// insert `value` after the current node, increasing the size of the list
    /// by 1. the cursor does not move; the new node is the one `move_next`
    /// lands on.
    ///
    /// # Panics
    /// if the cursor is at the end, which has no node to insert after
    pub fn insert_after(&mut self, value: T) {
        let Some(link) = self.link_mut() else {
            panic!("cannot insert after the end of a ForwardList");
        };
        let node = ForwardListNode::alloc(value, *link);
        *link = Some(node);
        self.list.len += 1;
    }

    /// like `insert_after`, but allocation failure and inserting after the
    /// end are reported as errors. on error the list is untouched and `value`
    /// is dropped
    pub fn try_insert_after(&mut self, value: T) -> ForwardListResult<()> {
        let link = self.link_mut().ok_or(ForwardListError::InsertAfterEnd)?;
        let node = ForwardListNode::try_alloc(value, *link)?;
        *link = Some(node);
        self.list.len += 1;
        Ok(())
    }

    /// remove the node after the current one, returning its value. the cursor
    /// does not move; its next node becomes the one that followed the removed
    /// node. returns None if nothing follows the cursor
    pub fn remove_after(&mut self) -> Option<T> {
        let link = self.link_mut()?;
        let node = (*link)?;
        // SAFETY: `node` is owned by `link` and is unlinked before it is freed
        unsafe {
            *link = (*node.as_ptr()).next;
            self.list.len -= 1;
            Some(ForwardListNode::free(node))
        }
    }

    /// move onto the last element, or stay on the sentinel of an empty list
    pub(super) fn seek_back(&mut self) {
        loop {
            let next = self.position.next(self.list.head);
            if next.is_end() {
                return;
            }
            self.position = next;
        }
    }

    /// the link owned by the current position, None at the end
    fn link_mut(&mut self) -> Option<&mut Link<T>> {
        match self.position {
            Position::BeforeBegin => Some(&mut self.list.head),
            // SAFETY: the node belongs to `self.list`, which we borrow mutably
            Position::Node(node) => Some(unsafe { &mut (*node.as_ptr()).next }),
            Position::End => None,
        }
    }
}

impl<'a, 'b, T> PartialEq<ForwardListCursor<'b, T>> for ForwardListCursorMut<'a, T> {
    fn eq(&self, other: &ForwardListCursor<'b, T>) -> bool {
        other == self
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for ForwardListCursorMut<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_cursor(), f)
    }
}

#[cfg(all(test, not(feature = "no-std")))]
mod cursor_tests {
    use super::*;

    fn collect(list: &ForwardList<u32>) -> Vec<u32> {
        list.iter().copied().collect()
    }

    #[test]
    fn cursor_on_empty_list_never_returns_data() {
        let mut ll: ForwardList<u32> = ForwardList::new();
        let mut cursor = ll.cursor_mut();
        assert!(cursor.is_before_begin());
        for _ in 0..100 {
            assert!(cursor.current().is_none());
            assert!(cursor.peek_next().is_none());
            cursor.move_next();
        }
        assert!(cursor.is_end());
    }

    #[test]
    fn before_begin_begin_and_end_are_distinct_positions() {
        let ll = ForwardList::from([1u32]);
        assert!(ll.before_begin() != ll.begin());
        assert!(ll.begin() != ll.end());
        assert!(ll.before_begin() != ll.end());
        assert!(ll.before_begin().is_before_begin());
        assert!(ll.end().is_end());
        assert_eq!(ll.before_begin().current(), None);
        assert_eq!(ll.end().current(), None);
        assert_eq!(ll.begin().current(), Some(&1));
    }

    #[test]
    fn begin_equals_end_on_empty_list() {
        let ll: ForwardList<u32> = ForwardList::new();
        assert_eq!(ll.begin(), ll.end());
        assert!(ll.before_begin() != ll.end());
    }

    #[test]
    fn cursors_are_compared_by_node_not_value() {
        let ll = ForwardList::from([7u32, 7]);
        let first = ll.begin();
        let mut second = ll.begin();
        second.move_next();
        assert_eq!(first.current(), second.current());
        assert!(first != second);

        let mut again = ll.before_begin();
        again.move_next();
        assert_eq!(again, first);
    }

    #[test]
    fn cursors_of_different_lists_are_not_equal() {
        let a: ForwardList<u32> = ForwardList::new();
        let b: ForwardList<u32> = ForwardList::new();
        assert!(a.before_begin() != b.before_begin());
        assert!(a.end() != b.end());
    }

    #[test]
    fn read_only_cursor_walks_all_elements() {
        let ll = ForwardList::from([42u32, 73, 119]);
        let mut cursor = ll.before_begin();
        let mut seen = Vec::new();
        cursor.move_next();
        while cursor != ll.end() {
            seen.push(*cursor.current().expect("not at the end"));
            cursor.move_next();
        }
        assert_eq!(seen, vec![42, 73, 119]);

        // moving past the end stays at the end
        cursor.move_next();
        assert!(cursor.is_end());
    }

    #[test]
    fn begin_restarts_at_the_first_element() {
        let ll = ForwardList::from([1u32, 2]);
        let mut cursor = ll.begin();
        cursor.move_next();
        cursor.move_next();
        assert!(cursor.is_end());
        assert_eq!(ll.begin().current(), Some(&1));
    }

    #[test]
    fn peek_next_looks_one_ahead() {
        let ll = ForwardList::from([1u32, 2]);
        assert_eq!(ll.before_begin().peek_next(), Some(&1));
        assert_eq!(ll.begin().peek_next(), Some(&2));
        assert_eq!(ll.end().peek_next(), None);
    }

    #[test]
    fn mutable_cursor_equals_read_only_cursor_at_same_node() {
        let mut ll = ForwardList::from([1u32, 2, 3]);
        let mut cursor = ll.cursor_mut();
        let start = cursor.as_cursor();
        assert!(cursor == start);
        assert!(start == cursor);

        let mut ahead = cursor.as_cursor();
        ahead.move_next();
        assert!(cursor != ahead);
        cursor.move_next();
        assert!(cursor == cursor.as_cursor());
        assert_eq!(cursor.as_cursor().current(), Some(&1));
    }

    #[test]
    fn cursor_can_mutate_elements() {
        let mut ll = ForwardList::from([42u32, 73]);
        let mut cursor = ll.cursor_mut();

        // cursors start at the sentinel
        cursor.move_next();
        *cursor.current().unwrap() += 1;
        *cursor.peek_next().unwrap() += 1;
        cursor.move_next();
        *cursor.current().unwrap() += 1;

        assert_eq!(collect(&ll), vec![43, 75]);
    }

    #[test]
    fn insert_after_sentinel_inserts_at_front() {
        let mut ll = ForwardList::from([2u32, 1]);
        let mut cursor = ll.cursor_mut();
        cursor.insert_after(3);

        // validate we're still on the sentinel
        assert!(cursor.is_before_begin());
        assert_eq!(cursor.peek_next(), Some(&mut 3));
        assert_eq!(collect(&ll), vec![3, 2, 1]);
        assert_eq!(ll.front(), Some(&3));
    }

    #[test]
    fn insert_after_then_move_next_lands_on_new_node() {
        let mut ll = ForwardList::from([1u32, 3]);
        let mut cursor = ll.cursor_mut();
        cursor.move_next();
        cursor.insert_after(2);
        cursor.move_next();
        assert_eq!(cursor.current(), Some(&mut 2));
        cursor.move_next();
        assert_eq!(cursor.current(), Some(&mut 3));
        cursor.move_next();
        assert!(cursor.is_end());

        assert_eq!(collect(&ll), vec![1, 2, 3]);
        assert_eq!(ll.len(), 3);
    }

    #[test]
    fn insert_after_last_element_appends() {
        let mut ll = ForwardList::from([1u32]);
        let mut cursor = ll.cursor_mut();
        cursor.move_next();
        cursor.insert_after(2);
        assert_eq!(collect(&ll), vec![1, 2]);
    }

    #[test]
    fn insert_after_then_remove_after_restores_list() {
        let mut ll = ForwardList::from([1u32, 2, 3]);
        let mut cursor = ll.cursor_mut();
        cursor.move_next();
        cursor.insert_after(99);
        assert_eq!(cursor.remove_after(), Some(99));
        assert_eq!(collect(&ll), vec![1, 2, 3]);
        assert_eq!(ll.len(), 3);
    }

    #[test]
    fn remove_after_relinks_following_node() {
        let mut ll = ForwardList::from([42u32, 73, 119]);
        let prev_len = ll.len();
        let mut cursor = ll.cursor_mut();
        cursor.move_next();

        assert_eq!(cursor.remove_after(), Some(73));
        // validate the cursor didn't move and its next is what followed
        assert_eq!(cursor.current(), Some(&mut 42));
        assert_eq!(cursor.peek_next(), Some(&mut 119));

        assert_eq!(prev_len - 1, ll.len());
        assert_eq!(collect(&ll), vec![42, 119]);
    }

    #[test]
    fn remove_after_with_nothing_following_returns_none() {
        let mut ll = ForwardList::from([1u32]);
        let mut cursor = ll.cursor_mut();
        cursor.move_next();
        assert_eq!(cursor.remove_after(), None);
        cursor.move_next();
        assert!(cursor.is_end());
        assert_eq!(cursor.remove_after(), None);
        assert_eq!(ll.len(), 1);

        let mut empty: ForwardList<u32> = ForwardList::new();
        assert_eq!(empty.cursor_mut().remove_after(), None);
    }

    #[test]
    #[should_panic(expected = "cannot insert after the end of a ForwardList")]
    fn insert_after_end_panics() {
        let mut ll: ForwardList<u32> = ForwardList::new();
        let mut cursor = ll.cursor_mut();
        cursor.move_next();
        assert!(cursor.is_end());
        cursor.insert_after(1);
    }

    #[test]
    fn try_insert_after_end_is_an_error() {
        let mut ll = ForwardList::from([1u32]);
        let mut cursor = ll.cursor_mut();
        cursor.move_next();
        cursor.move_next();
        assert_eq!(
            cursor.try_insert_after(2),
            Err(ForwardListError::InsertAfterEnd)
        );
        assert_eq!(collect(&ll), vec![1]);
        assert_eq!(ll.len(), 1);
    }

    #[test]
    fn tail_cursor_builds_a_sequence_in_order() {
        let mut ll = ForwardList::new();
        let mut tail = ll.cursor_mut();
        for i in 0..5u32 {
            tail.try_insert_after(i).expect("failed to insert");
            tail.move_next();
        }
        assert_eq!(collect(&ll), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn seek_back_stops_on_last_element() {
        let mut ll = ForwardList::from([1u32, 2, 3]);
        let mut cursor = ll.cursor_mut();
        cursor.seek_back();
        assert_eq!(cursor.current(), Some(&mut 3));

        let mut empty: ForwardList<u32> = ForwardList::new();
        let mut cursor = empty.cursor_mut();
        cursor.seek_back();
        assert!(cursor.is_before_begin());
    }

    #[test]
    fn debug_shows_position() {
        let mut ll = ForwardList::from([5u32]);
        assert_eq!(format!("{:?}", ll.before_begin()), "ForwardListCursor(BeforeBegin)");
        assert_eq!(format!("{:?}", ll.begin()), "ForwardListCursor(Some(5))");
        assert_eq!(format!("{:?}", ll.end()), "ForwardListCursor(End)");
        assert_eq!(format!("{:?}", ll.cursor_mut()), "ForwardListCursor(BeforeBegin)");
    }
}

#[cfg(all(not(miri), test, not(feature = "no-std")))]
mod proptests {
    use std::collections::VecDeque;

    use proptest::collection::vec;
    use proptest::prelude::*;
    use proptest_derive::Arbitrary;
    use rand::Rng;

    use super::*;

    #[derive(Arbitrary, Debug)]
    enum Operation {
        PushFront(u32),
        PopFront,
        InsertAfter(u32),
        RemoveAfter,
        Iterate,
    }

    /// pick a random offset from the sentinel, in 0..=len
    fn random_offset(len: usize) -> usize {
        rand::thread_rng().gen_range(0..=len)
    }

    fn cursor_at<T>(list: &mut ForwardList<T>, offset: usize) -> ForwardListCursorMut<'_, T> {
        let mut cursor = list.cursor_mut();
        for _ in 0..offset {
            cursor.move_next();
        }
        cursor
    }

    proptest! {
        #[test]
        fn cursor_operations_match_reference(ops in vec(any::<Operation>(), 256)) {
            let mut reference = VecDeque::new();
            let mut list = ForwardList::new();

            for op in ops.iter() {
                match op {
                    Operation::PushFront(i) => {
                        reference.push_front(*i);
                        list.push_front(*i);
                    }
                    Operation::PopFront => {
                        prop_assert_eq!(list.pop_front(), reference.pop_front());
                    }
                    Operation::InsertAfter(i) => {
                        let offset = random_offset(reference.len());
                        reference.insert(offset, *i);
                        let mut cursor = cursor_at(&mut list, offset);
                        cursor.insert_after(*i);
                        cursor.move_next();
                        prop_assert_eq!(cursor.current().copied(), Some(*i));
                    }
                    Operation::RemoveAfter => {
                        let offset = random_offset(reference.len());
                        let expected = reference.remove(offset);
                        let mut cursor = cursor_at(&mut list, offset);
                        prop_assert_eq!(cursor.remove_after(), expected);
                    }
                    Operation::Iterate => {
                        prop_assert!(list.iter().eq(reference.iter()));
                        let mut cursor = list.begin();
                        for expected in reference.iter() {
                            prop_assert_eq!(cursor.current(), Some(expected));
                            cursor.move_next();
                        }
                        prop_assert!(cursor == list.end());
                    }
                }
                prop_assert_eq!(list.len(), reference.len());
            }
        }
    }
}
