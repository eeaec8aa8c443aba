use core::alloc::Layout;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ptr::NonNull;

cfg_if::cfg_if! {
    if #[cfg(feature = "no-std")] {
        use alloc::boxed::Box;
    } else {
        use std::boxed::Box;
    }
}

mod cursor;
mod iter;

use cursor::Position;
pub use cursor::{ForwardListCursor, ForwardListCursorMut};
pub use iter::{ForwardListIntoIter, ForwardListIter, ForwardListIterMut};

pub type ForwardListResult<T> = Result<T, ForwardListError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardListError {
    /// the global allocator could not provide memory for a node
    AllocFailed { layout: Layout },
    /// a value was inserted after the end position, which has no link to
    /// hang a node from
    InsertAfterEnd,
}

impl fmt::Display for ForwardListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocFailed { layout } => write!(
                f,
                "failed to allocate a list node of {} bytes (align {})",
                layout.size(),
                layout.align()
            ),
            Self::InsertAfterEnd => f.write_str("cannot insert after the end of a ForwardList"),
        }
    }
}

#[cfg(not(feature = "no-std"))]
impl std::error::Error for ForwardListError {}

/// a link to the next node, `None` terminates the chain
type Link<T> = Option<NonNull<ForwardListNode<T>>>;

/// a heap allocated element of the list. every node is owned by exactly one
/// link: either the list's sentinel link or the `next` of its predecessor
struct ForwardListNode<T> {
    next: Link<T>,
    data: T,
}

impl<T> ForwardListNode<T> {
    /// allocate a node holding `data` that points at `next`. the node is fully
    /// written before it is returned so callers can link it without any
    /// further chance of failure
    fn try_alloc(data: T, next: Link<T>) -> ForwardListResult<NonNull<Self>> {
        let layout = Layout::new::<Self>();
        // SAFETY: a node always contains a link, so the layout is never
        // zero-sized
        let ptr = unsafe { alloc::alloc::alloc(layout) } as *mut Self;
        match NonNull::new(ptr) {
            Some(node) => {
                // SAFETY: `node` is freshly allocated with the layout of Self
                unsafe { node.as_ptr().write(Self { next, data }) };
                Ok(node)
            }
            None => {
                log::warn!(
                    "ForwardList node allocation of {} bytes failed",
                    layout.size()
                );
                Err(ForwardListError::AllocFailed { layout })
            }
        }
    }

    /// allocate a node, aborting through the global alloc error handler on
    /// failure the way the standard collections do
    fn alloc(data: T, next: Link<T>) -> NonNull<Self> {
        match Self::try_alloc(data, next) {
            Ok(node) => node,
            Err(_) => alloc::alloc::handle_alloc_error(Layout::new::<Self>()),
        }
    }

    /// release a node that has already been unlinked, returning its data
    ///
    /// # Safety
    /// `node` must come from `alloc`/`try_alloc` and no link may still point
    /// to it
    unsafe fn free(node: NonNull<Self>) -> T {
        // memory from the global allocator with `Layout::new::<Self>()` is
        // valid to hand to Box
        let node = Box::from_raw(node.as_ptr());
        node.data
    }
}

/// an owning, singly-linked list. the list keeps a sentinel link in front of
/// the first element so that inserting or removing at the front is the same
/// operation as inserting or removing after any element
pub struct ForwardList<T> {
    /// the sentinel's link, pointing at the first element
    head: Link<T>,
    /// the number of non-sentinel elements in the list
    len: usize,
    marker: PhantomData<Box<ForwardListNode<T>>>,
}

impl<T> ForwardList<T> {
    /// create a new, empty list
    pub const fn new() -> Self {
        Self {
            head: None,
            len: 0,
            marker: PhantomData,
        }
    }

    /// get the length of the list, not including the sentinel
    pub fn len(&self) -> usize {
        self.len
    }

    /// returns true if the length of the list is 0
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// borrow the first element, or None if the list is empty
    pub fn front(&self) -> Option<&T> {
        // SAFETY: the head node is owned by this list and outlives the borrow
        self.head.map(|node| unsafe { &(*node.as_ptr()).data })
    }

    /// mutably borrow the first element, or None if the list is empty
    pub fn front_mut(&mut self) -> Option<&mut T> {
        // SAFETY: the head node is owned by this list, which we borrow mutably
        self.head.map(|node| unsafe { &mut (*node.as_ptr()).data })
    }

    /// push a value to the front of this list
    pub fn push_front(&mut self, value: T) {
        self.head = Some(ForwardListNode::alloc(value, self.head));
        self.len += 1;
    }

    /// push a value to the front of this list, reporting allocation failure
    /// instead of aborting. on failure the list is untouched and `value` is
    /// dropped
    pub fn try_push_front(&mut self, value: T) -> ForwardListResult<()> {
        let node = ForwardListNode::try_alloc(value, self.head)?;
        self.head = Some(node);
        self.len += 1;
        Ok(())
    }

    /// pop the first value off this list. if the list is empty, None is
    /// returned
    pub fn pop_front(&mut self) -> Option<T> {
        self.head.map(|node| {
            // SAFETY: `node` is the head of this list; it is unlinked before
            // it is freed
            unsafe {
                self.head = (*node.as_ptr()).next;
                self.len -= 1;
                ForwardListNode::free(node)
            }
        })
    }

    /// drop every element, leaving an empty list
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    /// exchange the contents of two lists in constant time. no node is
    /// touched, only the sentinel links and lengths trade places
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.head, &mut other.head);
        core::mem::swap(&mut self.len, &mut other.len);
    }

    /// returns true if any element equals `value`
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|elt| elt == value)
    }

    /// return an immutable iterator for this list
    pub fn iter(&self) -> ForwardListIter<'_, T> {
        ForwardListIter::new(self.head, self.len)
    }

    /// return a mutable iterator for this list
    pub fn iter_mut(&mut self) -> ForwardListIterMut<'_, T> {
        ForwardListIterMut::new(self.head, self.len)
    }

    /// a read-only cursor on the sentinel, the position before the first
    /// element. it holds no value but is a valid anchor for inserting at
    /// the front
    pub fn before_begin(&self) -> ForwardListCursor<'_, T> {
        ForwardListCursor::new(self, Position::BeforeBegin)
    }

    /// a read-only cursor on the first element, equal to `end()` when the
    /// list is empty
    pub fn begin(&self) -> ForwardListCursor<'_, T> {
        ForwardListCursor::new(self, Position::from_link(self.head))
    }

    /// a read-only cursor one past the last element
    pub fn end(&self) -> ForwardListCursor<'_, T> {
        ForwardListCursor::new(self, Position::End)
    }

    /// return a mutable cursor for this list, starting on the sentinel
    pub fn cursor_mut(&mut self) -> ForwardListCursorMut<'_, T> {
        ForwardListCursorMut::new(self)
    }

    /// build a new list by inserting every value after the previous one,
    /// stopping at the first allocation failure. the partial list is dropped
    /// on failure, so nothing outside this function observes it
    fn try_build<I>(values: I) -> ForwardListResult<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut tmp = Self::new();
        let mut tail = tmp.cursor_mut();
        for value in values {
            tail.try_insert_after(value)?;
            tail.move_next();
        }
        Ok(tmp)
    }
}

impl<T: Clone> ForwardList<T> {
    /// clone this list, reporting allocation failure instead of aborting
    pub fn try_clone(&self) -> ForwardListResult<Self> {
        Self::try_build(self.iter().cloned())
    }

    /// replace the contents of this list with a copy of `source`. the copy is
    /// built on the side and swapped in, so on failure `self` keeps its
    /// previous contents
    pub fn try_clone_from(&mut self, source: &Self) -> ForwardListResult<()> {
        let mut tmp = source.try_clone()?;
        self.swap(&mut tmp);
        Ok(())
    }

    /// build a list holding copies of `values` in order
    pub fn try_from_slice(values: &[T]) -> ForwardListResult<Self> {
        Self::try_build(values.iter().cloned())
    }
}

/// exchange the contents of two lists in constant time
pub fn swap<T>(lhs: &mut ForwardList<T>, rhs: &mut ForwardList<T>) {
    lhs.swap(rhs);
}

impl<T> Drop for ForwardList<T> {
    fn drop(&mut self) {
        // iterative, a recursive drop of the chain could overflow the stack
        self.clear();
    }
}

impl<T> Default for ForwardList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for ForwardList<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }

    fn clone_from(&mut self, source: &Self) {
        // the old contents are only released once the copy is in place
        let mut tmp = source.clone();
        self.swap(&mut tmp);
    }
}

impl<T> FromIterator<T> for ForwardList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for ForwardList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let mut tail = self.cursor_mut();
        tail.seek_back();
        for value in iter {
            tail.insert_after(value);
            tail.move_next();
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for ForwardList<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, const N: usize> From<[T; N]> for ForwardList<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Clone> From<&[T]> for ForwardList<T> {
    fn from(values: &[T]) -> Self {
        values.iter().cloned().collect()
    }
}

impl<T> IntoIterator for ForwardList<T> {
    type Item = T;
    type IntoIter = ForwardListIntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        ForwardListIntoIter::new(self)
    }
}

impl<'a, T> IntoIterator for &'a ForwardList<T> {
    type Item = &'a T;
    type IntoIter = ForwardListIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut ForwardList<T> {
    type Item = &'a mut T;
    type IntoIter = ForwardListIterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: PartialEq> PartialEq for ForwardList<T> {
    fn eq(&self, other: &Self) -> bool {
        // a list is always equal to itself, without comparing elements
        if core::ptr::eq(self, other) {
            return true;
        }
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for ForwardList<T> {}

impl<T: PartialOrd> PartialOrd for ForwardList<T> {
    /// lexicographic: the first mismatching element decides, and a strict
    /// prefix orders before the longer list
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for ForwardList<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash> Hash for ForwardList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        for elt in self {
            elt.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ForwardList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

// SAFETY: the list exclusively owns its nodes, like a Box chain would
unsafe impl<T: Send> Send for ForwardList<T> {}
unsafe impl<T: Sync> Sync for ForwardList<T> {}


// proptest doesn't run under miri with default config
#[cfg(all(not(miri), test, not(feature = "no-std")))]
mod proptests {
    use std::collections::VecDeque;

    use proptest::collection::vec;
    use proptest::prelude::*;
    use proptest::test_runner::Config;
    use proptest_state_machine::{ReferenceStateMachine, StateMachineTest};

    use super::*;

    proptest_state_machine::prop_state_machine! {
        #![proptest_config(Config {
            // no regression file is captured for the state machine
            failure_persistence: None,
            .. Config::default()
        })]

        #[test]
        fn forward_list_state_machine_test(
            sequential
            1..300
            =>
            ForwardList<u32>
        );
    }

    /// the possible transitions of the state machine. offsets count from the
    /// sentinel: 0 is the sentinel itself, n is the n-th element
    #[derive(Clone, Debug)]
    pub enum Transition {
        PushFront(u32),
        PopFront,
        InsertAfter(usize, u32),
        RemoveAfter(usize),
        Clear,
        CloneFrom,
    }

    pub struct ForwardListStateMachine;

    impl ReferenceStateMachine for ForwardListStateMachine {
        type State = VecDeque<u32>;
        type Transition = Transition;

        fn init_state() -> BoxedStrategy<Self::State> {
            Just(VecDeque::new()).boxed()
        }

        fn transitions(state: &Self::State) -> BoxedStrategy<Self::Transition> {
            let len = state.len();
            if len == 0 {
                prop_oneof![
                    1 => Just(Transition::PopFront),
                    2 => any::<u32>().prop_map(Transition::PushFront),
                    2 => any::<u32>().prop_map(|value| Transition::InsertAfter(0, value)),
                ]
                .boxed()
            } else {
                prop_oneof![
                    2 => Just(Transition::PopFront),
                    3 => any::<u32>().prop_map(Transition::PushFront),
                    3 => (0..=len, any::<u32>())
                        .prop_map(|(offset, value)| Transition::InsertAfter(offset, value)),
                    2 => (0..len).prop_map(Transition::RemoveAfter),
                    1 => Just(Transition::CloneFrom),
                    1 => Just(Transition::Clear),
                ]
                .boxed()
            }
        }

        fn preconditions(state: &Self::State, transition: &Self::Transition) -> bool {
            match transition {
                Transition::InsertAfter(offset, _) => *offset <= state.len(),
                Transition::RemoveAfter(offset) => *offset < state.len(),
                _ => true,
            }
        }

        fn apply(mut state: Self::State, transition: &Self::Transition) -> Self::State {
            match transition {
                Transition::PushFront(value) => state.push_front(*value),
                Transition::PopFront => {
                    state.pop_front();
                }
                Transition::InsertAfter(offset, value) => state.insert(*offset, *value),
                Transition::RemoveAfter(offset) => {
                    state.remove(*offset);
                }
                Transition::Clear => state.clear(),
                Transition::CloneFrom => {}
            }
            state
        }
    }

    impl StateMachineTest for ForwardList<u32> {
        type SystemUnderTest = Self;
        type Reference = ForwardListStateMachine;

        fn init_test(
            _ref_state: &<Self::Reference as ReferenceStateMachine>::State,
        ) -> Self::SystemUnderTest {
            Self::new()
        }

        fn apply(
            mut state: Self::SystemUnderTest,
            _ref_state: &<Self::Reference as ReferenceStateMachine>::State,
            transition: Transition,
        ) -> Self::SystemUnderTest {
            match transition {
                Transition::PushFront(value) => state.push_front(value),
                Transition::PopFront => {
                    state.pop_front();
                }
                Transition::InsertAfter(offset, value) => {
                    let mut cursor = state.cursor_mut();
                    for _ in 0..offset {
                        cursor.move_next();
                    }
                    cursor.insert_after(value);
                }
                Transition::RemoveAfter(offset) => {
                    let mut cursor = state.cursor_mut();
                    for _ in 0..offset {
                        cursor.move_next();
                    }
                    assert!(cursor.remove_after().is_some());
                }
                Transition::Clear => state.clear(),
                Transition::CloneFrom => {
                    let copy = state.clone();
                    state.clone_from(&copy);
                }
            }
            state
        }

        fn check_invariants(
            state: &Self::SystemUnderTest,
            ref_state: &<Self::Reference as ReferenceStateMachine>::State,
        ) {
            assert_eq!(state.len(), ref_state.len());
            assert_eq!(state.is_empty(), ref_state.is_empty());
            // the chain ends after exactly `len` links
            assert_eq!(state.iter().count(), state.len());
            assert!(state.iter().eq(ref_state.iter()));
        }
    }

    proptest! {
        #[test]
        fn iterating_yields_the_source_sequence(values in vec(any::<u32>(), 0..64)) {
            let ll: ForwardList<u32> = values.iter().copied().collect();
            prop_assert_eq!(ll.len(), values.len());
            prop_assert_eq!(ll.iter().copied().collect::<Vec<_>>(), values);
        }

        #[test]
        fn comparisons_match_sequence_comparisons(
            a in vec(0u8..4, 0..6),
            b in vec(0u8..4, 0..6),
        ) {
            let la = ForwardList::from(&a[..]);
            let lb = ForwardList::from(&b[..]);
            prop_assert_eq!(la == lb, a == b);
            prop_assert_eq!(la < lb, a < b);
            prop_assert_eq!(la.cmp(&lb), a.cmp(&b));

            // exactly one of <, >, == holds
            let relations = [la < lb, lb < la, la == lb];
            prop_assert_eq!(relations.iter().filter(|r| **r).count(), 1);

            prop_assert_eq!(la <= lb, !(lb < la));
            prop_assert_eq!(la > lb, !(la <= lb));
            prop_assert_eq!(la >= lb, !(la < lb));
        }

        #[test]
        fn push_then_pop_is_identity(values in vec(any::<u32>(), 0..32), value in any::<u32>()) {
            let mut ll = ForwardList::from(&values[..]);
            ll.push_front(value);
            prop_assert_eq!(ll.pop_front(), Some(value));
            prop_assert_eq!(ll.len(), values.len());
            prop_assert!(ll.iter().eq(values.iter()));
        }

        #[test]
        fn insert_then_remove_is_identity(
            values in vec(any::<u32>(), 0..32),
            offset in any::<prop::sample::Index>(),
            value in any::<u32>(),
        ) {
            let mut ll = ForwardList::from(&values[..]);
            let offset = offset.index(values.len() + 1);
            let mut cursor = ll.cursor_mut();
            for _ in 0..offset {
                cursor.move_next();
            }
            cursor.insert_after(value);
            prop_assert_eq!(cursor.remove_after(), Some(value));
            prop_assert_eq!(ll.len(), values.len());
            prop_assert!(ll.iter().eq(values.iter()));
        }

        #[test]
        fn mutating_a_clone_leaves_the_original_alone(
            values in vec(any::<u32>(), 1..32),
            value in any::<u32>(),
        ) {
            let original = ForwardList::from(&values[..]);
            let mut copy = original.clone();
            copy.push_front(value);
            copy.cursor_mut().insert_after(value);
            copy.pop_front();
            for elt in copy.iter_mut() {
                *elt = elt.wrapping_add(1);
            }
            copy.clear();
            prop_assert_eq!(original.len(), values.len());
            prop_assert!(original.iter().eq(values.iter()));
        }

        #[test]
        fn swap_exchanges_sequences(
            a in vec(any::<u32>(), 0..16),
            b in vec(any::<u32>(), 0..16),
        ) {
            let mut la = ForwardList::from(&a[..]);
            let mut lb = ForwardList::from(&b[..]);
            la.swap(&mut lb);
            prop_assert!(la.iter().eq(b.iter()));
            prop_assert!(lb.iter().eq(a.iter()));
            prop_assert_eq!(la.len(), b.len());
            prop_assert_eq!(lb.len(), a.len());
        }
    }
}
