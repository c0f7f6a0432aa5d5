//! The tree container and its balancing engines.
//!
//! Internals manipulate raw `NonNull` links behind a safe public API. The
//! red-black invariants may be violated while a mutation is in flight but
//! hold again before every public method returns.

use core::cmp::Ordering;
use core::ops::ControlFlow;
use core::ptr::NonNull;

use crate::node::{is_red, parent_link, side_of, single_child, successor};
use crate::node::{Color, Link, Node, Side};
use crate::TreeError;

/// An ordered set of payloads, balanced as a red-black tree.
///
/// Ordering comes from the caller-supplied comparator, which must be a
/// total order consistent across calls. The disposer receives every
/// payload that entered the tree exactly once, either on removal or on
/// teardown; it defaults to an ordinary drop.
pub struct RbTree<T, C, D = fn(T)>
where
    C: Fn(&T, &T) -> Ordering,
    D: FnMut(T),
{
    root: Link<T>,
    len: usize,
    compare: C,
    dispose: D,
}

// The raw node links suppress the auto impls. The tree is the sole owner
// of its nodes, so transferring or sharing it reduces to the payload and
// the two closures.
unsafe impl<T, C, D> Send for RbTree<T, C, D>
where
    T: Send,
    C: Send + Fn(&T, &T) -> Ordering,
    D: Send + FnMut(T),
{
}

unsafe impl<T, C, D> Sync for RbTree<T, C, D>
where
    T: Sync,
    C: Sync + Fn(&T, &T) -> Ordering,
    D: Sync + FnMut(T),
{
}

impl<T, C> RbTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Creates an empty tree whose payloads are torn down by ordinary
    /// drop.
    pub fn new(compare: C) -> Self {
        Self::with_disposer(compare, core::mem::drop as fn(T))
    }
}

impl<T, C, D> RbTree<T, C, D>
where
    C: Fn(&T, &T) -> Ordering,
    D: FnMut(T),
{
    /// Creates an empty tree with an explicit payload disposer.
    pub fn with_disposer(compare: C, dispose: D) -> Self {
        Self {
            root: None,
            len: 0,
            compare,
            dispose,
        }
    }

    /// Number of payloads currently in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts a payload.
    ///
    /// Fails with [`TreeError::Duplicate`] if a comparator-equal payload
    /// is already present; the rejected value is dropped without going
    /// through the disposer, since it never entered the tree.
    pub fn insert(&mut self, value: T) -> Result<(), TreeError> {
        let mut dest: Option<(NonNull<Node<T>>, Side)> = None;
        let mut cur = self.root;
        while let Some(node) = cur {
            match (self.compare)(&value, unsafe { &(*node.as_ptr()).value }) {
                Ordering::Equal => return Err(TreeError::Duplicate),
                Ordering::Less => {
                    dest = Some((node, Side::Left));
                    cur = unsafe { (*node.as_ptr()).left };
                }
                Ordering::Greater => {
                    dest = Some((node, Side::Right));
                    cur = unsafe { (*node.as_ptr()).right };
                }
            }
        }
        let node = Node::alloc(value);
        unsafe {
            self.connect(dest, Some(node));
            let color = self.update_colors(node);
            (*node.as_ptr()).color = color;
        }
        self.len += 1;
        Ok(())
    }

    /// Removes the payload comparing equal to `value` and hands it to the
    /// disposer.
    ///
    /// Fails with [`TreeError::NotFound`] if no payload matches; the tree
    /// is left untouched in that case.
    pub fn remove(&mut self, value: &T) -> Result<(), TreeError> {
        let node = self.find(value).ok_or(TreeError::NotFound)?;
        unsafe {
            self.remove_node(node);
        }
        self.len -= 1;
        Ok(())
    }

    /// Whether a payload comparing equal to `value` is present.
    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// Visits every payload in ascending comparator order.
    ///
    /// Returns `true` if the walk visited everything (an empty tree counts
    /// as a complete walk) and `false` if the callback broke it off early.
    /// The walk is iterative; tree depth never hits the call stack.
    pub fn for_each<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(&T) -> ControlFlow<()>,
    {
        let mut stack: Vec<NonNull<Node<T>>> = Vec::new();
        let mut cur = self.root;
        loop {
            while let Some(node) = cur {
                stack.push(node);
                cur = unsafe { (*node.as_ptr()).left };
            }
            let node = match stack.pop() {
                None => return true,
                Some(node) => node,
            };
            if visit(unsafe { &(*node.as_ptr()).value }).is_break() {
                return false;
            }
            cur = unsafe { (*node.as_ptr()).right };
        }
    }

    /// Disposes every payload and frees every node, leaving the tree
    /// empty. The walk is iterative; teardown of a deep tree cannot
    /// overflow the call stack.
    pub fn clear(&mut self) {
        let mut stack: Vec<NonNull<Node<T>>> = Vec::new();
        if let Some(root) = self.root.take() {
            stack.push(root);
        }
        while let Some(node) = stack.pop() {
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            if let Some(left) = node.left {
                stack.push(left);
            }
            if let Some(right) = node.right {
                stack.push(right);
            }
            (self.dispose)(node.value);
        }
        self.len = 0;
    }

    /// Binary-search descent to the matching node.
    fn find(&self, value: &T) -> Link<T> {
        let mut cur = self.root;
        while let Some(node) = cur {
            match (self.compare)(value, unsafe { &(*node.as_ptr()).value }) {
                Ordering::Equal => return Some(node),
                Ordering::Less => cur = unsafe { (*node.as_ptr()).left },
                Ordering::Greater => cur = unsafe { (*node.as_ptr()).right },
            }
        }
        None
    }

    /// Sets the downward link described by `dest` (`None` meaning the root
    /// slot) and the child's parent back-reference. Pure link mutation.
    ///
    /// # Safety
    /// All referenced nodes must be live nodes of this tree.
    unsafe fn connect(&mut self, dest: Option<(NonNull<Node<T>>, Side)>, child: Link<T>) {
        match dest {
            None => self.root = child,
            Some((parent, Side::Left)) => (*parent.as_ptr()).left = child,
            Some((parent, Side::Right)) => (*parent.as_ptr()).right = child,
        }
        if let Some(child) = child {
            (*child.as_ptr()).parent = dest.map(|(parent, _)| parent);
        }
    }

    /// Single rotation promoting `child` above `parent`, preserving the
    /// in-order sequence. The grandparent (or the root slot) is relinked
    /// to `child`; the subtree rotated out of `child` moves under
    /// `parent`.
    ///
    /// # Safety
    /// `child` must be a direct child of `parent`; both must be live nodes
    /// of this tree.
    unsafe fn rotate(&mut self, child: NonNull<Node<T>>, parent: NonNull<Node<T>>) {
        let child_side = side_of(child).expect("rotation child has a parent");
        self.connect(parent_link(parent), Some(child));
        match child_side {
            Side::Left => {
                self.connect(Some((parent, Side::Left)), (*child.as_ptr()).right);
                self.connect(Some((child, Side::Right)), Some(parent));
            }
            Side::Right => {
                self.connect(Some((parent, Side::Right)), (*child.as_ptr()).left);
                self.connect(Some((child, Side::Left)), Some(parent));
            }
        }
    }

    /// Swaps the structural positions and colors of a node and one of its
    /// descendants. Payloads stay in their nodes; only links and colors
    /// move, so no payload is ever bitwise-copied.
    ///
    /// # Safety
    /// `low` must be a proper descendant of `high`; both must be live
    /// nodes of this tree.
    unsafe fn swap_places(&mut self, high: NonNull<Node<T>>, low: NonNull<Node<T>>) {
        let high_dest = parent_link(high);
        let high_left = (*high.as_ptr()).left;
        let high_right = (*high.as_ptr()).right;
        let high_color = (*high.as_ptr()).color;
        let low_parent = (*low.as_ptr()).parent;
        let low_side = side_of(low).expect("descendant has a parent");

        // low's children (if any) come up under high's new position
        self.connect(Some((high, Side::Left)), (*low.as_ptr()).left);
        self.connect(Some((high, Side::Right)), (*low.as_ptr()).right);
        if low_parent == Some(high) {
            // low was high's direct child: one of high's old links points
            // back at low itself and must not be reattached
            self.connect(Some((low, low_side)), Some(high));
            match low_side {
                Side::Left => self.connect(Some((low, Side::Right)), high_right),
                Side::Right => self.connect(Some((low, Side::Left)), high_left),
            }
        } else {
            let low_parent = low_parent.expect("descendant has a parent");
            self.connect(Some((low_parent, low_side)), Some(high));
            self.connect(Some((low, Side::Right)), high_right);
            self.connect(Some((low, Side::Left)), high_left);
        }
        self.connect(high_dest, Some(low));

        (*high.as_ptr()).color = (*low.as_ptr()).color;
        (*low.as_ptr()).color = high_color;
    }

    /// Bottom-up insertion fix-up. Returns the color `node` must take;
    /// colors of every other affected node are assigned in place.
    ///
    /// # Safety
    /// `node` must be a live node of this tree, freshly linked in or
    /// standing in for one during recursion.
    unsafe fn update_colors(&mut self, node: NonNull<Node<T>>) -> Color {
        let parent = match (*node.as_ptr()).parent {
            // reached the root
            None => return Color::Black,
            Some(parent) => parent,
        };
        if (*parent.as_ptr()).color == Color::Black {
            // no violation, the node may stay red
            return Color::Red;
        }
        // A red parent is never the root, so the grandparent exists.
        let gparent = (*parent.as_ptr())
            .parent
            .expect("red node is never the root");
        let parent_side = side_of(parent).expect("non-root node has a side");
        let uncle = (*gparent.as_ptr()).child(parent_side.opposite());
        match uncle {
            Some(uncle) if (*uncle.as_ptr()).color == Color::Red => {
                // push the violation two levels up
                (*parent.as_ptr()).color = Color::Black;
                (*uncle.as_ptr()).color = Color::Black;
                let color = self.update_colors(gparent);
                (*gparent.as_ptr()).color = color;
                Color::Red
            }
            _ => self.fix_black_uncle(gparent, parent, node, parent_side),
        }
    }

    /// Rotation case of the insertion fix-up: the uncle is black or
    /// absent. Resolves the red-red violation locally.
    ///
    /// # Safety
    /// Same as [`Self::update_colors`]; `parent` must be red with `node`
    /// as its child and `gparent` above it on `parent_side`.
    unsafe fn fix_black_uncle(
        &mut self,
        gparent: NonNull<Node<T>>,
        parent: NonNull<Node<T>>,
        node: NonNull<Node<T>>,
        parent_side: Side,
    ) -> Color {
        let mut top = parent;
        if side_of(node) != Some(parent_side) {
            // zig-zag: straighten the node above its parent first
            self.rotate(node, parent);
            top = node;
        }
        self.rotate(top, gparent);
        (*top.as_ptr()).color = Color::Black;
        (*gparent.as_ptr()).color = Color::Red;
        if node == top {
            Color::Black
        } else {
            Color::Red
        }
    }

    /// Unlinks `node`, rebalances, and disposes its payload.
    ///
    /// # Safety
    /// `node` must be a live node of this tree.
    unsafe fn remove_node(&mut self, node: NonNull<Node<T>>) {
        // Stage 1: reduce to a node with at most one child. A single
        // child is swapped directly (it is a red leaf, so the node ends
        // up a leaf); with two children the in-order successor takes the
        // node's place and may leave it one right child.
        if let Some(child) = single_child(node) {
            self.swap_places(node, child);
        } else if (*node.as_ptr()).left.is_some() && (*node.as_ptr()).right.is_some() {
            let succ = successor(node);
            self.swap_places(node, succ);
        }

        // Stage 2 + 3: splice out and restore the black-height.
        let dest = parent_link(node);
        if (*node.as_ptr()).color == Color::Red {
            // red nodes do not count toward the black-height
            self.connect(dest, None);
        } else {
            let child = single_child(node);
            self.connect(dest, child);
            match child {
                Some(child) if (*child.as_ptr()).color == Color::Red => {
                    // the red replacement absorbs the missing black unit
                    (*child.as_ptr()).color = Color::Black;
                }
                _ => self.solve_db(dest),
            }
        }

        let node = Box::from_raw(node.as_ptr());
        (self.dispose)(node.value);
    }

    /// Resolves a double-black deficiency at the child slot described by
    /// `at` (`None` once the deficiency has been pushed past the root,
    /// where it is absorbed).
    ///
    /// # Safety
    /// `at`, if present, must name a live parent node of this tree whose
    /// child slot on the given side is short one black node.
    unsafe fn solve_db(&mut self, at: Option<(NonNull<Node<T>>, Side)>) {
        let (parent, side) = match at {
            None => return,
            Some(at) => at,
        };
        // The deficient path was one black short, so the sibling subtree
        // is non-empty.
        let sibling = (*parent.as_ptr())
            .child(side.opposite())
            .expect("double-black slot has a sibling");

        if (*sibling.as_ptr()).color == Color::Red {
            // make the sibling black, then retry at the same slot
            (*sibling.as_ptr()).color = Color::Black;
            (*parent.as_ptr()).color = Color::Red;
            self.rotate(sibling, parent);
            return self.solve_db(Some((parent, side)));
        }

        let close = (*sibling.as_ptr()).child(side);
        let far = (*sibling.as_ptr()).child(side.opposite());
        if !is_red(close) && !is_red(far) {
            // borrow the sibling's black unit
            (*sibling.as_ptr()).color = Color::Red;
            if (*parent.as_ptr()).color == Color::Red {
                (*parent.as_ptr()).color = Color::Black;
            } else {
                // the whole subtree is now one black short
                self.solve_db(parent_link(parent));
            }
            return;
        }

        let mut sibling = sibling;
        if let Some(close) = close {
            if (*close.as_ptr()).color == Color::Red {
                // pre-rotation normalizing into the far-nephew case
                (*close.as_ptr()).color = Color::Black;
                (*sibling.as_ptr()).color = Color::Red;
                self.rotate(close, sibling);
                sibling = close;
            }
        }

        let far = (*sibling.as_ptr())
            .child(side.opposite())
            .expect("far nephew is red after normalization");
        let parent_color = (*parent.as_ptr()).color;
        (*parent.as_ptr()).color = (*sibling.as_ptr()).color;
        (*sibling.as_ptr()).color = parent_color;
        (*far.as_ptr()).color = Color::Black;
        self.rotate(sibling, parent);
    }
}

impl<T, C, D> Drop for RbTree<T, C, D>
where
    C: Fn(&T, &T) -> Ordering,
    D: FnMut(T),
{
    fn drop(&mut self) {
        self.clear();
    }
}
