//! Node representation and node-level queries.
//!
//! Children are owning links (every node except the root is owned by its
//! parent and freed through `Box::from_raw` exactly once); the parent link
//! is a non-owning back-reference used for rotation and fix-up.

use core::ptr::NonNull;

use static_assertions::assert_eq_size;

/// Node color.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Color {
    Red = 0,
    Black = 1,
}

/// Which child slot of a parent a node occupies.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// An optional edge to a node.
pub(crate) type Link<T> = Option<NonNull<Node<T>>>;

/// A tree node holding one payload.
pub(crate) struct Node<T> {
    pub value: T,
    pub color: Color,
    pub parent: Link<T>,
    pub left: Link<T>,
    pub right: Link<T>,
}

assert_eq_size!(Color, u8);
// Link relies on the NonNull niche: an absent edge costs no extra word.
assert_eq_size!(Link<()>, *mut Node<()>);

impl<T> Node<T> {
    /// Heap-allocates a detached node. The color is provisional; the
    /// insertion fix-up assigns the real one.
    pub fn alloc(value: T) -> NonNull<Node<T>> {
        let node = Box::new(Node {
            value,
            color: Color::Black,
            parent: None,
            left: None,
            right: None,
        });
        // Box never returns null.
        unsafe { NonNull::new_unchecked(Box::into_raw(node)) }
    }

    /// Child link on the given side.
    pub fn child(&self, side: Side) -> Link<T> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Returns the node's parent together with the side the node occupies
/// under it, or `None` for the root.
///
/// # Safety
/// `node` and its parent link must point to live nodes of the same tree.
pub(crate) unsafe fn parent_link<T>(node: NonNull<Node<T>>) -> Option<(NonNull<Node<T>>, Side)> {
    let parent = (*node.as_ptr()).parent?;
    if (*parent.as_ptr()).left == Some(node) {
        Some((parent, Side::Left))
    } else {
        Some((parent, Side::Right))
    }
}

/// The side of the node under its parent, or `None` for the root.
///
/// # Safety
/// Same as [`parent_link`].
pub(crate) unsafe fn side_of<T>(node: NonNull<Node<T>>) -> Option<Side> {
    parent_link(node).map(|(_, side)| side)
}

/// The one child of `node` if exactly one of its children is present.
///
/// # Safety
/// `node` must point to a live node.
pub(crate) unsafe fn single_child<T>(node: NonNull<Node<T>>) -> Link<T> {
    match ((*node.as_ptr()).left, (*node.as_ptr()).right) {
        (Some(child), None) | (None, Some(child)) => Some(child),
        _ => None,
    }
}

/// In-order successor of a node that has a right child: the leftmost node
/// of its right subtree.
///
/// # Safety
/// `node` must point to a live node with a right child.
pub(crate) unsafe fn successor<T>(node: NonNull<Node<T>>) -> NonNull<Node<T>> {
    let mut cur = (*node.as_ptr())
        .right
        .expect("successor is only defined for nodes with a right child");
    while let Some(left) = (*cur.as_ptr()).left {
        cur = left;
    }
    cur
}

/// Whether a link refers to a red node. Absent links count as black.
///
/// # Safety
/// A present link must point to a live node.
pub(crate) unsafe fn is_red<T>(link: Link<T>) -> bool {
    matches!(link, Some(node) if (*node.as_ptr()).color == Color::Red)
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn free<T>(node: NonNull<Node<T>>) {
        drop(Box::from_raw(node.as_ptr()));
    }

    #[test]
    fn test_side_queries() {
        unsafe {
            let parent = Node::alloc(10);
            let left = Node::alloc(5);
            let right = Node::alloc(15);
            (*parent.as_ptr()).left = Some(left);
            (*parent.as_ptr()).right = Some(right);
            (*left.as_ptr()).parent = Some(parent);
            (*right.as_ptr()).parent = Some(parent);

            assert_eq!(side_of(parent), None);
            assert_eq!(side_of(left), Some(Side::Left));
            assert_eq!(side_of(right), Some(Side::Right));
            assert_eq!(parent_link(left), Some((parent, Side::Left)));

            free(left);
            free(right);
            free(parent);
        }
    }

    #[test]
    fn test_single_child() {
        unsafe {
            let parent = Node::alloc(10);
            assert_eq!(single_child(parent), None);

            let left = Node::alloc(5);
            (*parent.as_ptr()).left = Some(left);
            assert_eq!(single_child(parent), Some(left));

            let right = Node::alloc(15);
            (*parent.as_ptr()).right = Some(right);
            assert_eq!(single_child(parent), None);

            free(left);
            free(right);
            free(parent);
        }
    }

    #[test]
    fn test_successor_is_leftmost_of_right_subtree() {
        unsafe {
            let root = Node::alloc(10);
            let right = Node::alloc(20);
            let right_left = Node::alloc(15);
            (*root.as_ptr()).right = Some(right);
            (*right.as_ptr()).parent = Some(root);
            (*right.as_ptr()).left = Some(right_left);
            (*right_left.as_ptr()).parent = Some(right);

            assert_eq!(successor(root), right_left);

            free(right_left);
            free(right);
            free(root);
        }
    }

    #[test]
    fn test_absent_links_are_black() {
        unsafe {
            assert!(!is_red::<i32>(None));
            let node = Node::alloc(1);
            (*node.as_ptr()).color = Color::Red;
            assert!(is_red(Some(node)));
            (*node.as_ptr()).color = Color::Black;
            assert!(!is_red(Some(node)));
            free(node);
        }
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }
}
