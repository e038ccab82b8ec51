use super::handle::Handle;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Which child of a node, or which way a node moves during a rotation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

// Color and the three links. The sentinel is nothing but this.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Links {
    pub(crate) color: Color,
    pub(crate) parent: Handle,
    pub(crate) left: Handle,
    pub(crate) right: Handle,
}

impl Links {
    /// The canonical sentinel: black, every link pointing back at itself.
    pub(crate) const SENTINEL: Self = Self {
        color: Color::Black,
        parent: Handle::NIL,
        left: Handle::NIL,
        right: Handle::NIL,
    };

    /// A freshly inserted node: red, childless, hung below `parent`.
    pub(crate) const fn new_red(parent: Handle) -> Self {
        Self {
            color: Color::Red,
            parent,
            left: Handle::NIL,
            right: Handle::NIL,
        }
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Handle {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Handle) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    #[inline]
    pub(crate) const fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }
}

/// A tree node. The value lives in a separate arena; `value` addresses it.
#[derive(Clone)]
pub(crate) struct Node<K> {
    pub(crate) links: Links,
    pub(crate) key: K,
    pub(crate) value: Handle,
}

impl<K> Node<K> {
    pub(crate) const fn new(parent: Handle, key: K, value: Handle) -> Self {
        Self {
            links: Links::new_red(parent),
            key,
            value,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_black_and_self_linked() {
        let nil = Links::SENTINEL;
        assert!(!nil.is_red());
        assert!(nil.parent.is_nil());
        assert!(nil.child(Side::Left).is_nil());
        assert!(nil.child(Side::Right).is_nil());
    }

    #[test]
    fn new_node_is_red_leaf() {
        let parent = Handle::from_index(3);
        let node = Node::new(parent, "k", Handle::from_index(0));
        assert!(node.links.is_red());
        assert_eq!(node.links.parent, parent);
        assert!(node.links.left.is_nil() && node.links.right.is_nil());
    }

    #[test]
    fn set_child_follows_side() {
        let mut links = Links::SENTINEL;
        let a = Handle::from_index(1);
        let b = Handle::from_index(2);
        links.set_child(Side::Left, a);
        links.set_child(Side::Right.opposite().opposite(), b);
        assert_eq!(links.child(Side::Left), a);
        assert_eq!(links.child(Side::Right), b);
    }
}
