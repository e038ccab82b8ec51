use core::borrow::Borrow;
use core::cmp::Ordering;
use core::mem;

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Links, Node, Side};
use crate::error::{self, Error, InvariantViolation};

/// Traversal stack. Red-black height stays under `2 * log2(n + 1)`, so this
/// rarely spills.
type Stack<T> = SmallVec<[T; 64]>;

/// The red-black tree backing `RBTreeMap`.
pub(crate) struct RawRBTreeMap<K, V> {
    /// Arena storing all tree nodes (color, links, key, value handle).
    nodes: Arena<Node<K>>,
    /// Arena storing all values, addressed by each node's value handle.
    values: Arena<V>,
    /// Root node, or `Handle::NIL` when empty.
    root: Handle,
    /// This map's sentinel, addressed as `Handle::NIL`.
    nil: Links,
    /// Number of key-value pairs in the tree.
    len: usize,
}

impl<K, V> RawRBTreeMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: Handle::NIL,
            nil: Links::SENTINEL,
            len: 0,
        }
    }

    /// Creates a new tree with room for `capacity` entries.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            values: Arena::with_capacity(capacity),
            root: Handle::NIL,
            nil: Links::SENTINEL,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity().min(self.values.capacity())
    }

    /// Reserves room for `additional` more entries in both arenas. Fails without
    /// allocating if the entries would not fit in the handle space.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> error::Result<()> {
        if additional > Handle::MAX - self.len {
            return Err(Error::CapacityExceeded { limit: Handle::MAX });
        }
        self.nodes.try_reserve(additional)?;
        self.values.try_reserve(additional)?;
        Ok(())
    }

    /// Drops every entry and returns the tree to its freshly created state.
    pub(crate) fn clear(&mut self) {
        debug!(len = self.len, "clearing red-black tree");
        self.nodes.clear();
        self.values.clear();
        self.root = Handle::NIL;
        self.nil = Links::SENTINEL;
        self.len = 0;
    }

    /// Number of nodes on the longest root-to-node path.
    pub(crate) fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Stack<(Handle, usize)> = SmallVec::new();
        if !self.root.is_nil() {
            stack.push((self.root, 1));
        }
        while let Some((handle, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let links = self.links(handle);
            for child in [links.left, links.right] {
                if !child.is_nil() {
                    stack.push((child, depth + 1));
                }
            }
        }
        deepest
    }

    /// Visits every entry in ascending key order.
    pub(crate) fn for_each<'a>(&'a self, mut f: impl FnMut(&'a K, &'a V)) {
        let mut stack: Stack<Handle> = SmallVec::new();
        let mut current = self.root;
        loop {
            while !current.is_nil() {
                stack.push(current);
                current = self.links(current).left;
            }
            let Some(handle) = stack.pop() else {
                return;
            };
            let node = self.nodes.get(handle);
            f(&node.key, self.values.get(node.value));
            current = node.links.right;
        }
    }

    #[inline]
    fn links(&self, handle: Handle) -> &Links {
        if handle.is_nil() {
            &self.nil
        } else {
            &self.nodes.get(handle).links
        }
    }

    #[inline]
    fn links_mut(&mut self, handle: Handle) -> &mut Links {
        if handle.is_nil() {
            &mut self.nil
        } else {
            &mut self.nodes.get_mut(handle).links
        }
    }

    #[inline]
    fn is_red(&self, handle: Handle) -> bool {
        self.links(handle).is_red()
    }

    #[inline]
    fn set_color(&mut self, handle: Handle, color: Color) {
        self.links_mut(handle).color = color;
    }

    /// The side of `parent` on which `child` hangs.
    #[inline]
    fn side_of(&self, parent: Handle, child: Handle) -> Side {
        if self.links(parent).left == child {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Leftmost node of the subtree rooted at `handle`.
    fn minimum(&self, mut handle: Handle) -> Handle {
        loop {
            let left = self.links(handle).left;
            if left.is_nil() {
                return handle;
            }
            handle = left;
        }
    }

    /// Moves `node` down toward `side`; its child on the opposite side takes its place.
    /// `rotate(x, Side::Left)` is a left rotation. Colors are left alone.
    fn rotate(&mut self, node: Handle, side: Side) {
        let up = self.links(node).child(side.opposite());
        debug_assert!(!up.is_nil(), "`RawRBTreeMap::rotate()` - no child to promote!");

        let inner = self.links(up).child(side);
        self.links_mut(node).set_child(side.opposite(), inner);
        if !inner.is_nil() {
            self.links_mut(inner).parent = node;
        }

        let parent = self.links(node).parent;
        self.links_mut(up).parent = parent;
        if parent.is_nil() {
            trace!(?side, "rotating at the root");
            self.root = up;
        } else {
            let parent_side = self.side_of(parent, node);
            self.links_mut(parent).set_child(parent_side, up);
        }

        self.links_mut(up).set_child(side, node);
        self.links_mut(node).parent = up;
    }

    /// Puts `new` where `old` hangs. `new` may be the sentinel, whose parent is then
    /// written and must be reset by the caller.
    fn transplant(&mut self, old: Handle, new: Handle) {
        let parent = self.links(old).parent;
        if parent.is_nil() {
            self.root = new;
        } else {
            let side = self.side_of(parent, old);
            self.links_mut(parent).set_child(side, new);
        }
        self.links_mut(new).parent = parent;
    }

    fn insert_fixup(&mut self, mut node: Handle) {
        while self.is_red(self.links(node).parent) {
            let parent = self.links(node).parent;
            // A red parent is never the root, so the grandparent is a real node.
            let grandparent = self.links(parent).parent;
            let side = self.side_of(grandparent, parent);
            let uncle = self.links(grandparent).child(side.opposite());

            if self.is_red(uncle) {
                trace!("insert fixup: red uncle");
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            if self.links(parent).child(side.opposite()) == node {
                trace!("insert fixup: inner grandchild");
                node = parent;
                self.rotate(node, side);
            }

            trace!("insert fixup: outer grandchild");
            let parent = self.links(node).parent;
            let grandparent = self.links(parent).parent;
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            self.rotate(grandparent, side.opposite());
            break;
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Resolves the missing black on `node` left behind by splicing out a black node.
    fn remove_fixup(&mut self, mut node: Handle) {
        while node != self.root && !self.is_red(node) {
            let parent = self.links(node).parent;
            let side = self.side_of(parent, node);
            let mut sibling = self.links(parent).child(side.opposite());

            if self.is_red(sibling) {
                trace!("remove fixup: red sibling");
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, side);
                sibling = self.links(parent).child(side.opposite());
            }

            let near = self.links(sibling).child(side);
            let far = self.links(sibling).child(side.opposite());
            if !self.is_red(near) && !self.is_red(far) {
                trace!("remove fixup: black nephews");
                self.set_color(sibling, Color::Red);
                node = parent;
                continue;
            }

            if !self.is_red(far) {
                trace!("remove fixup: red near nephew");
                self.set_color(near, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, side.opposite());
                sibling = self.links(parent).child(side.opposite());
            }

            trace!("remove fixup: red far nephew");
            let parent_color = self.links(parent).color;
            self.set_color(sibling, parent_color);
            self.set_color(parent, Color::Black);
            let far = self.links(sibling).child(side.opposite());
            self.set_color(far, Color::Black);
            self.rotate(parent, side);
            node = self.root;
        }
        self.set_color(node, Color::Black);
    }
}

impl<K: Ord, V> RawRBTreeMap<K, V> {
    /// Finds the node holding `key`.
    fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while !current.is_nil() {
            let node = self.nodes.get(current);
            current = match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Some(current),
                Ordering::Less => node.links.left,
                Ordering::Greater => node.links.right,
            };
        }
        None
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.values.get(self.nodes.get(handle).value))
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        let value = self.nodes.get(handle).value;
        Some(self.values.get_mut(value))
    }

    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.nodes.get(self.search(key)?);
        Some((&node.key, self.values.get(node.value)))
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    /// Inserts a key-value pair. On an existing key only the value is replaced, and
    /// the old one is returned; the stored key and the tree shape are untouched.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut parent = Handle::NIL;
        let mut side = Side::Left;
        let mut current = self.root;

        while !current.is_nil() {
            let node = self.nodes.get(current);
            side = match key.cmp(&node.key) {
                Ordering::Equal => {
                    let slot = node.value;
                    return Some(mem::replace(self.values.get_mut(slot), value));
                }
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            parent = current;
            current = node.links.child(side);
        }

        let value = self.values.alloc(value);
        let node = self.nodes.alloc(Node::new(parent, key, value));
        if parent.is_nil() {
            self.root = node;
        } else {
            self.links_mut(parent).set_child(side, node);
        }
        self.len += 1;

        self.insert_fixup(node);
        None
    }

    /// Like [`insert`](Self::insert), but reserves first so that an allocation
    /// failure leaves the tree untouched. Updates never allocate and always succeed.
    pub(crate) fn try_insert(&mut self, key: K, value: V) -> error::Result<Option<V>> {
        if let Some(found) = self.search(&key) {
            let slot = self.nodes.get(found).value;
            return Ok(Some(mem::replace(self.values.get_mut(slot), value)));
        }
        self.try_reserve(1)?;
        Ok(self.insert(key, value))
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let found = self.search(key)?;

        // With a right subtree, trade entries with the in-order successor and
        // remove that node instead. Either way `target` has at most one child.
        let right = self.links(found).right;
        let target = if right.is_nil() {
            found
        } else {
            let successor = self.minimum(right);
            trace!("remove: substituting in-order successor");
            let (a, b) = self.nodes.pair_mut(found, successor);
            mem::swap(&mut a.key, &mut b.key);
            mem::swap(&mut a.value, &mut b.value);
            successor
        };

        let links = *self.links(target);
        let child = if links.left.is_nil() { links.right } else { links.left };
        self.transplant(target, child);
        if links.color == Color::Black {
            self.remove_fixup(child);
        }
        self.nil = Links::SENTINEL;
        self.len -= 1;

        let node = self.nodes.take(target);
        let value = self.values.take(node.value);
        Some((node.key, value))
    }

    /// Checks every red-black property and the bookkeeping around them. Returns
    /// the black-height of the root.
    pub(crate) fn validate(&self) -> Result<usize, InvariantViolation> {
        if self.nil != Links::SENTINEL {
            return Err(InvariantViolation::DirtySentinel);
        }
        if !self.root.is_nil() {
            let root = self.links(self.root);
            if root.is_red() {
                return Err(InvariantViolation::RedRoot);
            }
            if !root.parent.is_nil() {
                return Err(InvariantViolation::RootHasParent);
            }
        }

        let mut reachable = 0;
        let black_height = self.validate_subtree(self.root, None, None, &mut reachable)?;
        if reachable != self.len || self.nodes.len() != self.len || self.values.len() != self.len {
            return Err(InvariantViolation::LengthMismatch {
                recorded: self.len,
                reachable,
            });
        }
        Ok(black_height)
    }

    /// Postorder check of the subtree at `handle`, whose keys must lie strictly
    /// between `lower` and `upper`. Returns its black-height.
    fn validate_subtree(
        &self,
        handle: Handle,
        lower: Option<&K>,
        upper: Option<&K>,
        reachable: &mut usize,
    ) -> Result<usize, InvariantViolation> {
        if handle.is_nil() {
            return Ok(0);
        }

        *reachable += 1;
        if *reachable > self.nodes.len() {
            // More nodes reachable than allocated: the links form a cycle.
            return Err(InvariantViolation::LengthMismatch {
                recorded: self.len,
                reachable: *reachable,
            });
        }

        let node = self.nodes.get(handle);
        let index = handle.to_index();
        if lower.is_some_and(|k| *k >= node.key) || upper.is_some_and(|k| *k <= node.key) {
            return Err(InvariantViolation::KeyOutOfOrder { node: index });
        }

        let links = node.links;
        for child in [links.left, links.right] {
            if !child.is_nil() && self.links(child).parent != handle {
                return Err(InvariantViolation::BrokenParentLink { node: child.to_index() });
            }
        }
        if links.is_red() && (self.is_red(links.left) || self.is_red(links.right)) {
            return Err(InvariantViolation::RedRedLink { node: index });
        }

        let left = self.validate_subtree(links.left, lower, Some(&node.key), reachable)?
            + usize::from(!self.is_red(links.left));
        let right = self.validate_subtree(links.right, Some(&node.key), upper, reachable)?
            + usize::from(!self.is_red(links.right));
        if left != right {
            return Err(InvariantViolation::BlackHeightMismatch { node: index, left, right });
        }
        Ok(left)
    }
}

impl<K: Clone, V: Clone> Clone for RawRBTreeMap<K, V> {
    // Handles are arena indices, so copying both arenas copies the tree.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            values: self.values.clone(),
            root: self.root,
            nil: self.nil,
            len: self.len,
        }
    }
}
