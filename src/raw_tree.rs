//! RawTree: arena-backed red-black tree augmented with subtree counts.
//!
//! Nodes own their children through `Option<NodeKey>` handles into a
//! `SlotMap`; there are no parent links. Both insert and delete are single
//! top-down passes that keep the chain of ancestors in an explicit `path`
//! vector.
//!
//! Count bookkeeping during a pass: every node on `path` carries a
//! provisional adjustment (+1 on insert, -1 on delete) and every other node
//! holds its exact count. `rotate_up` recomputes counts from children, which
//! preserves that rule as long as the path is patched to match the new shape.
//! An aborted pass undoes the adjustment on exactly the nodes left on `path`.
//!
//! Ordering is supplied per call (a comparator closure or a range
//! classifier); the tree itself stores none.

use core::cmp::Ordering;
use core::mem;
use core::ops::Not;

use slotmap::{new_key_type, SlotMap};

use crate::policy::{DuplicatePolicy, Insertion};
use crate::range::RangeClassifier;

new_key_type! {
    pub(crate) struct NodeKey;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Dir {
    Left,
    Right,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    item: T,
    left: Option<NodeKey>,
    right: Option<NodeKey>,
    color: Color,
    count: usize,
}

impl<T> Node<T> {
    fn leaf(item: T) -> Self {
        Self {
            item,
            left: None,
            right: None,
            color: Color::Red,
            count: 1,
        }
    }

    #[inline]
    fn child(&self, dir: Dir) -> Option<NodeKey> {
        match dir {
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Option<NodeKey>) {
        match dir {
            Dir::Left => self.left = child,
            Dir::Right => self.right = child,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct RawTree<T> {
    nodes: SlotMap<NodeKey, Node<T>>,
    root: Option<NodeKey>,
}

impl<T> RawTree<T> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.count_of(self.root)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes = SlotMap::with_key();
        self.root = None;
    }

    #[inline]
    fn count_of(&self, key: Option<NodeKey>) -> usize {
        key.map_or(0, |k| self.nodes[k].count)
    }

    #[inline]
    fn is_red(&self, key: Option<NodeKey>) -> bool {
        key.is_some_and(|k| self.nodes[k].color == Color::Red)
    }

    #[inline]
    fn child(&self, key: NodeKey, dir: Dir) -> Option<NodeKey> {
        self.nodes[key].child(dir)
    }

    /// Child link of `parent`, where `None` stands for a virtual head whose
    /// right link is the root.
    #[inline]
    fn link(&self, parent: Option<NodeKey>, dir: Dir) -> Option<NodeKey> {
        match (parent, dir) {
            (Some(p), dir) => self.child(p, dir),
            (None, Dir::Right) => self.root,
            (None, Dir::Left) => None,
        }
    }

    /// Point whichever link of `above` holds `old` at `new` instead.
    fn replace_link(&mut self, above: Option<NodeKey>, old: NodeKey, new: Option<NodeKey>) {
        match above {
            None => self.root = new,
            Some(p) => {
                let node = &mut self.nodes[p];
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    debug_assert_eq!(node.right, Some(old));
                    node.right = new;
                }
            }
        }
    }

    fn recount(&mut self, key: NodeKey) {
        let node = &self.nodes[key];
        let count = 1 + self.count_of(node.left) + self.count_of(node.right);
        self.nodes[key].count = count;
    }

    fn set_color(&mut self, key: Option<NodeKey>, color: Color) {
        if let Some(k) = key {
            self.nodes[k].color = color;
        }
    }

    fn blacken_root(&mut self) {
        self.set_color(self.root, Color::Black);
    }

    /// Rotate `gchild` above its parent `child`, whose own parent is `above`.
    /// Counts of both are recomputed from their new children.
    fn rotate_up(&mut self, above: Option<NodeKey>, child: NodeKey, gchild: NodeKey) {
        self.replace_link(above, child, Some(gchild));
        if self.nodes[child].left == Some(gchild) {
            let inner = self.nodes[gchild].right;
            self.nodes[child].left = inner;
            self.nodes[gchild].right = Some(child);
        } else {
            debug_assert_eq!(self.nodes[child].right, Some(gchild));
            let inner = self.nodes[gchild].left;
            self.nodes[child].right = inner;
            self.nodes[gchild].left = Some(child);
        }
        self.recount(child);
        self.recount(gchild);
    }

    fn rollback(&mut self, path: &[NodeKey], delta: isize) {
        for &k in path {
            let node = &mut self.nodes[k];
            node.count = node.count.wrapping_add_signed(delta);
        }
    }

    /// Insert `item` top-down, splitting 4-nodes on the way.
    pub(crate) fn insert<F>(
        &mut self,
        item: T,
        policy: DuplicatePolicy,
        compare: F,
    ) -> Insertion<'_, T>
    where
        F: Fn(&T, &T) -> Ordering,
    {
        let mut path: Vec<NodeKey> = Vec::new();
        let mut duplicate = None;
        let mut went = Dir::Left;
        let mut current = self.root;

        while let Some(mut node) = current {
            if self.is_red(self.nodes[node].left) && self.is_red(self.nodes[node].right) {
                node = self.insert_split(&mut path, node);
            }

            let dir = match compare(&item, &self.nodes[node].item) {
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
                Ordering::Equal => match policy {
                    DuplicatePolicy::DoNothing => {
                        self.rollback(&path, -1);
                        return Insertion::Duplicate {
                            rejected: item,
                            existing: &self.nodes[node].item,
                        };
                    }
                    DuplicatePolicy::InsertFirst | DuplicatePolicy::ReplaceFirst => {
                        duplicate = Some(node);
                        Dir::Left
                    }
                    DuplicatePolicy::InsertLast | DuplicatePolicy::ReplaceLast => {
                        duplicate = Some(node);
                        Dir::Right
                    }
                },
            };

            self.nodes[node].count += 1;
            path.push(node);
            went = dir;
            current = self.child(node, dir);
        }

        if let Some(found) = duplicate.filter(|_| policy.replaces()) {
            self.rollback(&path, -1);
            let previous = mem::replace(&mut self.nodes[found].item, item);
            return Insertion::Replaced(previous);
        }

        let leaf = self.nodes.insert(Node::leaf(item));
        match path.last() {
            Some(&parent) => self.nodes[parent].set_child(went, Some(leaf)),
            None => self.root = Some(leaf),
        }
        self.insert_split(&mut path, leaf);
        self.blacken_root();
        Insertion::Inserted
    }

    /// Color-flip `node` and, if that leaves two red links in a row, rotate
    /// them away. Returns the node the descent should continue from; `path`
    /// is truncated to that node's ancestors.
    fn insert_split(&mut self, path: &mut Vec<NodeKey>, node: NodeKey) -> NodeKey {
        if Some(node) != self.root {
            self.nodes[node].color = Color::Red;
        }
        self.set_color(self.nodes[node].left, Color::Black);
        self.set_color(self.nodes[node].right, Color::Black);

        let depth = path.len();
        let Some(&parent) = path.last() else {
            return node;
        };
        if !self.is_red(Some(parent)) {
            return node;
        }

        // A red parent is never the root, so a grandparent exists.
        let gparent = path[depth - 2];
        let ggparent = depth.checked_sub(3).map(|i| path[i]);

        let mut top = parent;
        let parent_is_left = self.nodes[gparent].left == Some(parent);
        let node_is_left = self.nodes[parent].left == Some(node);
        if parent_is_left != node_is_left {
            self.rotate_up(Some(gparent), parent, node);
            top = node;
        }

        self.nodes[gparent].color = Color::Red;
        self.rotate_up(ggparent, gparent, top);
        self.nodes[top].color = Color::Black;

        path.truncate(depth - 2);
        top
    }

    /// Remove the first (or last) item the classifier places within range.
    ///
    /// Every step makes the current node red before descending, so the node
    /// finally unlinked is red (or the only node) and black heights survive.
    pub(crate) fn delete<R>(&mut self, range: &R, first: bool) -> Option<T>
    where
        R: RangeClassifier<T> + ?Sized,
    {
        self.root?;

        let mut path: Vec<NodeKey> = Vec::new();
        let mut parent: Option<NodeKey> = None;
        let mut current: Option<NodeKey> = None;
        let mut dir = Dir::Right;
        let mut found = None;

        while let Some(node) = self.link(current, dir) {
            let last = dir;
            let grand = parent;
            parent = current;
            current = Some(node);

            self.nodes[node].count -= 1;
            path.push(node);

            dir = match range.classify(&self.nodes[node].item) {
                Ordering::Less => Dir::Right,
                Ordering::Greater => Dir::Left,
                Ordering::Equal => {
                    found = Some(node);
                    if first {
                        Dir::Left
                    } else {
                        Dir::Right
                    }
                }
            };

            if self.is_red(Some(node)) || self.is_red(self.child(node, dir)) {
                continue;
            }

            if let Some(save) = self.child(node, !dir).filter(|&k| self.is_red(Some(k))) {
                // Red child away from the walk: lift it over `node`.
                self.rotate_up(parent, node, save);
                self.nodes[node].color = Color::Red;
                self.nodes[save].color = Color::Black;
                // Both were recounted exactly; both are now on the path.
                self.nodes[save].count -= 1;
                self.nodes[node].count -= 1;
                path.pop();
                path.push(save);
                path.push(node);
                parent = Some(save);
                continue;
            }

            let Some(p) = parent else { continue };
            let Some(sibling) = self.child(p, !last) else {
                continue;
            };

            let near = self.child(sibling, last);
            let far = self.child(sibling, !last);
            if !self.is_red(near) && !self.is_red(far) {
                self.nodes[p].color = Color::Black;
                self.nodes[sibling].color = Color::Red;
                self.nodes[node].color = Color::Red;
                continue;
            }

            let top = match near.filter(|&k| self.is_red(Some(k))) {
                Some(n) => {
                    self.rotate_up(Some(p), sibling, n);
                    self.rotate_up(grand, p, n);
                    n
                }
                None => {
                    self.rotate_up(grand, p, sibling);
                    sibling
                }
            };
            self.nodes[node].color = Color::Red;
            self.nodes[top].color = Color::Red;
            self.set_color(self.nodes[top].left, Color::Black);
            self.set_color(self.nodes[top].right, Color::Black);
            // `top` now sits between the grandparent and `p`; recounting
            // from `p` already carried the pending decrement up to it.
            path.pop();
            path.pop();
            path.push(top);
            path.push(p);
            path.push(node);
        }

        let (Some(target), Some(victim)) = (found, current) else {
            self.rollback(&path, 1);
            self.blacken_root();
            log::trace!("range delete found nothing; {} counts restored", path.len());
            return None;
        };

        let child = {
            let n = &self.nodes[victim];
            n.left.or(n.right)
        };
        self.replace_link(parent, victim, child);
        let removed = self
            .nodes
            .remove(victim)
            .expect("node on the delete path must be live");
        let item = if target == victim {
            removed.item
        } else {
            mem::replace(&mut self.nodes[target].item, removed.item)
        };
        self.blacken_root();
        Some(item)
    }

    /// First (`first == true`) or last node whose item the classifier places
    /// within range, with its rank.
    pub(crate) fn locate<R>(&self, range: &R, first: bool) -> Option<(usize, NodeKey)>
    where
        R: RangeClassifier<T> + ?Sized,
    {
        let mut node = self.root;
        let mut before = 0;
        let mut found = None;
        while let Some(k) = node {
            let n = &self.nodes[k];
            match range.classify(&n.item) {
                Ordering::Greater => node = n.left,
                Ordering::Less => {
                    before += self.count_of(n.left) + 1;
                    node = n.right;
                }
                Ordering::Equal => {
                    found = Some((before + self.count_of(n.left), k));
                    if first {
                        node = n.left;
                    } else {
                        before += self.count_of(n.left) + 1;
                        node = n.right;
                    }
                }
            }
        }
        found
    }

    pub(crate) fn item(&self, key: NodeKey) -> &T {
        &self.nodes[key].item
    }

    pub(crate) fn item_mut(&mut self, key: NodeKey) -> &mut T {
        &mut self.nodes[key].item
    }

    /// The item of rank `index`, if `index < len`.
    pub(crate) fn get_by_index(&self, mut index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        let mut node = self.root;
        while let Some(k) = node {
            let n = &self.nodes[k];
            let left = self.count_of(n.left);
            match index.cmp(&left) {
                Ordering::Less => node = n.left,
                Ordering::Equal => return Some(&n.item),
                Ordering::Greater => {
                    index -= left + 1;
                    node = n.right;
                }
            }
        }
        None
    }

    /// Number of items within range. Classifies only the nodes along the two
    /// range boundaries; subtrees proven to lie inside contribute their
    /// stored counts.
    pub(crate) fn count_range<R>(&self, range: &R) -> usize
    where
        R: RangeClassifier<T> + ?Sized,
    {
        if range.is_entire() {
            return self.len();
        }
        self.count_under(range, self.root, false, false)
    }

    fn count_under<R>(
        &self,
        range: &R,
        node: Option<NodeKey>,
        below_top: bool,
        above_bottom: bool,
    ) -> usize
    where
        R: RangeClassifier<T> + ?Sized,
    {
        let Some(k) = node else { return 0 };
        let n = &self.nodes[k];
        if below_top && above_bottom {
            return n.count;
        }
        match range.classify(&n.item) {
            Ordering::Equal => {
                1 + self.count_under(range, n.left, true, above_bottom)
                    + self.count_under(range, n.right, below_top, true)
            }
            Ordering::Less => self.count_under(range, n.right, below_top, above_bottom),
            Ordering::Greater => self.count_under(range, n.left, below_top, above_bottom),
        }
    }
}

/// In-order walk over the items a classifier places within range.
///
/// Holds only handles, so it can be driven against a borrowed tree
/// (`RangeIter`) or re-validated between pulls (`RangeCursor`).
#[derive(Clone, Debug)]
pub(crate) struct Traversal {
    stack: Vec<Frame>,
    reversed: bool,
    started: bool,
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    node: NodeKey,
    // Everything in this node's far subtree is known to be inside the far bound.
    far_inside: bool,
}

impl Traversal {
    pub(crate) fn new(reversed: bool) -> Self {
        Self {
            stack: Vec::new(),
            reversed,
            started: false,
        }
    }

    fn near(&self) -> Dir {
        if self.reversed {
            Dir::Right
        } else {
            Dir::Left
        }
    }

    pub(crate) fn next<'a, T, R>(&mut self, tree: &'a RawTree<T>, range: &R) -> Option<&'a T>
    where
        R: RangeClassifier<T> + ?Sized,
    {
        if !self.started {
            self.started = true;
            let whole = range.is_entire();
            self.descend(tree, range, tree.root, whole, whole);
        }
        let frame = self.stack.pop()?;
        let node = &tree.nodes[frame.node];
        self.descend(tree, range, node.child(!self.near()), true, frame.far_inside);
        Some(&node.item)
    }

    /// Walk toward the near end from `current`, stacking in-range nodes.
    fn descend<T, R>(
        &mut self,
        tree: &RawTree<T>,
        range: &R,
        mut current: Option<NodeKey>,
        near_inside: bool,
        mut far_inside: bool,
    ) where
        R: RangeClassifier<T> + ?Sized,
    {
        let near = self.near();
        while let Some(k) = current {
            let node = &tree.nodes[k];
            let position = if near_inside && far_inside {
                Ordering::Equal
            } else if self.reversed {
                range.classify(&node.item).reverse()
            } else {
                range.classify(&node.item)
            };
            match position {
                // Short of the near bound: only the far subtree can qualify.
                Ordering::Less => current = node.child(!near),
                Ordering::Equal => {
                    self.stack.push(Frame {
                        node: k,
                        far_inside,
                    });
                    far_inside = true;
                    current = node.child(near);
                }
                Ordering::Greater => current = node.child(near),
            }
        }
    }
}

#[cfg(test)]
impl<T> RawTree<T> {
    /// Checks coloring, black height and counts; returns the item count.
    pub(crate) fn check_invariants(&self) -> Result<usize, String> {
        if self.is_red(self.root) {
            return Err("root is red".into());
        }
        self.check_under(self.root)?;
        let reachable = self.len();
        if reachable != self.nodes.len() {
            return Err(format!(
                "{} nodes reachable but {} allocated",
                reachable,
                self.nodes.len()
            ));
        }
        Ok(reachable)
    }

    fn check_under(&self, node: Option<NodeKey>) -> Result<usize, String> {
        let Some(k) = node else { return Ok(1) };
        let n = &self.nodes[k];
        if n.color == Color::Red && (self.is_red(n.left) || self.is_red(n.right)) {
            return Err("red node with red child".into());
        }
        let left = self.check_under(n.left)?;
        let right = self.check_under(n.right)?;
        if left != right {
            return Err(format!("black heights differ: {} vs {}", left, right));
        }
        let expected = 1 + self.count_of(n.left) + self.count_of(n.right);
        if n.count != expected {
            return Err(format!("count {} but children imply {}", n.count, expected));
        }
        Ok(left + usize::from(n.color == Color::Black))
    }

    pub(crate) fn height(&self) -> usize {
        fn depth<T>(tree: &RawTree<T>, node: Option<NodeKey>) -> usize {
            node.map_or(0, |k| {
                let n = &tree.nodes[k];
                1 + depth(tree, n.left).max(depth(tree, n.right))
            })
        }
        depth(self, self.root)
    }
}
