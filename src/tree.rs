//! The Patricia (radix) tree itself: insertion, removal, exact match,
//! longest-prefix match, and traversal.
//!
//! The four-case insert and three-case remove below follow the classic
//! `radix_lookup`/`radix_remove` algorithms, reworked onto an arena
//! (see `node.rs`) instead of raw pointers, and a `Copy` [`Prefix`]
//! instead of a manually refcounted one.
use log::{log_enabled, trace};

use crate::error::TreeError;
use crate::node::{Arena, Node, NodeId};
use crate::prefix::Prefix;
use crate::stats::TreeStats;

/// A radix (Patricia) tree mapping IP prefixes to a caller-chosen
/// payload `T`.
///
/// `Tree` accommodates either IPv4 or IPv6 prefixes (`maxbits` is fixed
/// at 128 to fit both); nothing in the algorithms stops a caller from
/// inserting both families into the same tree, but doing so is
/// semantically dubious -- a V4 address and a V6 address that happen to
/// share their leading bits would alias. Callers that care should keep
/// one family per tree and document that choice at their own binding
/// layer rather than relying on the core to enforce it.
pub struct Tree<T> {
    arena: Arena<T>,
    root: Option<NodeId>,
    maxbits: u8,
    count: usize,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Tree {
            arena: Arena::new(),
            root: None,
            maxbits: 128,
            count: 0,
        }
    }

    /// Number of live nodes, including glue nodes.
    pub fn count(&self) -> usize {
        self.count
    }

    fn new_leaf(&mut self, prefix: Prefix) -> NodeId {
        self.arena.insert(Node {
            bit: prefix.bitlen(),
            prefix: Some(prefix),
            payload: None,
            left: None,
            right: None,
            parent: None,
        })
    }

    // ---- exact match (4.4.1) -----------------------------------------

    pub fn search_exact(&self, query: &Prefix) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            let node = self.arena.get(current).expect("live node");
            if node.bit >= query.bitlen() {
                break;
            }
            let go_right = query.bit_at(node.bit);
            current = node.child(go_right)?;
        }
        let node = self.arena.get(current).expect("live node");
        if node.bit > query.bitlen() {
            return None;
        }
        let prefix = node.prefix.as_ref()?;
        if node.bit == query.bitlen()
            && Prefix::compare_masked(
                prefix.addr_bytes(),
                query.addr_bytes(),
                query.bitlen(),
            )
        {
            if log_enabled!(log::Level::Trace) {
                trace!("search_exact: found {prefix}");
            }
            Some(current)
        } else {
            None
        }
    }

    // ---- longest-prefix match (4.4.2) ---------------------------------

    pub fn search_best(&self, query: &Prefix) -> Option<NodeId> {
        let mut current = self.root;
        let mut stack: Vec<NodeId> = Vec::with_capacity(self.maxbits as usize + 1);

        while let Some(id) = current {
            let node = self.arena.get(id).expect("live node");
            if node.bit >= query.bitlen() {
                break;
            }
            if node.prefix.is_some() {
                stack.push(id);
            }
            let go_right = query.bit_at(node.bit);
            current = node.child(go_right);
        }
        if let Some(id) = current {
            let node = self.arena.get(id).expect("live node");
            if node.prefix.is_some() {
                stack.push(id);
            }
        }

        while let Some(id) = stack.pop() {
            let node = self.arena.get(id).expect("live node");
            let prefix = node
                .prefix
                .as_ref()
                .expect("only prefixed nodes are pushed onto the stack");
            if Prefix::compare_masked(
                prefix.addr_bytes(),
                query.addr_bytes(),
                prefix.bitlen(),
            ) {
                if log_enabled!(log::Level::Trace) {
                    trace!("search_best: found {prefix} for {query}");
                }
                return Some(id);
            }
        }
        None
    }

    // ---- insert-or-fetch (4.4.3) ---------------------------------------

    /// Inserts `prefix`, returning a handle to the node that holds it.
    /// Idempotent: inserting the same prefix again returns the same
    /// handle without changing the tree's structure or `count`.
    pub fn insert(&mut self, prefix: Prefix) -> NodeId {
        if log_enabled!(log::Level::Trace) {
            trace!("insert {prefix}");
        }

        let root_id = match self.root {
            None => {
                let id = self.new_leaf(prefix);
                self.root = Some(id);
                self.count += 1;
                return id;
            }
            Some(id) => id,
        };

        let addr = *prefix.addr_bytes();
        let bitlen = prefix.bitlen();
        let maxbits = self.maxbits;

        // Case 2: descend to a leaf, or to a glue node where the path
        // dead-ends.
        let mut current = root_id;
        loop {
            let (node_bit, has_prefix) = {
                let node = self.arena.get(current).expect("live node");
                (node.bit, node.prefix.is_some())
            };
            if !(node_bit < bitlen || !has_prefix) {
                break;
            }
            let go_right =
                node_bit < maxbits && Prefix::bit_at_raw(&addr, node_bit);
            let next = self.arena.get(current).expect("live node").child(go_right);
            match next {
                Some(n) => current = n,
                None => break,
            }
        }

        // Case 3: find the first bit at which Q and the node we landed
        // on differ.
        let (node_bit, node_addr) = {
            let node = self.arena.get(current).expect("live node");
            let p = node
                .prefix
                .as_ref()
                .expect("descent always stops at a prefixed node");
            (node.bit, *p.addr_bytes())
        };
        let check = std::cmp::min(node_bit, bitlen);
        let mut differ_bit: u8 = 0;
        let mut i: u8 = 0;
        while (i as u16) * 8 < check as u16 {
            let r = addr[i as usize] ^ node_addr[i as usize];
            if r == 0 {
                differ_bit = (i + 1) * 8;
                i += 1;
                continue;
            }
            let mut j = 0u8;
            while j < 8 {
                if r & (0x80 >> j) != 0 {
                    break;
                }
                j += 1;
            }
            differ_bit = i * 8 + j;
            break;
        }
        if differ_bit > check {
            differ_bit = check;
        }

        // Case 4: walk up past any ancestor whose own split point lies
        // at or below differ_bit -- the real split point is further up.
        let mut parent_opt = self.arena.get(current).expect("live node").parent;
        while let Some(p) = parent_opt {
            let p_bit = self.arena.get(p).expect("live node").bit;
            if p_bit < differ_bit {
                break;
            }
            current = p;
            parent_opt = self.arena.get(p).expect("live node").parent;
        }
        let current_bit = self.arena.get(current).expect("live node").bit;

        // Case A: exact hit, possibly on a glue node.
        if differ_bit == bitlen && current_bit == bitlen {
            let node = self.arena.get_mut(current).expect("live node");
            if node.prefix.is_some() {
                return current;
            }
            node.prefix = Some(prefix);
            return current;
        }

        // Case B: extend directly below `current`.
        if current_bit == differ_bit {
            let new_id = self.new_leaf(prefix);
            let go_right =
                current_bit < maxbits && Prefix::bit_at_raw(&addr, current_bit);
            {
                let node = self.arena.get_mut(current).expect("live node");
                debug_assert!(
                    node.child(go_right).is_none(),
                    "case B must land on an empty child slot"
                );
                node.set_child(go_right, Some(new_id));
            }
            self.arena.get_mut(new_id).expect("just inserted").parent =
                Some(current);
            self.count += 1;
            return new_id;
        }

        // Case C: Q becomes a new ancestor of `current`.
        if bitlen == differ_bit {
            let new_id = self.new_leaf(prefix);
            let go_right_for_existing =
                bitlen < maxbits && Prefix::bit_at_raw(&node_addr, bitlen);
            self.arena
                .get_mut(new_id)
                .expect("just inserted")
                .set_child(go_right_for_existing, Some(current));

            let existing_parent = self.arena.get(current).expect("live node").parent;
            self.arena.get_mut(new_id).expect("just inserted").parent =
                existing_parent;
            self.splice_into_parent(existing_parent, current, new_id);
            self.arena.get_mut(current).expect("live node").parent = Some(new_id);
            self.count += 1;
            return new_id;
        }

        // Case D: diverge -- Q and `current` need a glue node above both.
        let new_id = self.new_leaf(prefix);
        let glue_id = self.arena.insert(Node {
            bit: differ_bit,
            prefix: None,
            payload: None,
            left: None,
            right: None,
            parent: None,
        });
        let existing_parent = self.arena.get(current).expect("live node").parent;
        self.arena.get_mut(glue_id).expect("just inserted").parent = existing_parent;

        let go_right_glue =
            differ_bit < maxbits && Prefix::bit_at_raw(&addr, differ_bit);
        {
            let glue = self.arena.get_mut(glue_id).expect("just inserted");
            if go_right_glue {
                glue.right = Some(new_id);
                glue.left = Some(current);
            } else {
                glue.right = Some(current);
                glue.left = Some(new_id);
            }
        }
        self.arena.get_mut(new_id).expect("just inserted").parent = Some(glue_id);
        self.splice_into_parent(existing_parent, current, glue_id);
        self.arena.get_mut(current).expect("live node").parent = Some(glue_id);
        self.count += 2;
        new_id
    }

    /// Replaces whichever of `parent`'s child links pointed at `old`
    /// with `new` (or sets `self.root` if `parent` is `None`).
    fn splice_into_parent(
        &mut self,
        parent: Option<NodeId>,
        old: NodeId,
        new: NodeId,
    ) {
        match parent {
            None => {
                debug_assert_eq!(self.root, Some(old));
                self.root = Some(new);
            }
            Some(pid) => {
                let is_right = self.arena.get(pid).expect("live node").right == Some(old);
                self.arena
                    .get_mut(pid)
                    .expect("live node")
                    .set_child(is_right, Some(new));
            }
        }
    }

    // ---- remove (4.4.4) -------------------------------------------------

    /// Removes the node named by `id`. Returns
    /// [`TreeError::NotFound`] if `id` does not resolve to a live node
    /// in this tree (stale handle, or a handle from a different tree).
    pub fn remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        let (has_left, has_right) = {
            let node = self.arena.get(id).ok_or(TreeError::NotFound)?;
            (node.left.is_some(), node.right.is_some())
        };

        if has_left && has_right {
            if log_enabled!(log::Level::Trace) {
                trace!("remove: demoting to glue (two children)");
            }
            let node = self.arena.get_mut(id).expect("checked above");
            node.prefix = None;
            node.payload = None;
            return Ok(());
        }

        if !has_left && !has_right {
            if log_enabled!(log::Level::Trace) {
                trace!("remove: leaf (no children)");
            }
            let parent = self.arena.get(id).expect("checked above").parent;
            self.arena.remove(id);
            self.count -= 1;

            let Some(parent_id) = parent else {
                self.root = None;
                return Ok(());
            };

            let sibling = {
                let pnode = self.arena.get_mut(parent_id).expect("live node");
                if pnode.right == Some(id) {
                    pnode.right = None;
                    pnode.left
                } else {
                    debug_assert_eq!(pnode.left, Some(id));
                    pnode.left = None;
                    pnode.right
                }
            };

            if self.arena.get(parent_id).expect("live node").prefix.is_some() {
                return Ok(());
            }

            // The parent is now a glue node with a single child: it's
            // redundant and must be spliced out too.
            let Some(child) = sibling else {
                debug_assert!(
                    false,
                    "a glue node always had two children before this removal"
                );
                return Ok(());
            };
            let grandparent = self.arena.get(parent_id).expect("live node").parent;
            self.splice_into_parent(grandparent, parent_id, child);
            self.arena.get_mut(child).expect("live node").parent = grandparent;
            self.arena.remove(parent_id);
            self.count -= 1;
            return Ok(());
        }

        // Exactly one child.
        if log_enabled!(log::Level::Trace) {
            trace!("remove: single child");
        }
        let (child_id, parent_id) = {
            let node = self.arena.get(id).expect("checked above");
            let child = if node.right.is_some() {
                node.right
            } else {
                node.left
            }
            .expect("exactly one child present");
            (child, node.parent)
        };
        self.arena.get_mut(child_id).expect("live node").parent = parent_id;
        self.splice_into_parent(parent_id, id, child_id);
        self.arena.remove(id);
        self.count -= 1;
        Ok(())
    }

    // ---- traversal (4.3) -------------------------------------------------

    /// Depth-first walk yielding every node that carries a prefix (glue
    /// nodes are traversed but not yielded), left subtree before right,
    /// with no duplicates.
    pub fn walk(&self) -> Walk<'_, T> {
        Walk {
            tree: self,
            stack: Vec::with_capacity(self.maxbits as usize + 1),
            current: self.root,
        }
    }

    /// Convenience over [`Tree::walk`] that also hands back each node's
    /// prefix and payload.
    pub fn walk_prefixes(
        &self,
    ) -> impl Iterator<Item = (NodeId, &Prefix, Option<&T>)> + '_ {
        self.walk().map(move |id| {
            let node = self.arena.get(id).expect("walk yields live nodes");
            (
                id,
                node.prefix
                    .as_ref()
                    .expect("walk only yields prefixed nodes"),
                node.payload.as_ref(),
            )
        })
    }

    /// Removes every node, invoking `on_drop` for each node whose
    /// payload is set before that node's slot is vacated -- the
    /// explicit, callable equivalent of `tree_destroy(callback, ctx)`.
    /// `Drop` calls this with a no-op callback.
    pub fn clear(&mut self, mut on_drop: impl FnMut(NodeId, &mut T)) {
        let mut stack: Vec<NodeId> = Vec::with_capacity(self.maxbits as usize + 1);
        let mut current = self.root;
        while let Some(id) = current {
            let (left, right) = {
                let node = self.arena.get_mut(id).expect("live node");
                if node.payload.is_some() {
                    on_drop(id, node.payload.as_mut().expect("checked above"));
                }
                (node.left, node.right)
            };
            self.arena.remove(id);
            self.count -= 1;
            current = match left {
                Some(l) => {
                    if let Some(r) = right {
                        stack.push(r);
                    }
                    Some(l)
                }
                None => right.or_else(|| stack.pop()),
            };
        }
        self.root = None;
        debug_assert_eq!(self.count, 0);
        debug_assert_eq!(self.arena.len(), 0);
    }

    // ---- introspection -----------------------------------------------

    pub fn is_glue(&self, id: NodeId) -> Result<bool, TreeError> {
        self.arena
            .get(id)
            .map(|n| n.is_glue())
            .ok_or(TreeError::NotFound)
    }

    pub fn prefix(&self, id: NodeId) -> Result<Option<&Prefix>, TreeError> {
        self.arena
            .get(id)
            .map(|n| n.prefix.as_ref())
            .ok_or(TreeError::NotFound)
    }

    pub fn payload(&self, id: NodeId) -> Result<Option<&T>, TreeError> {
        self.arena
            .get(id)
            .map(|n| n.payload.as_ref())
            .ok_or(TreeError::NotFound)
    }

    pub fn payload_mut(&mut self, id: NodeId) -> Result<Option<&mut T>, TreeError> {
        self.arena
            .get_mut(id)
            .map(|n| n.payload.as_mut())
            .ok_or(TreeError::NotFound)
    }

    /// Sets `id`'s payload, returning whatever was there before.
    pub fn set_payload(
        &mut self,
        id: NodeId,
        payload: T,
    ) -> Result<Option<T>, TreeError> {
        let node = self.arena.get_mut(id).ok_or(TreeError::NotFound)?;
        Ok(std::mem::replace(&mut node.payload, Some(payload)))
    }

    /// A point-in-time snapshot of tree size, for introspection only --
    /// never used internally to make a decision.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        let mut stack: Vec<NodeId> = Vec::with_capacity(self.maxbits as usize + 1);
        let mut current = self.root;
        while let Some(id) = current {
            let node = self.arena.get(id).expect("live node");
            stats.record(node.prefix.as_ref());
            current = match node.left {
                Some(l) => {
                    if let Some(r) = node.right {
                        stack.push(r);
                    }
                    Some(l)
                }
                None => node.right.or_else(|| stack.pop()),
            };
        }
        stats
    }
}

impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        self.clear(|_, _| {});
    }
}

/// Iterator returned by [`Tree::walk`].
pub struct Walk<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<NodeId>,
    current: Option<NodeId>,
}

impl<'a, T> Iterator for Walk<'a, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(id) = self.current {
            let node = self.tree.arena.get(id).expect("live node");
            let yield_this = node.prefix.is_some();
            self.current = match node.left {
                Some(l) => {
                    if let Some(r) = node.right {
                        self.stack.push(r);
                    }
                    Some(l)
                }
                None => node.right.or_else(|| self.stack.pop()),
            };
            if yield_this {
                return Some(id);
            }
        }
        None
    }
}
