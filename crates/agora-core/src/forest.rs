//! The debate forest: an ordered set of independent argument trees.
//!
//! A [`Forest`] is a persistent value. Cloning it is cheap and yields a
//! snapshot that later mutations of the source value never affect: mutation
//! copies only the nodes on the path from the affected root down to the
//! target, and only when those nodes are still shared with a snapshot.
//! Every untouched subtree stays shared.
//!
//! Lookups go through a side index that maps each id to its parent and its
//! position among that parent's children. The forest is append-only, so a
//! slot never changes once assigned; a node's path is rebuilt from the
//! slots in O(depth) and the index stays O(n) however deep chains grow.
//!
//! Nothing here recurses, and serde grows the stack as it descends, so
//! arbitrarily deep reply chains are fine. Reading JSON at depth needs a
//! deserializer without a nesting limit; [`Forest::from_json`] sets one up.

use std::{
  collections::{HashMap, HashSet},
  sync::Arc,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::{
  Error, Result,
  node::{ArgumentNode, NodeId, NodeKind},
};

/// Where a node sits: under `parent` (a root if `None`) at `position`.
#[derive(Debug, Clone)]
struct Slot {
  parent:   Option<NodeId>,
  position: usize,
}

// ─── Forest ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Forest {
  roots: Arc<Vec<Arc<ArgumentNode>>>,
  index: Arc<HashMap<NodeId, Slot>>,
}

impl Forest {
  pub fn new() -> Self { Self::default() }

  /// Build a forest from root nodes (which may carry children), checking
  /// that ids are unique across the whole forest.
  pub fn from_roots(
    roots: impl IntoIterator<Item = ArgumentNode>,
  ) -> Result<Self> {
    let mut forest = Self::new();
    for root in roots {
      forest.add_root(root)?;
    }
    Ok(forest)
  }

  /// Parse the interchange JSON (an array of root nodes) with no limit on
  /// nesting depth.
  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let forest = Self::deserialize(&mut de)?;
    de.end()?;
    Ok(forest)
  }

  // ── Mutation ──────────────────────────────────────────────────────────

  /// Append `node` as the last root. Roots are always arguments, so the
  /// node's kind is overwritten with [`NodeKind::Argument`].
  ///
  /// Fails only if an id in `node`'s subtree is already in the forest.
  pub fn add_root(&mut self, mut node: ArgumentNode) -> Result<()> {
    node.kind = NodeKind::Argument;
    let entries = self.plan_insert(&node, None, self.roots.len())?;

    debug!(id = %node.id, roots = self.roots.len() + 1, "adding root argument");
    Arc::make_mut(&mut self.roots).push(Arc::new(node));
    Arc::make_mut(&mut self.index).extend(entries);
    Ok(())
  }

  /// Append `node` as the last child of the node identified by `parent`,
  /// wherever it sits in the forest.
  ///
  /// Returns [`Error::NodeNotFound`] if `parent` is absent, and leaves the
  /// forest untouched in that case.
  pub fn add_reply(
    &mut self,
    parent: &NodeId,
    node: ArgumentNode,
  ) -> Result<()> {
    let parent_path = self
      .path_of(parent)
      .ok_or_else(|| Error::NodeNotFound(parent.clone()))?;
    let position = self
      .node_at(&parent_path)
      .ok_or_else(|| Error::NodeNotFound(parent.clone()))?
      .child_count();
    let entries = self.plan_insert(&node, Some(parent.clone()), position)?;

    debug!(
      id = %node.id,
      parent = %parent,
      kind = %node.kind,
      depth = parent_path.len(),
      "adding reply"
    );
    let target = self
      .node_at_mut(&parent_path)
      .ok_or_else(|| Error::NodeNotFound(parent.clone()))?;
    target.children.push(Arc::new(node));
    Arc::make_mut(&mut self.index).extend(entries);
    Ok(())
  }

  /// [`add_root`](Self::add_root) on a copy, leaving `self` as it was.
  pub fn with_root(&self, node: ArgumentNode) -> Result<Self> {
    let mut next = self.clone();
    next.add_root(node)?;
    Ok(next)
  }

  /// [`add_reply`](Self::add_reply) on a copy, leaving `self` as it was.
  pub fn with_reply(&self, parent: &NodeId, node: ArgumentNode) -> Result<Self> {
    let mut next = self.clone();
    next.add_reply(parent, node)?;
    Ok(next)
  }

  /// Index entries for `node` (placed under `parent` at `position`) and its
  /// descendants, or the first id that would collide.
  fn plan_insert(
    &self,
    node: &ArgumentNode,
    parent: Option<NodeId>,
    position: usize,
  ) -> Result<Vec<(NodeId, Slot)>> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![(node, Slot { parent, position })];

    while let Some((current, slot)) = stack.pop() {
      if self.index.contains_key(&current.id) || !seen.insert(&current.id) {
        return Err(Error::DuplicateNodeId(current.id.clone()));
      }
      for (position, child) in current.children.iter().enumerate() {
        let child_slot = Slot { parent: Some(current.id.clone()), position };
        stack.push((child.as_ref(), child_slot));
      }
      entries.push((current.id.clone(), slot));
    }

    Ok(entries)
  }

  /// Child positions from the root down to `id`.
  fn path_of(&self, id: &NodeId) -> Option<Vec<usize>> {
    let mut slot = self.index.get(id)?;
    let mut path = vec![slot.position];
    while let Some(parent) = &slot.parent {
      slot = self.index.get(parent)?;
      path.push(slot.position);
    }
    path.reverse();
    Some(path)
  }

  fn node_at(&self, path: &[usize]) -> Option<&ArgumentNode> {
    let (first, rest) = path.split_first()?;
    let mut node = self.roots.get(*first)?.as_ref();
    for &position in rest {
      node = node.children.get(position)?.as_ref();
    }
    Some(node)
  }

  /// Mutable access along `path`, un-sharing each node on the way.
  fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut ArgumentNode> {
    let (first, rest) = path.split_first()?;
    let mut slot = Arc::make_mut(&mut self.roots).get_mut(*first)?;
    for &position in rest {
      slot = Arc::make_mut(slot).children.get_mut(position)?;
    }
    Some(Arc::make_mut(slot))
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub fn get(&self, id: &NodeId) -> Option<&ArgumentNode> {
    self.node_at(&self.path_of(id)?)
  }

  pub fn contains(&self, id: &NodeId) -> bool { self.index.contains_key(id) }

  /// Total number of nodes across every tree.
  pub fn len(&self) -> usize { self.index.len() }

  pub fn is_empty(&self) -> bool { self.index.is_empty() }

  pub fn root_count(&self) -> usize { self.roots.len() }

  /// Distance from the node's root; roots are at depth 0.
  pub fn depth_of(&self, id: &NodeId) -> Option<usize> {
    let mut slot = self.index.get(id)?;
    let mut depth = 0;
    while let Some(parent) = &slot.parent {
      slot = self.index.get(parent)?;
      depth += 1;
    }
    Some(depth)
  }

  pub fn roots(&self) -> impl ExactSizeIterator<Item = &ArgumentNode> {
    self.roots.iter().map(Arc::as_ref)
  }

  /// Every node in pre-order: a node, then its replies in insertion order,
  /// then its next sibling; trees in root order.
  ///
  /// The order is structural. It does not follow timestamps when several
  /// chains grew in parallel.
  pub fn iter(&self) -> PreOrder<'_> {
    PreOrder {
      stack: self.roots.iter().rev().map(Arc::as_ref).collect(),
    }
  }

  /// [`iter`](Self::iter), collected.
  pub fn flatten(&self) -> Vec<&ArgumentNode> { self.iter().collect() }

  /// Whether both values are the same snapshot, i.e. no mutation happened
  /// between them. Cheaper than `==` and suitable for change detection.
  pub fn ptr_eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.roots, &other.roots)
  }
}

impl PartialEq for Forest {
  // Two pre-order sequences annotated with child counts describe the same
  // shape iff the forests are equal, so a flat walk suffices.
  fn eq(&self, other: &Self) -> bool {
    if self.ptr_eq(other) {
      return true;
    }
    self.len() == other.len()
      && self.root_count() == other.root_count()
      && self.iter().zip(other.iter()).all(|(a, b)| a.shallow_eq(b))
  }
}

// ─── Traversal ───────────────────────────────────────────────────────────────

/// Pre-order iterator over a [`Forest`], driven by an explicit stack.
pub struct PreOrder<'a> {
  stack: Vec<&'a ArgumentNode>,
}

impl<'a> Iterator for PreOrder<'a> {
  type Item = &'a ArgumentNode;

  fn next(&mut self) -> Option<Self::Item> {
    let node = self.stack.pop()?;
    self.stack.extend(node.children.iter().rev().map(Arc::as_ref));
    Some(node)
  }
}

// ─── Serde ───────────────────────────────────────────────────────────────────

// A forest travels as the plain array of its root nodes.

impl Serialize for Forest {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(self.roots())
  }
}

impl<'de> Deserialize<'de> for Forest {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let roots = Vec::<ArgumentNode>::deserialize(deserializer)?;
    Forest::from_roots(roots).map_err(serde::de::Error::custom)
  }
}
