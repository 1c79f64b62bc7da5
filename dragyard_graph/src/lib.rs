// Copyright 2025 the Dragyard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dragyard Graph: connectivity between drop containers.
//!
//! Containers declare which other containers they can send items to, either
//! by direct id, by a string name that may resolve later (or never), or
//! implicitly by sharing a group. Connections are one-directional: A
//! connecting to B says nothing about B connecting to A.
//!
//! [`ConnectionGraph`] is an explicit directed graph keyed by [`ContainerId`].
//! Reachability queries walk the graph with a visited set, so cyclic,
//! self-referential, and bidirectional configurations are all fine and can
//! never recurse unboundedly.
//!
//! A named connection whose name no other container has claimed is not an
//! error: the edge is treated as absent and [`ConnectionGraph::log_unresolved`]
//! reports it through the `log` facade so misconfigurations stay visible.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::string::{String, ToString};

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

/// Identifier of a registered drop container.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

impl ContainerId {
    /// Constructs an id from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value of this id.
    #[must_use]
    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

/// Identifier of a container group.
///
/// Containers sharing a group are mutually connected without any explicit
/// edges between them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(u64);

impl GroupId {
    /// Constructs an id from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value of this id.
    #[must_use]
    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

/// Target of a declared connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectTarget {
    /// Connect to a container by id.
    Direct(ContainerId),
    /// Connect to whichever container claims this name. Resolved at query
    /// time, so the name may be claimed after the connection is declared.
    Named(String),
}

#[derive(Clone, Debug, Default)]
struct Node {
    edges: SmallVec<[ConnectTarget; 4]>,
    group: Option<GroupId>,
}

/// Directed connectivity graph over live containers.
#[derive(Clone, Debug, Default)]
pub struct ConnectionGraph {
    nodes: HashMap<ContainerId, Node>,
    names: HashMap<String, ContainerId>,
    groups: HashMap<GroupId, SmallVec<[ContainerId; 4]>>,
}

impl ConnectionGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a container as a node. Registering an existing node is a
    /// no-op that keeps its edges.
    pub fn add_node(&mut self, id: ContainerId) {
        self.nodes.entry(id).or_default();
    }

    /// Removes a container, its edges, its name, and its group membership.
    ///
    /// Edges pointing *at* the removed container stay declared and simply
    /// stop resolving, matching how a named connection behaves before its
    /// name is claimed.
    pub fn remove_node(&mut self, id: ContainerId) {
        if let Some(node) = self.nodes.remove(&id) {
            if let Some(group) = node.group
                && let Some(members) = self.groups.get_mut(&group)
            {
                members.retain(|m| *m != id);
            }
        }
        self.names.retain(|_, v| *v != id);
    }

    /// Claims a name for a container, replacing any previous claim of the
    /// same name and any previous name of the same container.
    pub fn set_name(&mut self, id: ContainerId, name: &str) {
        self.names.retain(|_, v| *v != id);
        self.names.insert(name.to_string(), id);
    }

    /// Resolves a claimed name.
    #[must_use]
    pub fn resolve_name(&self, name: &str) -> Option<ContainerId> {
        self.names.get(name).copied()
    }

    /// Declares a one-directional connection.
    pub fn connect(&mut self, from: ContainerId, target: ConnectTarget) {
        let node = self.nodes.entry(from).or_default();
        if !node.edges.contains(&target) {
            node.edges.push(target);
        }
    }

    /// Drops every connection declared by `from`. Group membership and
    /// connections *to* `from` are unaffected.
    pub fn clear_connections(&mut self, from: ContainerId) {
        if let Some(node) = self.nodes.get_mut(&from) {
            node.edges.clear();
        }
    }

    /// Adds a container to a group, leaving any previous group.
    pub fn join_group(&mut self, id: ContainerId, group: GroupId) {
        self.leave_group(id);
        self.nodes.entry(id).or_default().group = Some(group);
        let members = self.groups.entry(group).or_default();
        if !members.contains(&id) {
            members.push(id);
        }
    }

    /// Removes a container from its group, if any.
    pub fn leave_group(&mut self, id: ContainerId) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        if let Some(group) = node.group.take()
            && let Some(members) = self.groups.get_mut(&group)
        {
            members.retain(|m| *m != id);
        }
    }

    /// Resolved direct successors of a node: direct edges, named edges whose
    /// name is currently claimed, and fellow group members.
    fn neighbors(&self, id: ContainerId, out: &mut SmallVec<[ContainerId; 8]>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        for edge in &node.edges {
            let resolved = match edge {
                ConnectTarget::Direct(to) => Some(*to),
                ConnectTarget::Named(name) => self.resolve_name(name),
            };
            // Edges to unregistered containers are treated as absent.
            if let Some(to) = resolved
                && self.nodes.contains_key(&to)
            {
                out.push(to);
            }
        }
        if let Some(group) = node.group
            && let Some(members) = self.groups.get(&group)
        {
            out.extend(members.iter().copied().filter(|m| *m != id));
        }
    }

    /// Whether `target` can be reached from `origin` by following declared
    /// connections transitively. A node always reaches itself.
    #[must_use]
    pub fn reachable(&self, origin: ContainerId, target: ContainerId) -> bool {
        if origin == target {
            return true;
        }
        let mut visited: HashSet<ContainerId> = HashSet::new();
        let mut stack: SmallVec<[ContainerId; 8]> = SmallVec::new();
        visited.insert(origin);
        stack.push(origin);
        while let Some(current) = stack.pop() {
            let mut next: SmallVec<[ContainerId; 8]> = SmallVec::new();
            self.neighbors(current, &mut next);
            for to in next {
                if to == target {
                    return true;
                }
                if visited.insert(to) {
                    stack.push(to);
                }
            }
        }
        false
    }

    /// Warns once per connection of `from` that does not currently resolve
    /// to a live container. Misconfigured connections are non-fatal; they
    /// just never match.
    pub fn log_unresolved(&self, from: ContainerId) {
        let Some(node) = self.nodes.get(&from) else {
            return;
        };
        for edge in &node.edges {
            match edge {
                ConnectTarget::Direct(to) => {
                    if !self.nodes.contains_key(to) {
                        log::warn!(
                            "container {} connects to unregistered container {}",
                            from.to_raw(),
                            to.to_raw(),
                        );
                    }
                }
                ConnectTarget::Named(name) => {
                    if self.resolve_name(name).is_none_or(|to| !self.nodes.contains_key(&to)) {
                        log::warn!(
                            "container {} connects to unknown name {name:?}",
                            from.to_raw(),
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    fn c(raw: u64) -> ContainerId {
        ContainerId::from_raw(raw)
    }

    #[test]
    fn direct_connection_is_one_directional() {
        let mut graph = ConnectionGraph::new();
        graph.add_node(c(1));
        graph.add_node(c(2));
        graph.connect(c(1), ConnectTarget::Direct(c(2)));
        assert!(graph.reachable(c(1), c(2)));
        assert!(!graph.reachable(c(2), c(1)));
    }

    #[test]
    fn every_node_reaches_itself() {
        let mut graph = ConnectionGraph::new();
        graph.add_node(c(1));
        assert!(graph.reachable(c(1), c(1)));
        // Even with an explicit self edge.
        graph.connect(c(1), ConnectTarget::Direct(c(1)));
        assert!(graph.reachable(c(1), c(1)));
    }

    #[test]
    fn transitive_reachability() {
        let mut graph = ConnectionGraph::new();
        for raw in 1..=3 {
            graph.add_node(c(raw));
        }
        graph.connect(c(1), ConnectTarget::Direct(c(2)));
        graph.connect(c(2), ConnectTarget::Direct(c(3)));
        assert!(graph.reachable(c(1), c(3)));
        assert!(!graph.reachable(c(3), c(1)));
    }

    #[test]
    fn cycles_terminate() {
        let mut graph = ConnectionGraph::new();
        for raw in 1..=3 {
            graph.add_node(c(raw));
        }
        graph.connect(c(1), ConnectTarget::Direct(c(2)));
        graph.connect(c(2), ConnectTarget::Direct(c(3)));
        graph.connect(c(3), ConnectTarget::Direct(c(1)));
        assert!(graph.reachable(c(2), c(1)));
        assert!(!graph.reachable(c(1), c(4)));
    }

    #[test]
    fn named_connection_resolves_after_claim() {
        let mut graph = ConnectionGraph::new();
        graph.add_node(c(1));
        graph.connect(c(1), ConnectTarget::Named("done".to_string()));
        assert!(!graph.reachable(c(1), c(2)));

        graph.add_node(c(2));
        graph.set_name(c(2), "done");
        assert!(graph.reachable(c(1), c(2)));
    }

    #[test]
    fn unresolved_connection_is_absent() {
        let mut graph = ConnectionGraph::new();
        graph.add_node(c(1));
        graph.connect(c(1), ConnectTarget::Direct(c(9)));
        graph.connect(c(1), ConnectTarget::Named("missing".to_string()));
        assert!(!graph.reachable(c(1), c(9)));
        // Purely diagnostic, must not panic.
        graph.log_unresolved(c(1));
    }

    #[test]
    fn group_members_are_mutually_connected() {
        let mut graph = ConnectionGraph::new();
        let group = GroupId::from_raw(1);
        for raw in 1..=3 {
            graph.add_node(c(raw));
            graph.join_group(c(raw), group);
        }
        assert!(graph.reachable(c(1), c(3)));
        assert!(graph.reachable(c(3), c(2)));

        graph.leave_group(c(3));
        assert!(!graph.reachable(c(1), c(3)));
        assert!(graph.reachable(c(1), c(2)));
    }

    #[test]
    fn removing_a_node_breaks_edges_into_it() {
        let mut graph = ConnectionGraph::new();
        graph.add_node(c(1));
        graph.add_node(c(2));
        graph.set_name(c(2), "side");
        graph.connect(c(1), ConnectTarget::Named("side".to_string()));
        assert!(graph.reachable(c(1), c(2)));

        graph.remove_node(c(2));
        assert!(!graph.reachable(c(1), c(2)));
    }
}
