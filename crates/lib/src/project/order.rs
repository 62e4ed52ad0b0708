//! Ordering addons by their `before` / `after` declarations.

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use super::types::ProjectError;
use crate::manifest::AddonPackage;

/// Sort `packages` so every `after` dependency precedes its dependent and
/// every `before` target follows its declarer.
///
/// Kahn's algorithm, picking the earliest-discovered ready package at each
/// step so unrelated addons keep discovery order. Names that match no
/// package are ignored.
pub fn order_addons(packages: Vec<AddonPackage>) -> Result<Vec<AddonPackage>, ProjectError> {
  let mut graph: DiGraph<usize, ()> = DiGraph::new();
  let nodes: Vec<NodeIndex> = (0..packages.len()).map(|i| graph.add_node(i)).collect();
  let by_name: HashMap<&str, NodeIndex> = packages
    .iter()
    .zip(&nodes)
    .map(|(p, &idx)| (p.name(), idx))
    .collect();

  for (package, &idx) in packages.iter().zip(&nodes) {
    for target in package.manifest.before() {
      if let Some(&target_idx) = by_name.get(target.as_str()) {
        graph.update_edge(idx, target_idx, ());
      }
    }
    for dependency in package.manifest.after() {
      if let Some(&dep_idx) = by_name.get(dependency.as_str()) {
        graph.update_edge(dep_idx, idx, ());
      }
    }
  }

  let mut in_degree: Vec<usize> = nodes
    .iter()
    .map(|&idx| graph.neighbors_directed(idx, Direction::Incoming).count())
    .collect();
  let mut ready: BTreeSet<usize> = (0..packages.len()).filter(|&i| in_degree[i] == 0).collect();
  let mut order = Vec::with_capacity(packages.len());

  while let Some(i) = ready.pop_first() {
    order.push(i);
    for next in graph.neighbors_directed(nodes[i], Direction::Outgoing) {
      let j = graph[next];
      in_degree[j] -= 1;
      if in_degree[j] == 0 {
        ready.insert(j);
      }
    }
  }

  if order.len() != packages.len() {
    let stuck = (0..packages.len())
      .filter(|&i| in_degree[i] > 0)
      .map(|i| packages[i].name().to_string())
      .collect();
    return Err(ProjectError::AddonCycle(stuck));
  }

  let mut slots: Vec<Option<AddonPackage>> = packages.into_iter().map(Some).collect();
  let ordered: Vec<AddonPackage> = order.into_iter().filter_map(|i| slots[i].take()).collect();
  debug!(
    order = ?ordered.iter().map(AddonPackage::name).collect::<Vec<_>>(),
    "ordered addons"
  );
  Ok(ordered)
}
