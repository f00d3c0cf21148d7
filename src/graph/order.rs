// ABOUTME: Kahn's algorithm with declaration-order tie breaking.
// ABOUTME: Returns the indices left over when the edge set has a cycle.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

/// Order nodes `0..deps.len()` so every node follows its dependencies.
///
/// `deps[i]` holds the nodes `i` depends on. Among ready nodes the lowest
/// index goes first, so the result is stable for a given declaration order.
/// On a cycle, `Err` carries the nodes that lie on one; nodes that are only
/// stuck behind a cycle are left out.
pub(crate) fn kahn(deps: &[BTreeSet<usize>]) -> Result<Vec<usize>, Vec<usize>> {
    let n = deps.len();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree: Vec<usize> = vec![0; n];
    for (node, node_deps) in deps.iter().enumerate() {
        for &dep in node_deps {
            dependents[dep].push(node);
            in_degree[node] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, d)| **d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(node)) = ready.pop() {
        order.push(node);
        for &next in &dependents[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if order.len() == n {
        Ok(order)
    } else {
        Err((0..n)
            .filter(|&i| in_degree[i] > 0 && reaches(deps, i, i))
            .collect())
    }
}

/// Whether `to` is reachable from `from` by following dependencies.
pub(crate) fn reaches(deps: &[BTreeSet<usize>], from: usize, to: usize) -> bool {
    let mut seen = vec![false; deps.len()];
    let mut stack = vec![from];
    while let Some(node) = stack.pop() {
        for &dep in &deps[node] {
            if dep == to {
                return true;
            }
            if !seen[dep] {
                seen[dep] = true;
                stack.push(dep);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(edges: &[(usize, usize)], n: usize) -> Vec<BTreeSet<usize>> {
        let mut deps = vec![BTreeSet::new(); n];
        for &(from, to) in edges {
            deps[from].insert(to);
        }
        deps
    }

    #[test]
    fn independent_nodes_keep_declaration_order() {
        assert_eq!(kahn(&deps(&[], 4)).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn dependencies_come_first() {
        // 0 depends on 2, 1 depends on 0
        let order = kahn(&deps(&[(0, 2), (1, 0)], 3)).unwrap();
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn cycle_reports_only_nodes_on_it() {
        // 2 waits on the 0-1 cycle without being part of it
        let remaining = kahn(&deps(&[(0, 1), (1, 0), (2, 0)], 4)).unwrap_err();
        assert_eq!(remaining, vec![0, 1]);
    }

    #[test]
    fn reachability_is_transitive() {
        let d = deps(&[(0, 1), (1, 2)], 4);
        assert!(reaches(&d, 0, 2));
        assert!(!reaches(&d, 2, 0));
        assert!(!reaches(&d, 0, 3));
    }
}
