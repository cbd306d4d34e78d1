//! Dependency graph with topological ordering and cycle detection.
//!
//! Both the analyzer Requires graph and the unit import graph are
//! instances of this structure, so ordering and cycle reporting are
//! testable independently of either.

/// A directed dependency graph over labeled nodes.
///
/// An edge `a -> b` means "`a` depends on `b`": every valid order places
/// `b` before `a`.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    labels: Vec<String>,
    edges: Vec<Vec<usize>>,
}

/// Node visit state during the depth-first traversal.
#[derive(Clone, Copy, PartialEq)]
enum Mark {
    White,
    Gray,
    Black,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its index.
    pub fn add_node(&mut self, label: impl Into<String>) -> usize {
        self.labels.push(label.into());
        self.edges.push(Vec::new());
        self.labels.len() - 1
    }

    /// Adds a dependency edge: `from` depends on `to`.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        if !self.edges[from].contains(&to) {
            self.edges[from].push(to);
        }
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns a topological order with dependencies first.
    ///
    /// # Errors
    ///
    /// Returns the labels forming a cycle if one exists.
    pub fn topo_order(&self) -> Result<Vec<usize>, Vec<String>> {
        let mut marks = vec![Mark::White; self.labels.len()];
        let mut order = Vec::with_capacity(self.labels.len());
        let mut stack = Vec::new();

        for start in 0..self.labels.len() {
            if marks[start] == Mark::White {
                self.visit(start, &mut marks, &mut stack, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit(
        &self,
        node: usize,
        marks: &mut [Mark],
        stack: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> Result<(), Vec<String>> {
        marks[node] = Mark::Gray;
        stack.push(node);

        for &dep in &self.edges[node] {
            match marks[dep] {
                Mark::Black => {}
                Mark::Gray => return Err(self.cycle_labels(stack, dep)),
                Mark::White => self.visit(dep, marks, stack, order)?,
            }
        }

        stack.pop();
        marks[node] = Mark::Black;
        order.push(node);
        Ok(())
    }

    /// Extracts the cycle from the traversal stack, closed back on `entry`.
    fn cycle_labels(&self, stack: &[usize], entry: usize) -> Vec<String> {
        let from = stack.iter().position(|&n| n == entry).unwrap_or(0);
        let mut cycle: Vec<String> = stack[from..]
            .iter()
            .map(|&n| self.labels[n].clone())
            .collect();
        cycle.push(self.labels[entry].clone());
        cycle
    }

    /// Groups nodes into execution waves.
    ///
    /// Every node's dependencies sit in strictly earlier waves, so the
    /// members of one wave are mutually independent.
    ///
    /// # Errors
    ///
    /// Returns the labels forming a cycle if one exists.
    pub fn waves(&self) -> Result<Vec<Vec<usize>>, Vec<String>> {
        let order = self.topo_order()?;
        let mut depth = vec![0usize; self.labels.len()];

        for &node in &order {
            for &dep in &self.edges[node] {
                depth[node] = depth[node].max(depth[dep] + 1);
            }
        }

        let max_depth = depth.iter().copied().max().unwrap_or(0);
        let mut waves = vec![Vec::new(); max_depth + 1];
        for &node in &order {
            waves[depth[node]].push(node);
        }
        if self.labels.is_empty() {
            waves.clear();
        }
        Ok(waves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> DependencyGraph {
        // top depends on left and right, both depend on base
        let mut g = DependencyGraph::new();
        let top = g.add_node("top");
        let left = g.add_node("left");
        let right = g.add_node("right");
        let base = g.add_node("base");
        g.add_edge(top, left);
        g.add_edge(top, right);
        g.add_edge(left, base);
        g.add_edge(right, base);
        g
    }

    #[test]
    fn topo_order_places_dependencies_first() {
        let g = diamond();
        let order = g.topo_order().expect("acyclic");
        let pos = |n: usize| order.iter().position(|&x| x == n).expect("present");
        assert!(pos(3) < pos(1), "base before left");
        assert!(pos(3) < pos(2), "base before right");
        assert!(pos(1) < pos(0), "left before top");
        assert!(pos(2) < pos(0), "right before top");
    }

    #[test]
    fn waves_group_independent_nodes() {
        let g = diamond();
        let waves = g.waves().expect("acyclic");
        assert_eq!(waves.len(), 3);
        assert_eq!(waves[0], vec![3]);
        assert_eq!(waves[1], vec![1, 2]);
        assert_eq!(waves[2], vec![0]);
    }

    #[test]
    fn detects_cycle_with_path() {
        let mut g = DependencyGraph::new();
        let a = g.add_node("a");
        let b = g.add_node("b");
        let c = g.add_node("c");
        g.add_edge(a, b);
        g.add_edge(b, c);
        g.add_edge(c, a);

        let cycle = g.topo_order().expect_err("cyclic");
        assert_eq!(cycle.first().map(String::as_str), cycle.last().map(String::as_str));
        assert!(cycle.len() >= 4, "closed path through all three nodes: {cycle:?}");
    }

    #[test]
    fn self_edge_is_a_cycle() {
        let mut g = DependencyGraph::new();
        let a = g.add_node("a");
        g.add_edge(a, a);
        assert!(g.topo_order().is_err());
    }

    #[test]
    fn empty_graph() {
        let g = DependencyGraph::new();
        assert!(g.topo_order().expect("trivially acyclic").is_empty());
        assert!(g.waves().expect("trivially acyclic").is_empty());
    }
}
