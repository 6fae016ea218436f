//! Dependency graph over registered components
//!
//! Only module-to-module edges are part of the graph; names that resolve to
//! external services are dropped when the graph is built.

use crate::error::{Result, TesseraError};

/// What an injection name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Another registered module, by node index
    Module(usize),
    /// Anything outside the module graph
    External,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Directed graph of component dependencies.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    edges: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Build the graph from `(name, injection names)` pairs in registration order.
    pub fn build<'a, I, D, F>(nodes: I, resolve: F) -> Self
    where
        I: IntoIterator<Item = (&'a str, D)>,
        D: IntoIterator<Item = &'a str>,
        F: Fn(&str) -> Resolution,
    {
        let mut graph = Self::default();
        for (name, dependencies) in nodes {
            let edges = dependencies
                .into_iter()
                .filter_map(|dependency| match resolve(dependency) {
                    Resolution::Module(index) => Some(index),
                    Resolution::External => None,
                })
                .collect();
            graph.nodes.push(name.to_string());
            graph.edges.push(edges);
        }
        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn name(&self, index: usize) -> &str {
        &self.nodes[index]
    }

    /// Node indices ordered so every dependency precedes its dependents.
    ///
    /// Roots are visited in registration order and dependencies in declared
    /// order, so nodes with no constraint between them keep registration
    /// order.
    pub fn topological_order(&self) -> Result<Vec<usize>> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut path = Vec::new();

        for root in 0..self.nodes.len() {
            self.visit(root, &mut marks, &mut path, &mut order)?;
        }
        Ok(order)
    }

    fn visit(
        &self,
        node: usize,
        marks: &mut [Mark],
        path: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> Result<()> {
        match marks[node] {
            Mark::Done => return Ok(()),
            Mark::Visiting => {
                let start = path.iter().position(|&n| n == node).unwrap_or(0);
                let cycle = path[start..]
                    .iter()
                    .chain(std::iter::once(&node))
                    .map(|&n| self.nodes[n].clone())
                    .collect();
                return Err(TesseraError::CyclicDependency { cycle });
            }
            Mark::Unvisited => {}
        }

        marks[node] = Mark::Visiting;
        path.push(node);
        for &dependency in &self.edges[node] {
            self.visit(dependency, marks, path, order)?;
        }
        path.pop();
        marks[node] = Mark::Done;
        order.push(node);
        Ok(())
    }
}
