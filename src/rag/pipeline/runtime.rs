// Pipeline runtime - petgraph based
// Components form a DAG and run once each, in topological order

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use std::collections::HashMap;

use super::component::{Component, PipelineError, PipelineState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentInfo {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
}

/// Serializable view of a pipeline graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineTopology {
    pub components: Vec<ComponentInfo>,
    pub connections: Vec<Connection>,
}

pub struct PipelineGraph {
    graph: DiGraph<Box<dyn Component>, ()>,
    node_indices: HashMap<String, NodeIndex>,
    /// Topological execution order, fixed at build time
    order: Vec<NodeIndex>,
}

impl PipelineGraph {
    fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn add_component(&mut self, component: Box<dyn Component>) -> Result<NodeIndex, PipelineError> {
        let id = component.id().to_string();
        if self.node_indices.contains_key(&id) {
            return Err(PipelineError::new(id.clone(), format!("Duplicate component: {}", id)));
        }
        let index = self.graph.add_node(component);
        self.node_indices.insert(id, index);
        Ok(index)
    }

    fn connect(&mut self, from: &str, to: &str) -> Result<(), PipelineError> {
        let from_idx = self
            .node_indices
            .get(from)
            .ok_or_else(|| PipelineError::new(from, format!("Source component not found: {}", from)))?;
        let to_idx = self
            .node_indices
            .get(to)
            .ok_or_else(|| PipelineError::new(to, format!("Target component not found: {}", to)))?;

        self.graph.add_edge(*from_idx, *to_idx, ());
        Ok(())
    }

    fn id_of(&self, index: NodeIndex) -> &'static str {
        self.graph
            .node_weight(index)
            .map(|component| component.id())
            .unwrap_or("unknown")
    }

    /// Upstream component ids in the order they were added.
    fn inputs_of(&self, index: NodeIndex) -> Vec<&'static str> {
        let mut upstream: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(index, Direction::Incoming)
            .collect();
        upstream.sort();
        upstream.into_iter().map(|idx| self.id_of(idx)).collect()
    }

    /// Component ids in execution order.
    pub fn component_ids(&self) -> Vec<&'static str> {
        self.order.iter().map(|idx| self.id_of(*idx)).collect()
    }

    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    pub fn topology(&self) -> PipelineTopology {
        let components = self
            .order
            .iter()
            .filter_map(|idx| self.graph.node_weight(*idx))
            .map(|component| ComponentInfo {
                id: component.id().to_string(),
                description: component.description(),
            })
            .collect();

        let connections = self
            .graph
            .raw_edges()
            .iter()
            .map(|edge| Connection {
                from: self.id_of(edge.source()).to_string(),
                to: self.id_of(edge.target()).to_string(),
            })
            .collect();

        PipelineTopology {
            components,
            connections,
        }
    }

    /// Run every component once.
    pub async fn run(&self, state: &mut PipelineState) -> Result<(), PipelineError> {
        let mut trace: Vec<String> = Vec::with_capacity(self.order.len());

        for index in &self.order {
            let component = self
                .graph
                .node_weight(*index)
                .ok_or_else(|| PipelineError::new("runtime", "Component not found in graph"))?;
            let inputs = self.inputs_of(*index);

            tracing::debug!("Running component: {} (inputs: {:?})", component.id(), inputs);

            if let Err(err) = component.run(state, &inputs).await {
                return Err(err.with_trace(trace));
            }
            trace.push(component.id().to_string());
        }

        Ok(())
    }
}

/// Builder for constructing pipelines fluently
pub struct PipelineGraphBuilder {
    components: Vec<Box<dyn Component>>,
    connections: Vec<(String, String)>,
}

impl PipelineGraphBuilder {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn component(mut self, component: Box<dyn Component>) -> Self {
        self.components.push(component);
        self
    }

    pub fn connect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.connections.push((from.into(), to.into()));
        self
    }

    pub fn build(self) -> Result<PipelineGraph, PipelineError> {
        let mut pipeline = PipelineGraph::new();
        for component in self.components {
            pipeline.add_component(component)?;
        }
        for (from, to) in &self.connections {
            pipeline.connect(from, to)?;
        }

        let order = toposort(&pipeline.graph, None).map_err(|cycle| {
            let id = pipeline.id_of(cycle.node_id());
            PipelineError::new(id, "Pipeline connections form a cycle")
        })?;
        pipeline.order = order;

        Ok(pipeline)
    }
}

impl Default for PipelineGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
