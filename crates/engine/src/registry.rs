//! Node registry built from node creation events.

use noderewards_core::{ChainEvent, NodeRecord};

/// All nodes created in the processed history, in input order.
///
/// The registry is a sequence, not a map: two nodes created by the same
/// owner in the same second are kept as distinct records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRegistry {
    nodes: Vec<NodeRecord>,
}

impl NodeRegistry {
    /// Build the registry from decoded events, skipping claims.
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a ChainEvent>,
    {
        let nodes = events
            .into_iter()
            .filter_map(|event| match event {
                ChainEvent::NodeCreated(created) => Some(NodeRecord::new(
                    created.owner,
                    created.name.clone(),
                    created.created_at,
                )),
                _ => None,
            })
            .collect();

        Self { nodes }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node was created.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in creation-input order.
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    /// Consume the registry.
    pub fn into_nodes(self) -> Vec<NodeRecord> {
        self.nodes
    }
}
