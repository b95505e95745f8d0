use std::collections::{HashMap, HashSet};

use genai_common::FragmentError;
use genai_proto::Node;

use crate::chunk::Chunk;
use crate::content::Content;

/// Completed nodes of a session, addressable by id.
#[derive(Debug, Default, Clone)]
pub struct NodeIndex {
    nodes: HashMap<String, Node>,
}

impl NodeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk `root` depth-first and collect every chunk in order into a
    /// `Content` carrying the root id.
    ///
    /// The walk keeps its own stack, so tree depth is bounded by memory
    /// rather than by the thread stack.
    pub fn resolve(&self, root: &str) -> Result<Content, FragmentError> {
        let mut chunks = Vec::new();
        let mut on_path = HashSet::new();
        // (node, index of its next child to visit)
        let first = self.enter(root, &mut on_path, &mut chunks)?;
        let mut stack: Vec<(&Node, usize)> = vec![(first, 0)];

        while let Some(top) = stack.last_mut() {
            let node: &Node = top.0;
            match node.child_ids.get(top.1) {
                Some(child) => {
                    top.1 += 1;
                    let child = self.enter(child, &mut on_path, &mut chunks)?;
                    stack.push((child, 0));
                }
                None => {
                    on_path.remove(node.id.as_str());
                    stack.pop();
                }
            }
        }
        Ok(Content::from_chunks(chunks).with_id(root))
    }

    /// Look up `id`, push its chunk and mark it as on the current path.
    fn enter<'a>(
        &'a self,
        id: &str,
        on_path: &mut HashSet<&'a str>,
        out: &mut Vec<Chunk>,
    ) -> Result<&'a Node, FragmentError> {
        let node = self.nodes.get(id).ok_or_else(|| FragmentError::Malformed {
            id: id.to_string(),
            reason: "referenced node was never completed".into(),
        })?;
        if !on_path.insert(node.id.as_str()) {
            return Err(FragmentError::Malformed {
                id: id.to_string(),
                reason: "child ids form a cycle".into(),
            });
        }
        if let Some(chunk) = &node.chunk {
            out.push(Chunk::from_proto(chunk.clone()).with_id(id));
        }
        Ok(node)
    }
}
