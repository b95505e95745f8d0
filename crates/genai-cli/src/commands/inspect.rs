//! `genai inspect`: validated decode, reassembly and a JSON summary.

use std::collections::HashSet;
use std::path::Path;

use genai_common::Result;
use genai_content::{Chunk, Reassembler, ReassemblyLimits};
use genai_proto::{
    chunk::Payload, decode_session_message, Action, Any, ChunkMetadata, Extension,
    ExtensionRegistry, NamedParameter, Node, TargetSpec, UnknownExtensionPolicy,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Summary {
    pub roots: Vec<String>,
    pub nodes: Vec<NodeSummary>,
    pub actions: Vec<ActionSummary>,
}

#[derive(Debug, Serialize)]
pub struct NodeSummary {
    pub id: String,
    pub child_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk: Option<ChunkSummary>,
}

#[derive(Debug, Serialize)]
pub struct ChunkSummary {
    pub mimetype: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub original_file_name: String,
    pub payload: &'static str,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionSummary>,
}

#[derive(Debug, Serialize)]
pub struct ActionSummary {
    pub name: String,
    pub target: String,
    pub inputs: Vec<ParameterSummary>,
    pub outputs: Vec<ParameterSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<ExtensionSummary>,
}

#[derive(Debug, Serialize)]
pub struct ParameterSummary {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ExtensionSummary {
    pub type_name: String,
    pub known: bool,
}

fn registry() -> ExtensionRegistry {
    ExtensionRegistry::new()
        .with::<TargetSpec>()
        .with::<NamedParameter>()
        .with::<ChunkMetadata>()
}

/// Decode, reassemble and summarize one encoded SessionMessage.
///
/// Fails on a decode error, a malformed fragment sequence, or fragments
/// left incomplete at the end of the message.
pub fn summarize(bytes: &[u8]) -> Result<Summary> {
    let message = decode_session_message(bytes)?;
    let registry = registry();

    let mut reassembler = Reassembler::new(ReassemblyLimits::default());
    let mut nodes = Vec::new();
    for fragment in message.node_fragments {
        if let Some(node) = reassembler.push(fragment)? {
            nodes.push(node);
        }
    }
    reassembler.finish()?;

    let children: HashSet<&str> = nodes
        .iter()
        .flat_map(|n| n.child_ids.iter().map(String::as_str))
        .collect();
    let roots = nodes
        .iter()
        .filter(|n| !children.contains(n.id.as_str()))
        .map(|n| n.id.clone())
        .collect();

    let node_summaries = nodes
        .iter()
        .map(|node| summarize_node(node, &registry))
        .collect::<Result<Vec<_>>>()?;
    let actions = message
        .actions
        .iter()
        .map(|action| summarize_action(action, &registry))
        .collect::<Result<Vec<_>>>()?;

    Ok(Summary {
        roots,
        nodes: node_summaries,
        actions,
    })
}

fn summarize_node(node: &Node, registry: &ExtensionRegistry) -> Result<NodeSummary> {
    let chunk = match &node.chunk {
        Some(proto) => {
            let metadata = proto.metadata.clone().unwrap_or_default();
            let (payload, size) = match &proto.payload {
                Some(Payload::Data(data)) => ("data", data.len()),
                Some(Payload::Ref(reference)) => ("ref", reference.len()),
                None => ("none", 0),
            };
            let text = Chunk::from_proto(proto.clone())
                .as_text(false)
                .ok()
                .filter(|t| !t.is_empty());
            Some(ChunkSummary {
                extensions: summarize_extensions(&metadata.experimental, registry)?,
                mimetype: metadata.mimetype,
                role: metadata.role,
                original_file_name: metadata.original_file_name,
                payload,
                size,
                text,
            })
        }
        None => None,
    };
    Ok(NodeSummary {
        id: node.id.clone(),
        child_ids: node.child_ids.clone(),
        chunk,
    })
}

fn summarize_action(action: &Action, registry: &ExtensionRegistry) -> Result<ActionSummary> {
    let params = |params: &[NamedParameter]| -> Vec<ParameterSummary> {
        params
            .iter()
            .map(|p| ParameterSummary {
                name: p.name.clone(),
                id: p.id.clone(),
            })
            .collect()
    };
    Ok(ActionSummary {
        name: action.name.clone(),
        target: action
            .target_spec
            .as_ref()
            .map(|t| t.id.clone())
            .unwrap_or_default(),
        inputs: params(&action.inputs),
        outputs: params(&action.outputs),
        configs: summarize_extensions(&action.configs, registry)?,
    })
}

fn summarize_extensions(entries: &[Any], registry: &ExtensionRegistry) -> Result<Vec<ExtensionSummary>> {
    Ok(registry
        .decode_all(entries, UnknownExtensionPolicy::Retain)?
        .iter()
        .map(|ext: &Extension| ExtensionSummary {
            type_name: ext.type_name().to_string(),
            known: ext.is_known(),
        })
        .collect())
}

pub fn run(file: &Path) -> Result<()> {
    let bytes = std::fs::read(file)?;
    let summary = summarize(&bytes)?;
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| genai_common::GenaiError::Other(format!("failed to render summary: {e}")))?;
    println!("{json}");
    Ok(())
}
