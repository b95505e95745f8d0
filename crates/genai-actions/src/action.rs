//! Operations with named inputs and outputs, written to a session.

use genai_common::{unique_id, GenaiError, Result};
use genai_content::{BidiStream, Chunk, Content, Session};
use genai_proto::{self as pb, NamedParameter, TargetSpec};
use tracing::{debug, info};

/// An operation that receives named inputs and returns named outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    name: String,
    target_id: String,
    inputs: Vec<(String, Content)>,
    output_names: Vec<String>,
}

impl Action {
    /// `target_id` names the system that runs the action. With no output
    /// names, nothing is returned.
    pub fn new<C: Into<Content>>(
        name: impl Into<String>,
        target_id: impl Into<String>,
        inputs: Vec<(impl Into<String>, C)>,
        output_names: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target_id: target_id.into(),
            inputs: inputs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
            output_names,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn inputs(&self) -> &[(String, Content)] {
        &self.inputs
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Schema form with inputs bound to `input_ids` (one per input, in
    /// order) and every output bound to a fresh id.
    pub fn to_proto(&self, input_ids: &[String]) -> Result<pb::Action> {
        if input_ids.len() != self.inputs.len() {
            return Err(GenaiError::InvalidArgument(format!(
                "action '{}' has {} inputs but {} ids were given",
                self.name,
                self.inputs.len(),
                input_ids.len()
            )));
        }
        Ok(pb::Action {
            name: self.name.clone(),
            inputs: self
                .inputs
                .iter()
                .zip(input_ids)
                .map(|((name, _), id)| NamedParameter {
                    name: name.clone(),
                    id: id.clone(),
                })
                .collect(),
            outputs: self
                .output_names
                .iter()
                .map(|name| NamedParameter {
                    name: name.clone(),
                    id: unique_id(),
                })
                .collect(),
            target_spec: Some(TargetSpec {
                id: self.target_id.clone(),
            }),
            configs: Vec::new(),
        })
    }

    /// Write the action, then each input under its bound id, then close the
    /// write side. Returns the action as written.
    pub async fn submit<S: BidiStream>(&self, session: &mut Session<S>) -> Result<pb::Action> {
        let ids: Vec<String> = self.inputs.iter().map(|_| unique_id()).collect();
        let proto = self.to_proto(&ids)?;
        session.write(proto.clone(), None).await?;
        for ((name, content), id) in self.inputs.iter().zip(&ids) {
            debug!(action = %self.name, input = %name, id = %id, "Writing action input");
            session.write(content.clone(), Some(id)).await?;
        }
        session.done_writing().await?;
        info!(
            session = %session.id(),
            action = %self.name,
            target = %self.target_id,
            "Action submitted"
        );
        Ok(proto)
    }

    /// Submit, then stream back every response chunk.
    pub async fn run<S: BidiStream>(
        &self,
        session: &mut Session<S>,
        mut on_chunk: impl FnMut(&Chunk) + Send,
    ) -> Result<Content> {
        self.submit(session).await?;
        let mut response = Content::new();
        while let Some(chunk) = session.next_chunk().await? {
            on_chunk(&chunk);
            response.push(chunk);
        }
        debug!(action = %self.name, chunks = response.len(), "Action response complete");
        Ok(response)
    }
}
