use genai_common::{FragmentError, GenaiError, WireError};
use genai_proto::{Action, NodeFragment, SessionMessage};

use super::*;
use crate::chunk::{user_chunk, Chunk};
use crate::content::Content;
use crate::metadata::{mimetype, MetadataExt};

#[tokio::test]
async fn content_round_trips_through_session() {
    let (mut local, remote) = MemoryStream::pair(8);
    let mut session = Session::new(remote).with_index();

    let image = Chunk::bytes(
        vec![1, 2, 3, 4, 5],
        mimetype("image/png").with_file_name("cat.png"),
    )
    .unwrap();
    let content = Content::from_chunks([user_chunk("look at this"), image]).with_id("root");
    local
        .write(SessionMessage::from_fragments(content.node_fragments_split(2)))
        .await
        .unwrap();
    local.done_writing().await.unwrap();
    drop(local);

    let mut chunks = Vec::new();
    while let Some(chunk) = session.next_chunk().await.unwrap() {
        chunks.push(chunk);
    }
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].as_text(true).unwrap(), "look at this");
    assert_eq!(chunks[0].role(), "USER");
    assert_eq!(chunks[1].proto().data(), Some(&[1u8, 2, 3, 4, 5][..]));
    assert_eq!(chunks[1].metadata().original_file_name, "cat.png");

    let resolved = session.resolve("root").unwrap();
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved.as_text(false).unwrap(), "look at this");
}

#[tokio::test]
async fn session_writes_reach_peer() {
    let (local, mut remote) = MemoryStream::pair(8);
    let mut session = Session::new(local);

    session.write("hello", Some("greeting")).await.unwrap();
    session.done_writing().await.unwrap();

    let message = remote.read().await.unwrap().unwrap();
    let root = message.node_fragments.last().unwrap();
    assert_eq!(root.id, "greeting");
    assert_eq!(root.child_ids.len(), 1);

    drop(session);
    assert!(remote.read().await.is_none());
}

#[tokio::test]
async fn fragment_takes_given_id() {
    let (local, mut remote) = MemoryStream::pair(8);
    let mut session = Session::new(local);
    session
        .write(NodeFragment::default(), Some("named"))
        .await
        .unwrap();
    let message = remote.read().await.unwrap().unwrap();
    assert_eq!(message.node_fragments[0].id, "named");
}

#[tokio::test]
async fn id_with_session_message_is_rejected() {
    let (local, _remote) = MemoryStream::pair(8);
    let mut session = Session::new(local);
    let err = session
        .write(SessionMessage::default(), Some("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenaiError::InvalidArgument(_)));
}

#[tokio::test]
async fn pending_fragments_at_end_are_incomplete() {
    let (mut local, remote) = MemoryStream::pair(8);
    let mut session = Session::new(remote);

    local
        .write(SessionMessage::from_fragments(vec![NodeFragment {
            id: "n2".into(),
            seq: 0,
            continued: true,
            ..Default::default()
        }]))
        .await
        .unwrap();
    drop(local);

    let err = session.next_node().await.unwrap_err();
    assert!(matches!(
        err,
        GenaiError::Fragment(FragmentError::IncompleteSession { ref ids }) if ids == &["n2".to_string()]
    ));
    assert!(session.next_node().await.unwrap().is_none());
}

#[tokio::test]
async fn actions_from_peer_are_skipped() {
    let (mut local, remote) = MemoryStream::pair(8);
    let mut session = Session::new(remote);

    let mut message = SessionMessage::from_action(Action {
        name: "GENERATE".into(),
        ..Default::default()
    });
    message.node_fragments = Content::from("reply").node_fragments();
    local.write(message).await.unwrap();
    drop(local);

    let chunk = session.next_chunk().await.unwrap().unwrap();
    assert_eq!(chunk.as_text(true).unwrap(), "reply");
    assert!(session.next_chunk().await.unwrap().is_none());
}

#[tokio::test]
async fn conflicting_payload_on_the_wire_is_rejected() {
    let (mut local, remote) = MemoryStream::pair(8);
    let mut session = Session::new(remote);

    // SessionMessage{node_fragments: [{id: "a", chunk_fragment: {ref: "r", data: "d"}}]}
    let chunk = [0x12, 0x01, b'r', 0x1a, 0x01, b'd'];
    let mut fragment = vec![0x0a, 0x01, b'a', 0x2a, chunk.len() as u8];
    fragment.extend_from_slice(&chunk);
    let mut bytes = vec![0x0a, fragment.len() as u8];
    bytes.extend_from_slice(&fragment);
    local.write_raw(bytes).await.unwrap();

    let err = session.next_node().await.unwrap_err();
    assert!(matches!(
        err,
        GenaiError::Wire(WireError::SchemaViolation(_))
    ));
}

#[tokio::test]
async fn write_after_done_writing_fails() {
    let (mut local, _remote) = MemoryStream::pair(1);
    local.done_writing().await.unwrap();
    let err = local.write(SessionMessage::default()).await.unwrap_err();
    assert!(matches!(err, GenaiError::Transport(_)));
}

#[tokio::test]
async fn evicted_sequence_fails_the_session_at_end() {
    let (mut local, remote) = MemoryStream::pair(8);
    let mut session = Session::with_limits(
        remote,
        crate::reassembly::ReassemblyLimits {
            idle_timeout: std::time::Duration::from_millis(1),
            ..Default::default()
        },
    );

    local
        .write(SessionMessage::from_fragments(vec![NodeFragment {
            id: "n2".into(),
            seq: 0,
            continued: true,
            ..Default::default()
        }]))
        .await
        .unwrap();
    // Buffer n2, then stop waiting for more input.
    let waited =
        tokio::time::timeout(std::time::Duration::from_millis(10), session.next_node()).await;
    assert!(waited.is_err());

    // The next message arrives after n2 has gone idle and evicts it.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    local.write(SessionMessage::default()).await.unwrap();
    drop(local);

    let mut results = Vec::new();
    loop {
        match session.next_node().await {
            Ok(Some(node)) => results.push(Ok(node.id)),
            Ok(None) => break,
            Err(err) => results.push(Err(err)),
        }
    }
    assert_eq!(results.len(), 1);
    assert!(matches!(
        &results[0],
        Err(GenaiError::Fragment(FragmentError::IncompleteSession { ids })) if ids == &["n2".to_string()]
    ));
}

#[tokio::test]
async fn bad_fragment_does_not_drop_the_rest_of_the_message() {
    let (mut local, remote) = MemoryStream::pair(8);
    let mut session = Session::new(remote);

    let mut fragments = vec![NodeFragment {
        id: String::new(),
        ..Default::default()
    }];
    fragments.extend(Content::from("kept").with_id("n1").node_fragments());
    local
        .write(SessionMessage::from_fragments(fragments))
        .await
        .unwrap();
    drop(local);

    let err = session.next_node().await.unwrap_err();
    assert!(matches!(
        err,
        GenaiError::Fragment(FragmentError::Malformed { ref id, .. }) if id.is_empty()
    ));

    let mut delivered = Vec::new();
    while let Some(chunk) = session.next_chunk().await.unwrap() {
        delivered.push(chunk.as_text(true).unwrap());
    }
    assert_eq!(delivered, vec!["kept".to_string()]);
}

#[tokio::test]
async fn resolve_needs_an_index() {
    let (mut local, remote) = MemoryStream::pair(8);
    let mut session = Session::new(remote);
    assert!(session.index().is_none());

    local
        .write(SessionMessage::from_fragments(
            Content::from("x").with_id("root").node_fragments(),
        ))
        .await
        .unwrap();
    drop(local);
    while session.next_node().await.unwrap().is_some() {}

    assert!(matches!(
        session.resolve("root"),
        Err(GenaiError::InvalidArgument(_))
    ));
}
