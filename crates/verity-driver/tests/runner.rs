//! Execution-loop integration tests against a scripted engine.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use verity_driver::{DriverError, PROTOCOL_VIOLATION, Runner};
use verity_engine::Engine;
use verity_signer::Signer;
use verity_testkit::{MockSigner, MockTransport, ScriptedEngine, Step};
use verity_transport::Transport;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

fn runner(
  engine: &Arc<ScriptedEngine>,
  transport: &Arc<MockTransport>,
  signer: Option<&Arc<MockSigner>>,
) -> Runner {
  Runner::new(
    Arc::clone(engine) as Arc<dyn Engine>,
    Arc::clone(transport) as Arc<dyn Transport>,
    signer.map(|s| Arc::clone(s) as Arc<dyn Signer>),
    DEFAULT_TIMEOUT,
  )
}

#[tokio::test]
async fn immediate_success_returns_payload_unchanged() {
  let engine = Arc::new(ScriptedEngine::new(vec![Step::Ok(
    r#"{"result":"0x96bacd"}"#.into(),
  )]));
  let transport = Arc::new(MockTransport::new());

  let result = runner(&engine, &transport, None)
    .run(r#"{"method":"eth_blockNumber","params":[]}"#, CancellationToken::new())
    .await;

  assert_eq!(result.unwrap(), r#"{"result":"0x96bacd"}"#);
  assert!(engine.released_exactly_once());
  assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn transport_fan_out_records_every_slot() {
  let engine = Arc::new(ScriptedEngine::new(vec![
    Step::wait_transport(
      "{}",
      &["http://a/rpc", "http://b/rpc", "http://c/rpc"],
      Duration::from_secs(1),
    ),
    Step::Ok("final".into()),
  ]));
  let transport = Arc::new(
    MockTransport::new()
      .fail("http://a/rpc", "connection refused")
      .fail("http://b/rpc", "bad gateway")
      .respond("http://c/rpc", "proof"),
  );

  let result = runner(&engine, &transport, None)
    .run("{}", CancellationToken::new())
    .await;

  assert_eq!(result.unwrap(), "final");
  assert_eq!(transport.calls(), 3);

  let mut responses = engine.responses();
  responses.sort_by_key(|(index, _)| *index);
  assert_eq!(
    responses,
    vec![
      (0, Err("connection refused".into())),
      (1, Err("bad gateway".into())),
      (2, Ok("proof".into())),
    ]
  );
  assert!(engine.released_exactly_once());
}

#[tokio::test]
async fn fan_out_completes_under_mixed_timeout_and_order() {
  // b exceeds the pending timeout; c completes after a despite being
  // dispatched later. All three slots must be written before the loop
  // resumes.
  let engine = Arc::new(ScriptedEngine::new(vec![
    Step::wait_transport(
      "{}",
      &["http://a/rpc", "http://b/rpc", "http://c/rpc"],
      Duration::from_millis(100),
    ),
    Step::Ok("done".into()),
  ]));
  let transport = Arc::new(
    MockTransport::new()
      .respond("http://a/rpc", "fast")
      .respond("http://b/rpc", "never seen")
      .delay("http://b/rpc", Duration::from_millis(400))
      .respond("http://c/rpc", "slow")
      .delay("http://c/rpc", Duration::from_millis(30)),
  );

  let result = runner(&engine, &transport, None)
    .run("{}", CancellationToken::new())
    .await;

  assert_eq!(result.unwrap(), "done");

  let mut responses = engine.responses();
  responses.sort_by_key(|(index, _)| *index);
  assert_eq!(responses.len(), 3);
  assert_eq!(responses[0].1, Ok("fast".into()));
  assert!(responses[1].1.as_ref().is_err_and(|e| e.contains("timed out")));
  assert_eq!(responses[2].1, Ok("slow".into()));
}

#[tokio::test]
async fn zero_engine_timeout_falls_back_to_configured_default() {
  let engine = Arc::new(ScriptedEngine::new(vec![
    Step::wait_transport("{}", &["http://a/rpc"], Duration::ZERO),
    Step::Ok("done".into()),
  ]));
  let transport = Arc::new(
    MockTransport::new()
      .respond("http://a/rpc", "late but fine")
      .delay("http://a/rpc", Duration::from_millis(50)),
  );

  let result = runner(&engine, &transport, None)
    .run("{}", CancellationToken::new())
    .await;

  assert_eq!(result.unwrap(), "done");
  assert_eq!(engine.responses(), vec![(0, Ok("late but fine".into()))]);
}

#[tokio::test]
async fn signing_success_records_signature() {
  let engine = Arc::new(ScriptedEngine::new(vec![
    Step::wait_sign(b"message", "0xabc"),
    Step::Ok("signed".into()),
  ]));
  let transport = Arc::new(MockTransport::new());
  let signer = Arc::new(MockSigner::succeeding("0xabc", "deadbeef"));

  let result = runner(&engine, &transport, Some(&signer))
    .run("{}", CancellationToken::new())
    .await;

  assert_eq!(result.unwrap(), "signed");
  assert_eq!(engine.signatures(), vec!["deadbeef".to_string()]);
  assert_eq!(signer.sign_calls(), 1);
  assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn signer_failure_surfaces_verbatim() {
  let engine = Arc::new(ScriptedEngine::new(vec![Step::wait_sign(
    b"message", "0xabc",
  )]));
  let transport = Arc::new(MockTransport::new());
  let signer = Arc::new(MockSigner::failing("0xabc", "hardware wallet unplugged"));

  let result = runner(&engine, &transport, Some(&signer))
    .run("{}", CancellationToken::new())
    .await;

  match result {
    Err(DriverError::Rpc { message }) => assert_eq!(message, "hardware wallet unplugged"),
    other => panic!("expected rpc error, got {other:?}"),
  }
  assert!(engine.released_exactly_once());
}

#[tokio::test]
async fn missing_signer_is_a_context_error() {
  let engine = Arc::new(ScriptedEngine::new(vec![Step::wait_sign(b"m", "0xabc")]));
  let transport = Arc::new(MockTransport::new());

  let result = runner(&engine, &transport, None)
    .run("{}", CancellationToken::new())
    .await;

  match result {
    Err(DriverError::Rpc { message }) => assert_eq!(message, "no signer configured"),
    other => panic!("expected rpc error, got {other:?}"),
  }
}

#[tokio::test]
async fn unknown_identity_is_rejected_without_signing() {
  let engine = Arc::new(ScriptedEngine::new(vec![Step::wait_sign(b"m", "0xother")]));
  let transport = Arc::new(MockTransport::new());
  let signer = Arc::new(MockSigner::succeeding("0xabc", "deadbeef"));

  let result = runner(&engine, &transport, Some(&signer))
    .run("{}", CancellationToken::new())
    .await;

  match result {
    Err(DriverError::Rpc { message }) => {
      assert_eq!(message, "unknown signing identity: 0xother")
    }
    other => panic!("expected rpc error, got {other:?}"),
  }
  assert_eq!(signer.sign_calls(), 0);
  assert!(engine.signatures().is_empty());
}

#[tokio::test]
async fn skip_suppresses_io_and_resumes() {
  let engine = Arc::new(ScriptedEngine::new(vec![
    Step::Skip,
    Step::Ok("done".into()),
  ]));
  let transport = Arc::new(MockTransport::new());
  let signer = Arc::new(MockSigner::succeeding("0xabc", "deadbeef"));

  let result = runner(&engine, &transport, Some(&signer))
    .run("{}", CancellationToken::new())
    .await;

  assert_eq!(result.unwrap(), "done");
  assert_eq!(engine.skip_count(), 1);
  assert_eq!(transport.calls(), 0);
  assert_eq!(signer.sign_calls(), 0);
}

#[tokio::test]
async fn waiting_without_pending_sub_context_is_a_protocol_violation() {
  let engine = Arc::new(ScriptedEngine::new(vec![Step::WaitDetached]));
  let transport = Arc::new(MockTransport::new());

  let result = runner(&engine, &transport, None)
    .run("{}", CancellationToken::new())
    .await;

  match result {
    Err(DriverError::Rpc { message }) => assert_eq!(message, PROTOCOL_VIOLATION),
    other => panic!("expected rpc error, got {other:?}"),
  }
  assert_eq!(engine.reported_errors(), vec![PROTOCOL_VIOLATION.to_string()]);
  assert_eq!(transport.calls(), 0);
  assert!(engine.released_exactly_once());
}

#[tokio::test]
async fn skip_without_pending_sub_context_is_a_protocol_violation() {
  let engine = Arc::new(ScriptedEngine::new(vec![Step::SkipDetached]));
  let transport = Arc::new(MockTransport::new());

  let result = runner(&engine, &transport, None)
    .run("{}", CancellationToken::new())
    .await;

  assert!(matches!(result, Err(DriverError::Rpc { message }) if message == PROTOCOL_VIOLATION));
  assert_eq!(engine.skip_count(), 0);
}

#[tokio::test]
async fn unclassified_codes_fail_closed() {
  for code in [-1, 4, 99] {
    let engine = Arc::new(ScriptedEngine::new(vec![Step::Raw(code)]));
    let transport = Arc::new(MockTransport::new());

    let result = runner(&engine, &transport, None)
      .run("{}", CancellationToken::new())
      .await;

    assert!(
      matches!(result, Err(DriverError::Rpc { .. })),
      "code {code} must terminate with an error"
    );
    assert!(engine.released_exactly_once(), "code {code} leaked a context");
  }
}

#[tokio::test]
async fn engine_error_without_message_gets_a_generic_one() {
  let engine = Arc::new(ScriptedEngine::new(vec![Step::Error(None)]));
  let transport = Arc::new(MockTransport::new());

  let result = runner(&engine, &transport, None)
    .run("{}", CancellationToken::new())
    .await;

  match result {
    Err(DriverError::Rpc { message }) => assert!(!message.is_empty()),
    other => panic!("expected rpc error, got {other:?}"),
  }
}

#[tokio::test]
async fn creation_failure_surfaces_immediately_and_releases() {
  let engine =
    Arc::new(ScriptedEngine::new(vec![]).with_creation_error("method not found: eth_bogus"));
  let transport = Arc::new(MockTransport::new());

  let result = runner(&engine, &transport, None)
    .run(r#"{"method":"eth_bogus"}"#, CancellationToken::new())
    .await;

  match result {
    Err(DriverError::InvalidRequest { message }) => {
      assert_eq!(message, "method not found: eth_bogus")
    }
    other => panic!("expected invalid request, got {other:?}"),
  }
  assert!(engine.released_exactly_once());
}

struct PanickingSigner;

#[async_trait::async_trait]
impl Signer for PanickingSigner {
  fn can_sign(&self, _identity: &str) -> bool {
    true
  }

  async fn sign(&self, _message: &[u8], _identity: &str) -> Result<String, verity_signer::SignerError> {
    panic!("signer blew up")
  }
}

#[tokio::test]
async fn handler_panic_still_releases_the_context() {
  let engine = Arc::new(ScriptedEngine::new(vec![Step::wait_sign(b"m", "0xabc")]));
  let transport = Arc::new(MockTransport::new());

  let driver = Runner::new(
    Arc::clone(&engine) as Arc<dyn Engine>,
    Arc::clone(&transport) as Arc<dyn Transport>,
    Some(Arc::new(PanickingSigner) as Arc<dyn Signer>),
    DEFAULT_TIMEOUT,
  );

  // Spawn so the unwind is observable as a join error instead of aborting
  // the test.
  let handle = tokio::spawn(async move { driver.run("{}", CancellationToken::new()).await });
  let joined = handle.await;

  assert!(joined.err().is_some_and(|e| e.is_panic()));
  assert!(engine.released_exactly_once());
}

#[tokio::test]
async fn cancellation_between_iterations_still_releases() {
  let engine = Arc::new(ScriptedEngine::new(vec![Step::Ok("never".into())]));
  let transport = Arc::new(MockTransport::new());
  let cancel = CancellationToken::new();
  cancel.cancel();

  let result = runner(&engine, &transport, None).run("{}", cancel).await;

  assert!(matches!(result, Err(DriverError::Cancelled)));
  assert!(engine.released_exactly_once());
}

#[tokio::test]
async fn sequential_resumption_across_multiple_waits() {
  let engine = Arc::new(ScriptedEngine::new(vec![
    Step::wait_transport("{}", &["http://a/rpc"], Duration::from_secs(1)),
    Step::wait_transport("{}", &["http://b/rpc"], Duration::from_secs(1)),
    Step::Ok("done".into()),
  ]));
  let transport = Arc::new(
    MockTransport::new()
      .respond("http://a/rpc", "one")
      .respond("http://b/rpc", "two"),
  );

  let result = runner(&engine, &transport, None)
    .run("{}", CancellationToken::new())
    .await;

  assert_eq!(result.unwrap(), "done");
  assert_eq!(
    transport.called_endpoints(),
    vec!["http://a/rpc".to_string(), "http://b/rpc".to_string()]
  );
  assert!(engine.released_exactly_once());
}
