mod support;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use transcribe_gcs::client::SpeechClient;
use transcribe_gcs::error::Error;
use transcribe_gcs::http::HttpClient;
use transcribe_gcs::request::{AudioEncoding, LongRunningRecognizeRequest, RecognitionConfig};

#[tokio::test]
async fn local_timeout_leaves_the_remote_job_running() {
    let finished = Arc::new(AtomicBool::new(false));
    let finished_in = Arc::clone(&finished);
    let endpoint = support::spawn_server(move |request_line, _| {
        if request_line.contains("/v1/operations/") {
            if finished_in.load(Ordering::SeqCst) {
                (
                    200,
                    r#"{"name":"operations/op1","done":true,"response":{"results":[{"alternatives":[{"transcript":"finished anyway","confidence":0.9}]}]}}"#
                        .to_string(),
                )
            } else {
                (200, r#"{"name":"operations/op1","done":false}"#.to_string())
            }
        } else {
            (200, r#"{"name":"operations/op1"}"#.to_string())
        }
    });

    let request = LongRunningRecognizeRequest::new(
        "gs://bucket/sample.flac",
        "gs://bucket/out/sample.json",
        RecognitionConfig::new(AudioEncoding::Flac, Some(16000), "en-US"),
    )
    .unwrap();

    let client = SpeechClient::new(HttpClient::new(5).unwrap(), &endpoint, support::test_token())
        .with_poll_interval(Duration::from_millis(30));

    let handle = client.long_running_recognize(&request).await.unwrap();
    let waited = Duration::from_millis(200);
    match client.wait(&handle, waited).await {
        Err(Error::Timeout { waited: reported }) => assert_eq!(reported, waited),
        other => panic!("expected Timeout, got {other:?}"),
    }

    // The job was never cancelled; once the remote finishes, an independent
    // poll of the same handle shows the completed result.
    finished.store(true, Ordering::SeqCst);
    let op = client.get_operation(&handle).await.unwrap();
    assert!(op.done);
    let results = op.response.unwrap().results;
    assert_eq!(results[0].alternatives[0].transcript, "finished anyway");
}
