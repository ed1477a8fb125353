mod support;

use std::time::{Duration, Instant};
use transcribe_gcs::client::{SpeechClient, Submission};
use transcribe_gcs::http::HttpClient;
use transcribe_gcs::request::{AudioEncoding, LongRunningRecognizeRequest, RecognitionConfig};

#[tokio::test]
async fn flac_sample_transcribed_within_the_wait_bound() {
    // Simulated service: the job finishes about two seconds after submission.
    let submitted = Instant::now();
    let endpoint = support::spawn_server(move |request_line, _| {
        if request_line.contains("/v1/operations/") {
            if submitted.elapsed() >= Duration::from_secs(2) {
                (
                    200,
                    r#"{"name":"operations/e2e","done":true,"response":{"results":[{"alternatives":[{"transcript":"hello world","confidence":0.95}]}]}}"#
                        .to_string(),
                )
            } else {
                (200, r#"{"name":"operations/e2e","done":false}"#.to_string())
            }
        } else {
            (200, r#"{"name":"operations/e2e"}"#.to_string())
        }
    });

    let request = LongRunningRecognizeRequest::new(
        "gs://bucket/sample.flac",
        "gs://bucket/out/sample.json",
        RecognitionConfig::new(AudioEncoding::Flac, Some(16000), "en-US"),
    )
    .unwrap();

    let client = SpeechClient::new(HttpClient::new(5).unwrap(), &endpoint, support::test_token())
        .with_poll_interval(Duration::from_millis(250));
    let submission = client
        .submit(&request, true, Duration::from_secs(90))
        .await
        .unwrap();

    match submission {
        Submission::Completed(results) => {
            assert_eq!(results.len(), 1);
            let alt = results[0].alternatives.first().unwrap();
            assert_eq!(alt.transcript, "hello world");
            assert!((alt.confidence.unwrap() - 0.95).abs() < 1e-6);
        }
        Submission::Pending(_) => panic!("waiting submit must resolve the job"),
    }
}
