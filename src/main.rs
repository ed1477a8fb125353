use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use transcribe_gcs::auth::{CredentialBroker, ImpersonationRequest};
use transcribe_gcs::client::{SpeechClient, Submission};
use transcribe_gcs::config::{AppConfig, CLOUD_PLATFORM_SCOPE, STORAGE_READ_WRITE_SCOPE};
use transcribe_gcs::error::Error;
use transcribe_gcs::http::HttpClient;
use transcribe_gcs::request::{AudioEncoding, LongRunningRecognizeRequest, RecognitionConfig};

/// Submit a long-running transcription job for an audio file in Cloud Storage.
/// The transcript is written by the service to the output URI; with --no-wait
/// the tool prints the operation name and exits without blocking.
#[derive(Parser, Debug)]
#[command(name = "transcribe-gcs", version, about)]
struct Args {
    /// Cloud Storage URI of the audio file to recognize
    #[arg(long = "path_in", default_value = "gs://cloud-samples-tests/speech/vr.flac")]
    path_in: String,

    /// Cloud Storage URI the transcript is written to
    #[arg(long = "path_out", default_value = "gs://speech-transcripts/output/vr.json")]
    path_out: String,

    /// Submit the job and print the operation name without waiting
    #[arg(long)]
    no_wait: bool,

    /// Seconds to wait for the job before giving up locally (the remote job
    /// keeps running after a timeout)
    #[arg(long, default_value_t = 90)]
    timeout_secs: u64,

    /// Primary language of the recording
    #[arg(long, default_value = "en-US")]
    language: String,

    /// Sample rate of the recording in hertz
    #[arg(long, default_value_t = 16000)]
    sample_rate: i32,

    /// Audio encoding of the recording (flac, linear16, mp3, ogg-opus, ...)
    #[arg(long, default_value = "flac")]
    encoding: AudioEncoding,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = AppConfig::load()?;
    transcribe_gcs::init_logging(if args.verbose {
        Some("debug")
    } else {
        cfg.log_level.as_deref()
    });

    let target_principal = cfg
        .target_principal
        .clone()
        .ok_or_else(|| Error::invalid("SPEECH_IMPERSONATE_SERVICE_ACCOUNT not set"))?;

    let http = HttpClient::new(cfg.timeout_secs)?;
    let broker = CredentialBroker::from_config(http.clone(), &cfg)?;
    let grant = ImpersonationRequest::new(
        &target_principal,
        [CLOUD_PLATFORM_SCOPE, STORAGE_READ_WRITE_SCOPE],
    )?;
    let token = broker.mint(&grant).await?;

    let config = RecognitionConfig::new(args.encoding, Some(args.sample_rate), &args.language);
    let request = LongRunningRecognizeRequest::new(&args.path_in, &args.path_out, config)?;

    let client = SpeechClient::new(http, cfg.speech_endpoint.clone(), token);
    if args.no_wait {
        if let Submission::Pending(handle) = client.submit(&request, false, Duration::ZERO).await? {
            println!("Operation: {}", handle.name());
        }
        return Ok(());
    }

    println!("Waiting for operation to complete...");
    match client
        .submit(&request, true, Duration::from_secs(args.timeout_secs))
        .await?
    {
        Submission::Completed(results) => {
            // Each result covers a consecutive portion of the audio; the first
            // alternative is the most likely one for that portion.
            for result in &results {
                if let Some(alt) = result.alternatives.first() {
                    println!("Transcript: {}", alt.transcript);
                    println!("Confidence: {}", alt.confidence.unwrap_or(0.0));
                }
            }
        }
        Submission::Pending(handle) => {
            println!("Operation: {}", handle.name());
        }
    }
    Ok(())
}
