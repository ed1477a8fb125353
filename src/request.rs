use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use url::Url;

/// Audio container/codec identifiers accepted by the v1 API.
/// Reference: https://cloud.google.com/speech-to-text/docs/reference/rest/v1/RecognitionConfig#AudioEncoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    Linear16,
    Flac,
    Mp3,
    OggOpus,
    Amr,
    AmrWb,
    WebmOpus,
}

impl FromStr for AudioEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "linear16" | "wav" | "pcm" => Ok(AudioEncoding::Linear16),
            "flac" => Ok(AudioEncoding::Flac),
            "mp3" => Ok(AudioEncoding::Mp3),
            "ogg_opus" | "ogg" => Ok(AudioEncoding::OggOpus),
            "amr" => Ok(AudioEncoding::Amr),
            "amr_wb" => Ok(AudioEncoding::AmrWb),
            "webm_opus" | "webm" => Ok(AudioEncoding::WebmOpus),
            other => Err(format!("unknown audio encoding: {other}")),
        }
    }
}

/// Non-functional recording hints. They may influence model selection but do
/// not change the structural validity of a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microphone_distance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_device_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_naics_code_of_audio: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    pub encoding: AudioEncoding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate_hertz: Option<i32>,
    pub language_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_language_codes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_automatic_punctuation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_channel_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_separate_recognition_per_channel: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecognitionMetadata>,
}

impl RecognitionConfig {
    pub fn new(
        encoding: AudioEncoding,
        sample_rate_hertz: Option<i32>,
        language_code: impl Into<String>,
    ) -> Self {
        Self {
            encoding,
            sample_rate_hertz,
            language_code: language_code.into(),
            alternative_language_codes: None,
            enable_automatic_punctuation: None,
            audio_channel_count: None,
            enable_separate_recognition_per_channel: None,
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionAudio {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptOutputConfig {
    pub gcs_uri: String,
}

/// One job request: audio source, recognition parameters, output sink.
/// Reference: https://cloud.google.com/speech-to-text/docs/reference/rest/v1/speech/longrunningrecognize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongRunningRecognizeRequest {
    pub config: RecognitionConfig,
    pub audio: RecognitionAudio,
    pub output_config: TranscriptOutputConfig,
}

impl LongRunningRecognizeRequest {
    /// Builds a request after checking both locators are well-formed gs:// URIs.
    /// Whether the referenced objects exist is the remote service's concern.
    pub fn new(
        input_uri: &str,
        output_uri: &str,
        config: RecognitionConfig,
    ) -> Result<Self, Error> {
        validate_gcs_uri(input_uri)?;
        validate_gcs_uri(output_uri)?;
        Ok(Self {
            config,
            audio: RecognitionAudio {
                uri: input_uri.to_string(),
            },
            output_config: TranscriptOutputConfig {
                gcs_uri: output_uri.to_string(),
            },
        })
    }
}

/// A well-formed locator is `gs://bucket/object/path`.
pub fn validate_gcs_uri(uri: &str) -> Result<(), Error> {
    let parsed =
        Url::parse(uri).map_err(|e| Error::invalid(format!("malformed uri {uri}: {e}")))?;
    if parsed.scheme() != "gs" {
        return Err(Error::invalid(format!(
            "expected gs:// uri, got scheme {}://",
            parsed.scheme()
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(Error::invalid(format!("missing bucket in uri {uri}")));
    }
    if parsed.path().trim_start_matches('/').is_empty() {
        return Err(Error::invalid(format!("missing object path in uri {uri}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcs_uri_validation() {
        assert!(validate_gcs_uri("gs://bucket/sample.flac").is_ok());
        assert!(validate_gcs_uri("gs://bucket/out/sample.json").is_ok());
        assert!(validate_gcs_uri("https://bucket/sample.flac").is_err());
        assert!(validate_gcs_uri("gs://bucket").is_err());
        assert!(validate_gcs_uri("gs:///sample.flac").is_err());
        assert!(validate_gcs_uri("not a uri").is_err());
    }

    #[test]
    fn encoding_wire_names() {
        assert_eq!(
            serde_json::to_string(&AudioEncoding::Flac).unwrap(),
            "\"FLAC\""
        );
        assert_eq!(
            serde_json::to_string(&AudioEncoding::OggOpus).unwrap(),
            "\"OGG_OPUS\""
        );
        assert_eq!(
            serde_json::to_string(&AudioEncoding::Linear16).unwrap(),
            "\"LINEAR16\""
        );
    }

    #[test]
    fn encoding_from_str_accepts_common_spellings() {
        assert_eq!("flac".parse::<AudioEncoding>().unwrap(), AudioEncoding::Flac);
        assert_eq!("wav".parse::<AudioEncoding>().unwrap(), AudioEncoding::Linear16);
        assert_eq!(
            "ogg-opus".parse::<AudioEncoding>().unwrap(),
            AudioEncoding::OggOpus
        );
        assert!("au".parse::<AudioEncoding>().is_err());
    }
}
