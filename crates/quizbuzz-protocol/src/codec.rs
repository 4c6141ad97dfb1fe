//! Codec trait and implementations for intents and events.
//!
//! The in-process adapter never needs bytes: it receives [`Event`](crate::Event)
//! values straight off a channel. A renderer living in another process (a
//! browser page fed over a pipe, a logging sidecar) needs them serialized.
//! The [`Codec`] trait is that seam; [`JsonCodec`] is the one implementation.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` so a codec can be moved into the controller task
/// and used from there.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that writes one compact JSON document per value.
///
/// JSON lines are easy to pipe into another program and easy to read in a
/// log. Behind the `json` feature (on by default).
///
/// ```rust
/// use quizbuzz_protocol::{Codec, Intent, JsonCodec, PlayerId};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Intent::Buzz { player: PlayerId(2) }).unwrap();
/// let back: Intent = codec.decode(&bytes).unwrap();
/// assert_eq!(back, Intent::Buzz { player: PlayerId(2) });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Event, Intent, PlayerId};

    #[test]
    fn test_json_codec_encodes_event_as_single_line() {
        let bytes = JsonCodec.encode(&Event::LoginSucceeded).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, r#"{"type":"LoginSucceeded"}"#);
    }

    #[test]
    fn test_json_codec_decode_rejects_unknown_intent() {
        let result: Result<Intent, _> = JsonCodec.decode(br#"{"type":"Explode"}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decodes_rename_intent() {
        let intent: Intent = JsonCodec
            .decode(br#"{"type":"SetPlayerName","player":3,"name":"Zed"}"#)
            .unwrap();
        assert_eq!(
            intent,
            Intent::SetPlayerName {
                player: PlayerId(3),
                name: "Zed".into()
            }
        );
    }
}
