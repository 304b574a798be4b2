//! Whole-field encryption for identifying values kept in a record

use secrecy::SecretString;
use serde_json::{Map, Value};
use traveal_core::{KdfMethod, TravealError, TravealResult};
use traveal_crypto::{Envelope, EnvelopeCodec};
use zeroize::Zeroizing;

const ENCRYPTED_SUFFIX: &str = "_encrypted";

/// Replace each of `fields` present in `record` with `"{field}_encrypted"`
/// holding an [`Envelope`]. Non-string values are encrypted as their JSON text.
pub fn encrypt_sensitive_fields<S: AsRef<str>>(
    record: &Map<String, Value>,
    fields: &[S],
    codec: &EnvelopeCodec,
    secret: &SecretString,
    method: KdfMethod,
) -> TravealResult<Map<String, Value>> {
    let mut out = record.clone();
    for field in fields {
        let field = field.as_ref();
        let Some(value) = out.remove(field) else {
            continue;
        };
        let plaintext = Zeroizing::new(match value {
            Value::String(s) => s,
            other => other.to_string(),
        });
        let envelope = codec.encrypt(plaintext.as_bytes(), secret, method)?;
        let envelope = serde_json::to_value(envelope)
            .map_err(|e| TravealError::Format(format!("{field}: envelope serialization: {e}")))?;
        out.insert(format!("{field}{ENCRYPTED_SUFFIX}"), envelope);
    }
    tracing::debug!(fields = fields.len(), "sensitive fields sealed");
    Ok(out)
}

/// Inverse of [`encrypt_sensitive_fields`]: for each of `fields`, the
/// `"{field}_encrypted"` envelope is opened and restored under `field` as
/// a string. Other keys pass through untouched.
pub fn decrypt_sensitive_fields<S: AsRef<str>>(
    record: &Map<String, Value>,
    fields: &[S],
    codec: &EnvelopeCodec,
    secret: &SecretString,
) -> TravealResult<Map<String, Value>> {
    let mut out = record.clone();
    for field in fields {
        let field = field.as_ref();
        let key = format!("{field}{ENCRYPTED_SUFFIX}");
        let Some(value) = out.remove(&key) else {
            continue;
        };
        if !value.is_object() {
            return Err(TravealError::Format(format!("{key}: expected an envelope object")));
        }
        let envelope: Envelope = serde_json::from_value(value)
            .map_err(|e| TravealError::Format(format!("{key}: {e}")))?;
        let plaintext = codec.decrypt(&envelope, secret)?;
        let text = String::from_utf8(plaintext)
            .map_err(|_| TravealError::Format(format!("{key}: plaintext is not UTF-8")))?;
        out.insert(field.to_string(), Value::String(text));
    }
    Ok(out)
}
