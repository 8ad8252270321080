use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Media content kept inline as a `data:<mime>;base64,<payload>` string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddedBlob(String);

impl EmbeddedBlob {
    pub fn encode(mime_type: &str, bytes: &[u8]) -> EmbeddedBlob {
        EmbeddedBlob(format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mime_type(&self) -> Option<&str> {
        let (header, _) = self.0.strip_prefix("data:")?.split_once(',')?;
        header.strip_suffix(";base64")
    }

    /// Returns the MIME type and the raw bytes.
    pub fn decode(&self) -> Result<(String, Vec<u8>)> {
        let Some(rest) = self.0.strip_prefix("data:") else {
            bail!("Not a data URI");
        };
        let Some((header, payload)) = rest.split_once(',') else {
            bail!("Data URI without payload");
        };
        let Some(mime_type) = header.strip_suffix(";base64") else {
            bail!("Data URI is not base64 encoded");
        };
        let bytes = STANDARD
            .decode(payload)
            .context("Malformed base64 payload")?;
        Ok((mime_type.to_owned(), bytes))
    }
}
