use crate::{
    common::{
        constants::GZIP_MAGIC,
        error::{ReleaseBase64Decode, ReleaseDecompress, ReleaseDeserialize, Result},
    },
    helm::release::Release,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use flate2::read::GzDecoder;
use snafu::ResultExt;
use std::io::Read;
use tracing::debug;

/// Decodes a release record the way Helm's storage drivers read them back: base64, then gzip
/// (only if the gzip magic is present), then JSON.
/// Ref: https://github.com/helm/helm/blob/v3.13.2/pkg/storage/driver/util.go
pub fn decode_release(payload: &[u8]) -> Result<Release> {
    let payload = std::str::from_utf8(payload)
        .map(str::trim)
        .map(str::as_bytes)
        .unwrap_or(payload);
    let decoded = STANDARD.decode(payload).context(ReleaseBase64Decode)?;

    let json = if decoded.starts_with(&GZIP_MAGIC) {
        let mut buf = Vec::with_capacity(decoded.len() * 4);
        GzDecoder::new(decoded.as_slice())
            .read_to_end(&mut buf)
            .context(ReleaseDecompress)?;
        debug!(
            compressed = decoded.len(),
            decompressed = buf.len(),
            "Decompressed release record"
        );
        buf
    } else {
        debug!("Release record is not compressed");
        decoded
    };

    serde_json::from_slice(json.as_slice()).context(ReleaseDeserialize)
}

/// Tools to build release records in tests, encoded the way Helm writes them.
#[cfg(test)]
pub(crate) mod test_utils {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use flate2::{write::GzEncoder, Compression};
    use serde_json::{json, Value};
    use std::io::Write;

    /// JSON -> gzip -> base64, or JSON -> base64 if `compress` is unset.
    pub(crate) fn encode_release(release: &Value, compress: bool) -> Vec<u8> {
        let json = serde_json::to_vec(release).unwrap();
        let bytes = if compress {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
            encoder.write_all(json.as_slice()).unwrap();
            encoder.finish().unwrap()
        } else {
            json
        };
        STANDARD.encode(bytes).into_bytes()
    }

    pub(crate) fn b64(data: &[u8]) -> String {
        STANDARD.encode(data)
    }

    /// A release of a small chart with a nested template, a static file, a schema and user
    /// supplied values.
    pub(crate) fn sample_release(name: &str, revision: u32) -> Value {
        json!({
            "name": name,
            "namespace": "apps",
            "version": revision,
            "info": { "status": "deployed", "description": "Install complete" },
            "chart": {
                "metadata": {
                    "apiVersion": "v2",
                    "name": "web",
                    "version": "0.1.0",
                    "appVersion": "1.16.0",
                    "description": "A web server",
                    "type": "application"
                },
                "templates": [
                    { "name": "templates/deployment.yaml", "data": b64(SAMPLE_DEPLOYMENT) },
                    { "name": "templates/tests/test-connection.yaml", "data": b64(b"kind: Pod\n") }
                ],
                "values": { "replicaCount": 1, "image": { "repository": "nginx" } },
                "schema": b64(SAMPLE_SCHEMA),
                "files": [
                    { "name": "README.md", "data": b64(b"# web\n") },
                    { "name": ".helmignore", "data": b64(b".git/\n*.swp\n") },
                    { "name": "files/blob.bin", "data": b64(&[0u8, 159, 146, 150, 255]) }
                ]
            },
            "config": { "replicaCount": 3 },
            "manifest": "---\nkind: Deployment\n"
        })
    }

    pub(crate) const SAMPLE_DEPLOYMENT: &[u8] =
        b"apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: {{ .Release.Name }}\n";

    pub(crate) const SAMPLE_SCHEMA: &[u8] = b"{\"type\": \"object\"}\n";
}

#[cfg(test)]
mod tests {
    use super::{
        decode_release,
        test_utils::{b64, encode_release, sample_release},
    };
    use crate::common::error::Error;
    use base64::{engine::general_purpose::STANDARD, Engine};

    #[test]
    fn decodes_compressed_record() {
        let payload = encode_release(&sample_release("web", 2), true);
        let release = decode_release(payload.as_slice()).unwrap();

        assert_eq!(release.name(), "web");
        assert_eq!(release.version(), 2);
        assert_eq!(release.namespace(), "apps");
        assert_eq!(release.config().get("replicaCount"), Some(&serde_json::json!(3)));
        assert_eq!(release.chart().unwrap().templates().len(), 2);
    }

    #[test]
    fn decodes_uncompressed_record() {
        let payload = encode_release(&sample_release("web", 1), false);
        let release = decode_release(payload.as_slice()).unwrap();

        assert_eq!(release.version(), 1);
        assert_eq!(release.status(), Some("deployed"));
    }

    #[test]
    fn tolerates_trailing_newline() {
        let mut payload = encode_release(&sample_release("web", 1), true);
        payload.push(b'\n');
        assert!(decode_release(payload.as_slice()).is_ok());
    }

    #[test]
    fn rejects_bad_base64() {
        let result = decode_release(b"not base64!");
        assert!(matches!(result, Err(Error::ReleaseBase64Decode { .. })));
    }

    #[test]
    fn rejects_truncated_gzip() {
        let compressed = STANDARD
            .decode(encode_release(&sample_release("web", 1), true))
            .unwrap();
        let truncated = b64(&compressed[..compressed.len() / 2]);

        let result = decode_release(truncated.as_bytes());
        assert!(matches!(
            result,
            Err(Error::ReleaseDecompress { .. }) | Err(Error::ReleaseDeserialize { .. })
        ));
    }

    #[test]
    fn rejects_non_release_json() {
        let result = decode_release(b64(b"[1, 2, 3]").as_bytes());
        assert!(matches!(result, Err(Error::ReleaseDeserialize { .. })));
    }
}
