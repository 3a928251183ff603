use std::{path::Path, time::Duration};

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use reqwest::Client;
use serde::Deserialize;

const UPLOAD_ATTEMPTS: u32 = 3;
const UPLOAD_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    AlreadyExists,
}

#[derive(Debug, Deserialize)]
struct UploadReply {
    ok: bool,
}

/// Posts the log file, base64 encoded, to `endpoint` with its file name as
/// the `name` query parameter.
pub async fn upload_log(client: &Client, endpoint: &str, path: &Path) -> anyhow::Result<UploadOutcome> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("Log path has no file name: {}", path.display()))?;
    let body = URL_SAFE.encode(tokio::fs::read(path).await?);

    let mut last_error = None;
    for attempt in 1..=UPLOAD_ATTEMPTS {
        if attempt > 1 {
            info!("Waiting {:?} before upload attempt #{}", UPLOAD_DELAY, attempt);
            tokio::time::sleep(UPLOAD_DELAY).await;
        }

        info!("Uploading log file {:?}...", name);
        let result = async {
            client
                .post(endpoint)
                .query(&[("name", name.as_str())])
                .body(body.clone())
                .send()
                .await?
                .json::<UploadReply>()
                .await
        }
        .await;

        match result {
            Ok(UploadReply { ok: true }) => {
                info!("Done uploading log file {:?}", name);
                return Ok(UploadOutcome::Uploaded);
            }
            Ok(UploadReply { ok: false }) => {
                info!("Log file {:?} already exists", name);
                return Ok(UploadOutcome::AlreadyExists);
            }
            Err(e) => {
                error!("Log upload attempt #{} failed: {}", attempt, e);
                last_error = Some(e);
            }
        }
    }

    Err(anyhow::anyhow!(
        "Couldn't upload log file {:?} after {} attempts: {}",
        name,
        UPLOAD_ATTEMPTS,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_shape() {
        let reply: UploadReply = serde_json::from_str(r#"{"ok": false, "msg": "exists"}"#).unwrap();
        assert!(!reply.ok);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = Client::new();
        let result = upload_log(&client, "http://127.0.0.1:9/upload", &dir.path().join("missing.log")).await;
        assert!(result.is_err());
    }
}
