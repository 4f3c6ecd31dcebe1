use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;

use crate::config::S3Config;

/// Lifetime of presigned read URLs handed to clients.
pub const PRESIGN_TTL_SECS: u64 = 60 * 60;

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String>;
    /// Canonical (unsigned) URL of an object, stored alongside the key.
    fn object_url(&self, key: &str) -> String;
}

#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
    region: String,
    endpoint: Option<String>,
}

impl Storage {
    pub async fn new(cfg: &S3Config) -> anyhow::Result<Self> {
        let mut loader = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ));
        if let Some(endpoint) = &cfg.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let mut builder = S3ConfigBuilder::from(&shared);
        if let Some(endpoint) = &cfg.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(bucket = %cfg.bucket, region = %cfg.region, endpoint = ?cfg.endpoint, "s3 storage ready");
        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: cfg.bucket.clone(),
            region: cfg.region.clone(),
            endpoint: cfg.endpoint.clone(),
        })
    }
}

#[async_trait]
impl StorageClient for Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("s3 put_object")?;
        Ok(())
    }

    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String> {
        let req = self.client.get_object().bucket(&self.bucket).key(key);
        let presigned = req
            .presigned(PresigningConfig::expires_in(
                std::time::Duration::from_secs(seconds),
            )?)
            .await
            .context("s3 presign_get")?;
        Ok(presigned.uri().to_string())
    }

    fn object_url(&self, key: &str) -> String {
        object_url(&self.bucket, &self.region, self.endpoint.as_deref(), key)
    }
}

pub fn object_url(bucket: &str, region: &str, endpoint: Option<&str>, key: &str) -> String {
    match endpoint {
        Some(ep) => format!("{}/{}/{}", ep.trim_end_matches('/'), bucket, key),
        None => format!("https://{bucket}.s3.{region}.amazonaws.com/{key}"),
    }
}

/// Recover an object key from either a bare key or a stored object URL.
pub fn key_from_url<'a>(bucket: &str, key_or_url: &'a str) -> &'a str {
    if let Some((_, rest)) = key_or_url.split_once("amazonaws.com/") {
        return rest;
    }
    if key_or_url.contains("://") {
        let marker = format!("/{bucket}/");
        if let Some(idx) = key_or_url.find(&marker) {
            return &key_or_url[idx + marker.len()..];
        }
    }
    key_or_url
}

#[cfg(test)]
mod storage_tests {
    use super::*;

    #[test]
    fn aws_object_url_uses_virtual_host() {
        assert_eq!(
            object_url("intake", "eu-west-1", None, "jane@x.io/audio.webm"),
            "https://intake.s3.eu-west-1.amazonaws.com/jane@x.io/audio.webm"
        );
    }

    #[test]
    fn custom_endpoint_object_url_is_path_style() {
        assert_eq!(
            object_url("intake", "us-east-1", Some("http://minio:9000/"), "a/video.mp4"),
            "http://minio:9000/intake/a/video.mp4"
        );
    }

    #[test]
    fn key_from_url_handles_both_forms() {
        assert_eq!(
            key_from_url("intake", "https://intake.s3.eu-west-1.amazonaws.com/jane@x.io/audio.webm"),
            "jane@x.io/audio.webm"
        );
        assert_eq!(
            key_from_url("intake", "http://minio:9000/intake/a/video.mp4"),
            "a/video.mp4"
        );
        assert_eq!(key_from_url("intake", "a/audio.webm"), "a/audio.webm");
    }
}
