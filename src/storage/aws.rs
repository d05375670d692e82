//! AWS S3 (and S3-compatible) storage backend.
//!
//! Listings use paginated `ListObjectsV2` with `/` as the delimiter and
//! are fully materialised before being returned.  Content URLs are
//! presigned `GetObject` requests.
//!
//! Credentials are resolved via the standard AWS credential chain
//! (env vars, `~/.aws/credentials`, IAM role, etc.) unless explicit
//! static credentials are configured.

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, info};

use super::backend::{Listing, ObjectEntry, StorageBackend};
use crate::config::S3Config;

/// Backend that forwards listing and signing to an S3 bucket.
pub struct AwsBackend {
    /// AWS S3 SDK client.
    client: Client,
    /// The bucket holding the library.
    bucket: String,
}

impl AwsBackend {
    /// Create a new S3 backend from configuration.
    pub async fn new(cfg: &S3Config) -> anyhow::Result<Self> {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(cfg.region.clone()));

        if !cfg.endpoint_url.is_empty() {
            config_loader = config_loader.endpoint_url(&cfg.endpoint_url);
        }

        if !cfg.access_key_id.is_empty() && !cfg.secret_access_key.is_empty() {
            let session_token = if cfg.session_token.is_empty() {
                None
            } else {
                Some(cfg.session_token.clone())
            };
            let creds = aws_sdk_s3::config::Credentials::new(
                &cfg.access_key_id,
                &cfg.secret_access_key,
                session_token,
                None, // expiry
                "mediashelf-config",
            );
            config_loader = config_loader.credentials_provider(creds);
        }

        let sdk_config = config_loader.load().await;

        let s3_config_builder =
            aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(cfg.use_path_style);

        let client = Client::from_conf(s3_config_builder.build());

        info!(
            "S3 backend initialized: bucket={} region={} endpoint='{}'",
            cfg.bucket, cfg.region, cfg.endpoint_url
        );

        Ok(Self {
            client,
            bucket: cfg.bucket.clone(),
        })
    }

    /// Map an AWS SDK error to an anyhow error with context.
    fn map_sdk_error(context: &str, err: impl std::fmt::Display) -> anyhow::Error {
        anyhow::anyhow!("S3 {context}: {err}")
    }
}

impl StorageBackend for AwsBackend {
    fn list_one_level(
        &self,
        prefix: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Listing>> + Send + '_>> {
        let prefix = prefix.to_string();
        Box::pin(async move {
            debug!(
                "S3 list_objects_v2: bucket={} prefix='{}'",
                self.bucket, prefix
            );

            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .delimiter("/");
            if !prefix.is_empty() {
                request = request.prefix(&prefix);
            }

            let mut pages = request.into_paginator().send();
            let mut listing = Listing::default();
            while let Some(page) = pages.next().await {
                let page = page.map_err(|e| Self::map_sdk_error("list_objects_v2", e))?;
                listing.prefixes.extend(
                    page.common_prefixes()
                        .iter()
                        .filter_map(|cp| cp.prefix().map(str::to_string)),
                );
                listing
                    .objects
                    .extend(page.contents().iter().filter_map(|obj| {
                        Some(ObjectEntry {
                            key: obj.key()?.to_string(),
                            size: obj.size().unwrap_or(0).max(0) as u64,
                        })
                    }));
            }

            debug!(
                "S3 list_objects_v2: prefix='{}' prefixes={} objects={}",
                prefix,
                listing.prefixes.len(),
                listing.objects.len()
            );
            Ok(listing)
        })
    }

    fn object_size(
        &self,
        key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<u64>>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            debug!("S3 head_object: bucket={} key={}", self.bucket, key);

            match self
                .client
                .head_object()
                .bucket(&self.bucket)
                .key(&key)
                .send()
                .await
            {
                Ok(resp) => Ok(Some(resp.content_length().unwrap_or(0).max(0) as u64)),
                Err(e) => {
                    let service_err = e.into_service_error();
                    if service_err.is_not_found() {
                        Ok(None)
                    } else {
                        Err(Self::map_sdk_error("head_object", service_err))
                    }
                }
            }
        })
    }

    fn presign_get(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            debug!(
                "S3 presign get_object: bucket={} key={} ttl={}s",
                self.bucket,
                key,
                ttl.as_secs()
            );

            let presigning = PresigningConfig::expires_in(ttl)
                .map_err(|e| Self::map_sdk_error("presigning config", e))?;

            let request = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(&key)
                .presigned(presigning)
                .await
                .map_err(|e| Self::map_sdk_error("presign get_object", e))?;

            Ok(request.uri().to_string())
        })
    }
}

// -- Tests -------------------------------------------------------------------
