use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::storage::location::is_hidden_object;
use crate::storage::{ObjectBytes, StoredObject};

/// S3-backed object store using the default AWS credential chain.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&config),
        }
    }

    /// Read one object, or every visible object under a prefix in key order.
    ///
    /// A key with no object behind it is retried as the prefix `key/`, so
    /// `s3://bucket/data` reads the objects under `data/`.
    pub async fn read_objects(
        &self,
        bucket: &str,
        key: &str,
        is_prefix: bool,
    ) -> Result<Vec<StoredObject>> {
        let keys = if is_prefix {
            self.list_keys(bucket, key).await?
        } else {
            if let Some(object) = self.get_object(bucket, key).await? {
                return Ok(vec![object]);
            }
            let prefix = as_prefix(key);
            debug!(bucket, key, prefix = %prefix, "no object at key, listing it as a prefix");
            self.list_keys(bucket, &prefix).await?
        };

        let mut objects = Vec::with_capacity(keys.len());
        for key in keys {
            match self.get_object(bucket, &key).await? {
                Some(object) => objects.push(object),
                None => {
                    return Err(ProcessingError::storage(
                        format!("s3://{}/{}", bucket, key),
                        "object removed while reading prefix",
                    ))
                }
            }
        }
        Ok(objects)
    }

    async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let location = format!("s3://{}/{}", bucket, prefix);
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket).prefix(prefix);
            if let Some(token) = &continuation {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| ProcessingError::storage(&location, DisplayErrorContext(e)))?;

            for object in response.contents() {
                let Some(key) = object.key() else { continue };
                let name = key.rsplit('/').next().unwrap_or(key);
                if key.ends_with('/') || is_hidden_object(name) {
                    continue;
                }
                keys.push(key.to_string());
            }

            match response.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        keys.sort();
        debug!(location = %location, objects = keys.len(), "listed S3 prefix");
        Ok(keys)
    }

    /// `None` when the bucket has no object at `key`.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<StoredObject>> {
        let location = format!("s3://{}/{}", bucket, key);
        let object = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(object) => object,
            Err(e) if e.as_service_error().is_some_and(GetObjectError::is_no_such_key) => {
                return Ok(None)
            }
            Err(e) => return Err(ProcessingError::storage(&location, DisplayErrorContext(e))),
        };

        let bytes = object
            .body
            .collect()
            .await
            .map_err(|e| ProcessingError::storage(&location, e))?
            .into_bytes();

        debug!(location = %location, bytes = bytes.len(), "read S3 object");
        Ok(Some(StoredObject {
            location,
            bytes: ObjectBytes::Owned(bytes.to_vec()),
        }))
    }

    pub async fn write_object(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        let location = format!("s3://{}/{}", bucket, key);
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| ProcessingError::storage(&location, DisplayErrorContext(e)))?;

        debug!(location = %location, bytes = size, "wrote S3 object");
        Ok(())
    }
}

fn as_prefix(key: &str) -> String {
    if key.is_empty() || key.ends_with('/') {
        key.to_string()
    } else {
        format!("{}/", key)
    }
}
