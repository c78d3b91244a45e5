use std::time::Duration;

use async_trait::async_trait;
use leadform_spec::{FormDefinition, FormStatus, FormSummary};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::PersistError;
use crate::repository::FormRepository;

const COLLECTION: &str = "lead-forms";

/// [`FormRepository`] backed by the `/lead-forms` REST collection.
#[derive(Debug, Clone)]
pub struct HttpFormRepository {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Deserialize)]
struct Created {
    #[serde(alias = "_id")]
    id: String,
}

impl HttpFormRepository {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PersistError> {
        let base = Url::parse(base_url).map_err(|err| PersistError::Url(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(PersistError::Url(format!("{base_url} cannot be a base URL")));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, id: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(COLLECTION);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    async fn execute(
        &self,
        method: Method,
        id: Option<&str>,
        body: Option<&FormDefinition>,
    ) -> Result<Vec<u8>, PersistError> {
        let url = self.endpoint(id);
        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.inspect_err(|err| {
            tracing::error!(%method, %url, %err, "lead form request failed");
        })?;
        let status = response.status();
        let bytes = response.bytes().await?.to_vec();

        if status == StatusCode::NOT_FOUND
            && let Some(id) = id
        {
            return Err(PersistError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            tracing::error!(%method, %url, status = status.as_u16(), "lead form request rejected");
            return Err(PersistError::Status {
                status: status.as_u16(),
                body,
            });
        }
        tracing::debug!(%method, %url, status = status.as_u16(), "lead form request done");
        Ok(bytes)
    }
}

/// Decodes a response body that may or may not be wrapped in `{"data": ...}`.
fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PersistError> {
    if let Ok(Envelope { data: Some(data) }) = serde_json::from_slice::<Envelope<T>>(bytes) {
        return Ok(data);
    }
    Ok(serde_json::from_slice(bytes)?)
}

fn as_draft(definition: &FormDefinition) -> FormDefinition {
    FormDefinition {
        status: FormStatus::Draft,
        ..definition.clone()
    }
}

#[async_trait]
impl FormRepository for HttpFormRepository {
    async fn list(&self) -> Result<Vec<FormSummary>, PersistError> {
        let bytes = self.execute(Method::GET, None, None).await?;
        decode(&bytes)
    }

    async fn fetch(&self, id: &str) -> Result<FormDefinition, PersistError> {
        let bytes = self.execute(Method::GET, Some(id), None).await?;
        decode(&bytes)
    }

    async fn create(&self, definition: &FormDefinition) -> Result<String, PersistError> {
        let payload = as_draft(definition);
        let bytes = self.execute(Method::POST, None, Some(&payload)).await?;
        let created: Created = decode(&bytes)?;
        tracing::info!(id = %created.id, "lead form created");
        Ok(created.id)
    }

    async fn update(&self, id: &str, definition: &FormDefinition) -> Result<(), PersistError> {
        let payload = as_draft(definition);
        self.execute(Method::PUT, Some(id), Some(&payload)).await?;
        tracing::info!(%id, "lead form updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_collection_and_id() {
        let repo = HttpFormRepository::new("https://api.example.com/v1/", None, Duration::from_secs(1))
            .expect("repo");
        assert_eq!(
            repo.endpoint(None).as_str(),
            "https://api.example.com/v1/lead-forms"
        );
        assert_eq!(
            repo.endpoint(Some("a b")).as_str(),
            "https://api.example.com/v1/lead-forms/a%20b"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(matches!(
            HttpFormRepository::new("mailto:sales@example.com", None, Duration::from_secs(1)),
            Err(PersistError::Url(_))
        ));
    }

    #[test]
    fn decode_accepts_wrapped_and_bare_bodies() {
        let wrapped: Created = decode(br#"{"data":{"_id":"f1"}}"#).expect("wrapped");
        assert_eq!(wrapped.id, "f1");
        let bare: Created = decode(br#"{"id":"f2"}"#).expect("bare");
        assert_eq!(bare.id, "f2");
    }
}
