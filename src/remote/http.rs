//! HTTP document store client
//!
//! Talks to a hosted document store over a small REST protocol:
//!
//! ```text
//! GET    {base}/v1/collections/{collection}/documents/{id}   -> 200 doc | 404
//! PUT    {base}/v1/collections/{collection}/documents/{id}   <- doc
//! DELETE {base}/v1/collections/{collection}/documents/{id}
//! GET    {base}/v1/collections/{collection}/documents        -> { "documents": [...] }
//! POST   {base}/v1/collections/{collection}:query            <- { "filters": [...] }
//! ```

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::query::StructuredQuery;
use crate::config::RemoteConfig;
use crate::error::AppError;
use crate::sync::{Entity, RemoteStore};

/// Envelope for collection listings and query results.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentList<E> {
    pub documents: Vec<E>,
}

/// Remote store adapter for one collection.
pub struct HttpDocumentStore<E> {
    http_client: reqwest::Client,
    /// Base URL without trailing slash
    base_url: String,
    api_key: Option<String>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for HttpDocumentStore<E> {
    fn clone(&self) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            _entity: PhantomData,
        }
    }
}

/// Build the shared HTTP client for all collections.
pub fn build_http_client(config: &RemoteConfig) -> Result<reqwest::Client, AppError> {
    let mut builder = reqwest::Client::builder().user_agent("goodfood-sync/0.1.0");
    if config.timeout_seconds > 0 {
        builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
    }
    Ok(builder.build()?)
}

impl<E: Entity> HttpDocumentStore<E> {
    pub fn new(http_client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            _entity: PhantomData,
        }
    }

    pub fn from_config(http_client: reqwest::Client, config: &RemoteConfig) -> Self {
        Self::new(http_client, &config.base_url, config.api_key.clone())
    }

    fn collection_url(&self) -> String {
        format!("{}/v1/collections/{}", self.base_url, E::KIND)
    }

    fn document_url(&self, id: &str) -> String {
        format!(
            "{}/documents/{}",
            self.collection_url(),
            urlencoding::encode(id)
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.http_client.request(method, url);
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn run_query(&self, query: &StructuredQuery) -> Result<Vec<E>, AppError> {
        let url = format!("{}:query", self.collection_url());
        let response = self.request(Method::POST, &url).json(query).send().await?;
        let list: DocumentList<E> = ensure_success(response, E::KIND, "query")
            .await?
            .json()
            .await?;
        Ok(list.documents)
    }
}

async fn ensure_success(
    response: Response,
    collection: &str,
    operation: &str,
) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Remote(format!(
        "{operation} on {collection} failed: HTTP {status}{}",
        if body.is_empty() {
            String::new()
        } else {
            format!(" ({})", body.trim())
        }
    )))
}

#[async_trait]
impl<E: Entity> RemoteStore<E> for HttpDocumentStore<E> {
    async fn get(&self, id: &str) -> Result<Option<E>, AppError> {
        let response = self
            .request(Method::GET, &self.document_url(id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document = ensure_success(response, E::KIND, "get")
            .await?
            .json::<E>()
            .await?;
        Ok(Some(document))
    }

    async fn put(&self, entity: &E) -> Result<(), AppError> {
        let response = self
            .request(Method::PUT, &self.document_url(entity.id()))
            .json(entity)
            .send()
            .await?;
        ensure_success(response, E::KIND, "put").await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let response = self
            .request(Method::DELETE, &self.document_url(id))
            .send()
            .await?;

        // already gone is as good as deleted
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        ensure_success(response, E::KIND, "delete").await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<E>, AppError> {
        let url = format!("{}/documents", self.collection_url());
        let response = self.request(Method::GET, &url).send().await?;
        let list: DocumentList<E> = ensure_success(response, E::KIND, "list")
            .await?
            .json()
            .await?;
        Ok(list.documents)
    }

    async fn query_by_foreign_key(&self, fk: &str) -> Result<Vec<E>, AppError> {
        let field = E::FOREIGN_KEY_FIELD.ok_or_else(|| {
            AppError::Validation(format!("{} has no foreign key", E::KIND))
        })?;
        self.run_query(&StructuredQuery::equals(field, fk)).await
    }

    async fn query_by_prefix(&self, field: &str, prefix: &str) -> Result<Vec<E>, AppError> {
        self.run_query(&StructuredQuery::starts_with(field, prefix))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Recipe;

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let store: HttpDocumentStore<Recipe> =
            HttpDocumentStore::new(reqwest::Client::new(), "https://docs.example.com/", None);

        assert_eq!(
            store.collection_url(),
            "https://docs.example.com/v1/collections/recipes"
        );
        assert_eq!(
            store.document_url("a b/c"),
            "https://docs.example.com/v1/collections/recipes/documents/a%20b%2Fc"
        );
    }
}
