//! Elasticsearch REST client

use super::traits::{DocumentWriter, IndexDescriber, IndexMutator, QueryExecutor};
use crate::{ElasticError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Map, Value};
use sieve::config::ElasticConfig;
use sieve::query::CompiledQuery;
use std::time::Duration;
use url::Url;

/// Update results that count as a successful upsert
const UPSERT_RESULTS: &[&str] = &["created", "updated", "noop"];

/// Implements every collaborator trait against one Elasticsearch endpoint
#[derive(Debug, Clone)]
pub struct HttpElasticClient {
    client: Client,
    base_url: Url,
    credentials: Option<(String, Option<String>)>,
}

impl HttpElasticClient {
    pub fn new(url: &str) -> Result<Self> {
        Self::from_config(&ElasticConfig {
            url: url.to_string(),
            ..Default::default()
        })
    }

    pub fn from_config(config: &ElasticConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)?;
        if base_url.cannot_be_a_base() {
            return Err(ElasticError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url,
            credentials: config
                .username
                .clone()
                .map(|user| (user, config.password.clone())),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, password.as_ref()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ElasticError::Status { status, body })
    }
}

#[async_trait]
impl IndexDescriber for HttpElasticClient {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self
            .request(Method::HEAD, self.endpoint(&[index]))
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(ElasticError::Status {
                status: status.as_u16(),
                body: String::new(),
            }),
        }
    }

    async fn get_mapping(&self, index: &str) -> Result<Option<Value>> {
        let request = self.request(Method::GET, self.endpoint(&[index, "_mapping"]));
        match self.send(request).await {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn get_settings(&self, index: &str) -> Result<Value> {
        let mut url = self.endpoint(&[index, "_settings"]);
        url.query_pairs_mut().append_pair("include_defaults", "true");
        let response = self.send(self.request(Method::GET, url)).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl IndexMutator for HttpElasticClient {
    async fn create_index(&self, index: &str) -> Result<()> {
        self.send(self.request(Method::PUT, self.endpoint(&[index])))
            .await?;
        tracing::info!(index, "created index");
        Ok(())
    }

    async fn put_total_fields_limit(&self, index: &str, limit: u64) -> Result<()> {
        let body = json!({"index": {"mapping": {"total_fields": {"limit": limit}}}});
        let request = self
            .request(Method::PUT, self.endpoint(&[index, "_settings"]))
            .json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<bool> {
        let request = self
            .request(Method::PUT, self.endpoint(&[index, "_mapping"]))
            .json(mapping);
        let response: Value = self.send(request).await?.json().await?;
        Ok(acknowledged(&response))
    }
}

#[async_trait]
impl QueryExecutor for HttpElasticClient {
    async fn search(&self, query: &CompiledQuery) -> Result<Value> {
        let request = self
            .request(Method::POST, self.endpoint(&[query.index.as_str(), "_search"]))
            .json(&query.body);
        let response = match self.send(request).await {
            Ok(response) => response,
            Err(err) if err.is_not_found() => {
                return Err(ElasticError::IndexNotFound(query.index.clone()))
            }
            Err(err) => return Err(err),
        };
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DocumentWriter for HttpElasticClient {
    async fn upsert(&self, index: &str, id: &str, document: &Map<String, Value>) -> Result<bool> {
        let body = json!({"doc": document, "upsert": document});
        let request = self
            .request(Method::POST, self.endpoint(&[index, "_update", id]))
            .json(&body);
        let response: Value = self.send(request).await?.json().await?;
        Ok(upsert_succeeded(&response))
    }
}

pub(crate) fn acknowledged(response: &Value) -> bool {
    response
        .get("acknowledged")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

pub(crate) fn upsert_succeeded(response: &Value) -> bool {
    response
        .get("result")
        .and_then(Value::as_str)
        .is_some_and(|result| UPSERT_RESULTS.contains(&result))
}
