//! HTTP client for the inventory store REST API

use std::time::Duration;

use async_trait::async_trait;
use invsync_inventory::{BaseObject, ComponentKind, DiffAction};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ClientError, Result};
use crate::records::{BaseObjectRecord, IpAddressQuery, IpAddressRecord};
use crate::traits::InventoryStore;

/// List responses are either a bare array or a page with a `next` link
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Page {
        #[serde(default)]
        next: Option<String>,
        results: Vec<T>,
    },
    Plain(Vec<T>),
}

/// reqwest-backed [`InventoryStore`]
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    /// Default per-request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a store client for the API rooted at `base_url`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid, the key cannot be used as
    /// a header value or the HTTP client cannot be built.
    ///
    /// # Example
    /// ```no_run
    /// use std::time::Duration;
    /// use invsync_client::HttpStore;
    ///
    /// let store = HttpStore::new("https://ralph.local/api", "secret", Duration::from_secs(10))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(base_url: impl AsRef<str>, api_key: &str, timeout: Duration) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Token {api_key}"))
            .map_err(|e| ClientError::InvalidApiKey(e.to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Self::with_client(base_url, client)
    }

    /// Create a store client with a custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(base_url: impl AsRef<str>, client: Client) -> Result<Self> {
        let mut raw = base_url.as_ref().trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw)?;
        Ok(Self { client, base_url })
    }

    /// `<base>/<endpoint>/[<id>/]`
    fn url(&self, endpoint: &str, id: Option<u64>) -> Result<Url> {
        let path = match id {
            Some(id) => format!("{endpoint}/{id}/"),
            None => format!("{endpoint}/"),
        };
        self.base_url.join(&path).map_err(ClientError::Url)
    }

    fn url_with_query(&self, endpoint: &str, key: &str, value: &str) -> Result<Url> {
        let mut url = self.url(endpoint, None)?;
        url.query_pairs_mut().append_pair(key, value);
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, message });
        }
        Ok(response)
    }

    /// GET and deserialize
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let response = Self::check(self.client.get(url).send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET every page of a listing
    async fn get_all<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
        let mut results = Vec::new();
        let mut next = Some(url);

        while let Some(url) = next.take() {
            match self.get::<Listing<T>>(url).await? {
                Listing::Plain(items) => results.extend(items),
                Listing::Page {
                    next: link,
                    results: items,
                } => {
                    results.extend(items);
                    next = link.map(|link| Url::parse(&link)).transpose()?;
                }
            }
        }

        Ok(results)
    }
}

#[async_trait]
impl InventoryStore for HttpStore {
    #[instrument(skip(self), fields(kind = %kind, base_object = %base_object))]
    async fn list_components(
        &self,
        kind: ComponentKind,
        base_object: BaseObject,
    ) -> Result<Vec<Value>> {
        let url = self.url_with_query(
            kind.endpoint(),
            "base_object",
            &base_object.id().to_string(),
        )?;
        self.get_all(url).await
    }

    #[instrument(skip(self), fields(kind = %kind))]
    async fn fetch(&self, kind: ComponentKind, id: u64) -> Result<Value> {
        self.get(self.url(kind.endpoint(), Some(id))?).await
    }

    #[instrument(skip(self))]
    async fn find_base_objects(&self, ip: &str) -> Result<Vec<BaseObjectRecord>> {
        self.get_all(self.url_with_query("base-objects", "ip", ip)?)
            .await
    }

    #[instrument(skip(self))]
    async fn find_ip_addresses(&self, query: &IpAddressQuery) -> Result<Vec<IpAddressRecord>> {
        let (key, value) = query.query_pair();
        self.get_all(self.url_with_query("ipaddresses", key, &value)?)
            .await
    }

    #[instrument(skip(self, payload), fields(kind = %kind))]
    async fn apply(
        &self,
        action: DiffAction,
        kind: ComponentKind,
        id: Option<u64>,
        payload: &Value,
    ) -> Result<u16> {
        let request = match action {
            DiffAction::Create => self.client.post(self.url(kind.endpoint(), None)?).json(payload),
            DiffAction::Update => self.client.patch(self.url(kind.endpoint(), id)?).json(payload),
            DiffAction::Delete => self.client.delete(self.url(kind.endpoint(), id)?),
        };

        let response = Self::check(request.send().await?).await?;
        let status = response.status().as_u16();
        debug!(%action, status, "store accepted change");
        Ok(status)
    }

    fn store_type(&self) -> &'static str {
        "http"
    }
}
