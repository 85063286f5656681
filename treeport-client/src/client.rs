use crate::error::Result;
use crate::model::{ContentNode, ContentTypeInfo, ReferencedContent};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

/// Marker some Stores endpoints prepend to JSON bodies. Not valid JSON;
/// stripped before parsing.
const BODY_MARKER: &str = "{}&&";

/// Client for the CMS Stores API. Lookups degrade to a default value on any
/// network or parse failure so one missing node cannot abort a crawl; the
/// failure is logged and the run continues.
pub struct CmsClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

impl CmsClient {
    pub fn new(base: Url) -> Self {
        Self::with_timeout(base, 10)
    }

    pub fn with_timeout(base: Url, timeout_secs: u64) -> Self {
        let http = Client::builder()
            .user_agent("treeport/0.1")
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(timeout_secs / 2))
            .pool_max_idle_per_host(50)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base,
            token: None,
        }
    }

    /// Anti-forgery token sent as the `requestverificationtoken` header on
    /// every Stores request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Site origin, used to absolutize site-relative URLs in reports.
    pub fn origin(&self) -> String {
        self.base.origin().ascii_serialization()
    }

    fn store_url(&self, store: &str) -> Result<Url> {
        Ok(self.base.join(&format!("/EPiServer/cms/Stores/{store}"))?)
    }

    async fn get_parsed<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);
        let mut request = self.http.get(url);
        if let Some(ref token) = self.token {
            request = request.header("requestverificationtoken", token.as_str());
        }
        let response = request.send().await?.error_for_status()?;
        let body = response.text().await?;
        let body = body.strip_prefix(BODY_MARKER).unwrap_or(&body);
        Ok(serde_json::from_str(body)?)
    }

    /// Single-node lookup by id.
    pub async fn content(&self, id: &str) -> Option<ContentNode> {
        if id.is_empty() {
            return None;
        }
        let url = match self.store_url(&format!("contentdata/{id}")) {
            Ok(url) => url,
            Err(e) => {
                warn!("Bad content URL for {}: {}", id, e);
                return None;
            }
        };
        match self.get_parsed(url).await {
            Ok(node) => Some(node),
            Err(e) => {
                warn!("Failed to fetch content {}: {}", id, e);
                None
            }
        }
    }

    /// Immediate children of a node.
    pub async fn children(&self, id: &str) -> Vec<ContentNode> {
        if id.is_empty() {
            return Vec::new();
        }
        let mut url = match self.store_url("contentstructure/") {
            Ok(url) => url,
            Err(e) => {
                warn!("Bad children URL for {}: {}", id, e);
                return Vec::new();
            }
        };
        url.query_pairs_mut()
            .append_pair("referenceId", id)
            .append_pair("query", "getchildren")
            .append_pair("typeIdentifiers", "episerver.core.icontentdata")
            .append_pair("allLanguages", "true");
        match self.get_parsed(url).await {
            Ok(children) => children,
            Err(e) => {
                warn!("Failed to fetch children of {}: {}", id, e);
                Vec::new()
            }
        }
    }

    /// Everything that links to the given node.
    pub async fn referenced(&self, id: &str) -> Vec<ReferencedContent> {
        if id.is_empty() {
            return Vec::new();
        }
        let mut url = match self.store_url("referenced-content/") {
            Ok(url) => url,
            Err(e) => {
                warn!("Bad referenced-content URL for {}: {}", id, e);
                return Vec::new();
            }
        };
        url.query_pairs_mut().append_pair("ids", id);
        match self.get_parsed(url).await {
            Ok(referenced) => referenced,
            Err(e) => {
                warn!("Failed to fetch references of {}: {}", id, e);
                Vec::new()
            }
        }
    }

    /// Resolve a permanent link to its content node.
    pub async fn content_by_permanent_link(&self, link: &str) -> Option<ContentNode> {
        if link.is_empty() {
            return None;
        }
        let mut url = match self.store_url("contentstructure/") {
            Ok(url) => url,
            Err(e) => {
                warn!("Bad permanent link URL for {}: {}", link, e);
                return None;
            }
        };
        url.query_pairs_mut()
            .append_pair("query", "getcontentbypermanentlink")
            .append_pair("permanentLink", link)
            .append_pair("allLanguages", "true");
        match self.get_parsed(url).await {
            Ok(node) => Some(node),
            Err(e) => {
                warn!("Failed to resolve permanent link {}: {}", link, e);
                None
            }
        }
    }

    /// The content type catalog.
    pub async fn content_types(&self) -> Vec<ContentTypeInfo> {
        let url = match self.store_url("contenttype/") {
            Ok(url) => url,
            Err(e) => {
                warn!("Bad content type URL: {}", e);
                return Vec::new();
            }
        };
        match self.get_parsed(url).await {
            Ok(types) => types,
            Err(e) => {
                warn!("Failed to fetch content types: {}", e);
                Vec::new()
            }
        }
    }

    /// Read the anti-forgery token off an already-authenticated CMS page.
    pub async fn scrape_verification_token(&self, page_path: &str) -> Option<String> {
        let url = match self.base.join(page_path) {
            Ok(url) => url,
            Err(e) => {
                warn!("Bad token page URL {}: {}", page_path, e);
                return None;
            }
        };
        let response = match self.http.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to fetch token page {}: {}", url, e);
                return None;
            }
        };
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read token page {}: {}", url, e);
                return None;
            }
        };

        let document = Html::parse_document(&body);
        let selector = Selector::parse(r#"input[name="__RequestVerificationToken"]"#).unwrap();
        document
            .select(&selector)
            .next()
            .and_then(|input| input.value().attr("value"))
            .map(str::to_string)
    }
}
