use crate::batch::paced;
use crate::client::CmsClient;
use crate::error::{ClientError, Result};
use crate::model::ContentNode;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Well-known id of the site root; its assetsFolderLink is the shared
/// "for all sites" folder reachable from every page that uses it.
const SITE_ROOT_ID: &str = "1";

/// Walks the content tree. The ignore set is the only cycle defense: it
/// covers the shared assets folder, which is the one known alias point in
/// the tree. Arbitrary cycles elsewhere are not detected.
pub struct Traverser {
    client: Arc<CmsClient>,
    level_delay: Duration,
    include_shared_assets: bool,
    cancel: Arc<AtomicBool>,
}

impl Traverser {
    pub fn new(client: Arc<CmsClient>) -> Self {
        Self {
            client,
            level_delay: Duration::ZERO,
            include_shared_assets: false,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Minimum duration of each level fan-out; throttles the request rate
    /// against the server.
    pub fn with_level_delay(mut self, delay: Duration) -> Self {
        self.level_delay = delay;
        self
    }

    /// Also walk the shared assets folder (excluded by default).
    pub fn with_shared_assets(mut self, include: bool) -> Self {
        self.include_shared_assets = include;
        self
    }

    /// Raise the flag to stop descending; in-flight requests still finish.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Every node below `id`, depth-first per child: a node's children come
    /// first, then their assets subtrees, then their own descendants. Ids in
    /// `ignore` are not expanded.
    pub fn descendants<'a>(
        &'a self,
        id: Option<String>,
        ignore: &'a HashSet<String>,
    ) -> BoxFuture<'a, Vec<ContentNode>> {
        async move {
            let Some(id) = id.filter(|id| !id.is_empty()) else {
                return Vec::new();
            };
            if ignore.contains(&id) || self.cancel.load(Ordering::Relaxed) {
                return Vec::new();
            }

            let children = self.client.children(&id).await;
            debug!("{}: {} children", id, children.len());

            let assets = paced(
                self.level_delay,
                future::join_all(
                    children
                        .iter()
                        .map(|child| self.descendants(child.assets_folder_link.clone(), ignore)),
                ),
            )
            .await;

            let deeper = paced(
                self.level_delay,
                future::join_all(children.iter().map(|child| {
                    if child.has_children {
                        self.descendants(Some(child.content_link.clone()), ignore)
                    } else {
                        future::ready(Vec::new()).boxed()
                    }
                })),
            )
            .await;

            let mut found = children;
            found.extend(assets.into_iter().flatten());
            found.extend(deeper.into_iter().flatten());
            found
        }
        .boxed()
    }

    /// The root node itself plus everything below it. The shared assets
    /// folder is excluded, or, when `with_shared_assets(true)` was set,
    /// walked once and appended.
    pub async fn descendants_and_self(&self, id: &str) -> Result<Vec<ContentNode>> {
        let shared_assets = self.shared_assets_folder_link().await;
        let ignore: HashSet<String> = shared_assets.iter().cloned().collect();

        let root = self
            .client
            .content(id)
            .await
            .ok_or_else(|| ClientError::ContentNotFound(id.to_string()))?;

        let assets = self
            .descendants(root.assets_folder_link.clone(), &ignore)
            .await;
        let deeper = self.descendants(Some(id.to_string()), &ignore).await;

        let mut found = vec![root];
        found.extend(assets);
        found.extend(deeper);

        if let Some(link) = shared_assets {
            if self.include_shared_assets {
                info!("Including shared assets folder {}", link);
                let no_ignores = HashSet::new();
                if let Some(folder) = self.client.content(&link).await {
                    found.push(folder);
                }
                found.extend(self.descendants(Some(link), &no_ignores).await);
            } else {
                info!("Excluding shared assets folder {}", link);
            }
        }

        Ok(found)
    }

    async fn shared_assets_folder_link(&self) -> Option<String> {
        self.client
            .content(SITE_ROOT_ID)
            .await
            .and_then(|root| root.assets_folder_link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn traverser_for(server: &MockServer) -> Traverser {
        Traverser::new(Arc::new(CmsClient::new(Url::parse(&server.uri()).unwrap())))
    }

    async fn mock_content(server: &MockServer, id: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/EPiServer/cms/Stores/contentdata/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    async fn mock_children(server: &MockServer, id: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path("/EPiServer/cms/Stores/contentstructure/"))
            .and(query_param("referenceId", id))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn ignored_ids_are_not_expanded() {
        // No server needed: an ignored id must return before any request.
        let client = Arc::new(CmsClient::new(Url::parse("http://127.0.0.1:1").unwrap()));
        let traverser = Traverser::new(client);
        let ignore: HashSet<String> = ["9".to_string()].into_iter().collect();

        let found = traverser.descendants(Some("9".to_string()), &ignore).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn absent_ids_yield_empty() {
        let client = Arc::new(CmsClient::new(Url::parse("http://127.0.0.1:1").unwrap()));
        let traverser = Traverser::new(client);
        let ignore = HashSet::new();

        assert!(traverser.descendants(None, &ignore).await.is_empty());
        assert!(
            traverser
                .descendants(Some(String::new()), &ignore)
                .await
                .is_empty()
        );
    }

    #[tokio::test]
    async fn cancel_flag_stops_descent() {
        let client = Arc::new(CmsClient::new(Url::parse("http://127.0.0.1:1").unwrap()));
        let cancel = Arc::new(AtomicBool::new(true));
        let traverser = Traverser::new(client).with_cancel_flag(cancel);
        let ignore = HashSet::new();

        let found = traverser.descendants(Some("1".to_string()), &ignore).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn walks_children_assets_and_descendants_in_order() {
        let server = MockServer::start().await;

        mock_content(
            &server,
            "1",
            r#"{}&&{"contentLink":"1","name":"Root","assetsFolderLink":"5","hasChildren":true}"#,
        )
        .await;
        mock_children(
            &server,
            "1",
            r#"{}&&[
                {"contentLink":"10","name":"Section","hasChildren":true},
                {"contentLink":"11","name":"Leaf","hasChildren":false,"assetsFolderLink":"5"}
            ]"#,
        )
        .await;
        mock_children(&server, "10", r#"{}&&[{"contentLink":"100","name":"Child"}]"#).await;

        // The shared folder must never be listed.
        Mock::given(method("GET"))
            .and(path("/EPiServer/cms/Stores/contentstructure/"))
            .and(query_param("referenceId", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}&&[]"))
            .expect(0)
            .mount(&server)
            .await;

        let traverser = traverser_for(&server);
        let found = traverser.descendants_and_self("1").await.unwrap();

        let links: Vec<&str> = found.iter().map(|node| node.content_link.as_str()).collect();
        assert_eq!(links, vec!["1", "10", "11", "100"]);
    }

    #[tokio::test]
    async fn shared_assets_can_be_included() {
        let server = MockServer::start().await;

        mock_content(
            &server,
            "1",
            r#"{}&&{"contentLink":"1","name":"Root","assetsFolderLink":"5","hasChildren":false}"#,
        )
        .await;
        mock_content(
            &server,
            "5",
            r#"{}&&{"contentLink":"5","name":"For All Sites","hasChildren":true}"#,
        )
        .await;
        mock_children(&server, "1", "{}&&[]").await;
        mock_children(&server, "5", r#"{}&&[{"contentLink":"50","name":"Logo"}]"#).await;

        let traverser = traverser_for(&server).with_shared_assets(true);
        let found = traverser.descendants_and_self("1").await.unwrap();

        let links: Vec<&str> = found.iter().map(|node| node.content_link.as_str()).collect();
        assert_eq!(links, vec!["1", "5", "50"]);
    }

    #[tokio::test]
    async fn missing_root_is_an_error() {
        let server = MockServer::start().await;
        // contentdata/1 and contentdata/404 both unmocked: lookups degrade to
        // None and the root fetch surfaces the only hard traversal error.
        let traverser = traverser_for(&server);

        let result = traverser.descendants_and_self("404").await;
        assert!(matches!(result, Err(ClientError::ContentNotFound(id)) if id == "404"));
    }
}
