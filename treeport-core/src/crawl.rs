use crate::error::ReportError;
use crate::map::{self, ReportRow, RowTransform};
use crate::report::{self, GroupFile};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;
use treeport_client::batch::{BatchConfig, fetch_in_batches};
use treeport_client::client::CmsClient;
use treeport_client::traverse::Traverser;

/// Options for one report run.
pub struct ReportOptions {
    pub root_id: String,
    pub output_dir: PathBuf,
    pub batch: BatchConfig,
    pub level_delay: Duration,
    pub include_shared_assets: bool,
    pub show_progress_bar: bool,
    pub row_transform: RowTransform,
}

/// Callback for per-item fetch progress: (fetched, total).
pub type FetchProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Summary of a finished run.
pub struct ReportOutcome {
    pub discovered: usize,
    pub fetched: usize,
    pub files: Vec<GroupFile>,
    pub index_path: PathBuf,
}

/// Run the whole pipeline: walk the tree, resolve reverse references, fetch
/// full records in batches, group by type name, map rows and write the
/// report files.
pub async fn execute_report(
    client: Arc<CmsClient>,
    options: ReportOptions,
    progress_callback: Option<FetchProgressCallback>,
) -> Result<ReportOutcome, ReportError> {
    let ReportOptions {
        root_id,
        output_dir,
        batch,
        level_delay,
        include_shared_assets,
        show_progress_bar,
        row_transform,
    } = options;

    let progress_bar = if show_progress_bar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Walking the content tree...");
        Some(pb)
    } else {
        None
    };

    let traverser = Traverser::new(client.clone())
        .with_level_delay(level_delay)
        .with_shared_assets(include_shared_assets);

    let all = traverser.descendants_and_self(&root_id).await?;
    let discovered = all.len();
    info!("Discovered {} content items under {}", discovered, root_id);

    let ids: Vec<String> = all.iter().map(|node| node.content_link.clone()).collect();

    if let Some(ref pb) = progress_bar {
        pb.set_message(format!("Resolving references for {} items...", ids.len()));
        pb.tick();
    }

    let referenced: Vec<_> = fetch_in_batches(&ids, &batch, |id| {
        let client = client.clone();
        async move { Some(client.referenced(&id).await) }
    })
    .await
    .into_iter()
    .flatten()
    .flatten()
    .collect();

    let referenced_index = map::to_index(referenced, |entry| entry.content_link.clone())?;

    let fetched_count = Arc::new(AtomicUsize::new(0));
    let total = ids.len();

    let nodes: Vec<_> = fetch_in_batches(&ids, &batch, |id| {
        let client = client.clone();
        let fetched_count = fetched_count.clone();
        let progress_callback = progress_callback.clone();
        let progress_bar = progress_bar.clone();
        async move {
            let node = client.content(&id).await;
            let done = fetched_count.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref callback) = progress_callback {
                callback(done, total);
            }
            if let Some(ref pb) = progress_bar {
                pb.set_message(format!("Fetching content... {}/{}", done, total));
                pb.tick();
            }
            node
        }
    })
    .await
    .into_iter()
    .flatten()
    .collect();

    let fetched = nodes.len();
    info!("Fetched {} of {} content items", fetched, total);

    let origin = client.origin();
    let grouped = map::group_by(nodes, |node| node.type_name().to_string());

    let mut groups: Vec<(String, Vec<ReportRow>)> = grouped
        .into_iter()
        .map(|(name, nodes)| {
            let rows = nodes
                .iter()
                .map(|node| row_transform(map::map_general(node, &referenced_index, &origin)))
                .collect();
            (name, rows)
        })
        .collect();
    groups.sort_by(|(a, _), (b, _)| a.cmp(b));

    let files = report::write_report(&output_dir, &groups)?;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Report complete: {} items in {} groups",
            fetched,
            files.len()
        ));
    }

    Ok(ReportOutcome {
        discovered,
        fetched,
        files,
        index_path: output_dir.join("index.html"),
    })
}
