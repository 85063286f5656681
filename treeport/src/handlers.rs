use clap::ArgMatches;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use treeport_client::batch::BatchConfig;
use treeport_client::client::CmsClient;
use treeport_core::crawl::{ReportOptions, ReportOutcome, execute_report};
use treeport_core::map::identity_transform;
use url::Url;

pub fn print_banner() {
    println!(
        "{}",
        r#"
 _                                   _
| |_ _ __ ___  ___ _ __   ___  _ __| |_
| __| '__/ _ \/ _ \ '_ \ / _ \| '__| __|
| |_| | |  __/  __/ |_) | (_) | |  | |_
 \__|_|  \___|\___| .__/ \___/|_|   \__|
                  |_|
"#
        .bright_cyan()
    );
    println!("{}", "  content tree reporter for Optimizely CMS\n".dimmed());
}

/// Expand `~` in the output directory argument.
pub fn resolve_output_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Summary block printed after a successful run.
pub fn format_outcome(outcome: &ReportOutcome) -> String {
    let mut summary = String::new();
    summary.push_str(&format!("  Discovered: {} items\n", outcome.discovered));
    summary.push_str(&format!("  Fetched:    {} items\n", outcome.fetched));
    summary.push_str(&format!("  Groups:     {}\n\n", outcome.files.len()));
    for file in &outcome.files {
        summary.push_str(&format!(
            "  {:<40} {:>6} items  {}\n",
            file.name, file.items, file.file_name
        ));
    }
    summary.push_str(&format!("\n  Index: {}\n", outcome.index_path.display()));
    summary
}

/// Build the API client from the shared connection arguments, scraping the
/// anti-forgery token off the token page when none was given.
async fn build_client(args: &ArgMatches) -> Arc<CmsClient> {
    let base_url = args.get_one::<Url>("base-url").unwrap().clone();
    let timeout = *args.get_one::<u64>("timeout").unwrap();
    let client = CmsClient::with_timeout(base_url, timeout);

    let token = match args.get_one::<String>("token") {
        Some(token) => Some(token.clone()),
        None => {
            let page = args.get_one::<String>("token-page").unwrap();
            let scraped = client.scrape_verification_token(page).await;
            if scraped.is_none() {
                eprintln!(
                    "{} No anti-forgery token found on {}; continuing without one",
                    "!".yellow().bold(),
                    page
                );
            }
            scraped
        }
    };

    Arc::new(client.with_token(token))
}

pub async fn handle_report(args: &ArgMatches) {
    tracing_subscriber::fmt::init();

    let client = build_client(args).await;

    let root_id = args.get_one::<String>("root-id").unwrap().clone();
    let output_dir = resolve_output_dir(args.get_one::<String>("output").unwrap());
    let batch = BatchConfig {
        page_size: *args.get_one::<usize>("batch-size").unwrap(),
        page_delay: Duration::from_secs(*args.get_one::<u64>("delay").unwrap()),
    };
    let level_delay = Duration::from_secs(*args.get_one::<u64>("level-delay").unwrap());
    let include_shared_assets = args.get_flag("shared-assets");

    println!("Crawling content tree from id {}", root_id.bright_white());
    println!("Batch size: {}, page delay: {:?}\n", batch.page_size, batch.page_delay);

    let options = ReportOptions {
        root_id,
        output_dir,
        batch,
        level_delay,
        include_shared_assets,
        show_progress_bar: true,
        row_transform: identity_transform(),
    };

    match execute_report(client, options, None).await {
        Ok(outcome) => {
            println!("\n{} Report complete!\n", "✓".green().bold());
            print!("{}", format_outcome(&outcome));
        }
        Err(e) => {
            eprintln!("{} Report failed: {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub async fn handle_types(args: &ArgMatches) {
    tracing_subscriber::fmt::init();

    let client = build_client(args).await;
    let mut types = client.content_types().await;

    if types.is_empty() {
        eprintln!("{} No content types returned", "✗".red().bold());
        std::process::exit(1);
    }

    types.sort_by(|a, b| a.name.cmp(&b.name));
    println!("{:<8} {:<40} {}", "ID", "NAME", "DISPLAY NAME");
    for info in types {
        println!(
            "{:<8} {:<40} {}",
            info.id.map(|id| id.to_string()).unwrap_or_default(),
            info.name,
            info.display_name.unwrap_or_default()
        );
    }
}

pub async fn handle_resolve(args: &ArgMatches) {
    tracing_subscriber::fmt::init();

    let client = build_client(args).await;
    let link = args.get_one::<String>("permanent-link").unwrap();

    match client.content_by_permanent_link(link).await {
        Some(node) => match serde_json::to_string_pretty(&node) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{} Failed to serialize {}: {}", "✗".red().bold(), link, e);
                std::process::exit(1);
            }
        },
        None => {
            eprintln!("{} No content found for {}", "✗".red().bold(), link);
            std::process::exit(1);
        }
    }
}
