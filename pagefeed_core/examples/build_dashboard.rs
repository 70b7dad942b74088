//! Drives a loader over a scripted source, printing what a screen would
//! render after each lifecycle step.
//!
//! ```sh
//! RUST_LOG=debug cargo run -p pagefeed_core --example build_dashboard
//! ```

use pagefeed_api::test_utils::InMemorySource;
use pagefeed_core::{EntryMapper, FeedLoader};

#[derive(Clone)]
struct Build {
    number: u32,
    branch: &'static str,
    minutes: u32,
    passed: bool,
}

impl Build {
    fn new(number: u32, branch: &'static str, minutes: u32, passed: bool) -> Self {
        Self {
            number,
            branch,
            minutes,
            passed,
        }
    }
}

/// Formats builds into the rows a dashboard would show.
struct BuildRow;

impl EntryMapper<Build> for BuildRow {
    type Item = String;

    fn map_entry(&self, build: Build) -> String {
        let status = if build.passed { "ok" } else { "FAILED" };
        format!(
            "#{:<4} {:<12} {:>3}m  {}",
            build.number, build.branch, build.minutes, status
        )
    }
}

type DashboardLoader = FeedLoader<InMemorySource<Build>, BuildRow>;

fn render(step: &str, loader: &DashboardLoader) {
    println!("-- {step} ({})", loader.resource_id());
    for row in loader.items() {
        println!("   {row}");
    }
    if loader.has_more() {
        println!("   ... scroll for more");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let source = InMemorySource::new(vec![
        vec![
            Build::new(128, "main", 14, true),
            Build::new(127, "main", 15, true),
            Build::new(126, "fix/login", 9, false),
        ],
        vec![
            Build::new(125, "main", 14, true),
            Build::new(124, "feat/search", 21, true),
        ],
        vec![Build::new(123, "main", 13, true)],
    ]);
    let loader = FeedLoader::new(source, BuildRow, "ci-token", "ios-app");

    loader.on_start();
    loader.wait_for_idle().await;
    render("started", &loader);

    loader.on_end_of_list_reached(loader.item_count());
    loader.wait_for_idle().await;
    render("scrolled to end", &loader);

    loader.on_refresh();
    loader.wait_for_idle().await;
    render("refreshed", &loader);

    loader.on_stop();
}
