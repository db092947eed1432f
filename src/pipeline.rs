use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use tracing::{info, warn};
use url::Url;

use crate::config::Settings;
use crate::db::Store;
use crate::fetch::PageSource;
use crate::parser;

/// Counters for one rebuild of the store.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub pages: usize,
    pub pages_failed: usize,
    pub tables: usize,
    pub inserted: usize,
    pub skipped: usize,
}

impl RunStats {
    pub fn print(&self) {
        println!(
            "Saved {} boards from {} tables on {} pages ({} tables skipped, {} pages failed).",
            self.inserted, self.tables, self.pages, self.skipped, self.pages_failed,
        );
    }
}

/// Wipe the store and repopulate it from the directory page and every
/// borough page it links to.
///
/// Failing to read the directory page aborts the run and leaves the store as
/// it was. A borough page that cannot be fetched or decoded is skipped.
pub fn run(source: &dyn PageSource, store: &mut Store, settings: &Settings) -> Result<RunStats> {
    let root = Url::parse(&settings.root_url)
        .with_context(|| format!("Invalid root URL {:?}", settings.root_url))?;

    let mut writer = store.rebuild()?;

    info!("Fetching borough list: {}", root);
    let html = source.fetch(&root).context("Failed to fetch directory page")?;
    let links = parser::links::discover_links(&Html::parse_document(&html), &root, &settings.content_region)
        .context("Directory page layout changed")?;
    info!("Found {} borough pages", links.len());

    let pb = ProgressBar::new(links.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut stats = RunStats::default();
    for link in &links {
        stats.pages += 1;
        pb.set_message(link.path().to_string());

        let page = match source.fetch(link) {
            Ok(html) => parser::process_page(&html),
            Err(e) => {
                warn!("Skipping {}: {:#}", link, e);
                stats.pages_failed += 1;
                pb.inc(1);
                continue;
            }
        };
        let page = match page {
            Ok(page) => page,
            Err(e) => {
                warn!("Skipping {}: {}", link, e);
                stats.pages_failed += 1;
                pb.inc(1);
                continue;
            }
        };

        info!("{}: {} of {} tables parsed", page.borough, page.records.len(), page.tables);
        stats.tables += page.tables;
        stats.skipped += page.skipped.len();
        for record in &page.records {
            writer.insert(record)?;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    stats.inserted = writer.commit()?;
    Ok(stats)
}
