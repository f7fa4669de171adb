//! JSON Lines corpus ingestion
//!
//! One record per line; page keys are serialized `lang:id`. Blank lines are
//! skipped, anything else that fails to parse aborts the load with the
//! offending line number.

use crate::component::{PageKey, PageRecord};
use crate::repo::MemoryRepository;
use anyhow::Context;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PageLine {
    key: PageKey,
    #[serde(default)]
    namespace: i32,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PairLine {
    from: PageKey,
    to: PageKey,
}

#[derive(Debug, Deserialize)]
struct CategoryLine {
    page: PageKey,
    category: String,
}

#[derive(Debug, Deserialize)]
struct OutlinkLine {
    page: PageKey,
    target: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LoadStats {
    pub pages: usize,
    pub redirects: usize,
    pub lang_links: usize,
    pub categories: usize,
    pub outlinks: usize,
}

fn each_line<T, F>(path: &Path, mut apply: F) -> anyhow::Result<usize>
where
    T: for<'de> Deserialize<'de>,
    F: FnMut(T),
{
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut count = 0;
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: T = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", path.display(), number + 1))?;
        apply(record);
        count += 1;
    }
    Ok(count)
}

pub fn load_pages(repo: &mut MemoryRepository, path: &Path) -> anyhow::Result<usize> {
    each_line(path, |line: PageLine| {
        repo.insert_page(PageRecord {
            key: line.key,
            namespace: line.namespace,
            title: line.title,
            redirect: None,
        });
    })
}

pub fn load_redirects(repo: &mut MemoryRepository, path: &Path) -> anyhow::Result<usize> {
    each_line(path, |line: PairLine| {
        repo.insert_redirect(line.from, line.to);
    })
}

pub fn load_lang_links(repo: &mut MemoryRepository, path: &Path) -> anyhow::Result<usize> {
    each_line(path, |line: PairLine| {
        repo.insert_lang_link(line.from, line.to);
    })
}

pub fn load_categories(repo: &mut MemoryRepository, path: &Path) -> anyhow::Result<usize> {
    each_line(path, |line: CategoryLine| {
        repo.insert_category(line.page, line.category);
    })
}

pub fn load_outlinks(repo: &mut MemoryRepository, path: &Path) -> anyhow::Result<usize> {
    each_line(path, |line: OutlinkLine| {
        repo.insert_outlink(line.page, line.target);
    })
}

/// Loads a full corpus. Categories and outlinks are optional; double
/// redirects are collapsed once everything is in.
pub fn load_corpus(
    repo: &mut MemoryRepository,
    pages: &Path,
    redirects: Option<&Path>,
    lang_links: &Path,
    categories: Option<&Path>,
    outlinks: Option<&Path>,
) -> anyhow::Result<LoadStats> {
    let mut stats = LoadStats {
        pages: load_pages(repo, pages)?,
        ..LoadStats::default()
    };
    if let Some(path) = redirects {
        stats.redirects = load_redirects(repo, path)?;
    }
    stats.lang_links = load_lang_links(repo, lang_links)?;
    if let Some(path) = categories {
        stats.categories = load_categories(repo, path)?;
    }
    if let Some(path) = outlinks {
        stats.outlinks = load_outlinks(repo, path)?;
    }
    repo.remove_double_redirects();
    log::info!(
        "Loaded {} pages, {} redirects, {} language links",
        stats.pages,
        stats.redirects,
        stats.lang_links
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_lines(dir: &Path, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        path
    }

    #[test]
    fn corpus_round_trips_through_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let pages = write_lines(
            dir.path(),
            "pages.jsonl",
            &[
                r#"{"key": "en:1", "title": "Carbon"}"#,
                r#"{"key": "de:2", "title": "Kohlenstoff"}"#,
                "",
                r#"{"key": "de:3"}"#,
            ],
        );
        let links = write_lines(
            dir.path(),
            "langlinks.jsonl",
            &[r#"{"from": "en:1", "to": "de:2"}"#],
        );
        let redirects = write_lines(
            dir.path(),
            "redirects.jsonl",
            &[r#"{"from": "de:3", "to": "de:2"}"#],
        );

        let mut repo = MemoryRepository::new();
        let stats =
            load_corpus(&mut repo, &pages, Some(&redirects), &links, None, None).unwrap();
        assert_eq!(stats.pages, 3);
        assert_eq!(stats.redirects, 1);
        assert_eq!(stats.lang_links, 1);
        assert_eq!(repo.page_count(), 3);
    }

    #[test]
    fn malformed_lines_report_their_position() {
        let dir = tempfile::tempdir().unwrap();
        let pages = write_lines(
            dir.path(),
            "pages.jsonl",
            &[r#"{"key": "en:1"}"#, r#"{"key": 17}"#],
        );
        let mut repo = MemoryRepository::new();
        let err = load_pages(&mut repo, &pages).unwrap_err();
        assert!(format!("{err:#}").contains("pages.jsonl:2"));
    }
}
