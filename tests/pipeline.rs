//! End-to-end pipeline: JSONL corpus -> component discovery -> coherence
//! clustering -> stored meanings and positions.

use interwiki_analyzer::cluster::{
    self, BetweennessCalculator, CancelFlag, CliquesCalculator, GeneticCalculator,
    MeaningCalculator, NewmanGirvanCalculator, RandomBaseline,
};
use interwiki_analyzer::config::Config;
use interwiki_analyzer::data;
use interwiki_analyzer::index::{ComponentFinder, OverlayKind};
use interwiki_analyzer::layout;
use interwiki_analyzer::repo::MemoryRepository;
use interwiki_analyzer::{PageKey, Repository};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

fn write_lines(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    path
}

/// Corpus with one incoherent component (the five-page scenario plus a
/// redirect riding along), one coherent pair, one isolated page, and one
/// dangling language link.
fn loaded_repository() -> MemoryRepository {
    let dir = tempfile::tempdir().unwrap();
    let pages = write_lines(
        dir.path(),
        "pages.jsonl",
        &[
            r#"{"key": "en:1", "title": "Carbon"}"#,
            r#"{"key": "de:2", "title": "Kohlenstoff"}"#,
            r#"{"key": "de:3", "title": "Graphit"}"#,
            r#"{"key": "fr:4", "title": "Carbone"}"#,
            r#"{"key": "fr:5", "title": "Graphite"}"#,
            r#"{"key": "fr:9", "title": "C (element)"}"#,
            r#"{"key": "en:10", "title": "Helium"}"#,
            r#"{"key": "de:11", "title": "Helium"}"#,
            r#"{"key": "pl:20", "title": "Hel"}"#,
        ],
    );
    let redirects = write_lines(
        dir.path(),
        "redirects.jsonl",
        &[r#"{"from": "fr:9", "to": "fr:4"}"#],
    );
    let langlinks = write_lines(
        dir.path(),
        "langlinks.jsonl",
        &[
            r#"{"from": "en:1", "to": "de:2"}"#,
            r#"{"from": "en:1", "to": "de:3"}"#,
            r#"{"from": "en:1", "to": "fr:4"}"#,
            r#"{"from": "en:1", "to": "fr:5"}"#,
            r#"{"from": "en:1", "to": "fr:9"}"#,
            r#"{"from": "de:2", "to": "fr:4"}"#,
            r#"{"from": "de:3", "to": "fr:5"}"#,
            r#"{"from": "en:10", "to": "de:11"}"#,
            r#"{"from": "en:10", "to": "es:99"}"#,
        ],
    );

    let mut repo = MemoryRepository::new();
    data::load_corpus(&mut repo, &pages, Some(&redirects), &langlinks, None, None).unwrap();
    repo
}

fn discovered_repository() -> MemoryRepository {
    let mut repo = loaded_repository();
    let stats = ComponentFinder::new(&mut repo).run(OverlayKind::Linked).unwrap();
    assert_eq!(stats.components, 2);
    assert_eq!(stats.incoherent, 1);
    assert_eq!(stats.dangling, 1);
    repo
}

fn key(text: &str) -> PageKey {
    PageKey::parse(text).unwrap()
}

fn assert_carbon_meanings(repo: &MemoryRepository, id: &str, authority: &str) {
    let meanings = repo.get_component_page_meanings(id, authority).unwrap();
    assert_eq!(meanings.len(), 6, "every member gets a meaning");
    // The redirect follows its target.
    assert_eq!(meanings[&key("fr:9")], meanings[&key("fr:4")]);
    // Minimal cuts pair de:2 with fr:4 and de:3 with fr:5.
    assert_eq!(meanings[&key("de:2")], meanings[&key("fr:4")]);
    assert_eq!(meanings[&key("de:3")], meanings[&key("fr:5")]);
    assert_ne!(meanings[&key("de:2")], meanings[&key("de:3")]);
    assert!(
        meanings[&key("en:1")] == meanings[&key("de:2")]
            || meanings[&key("en:1")] == meanings[&key("de:3")]
    );
}

fn incoherent_id(repo: &MemoryRepository) -> String {
    let ids = repo.get_incoherent(None, None).unwrap();
    assert_eq!(ids.len(), 1);
    ids[0].clone()
}

#[test]
fn discovery_separates_and_classifies_components() {
    let repo = discovered_repository();
    let id = incoherent_id(&repo);
    let pages = repo.get_component_pages(&id).unwrap();
    assert_eq!(pages.len(), 6);
    // The coherent helium pair was saved too, just not flagged.
    assert_eq!(repo.component_count(), 2);
    // The isolated pl:20 page belongs to no component.
    assert!(!pages.contains_key(&key("pl:20")));
}

#[test]
fn every_strategy_restores_coherence() {
    let config = Config {
        seed: Some(13),
        ..Config::default()
    };
    let strategies: Vec<Box<dyn MeaningCalculator>> = vec![
        Box::new(BetweennessCalculator::new(&config)),
        Box::new(NewmanGirvanCalculator::new(&config, CancelFlag::new())),
        Box::new(CliquesCalculator::new(&config)),
        Box::new(GeneticCalculator::new(&config, CancelFlag::new())),
    ];
    for mut calc in strategies {
        let mut repo = discovered_repository();
        let stored = cluster::process_all(&mut repo, calc.as_mut(), &config, false).unwrap();
        assert_eq!(stored, 1, "{} processed the incoherent component", calc.name());
        let id = incoherent_id(&repo);
        assert_carbon_meanings(&repo, &id, calc.authority());
    }
}

#[test]
fn meaning_ids_are_deterministic_across_runs() {
    let config = Config::default();
    let mut first = discovered_repository();
    let mut second = discovered_repository();
    let mut calc = BetweennessCalculator::new(&config);
    cluster::process_all(&mut first, &mut calc, &config, false).unwrap();
    cluster::process_all(&mut second, &mut calc, &config, false).unwrap();
    let id = incoherent_id(&first);
    assert_eq!(
        first.get_component_page_meanings(&id, calc.authority()).unwrap(),
        second.get_component_page_meanings(&id, calc.authority()).unwrap(),
    );
}

#[test]
fn baseline_reports_without_storing() {
    let config = Config {
        seed: Some(4),
        ..Config::default()
    };
    let mut repo = discovered_repository();
    let mut baseline = RandomBaseline::new(&config);
    cluster::process_all(&mut repo, &mut baseline, &config, false).unwrap();
    let stats = baseline.last_stats().unwrap();
    assert!(stats.min <= stats.avg && stats.avg <= stats.max);
    let id = incoherent_id(&repo);
    let meanings = repo.get_component_page_meanings(&id, baseline.authority()).unwrap();
    assert!(meanings.is_empty());
}

#[test]
fn size_bounds_exclude_components() {
    let config = Config {
        min_component_size: Some(6),
        ..Config::default()
    };
    let mut repo = discovered_repository();
    let mut calc = BetweennessCalculator::new(&config);
    let stored = cluster::process_all(&mut repo, &mut calc, &config, false).unwrap();
    // The incoherent component has 5 non-redirect pages, below the bound.
    assert_eq!(stored, 0);
}

#[test]
fn layout_persists_core_page_positions() {
    let config = Config {
        seed: Some(21),
        ..Config::default()
    };
    let mut repo = discovered_repository();
    let id = incoherent_id(&repo);
    let energy = layout::layout_component(&mut repo, &id, &config).unwrap();
    assert!(energy.is_finite());
    let positions = repo.get_component_page_positions(&id).unwrap();
    // Core pages only; the fr:9 redirect is not laid out.
    assert_eq!(positions.len(), 5);
    assert!(!positions.contains_key(&key("fr:9")));
    for (_, (x, y, z)) in positions {
        assert!(x.is_finite() && y.is_finite());
        assert_eq!(z, 0.0);
    }
}

#[test]
fn results_survive_a_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store.json");
    let config = Config::default();
    let mut repo = discovered_repository();
    let mut calc = CliquesCalculator::new(&config);
    cluster::process_all(&mut repo, &mut calc, &config, false).unwrap();
    repo.save(&store).unwrap();

    let reloaded = MemoryRepository::load(&store).unwrap();
    let id = incoherent_id(&reloaded);
    assert_carbon_meanings(&reloaded, &id, calc.authority());
    assert_eq!(reloaded.page_count(), repo.page_count());
}
