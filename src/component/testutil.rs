//! Component fixtures shared by unit tests

use crate::component::{Component, PageKey, PageRecord};
use crate::config::Config;
use std::collections::HashMap;

/// Builds a component from terse page and link descriptions. A page is
/// `(lang, id, redirect_target)`.
pub fn simple_component(
    pages: &[(&str, u32, Option<(&str, u32)>)],
    links: &[((&str, u32), (&str, u32))],
    config: &Config,
) -> Component {
    let mut records = HashMap::new();
    for &(lang, id, redirect) in pages {
        let key = PageKey::new(lang, id);
        records.insert(
            key.clone(),
            PageRecord {
                key,
                namespace: 0,
                title: None,
                redirect: redirect.map(|(l, i)| PageKey::new(l, i)),
            },
        );
    }
    let links = links
        .iter()
        .map(|&((fl, fi), (tl, ti))| (PageKey::new(fl, fi), PageKey::new(tl, ti)))
        .collect();
    Component::new("test-component", records, links, config).unwrap()
}

/// The canonical incoherent fixture: five pages where de and fr each appear
/// twice, six unit-weight links, minimum cut weight 2 with clusters
/// {en:1, de:2, fr:4} and {de:3, fr:5} (or the symmetric pairing).
pub fn incoherent_five(config: &Config) -> Component {
    simple_component(
        &[
            ("en", 1, None),
            ("de", 2, None),
            ("de", 3, None),
            ("fr", 4, None),
            ("fr", 5, None),
        ],
        &[
            (("en", 1), ("de", 2)),
            (("en", 1), ("de", 3)),
            (("en", 1), ("fr", 4)),
            (("en", 1), ("fr", 5)),
            (("de", 2), ("fr", 4)),
            (("de", 3), ("fr", 5)),
        ],
        config,
    )
}

/// Asserts the partition is valid: every core page in exactly one cluster,
/// no cluster holding two core pages of one language.
pub fn assert_valid_partition(comp: &Component) {
    use std::collections::HashSet;

    let mut seen: HashMap<u32, HashSet<String>> = HashMap::new();
    for key in comp.core_pages() {
        let cluster = comp.cluster_of(key);
        let langs = seen.entry(cluster).or_default();
        assert!(
            langs.insert(key.lang.clone()),
            "cluster {cluster} holds two {} pages",
            key.lang
        );
    }
}

/// Asserts the optimal outcome for the fixture: two coherent clusters pairing de:2
/// with fr:4 and de:3 with fr:5 (en:1 joining either side), cut weight 2.
pub fn assert_five_page_outcome(comp: &Component) {
    assert_valid_partition(comp);
    let cluster = |l: &str, i: u32| comp.cluster_of(&PageKey::new(l, i));
    assert_eq!(cluster("de", 2), cluster("fr", 4));
    assert_eq!(cluster("de", 3), cluster("fr", 5));
    assert_ne!(cluster("de", 2), cluster("de", 3));
    assert!(cluster("en", 1) == cluster("de", 2) || cluster("en", 1) == cluster("de", 3));
    let crossing = comp.crossing_edges();
    assert!((comp.cut_cost(&crossing) - 2.0).abs() < 1e-9);
}
