//! Force-model page layout
//!
//! Assigns 2D coordinates to a component's core pages by minimizing a
//! spring energy: every resolved link pulls its endpoints toward a short
//! rest distance, every same-language pair pushes apart toward a long one.
//! Coordinates are interleaved `[x0, y0, x1, y1, ..]` in one flat array.

use crate::component::{Component, PageKey};
use crate::config::Config;
use crate::error::Result;
use crate::repo::Repository;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Half-width of the box initial positions are drawn from.
pub const INIT_BOX: f64 = 10.0;
/// Rest distance of a link spring.
pub const LINK_DISTANCE: f64 = 1.0;
/// Rest distance of a same-language repulsion spring.
pub const SEPARATION_DISTANCE: f64 = 10.0;
/// Strength of the same-language repulsion relative to a unit-weight link.
pub const REPULSION: f64 = 10.0;

const DESCENT_STEPS: usize = 500;
const DESCENT_RATE: f64 = 0.01;

/// The differentiable energy of one component's layout. Node order matches
/// the component's sorted core pages.
pub struct LayoutObjective {
    keys: Vec<PageKey>,
    links: Vec<(usize, usize, f64)>,
    /// Unordered same-language core page pairs.
    pairs: Vec<(usize, usize)>,
}

impl LayoutObjective {
    pub fn new(comp: &Component) -> Self {
        let keys: Vec<PageKey> = comp.core_pages().to_vec();
        let index_of = |key: &PageKey| keys.binary_search(key).unwrap_or(usize::MAX);

        let links = comp
            .core_links()
            .iter()
            .enumerate()
            .map(|(edge, (a, b))| (index_of(a), index_of(b), comp.weight(edge)))
            .collect();

        let mut pairs = Vec::new();
        for a in 0..keys.len() {
            for b in a + 1..keys.len() {
                if keys[a].lang == keys[b].lang {
                    pairs.push((a, b));
                }
            }
        }

        Self { keys, links, pairs }
    }

    pub fn node_count(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[PageKey] {
        &self.keys
    }

    /// Uniform random positions inside the initial box.
    pub fn random_positions(&self, rng: &mut StdRng) -> Array1<f64> {
        Array1::from_iter(
            (0..2 * self.keys.len()).map(|_| rng.random_range(-INIT_BOX..INIT_BOX)),
        )
    }

    pub fn energy(&self, positions: &Array1<f64>) -> f64 {
        let mut value = 0.0;
        for &(a, b, weight) in &self.links {
            let r = distance(positions, a, b);
            value += weight * (r - LINK_DISTANCE).powi(2);
        }
        for &(a, b) in &self.pairs {
            let r = distance(positions, a, b);
            value += 2.0 * REPULSION * (r - SEPARATION_DISTANCE).powi(2);
        }
        value
    }

    pub fn gradient(&self, positions: &Array1<f64>) -> Array1<f64> {
        let mut gradient = Array1::zeros(positions.len());
        for &(a, b, weight) in &self.links {
            accumulate(positions, &mut gradient, a, b, 2.0 * weight, LINK_DISTANCE);
        }
        for &(a, b) in &self.pairs {
            accumulate(
                positions,
                &mut gradient,
                a,
                b,
                4.0 * REPULSION,
                SEPARATION_DISTANCE,
            );
        }
        gradient
    }

    /// Fixed-step gradient descent with step halving on overshoot.
    /// Returns the final energy.
    pub fn descend(&self, positions: &mut Array1<f64>) -> f64 {
        let mut rate = DESCENT_RATE;
        let mut energy = self.energy(positions);
        for _ in 0..DESCENT_STEPS {
            let gradient = self.gradient(positions);
            let candidate = &*positions - &(&gradient * rate);
            let next = self.energy(&candidate);
            if next < energy {
                *positions = candidate;
                energy = next;
            } else {
                rate /= 2.0;
                if rate < 1e-12 {
                    break;
                }
            }
        }
        energy
    }
}

fn distance(positions: &Array1<f64>, a: usize, b: usize) -> f64 {
    let dx = positions[2 * a] - positions[2 * b];
    let dy = positions[2 * a + 1] - positions[2 * b + 1];
    (dx * dx + dy * dy).sqrt().max(1e-9)
}

/// Adds the gradient of `factor / 2 * (r - rest)^2` for both endpoints.
fn accumulate(
    positions: &Array1<f64>,
    gradient: &mut Array1<f64>,
    a: usize,
    b: usize,
    factor: f64,
    rest: f64,
) {
    let r = distance(positions, a, b);
    let scale = factor * (r - rest) / r;
    let dx = positions[2 * a] - positions[2 * b];
    let dy = positions[2 * a + 1] - positions[2 * b + 1];
    gradient[2 * a] += scale * dx;
    gradient[2 * a + 1] += scale * dy;
    gradient[2 * b] -= scale * dx;
    gradient[2 * b + 1] -= scale * dy;
}

/// Computes and persists positions for one component, replacing whatever
/// was stored before. Returns the final layout energy.
pub fn layout_component(
    repo: &mut dyn Repository,
    id: &str,
    config: &Config,
) -> Result<f64> {
    let pages = repo.get_component_pages(id)?;
    let links = repo.get_component_lang_links(id)?;
    let comp = Component::new(id, pages, links, config)?;

    let objective = LayoutObjective::new(&comp);
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut positions = objective.random_positions(&mut rng);
    let energy = objective.descend(&mut positions);
    log::info!("Layout energy: {id} {energy:.2}");

    repo.delete_page_positions(id)?;
    for (node, key) in objective.keys().iter().enumerate() {
        let position = (positions[2 * node], positions[2 * node + 1], 0.0);
        repo.insert_page_position(key, id, position)?;
    }
    Ok(energy)
}
