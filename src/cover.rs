//! Set-cover utilities over a neighborhood graph.
//!
//! A cover is a subset of neighborhoods (graph columns) whose union contains
//! every point. Bundle weights feed [`greedy_set_cover`] as per-set costs, so
//! neighborhoods with well-fitted tangents are preferred.

use log::{debug, info};
use rayon::prelude::*;

use crate::error::{Result, TangentError};
use crate::neighborhood::NeighborhoodGraph;

/// Whether the neighborhoods in `subset` (all when `None`) cover every point.
pub fn valid_cover(graph: &NeighborhoodGraph, subset: Option<&[usize]>) -> Result<bool> {
    let m = graph.n_neighborhoods();
    let columns: Vec<usize> = match subset {
        Some(s) => {
            if let Some(&index) = s.iter().find(|&&j| j >= m) {
                return Err(TangentError::IndexOutOfBounds {
                    what: "neighborhoods",
                    index,
                    len: m,
                });
            }
            s.to_vec()
        }
        None => (0..m).collect(),
    };
    Ok(uncovered_count(graph, &columns) == 0)
}

fn uncovered_count(graph: &NeighborhoodGraph, columns: &[usize]) -> usize {
    let mut covered = vec![false; graph.n_points()];
    for &j in columns {
        for &i in graph.members(j) {
            covered[i] = true;
        }
    }
    covered.iter().filter(|&&c| !c).count()
}

/// Weighted greedy set cover.
///
/// At each step picks the neighborhood minimising `weight / newly covered`,
/// ties broken by lowest index, until every point is covered. Returns the
/// chosen column indices in selection order.
///
/// Fails with [`TangentError::IncompleteCover`] when some point belongs to no
/// neighborhood at all.
pub fn greedy_set_cover(graph: &NeighborhoodGraph, weights: &[f64]) -> Result<Vec<usize>> {
    let n = graph.n_points();
    let m = graph.n_neighborhoods();
    if weights.len() != m {
        return Err(TangentError::ShapeMismatch {
            what: "cover weights vs neighborhoods",
            expected: m,
            got: weights.len(),
        });
    }

    let all: Vec<usize> = (0..m).collect();
    let unreachable = uncovered_count(graph, &all);
    if unreachable > 0 {
        return Err(TangentError::IncompleteCover {
            uncovered: unreachable,
            total: n,
        });
    }

    info!("Greedy set cover: N={}, m={}", n, m);

    let mut covered = vec![false; n];
    let mut n_covered = 0usize;
    let mut candidates: Vec<usize> = all;
    let mut solution = Vec::new();

    while n_covered < n {
        let best = candidates
            .par_iter()
            .enumerate()
            .filter_map(|(pos, &j)| {
                let gain = graph.members(j).iter().filter(|&&i| !covered[i]).count();
                (gain > 0).then(|| (pos, j, weights[j] / gain as f64))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2).then(a.1.cmp(&b.1)));

        // Every point is reachable, so some candidate still has a positive gain.
        let Some((pos, j, score)) = best else { break };
        candidates.swap_remove(pos);

        for &i in graph.members(j) {
            if !covered[i] {
                covered[i] = true;
                n_covered += 1;
            }
        }
        debug!(
            "cover step {}: column {} (score {:.4e}), covered {}/{}",
            solution.len(),
            j,
            score,
            n_covered,
            n
        );
        solution.push(j);
    }

    info!("Greedy set cover selected {} of {} neighborhoods", solution.len(), m);
    Ok(solution)
}
