use crate::cover::{greedy_set_cover, valid_cover};
use crate::data::PointCloud;
use crate::error::TangentError;
use crate::neighborhood::{NeighborhoodGraph, neighborhood_graph};
use crate::tests::init;

use super::test_data::{make_circle_hd, unit_square};

#[test]
fn test_valid_cover_on_unit_square() {
    let points = unit_square();
    let graph = neighborhood_graph(&points, 0.6, None).unwrap();

    assert!(valid_cover(&graph, None).unwrap());
    assert!(valid_cover(&graph, Some(&[0, 2])).unwrap());
    assert!(!valid_cover(&graph, Some(&[0])).unwrap());
    assert!(!valid_cover(&graph, Some(&[])).unwrap());
    assert_eq!(
        valid_cover(&graph, Some(&[0, 9])).unwrap_err(),
        TangentError::IndexOutOfBounds {
            what: "neighborhoods",
            index: 9,
            len: 4
        }
    );
}

#[test]
fn test_greedy_cover_uniform_weights_prefers_lowest_index() {
    init();
    let points = unit_square();
    let graph = neighborhood_graph(&points, 0.6, None).unwrap();

    // Every column covers three corners; after column 0 only corner 2 is left.
    let cover = greedy_set_cover(&graph, &[1.0; 4]).unwrap();
    assert_eq!(cover, vec![0, 1]);
    assert!(valid_cover(&graph, Some(&cover)).unwrap());
}

#[test]
fn test_greedy_cover_follows_weights() {
    let points = unit_square();
    let graph = neighborhood_graph(&points, 0.6, None).unwrap();

    let cover = greedy_set_cover(&graph, &[10.0, 1.0, 1.0, 1.0]).unwrap();
    assert_eq!(cover, vec![1, 2]);
    assert!(!cover.contains(&0));
}

#[test]
fn test_greedy_cover_on_circle_is_valid_and_small() {
    let points = PointCloud::from_rows(&make_circle_hd(90, 0.0, 2, 0)).unwrap();
    let graph = neighborhood_graph(&points, 0.1, None).unwrap();
    let cover = greedy_set_cover(&graph, &vec![1.0; 90]).unwrap();

    assert!(valid_cover(&graph, Some(&cover)).unwrap());
    assert!(cover.len() < 90 / 3, "cover too large: {}", cover.len());
    let mut dedup = cover.clone();
    dedup.sort_unstable();
    dedup.dedup();
    assert_eq!(dedup.len(), cover.len());
}

#[test]
fn test_greedy_cover_reports_unreachable_points() {
    let graph = NeighborhoodGraph::from_columns(3, vec![0, 1], vec![vec![0], vec![1]]).unwrap();
    assert_eq!(
        greedy_set_cover(&graph, &[1.0, 1.0]).unwrap_err(),
        TangentError::IncompleteCover {
            uncovered: 1,
            total: 3
        }
    );
}

#[test]
fn test_greedy_cover_checks_weight_length() {
    let points = unit_square();
    let graph = neighborhood_graph(&points, 0.6, None).unwrap();
    assert!(matches!(
        greedy_set_cover(&graph, &[1.0; 3]).unwrap_err(),
        TangentError::ShapeMismatch { expected: 4, got: 3, .. }
    ));
}
