//! Retrieval metrics over a precomputed distance matrix.
//!
//! Row `i` of the matrix holds the distances from test item `i` to every
//! training item; smaller means more similar. An item is relevant to a query
//! when their labels are equal.

use crate::error::{Result, SimpleError};

/// Mean average precision over all test rows.
///
/// Training items are ranked by ascending distance. Average precision follows
/// the step-wise definition `Σ (Rₙ - Rₙ₋₁) · Pₙ` taken over distinct distance
/// thresholds, so items at tied distances enter the ranking together. NaN
/// distances rank after every number and tie with each other.
///
/// # Errors
/// - [`SimpleError::EmptyInput`] for zero test rows.
/// - [`SimpleError::ShapeMismatch`] if the matrix does not have one row per
///   test label and one column per training label.
/// - [`SimpleError::NoRelevantItem`] if a test label never occurs in training.
pub fn mean_average_precision<L: PartialEq>(
    dist_matrix: &[Vec<f64>],
    train_labels: &[L],
    test_labels: &[L],
) -> Result<f64> {
    check_shape(dist_matrix, train_labels, test_labels)?;

    let mut total = 0.0;
    for (row, (distances, label)) in dist_matrix.iter().zip(test_labels).enumerate() {
        let relevant: Vec<bool> = train_labels.iter().map(|l| l == label).collect();
        total += average_precision(distances, &relevant)
            .ok_or(SimpleError::NoRelevantItem { row })?;
    }
    Ok(total / test_labels.len() as f64)
}

/// Mean rank of the first relevant training item.
///
/// Ranks are 0-based positions in the ascending-distance order (stable, so
/// equal distances keep training order); a perfect system scores 0.
///
/// # Errors
/// Same conditions as [`mean_average_precision`].
pub fn mean_first_rank<L: PartialEq>(
    dist_matrix: &[Vec<f64>],
    train_labels: &[L],
    test_labels: &[L],
) -> Result<f64> {
    check_shape(dist_matrix, train_labels, test_labels)?;

    let mut sum_rank = 0usize;
    for (row, (distances, label)) in dist_matrix.iter().zip(test_labels).enumerate() {
        let rank = ranking(distances)
            .iter()
            .position(|&j| train_labels[j] == *label)
            .ok_or(SimpleError::NoRelevantItem { row })?;
        sum_rank += rank;
    }
    Ok(sum_rank as f64 / test_labels.len() as f64)
}

fn check_shape<L>(dist_matrix: &[Vec<f64>], train_labels: &[L], test_labels: &[L]) -> Result<()> {
    if test_labels.is_empty() {
        return Err(SimpleError::EmptyInput);
    }
    let bad_row = dist_matrix.iter().find(|r| r.len() != train_labels.len());
    if dist_matrix.len() != test_labels.len() || bad_row.is_some() {
        return Err(SimpleError::ShapeMismatch {
            rows: dist_matrix.len(),
            cols: bad_row.or(dist_matrix.first()).map_or(0, Vec::len),
            test_labels: test_labels.len(),
            train_labels: train_labels.len(),
        });
    }
    Ok(())
}

/// Training indices ordered by ascending distance (stable).
///
/// Uses the IEEE total order, so a NaN distance ranks after every number.
fn ranking(distances: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..distances.len()).collect();
    order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));
    order
}

/// Average precision of one row, `None` if nothing is relevant.
fn average_precision(distances: &[f64], relevant: &[bool]) -> Option<f64> {
    let n_relevant = relevant.iter().filter(|&&r| r).count();
    if n_relevant == 0 {
        return None;
    }

    let order = ranking(distances);
    let mut ap = 0.0;
    let mut hits = 0usize;
    let mut prev_recall = 0.0;
    let mut k = 0;
    while k < order.len() {
        // Consume every item tied at this distance as one threshold
        let threshold = distances[order[k]];
        let tied = |d: f64| d == threshold || (d.is_nan() && threshold.is_nan());
        while k < order.len() && tied(distances[order[k]]) {
            hits += usize::from(relevant[order[k]]);
            k += 1;
        }
        let precision = hits as f64 / k as f64;
        let recall = hits as f64 / n_relevant as f64;
        ap += (recall - prev_recall) * precision;
        prev_recall = recall;
    }
    Some(ap)
}
