//! Non-dominated sorting and crowding distance (Deb et al., 2002).
//!
//! Points are objective vectors already mapped onto a minimization scale
//! (see [`Direction::to_min`]); [`normalize`] does that mapping.

use crate::fitness::Direction;

/// Pareto fronts of a point set.
#[derive(Debug, Clone, PartialEq)]
pub struct Fronts {
    /// Front index of every point; 0 is the non-dominated front.
    pub rank: Vec<usize>,
    /// Point indices grouped by front.
    pub fronts: Vec<Vec<usize>>,
}

/// Pairwise Pareto relation of two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    Dominates,
    DominatedBy,
    Equal,
    Incomparable,
}

/// Compares two minimization points.
pub fn compare(a: &[f64], b: &[f64]) -> Dominance {
    let mut a_wins = false;
    let mut b_wins = false;
    for (&x, &y) in a.iter().zip(b) {
        if x < y {
            a_wins = true;
        } else if y < x {
            b_wins = true;
        }
    }
    match (a_wins, b_wins) {
        (true, false) => Dominance::Dominates,
        (false, true) => Dominance::DominatedBy,
        (false, false) => Dominance::Equal,
        (true, true) => Dominance::Incomparable,
    }
}

/// Whether reward vector `a` dominates `b` under the given directions.
pub fn dominates(a: &[f64], b: &[f64], directions: &[Direction]) -> bool {
    let mut strictly = false;
    for ((&x, &y), &d) in a.iter().zip(b).zip(directions) {
        if d.is_better(y, x) {
            return false;
        }
        strictly |= d.is_better(x, y);
    }
    strictly
}

/// Maps reward vectors onto a minimization scale.
pub fn normalize<'r>(
    rewards: impl IntoIterator<Item = &'r [f64]>,
    directions: &[Direction],
) -> Vec<Vec<f64>> {
    rewards
        .into_iter()
        .map(|r| r.iter().zip(directions).map(|(&v, d)| d.to_min(v)).collect())
        .collect()
}

/// Fast non-dominated sort, `O(m·n²)`.
pub fn non_dominated_sort(points: &[Vec<f64>]) -> Fronts {
    let n = points.len();
    let mut dominated_count = vec![0usize; n];
    let mut dominates_list: Vec<Vec<usize>> = vec![Vec::new(); n];

    for i in 0..n {
        for j in i + 1..n {
            match compare(&points[i], &points[j]) {
                Dominance::Dominates => {
                    dominates_list[i].push(j);
                    dominated_count[j] += 1;
                }
                Dominance::DominatedBy => {
                    dominates_list[j].push(i);
                    dominated_count[i] += 1;
                }
                Dominance::Equal | Dominance::Incomparable => {}
            }
        }
    }

    let mut rank = vec![0usize; n];
    let mut fronts = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|&i| dominated_count[i] == 0).collect();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            rank[i] = fronts.len();
            for &j in &dominates_list[i] {
                dominated_count[j] -= 1;
                if dominated_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        fronts.push(std::mem::replace(&mut current, next));
    }

    Fronts { rank, fronts }
}

/// Crowding distance of every point; boundary points get `+∞`.
pub fn crowding_distance(points: &[Vec<f64>]) -> Vec<f64> {
    let n = points.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }
    let m = points[0].len();
    let mut distance = vec![0.0; n];
    let mut order: Vec<usize> = (0..n).collect();

    for k in 0..m {
        order.sort_by(|&a, &b| points[a][k].total_cmp(&points[b][k]));
        let (first, last) = (order[0], order[n - 1]);
        distance[first] = f64::INFINITY;
        distance[last] = f64::INFINITY;
        let range = points[last][k] - points[first][k];
        if range > 0.0 && range.is_finite() {
            for w in order.windows(3) {
                distance[w[1]] += (points[w[2]][k] - points[w[0]][k]) / range;
            }
        }
    }
    distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fronts() {
        let points = vec![
            vec![1.0, 5.0],
            vec![3.0, 3.0],
            vec![5.0, 1.0],
            vec![4.0, 4.0],
            vec![6.0, 6.0],
        ];
        let sorted = non_dominated_sort(&points);
        assert_eq!(sorted.rank, vec![0, 0, 0, 1, 2]);
        assert_eq!(sorted.fronts, vec![vec![0, 1, 2], vec![3], vec![4]]);
    }

    #[test]
    fn test_equal_points_share_front() {
        let points = vec![vec![2.0, 2.0]; 3];
        assert!(non_dominated_sort(&points).rank.iter().all(|&r| r == 0));
        assert_eq!(compare(&points[0], &points[1]), Dominance::Equal);
    }

    #[test]
    fn test_empty_input() {
        let sorted = non_dominated_sort(&[]);
        assert!(sorted.fronts.is_empty());
        assert!(crowding_distance(&[]).is_empty());
    }

    #[test]
    fn test_dominates_respects_direction() {
        let dirs = [Direction::Maximize, Direction::Minimize];
        assert!(dominates(&[5.0, 1.0], &[4.0, 1.0], &dirs));
        assert!(!dominates(&[5.0, 2.0], &[4.0, 1.0], &dirs));
        assert!(!dominates(&[5.0, 1.0], &[5.0, 1.0], &dirs));
    }

    #[test]
    fn test_crowding_evenly_spaced() {
        let points: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64, 4.0 - i as f64]).collect();
        let d = crowding_distance(&points);
        assert!(d[0].is_infinite() && d[4].is_infinite());
        assert!((d[1] - d[2]).abs() < 1e-12);
        assert!((d[2] - d[3]).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_flips_maximized() {
        let rewards = [vec![3.0, 2.0]];
        let dirs = [Direction::Maximize, Direction::Minimize];
        let points = normalize(rewards.iter().map(Vec::as_slice), &dirs);
        assert_eq!(points, vec![vec![-3.0, 2.0]]);
    }
}
