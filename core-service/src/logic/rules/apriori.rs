//! Apriori frequent itemset mining over a boolean item matrix

use std::collections::HashSet;

use ndarray::ArrayView2;

/// Item column indices (ascending) with their support
#[derive(Debug, Clone, PartialEq)]
pub struct FrequentItemset {
    pub items: Vec<usize>,
    pub support: f64,
}

/// All itemsets whose support is at least `min_support`, level by level
/// (singletons first), each level in lexicographic item order.
pub fn apriori(matrix: ArrayView2<bool>, min_support: f64) -> Vec<FrequentItemset> {
    let n_rows = matrix.nrows();
    if n_rows == 0 {
        return Vec::new();
    }

    let support = |items: &[usize]| -> f64 {
        let hits = matrix
            .rows()
            .into_iter()
            .filter(|row| items.iter().all(|&i| row[i]))
            .count();
        hits as f64 / n_rows as f64
    };

    let mut frequent = Vec::new();
    let mut level: Vec<FrequentItemset> = (0..matrix.ncols())
        .map(|i| FrequentItemset { items: vec![i], support: support(&[i]) })
        .filter(|s| s.support >= min_support)
        .collect();

    while !level.is_empty() {
        let candidates = generate_candidates(&level);
        frequent.append(&mut level);

        level = candidates
            .into_iter()
            .map(|items| {
                let s = support(&items);
                FrequentItemset { items, support: s }
            })
            .filter(|s| s.support >= min_support)
            .collect();
    }

    frequent
}

/// Join itemsets sharing all but their last item, then drop any candidate
/// with an infrequent subset.
fn generate_candidates(level: &[FrequentItemset]) -> Vec<Vec<usize>> {
    let known: HashSet<&[usize]> = level.iter().map(|s| s.items.as_slice()).collect();
    let mut candidates = Vec::new();

    for (i, a) in level.iter().enumerate() {
        for b in &level[i + 1..] {
            let k = a.items.len();
            if a.items[..k - 1] != b.items[..k - 1] {
                continue;
            }

            let (x, y) = (a.items[k - 1], b.items[k - 1]);
            let mut candidate = a.items[..k - 1].to_vec();
            candidate.push(x.min(y));
            candidate.push(x.max(y));

            let all_subsets_frequent = (0..candidate.len()).all(|skip| {
                let subset: Vec<usize> = candidate
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != skip)
                    .map(|(_, v)| *v)
                    .collect();
                known.contains(subset.as_slice())
            });

            if all_subsets_frequent {
                candidates.push(candidate);
            }
        }
    }

    candidates.sort();
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_supports_are_row_fractions() {
        let m = array![
            [true, true, false],
            [true, false, false],
            [true, true, true],
            [false, true, false]
        ];
        let sets = apriori(m.view(), 0.25);

        let find = |items: &[usize]| sets.iter().find(|s| s.items == items).map(|s| s.support);
        assert_eq!(find(&[0]), Some(0.75));
        assert_eq!(find(&[1]), Some(0.75));
        assert_eq!(find(&[2]), Some(0.25));
        assert_eq!(find(&[0, 1]), Some(0.5));
        assert_eq!(find(&[0, 1, 2]), Some(0.25));
    }

    #[test]
    fn test_min_support_filters() {
        let m = array![
            [true, true, false],
            [true, false, false],
            [true, true, true],
            [false, true, false]
        ];
        let sets = apriori(m.view(), 0.5);

        assert!(sets.iter().all(|s| s.support >= 0.5));
        assert!(!sets.iter().any(|s| s.items.contains(&2)));
        assert_eq!(sets.len(), 3);
    }

    #[test]
    fn test_levels_are_ordered() {
        let m = array![[true, true, true], [true, true, true]];
        let sets = apriori(m.view(), 0.1);

        let sizes: Vec<usize> = sets.iter().map(|s| s.items.len()).collect();
        assert_eq!(sizes, vec![1, 1, 1, 2, 2, 2, 3]);
        assert_eq!(sets[3].items, vec![0, 1]);
        assert_eq!(sets[5].items, vec![1, 2]);
    }

    #[test]
    fn test_empty_matrix() {
        let m = ndarray::Array2::<bool>::from_elem((0, 4), false);
        assert!(apriori(m.view(), 0.2).is_empty());
    }
}
