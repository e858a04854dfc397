//! Class-size targets for one construction

use rand::seq::index;
use rand::Rng;

/// Split `number_of_elements` into `number_of_classes` non-empty sizes
///
/// Sizes are a uniformly random composition: `k - 1` distinct cut points
/// are drawn from the `n - 1` gaps between elements. Callers guarantee
/// `1 <= k <= n`.
pub fn class_sizes<R: Rng>(
    number_of_elements: usize,
    number_of_classes: usize,
    rng: &mut R,
) -> Vec<usize> {
    debug_assert!(number_of_classes >= 1 && number_of_classes <= number_of_elements);
    if number_of_classes <= 1 {
        return vec![number_of_elements];
    }

    let mut cuts = index::sample(rng, number_of_elements - 1, number_of_classes - 1).into_vec();
    cuts.sort_unstable();

    let mut sizes = Vec::with_capacity(number_of_classes);
    let mut previous = 0;
    for cut in cuts {
        let boundary = cut + 1;
        sizes.push(boundary - previous);
        previous = boundary;
    }
    sizes.push(number_of_elements - previous);
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_sizes_cover_all_elements() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let sizes = class_sizes(17, 5, &mut rng);
            assert_eq!(sizes.len(), 5);
            assert_eq!(sizes.iter().sum::<usize>(), 17);
            assert!(sizes.iter().all(|&s| s >= 1));
        }
    }

    #[test]
    fn test_edge_cases() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        assert_eq!(class_sizes(6, 1, &mut rng), vec![6]);
        assert_eq!(class_sizes(4, 4, &mut rng), vec![1, 1, 1, 1]);
    }
}
