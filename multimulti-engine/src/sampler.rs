use rand::Rng;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;

/// Les poids nuls, négatifs ou non finis sont ramenés à ce plancher.
pub const MIN_WEIGHT: f64 = 1e-6;

fn clamp_weight(w: f64) -> f64 {
    if w.is_finite() { w.max(MIN_WEIGHT) } else { MIN_WEIGHT }
}

/// Tirage pondéré sans remise de `count` numéros dans `pool`.
///
/// Le pool est dédoublonné ; si `count >= pool.len()` il est rendu en entier.
/// Le résultat est toujours trié par ordre croissant.
pub fn weighted_pick<R, W>(pool: &[u8], weight: W, count: usize, rng: &mut R) -> Vec<u8>
where
    R: Rng + ?Sized,
    W: Fn(u8) -> f64,
{
    let mut available: Vec<u8> = Vec::with_capacity(pool.len());
    for &n in pool {
        if !available.contains(&n) {
            available.push(n);
        }
    }

    if count >= available.len() {
        available.sort_unstable();
        return available;
    }

    let mut selected = Vec::with_capacity(count);

    for _ in 0..count {
        let weights: Vec<f64> = available.iter().map(|&n| clamp_weight(weight(n))).collect();
        let idx = match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(rng),
            Err(e) => {
                // Somme des poids infinie : tirage uniforme
                log::warn!("Poids inutilisables ({e}), tirage uniforme");
                rng.random_range(0..available.len())
            }
        };
        selected.push(available.remove(idx));
    }

    selected.sort_unstable();
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_count_above_pool_returns_pool_sorted() {
        let mut rng = StdRng::seed_from_u64(42);
        let picked = weighted_pick(&[9, 3, 7, 3, 1], |_| 1.0, 10, &mut rng);
        assert_eq!(picked, vec![1, 3, 7, 9]);

        let picked = weighted_pick(&[5, 2], |_| 1.0, 2, &mut rng);
        assert_eq!(picked, vec![2, 5]);
    }

    #[test]
    fn test_exact_count_without_duplicates() {
        let pool: Vec<u8> = (1..=80).collect();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = weighted_pick(&pool, |n| n as f64, 10, &mut rng);
            assert_eq!(picked.len(), 10);
            assert!(picked.windows(2).all(|w| w[0] < w[1]), "non trié ou doublon : {picked:?}");
            assert!(picked.iter().all(|n| pool.contains(n)));
        }
    }

    #[test]
    fn test_all_zero_weights_still_sample() {
        let pool: Vec<u8> = (1..=20).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let picked = weighted_pick(&pool, |_| 0.0, 5, &mut rng);
        assert_eq!(picked.len(), 5);

        let picked = weighted_pick(&pool, |_| f64::NAN, 5, &mut rng);
        assert_eq!(picked.len(), 5);
    }

    #[test]
    fn test_heavy_weight_dominates() {
        let pool: Vec<u8> = (1..=20).collect();
        let mut hits = 0;
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = weighted_pick(&pool, |n| if n == 13 { 1e6 } else { 1.0 }, 1, &mut rng);
            if picked == vec![13] {
                hits += 1;
            }
        }
        assert!(hits >= 95, "13 tiré {hits}/100 fois");
    }

    #[test]
    fn test_huge_weights_still_sample() {
        let pool: Vec<u8> = (1..=10).collect();
        let mut rng = StdRng::seed_from_u64(5);
        let picked = weighted_pick(&pool, |_| f64::MAX, 4, &mut rng);
        assert_eq!(picked.len(), 4);
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_seed_determinism() {
        let pool: Vec<u8> = (1..=80).collect();
        let a = weighted_pick(&pool, |n| 1.0 + n as f64, 10, &mut StdRng::seed_from_u64(123));
        let b = weighted_pick(&pool, |n| 1.0 + n as f64, 10, &mut StdRng::seed_from_u64(123));
        assert_eq!(a, b);
    }
}
