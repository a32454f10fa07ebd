use proptest::prelude::*;

use tailsplit_core::RngHandle;
use tailsplit_sampler::population::Population;
use tailsplit_sampler::selection::select_and_resample;
use tailsplit_sampler::threshold;

#[test]
fn resampled_population_keeps_size_and_clears_threshold() {
    let mut rng = RngHandle::from_seed(11);
    let population = Population::standard_normal(1000, 3, &mut rng);
    let statistics = population.statistics();
    let u = threshold::estimate(&statistics).unwrap().threshold;

    let selected = select_and_resample(population, &statistics, u, &mut rng).unwrap();
    assert_eq!(selected.population.rows(), 1000);
    assert_eq!(selected.population.dimension(), 3);
    assert_eq!(selected.survivors, 500);
    assert!(selected.population.statistics().iter().all(|&s| s >= u));
}

#[test]
fn resampled_rows_are_copies_of_survivors() {
    let population = Population::from_values(4, 2, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0])
        .unwrap();
    let survivors: Vec<Vec<f64>> = vec![vec![2.0, 2.0], vec![3.0, 3.0]];
    let statistics = population.statistics();
    let mut rng = RngHandle::from_seed(5);

    let selected = select_and_resample(population, &statistics, 4.0, &mut rng).unwrap();
    assert_eq!(selected.survivors, 2);
    for row in selected.population.iter_rows() {
        assert!(survivors.iter().any(|survivor| survivor.as_slice() == row));
    }
}

#[test]
fn empty_survivor_set_fails_loudly() {
    let population = Population::from_values(2, 1, vec![0.0, 1.0]).unwrap();
    let statistics = population.statistics();
    let mut rng = RngHandle::from_seed(1);
    let err = select_and_resample(population, &statistics, 5.0, &mut rng).unwrap_err();
    assert_eq!(err.code(), "empty-survivor-set");
    assert!(err.info().context.contains_key("threshold"));
}

#[test]
fn mismatched_statistics_are_rejected() {
    let population = Population::from_values(2, 1, vec![0.0, 1.0]).unwrap();
    let mut rng = RngHandle::from_seed(1);
    let err = select_and_resample(population, &[1.0], 0.0, &mut rng).unwrap_err();
    assert_eq!(err.code(), "statistic-length-mismatch");
}

proptest! {
    #[test]
    fn selection_at_median_never_fails(seed in any::<u64>(), rows in 2usize..200, dim in 1usize..5) {
        let mut rng = RngHandle::from_seed(seed);
        let population = Population::standard_normal(rows, dim, &mut rng);
        let statistics = population.statistics();
        let u = threshold::estimate(&statistics).unwrap().threshold;
        let selected = select_and_resample(population, &statistics, u, &mut rng).unwrap();
        prop_assert_eq!(selected.population.rows(), rows);
        prop_assert!(2 * selected.survivors >= rows);
        prop_assert!(selected.population.statistics().iter().all(|&s| s >= u));
    }
}
