//! Synthetic data providers for demos, tests and benchmarks.

use rand::Rng;

use super::types::{AxisMap, Mgmt, OutcomeArray, StandData, ValidMgmts};
use crate::error::Result;
use crate::random::create_rng;

/// Uniformly random integer-valued outcomes in `[low, high)`.
///
/// Every regime is feasible for every stand. The mgmt axis is
/// `(rx, 0)` for each regime and stand ids are `0..stands`. The same
/// seed always produces the same data.
///
/// # Panics
/// Panics if `low >= high`.
pub fn random(
    stands: usize,
    mgmts: usize,
    periods: usize,
    variables: usize,
    low: i64,
    high: i64,
    seed: u64,
) -> Result<StandData> {
    assert!(low < high, "empty value range [{low}, {high})");
    let mut rng = create_rng(seed, 0);
    let len = stands * mgmts * periods * variables;
    let values = (0..len)
        .map(|_| rng.random_range(low..high) as f64)
        .collect();

    let outcomes = OutcomeArray::from_vec([stands, mgmts, periods, variables], values)?;
    let axis_map = AxisMap::new(
        (0..stands as u64).collect(),
        (0..mgmts as u32).map(|rx| Mgmt::new(rx, 0)).collect(),
    );
    let valid_mgmts: ValidMgmts = vec![(0..mgmts).collect::<Vec<_>>(); stands];
    StandData::new(outcomes, axis_map, valid_mgmts)
}

/// Fixed 2 stands x 2 regimes x 3 periods x 3 variables demonstration set.
pub fn demo() -> Result<StandData> {
    let nested = vec![
        vec![
            vec![vec![12.0, 6.0, 5.0], vec![12.0, 0.0, 6.0], vec![3.0, 7.0, 4.0]],
            vec![vec![11.0, 2.0, 2.0], vec![2.0, 1.0, 6.0], vec![10.0, 9.0, 3.0]],
        ],
        vec![
            vec![vec![12.0, 6.0, 5.0], vec![1.0, 0.0, 6.0], vec![1.0, 7.0, 4.0]],
            vec![vec![11.0, 2.0, 2.0], vec![3.0, 1.0, 6.0], vec![9.0, 9.0, 3.0]],
        ],
    ];
    let outcomes = OutcomeArray::from_nested(nested)?;
    let axis_map = AxisMap::new(vec![1, 2], vec![Mgmt::new(1, 0), Mgmt::new(2, 0)]);
    StandData::new(outcomes, axis_map, vec![vec![0, 1], vec![0, 1]])
}
