//! Input data shapes: outcome array, axis map, feasible regimes.

use std::collections::HashSet;

use crate::error::{DataShapeError, Result};

/// Stand identifier as issued by the data provider.
pub type StandId = u64;

/// Feasible mgmt indices, one list per stand.
pub type ValidMgmts = Vec<Vec<usize>>;

/// A management regime: prescription plus timing offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mgmt {
    /// Prescription identifier.
    pub rx: u32,
    /// Offset (in periods) applied to the prescription.
    pub offset: u32,
}

impl Mgmt {
    pub fn new(rx: u32, offset: u32) -> Self {
        Self { rx, offset }
    }
}

/// Index-to-identifier mapping for the stand and mgmt axes.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisMap {
    /// Stand identifiers in array order.
    pub standids: Vec<StandId>,
    /// Mgmt regimes in array order.
    pub mgmt: Vec<Mgmt>,
}

impl AxisMap {
    pub fn new(standids: Vec<StandId>, mgmt: Vec<Mgmt>) -> Self {
        Self { standids, mgmt }
    }

    /// Array index of a stand identifier.
    pub fn stand_index(&self, id: StandId) -> Option<usize> {
        self.standids.iter().position(|&s| s == id)
    }
}

/// Dense 4D array of outcomes indexed `[stand][mgmt][period][variable]`.
///
/// Stored row-major, so one stand/mgmt trajectory is a contiguous
/// `periods * variables` slice in period-major order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutcomeArray {
    shape: [usize; 4],
    values: Vec<f64>,
}

impl OutcomeArray {
    /// Wraps a flat row-major buffer.
    pub fn from_vec(shape: [usize; 4], values: Vec<f64>) -> Result<Self> {
        let expected = shape.iter().product::<usize>();
        if values.len() != expected {
            return Err(DataShapeError::BufferLength {
                shape,
                expected,
                found: values.len(),
            }
            .into());
        }
        Ok(Self { shape, values })
    }

    /// Builds the array from nested `[stand][mgmt][period][variable]` vectors.
    ///
    /// Every level must be rectangular.
    pub fn from_nested(nested: Vec<Vec<Vec<Vec<f64>>>>) -> Result<Self> {
        let stands = nested.len();
        let mgmts = nested.first().map_or(0, Vec::len);
        let periods = nested
            .first()
            .and_then(|s| s.first())
            .map_or(0, Vec::len);
        let variables = nested
            .first()
            .and_then(|s| s.first())
            .and_then(|m| m.first())
            .map_or(0, Vec::len);

        let mut values = Vec::with_capacity(stands * mgmts * periods * variables);
        for stand in nested {
            check_len("mgmt axis", mgmts, stand.len())?;
            for mgmt in stand {
                check_len("period axis", periods, mgmt.len())?;
                for period in mgmt {
                    check_len("variable axis", variables, period.len())?;
                    values.extend(period);
                }
            }
        }

        Ok(Self {
            shape: [stands, mgmts, periods, variables],
            values,
        })
    }

    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    pub fn n_stands(&self) -> usize {
        self.shape[0]
    }

    pub fn n_mgmts(&self) -> usize {
        self.shape[1]
    }

    pub fn n_periods(&self) -> usize {
        self.shape[2]
    }

    pub fn n_variables(&self) -> usize {
        self.shape[3]
    }

    /// Single outcome value.
    ///
    /// # Panics
    /// Panics if any index is out of range.
    pub fn get(&self, stand: usize, mgmt: usize, period: usize, variable: usize) -> f64 {
        let [_, m, p, v] = self.shape;
        assert!(mgmt < m && period < p && variable < v, "outcome index out of range");
        self.values[((stand * m + mgmt) * p + period) * v + variable]
    }

    /// Period-major trajectory (`periods * variables` values) of one stand
    /// under one regime.
    #[inline]
    pub fn trajectory(&self, stand: usize, mgmt: usize) -> &[f64] {
        let block = self.shape[2] * self.shape[3];
        let start = (stand * self.shape[1] + mgmt) * block;
        &self.values[start..start + block]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

fn check_len(axis: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(DataShapeError::Ragged {
            axis,
            expected,
            found,
        }
        .into());
    }
    Ok(())
}

/// The immutable bundle handed over by a data provider.
///
/// Construction checks that the outcome array, axis map, and feasible
/// lists agree, and that every stand can be scheduled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandData {
    outcomes: OutcomeArray,
    axis_map: AxisMap,
    valid_mgmts: ValidMgmts,
}

impl StandData {
    pub fn new(outcomes: OutcomeArray, axis_map: AxisMap, valid_mgmts: ValidMgmts) -> Result<Self> {
        let stands = outcomes.n_stands();
        let mgmts = outcomes.n_mgmts();

        if axis_map.standids.len() != stands {
            return Err(DataShapeError::StandCount {
                axis: "axis_map.standids",
                expected: stands,
                found: axis_map.standids.len(),
            }
            .into());
        }
        let mut ids = HashSet::with_capacity(stands);
        if let Some(&id) = axis_map.standids.iter().find(|&&id| !ids.insert(id)) {
            return Err(DataShapeError::DuplicateStand { id }.into());
        }
        if axis_map.mgmt.len() != mgmts {
            return Err(DataShapeError::MgmtCount {
                expected: mgmts,
                found: axis_map.mgmt.len(),
            }
            .into());
        }
        if valid_mgmts.len() != stands {
            return Err(DataShapeError::StandCount {
                axis: "valid_mgmts",
                expected: stands,
                found: valid_mgmts.len(),
            }
            .into());
        }

        for (stand, feasible) in valid_mgmts.iter().enumerate() {
            if feasible.is_empty() {
                return Err(DataShapeError::EmptyFeasibleSet { stand }.into());
            }
            let mut seen = vec![false; mgmts];
            for &mgmt in feasible {
                if mgmt >= mgmts {
                    return Err(DataShapeError::MgmtOutOfRange { stand, mgmt, mgmts }.into());
                }
                if std::mem::replace(&mut seen[mgmt], true) {
                    return Err(DataShapeError::DuplicateMgmt { stand, mgmt }.into());
                }
            }
        }

        Ok(Self {
            outcomes,
            axis_map,
            valid_mgmts,
        })
    }

    pub fn outcomes(&self) -> &OutcomeArray {
        &self.outcomes
    }

    pub fn axis_map(&self) -> &AxisMap {
        &self.axis_map
    }

    pub fn valid_mgmts(&self) -> &ValidMgmts {
        &self.valid_mgmts
    }

    /// Feasible regimes of one stand.
    pub fn feasible(&self, stand: usize) -> &[usize] {
        &self.valid_mgmts[stand]
    }

    pub fn n_stands(&self) -> usize {
        self.outcomes.n_stands()
    }

    pub fn n_periods(&self) -> usize {
        self.outcomes.n_periods()
    }

    pub fn n_variables(&self) -> usize {
        self.outcomes.n_variables()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScheduleError;

    fn two_by_two() -> OutcomeArray {
        OutcomeArray::from_nested(vec![
            vec![vec![vec![5.0]], vec![vec![1.0]]],
            vec![vec![vec![2.0]], vec![vec![8.0]]],
        ])
        .unwrap()
    }

    fn axis(stands: usize, mgmts: u32) -> AxisMap {
        AxisMap::new(
            (0..stands as u64).collect(),
            (0..mgmts).map(|rx| Mgmt::new(rx, 0)).collect(),
        )
    }

    #[test]
    fn test_nested_layout() {
        let arr = two_by_two();
        assert_eq!(arr.shape(), [2, 2, 1, 1]);
        assert_eq!(arr.get(1, 1, 0, 0), 8.0);
        assert_eq!(arr.trajectory(0, 1), &[1.0]);
    }

    #[test]
    fn test_trajectory_is_period_major() {
        let arr = OutcomeArray::from_vec([1, 1, 2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(arr.get(0, 0, 1, 0), 4.0);
        assert_eq!(arr.get(0, 0, 0, 2), 3.0);
        assert_eq!(arr.trajectory(0, 0).len(), 6);
    }

    #[test]
    fn test_buffer_length_mismatch() {
        let err = OutcomeArray::from_vec([2, 2, 2, 2], vec![0.0; 15]).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::DataShape(DataShapeError::BufferLength { expected: 16, found: 15, .. })
        ));
    }

    #[test]
    fn test_ragged_nested() {
        let err = OutcomeArray::from_nested(vec![
            vec![vec![vec![1.0, 2.0]]],
            vec![vec![vec![1.0]]],
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::DataShape(DataShapeError::Ragged { axis: "variable axis", .. })
        ));
    }

    #[test]
    fn test_stand_data_ok() {
        let data = StandData::new(two_by_two(), axis(2, 2), vec![vec![0, 1], vec![1]]).unwrap();
        assert_eq!(data.feasible(1), &[1]);
        assert_eq!(data.axis_map().stand_index(1), Some(1));
    }

    #[test]
    fn test_empty_feasible_set_rejected() {
        let err = StandData::new(two_by_two(), axis(2, 2), vec![vec![0], vec![]]).unwrap_err();
        assert_eq!(err, DataShapeError::EmptyFeasibleSet { stand: 1 }.into());
    }

    #[test]
    fn test_mgmt_out_of_range() {
        let err = StandData::new(two_by_two(), axis(2, 2), vec![vec![0], vec![2]]).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::DataShape(DataShapeError::MgmtOutOfRange { stand: 1, mgmt: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_mgmt() {
        let err = StandData::new(two_by_two(), axis(2, 2), vec![vec![0, 0], vec![1]]).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::DataShape(DataShapeError::DuplicateMgmt { stand: 0, mgmt: 0 })
        ));
    }

    #[test]
    fn test_duplicate_stand_id() {
        let outcomes = OutcomeArray::from_vec([3, 1, 1, 1], vec![1.0, 2.0, 3.0]).unwrap();
        let axis = AxisMap::new(vec![7, 7, 8], vec![Mgmt::new(0, 0)]);
        let err = StandData::new(outcomes, axis, vec![vec![0]; 3]).unwrap_err();
        assert_eq!(err, DataShapeError::DuplicateStand { id: 7 }.into());
    }

    #[test]
    fn test_axis_map_disagrees() {
        let err = StandData::new(two_by_two(), axis(3, 2), vec![vec![0], vec![1]]).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::DataShape(DataShapeError::StandCount { .. })
        ));

        let err = StandData::new(two_by_two(), axis(2, 3), vec![vec![0], vec![1]]).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::DataShape(DataShapeError::MgmtCount { expected: 2, found: 3 })
        ));
    }
}
