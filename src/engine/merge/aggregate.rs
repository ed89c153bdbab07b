use std::cmp::Ordering;

use crate::engine::merge::statement::{AggregateFunction, AvgDerivedColumns, Projection};
use crate::engine::types::ScalarValue;

/// Running sum that stays integral until a float shows up or i64 overflows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumericSum {
    Int(i64),
    Float(f64),
}

impl NumericSum {
    fn add(self, value: &ScalarValue) -> Option<NumericSum> {
        match (self, value) {
            (NumericSum::Int(acc), ScalarValue::Int64(v) | ScalarValue::Timestamp(v)) => {
                Some(match acc.checked_add(*v) {
                    Some(sum) => NumericSum::Int(sum),
                    None => NumericSum::Float(acc as f64 + *v as f64),
                })
            }
            (NumericSum::Int(acc), other) => Some(NumericSum::Float(acc as f64 + other.as_f64()?)),
            (NumericSum::Float(acc), other) => Some(NumericSum::Float(acc + other.as_f64()?)),
        }
    }

    fn start(value: &ScalarValue) -> Option<NumericSum> {
        match value {
            ScalarValue::Int64(v) | ScalarValue::Timestamp(v) => Some(NumericSum::Int(*v)),
            other => other.as_f64().map(NumericSum::Float),
        }
    }

    fn to_scalar(self) -> ScalarValue {
        match self {
            NumericSum::Int(v) => ScalarValue::Int64(v),
            NumericSum::Float(v) => ScalarValue::Float64(v),
        }
    }
}

fn add_count(count: i64, partial: i64) -> Result<i64, String> {
    count
        .checked_add(partial)
        .ok_or_else(|| format!("count overflow adding {} to {}", partial, count))
}

/// Accumulator for one aggregate column of one group.
#[derive(Clone, Debug, PartialEq)]
pub enum AggregateState {
    Count {
        count: i64,
    },
    Sum {
        sum: Option<NumericSum>,
    },
    Min {
        min: Option<ScalarValue>,
    },
    Max {
        max: Option<ScalarValue>,
    },
    Avg {
        sum: f64,
        count: i64,
        derived: Option<AvgDerivedColumns>,
    },
}

impl AggregateState {
    pub fn for_projection(projection: &Projection) -> Option<Self> {
        let state = match projection.aggregate? {
            AggregateFunction::Count => AggregateState::Count { count: 0 },
            AggregateFunction::Sum => AggregateState::Sum { sum: None },
            AggregateFunction::Min => AggregateState::Min { min: None },
            AggregateFunction::Max => AggregateState::Max { max: None },
            AggregateFunction::Avg => AggregateState::Avg {
                sum: 0.0,
                count: 0,
                derived: projection.avg_derived,
            },
        };
        Some(state)
    }

    /// Folds the aggregate column `column` of one upstream row.
    pub fn fold(&mut self, row: &[ScalarValue], column: usize) -> Result<(), String> {
        let value = row.get(column).unwrap_or(&ScalarValue::Null);
        match self {
            AggregateState::Count { count } => {
                if !value.is_null() {
                    let partial = value
                        .as_i64()
                        .ok_or_else(|| format!("non-integer count {:?}", value))?;
                    *count = add_count(*count, partial)?;
                }
            }
            AggregateState::Sum { sum } => {
                if !value.is_null() {
                    let next = match *sum {
                        Some(acc) => acc.add(value),
                        None => NumericSum::start(value),
                    };
                    *sum = Some(next.ok_or_else(|| format!("non-numeric sum input {:?}", value))?);
                }
            }
            AggregateState::Min { min } => {
                if !value.is_null()
                    && min
                        .as_ref()
                        .is_none_or(|current| value.compare(current) == Ordering::Less)
                {
                    *min = Some(value.clone());
                }
            }
            AggregateState::Max { max } => {
                if !value.is_null()
                    && max
                        .as_ref()
                        .is_none_or(|current| value.compare(current) == Ordering::Greater)
                {
                    *max = Some(value.clone());
                }
            }
            AggregateState::Avg {
                sum,
                count,
                derived,
            } => match derived {
                Some(columns) => {
                    let partial_sum = row.get(columns.sum_index).unwrap_or(&ScalarValue::Null);
                    let partial_count = row
                        .get(columns.count_index)
                        .unwrap_or(&ScalarValue::Null);
                    if !partial_sum.is_null() {
                        *sum += partial_sum
                            .as_f64()
                            .ok_or_else(|| format!("non-numeric avg sum {:?}", partial_sum))?;
                    }
                    if !partial_count.is_null() {
                        let partial = partial_count
                            .as_i64()
                            .ok_or_else(|| format!("non-integer avg count {:?}", partial_count))?;
                        *count = add_count(*count, partial)?;
                    }
                }
                None => {
                    if !value.is_null() {
                        *sum += value
                            .as_f64()
                            .ok_or_else(|| format!("non-numeric avg input {:?}", value))?;
                        *count = add_count(*count, 1)?;
                    }
                }
            },
        }
        Ok(())
    }

    pub fn finalize(&self) -> ScalarValue {
        match self {
            AggregateState::Count { count } => ScalarValue::Int64(*count),
            AggregateState::Sum { sum } => sum.map(NumericSum::to_scalar).unwrap_or(ScalarValue::Null),
            AggregateState::Min { min } => min.clone().unwrap_or(ScalarValue::Null),
            AggregateState::Max { max } => max.clone().unwrap_or(ScalarValue::Null),
            AggregateState::Avg { sum, count, .. } => {
                if *count == 0 {
                    ScalarValue::Null
                } else {
                    ScalarValue::Float64(*sum / *count as f64)
                }
            }
        }
    }
}
