//! Measurement series - ordered values with gaps kept in place

use serde::{Deserialize, Serialize};

/// Ordered measurements; `None` marks a missing value at that position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementSeries {
    values: Vec<Option<f64>>,
}

impl MeasurementSeries {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    /// Pull one value per record with a caller-supplied extractor
    ///
    /// Records are taken in the order given; a record the extractor has no
    /// value for becomes a gap rather than being skipped.
    pub fn extract<R, F>(records: &[R], extractor: F) -> Self
    where
        F: Fn(&R) -> Option<f64>,
    {
        Self {
            values: records.iter().map(extractor).collect(),
        }
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Values with gaps removed, order preserved
    pub fn present(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }

    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<Option<f64>> {
        self.values
    }
}

impl From<Vec<Option<f64>>> for MeasurementSeries {
    fn from(values: Vec<Option<f64>>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<Option<f64>> for MeasurementSeries {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A series paired one-to-one with display labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledSeries {
    pub labels: Vec<String>,
    pub series: MeasurementSeries,
}

impl LabeledSeries {
    /// Extract labels and values from the same record sequence
    pub fn extract<R, L, F>(records: &[R], label: L, extractor: F) -> Self
    where
        L: Fn(&R) -> String,
        F: Fn(&R) -> Option<f64>,
    {
        Self {
            labels: records.iter().map(label).collect(),
            series: MeasurementSeries::extract(records, extractor),
        }
    }

    /// Number the values 1..=n when there is nothing better to label them with
    pub fn numbered(series: MeasurementSeries) -> Self {
        Self {
            labels: (1..=series.len()).map(|i| i.to_string()).collect(),
            series,
        }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Option<f64>>) {
        (self.labels, self.series.into_values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        batch: &'static str,
        viscosity: Option<f64>,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                batch: "B1",
                viscosity: Some(1200.0),
            },
            Row {
                batch: "B2",
                viscosity: None,
            },
            Row {
                batch: "B3",
                viscosity: Some(1250.0),
            },
        ]
    }

    #[test]
    fn test_extract_keeps_gaps_aligned() {
        let series = MeasurementSeries::extract(&rows(), |r| r.viscosity);
        assert_eq!(series.values(), &[Some(1200.0), None, Some(1250.0)]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.present_count(), 2);
        assert_eq!(series.present(), vec![1200.0, 1250.0]);
    }

    #[test]
    fn test_labeled_extract() {
        let labeled = LabeledSeries::extract(&rows(), |r| r.batch.to_string(), |r| r.viscosity);
        let (labels, values) = labeled.into_parts();
        assert_eq!(labels, vec!["B1", "B2", "B3"]);
        assert_eq!(values[1], None);
    }

    #[test]
    fn test_numbered_labels() {
        let labeled = LabeledSeries::numbered(vec![Some(1.0), None].into());
        assert_eq!(labeled.labels, vec!["1", "2"]);
        assert!(LabeledSeries::numbered(MeasurementSeries::default()).is_empty());
    }
}
