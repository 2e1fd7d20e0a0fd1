//! Multi-item report - every stage for several test items at once

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::basic::{basic_statistics, BasicStatistics};
use crate::analysis::capability::{capability_analysis, CapabilityRequest, CapabilityStatistics};
use crate::analysis::moving_range::{moving_range, MovingRangeStatistics};
use crate::core::records::{ProductType, QualityRecord, RecordQuery};
use crate::core::standards::{StandardType, StandardsProvider};

/// All stage summaries for one test item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemReport {
    pub test_item: String,

    /// Selected records, including those missing this item
    pub points: usize,

    pub basic: BasicStatistics,
    pub moving_range: MovingRangeStatistics,
    pub capability: CapabilityStatistics,
}

/// Analyze each test item over the same record selection
///
/// Items are processed in parallel; the output keeps the order of
/// `test_items`.
pub fn analyze_items<P>(
    records: &[QualityRecord],
    query: &RecordQuery,
    product_type: Option<ProductType>,
    test_items: &[String],
    standard_type: &StandardType,
    standards: &P,
) -> Vec<ItemReport>
where
    P: StandardsProvider + Sync + ?Sized,
{
    let _span = tracing::debug_span!("analyze_items", items = test_items.len()).entered();

    test_items
        .par_iter()
        .map(|item| {
            let labeled = query.series(records, product_type, item);
            let values = labeled.series.values();

            let request = CapabilityRequest::new(query.product_code.as_deref(), Some(item))
                .with_standard_type(standard_type.clone());
            let capability = capability_analysis(&labeled.series.present(), &request, standards);

            ItemReport {
                test_item: item.clone(),
                points: labeled.len(),
                basic: basic_statistics(values),
                moving_range: moving_range(values).statistics,
                capability: capability.statistics,
            }
        })
        .collect()
}

/// Items that have at least one value among the selected records
pub fn measured_items(records: &[QualityRecord], query: &RecordQuery) -> Vec<String> {
    let mut items: Vec<String> = query
        .select(records)
        .iter()
        .flat_map(|r| {
            r.values
                .iter()
                .filter(|(_, v)| v.is_some())
                .map(|(k, _)| k.clone())
        })
        .collect();
    items.sort();
    items.dedup();
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::standards::{ProductStandard, StandardsTable};

    fn records() -> Vec<QualityRecord> {
        let values = [
            (1200.0, Some(2.1)),
            (1210.0, None),
            (1190.0, Some(2.3)),
            (1205.0, Some(2.2)),
        ];
        values
            .iter()
            .enumerate()
            .map(|(i, (visc, pdi))| {
                QualityRecord::new("DF-100", format!("2024010{}-01", i + 1))
                    .with_value("viscosity", Some(*visc))
                    .with_value("pdi", *pdi)
            })
            .collect()
    }

    fn standards() -> StandardsTable {
        StandardsTable::from_standards([ProductStandard {
            product_code: "DF-100".into(),
            test_item: "viscosity".into(),
            standard_type: StandardType::internal_control(),
            lower_limit: Some(1150.0),
            upper_limit: Some(1250.0),
            target_value: Some(1200.0),
        }])
        .unwrap()
    }

    #[test]
    fn test_report_order_and_contents() {
        let query = RecordQuery {
            product_code: Some("DF-100".into()),
            ..Default::default()
        };
        let items = vec!["viscosity".to_string(), "pdi".to_string()];
        let reports = analyze_items(
            &records(),
            &query,
            Some(ProductType::DryFilm),
            &items,
            &StandardType::internal_control(),
            &standards(),
        );

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].test_item, "viscosity");
        assert_eq!(reports[1].test_item, "pdi");

        let visc = &reports[0];
        assert_eq!(visc.points, 4);
        assert_eq!(visc.capability.sample_size, 4);
        assert!(visc.capability.cp.is_some());
        assert!((visc.basic.average - 1201.25).abs() < 1e-9);

        let pdi = &reports[1];
        assert_eq!(pdi.points, 4);
        assert_eq!(pdi.capability.sample_size, 3);
        assert!(pdi.capability.cp.is_none());
        // Gap at position 1 breaks the first two ranges
        assert!((pdi.moving_range.mr_average - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_report_matches_individual_stages() {
        let recs = records();
        let query = RecordQuery::default();
        let items = vec!["viscosity".to_string()];
        let report = &analyze_items(
            &recs,
            &query,
            None,
            &items,
            &StandardType::internal_control(),
            &standards(),
        )[0];

        let series = query.series(&recs, None, "viscosity");
        assert_eq!(report.basic, basic_statistics(series.series.values()));
        // No product filter means no standard lookup key
        assert!(report.capability.usl.is_none());
    }

    #[test]
    fn test_measured_items() {
        let mut recs = records();
        recs.push(QualityRecord::new("DF-100", "X").with_value("moisture", None));
        let items = measured_items(&recs, &RecordQuery::default());
        assert_eq!(items, vec!["pdi".to_string(), "viscosity".to_string()]);
    }
}
