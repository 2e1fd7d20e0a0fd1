//! Library-level tests across records, standards and the analysis stages

use chrono::NaiveDate;
use qcspc::analysis::{
    analyze_items, basic_statistics, capability_analysis, moving_range, CapabilityRequest,
    CapabilityResult, MovingRangeChart, TrendChart,
};
use qcspc::core::{
    NoStandards, ProductStandard, ProductType, QualityRecord, RecordQuery, StandardType,
    StandardsTable,
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn records() -> Vec<QualityRecord> {
    [48.0, 49.0, 50.0, 52.0, 51.0]
        .iter()
        .enumerate()
        .map(|(i, v)| {
            QualityRecord::new("DF-100", format!("DF2403{:02}-X", i + 1))
                .with_date(date(i as u32 + 1))
                .with_value("viscosity", Some(*v))
                .with_value("peel_strength", Some(*v / 10.0))
        })
        .collect()
}

fn standards() -> StandardsTable {
    StandardsTable::from_standards([ProductStandard {
        product_code: "DF-100".to_string(),
        test_item: "viscosity".to_string(),
        standard_type: StandardType::internal_control(),
        lower_limit: Some(40.0),
        upper_limit: Some(60.0),
        target_value: Some(50.0),
    }])
    .unwrap()
}

fn query() -> RecordQuery {
    RecordQuery {
        product_code: Some("DF-100".to_string()),
        ..Default::default()
    }
}

// ============================================================================
// Response Shapes
// ============================================================================

#[test]
fn test_basic_statistics_shape() {
    let values: Vec<Option<f64>> = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
        .into_iter()
        .map(Some)
        .collect();
    let json = serde_json::to_string_pretty(&basic_statistics(&values)).unwrap();

    insta::assert_snapshot!(json, @r#"
    {
      "average": 5.0,
      "std_dev": 2.0,
      "std_dev_lines": {
        "plus_1sigma": 7.0,
        "minus_1sigma": 3.0,
        "plus_2sigma": 9.0,
        "minus_2sigma": 1.0,
        "plus_3sigma": 11.0,
        "minus_3sigma": -1.0,
        "plus_4sigma": 13.0,
        "minus_4sigma": -3.0,
        "plus_5sigma": 15.0,
        "minus_5sigma": -5.0
      }
    }
    "#);
}

#[test]
fn test_moving_range_shape() {
    let result = moving_range(&[Some(1.0), Some(3.0), None, Some(4.0)]);
    let json = serde_json::to_string_pretty(&result).unwrap();

    insta::assert_snapshot!(json, @r#"
    {
      "moving_ranges": [
        null,
        2.0,
        null,
        null
      ],
      "statistics": {
        "mr_average": 2.0,
        "ucl_mr": 6.534
      }
    }
    "#);
}

#[test]
fn test_insufficient_capability_shape() {
    let result = capability_analysis(&[42.0], &CapabilityRequest::default(), &NoStandards);
    let json = serde_json::to_string_pretty(&result).unwrap();

    insta::assert_snapshot!(json, @r#"
    {
      "histogram": {
        "values": [],
        "bins": []
      },
      "normal_distribution": {
        "x": [],
        "y": []
      },
      "statistics": {
        "mean": 0.0,
        "std_dev": 0.0,
        "usl": null,
        "lsl": null,
        "target": 0.0,
        "cp": null,
        "cpk": null,
        "sample_size": 1
      }
    }
    "#);
}

// ============================================================================
// End-to-End
// ============================================================================

#[test]
fn test_records_to_capability() {
    let records = records();
    let labeled = query().series(&records, Some(ProductType::DryFilm), "viscosity");
    assert_eq!(labeled.labels[0], "DF240301");

    let request = CapabilityRequest::new(Some("DF-100"), Some("viscosity"));
    let result = capability_analysis(&labeled.series.present(), &request, &standards());
    let stats = &result.statistics;

    let sd = 2.5_f64.sqrt();
    assert_eq!(stats.sample_size, 5);
    assert!((stats.mean - 50.0).abs() < 1e-9);
    assert!((stats.std_dev - sd).abs() < 1e-9);
    assert_eq!(stats.target, Some(50.0));
    assert!((stats.cp.unwrap() - 20.0 / (6.0 * sd)).abs() < 1e-9);

    // Five values give five bins of width 0.8; 1 value per bin → 0.25
    assert_eq!(result.histogram.values.len(), 5);
    for density in &result.histogram.values {
        assert!((density - 0.25).abs() < 1e-9);
    }
}

#[test]
fn test_item_outside_catalog_is_all_gaps() {
    let records = records();
    let labeled = query().series(&records, Some(ProductType::DryFilm), "peel_strength");
    assert_eq!(labeled.len(), 5);
    assert_eq!(labeled.series.present_count(), 0);

    let (labels, data) = labeled.into_parts();
    let chart = TrendChart::new(labels, data);
    assert_eq!(chart.statistics.average, 0.0);
    assert_eq!(chart.statistics.std_dev, 0.0);
}

#[test]
fn test_analyze_items_matches_single_stages() {
    let records = records();
    let items = vec!["viscosity".to_string(), "peel_strength".to_string()];
    let reports = analyze_items(
        &records,
        &query(),
        Some(ProductType::Adhesive),
        &items,
        &StandardType::default(),
        &standards(),
    );

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].test_item, "viscosity");
    assert_eq!(reports[1].test_item, "peel_strength");

    let labeled = query().series(&records, None, "viscosity");
    let (labels, data) = labeled.into_parts();
    let chart = MovingRangeChart::new(labels, data.clone());
    assert_eq!(reports[0].moving_range, chart.statistics);
    assert_eq!(reports[0].basic, basic_statistics(&data));

    // No standard for peel_strength: limits null, target is the mean
    let peel = &reports[1].capability;
    assert_eq!(peel.usl, None);
    assert_eq!(peel.cp, None);
    assert_eq!(peel.target, Some(peel.mean));
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_capability_properties() {
    let values = [9.8, 10.1, 10.0, 10.4, 9.7, 10.2, 10.0, 9.9, 10.3, 10.1, 9.6, 10.5];
    let request = CapabilityRequest::new(Some("P"), Some("x"));
    let table = StandardsTable::from_standards([ProductStandard {
        product_code: "P".to_string(),
        test_item: "x".to_string(),
        standard_type: StandardType::default(),
        lower_limit: Some(9.0),
        upper_limit: Some(11.5),
        target_value: None,
    }])
    .unwrap();

    let result: CapabilityResult = capability_analysis(&values, &request, &table);
    let stats = &result.statistics;

    // Cp is never below Cpk
    assert!(stats.cp.unwrap() >= stats.cpk.unwrap());

    // Bins are capped at ten and the density integrates to one
    assert_eq!(result.histogram.values.len(), 10);
    let area: f64 = result
        .histogram
        .values
        .iter()
        .zip(result.histogram.bins.windows(2))
        .map(|(d, edge)| d * (edge[1] - edge[0]))
        .sum();
    assert!((area - 1.0).abs() < 1e-9);

    // Curve spans min - 3σ to max + 3σ
    let x = &result.normal_distribution.x;
    assert_eq!(x.len(), 100);
    assert!((x[0] - (9.6 - 3.0 * stats.std_dev)).abs() < 1e-9);
    assert!((x[99] - (10.5 + 3.0 * stats.std_dev)).abs() < 1e-9);

    // Pure: the same input gives the same output
    assert_eq!(result, capability_analysis(&values, &request, &table));
}

#[test]
fn test_sigma_bands_are_symmetric() {
    let values: Vec<Option<f64>> = vec![Some(3.5), None, Some(4.25), Some(2.0), Some(6.0)];
    let stats = basic_statistics(&values);
    for k in 1..=5u8 {
        let (plus, minus) = stats.sigma_lines.band(k).unwrap();
        assert!(((plus + minus) / 2.0 - stats.average).abs() < 1e-9);
        assert!((plus - minus - 2.0 * k as f64 * stats.std_dev).abs() < 1e-9);
    }
}

#[test]
fn test_moving_range_length_matches_input() {
    let values = vec![Some(1.0), None, None, Some(2.0), Some(2.5)];
    let result = moving_range(&values);
    assert_eq!(result.moving_ranges.len(), values.len());
    assert!(result.moving_ranges.iter().flatten().all(|r| *r >= 0.0));
    assert_eq!(result.moving_ranges[4], Some(0.5));
}
