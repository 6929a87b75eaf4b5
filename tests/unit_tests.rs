// tests/unit_tests.rs
mod common;

use annual_composite::processing::anomaly::{detect_anomaly, MASK_NODATA};
use annual_composite::processing::composite::{median, AnnualComposite};
use annual_composite::processing::indices::{
    calculate, evaluate_index, IndexCalculator, NormalizedDifference, SensorCalibration,
    SpectralIndex,
};
use annual_composite::processing::mask::{build_mask, scene_mask, EmptyCause, MaskConfig};
use annual_composite::processing::stats::summarize;
use annual_composite::raster::{BandRole, Raster, Region, NODATA};
use annual_composite::EngineError;
use approx::assert_relative_eq;

use common::*;

fn all_valid(grid: annual_composite::raster::GridSpec) -> Raster<bool> {
    Raster::filled(grid, true, None)
}

/// Test NDVI calculation with known values
#[test]
fn test_ndvi_calculation() {
    let test_cases = [
        // NIR, RED, Expected NDVI
        (5000.0, 2500.0, 0.33333), // (5000-2500)/(5000+2500)
        (3000.0, 3000.0, 0.0),
        (1000.0, 500.0, 0.33333),
        (0.0, 0.0, NODATA), // divide by zero
    ];

    let grid = test_grid(2, 2);
    let nir: Vec<f32> = test_cases.iter().map(|(nir, _, _)| *nir).collect();
    let red: Vec<f32> = test_cases.iter().map(|(_, red, _)| *red).collect();
    let scene = ndvi_scene("s1", 2023, grid, &nir, &red);

    let result = evaluate_index(&scene, SpectralIndex::Ndvi, &all_valid(grid), SensorCalibration::default())
        .unwrap();

    for (i, (_, _, expected)) in test_cases.iter().enumerate() {
        if *expected == NODATA {
            assert_eq!(result.raster.data[i], NODATA);
        } else {
            assert!(
                (result.raster.data[i] - expected).abs() < 0.0001,
                "Expected {}, got {} at index {}",
                expected,
                result.raster.data[i],
                i
            );
        }
    }
    assert_eq!(result.year, 2023);
    assert_eq!(result.scene_id, "s1");
}

/// Every index on a scene carrying all bands
#[test]
fn test_index_formulas() {
    let grid = test_grid(1, 1);
    let scene = full_scene("all-bands", 2021, grid, &[0]);
    let mask = all_valid(grid);

    let expected = [
        (SpectralIndex::Ndvi, 0.333333),  // (20000-10000)/(30000)
        (SpectralIndex::Ndwi, -0.379310), // (9000-20000)/(29000)
        (SpectralIndex::Mndwi, -0.25),    // (9000-15000)/(24000)
        (SpectralIndex::Ndbi, -0.142857), // (15000-20000)/(35000)
        (SpectralIndex::Evi, 0.416667),   // 2.5*(0.35-0.075)/(0.35+0.45-0.15+1)
        (SpectralIndex::Lst, 26.24288),   // 44000*0.00341802+149-273.15
    ];

    for (index, value) in expected {
        let result = evaluate_index(&scene, index, &mask, SensorCalibration::default()).unwrap();
        assert_relative_eq!(result.raster.data[0], value, epsilon = 1e-3);
        assert_eq!(result.index, index);
    }
}

/// Test EVI on reflectance-scaled inputs
#[test]
fn test_evi_calculation() {
    let calibration = SensorCalibration::default();
    let raw = |reflectance: f32| (reflectance + 0.2) / 0.000_027_5;

    let grid = test_grid(1, 1);
    let scene = create_scene(
        "evi",
        2020,
        7,
        grid,
        &[
            (BandRole::Nir, &[raw(0.5)]),
            (BandRole::Red, &[raw(0.1)]),
            (BandRole::Blue, &[raw(0.05)]),
        ],
        &[0],
    );

    // EVI = 2.5 * (0.5 - 0.1) / (0.5 + 6*0.1 - 7.5*0.05 + 1)
    let result = evaluate_index(&scene, SpectralIndex::Evi, &all_valid(grid), calibration).unwrap();
    assert_relative_eq!(result.raster.data[0], 0.57971, epsilon = 1e-3);
}

#[test]
fn test_masked_scene_yields_nodata_for_every_index() {
    let grid = test_grid(3, 2);
    let scene = full_scene("masked", 2019, grid, &[0]);
    let mask = Raster::filled(grid, false, None);

    for index in SpectralIndex::ALL {
        let result = evaluate_index(&scene, index, &mask, SensorCalibration::default()).unwrap();
        assert!(
            result.raster.data.iter().all(|&v| v == NODATA),
            "{index} evaluated a masked pixel"
        );
        assert_eq!(result.raster.valid_count(), 0);
    }
}

#[test]
fn test_band_nodata_propagates() {
    let grid = test_grid(2, 1);
    let nir = Raster::new(grid, vec![5000.0, 0.0], Some(0.0)).unwrap();
    let red = Raster::new(grid, vec![2500.0, 2500.0], Some(0.0)).unwrap();
    let scene = ndvi_scene("fill", 2023, grid, &[0.0], &[0.0])
        .with_band(BandRole::Nir, nir)
        .with_band(BandRole::Red, red);

    let result = evaluate_index(&scene, SpectralIndex::Ndvi, &all_valid(grid), SensorCalibration::default())
        .unwrap();
    assert_relative_eq!(result.raster.data[0], 0.33333, epsilon = 1e-4);
    assert_eq!(result.raster.data[1], NODATA);
}

#[test]
fn test_missing_band_is_invalid_scene() {
    let grid = test_grid(2, 2);
    let scene = ndvi_scene("no-thermal", 2023, grid, &[5000.0], &[2500.0]);

    let err = evaluate_index(&scene, SpectralIndex::Lst, &all_valid(grid), SensorCalibration::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidScene { .. }), "got {err:?}");
}

#[test]
fn test_index_names() {
    for (name, index) in [
        ("NDVI", SpectralIndex::Ndvi),
        ("evi", SpectralIndex::Evi),
        ("Ndwi", SpectralIndex::Ndwi),
        ("MNDWI", SpectralIndex::Mndwi),
        ("ndbi", SpectralIndex::Ndbi),
        (" LST ", SpectralIndex::Lst),
    ] {
        assert_eq!(name.parse::<SpectralIndex>().unwrap(), index);
    }

    let err = "SAVI".parse::<SpectralIndex>().unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedIndex(ref name) if name == "SAVI"));
}

#[test]
fn test_display_ranges() {
    assert_eq!(SpectralIndex::Ndvi.display_range(), (0.0, 1.0));
    assert_eq!(SpectralIndex::Mndwi.display_range(), (-0.5, 0.5));
    assert_eq!(SpectralIndex::Lst.display_range(), (15.0, 45.0));
    assert_eq!(SpectralIndex::Evi.palette().len(), 17);
}

/// Test that custom names and band roles are properly set
#[test]
fn test_normalized_difference_calculator() {
    let ndi = NormalizedDifference::new(BandRole::Green, BandRole::Swir1, Some("Custom".to_string()));
    assert_eq!(ndi.name(), "Custom");
    assert_eq!(ndi.required_bands(), &[BandRole::Green, BandRole::Swir1]);
    assert_eq!(ndi.pixel(&[3.0, 1.0]), Some(0.5));
    assert_eq!(ndi.pixel(&[2.0, -2.0]), None);

    let grid = test_grid(1, 1);
    let scene = create_scene(
        "custom",
        2018,
        3,
        grid,
        &[(BandRole::Green, &[3.0]), (BandRole::Swir1, &[1.0])],
        &[0],
    );
    let result = calculate(&ndi, &scene, &all_valid(grid)).unwrap();
    assert_eq!(result.data, vec![0.5]);
}

#[test]
fn test_mask_bits() {
    let grid = test_grid(2, 2);
    // clear, cloud (bit 3), water (bit 7), shadow + water (bits 4 and 7)
    let qa = quality(grid, &[0, 1 << 3, 1 << 7, (1 << 4) | (1 << 7)]);

    let cases = [
        (MaskConfig::new(100, 0), [true, false, true, false]),
        (MaskConfig::new(0, 100), [true, true, false, false]),
        (MaskConfig::new(10, 10), [true, false, false, false]),
        (MaskConfig::new(0, 0), [true, true, true, true]),
    ];

    for (config, expected) in cases {
        let mask = build_mask(&qa, &config);
        assert_eq!(mask.data, expected, "config {config:?}");
    }
}

#[test]
fn test_cloud_mask_flag_union() {
    let grid = test_grid(2, 2);
    // bit 1 (dilated cloud) and bit 5 are rejected, bits 2 and 6 are not
    let qa = quality(grid, &[1 << 1, 1 << 2, 1 << 5, 1 << 6]);
    let mask = build_mask(&qa, &MaskConfig::default());
    assert_eq!(mask.data, vec![false, true, false, true]);
}

#[test]
fn test_missing_quality_band() {
    let grid = test_grid(2, 2);
    let mut scene = full_scene("no-qa", 2022, grid, &[0]);
    scene.quality = None;

    let err = scene_mask(&scene, &MaskConfig::default()).unwrap_err();
    assert!(matches!(err, EngineError::InvalidScene { .. }));
}

#[test]
fn test_empty_cause_heuristic() {
    let cases = [
        (MaskConfig::new(100, 0), EmptyCause::Cloud),
        (MaskConfig::new(30, 80), EmptyCause::Water),
        (MaskConfig::new(80, 80), EmptyCause::WaterAndCloud),
        (MaskConfig::new(50, 80), EmptyCause::Cloud),
    ];
    for (config, cause) in cases {
        assert_eq!(config.probable_empty_cause(), cause, "config {config:?}");
    }
    assert_eq!(
        EmptyCause::WaterAndCloud.message(),
        "No pixels found for your 'Water/Cloud' masking value."
    );
}

#[test]
fn test_median() {
    assert_eq!(median(&mut [0.6, 0.1, 0.2]), Some(0.2));
    assert_relative_eq!(median(&mut [0.4, 0.2]).unwrap(), 0.3, epsilon = 1e-6);
    assert_eq!(median(&mut []), None);
}

#[test]
fn test_summarize() {
    let grid = test_grid(5, 1);
    let raster = Raster::new(grid, vec![1.0, 2.0, 3.0, 4.0, NODATA], Some(NODATA)).unwrap();

    let stats = summarize(&raster, &full_region(&grid));
    assert_eq!(stats.count, 4);
    let summary = stats.summary.unwrap();
    assert_relative_eq!(summary.median, 2.5);
    assert_relative_eq!(summary.min, 1.0);
    assert_relative_eq!(summary.max, 4.0);
    assert_relative_eq!(summary.std_dev, 1.118034, epsilon = 1e-6);

    // Only the first two pixel centres fall inside
    let left = Region::rectangle(0.0, 0.0, 2.0, 1.0).unwrap();
    let stats = summarize(&raster, &left);
    assert_eq!(stats.count, 2);
    assert_eq!(stats.median(), Some(1.5));
}

#[test]
fn test_summarize_empty() {
    let grid = test_grid(3, 3);
    let raster = Raster::filled(grid, NODATA, Some(NODATA));

    let stats = summarize(&raster, &full_region(&grid));
    assert!(stats.is_empty());
    assert_eq!(stats.count, 0);
    assert!(stats.summary.is_none());
    assert!(stats.median().is_none());
}

fn composite_of(year: i32, values: Vec<f32>) -> AnnualComposite {
    let grid = test_grid(2, 2);
    AnnualComposite {
        index: SpectralIndex::Ndvi,
        year,
        scene_count: 1,
        raster: Raster::new(grid, values, Some(NODATA)).unwrap(),
    }
}

#[test]
fn test_anomaly_detection() {
    let current = composite_of(2023, vec![0.5, 0.2, NODATA, 0.5]);
    let baseline = composite_of(2015, vec![0.1, 0.15, 0.4, 0.25]);

    let anomaly = detect_anomaly(&current, &baseline, 0.25).unwrap();
    assert_eq!(anomaly.is_anomalous(0, 0), Some(true));
    assert_eq!(anomaly.is_anomalous(1, 0), Some(false));
    assert_eq!(anomaly.is_anomalous(0, 1), None);
    // |0.5 - 0.25| is not strictly greater than 0.25
    assert_eq!(anomaly.is_anomalous(1, 1), Some(false));
    assert_eq!(anomaly.raster.data[2], MASK_NODATA);
    assert_eq!(anomaly.anomalous_count(), 1);
    assert_eq!((anomaly.current_year, anomaly.baseline_year), (2023, 2015));
}

#[test]
fn test_anomaly_is_symmetric() {
    let a = composite_of(2024, vec![0.9, -0.3, 0.05, NODATA]);
    let b = composite_of(2016, vec![0.1, 0.3, 0.0, 0.2]);

    let ab = detect_anomaly(&a, &b, 0.2).unwrap();
    let ba = detect_anomaly(&b, &a, 0.2).unwrap();
    assert_eq!(ab.raster.data, ba.raster.data);
}

#[test]
fn test_anomaly_grid_mismatch() {
    let a = composite_of(2024, vec![0.1; 4]);
    let b = AnnualComposite {
        raster: Raster::filled(test_grid(3, 1), 0.1, Some(NODATA)),
        ..composite_of(2016, vec![0.1; 4])
    };

    let err = detect_anomaly(&a, &b, 0.2).unwrap_err();
    assert!(matches!(err, EngineError::GridMismatch { .. }));
}

#[test]
fn test_region_validation() {
    assert!(matches!(
        Region::new(&[(0.0, 0.0), (1.0, 1.0)]),
        Err(EngineError::InvalidRegion(_))
    ));
    // Closing vertex is optional
    let open = Region::new(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]).unwrap();
    let closed = Region::new(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]).unwrap();
    assert_eq!(open, closed);

    let region: Region = serde_json::from_str(r#"{"vertices": [[0, 0], [1, 0], [1, 1]]}"#).unwrap();
    assert_eq!(region, open);
}

#[test]
fn test_region_area() {
    // 0.01 x 0.01 degrees at the equator is roughly 1.1 km x 1.1 km
    let region = Region::rectangle(0.0, 0.0, 0.01, 0.01).unwrap();
    let hectares = region.area_hectares();
    assert!(hectares > 120.0 && hectares < 126.0, "got {hectares}");
}

#[test]
fn test_raster_crop() {
    let grid = test_grid(3, 3);
    let raster = Raster::new(grid, (0..9).map(|v| v as f32).collect(), None).unwrap();

    let window = grid.window(Region::rectangle(1.0, 0.0, 3.0, 2.0).unwrap().bounds());
    let cropped = raster.crop(&window);
    assert_eq!(cropped.shape(), (2, 2));
    assert_eq!(cropped.data, vec![4.0, 5.0, 7.0, 8.0]);
    assert_eq!(cropped.grid.transform.origin_x, 1.0);
    assert_eq!(cropped.grid.transform.origin_y, 2.0);
}
