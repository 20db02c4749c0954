mod common;

use common::*;
use std::path::Path;
use tempfile::TempDir;
use viirs_ba::config::DatabaseInfo;
use viirs_ba::io::{ClusterRequest, ClusterSource, DetectionLayer, DetectionSink, EventStore, ImageDate, ScenePrefix};
use viirs_ba::{run_config, run_config_with_store, ContentHashIdentity, Detection, FireError, FireResult, RunConfig};

/// Records every call made by the pipeline
#[derive(Default)]
struct RecordingStore {
    schemas: Vec<String>,
    layers: Vec<(DetectionLayer, usize)>,
    clusters: Vec<ClusterRequest>,
    exports: Vec<std::path::PathBuf>,
}

impl DetectionSink for RecordingStore {
    fn write_detections(&mut self, layer: DetectionLayer, _date: &ImageDate, detections: &[Detection]) -> FireResult<()> {
        self.layers.push((layer, detections.len()));
        Ok(())
    }
}

impl EventStore for RecordingStore {
    fn initialize_schema(&mut self, database: &DatabaseInfo) -> FireResult<()> {
        self.schemas.push(database.schema.clone());
        Ok(())
    }

    fn cluster_events(&mut self, request: &ClusterRequest) -> FireResult<()> {
        self.clusters.push(request.clone());
        Ok(())
    }

    fn export_shapes(&mut self, _database: &DatabaseInfo, out_dir: &Path) -> FireResult<()> {
        self.exports.push(out_dir.to_path_buf());
        Ok(())
    }
}

fn load(base: &Path, text: bool, postgis: bool, shapes: bool) -> RunConfig {
    let ini = template_ini(base, &base.join("out"), text, postgis, shapes);
    RunConfig::from_ini_str(&ini, &ContentHashIdentity).unwrap()
}

#[test]
fn test_run_writes_text_output() {
    let _ = env_logger::builder().is_test(true).try_init();

    let tmp = TempDir::new().unwrap();
    write_scene_files(tmp.path(), IMAGE_DATE, &ALL_PREFIXES);
    let config = load(tmp.path(), true, false, false);

    let summary = run_config(&config, &SyntheticScene).unwrap();
    assert_eq!(summary.scenes.len(), 1);
    assert_eq!(summary.scenes[0].burned, 1);
    assert_eq!(summary.scenes[0].active_fire_750, 1);
    // Row 0 exceeds the row limit of 2 and is dropped
    assert_eq!(summary.scenes[0].active_fire_375, 3);

    let text_dir = config.shape_dir.join("TextOut");
    assert!(!tmp.path().join("TextOut").exists());
    let burned = std::fs::read_to_string(text_dir.join("BaOut_20130503_210419.txt")).unwrap();
    assert_eq!(burned, "Lat, Lon, DateTime\n45.0,-119.9,2013-05-03 21:04:19\n");

    let af_375 = std::fs::read_to_string(text_dir.join("Af375Out_20130503_210419.txt")).unwrap();
    let rows: Vec<&str> = af_375.lines().skip(1).collect();
    assert_eq!(
        rows,
        vec![
            "44.95,-120.0,2013-05-03 21:04:19",
            "44.95,-119.95,2013-05-03 21:04:19",
            "44.9,-120.0,2013-05-03 21:04:19",
        ]
    );
    assert!(text_dir.join("AfOut_20130503_210419.txt").exists());

    let saved = tmp.path().join("out").join("template").join("viirs_calibration_master.ini");
    assert_eq!(summary.saved_config, saved);
    let reloaded = RunConfig::load(&saved).unwrap();
    assert_eq!(reloaded.to_ini_string(), config.to_ini_string());
}

#[test]
fn test_missing_product_fails_run() {
    let tmp = TempDir::new().unwrap();
    let without_gitco: Vec<ScenePrefix> = ALL_PREFIXES
        .iter()
        .copied()
        .filter(|&p| p != ScenePrefix::Gitco)
        .collect();
    write_scene_files(tmp.path(), IMAGE_DATE, &without_gitco);
    let config = load(tmp.path(), false, false, false);

    match run_config(&config, &SyntheticScene) {
        Err(FireError::MissingInput { prefix, .. }) => assert_eq!(prefix, "GITCO"),
        other => panic!("expected missing input, got {:?}", other),
    }
}

#[test]
fn test_375_products_not_needed_when_disabled() {
    let tmp = TempDir::new().unwrap();
    write_scene_files(
        tmp.path(),
        IMAGE_DATE,
        &[
            ScenePrefix::Svm07,
            ScenePrefix::Svm08,
            ScenePrefix::Svm10,
            ScenePrefix::Svm11,
            ScenePrefix::Gmtco,
            ScenePrefix::Avafo,
        ],
    );
    let mut config = load(tmp.path(), false, false, false);
    config.use_375af = false;

    let summary = run_config(&config, &SyntheticScene).unwrap();
    assert_eq!(summary.scenes[0].active_fire_375, 0);
    assert_eq!(summary.total_burned(), 1);
}

#[test]
fn test_database_outputs_go_to_store() {
    let tmp = TempDir::new().unwrap();
    write_scene_files(tmp.path(), IMAGE_DATE, &ALL_PREFIXES);
    let config = load(tmp.path(), false, true, true);

    let mut store = RecordingStore::default();
    run_config_with_store(&config, &SyntheticScene, &mut store).unwrap();

    assert_eq!(store.schemas, vec!["master".to_string()]);
    assert_eq!(
        store.layers,
        vec![
            (DetectionLayer::BurnedArea, 1),
            (DetectionLayer::ActiveFire(viirs_ba::PixelSize::M750), 1),
            (DetectionLayer::ActiveFire(viirs_ba::PixelSize::I375), 3),
        ]
    );

    assert_eq!(store.clusters.len(), 2);
    assert_eq!(store.clusters[0].source, ClusterSource::ActiveFire);
    assert_eq!(store.clusters[1].source, ClusterSource::Threshold);
    for request in &store.clusters {
        assert_eq!(request.schema, "master");
        assert_eq!(request.collection_date, "2013-05-03 21:04:19");
        assert_eq!(request.temporal_interval, "5 days");
        assert_eq!(request.spatial_distance, 752);
    }

    assert_eq!(store.exports, vec![config.shape_dir.clone()]);
}

#[test]
fn test_database_output_requires_store() {
    let tmp = TempDir::new().unwrap();
    write_scene_files(tmp.path(), IMAGE_DATE, &ALL_PREFIXES);
    let config = load(tmp.path(), false, true, false);
    assert!(matches!(run_config(&config, &SyntheticScene), Err(FireError::Processing(_))));
}
