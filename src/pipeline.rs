//! Per-run processing: every image date of one [`RunConfig`] through
//! burned-area thresholding, active fire extraction and the enabled outputs.

use crate::config::{RunConfig, RunId};
use crate::core::{BurnAreaThresholder, DEFAULT_RECODE_SENTINEL};
use crate::io::output::{ClusterRequest, ClusterSource, DetectionLayer, DetectionSink, EventStore, TextFileSink};
use crate::io::scene::{SceneProducts, SceneSource};
use crate::io::ImageDate;
use crate::types::{Detection, FireError, FireResult, PixelSize};
use serde::Serialize;
use std::path::PathBuf;

/// Detection lists of one scene
#[derive(Debug, Clone)]
pub struct SceneDetections {
    pub date: ImageDate,
    pub burned: Vec<Detection>,
    /// `None` when 750 m active fire is disabled
    pub active_fire_750: Option<Vec<Detection>>,
    /// `None` when 375 m active fire is disabled
    pub active_fire_375: Option<Vec<Detection>>,
}

impl SceneDetections {
    /// Enabled layers in output order
    pub fn layers(&self) -> Vec<(DetectionLayer, &[Detection])> {
        let mut layers = vec![(DetectionLayer::BurnedArea, self.burned.as_slice())];
        if let Some(list) = &self.active_fire_750 {
            layers.push((DetectionLayer::ActiveFire(PixelSize::M750), list.as_slice()));
        }
        if let Some(list) = &self.active_fire_375 {
            layers.push((DetectionLayer::ActiveFire(PixelSize::I375), list.as_slice()));
        }
        layers
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            image_date: self.date.token().to_string(),
            burned: self.burned.len(),
            active_fire_750: self.active_fire_750.as_ref().map_or(0, Vec::len),
            active_fire_375: self.active_fire_375.as_ref().map_or(0, Vec::len),
        }
    }
}

/// Detection counts of one scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneSummary {
    pub image_date: String,
    pub burned: usize,
    pub active_fire_750: usize,
    pub active_fire_375: usize,
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: RunId,
    pub scenes: Vec<SceneSummary>,
    /// Where the run's ini was saved
    pub saved_config: PathBuf,
}

impl RunSummary {
    pub fn total_burned(&self) -> usize {
        self.scenes.iter().map(|s| s.burned).sum()
    }

    pub fn total_active_fire(&self) -> usize {
        self.scenes
            .iter()
            .map(|s| s.active_fire_750 + s.active_fire_375)
            .sum()
    }
}

/// Threshold one loaded scene.
///
/// The 375 m fire codes get line-noise rows recoded when the run sets a
/// row limit; recoded pixels are then dropped from the fire mask.
pub fn detect_scene(config: &RunConfig, products: SceneProducts) -> FireResult<SceneDetections> {
    let window = config.window.as_ref();
    let SceneProducts {
        date,
        bands,
        geo_750,
        fire_750,
        geo_375,
        fire_375,
    } = products;

    let burned_mask =
        BurnAreaThresholder::new(config.vector).threshold(&bands, &fire_750, &geo_750, window)?;
    let burned = geo_750.to_coordinate_list(&burned_mask)?;

    let active_fire_750 = if config.use_750af {
        let mut mask = fire_750.conditional();
        geo_750.apply_window(&mut mask, window)?;
        Some(geo_750.to_coordinate_list(&mask)?)
    } else {
        None
    };

    let active_fire_375 = if config.use_375af {
        let (geo, mut fire) = match (geo_375, fire_375) {
            (Some(geo), Some(fire)) => (geo, fire),
            _ => {
                return Err(FireError::Processing(format!(
                    "375 m active fire enabled but scene {} has no 375 m products",
                    date
                )))
            }
        };
        let mut mask = fire.conditional_with_recode(config.limit_375, DEFAULT_RECODE_SENTINEL);
        fire.filter_conditional(&mut mask, DEFAULT_RECODE_SENTINEL)?;
        geo.apply_window(&mut mask, window)?;
        Some(geo.to_coordinate_list(&mask)?)
    } else {
        None
    };

    Ok(SceneDetections {
        date,
        burned,
        active_fire_750,
        active_fire_375,
    })
}

/// Run without database or shapefile outputs
pub fn run_config<S: SceneSource + ?Sized>(config: &RunConfig, source: &S) -> FireResult<RunSummary> {
    run_with_store::<S, dyn EventStore>(config, source, None)
}

/// Run with `store` receiving detections, clustering and shapefile export
pub fn run_config_with_store<S, E>(config: &RunConfig, source: &S, store: &mut E) -> FireResult<RunSummary>
where
    S: SceneSource + ?Sized,
    E: EventStore + ?Sized,
{
    run_with_store(config, source, Some(store))
}

fn run_with_store<S, E>(config: &RunConfig, source: &S, mut store: Option<&mut E>) -> FireResult<RunSummary>
where
    S: SceneSource + ?Sized,
    E: EventStore + ?Sized,
{
    log::info!("Starting run {} (schema {})", config.run_id, config.database.schema);

    if (config.database_output || config.shape_output) && store.is_none() {
        return Err(FireError::Processing(format!(
            "run {} requests database or shapefile output but no event store was given",
            config.run_id
        )));
    }

    if config.database_output {
        if let Some(store) = store.as_deref_mut() {
            store.initialize_schema(&config.database)?;
        }
    }

    // Per-run directory: runs of one batch never share a text file
    let mut text_sink = if config.text_output {
        Some(TextFileSink::under_run_dir(&config.shape_dir))
    } else {
        None
    };

    let dates = config.sorted_image_dates()?;
    let mut scenes = Vec::with_capacity(dates.len());

    for (idx, date) in dates.iter().enumerate() {
        log::info!("Processing {} ({} of {})", date, idx + 1, dates.len());

        let products = SceneProducts::load(source, &config.base_dir, date, config.use_375af)?;
        let detections = detect_scene(config, products)?;

        for (layer, list) in detections.layers() {
            if let Some(sink) = text_sink.as_mut() {
                sink.write_detections(layer, date, list)?;
            }
            if config.database_output {
                if let Some(store) = store.as_deref_mut() {
                    store.write_detections(layer, date, list)?;
                }
            }
        }

        if config.database_output {
            if let Some(store) = store.as_deref_mut() {
                for cluster_source in [ClusterSource::ActiveFire, ClusterSource::Threshold] {
                    store.cluster_events(&ClusterRequest {
                        source: cluster_source,
                        schema: config.database.schema.clone(),
                        collection_date: date.sql_date(),
                        temporal_interval: config.temporal_interval(),
                        spatial_distance: config.vector.spatial_proximity,
                    })?;
                }
            }
        }

        let summary = detections.summary();
        log::debug!(
            "{}: {} burned, {} active fire (750 m), {} active fire (375 m)",
            summary.image_date,
            summary.burned,
            summary.active_fire_750,
            summary.active_fire_375
        );
        scenes.push(summary);
    }

    if config.shape_output {
        if let Some(store) = store.as_deref_mut() {
            std::fs::create_dir_all(&config.shape_dir)?;
            store.export_shapes(&config.database, &config.shape_dir)?;
        }
    }

    std::fs::create_dir_all(&config.shape_dir)?;
    let saved_config = config
        .shape_dir
        .join(format!("{}_{}.ini", config.database.name, config.database.schema));
    config.save(&saved_config)?;

    log::info!("Finished run {}: {} scene(s)", config.run_id, scenes.len());
    Ok(RunSummary {
        run_id: config.run_id,
        scenes,
        saved_config,
    })
}
