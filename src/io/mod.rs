//! Scene file discovery, loading seam and detection outputs

pub mod fileset;
pub mod output;
pub mod scene;

pub use fileset::{find_scene_file, FileSet, ImageDate, ScenePrefix};
pub use output::{ClusterRequest, ClusterSource, DetectionLayer, DetectionSink, EventStore, TextFileSink};
pub use scene::{required_prefixes, SceneProducts, SceneSource};
