pub mod config;
pub mod exporter;
pub mod filename;
pub mod sink;

pub use config::ExportConfig;
pub use exporter::{Artifact, ExportError, ExportJob, MupdfSource, VectorSource, export_region};
pub use filename::artifact_name;
pub use sink::{DeliverySink, DirectorySink};
