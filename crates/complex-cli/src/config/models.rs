use pdbcomplex::engine::config::AnalysisConfig;
use pdbcomplex::workflows::analyze::InputPaths;
use std::path::PathBuf;

pub struct AppConfig {
    pub inputs: InputPaths,
    pub report_path: PathBuf,
    pub graph_path: Option<PathBuf>,
    pub core_config: AnalysisConfig,
}
