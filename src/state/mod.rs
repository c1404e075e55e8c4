use std::sync::Arc;

use crate::core::config::{AppPaths, ConfigService, Settings};
use crate::documents::UploadProcessor;
use crate::feedback::FeedbackLog;
use crate::llm::{LlmProvider, OpenAiCompatibleProvider};
use crate::rag::{PipelineRegistry, RagDeployer};
use crate::web::WebScraper;

pub mod error;

use error::InitializationError;

/// Global application state shared across all routes.
///
/// Contains references to:
/// - Configuration
/// - The scraper and upload processor
/// - The deployer (which owns the LLM provider) and the registry of live pipelines
/// - The feedback log
pub struct AppState {
    pub settings: Settings,
    pub scraper: WebScraper,
    pub uploads: UploadProcessor,
    pub deployer: RagDeployer,
    pub pipelines: PipelineRegistry,
    pub feedback: FeedbackLog,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// This process includes:
    /// 1. Loading configuration from the discovered paths
    /// 2. Building the HTTP clients for scraping and the model server
    /// 3. Probing the model server once (logged, never fatal)
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone());
        let settings = config
            .load_settings()
            .map_err(|e| InitializationError::Config(e.into()))?;

        let provider = OpenAiCompatibleProvider::new(&settings.llm)
            .map_err(|e| InitializationError::Llm(e.into()))?;
        provider.probe().await;

        Self::assemble(paths, settings, Arc::new(provider))
    }

    /// Wires the state around an explicit provider.
    pub fn assemble(
        paths: Arc<AppPaths>,
        settings: Settings,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Arc<Self>, InitializationError> {
        let scraper = WebScraper::new(&settings.scraper)
            .map_err(|e| InitializationError::Scraper(e.into()))?;
        let uploads = UploadProcessor::new(paths.upload_dir.clone());
        let deployer = RagDeployer::new(
            settings.rag.clone(),
            settings.server.public_base_url(),
            llm,
        );
        let pipelines = PipelineRegistry::new(settings.rag.max_pipelines);
        let feedback = FeedbackLog::new(paths.user_data_dir.join(&settings.feedback.file_name));

        Ok(Arc::new(AppState {
            settings,
            scraper,
            uploads,
            deployer,
            pipelines,
            feedback,
        }))
    }
}
