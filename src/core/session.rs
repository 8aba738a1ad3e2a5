use crate::core::config::AnalysisConfig;
use crate::core::engine::{self, RunOutput};
use crate::core::error::AnalysisError;
use tracing::warn;

/// What the dashboard currently shows.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    Empty,
    Loaded(Box<RunOutput>),
    Failed { file_name: String, error: AnalysisError },
}

/// Holds the result of the latest upload only. Each upload replaces the
/// previous state wholesale, successful or not.
pub struct Session {
    cfg: AnalysisConfig,
    state: SessionState,
    uploads: u64,
}

impl Session {
    pub fn new(cfg: AnalysisConfig) -> Self {
        Self {
            cfg,
            state: SessionState::Empty,
            uploads: 0,
        }
    }

    pub fn upload(&mut self, bytes: &[u8], file_name: &str) -> &SessionState {
        self.uploads += 1;
        self.state = match engine::run(bytes, file_name, &self.cfg) {
            Ok(output) => SessionState::Loaded(Box::new(output)),
            Err(error) => {
                warn!(file = file_name, kind = error.kind(), %error, "upload rejected");
                SessionState::Failed {
                    file_name: file_name.to_string(),
                    error,
                }
            }
        };
        &self.state
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }
}
