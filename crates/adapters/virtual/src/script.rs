//! Scene runner that logs scripts instead of executing them.

use std::sync::Mutex;

use homescene_app::ports::SceneRunner;
use homescene_domain::scene::{SceneId, ScriptPayload};

/// Logs every scene run at info level and keeps the list of scenes run.
#[derive(Debug, Default)]
pub struct TracingSceneRunner {
    history: Mutex<Vec<SceneId>>,
}

impl TracingSceneRunner {
    /// Scenes run so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<SceneId> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl SceneRunner for TracingSceneRunner {
    fn run(&self, scene: SceneId, script: &ScriptPayload) {
        tracing::info!(%scene, %script, "running scene script");
        if let Ok(mut history) = self.history.lock() {
            history.push(scene);
        }
    }
}
