//! Scene runner port — executes a scene's script.

use homescene_domain::scene::{SceneId, ScriptPayload};

/// Runs scene scripts. Fire-and-forget: nothing is returned and nothing is
/// retried. A long-running script is the runner's problem, not the engine's.
pub trait SceneRunner {
    fn run(&self, scene: SceneId, script: &ScriptPayload);
}

impl<T: SceneRunner + ?Sized> SceneRunner for std::sync::Arc<T> {
    fn run(&self, scene: SceneId, script: &ScriptPayload) {
        (**self).run(scene, script);
    }
}
