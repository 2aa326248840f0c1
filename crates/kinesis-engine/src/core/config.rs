use crate::coords::Color;
use crate::gesture::GestureConfig;
use crate::scene::SceneSpec;

/// Engine configuration. The scene is rebuilt from `scene` on every surface epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub clear_color: Color,
    pub gesture: GestureConfig,
    pub scene: SceneSpec,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::rgb(0.08, 0.08, 0.1),
            gesture: GestureConfig::default(),
            scene: SceneSpec::default(),
        }
    }
}
