use crate::foundation::error::{ChalkError, ChalkResult};
use crate::scene::model::ProjectDef;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A whiteboard project as loaded from JSON.
///
/// Parsing accepts the legacy layer layout before typed deserialization: text options nested in a
/// `text_config` object are lifted onto the layer, fractional `width`/`height` are rounded and
/// `mode` names are lowercased.
#[derive(Debug, Clone)]
pub struct Project {
    def: ProjectDef,
}

impl Project {
    /// Parse a project from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ChalkResult<Self> {
        let mut value: serde_json::Value = serde_json::from_reader(r)
            .map_err(|e| ChalkError::validation(format!("parse project JSON: {e}")))?;
        normalize_legacy_layers(&mut value);
        let def: ProjectDef = serde_json::from_value(value)
            .map_err(|e| ChalkError::validation(format!("parse project JSON: {e}")))?;
        Ok(Self { def })
    }

    /// Parse a project from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ChalkResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ChalkError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every value the types cannot express.
    ///
    /// Camera zoom and viewport problems are left to rendering, where they fail the owning scene
    /// only.
    pub fn validate(&self) -> ChalkResult<()> {
        let def = &self.def;
        def.output.dimensions().ensure_non_empty("output").map_err(|e| {
            ChalkError::validation(format!("output: {e}"))
        })?;
        if def.tile_edge == 0 {
            return Err(ChalkError::validation("tile_edge must be > 0"));
        }
        if def.skip_rate == 0 {
            return Err(ChalkError::validation("skip_rate must be >= 1"));
        }
        let ratio = def.ink.adaptive.map(|a| a.min_background_ratio);
        if let Some(r) = ratio
            && !(0.0..=1.0).contains(&r)
        {
            return Err(ChalkError::validation(format!(
                "ink.adaptive.min_background_ratio must be in [0, 1], got {r}"
            )));
        }
        if let Some(hand) = &def.hand
            && (!hand.scale.is_finite() || hand.scale <= 0.0)
        {
            return Err(ChalkError::validation("hand.scale must be > 0"));
        }
        if def.scenes.is_empty() {
            return Err(ChalkError::validation("project has no scenes"));
        }

        for (i, scene) in def.scenes.iter().enumerate() {
            let label = scene.label(i);
            if !scene.duration.is_finite() || scene.duration < 0.0 {
                return Err(ChalkError::validation(format!(
                    "{label}: duration must be a finite, non-negative number of seconds"
                )));
            }
            if scene.width == Some(0) || scene.height == Some(0) {
                return Err(ChalkError::validation(format!(
                    "{label}: canvas width/height must be > 0"
                )));
            }
            for key in scene.camera_keys() {
                for secs in [key.hold, key.transition] {
                    if !secs.is_finite() || secs < 0.0 {
                        return Err(ChalkError::validation(format!(
                            "{label}: camera hold/transition must be non-negative"
                        )));
                    }
                }
            }
            for (j, layer) in scene.layers.iter().enumerate() {
                layer.validate().map_err(|e| {
                    ChalkError::validation(format!("{label}, {}: {e}", layer.label(j)))
                })?;
            }
        }
        Ok(())
    }

    /// Number of scenes.
    pub fn scene_count(&self) -> usize {
        self.def.scenes.len()
    }

    /// Sum of all scene durations in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.def.scenes.iter().map(|s| s.duration).sum()
    }

    pub(crate) fn def(&self) -> &ProjectDef {
        &self.def
    }
}

fn normalize_legacy_layers(value: &mut serde_json::Value) {
    let scenes = value
        .as_object_mut()
        .and_then(|root| {
            if root.contains_key("scenes") {
                root.get_mut("scenes")
            } else {
                root.get_mut("slides")
            }
        })
        .and_then(|s| s.as_array_mut());
    let Some(scenes) = scenes else {
        return;
    };
    for scene in scenes {
        let Some(layers) = scene.get_mut("layers").and_then(|l| l.as_array_mut()) else {
            continue;
        };
        for layer in layers {
            let Some(obj) = layer.as_object_mut() else {
                continue;
            };
            if let Some(serde_json::Value::Object(cfg)) = obj.remove("text_config") {
                for (k, v) in cfg {
                    obj.entry(k).or_insert(v);
                }
            }
            for key in ["width", "height"] {
                if let Some(v) = obj.get_mut(key)
                    && !v.is_u64()
                    && let Some(f) = v.as_f64()
                    && f > 0.0
                {
                    *v = serde_json::Value::from(f.round().max(1.0) as u64);
                }
            }
            if let Some(serde_json::Value::String(mode)) = obj.get_mut("mode") {
                *mode = mode.to_ascii_lowercase();
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/project.rs"]
mod tests;
