use crate::animation::ease::Ease;
use crate::camera::viewport::Camera;
use crate::foundation::core::{Fps, Vec2};
use crate::foundation::error::ChalkResult;
use crate::foundation::math::lerp;

/// One stop of a camera sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraKeyframe {
    /// Camera at rest on this keyframe.
    pub camera: Camera,
    /// Seconds the camera rests on this keyframe.
    pub hold: f64,
    /// Seconds spent moving here from the previous keyframe. Ignored on the first keyframe.
    pub transition: f64,
    /// Easing of the transition into this keyframe.
    pub ease: Ease,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Hold { key: usize, left: u64 },
    Transition { key: usize, step: u64, steps: u64 },
    Done,
}

/// Per-frame cameras of a keyframe sequence.
///
/// Yields `round(hold * fps)` frames on the first keyframe, then for every following keyframe
/// `round(transition * fps)` eased frames moving towards it and `round(hold * fps)` frames on it.
#[derive(Clone, Debug)]
pub struct CameraTimeline {
    keys: Vec<CameraKeyframe>,
    fps: Fps,
    phase: Phase,
}

impl CameraTimeline {
    /// Validate every keyframe camera and build the timeline.
    pub fn new(keys: Vec<CameraKeyframe>, fps: Fps) -> ChalkResult<Self> {
        for key in &keys {
            key.camera.validate()?;
        }
        let mut timeline = Self {
            keys,
            fps,
            phase: Phase::Done,
        };
        timeline.phase = timeline.enter_hold(0);
        Ok(timeline)
    }

    /// Total frames the sequence produces.
    pub fn total_frames(&self) -> u64 {
        self.keys
            .iter()
            .enumerate()
            .map(|(i, k)| {
                let hold = self.fps.secs_to_frames_round(k.hold);
                let transition = if i == 0 {
                    0
                } else {
                    self.fps.secs_to_frames_round(k.transition)
                };
                hold + transition
            })
            .sum()
    }

    fn enter_hold(&self, key: usize) -> Phase {
        if key >= self.keys.len() {
            return Phase::Done;
        }
        let left = self.fps.secs_to_frames_round(self.keys[key].hold);
        if left == 0 {
            self.enter_transition(key + 1)
        } else {
            Phase::Hold { key, left }
        }
    }

    fn enter_transition(&self, key: usize) -> Phase {
        if key >= self.keys.len() {
            return Phase::Done;
        }
        let steps = self.fps.secs_to_frames_round(self.keys[key].transition);
        if steps == 0 {
            self.enter_hold(key)
        } else {
            Phase::Transition {
                key,
                step: 0,
                steps,
            }
        }
    }
}

impl Iterator for CameraTimeline {
    type Item = Camera;

    fn next(&mut self) -> Option<Camera> {
        match self.phase {
            Phase::Done => None,
            Phase::Hold { key, left } => {
                self.phase = if left > 1 {
                    Phase::Hold {
                        key,
                        left: left - 1,
                    }
                } else {
                    self.enter_transition(key + 1)
                };
                Some(self.keys[key].camera)
            }
            Phase::Transition { key, step, steps } => {
                let to = &self.keys[key];
                let from = &self.keys[key - 1];
                let t = to.ease.apply((step + 1) as f64 / steps as f64);
                self.phase = if step + 1 < steps {
                    Phase::Transition {
                        key,
                        step: step + 1,
                        steps,
                    }
                } else {
                    self.enter_hold(key)
                };
                Some(interpolate(&from.camera, &to.camera, t))
            }
        }
    }
}

/// Blend two cameras at eased progress `t`.
///
/// Explicit viewport sizes are interpolated only when both cameras carry one; otherwise the
/// target's setting applies for the whole transition.
pub fn interpolate(from: &Camera, to: &Camera, t: f64) -> Camera {
    let side = |a: Option<f64>, b: Option<f64>| match (a, b) {
        (Some(a), Some(b)) => Some(lerp(a, b, t)),
        (_, b) => b,
    };
    Camera {
        zoom: lerp(from.zoom, to.zoom, t),
        position: Vec2::new(
            lerp(from.position.x, to.position.x, t),
            lerp(from.position.y, to.position.y, t),
        ),
        width: side(from.width, to.width),
        height: side(from.height, to.height),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/camera/sequence.rs"]
mod tests;
