//! Headless frame loop around a single integrator.
//!
//! A [`Scene`] owns one box body bound to an [`Integrator`] and turns
//! wall-clock frame times into integration steps:
//!
//! 1. If paused, do nothing
//! 2. Clamp the frame time to `max_timestep`
//! 3. Step the integrator once
//! 4. Hand back the world transform for rendering
//!
//! # Example
//!
//! ```
//! use tumble_core::Scene;
//! use tumble_types::SceneConfig;
//!
//! let mut scene = Scene::new(SceneConfig::default()).unwrap();
//!
//! // Scenes start paused
//! assert!(scene.advance(1.0 / 60.0).unwrap().is_none());
//!
//! scene.resume();
//! let frames = scene.run(60, 1.0 / 60.0).unwrap();
//! assert_eq!(frames.len(), 60);
//!
//! // The first-step impulse throws the light box upward before gravity wins
//! assert!(frames[0].transform[(1, 3)] > 0.0);
//! assert!(frames[59].transform[(1, 3)] < 0.0);
//! ```

use nalgebra::Matrix4;
use tracing::{info, warn};
use tumble_types::{BodyState, DynamicsError, Result, SceneConfig};

use crate::integrator::Integrator;

/// One rendered frame of a [`Scene`].
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Steps taken since the last reset, including this one.
    pub step: u64,
    /// Simulated time after this frame (seconds).
    pub time: f64,
    /// Column-major world transform of the body.
    pub transform: Matrix4<f64>,
}

/// A single tumbling box driven by frame times.
#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    integrator: Integrator<BodyState>,
    paused: bool,
}

impl Scene {
    /// Build the body described by `config` and bind it. The scene starts paused.
    pub fn new(config: SceneConfig) -> Result<Self> {
        config.validate()?;

        let mut integrator = Integrator::with_config(config.integrator.clone())?;
        integrator.bind(config.body.build()?);

        Ok(Self {
            config,
            integrator,
            paused: true,
        })
    }

    /// Get the scene configuration.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The integrator driving the body.
    #[must_use]
    pub fn integrator(&self) -> &Integrator<BodyState> {
        &self.integrator
    }

    /// The simulated body.
    #[must_use]
    pub fn body(&self) -> Option<&BodyState> {
        self.integrator.body()
    }

    /// Replace the body with a freshly built one and rebind it.
    ///
    /// Re-arms the scripted impulse and resets the clock. The pause state is kept.
    pub fn reset(&mut self) -> Result<()> {
        let body = self.config.body.build()?;
        self.integrator.bind(body);
        info!(paused = self.paused, "scene reset");
        Ok(())
    }

    /// Stop advancing on [`advance`](Self::advance).
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume advancing on [`advance`](Self::advance).
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flip the pause state, returning the new one.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Whether the scene is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance by one frame of `frame_dt` seconds.
    ///
    /// Returns `Ok(None)` while paused. Otherwise the frame time is clamped to
    /// `max_timestep`, one integrator step is taken and the new world
    /// transform is returned.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicsError::InvalidTimestep`] if `frame_dt` is not
    /// positive and finite, or any error of [`Integrator::step`].
    pub fn advance(&mut self, frame_dt: f64) -> Result<Option<Matrix4<f64>>> {
        if self.paused {
            return Ok(None);
        }

        let dt = self.clamp_timestep(frame_dt)?;
        self.integrator.step(dt)?;

        Ok(Some(self.world_transform()))
    }

    /// Advance `frames` frames of `frame_dt` seconds each, collecting them.
    ///
    /// Stops early (returning the frames so far) if the scene is paused.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`advance`](Self::advance).
    pub fn run(&mut self, frames: usize, frame_dt: f64) -> Result<Vec<Frame>> {
        let mut out = Vec::with_capacity(frames);

        for _ in 0..frames {
            let Some(transform) = self.advance(frame_dt)? else {
                break;
            };
            out.push(Frame {
                step: self.integrator.steps(),
                time: self.integrator.time(),
                transform,
            });
        }

        Ok(out)
    }

    /// Current world transform of the body, paused or not.
    #[must_use]
    pub fn world_transform(&self) -> Matrix4<f64> {
        self.body()
            .map_or_else(Matrix4::identity, BodyState::world_transform)
    }

    fn clamp_timestep(&self, frame_dt: f64) -> Result<f64> {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return Err(DynamicsError::InvalidTimestep(frame_dt));
        }

        let max = self.config.max_timestep;
        if frame_dt > max {
            warn!(frame_dt, max_timestep = max, "frame time clamped");
            return Ok(max);
        }

        Ok(frame_dt)
    }
}
