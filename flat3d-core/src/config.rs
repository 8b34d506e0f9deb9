/// Engine configuration, loadable from JSON
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::painter::DisplayOptions;
use crate::projection::{Camera, ProjectionParams, Viewport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub app_name: String,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Height of one screen unit relative to its width (2.0 for terminal cells)
    pub pixel_aspect: f32,
    /// Scheduler ticks per second
    pub tick_rate: u32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial forward offset of the mesh
    pub zoom: f32,
    /// Radians per second added to the frame angle
    pub angular_rate: f32,
    pub show_faces: bool,
    pub show_lines: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "3D Demo".to_string(),
            screen_width: 900,
            screen_height: 900,
            pixel_aspect: 1.0,
            tick_rate: 124,
            fov_degrees: 90.0,
            near: 0.1,
            far: 1000.0,
            zoom: 3.0,
            angular_rate: 1.0,
            show_faces: true,
            show_lines: false,
        }
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(Error::InvalidConfig(format!(
                "screen size must be non-zero, got {}x{}",
                self.screen_width, self.screen_height
            )));
        }
        if self.tick_rate == 0 {
            return Err(Error::InvalidConfig("tick rate must be at least 1 Hz".to_string()));
        }
        if !(self.pixel_aspect.is_finite() && self.pixel_aspect > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "pixel aspect must be positive, got {}",
                self.pixel_aspect
            )));
        }
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "zoom must be positive, got {}",
                self.zoom
            )));
        }
        if !(self.angular_rate.is_finite() && self.angular_rate >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "angular rate must be finite and non-negative, got {}",
                self.angular_rate
            )));
        }
        self.projection().validate()
    }

    /// Projection inputs; aspect is screen height over width in square units
    pub fn projection(&self) -> ProjectionParams {
        let aspect =
            self.screen_height as f32 * self.pixel_aspect / self.screen_width as f32;
        ProjectionParams::new(self.fov_degrees, self.near, self.far, aspect)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.screen_width, self.screen_height)
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.zoom)
    }

    pub fn display(&self) -> DisplayOptions {
        DisplayOptions {
            show_faces: self.show_faces,
            show_lines: self.show_lines,
        }
    }
}
