use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::animation::blend::BlendRules;
use crate::assets::color::Rgb565;
use crate::foundation::core::Size16;
use crate::foundation::error::{WarholError, WarholResult};

/// Which background refresh design the compositor runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshVariant {
    /// Recompose the base frame inline on the foreground path every `refresh_period` ticks.
    Synchronous,
    /// Recompose base frames on a dedicated thread and hand them over by message passing.
    #[default]
    Background,
}

/// Configuration for one display session.
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Panel and control width in pixels.
    pub width: u16,
    /// Panel and control height in pixels.
    pub height: u16,
    /// Number of moving blocks.
    pub block_count: usize,
    /// Edge length of each (square) block.
    pub block_size: u16,
    /// Blend factor increment per animation tick.
    pub blend_step: f32,
    /// Blend factor at which a crossfade completes and a new target is picked.
    pub blend_threshold: f32,
    /// Synchronous variant: ticks between base recompositions.
    pub refresh_period: u32,
    /// Background refresh design.
    pub variant: RefreshVariant,
    /// Size of each of the two DMA transfer buffers.
    pub transfer_buffer_bytes: usize,
    /// Capacity of the bulk pool that full-frame buffers come from.
    pub bulk_pool_bytes: usize,
    /// Delay between background refresh iterations.
    pub refresh_delay_ms: u64,
    /// Screen background color behind the control (RGB565).
    pub background_rgb565: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            block_count: 3,
            block_size: 60,
            blend_step: 0.1,
            blend_threshold: 1.1,
            refresh_period: 10,
            variant: RefreshVariant::Background,
            transfer_buffer_bytes: 320 * 60 * 2,
            bulk_pool_bytes: 4 * 1024 * 1024,
            refresh_delay_ms: 1,
            background_rgb565: 0,
        }
    }
}

impl DisplayConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(s: &str) -> WarholResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| WarholError::validation(format!("invalid display config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> WarholResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read display config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> WarholResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(WarholError::validation("display dimensions must be non-zero"));
        }
        if self.width > 4096 || self.height > 4096 {
            return Err(WarholError::validation("display dimensions must be <= 4096"));
        }
        if self.block_count == 0 || self.block_count > 64 {
            return Err(WarholError::validation("block_count must be in 1..=64"));
        }
        // Blocks need room for a full lookahead step on each side of the inset area.
        let min_side = self.width.min(self.height);
        if self.block_size < 2 || u32::from(self.block_size) + 8 > u32::from(min_side) {
            return Err(WarholError::validation(
                "block_size must be >= 2 and leave at least 8 pixels of travel",
            ));
        }
        if !self.blend_step.is_finite() || self.blend_step <= 0.0 {
            return Err(WarholError::validation("blend_step must be finite and > 0"));
        }
        if !self.blend_threshold.is_finite() || self.blend_threshold < 1.0 {
            return Err(WarholError::validation(
                "blend_threshold must be finite and >= 1.0",
            ));
        }
        if self.blend_threshold > 60.0 {
            return Err(WarholError::validation("blend_threshold must be <= 60.0"));
        }
        if self.refresh_period == 0 {
            return Err(WarholError::validation("refresh_period must be >= 1"));
        }
        if self.transfer_buffer_bytes < usize::from(self.width) * 2 {
            return Err(WarholError::validation(
                "transfer_buffer_bytes must hold at least one full scanline",
            ));
        }
        Ok(())
    }

    /// Panel dimensions.
    pub fn size(&self) -> Size16 {
        Size16::new(self.width, self.height)
    }

    /// Blend step and threshold in fixed point.
    pub fn blend_rules(&self) -> BlendRules {
        BlendRules::from_f32(self.blend_step, self.blend_threshold)
    }

    /// Delay between background refresh iterations.
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    /// Screen background color.
    pub fn background(&self) -> Rgb565 {
        Rgb565(self.background_rgb565)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
