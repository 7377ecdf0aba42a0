/// Batch size used when the caller does not pick one.
pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const MIN_BATCH_SIZE: usize = 50;
pub const MAX_BATCH_SIZE: usize = 5000;
/// Increment used by UI controls that step the batch size up or down.
pub const BATCH_SIZE_STEP: usize = 50;
/// Heuristic cost of one batch, used only for the pre-upload time estimate.
pub const SECONDS_PER_BATCH: u64 = 2;

/// Batch size policy shared by the processor estimate and the uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    pub default: usize,
    pub min: usize,
    pub max: usize,
    pub step: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            default: DEFAULT_BATCH_SIZE,
            min: MIN_BATCH_SIZE,
            max: MAX_BATCH_SIZE,
            step: BATCH_SIZE_STEP,
        }
    }
}

impl BatchSettings {
    /// Silently clamp a requested batch size into `[min, max]`.
    pub fn clamp(&self, requested: usize) -> usize {
        let min = self.min.max(1);
        let max = self.max.max(min);
        requested.clamp(min, max)
    }

    /// Clamp `requested`, falling back to the default when absent.
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        self.clamp(requested.unwrap_or(self.default))
    }

    pub fn step_up(&self, current: usize) -> usize {
        self.clamp(current.saturating_add(self.step.max(1)))
    }

    pub fn step_down(&self, current: usize) -> usize {
        self.clamp(current.saturating_sub(self.step.max(1)))
    }
}
