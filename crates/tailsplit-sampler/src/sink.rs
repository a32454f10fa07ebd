use tracing::info;

use crate::kernel::LevelRecord;

/// Receives each level record as the controller produces it.
///
/// Sinks observe the run only; they cannot alter the population or the
/// random stream.
pub trait LevelSink {
    /// Called once per completed level, and once for the converging level.
    fn on_level(&mut self, record: &LevelRecord);
}

/// Sink that discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LevelSink for NullSink {
    fn on_level(&mut self, _record: &LevelRecord) {}
}

/// Sink that emits one `tracing` event per level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LevelSink for TracingSink {
    fn on_level(&mut self, record: &LevelRecord) {
        info!(
            level = record.level,
            threshold = record.threshold,
            variance_of_median = record.variance_of_median,
            acceptance_rate = record.acceptance_rate,
            survivors = record.survivors,
            "level completed"
        );
    }
}

impl<F> LevelSink for F
where
    F: FnMut(&LevelRecord),
{
    fn on_level(&mut self, record: &LevelRecord) {
        self(record)
    }
}
