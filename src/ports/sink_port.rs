//! Output port for pipeline results.

use crate::domain::error::SignalforgeError;
use crate::domain::pipeline::TickerRun;

pub trait SinkPort: Sync {
    /// Persist one ticker's enriched frame, masks and positions.
    fn write(&self, run: &TickerRun) -> Result<(), SignalforgeError>;
}
