//! Audit logging for sample verdicts.

use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Append a sample payload to the audit file as one JSON line.
///
/// # Arguments
/// * `path` - Path to the audit file; nothing is written when `None`
/// * `payload` - Serializable payload to write
pub fn write_audit_sample<P: AsRef<Path>, T: Serialize>(
    path: Option<P>,
    payload: &T,
) -> anyhow::Result<()> {
    if let Some(audit_path) = path {
        let line = serde_json::to_string(payload)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&audit_path)?;
        writeln!(file, "{}", line)?;
        debug!("Wrote audit sample to {:?}", audit_path.as_ref());
    }
    Ok(())
}
