//! JSON wire format for frames and snapshots.
//!
//! Snapshots serialize with camelCase field names plus a top-level
//! `version`; one JSON object per line is the streaming form. Frames use the
//! same casing: `{"sampleRate": .., "fftSize": .., "magnitudes": [..]}`.

use serde::{Deserialize, Serialize};

use crate::frame::SpectrumFrame;
use crate::pipeline::Snapshot;

pub const WIRE_VERSION: &str = "1";

#[derive(Serialize)]
struct WireSnapshotRef<'a> {
    version: &'static str,
    #[serde(flatten)]
    snapshot: &'a Snapshot,
}

#[derive(Deserialize)]
struct WireSnapshot {
    #[serde(default)]
    version: Option<String>,
    #[serde(flatten)]
    snapshot: Snapshot,
}

/// Single-line JSON for one snapshot.
pub fn export_json(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(&WireSnapshotRef {
        version: WIRE_VERSION,
        snapshot,
    })
}

/// Parse a snapshot line. Missing `version` is accepted.
pub fn import_json(json: &str) -> Result<Snapshot, serde_json::Error> {
    let wire: WireSnapshot = serde_json::from_str(json)?;
    if let Some(v) = wire.version.as_deref()
        && v != WIRE_VERSION
    {
        tracing::warn!("snapshot wire version {v}, expected {WIRE_VERSION}");
    }
    Ok(wire.snapshot)
}

pub fn frame_to_json(frame: &SpectrumFrame) -> Result<String, serde_json::Error> {
    serde_json::to_string(frame)
}

pub fn frame_from_json(json: &str) -> Result<SpectrumFrame, serde_json::Error> {
    serde_json::from_str(json)
}
