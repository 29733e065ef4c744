//! Derivative planner: which widths and formats a source gets.

use std::sync::Arc;

use crate::codec::CodecAdapter;
use crate::error::UnitError;
use crate::types::{DerivativeUnit, SourceImage, TargetSpec};

/// `sorted(unique({w in ladder : w <= intrinsic} ∪ {intrinsic}))`.
///
/// The native width is always included so a source narrower than every rung
/// still yields one derivative, and nothing is ever upscaled.
#[must_use]
pub fn plan_widths(intrinsic_width: u32, ladder: &[u32]) -> Vec<u32> {
    if intrinsic_width == 0 {
        return Vec::new();
    }
    let mut widths: Vec<u32> = ladder
        .iter()
        .copied()
        .filter(|&w| w <= intrinsic_width)
        .chain(std::iter::once(intrinsic_width))
        .collect();
    widths.sort_unstable();
    widths.dedup();
    widths
}

/// Probe `source` (cached after the first call) and expand the full unit set.
///
/// Units are ordered by width, then by configured format order.
pub fn plan_source(
    source: &Arc<SourceImage>,
    codec: &dyn CodecAdapter,
    targets: &TargetSpec,
) -> Result<Vec<DerivativeUnit>, UnitError> {
    let dims = source
        .dimensions(codec)
        .map_err(|err| UnitError::MetadataUnavailable {
            source_file: source.filename().to_string(),
            reason: err.to_string(),
        })?;
    if dims.width == 0 {
        return Err(UnitError::MetadataUnavailable {
            source_file: source.filename().to_string(),
            reason: "codec reported zero width".into(),
        });
    }

    let widths = plan_widths(dims.width, targets.widths());
    let units: Vec<DerivativeUnit> = widths
        .iter()
        .flat_map(|&width| {
            targets.formats().iter().map(move |&format| DerivativeUnit {
                source: Arc::clone(source),
                width,
                format,
            })
        })
        .collect();

    tracing::debug!(
        target = "imageset::plan",
        source = source.filename(),
        intrinsic_width = dims.width,
        widths = ?widths,
        units = units.len(),
        "planned derivatives"
    );
    Ok(units)
}
