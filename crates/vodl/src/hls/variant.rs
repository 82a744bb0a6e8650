use m3u8_rs::VariantStream;

/// Pick the variant stream to download from a master playlist.
///
/// I-frame only streams and entries without a URI are skipped. Among the
/// rest, the one with the strictly highest bandwidth wins, so on ties the
/// first listed variant is kept. A variant advertising zero bandwidth is
/// never chosen.
pub fn select_variant(variants: &[VariantStream]) -> Option<&VariantStream> {
    let mut max_bandwidth = 0;
    let mut selected = None;

    for variant in variants {
        if variant.is_i_frame || variant.uri.trim().is_empty() {
            continue;
        }
        if variant.bandwidth > max_bandwidth {
            max_bandwidth = variant.bandwidth;
            selected = Some(variant);
        }
    }

    if let Some(variant) = selected {
        tracing::info!(
            "Best stream: {uri}; Bandwidth: {bandwidth}",
            uri = variant.uri,
            bandwidth = variant.bandwidth
        );
    }
    selected
}
