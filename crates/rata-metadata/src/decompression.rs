//! Gzip payload decompression

use flate2::read::GzDecoder;
use std::io::Read;
use tracing::debug;

/// Decompress a complete gzip member held in memory
///
/// Errors on a bad header, a corrupt deflate stream, a CRC mismatch or a
/// truncated body.
pub fn decompress_gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut decompressed = Vec::with_capacity(data.len().saturating_mul(4));
    decoder.read_to_end(&mut decompressed)?;
    debug!("Decompressed {} -> {} bytes", data.len(), decompressed.len());
    Ok(decompressed)
}
