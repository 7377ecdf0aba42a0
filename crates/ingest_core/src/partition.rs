use crate::BatchSettings;

/// Number of batches needed for `len` entries at `batch_size` per batch.
pub fn batch_count(len: usize, batch_size: usize) -> usize {
    len.div_ceil(batch_size.max(1))
}

/// Split `entries` into consecutive batches after clamping `batch_size`.
///
/// Every batch is full except possibly the last. The position of a batch in
/// the returned vector is its batch index.
pub fn partition<'a, T>(
    entries: &'a [T],
    batch_size: usize,
    settings: &BatchSettings,
) -> Vec<&'a [T]> {
    let size = settings.clamp(batch_size);
    entries.chunks(size).collect()
}
