use super::model::AudioBlob;

/// Join audio fragments in order. Returns `None` when there is nothing to join.
///
/// Bytes are concatenated as-is; the result takes the encoding of the first fragment.
pub fn assemble(blobs: Vec<AudioBlob>) -> Option<AudioBlob> {
    let encoding = blobs.first()?.encoding;
    let total: usize = blobs.iter().map(AudioBlob::len).sum();

    let mut bytes = Vec::with_capacity(total);
    for blob in blobs {
        bytes.extend_from_slice(&blob.bytes);
    }

    Some(AudioBlob::new(bytes, encoding))
}
