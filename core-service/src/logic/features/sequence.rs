//! Character sequence encoding for the sequence model
//!
//! Each character becomes its Unicode scalar value; the sequence is truncated
//! or right-padded with zeros to a fixed length.

/// Default encoded length when the artifact does not specify one
pub const DEFAULT_SEQUENCE_LENGTH: usize = 200;

/// Encode `url` to exactly `length` codes.
/// With `vocab_size`, codes outside `0..vocab_size` collapse to 0.
pub fn encode_url(url: &str, length: usize, vocab_size: Option<u32>) -> Vec<f32> {
    let mut codes: Vec<f32> = url
        .chars()
        .take(length)
        .map(|c| {
            let code = c as u32;
            match vocab_size {
                Some(vocab) if code >= vocab => 0.0,
                _ => code as f32,
            }
        })
        .collect();

    codes.resize(length, 0.0);
    codes
}
