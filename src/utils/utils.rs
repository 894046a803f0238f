use anyhow::{Error, Result};

/// u8_to_f32_vec reinterprets a little-endian byte buffer as f32 values.
pub fn u8_to_f32_vec(v: &[u8]) -> Result<Vec<f32>> {
    if v.len() % 4 != 0 {
        return Err(Error::msg(format!("buffer length {} is not a multiple of 4", v.len())))
    }

    Ok(v.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
