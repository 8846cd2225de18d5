//! Parse a pair of IDX binary files (image + label) as used by MNIST into a
//! [`Dataset`] with pixels scaled into `[0, 1]` and labels rendered as their
//! decimal class index ("0".."9").
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x03        (number of dimensions = 3)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x01        (number of dimensions = 1)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index
//! ```

use crate::data::dataset::{normalize_pixels, Dataset};
use crate::error::DataError;
use crate::math::matrix::Matrix;

pub fn parse_idx_pair(image_bytes: &[u8], label_bytes: &[u8]) -> Result<Dataset, DataError> {
    let (n_items, n_pixels, pixels) = parse_idx_images(image_bytes)?;
    let labels = parse_idx_labels(label_bytes)?;

    if labels.len() != n_items {
        return Err(DataError::Format(format!(
            "image file declares {} items but label file declares {}",
            n_items,
            labels.len()
        )));
    }

    let features = Matrix::from_vec(n_items, n_pixels, normalize_pixels(pixels));
    Dataset::new(features, labels.iter().map(|l| l.to_string()).collect())
}

/// Returns `(n_items, rows * cols, pixel bytes)`.
fn parse_idx_images(bytes: &[u8]) -> Result<(usize, usize, &[u8]), DataError> {
    check_header(bytes, "image", 0x03, 16)?;

    let n_items = read_be_u32(bytes, 4);
    let rows = read_be_u32(bytes, 8);
    let cols = read_be_u32(bytes, 12);

    let n_pixels = rows.checked_mul(cols).ok_or_else(|| {
        DataError::Format(format!("rows * cols overflows usize (rows={}, cols={})", rows, cols))
    })?;
    let data_len = n_items.checked_mul(n_pixels).ok_or_else(|| {
        DataError::Format(format!(
            "n_items * n_pixels overflows usize (n_items={}, n_pixels={})",
            n_items, n_pixels
        ))
    })?;

    if bytes.len() < 16 + data_len {
        return Err(DataError::Format(format!(
            "image file too short: header declares {} items of {}x{} pixels \
             ({} data bytes needed after header), but file is only {} bytes total",
            n_items, rows, cols, data_len,
            bytes.len()
        )));
    }

    Ok((n_items, n_pixels, &bytes[16..16 + data_len]))
}

fn parse_idx_labels(bytes: &[u8]) -> Result<&[u8], DataError> {
    check_header(bytes, "label", 0x01, 8)?;

    let n_items = read_be_u32(bytes, 4);
    if bytes.len() < 8 + n_items {
        return Err(DataError::Format(format!(
            "label file too short: header declares {} labels but file is only {} bytes",
            n_items,
            bytes.len()
        )));
    }

    Ok(&bytes[8..8 + n_items])
}

fn check_header(bytes: &[u8], kind: &str, dims: u8, header_len: usize) -> Result<(), DataError> {
    if bytes.len() < header_len {
        return Err(DataError::Format(format!(
            "{} file too short: expected at least {} header bytes, got {}",
            kind, header_len, bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(DataError::Format(format!(
            "{} file: bytes 0-1 must be 0x00 0x00 (reserved), got 0x{:02X} 0x{:02X}",
            kind, bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(DataError::Format(format!(
            "{} file: byte 2 (dtype) must be 0x08 (uint8), got 0x{:02X}",
            kind, bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(DataError::Format(format!(
            "{} file: byte 3 (dimensions) must be {}, got {}",
            kind, dims, bytes[3]
        )));
    }
    Ok(())
}

fn read_be_u32(bytes: &[u8], at: usize) -> usize {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
}

/// Encodes images and labels as an IDX3/IDX1 pair. Used to build fixtures.
#[cfg(test)]
pub(crate) fn encode_idx_pair(rows: u32, cols: u32, images: &[Vec<u8>], labels: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut img = vec![0x00, 0x00, 0x08, 0x03];
    img.extend_from_slice(&(images.len() as u32).to_be_bytes());
    img.extend_from_slice(&rows.to_be_bytes());
    img.extend_from_slice(&cols.to_be_bytes());
    for image in images {
        img.extend_from_slice(image);
    }

    let mut lbl = vec![0x00, 0x00, 0x08, 0x01];
    lbl.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    lbl.extend_from_slice(labels);
    (img, lbl)
}
