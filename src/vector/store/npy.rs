//! NumPy `.npy` codec for the vectors artifact.
//!
//! Only the layout the index uses is supported: little-endian float32
//! (`'<f4'`), C order, two dimensions. Writing always emits format 1.0;
//! reading also accepts 2.0 and 3.0 headers.
//!
//! ```text
//! magic "\x93NUMPY" | major u8 | minor u8 | header_len (u16 LE, u32 LE for >= 2.0)
//! | header: python dict literal, space padded, '\n' terminated
//! | row-major f32 LE payload
//! ```

use std::sync::LazyLock;

use byteorder::{ByteOrder, LittleEndian};
use regex::Regex;

use crate::error::{RagdexError, Result};

pub const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Header + preamble length is padded to a multiple of this.
const HEADER_ALIGN: usize = 64;

static DESCR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'descr'\s*:\s*'([^']*)'").expect("valid regex"));
static FORTRAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'fortran_order'\s*:\s*(True|False)").expect("valid regex"));
static SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'shape'\s*:\s*\(([^)]*)\)").expect("valid regex"));

/// Encode a row-major `rows x cols` matrix.
pub fn encode_f32_matrix(rows: usize, cols: usize, data: &[f32]) -> Vec<u8> {
    debug_assert_eq!(rows * cols, data.len());

    let mut header = format!(
        "{{'descr': '<f4', 'fortran_order': False, 'shape': ({rows}, {cols}), }}"
    );
    // magic(6) + version(2) + header_len(2) + header + '\n'
    let unpadded = 10 + header.len() + 1;
    let padding = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
    header.extend(std::iter::repeat_n(' ', padding));
    header.push('\n');

    let mut out = Vec::with_capacity(10 + header.len() + data.len() * 4);
    out.extend_from_slice(NPY_MAGIC);
    out.push(1);
    out.push(0);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());

    let payload_start = out.len();
    out.resize(payload_start + data.len() * 4, 0);
    LittleEndian::write_f32_into(data, &mut out[payload_start..]);
    out
}

/// Decode a matrix written by [`encode_f32_matrix`] or by `numpy.save`.
///
/// Returns `(rows, cols, data)`.
pub fn decode_f32_matrix(bytes: &[u8]) -> Result<(usize, usize, Vec<f32>)> {
    if bytes.len() < 10 || &bytes[..6] != NPY_MAGIC {
        return Err(RagdexError::corrupt("not an .npy file (bad magic)"));
    }

    let major = bytes[6];
    let (header_len, header_start) = match major {
        1 => (LittleEndian::read_u16(&bytes[8..10]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(RagdexError::corrupt("truncated .npy preamble"));
            }
            (LittleEndian::read_u32(&bytes[8..12]) as usize, 12)
        }
        other => {
            return Err(RagdexError::corrupt(format!(
                "unsupported .npy format version {other}"
            )));
        }
    };

    let payload_start = header_start + header_len;
    if bytes.len() < payload_start {
        return Err(RagdexError::corrupt("truncated .npy header"));
    }
    let header = std::str::from_utf8(&bytes[header_start..payload_start])
        .map_err(|_| RagdexError::corrupt(".npy header is not valid text"))?;

    let descr = DESCR_RE
        .captures(header)
        .map(|c| c[1].to_string())
        .ok_or_else(|| RagdexError::corrupt(".npy header has no 'descr'"))?;
    if descr != "<f4" {
        return Err(RagdexError::corrupt(format!(
            "unsupported .npy dtype '{descr}', expected '<f4'"
        )));
    }

    let fortran = FORTRAN_RE
        .captures(header)
        .map(|c| &c[1] == "True")
        .ok_or_else(|| RagdexError::corrupt(".npy header has no 'fortran_order'"))?;
    if fortran {
        return Err(RagdexError::corrupt("fortran-ordered .npy is not supported"));
    }

    let shape_text = SHAPE_RE
        .captures(header)
        .map(|c| c[1].to_string())
        .ok_or_else(|| RagdexError::corrupt(".npy header has no 'shape'"))?;
    let shape = shape_text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| RagdexError::corrupt(format!("invalid .npy shape '({shape_text})'")))
        })
        .collect::<Result<Vec<usize>>>()?;
    let &[rows, cols] = shape.as_slice() else {
        return Err(RagdexError::corrupt(format!(
            "expected a 2-D .npy array, found shape ({shape_text})"
        )));
    };

    let expected = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| RagdexError::corrupt(format!("invalid .npy shape ({rows}, {cols})")))?;
    let payload = &bytes[payload_start..];
    if payload.len() != expected {
        return Err(RagdexError::corrupt(format!(
            ".npy payload is {} bytes, shape ({rows}, {cols}) needs {expected}",
            payload.len()
        )));
    }

    let mut data = vec![0.0f32; rows * cols];
    LittleEndian::read_f32_into(payload, &mut data);
    Ok((rows, cols, data))
}
