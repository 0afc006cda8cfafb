//! # CRS Codec
//!
//! The Cauchy matrix, encoder, and decoder at the heart of the erasure code.
//!
//! A file is split into `K` equally-sized data blocks, rows `[0, K)` of an
//! implicit Cauchy matrix over GF(2^16). Any row `ident` (data or code) is
//! `M[ident, c] = 1 / (ident XOR c)` for `ident != c`, and the unit vector
//! when `ident == c` (only reachable for data rows, `ident < K`). [`encode`]
//! folds the `K` data blocks into one code block per requested `ident`;
//! [`decode`] inverts the submatrix selected by whichever `K` distinct idents
//! survived, via on-line Gaussian elimination, and recovers one original
//! data row at a time.
//!
//! ## Example
//!
//! ```rust
//! use crs_codec::{decode, encode};
//! use crs_gf::GaloisField;
//!
//! let gf = GaloisField::new();
//! let block_bytes = 4;
//! let k = 2;
//!
//! // Two data blocks, concatenated.
//! let data = vec![1, 2, 3, 4, 5, 6, 7, 8];
//!
//! // Produce two code blocks with idents 2 and 3.
//! let mut code_a = vec![0u8; block_bytes];
//! encode(&gf, &mut code_a, &data, 2, block_bytes, k);
//! let mut code_b = vec![0u8; block_bytes];
//! encode(&gf, &mut code_b, &data, 3, block_bytes, k);
//!
//! // Recover both original rows from the two code blocks alone.
//! let chunk_data = [code_a, code_b].concat();
//! let chunk_ident = [2u16, 3u16];
//! let mut row0 = vec![0u8; block_bytes];
//! decode(&gf, &mut row0, &chunk_data, &chunk_ident, 0, block_bytes, k);
//! let mut row1 = vec![0u8; block_bytes];
//! decode(&gf, &mut row1, &chunk_data, &chunk_ident, 1, block_bytes, k);
//!
//! assert_eq!(row0, &data[0..block_bytes]);
//! assert_eq!(row1, &data[block_bytes..]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use crs_gf::GaloisField;

/// Evaluate the Cauchy matrix entry `M[ident, c] = 1 / (ident XOR c)`.
///
/// `ident == c` only arises when both are the same data row; that row's
/// image under the identity submatrix is the unit vector, so this function
/// is only ever called for `ident != c` by [`encode`] and [`decode`]. It is
/// exposed so callers building their own coefficient schedules don't have to
/// re-derive the formula.
#[inline]
pub fn cauchy_entry(gf: &GaloisField, ident: u16, c: u16) -> u16 {
    debug_assert_ne!(ident, c, "Cauchy entry undefined on the diagonal");
    gf.inv(ident ^ c)
}

/// Fold `K` data blocks into one code (or data) block addressed by `ident`.
///
/// `data` holds the `K` concatenated data blocks (`K * block_bytes` bytes
/// total). `output` receives the result and must be exactly `block_bytes`
/// long; its initial contents are overwritten, not accumulated into.
///
/// If `ident < k`, the Cauchy row is the unit vector: `output` becomes an
/// exact copy of data row `ident` (the identity submatrix case spelled out
/// in the codec's edge cases). Otherwise each column's contribution is
/// `GF.mac(output, data_row_c, inv(ident XOR c), block_bytes)`.
pub fn encode(
    gf: &GaloisField,
    output: &mut [u8],
    data: &[u8],
    ident: u16,
    block_bytes: usize,
    k: usize,
) {
    assert_eq!(output.len(), block_bytes, "output must be one block");
    assert_eq!(data.len(), k * block_bytes, "data must hold k blocks");

    output.iter_mut().for_each(|b| *b = 0);

    if (ident as usize) < k {
        output.copy_from_slice(&data[ident as usize * block_bytes..][..block_bytes]);
        return;
    }

    for c in 0..k as u16 {
        let coeff = cauchy_entry(gf, ident, c);
        let row = &data[c as usize * block_bytes..][..block_bytes];
        gf.mac(output, row, coeff, block_bytes);
    }
}

/// Recover original data row `r` from `K` received chunks.
///
/// `chunk_data` holds the `K` received blocks concatenated in the same order
/// as `chunk_ident`; `chunk_ident` lists the Cauchy row each received block
/// carries (duplicates are undefined behavior for the caller to avoid).
/// `output` receives the recovered row and must be exactly `block_bytes`
/// long.
///
/// The received chunks relate to the original data rows by `chunk_data =
/// A . data`, where `A[j, c] = 1 / (chunk_ident[j] XOR c)` (the unit vector
/// on the diagonal). Recovering row `r` means finding the coefficient vector
/// `s` with `s . A = e_r`, i.e. `s` is row `r` of `A^-1` — equivalently, the
/// solution of `A^T . s = e_r`. This builds `A^T` directly (`matrix[row, j] =
/// A[j, row]`) with right-hand side the unit vector `e_r`, reduces it to the
/// identity by Gaussian elimination, and uses the resulting solution as the
/// coefficient vector applied to `chunk_data` via [`GaloisField::mac`].
pub fn decode(
    gf: &GaloisField,
    output: &mut [u8],
    chunk_data: &[u8],
    chunk_ident: &[u16],
    r: usize,
    block_bytes: usize,
    k: usize,
) {
    assert_eq!(output.len(), block_bytes, "output must be one block");
    assert_eq!(chunk_ident.len(), k, "need exactly k chunk idents");
    assert_eq!(chunk_data.len(), k * block_bytes, "chunk_data must hold k blocks");
    assert!(r < k, "r must address an original data row");

    let mut matrix = vec![0u16; k * k];
    let mut rhs = vec![0u16; k];

    for (j, &ident) in chunk_ident.iter().enumerate() {
        for row in 0..k {
            matrix[row * k + j] = row_entry(gf, ident, row as u16);
        }
    }
    rhs[r] = 1;

    gaussian_eliminate(gf, &mut matrix, &mut rhs, k);

    output.iter_mut().for_each(|b| *b = 0);
    for (j, &coeff) in rhs.iter().enumerate() {
        let row = &chunk_data[j * block_bytes..][..block_bytes];
        gf.mac(output, row, coeff, block_bytes);
    }
}

/// One entry of the (implicit) matrix relating received row `ident` to
/// original column `c`: the unit vector on the diagonal, the Cauchy formula
/// off it.
#[inline]
fn row_entry(gf: &GaloisField, ident: u16, c: u16) -> u16 {
    if ident == c { 1 } else { cauchy_entry(gf, ident, c) }
}

/// Gauss-Jordan elimination over GF(2^16), reducing `matrix` (`k x k`, row
/// major) to the identity while applying the same row operations to `rhs`.
///
/// The selected submatrix is guaranteed non-singular whenever `chunk_ident`
/// holds `k` distinct values (a property of Cauchy matrices — every square
/// submatrix is invertible), so every pivot search below is expected to
/// succeed; this is an internal invariant, not a case external callers can
/// trigger by valid input, so a failure here signals a caller bug
/// (duplicate idents) rather than a normal error path.
fn gaussian_eliminate(gf: &GaloisField, matrix: &mut [u16], rhs: &mut [u16], k: usize) {
    for col in 0..k {
        let pivot_row = (col..k)
            .find(|&row| matrix[row * k + col] != 0)
            .expect("Cauchy submatrix must be non-singular for distinct idents");

        if pivot_row != col {
            for c in 0..k {
                matrix.swap(pivot_row * k + c, col * k + c);
            }
            rhs.swap(pivot_row, col);
        }

        let pivot = matrix[col * k + col];
        let pivot_inv = gf.inv(pivot);
        if pivot_inv != 1 {
            for c in col..k {
                matrix[col * k + c] = gf.mul(matrix[col * k + c], pivot_inv);
            }
            rhs[col] = gf.mul(rhs[col], pivot_inv);
        }

        for row in 0..k {
            if row == col {
                continue;
            }
            let factor = matrix[row * k + col];
            if factor == 0 {
                continue;
            }
            for c in col..k {
                matrix[row * k + c] ^= gf.mul(matrix[col * k + c], factor);
            }
            rhs[row] ^= gf.mul(rhs[col], factor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_data(k: usize, block_bytes: usize) -> Vec<u8> {
        (0..k * block_bytes).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn encode_data_row_is_identity() {
        let gf = GaloisField::new();
        let block_bytes = 8;
        let k = 3;
        let data = make_data(k, block_bytes);

        let mut out = vec![0u8; block_bytes];
        encode(&gf, &mut out, &data, 1, block_bytes, k);
        assert_eq!(out, &data[block_bytes..2 * block_bytes]);
    }

    #[test]
    fn decode_recovers_all_rows_from_code_blocks_only() {
        let gf = GaloisField::new();
        let block_bytes = 16;
        let k = 5;
        let data = make_data(k, block_bytes);

        let idents: Vec<u16> = (k as u16..(2 * k as u16)).collect();
        let mut chunk_data = Vec::with_capacity(k * block_bytes);
        for &ident in &idents {
            let mut block = vec![0u8; block_bytes];
            encode(&gf, &mut block, &data, ident, block_bytes, k);
            chunk_data.extend_from_slice(&block);
        }

        for r in 0..k {
            let mut recovered = vec![0u8; block_bytes];
            decode(&gf, &mut recovered, &chunk_data, &idents, r, block_bytes, k);
            assert_eq!(
                recovered,
                &data[r * block_bytes..(r + 1) * block_bytes],
                "row {r} mismatch"
            );
        }
    }

    #[test]
    fn decode_recovers_from_mixed_data_and_code_rows() {
        let gf = GaloisField::new();
        let block_bytes = 8;
        let k = 4;
        let data = make_data(k, block_bytes);

        // Keep data rows 0 and 2, drop 1 and 3; replace with code rows.
        let idents = [0u16, 4, 2, 5];
        let mut chunk_data = Vec::with_capacity(k * block_bytes);
        for &ident in &idents {
            let mut block = vec![0u8; block_bytes];
            encode(&gf, &mut block, &data, ident, block_bytes, k);
            chunk_data.extend_from_slice(&block);
        }

        for r in 0..k {
            let mut recovered = vec![0u8; block_bytes];
            decode(&gf, &mut recovered, &chunk_data, &idents, r, block_bytes, k);
            assert_eq!(recovered, &data[r * block_bytes..(r + 1) * block_bytes]);
        }
    }

    #[test]
    fn decode_with_k_equal_one_is_a_copy() {
        let gf = GaloisField::new();
        let block_bytes = 4;
        let data = vec![9u8, 8, 7, 6];

        let mut code = vec![0u8; block_bytes];
        encode(&gf, &mut code, &data, 1, block_bytes, 1);

        let mut recovered = vec![0u8; block_bytes];
        decode(&gf, &mut recovered, &code, &[1u16], 0, block_bytes, 1);
        assert_eq!(recovered, data);
    }

    #[test]
    fn any_k_subset_of_more_than_k_chunks_suffices() {
        let gf = GaloisField::new();
        let block_bytes = 8;
        let k = 4;
        let n = 7;
        let data = make_data(k, block_bytes);

        let all_idents: Vec<u16> = (k as u16..(k as u16 + n as u16)).collect();
        let all_blocks: Vec<Vec<u8>> = all_idents
            .iter()
            .map(|&ident| {
                let mut block = vec![0u8; block_bytes];
                encode(&gf, &mut block, &data, ident, block_bytes, k);
                block
            })
            .collect();

        // Drop the first three, decode from the remaining four.
        let subset_idents = &all_idents[3..];
        let subset_data: Vec<u8> = all_blocks[3..].iter().flatten().copied().collect();

        for r in 0..k {
            let mut recovered = vec![0u8; block_bytes];
            decode(
                &gf,
                &mut recovered,
                &subset_data,
                subset_idents,
                r,
                block_bytes,
                k,
            );
            assert_eq!(recovered, &data[r * block_bytes..(r + 1) * block_bytes]);
        }
    }

    #[test]
    fn cauchy_entry_matches_inverse_of_xor() {
        let gf = GaloisField::new();
        let entry = cauchy_entry(&gf, 10, 3);
        assert_eq!(gf.mul(entry, 10 ^ 3), 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// For random small `K` and block sizes, encoding `K` data rows into
        /// any `K` distinct code-row idents and decoding recovers the
        /// original bytes exactly.
        #[test]
        fn round_trip_random_k_and_block_size(
            k in 1usize..=16,
            elems_per_row in 1usize..=32,
            data in proptest::collection::vec(any::<u8>(), 0..512usize),
        ) {
            let block_bytes = elems_per_row * 2;
            let gf = GaloisField::new();
            let mut data = data;
            data.resize(k * block_bytes, 0);

            let idents: Vec<u16> = (k as u16..(2 * k as u16)).collect();
            let mut chunk_data = Vec::with_capacity(k * block_bytes);
            for &ident in &idents {
                let mut block = vec![0u8; block_bytes];
                encode(&gf, &mut block, &data, ident, block_bytes, k);
                chunk_data.extend_from_slice(&block);
            }

            for r in 0..k {
                let mut recovered = vec![0u8; block_bytes];
                decode(&gf, &mut recovered, &chunk_data, &idents, r, block_bytes, k);
                prop_assert_eq!(&recovered[..], &data[r * block_bytes..(r + 1) * block_bytes]);
            }
        }
    }
}
