//! `decode` command implementation.

use crs_codec::decode as decode_row;
use crs_core::container::{ChunkHeader, round_up_even};
use crs_core::crc::Crc32;
use crs_core::error::CrsError;
use crs_gf::{BLOCK_ALIGN_BYTES, GaloisField};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

struct AcceptedChunk {
    ident: u16,
    payload: Vec<u8>,
}

/// Metadata the first accepted chunk pins down; every later chunk must agree.
struct Reference {
    splits: u16,
    size: u64,
    crc32: u32,
}

pub fn cmd_decode(
    chunks: &[PathBuf],
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reference: Option<Reference> = None;
    let mut accepted: Vec<AcceptedChunk> = Vec::new();
    let mut seen_idents = std::collections::HashSet::new();

    for path in chunks {
        let header = match read_header(path) {
            Ok(h) => h,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping chunk");
                continue;
            }
        };

        let reference = reference.get_or_insert(Reference {
            splits: header.splits,
            size: header.size,
            crc32: header.crc32,
        });

        if header.splits != reference.splits {
            tracing::debug!(path = %path.display(), "rejecting chunk: splits mismatch");
            continue;
        }
        if header.size != reference.size {
            tracing::debug!(path = %path.display(), "rejecting chunk: size mismatch");
            continue;
        }
        if header.crc32 != reference.crc32 {
            tracing::debug!(path = %path.display(), "rejecting chunk: crc32 mismatch");
            continue;
        }
        if !seen_idents.insert(header.ident) {
            tracing::debug!(path = %path.display(), "rejecting chunk: duplicate ident");
            continue;
        }

        let k = header.k();
        let dirty_bytes = (header.size as usize).div_ceil(k);
        let payload_len = round_up_even(dirty_bytes);

        let mut file = File::open(path)?;
        let mut skip = vec![0u8; crs_core::container::HEADER_LEN];
        file.read_exact(&mut skip)?;
        let mut payload = vec![0u8; payload_len];
        file.read_exact(&mut payload)?;

        accepted.push(AcceptedChunk {
            ident: header.ident,
            payload,
        });

        if accepted.len() == k {
            break;
        }
    }

    let reference = reference.ok_or_else(|| {
        Box::<dyn std::error::Error>::from("no chunk with a valid header was found")
    })?;
    let k = reference.splits as usize + 1;

    if accepted.len() < k {
        return Err(Box::new(CrsError::insufficient_chunks(k, accepted.len())));
    }

    let output_bytes = reference.size as usize;
    let dirty_bytes = output_bytes.div_ceil(k);
    let block_bytes = dirty_bytes.div_ceil(BLOCK_ALIGN_BYTES) * BLOCK_ALIGN_BYTES;

    let chunk_ident: Vec<u16> = accepted.iter().map(|c| c.ident).collect();
    let mut chunk_data = vec![0u8; k * block_bytes];
    for (row, chunk) in accepted.iter().enumerate() {
        let dst = &mut chunk_data[row * block_bytes..][..block_bytes];
        dst[..chunk.payload.len()].copy_from_slice(&chunk.payload);
    }

    let gf = GaloisField::new();
    let mut writer: Box<dyn Write> = if output == Path::new("-") {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        Box::new(BufWriter::new(File::create(output)?))
    };
    let mut crc = Crc32::new();

    let progress = ProgressBar::new(k as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} rows recovered")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    // Each recovered row is independent of the others; compute them all
    // (in parallel, when the `parallel` feature is enabled) and then write
    // them out and fold them into the CRC strictly in row order.
    let rows = recover_rows(&gf, &chunk_data, &chunk_ident, k, block_bytes);
    for (r, row_out) in rows.iter().enumerate() {
        let written_so_far = r * dirty_bytes;
        let remaining = output_bytes - written_so_far;
        let copy_bytes = remaining.min(dirty_bytes);

        writer.write_all(&row_out[..copy_bytes])?;
        crc.update(&row_out[..copy_bytes]);
        progress.inc(1);
    }
    progress.finish_and_clear();
    writer.flush()?;

    let computed_crc = crc.finalize();
    if computed_crc != reference.crc32 {
        return Err(Box::new(CrsError::crc_mismatch(
            reference.crc32,
            computed_crc,
        )));
    }

    // When the reconstructed file itself goes to stdout, the summary line
    // must not share that stream; route it to stderr instead.
    eprintln!(
        "decoded {} chunks into {} ({output_bytes} bytes, K={k})",
        accepted.len(),
        output.display()
    );
    Ok(())
}

/// Recover all `k` original rows from the accepted chunks.
///
/// Runs across a `rayon` thread pool when the `parallel` feature is enabled
/// (each row's Gaussian elimination is independent of the others);
/// otherwise falls back to a sequential loop.
#[cfg(feature = "parallel")]
fn recover_rows(
    gf: &GaloisField,
    chunk_data: &[u8],
    chunk_ident: &[u16],
    k: usize,
    block_bytes: usize,
) -> Vec<Vec<u8>> {
    use rayon::prelude::*;

    (0..k)
        .into_par_iter()
        .map(|r| {
            let mut row_out = vec![0u8; block_bytes];
            decode_row(gf, &mut row_out, chunk_data, chunk_ident, r, block_bytes, k);
            row_out
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn recover_rows(
    gf: &GaloisField,
    chunk_data: &[u8],
    chunk_ident: &[u16],
    k: usize,
    block_bytes: usize,
) -> Vec<Vec<u8>> {
    (0..k)
        .map(|r| {
            let mut row_out = vec![0u8; block_bytes];
            decode_row(gf, &mut row_out, chunk_data, chunk_ident, r, block_bytes, k);
            row_out
        })
        .collect()
}

fn read_header(path: &Path) -> Result<ChunkHeader, Box<dyn std::error::Error>> {
    let mut file = File::open(path)?;
    Ok(ChunkHeader::read(&mut file)?)
}
