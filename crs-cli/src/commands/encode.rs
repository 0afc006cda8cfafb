//! `encode` command implementation.

use crs_codec::encode as encode_row;
use crs_core::container::{
    ChunkHeader, MAX_AVAIL_BYTES, MAX_INPUT_BYTES, MAX_K, avail_bytes, round_up_even,
};
use crs_core::crc::Crc32;
use crs_gf::{BLOCK_ALIGN_BYTES, GaloisField};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub fn cmd_encode(
    input: &Path,
    chunk_size: usize,
    outputs: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
    let input_bytes = std::fs::read(input)?;
    let input_len = input_bytes.len();

    if input_len == 0 {
        return Err("cannot encode empty input".into());
    }
    if input_len as u64 > MAX_INPUT_BYTES {
        return Err(format!(
            "input is {input_len} bytes, exceeds the {MAX_INPUT_BYTES}-byte limit"
        )
        .into());
    }

    let avail = avail_bytes(chunk_size);
    if avail == 0 {
        return Err(format!("chunk_size {chunk_size} leaves no room for payload").into());
    }
    if avail > MAX_AVAIL_BYTES {
        return Err(format!(
            "chunk_size {chunk_size} yields avail_bytes={avail}, exceeds the {MAX_AVAIL_BYTES}-byte limit"
        )
        .into());
    }

    let k = input_len.div_ceil(avail);
    if k > MAX_K {
        return Err(format!(
            "input requires K={k} data blocks, exceeds the {MAX_K} limit; pick a larger chunk_size"
        )
        .into());
    }

    let n = outputs.len();
    if n < k {
        return Err(format!("need at least {k} output files, got {n}").into());
    }
    if k + n > u16::MAX as usize + 1 {
        return Err("too many output chunks: identifiers would overflow 16 bits".into());
    }

    let dirty_bytes = input_len.div_ceil(k);
    let block_bytes = dirty_bytes.div_ceil(BLOCK_ALIGN_BYTES) * BLOCK_ALIGN_BYTES;
    let payload_len = round_up_even(dirty_bytes);

    let mut data = vec![0u8; k * block_bytes];
    for row in 0..k {
        let start = row * dirty_bytes;
        let end = ((row + 1) * dirty_bytes).min(input_len);
        if start < end {
            let dst_start = row * block_bytes;
            data[dst_start..dst_start + (end - start)].copy_from_slice(&input_bytes[start..end]);
        }
    }

    let crc32 = Crc32::compute(&input_bytes);
    let gf = GaloisField::new();

    tracing::info!(
        input = %input.display(),
        input_len,
        k,
        block_bytes,
        n,
        "encoding"
    );

    let progress = ProgressBar::new(n as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} chunks written")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    // Each requested identifier's code block is independent of the others,
    // so it can be produced off the main thread; the chunk files themselves
    // are still written out one at a time, in the caller's order.
    let code_blocks = compute_code_blocks(&gf, &data, k, n, block_bytes);

    for (i, out_path) in outputs.iter().enumerate() {
        let ident = (k + i) as u16;
        let code_block = &code_blocks[i];

        let header = ChunkHeader::new(k, ident, input_len as u64, crc32);
        let file = File::create(out_path)?;
        let mut writer = BufWriter::new(file);
        header.write(&mut writer)?;
        writer.write_all(&code_block[..payload_len])?;
        writer.flush()?;

        tracing::debug!(ident, path = %out_path.display(), "wrote chunk");
        progress.inc(1);
    }
    progress.finish_and_clear();

    println!(
        "encoded {} ({input_len} bytes) into {n} chunks (K={k}, block_bytes={block_bytes})",
        input.display()
    );
    Ok(())
}

/// Produce the `n` requested code blocks, one per identifier `[k, k + n)`.
///
/// Runs across a `rayon` thread pool when the `parallel` feature is enabled
/// (the `n` blocks are read-only over `data` and independent of each other);
/// otherwise falls back to a sequential loop.
#[cfg(feature = "parallel")]
fn compute_code_blocks(
    gf: &GaloisField,
    data: &[u8],
    k: usize,
    n: usize,
    block_bytes: usize,
) -> Vec<Vec<u8>> {
    use rayon::prelude::*;

    (0..n)
        .into_par_iter()
        .map(|i| {
            let ident = (k + i) as u16;
            let mut code_block = vec![0u8; block_bytes];
            encode_row(gf, &mut code_block, data, ident, block_bytes, k);
            code_block
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn compute_code_blocks(
    gf: &GaloisField,
    data: &[u8],
    k: usize,
    n: usize,
    block_bytes: usize,
) -> Vec<Vec<u8>> {
    (0..n)
        .map(|i| {
            let ident = (k + i) as u16;
            let mut code_block = vec![0u8; block_bytes];
            encode_row(gf, &mut code_block, data, ident, block_bytes, k);
            code_block
        })
        .collect()
}
