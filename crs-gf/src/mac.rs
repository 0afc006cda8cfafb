//! Bulk multiply-accumulate dispatch.
//!
//! `mac_into` is the single entry point; it picks an SSE2 path on `x86_64`
//! when the running CPU supports it, and falls back to the portable scalar
//! loop everywhere else. Every path computes exactly the same per-element
//! result via [`GaloisField::mul`], so the two are byte-for-byte equal by
//! construction — the SSE2 path only vectorises the XOR-accumulate store,
//! not the table lookup itself (GF(2^16) multiply tables don't vectorise
//! cleanly without a gather instruction).

use crate::GaloisField;

pub(crate) fn mac_into(gf: &GaloisField, dst: &mut [u8], src: &[u8], coeff: u16) {
    if coeff == 0 {
        return;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("sse2") {
            // SAFETY: guarded by the runtime feature check above.
            unsafe { x86::mac_sse2(gf, dst, src, coeff) };
            return;
        }
    }

    mac_scalar(gf, dst, src, coeff);
}

/// Reference scalar implementation; the semantic contract every dispatch
/// path must match byte-for-byte.
fn mac_scalar(gf: &GaloisField, dst: &mut [u8], src: &[u8], coeff: u16) {
    for (d, s) in dst.chunks_exact_mut(2).zip(src.chunks_exact(2)) {
        let dv = u16::from_le_bytes([d[0], d[1]]);
        let sv = u16::from_le_bytes([s[0], s[1]]);
        let result = dv ^ gf.mul(sv, coeff);
        let bytes = result.to_le_bytes();
        d[0] = bytes[0];
        d[1] = bytes[1];
    }
}

#[cfg(target_arch = "x86_64")]
mod x86 {
    use super::GaloisField;
    use core::arch::x86_64::{_mm_loadu_si128, _mm_storeu_si128, _mm_xor_si128};

    const LANES: usize = 8;

    /// SSE2-accelerated multiply-accumulate.
    ///
    /// # Safety
    ///
    /// Caller must ensure the `sse2` target feature is available (checked at
    /// runtime by [`super::mac_into`] via `is_x86_feature_detected!`).
    #[target_feature(enable = "sse2")]
    pub(super) unsafe fn mac_sse2(gf: &GaloisField, dst: &mut [u8], src: &[u8], coeff: u16) {
        let elems = dst.len() / 2;
        let mut products = [0u16; LANES];
        let mut i = 0;

        while i + LANES <= elems {
            let base = i * 2;
            for (lane, product) in products.iter_mut().enumerate() {
                let off = base + lane * 2;
                let sv = u16::from_le_bytes([src[off], src[off + 1]]);
                *product = gf.mul(sv, coeff);
            }

            // SAFETY: `dst[base..base + 16]` is in bounds because
            // `i + LANES <= elems` and each element is 2 bytes; the loads and
            // store are unaligned variants so no alignment requirement on
            // `dst`/`products`.
            unsafe {
                let d = _mm_loadu_si128(dst[base..].as_ptr().cast());
                let p = _mm_loadu_si128(products.as_ptr().cast());
                let r = _mm_xor_si128(d, p);
                _mm_storeu_si128(dst[base..].as_mut_ptr().cast(), r);
            }

            i += LANES;
        }

        // Tail shorter than one SIMD register: finish with the scalar loop.
        if i < elems {
            super::mac_scalar(gf, &mut dst[i * 2..], &src[i * 2..], coeff);
        }
    }
}
