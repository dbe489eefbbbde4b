use wide::f64x4;

const LANES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Kernel {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Div = 3,
    Max = 4,
    Min = 5,
    /// `lhs + rhs * rhs`, the accumulation step of a vector magnitude.
    AddSquare = 6,
}

#[inline(always)]
fn lane(op: Kernel, a: f64x4, b: f64x4) -> f64x4 {
    match op {
        Kernel::Add => a + b,
        Kernel::Sub => a - b,
        Kernel::Mul => a * b,
        Kernel::Div => a / b,
        Kernel::Max => a.max(b),
        Kernel::Min => a.min(b),
        Kernel::AddSquare => a + b * b,
    }
}

#[inline(always)]
fn scalar(op: Kernel, a: f64, b: f64) -> f64 {
    match op {
        Kernel::Add => a + b,
        Kernel::Sub => a - b,
        Kernel::Mul => a * b,
        Kernel::Div => a / b,
        Kernel::Max => a.max(b),
        Kernel::Min => a.min(b),
        Kernel::AddSquare => a + b * b,
    }
}

#[inline(always)]
fn load(chunk: &[f64]) -> f64x4 {
    f64x4::from([chunk[0], chunk[1], chunk[2], chunk[3]])
}

/// Executes one elementwise instruction: `dest[i] = op(src1[i], src2[i])`.
///
/// All three slices must have the same length; the caller checks shapes
/// before reaching the kernel.
#[inline]
pub fn execute(op: Kernel, dest: &mut [f64], src1: &[f64], src2: &[f64]) {
    debug_assert!(dest.len() == src1.len() && src1.len() == src2.len());

    let mut d = dest.chunks_exact_mut(LANES);
    let mut a = src1.chunks_exact(LANES);
    let mut b = src2.chunks_exact(LANES);
    for ((d, a), b) in (&mut d).zip(&mut a).zip(&mut b) {
        d.copy_from_slice(&lane(op, load(a), load(b)).to_array());
    }
    for ((d, a), b) in d.into_remainder().iter_mut().zip(a.remainder()).zip(b.remainder()) {
        *d = scalar(op, *a, *b);
    }
}

/// Executes `dest[i] = op(src[i], k)` against a broadcast scalar.
#[inline]
pub fn execute_scalar(op: Kernel, dest: &mut [f64], src: &[f64], k: f64) {
    debug_assert!(dest.len() == src.len());

    let splat = f64x4::splat(k);
    let mut d = dest.chunks_exact_mut(LANES);
    let mut a = src.chunks_exact(LANES);
    for (d, a) in (&mut d).zip(&mut a) {
        d.copy_from_slice(&lane(op, load(a), splat).to_array());
    }
    for (d, a) in d.into_remainder().iter_mut().zip(a.remainder()) {
        *d = scalar(op, *a, k);
    }
}

pub fn sqrt_in_place(values: &mut [f64]) {
    let mut d = values.chunks_exact_mut(LANES);
    for chunk in &mut d {
        let r = load(chunk).sqrt().to_array();
        chunk.copy_from_slice(&r);
    }
    for v in d.into_remainder() {
        *v = v.sqrt();
    }
}

/// Allocating convenience over [`execute`].
pub fn zip(op: Kernel, src1: &[f64], src2: &[f64]) -> Vec<f64> {
    let mut dest = vec![0.0; src1.len()];
    execute(op, &mut dest, src1, src2);
    dest
}

pub fn map_scalar(op: Kernel, src: &[f64], k: f64) -> Vec<f64> {
    let mut dest = vec![0.0; src.len()];
    execute_scalar(op, &mut dest, src, k);
    dest
}
