//! Row-parallel iteration helpers.
//!
//! Engines that compute each output row independently route their inner
//! loop through [`for_each_row`]. With the `parallel` feature the rows are
//! distributed over the rayon pool via `par_chunks_mut`; without it the
//! same closure runs serially top-to-bottom.
//!
//! # Example
//!
//! ```rust
//! use nodefx_ops::parallel::for_each_row;
//!
//! let mut buf = vec![0.0f32; 8 * 4];
//! for_each_row(&mut buf, 8, |y, row| row.fill(y as f32));
//! assert_eq!(buf[8 * 3], 3.0);
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Applies `f(y, row)` to every `row_len`-sized chunk of `data`.
#[cfg(feature = "parallel")]
pub fn for_each_row<T, F>(data: &mut [T], row_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if row_len == 0 {
        return;
    }
    data.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Applies `f(y, row)` to every `row_len`-sized chunk of `data` (single-threaded fallback).
#[cfg(not(feature = "parallel"))]
pub fn for_each_row<T, F>(data: &mut [T], row_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if row_len == 0 {
        return;
    }
    data.chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Builds a `width x height` plane by evaluating `f(x, y)` per element.
pub fn map_plane<T, F>(width: usize, height: usize, f: F) -> Vec<T>
where
    T: Send + Default + Clone,
    F: Fn(usize, usize) -> T + Sync + Send,
{
    let mut out = vec![T::default(); width * height];
    for_each_row(&mut out, width, |y, row| {
        for (x, v) in row.iter_mut().enumerate() {
            *v = f(x, y);
        }
    });
    out
}
