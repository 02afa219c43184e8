use std::ptr;

use sandpile_core::SandpileStats as CoreStats;

use crate::error::{DefaultSandpileError, SandpileErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, track_error};
use crate::instance::SandpileInstance;

/// FFI-friendly snapshot of a sandpile's statistics.
/// Keep this layout stable for C/C++/C# consumers.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SandpileStats {
    /// Steps that toppled at least one cell.
    pub iteration: u64,
    /// Grains on the grid.
    pub total_mass: u64,
    /// Tallest pile.
    pub max_height: u32,
    /// Cells holding four or more grains.
    pub unstable_cells: usize,
    /// Mean grains per cell.
    pub mean_height: f64,
    /// Cell counts for heights 0, 1, 2 and 3.
    pub histogram: [u64; 4],
    /// Topplings since creation.
    pub total_topplings: u64,
}

impl From<CoreStats> for SandpileStats {
    fn from(stats: CoreStats) -> Self {
        Self {
            iteration: stats.iteration,
            total_mass: stats.total_mass,
            max_height: stats.max_height,
            unstable_cells: stats.unstable_cells,
            mean_height: stats.mean_height,
            histogram: stats.histogram,
            total_topplings: stats.total_topplings,
        }
    }
}

/// Return a borrowed, zero-copy pointer to the live cell buffer.
///
/// Heights are `u32` in row-major order (`row * width + col`), `out_len` of them.
///
/// - **DO NOT FREE THIS POINTER.** It is owned by the instance.
/// - It is valid until `sandpile_destroy`. The storage is never reallocated,
///   but hosts should still re-fetch it every frame.
/// - Do not read it while `sandpile_compute_steps` is running.
///
/// Returns
/// - `Ok` with the pointer in `out_cells` and the count in `out_len`
/// - `NullPointer` if `ptr`, `out_len` or `out_cells` is null (outputs zeroed when writable)
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `sandpile_new*`.
/// - `out_len` and `out_cells` must be valid, writable pointers.
///
/// # Example Usage (C)
/// ```c
/// size_t len = 0;
/// const uint32_t* cells = NULL;
/// if (sandpile_get_cells(pile, &len, &cells) == Ok) {
///     for (size_t i = 0; i < len; i++) { paint(i, cells[i]); }
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn sandpile_get_cells(
    ptr: *const SandpileInstance,
    out_len: *mut usize,
    out_cells: *mut *const u32,
) -> SandpileErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultSandpileError::null_pointer("out_len"));
    }

    if out_cells.is_null() {
        unsafe {
            *out_len = 0;
        }
        return track_error(&DefaultSandpileError::null_pointer("out_cells"));
    }

    let result = handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr)? };
        let view = instance.sim.raw_view();
        unsafe {
            *out_len = view.len();
            *out_cells = view.as_ptr();
        }
        Ok(())
    });

    // Set to null on error (per documentation contract)
    if result != SandpileErrorCode::Ok {
        unsafe {
            *out_cells = ptr::null();
            *out_len = 0;
        }
    }

    result
}

/// Read the iteration counter (steps that toppled at least one cell).
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `sandpile_new*`.
/// - `out_iteration` must be a valid, writable pointer.
#[no_mangle]
pub unsafe extern "C" fn sandpile_get_iteration(
    ptr: *const SandpileInstance,
    out_iteration: *mut u64,
) -> SandpileErrorCode {
    if out_iteration.is_null() {
        return track_error(&DefaultSandpileError::null_pointer("out_iteration"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr)? };
        unsafe {
            *out_iteration = instance.sim.iteration_count();
        }
        Ok(())
    })
}

/// Read the height of cell `(row, col)`.
///
/// Returns `OutOfRange` for coordinates outside the grid; `out_height` is left untouched.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `sandpile_new*`.
/// - `out_height` must be a valid, writable pointer.
#[no_mangle]
pub unsafe extern "C" fn sandpile_get_height(
    ptr: *const SandpileInstance,
    row: usize,
    col: usize,
    out_height: *mut u32,
) -> SandpileErrorCode {
    if out_height.is_null() {
        return track_error(&DefaultSandpileError::null_pointer("out_height"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr)? };
        let height = instance.sim.height_at(row, col)?;
        unsafe {
            *out_height = height;
        }
        Ok(())
    })
}

/// Read the grid dimensions in cells.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `sandpile_new*`.
/// - `out_width` and `out_height` must be valid, writable pointers.
#[no_mangle]
pub unsafe extern "C" fn sandpile_get_dimensions(
    ptr: *const SandpileInstance,
    out_width: *mut usize,
    out_height: *mut usize,
) -> SandpileErrorCode {
    if out_width.is_null() || out_height.is_null() {
        return track_error(&DefaultSandpileError::null_pointer("out_width/out_height"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr)? };
        unsafe {
            *out_width = instance.sim.width();
            *out_height = instance.sim.height();
        }
        Ok(())
    })
}

/// Fill `out_stats` with a snapshot of the instance's statistics.
///
/// This walks the whole grid; call it for diagnostics, not every frame.
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `sandpile_new*`.
/// - `out_stats` must be a valid, writable pointer.
#[no_mangle]
pub unsafe extern "C" fn sandpile_get_stats(
    ptr: *const SandpileInstance,
    out_stats: *mut SandpileStats,
) -> SandpileErrorCode {
    if out_stats.is_null() {
        return track_error(&DefaultSandpileError::null_pointer("out_stats"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr)? };
        unsafe {
            *out_stats = SandpileStats::from(instance.sim.stats());
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{sandpile_destroy, sandpile_new_seeded};
    use crate::seed::SandpileSeed;
    use crate::simulation::sandpile_compute_steps;

    fn new_pile(width: usize, height: usize, seed: SandpileSeed) -> *mut SandpileInstance {
        let mut pile: *mut SandpileInstance = ptr::null_mut();
        let code = unsafe { sandpile_new_seeded(width, height, seed, 0, &mut pile) };
        assert_eq!(code, SandpileErrorCode::Ok);
        pile
    }

    #[test]
    fn test_cells_pointer_is_live_and_stable() {
        let pile = new_pile(3, 3, SandpileSeed::Center { height: 4 });

        let mut len = 0;
        let mut cells: *const u32 = ptr::null();
        let code = unsafe { sandpile_get_cells(pile, &mut len, &mut cells) };
        assert_eq!(code, SandpileErrorCode::Ok);
        assert_eq!(len, 9);
        assert_eq!(unsafe { *cells.add(4) }, 4);

        let mut running = true;
        unsafe { sandpile_compute_steps(pile, 1, &mut running) };
        assert!(!running);

        let before = cells;
        let code = unsafe { sandpile_get_cells(pile, &mut len, &mut cells) };
        assert_eq!(code, SandpileErrorCode::Ok);
        assert_eq!(cells, before);
        let heights = unsafe { std::slice::from_raw_parts(cells, len) };
        assert_eq!(heights, &[0, 1, 0, 1, 0, 1, 0, 1, 0]);

        unsafe { sandpile_destroy(pile) };
    }

    #[test]
    fn test_cells_null_outputs() {
        let mut len = 7;
        let code = unsafe { sandpile_get_cells(ptr::null(), &mut len, ptr::null_mut()) };
        assert_eq!(code, SandpileErrorCode::NullPointer);
        assert_eq!(len, 0);

        let mut cells: *const u32 = ptr::null();
        let code = unsafe { sandpile_get_cells(ptr::null(), &mut len, &mut cells) };
        assert_eq!(code, SandpileErrorCode::NullPointer);
        assert!(cells.is_null());
    }

    #[test]
    fn test_scalar_queries() {
        let pile = new_pile(
            5,
            3,
            SandpileSeed::Point {
                row: 1,
                col: 2,
                height: 8,
            },
        );

        let (mut width, mut height) = (0, 0);
        unsafe { sandpile_get_dimensions(pile, &mut width, &mut height) };
        assert_eq!((width, height), (5, 3));

        let mut h = 0;
        assert_eq!(
            unsafe { sandpile_get_height(pile, 1, 2, &mut h) },
            SandpileErrorCode::Ok
        );
        assert_eq!(h, 8);
        assert_eq!(
            unsafe { sandpile_get_height(pile, 3, 0, &mut h) },
            SandpileErrorCode::OutOfRange
        );

        let mut running = true;
        while running {
            unsafe { sandpile_compute_steps(pile, 1, &mut running) };
        }

        let mut iteration = 0;
        unsafe { sandpile_get_iteration(pile, &mut iteration) };
        assert_eq!(iteration, 2);

        let mut stats = SandpileStats::default();
        assert_eq!(
            unsafe { sandpile_get_stats(pile, &mut stats) },
            SandpileErrorCode::Ok
        );
        assert_eq!(stats.iteration, 2);
        assert_eq!(stats.total_mass, 8);
        assert_eq!(stats.unstable_cells, 0);

        unsafe { sandpile_destroy(pile) };
    }
}
