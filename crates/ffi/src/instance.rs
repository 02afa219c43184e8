use std::ptr;

use sandpile_core::{Sandpile, ToppleStrategy};

use crate::error::{DefaultSandpileError, SandpileErrorCode};
use crate::helpers::{track_error, track_result};
use crate::seed::{strategy_from_u8, SandpileSeed};

/// Opaque handle to one sandpile simulation.
///
/// # Threading
/// The instance is not internally synchronised. Drive it from one thread, and
/// do not read the cell buffer while `sandpile_compute_steps` is running; a
/// cooperative render loop satisfies both naturally.
///
/// # Usage
/// ```c
/// SandpileInstance* pile = NULL;
/// if (sandpile_new(320, 240, &pile) != Ok) {
///     fprintf(stderr, "%s\n", sandpile_get_last_error());
///     return;
/// }
/// bool running = true;
/// while (running) {
///     sandpile_compute_steps(pile, 100, &running);
///     size_t len = 0;
///     const uint32_t* cells = NULL;
///     sandpile_get_cells(pile, &len, &cells);
///     draw(cells, len);
/// }
/// sandpile_destroy(pile);
/// ```
pub struct SandpileInstance {
    pub(crate) sim: Sandpile,
}

impl SandpileInstance {
    /// Creates an instance with the given seed and backend.
    ///
    /// # Safety
    /// See [`SandpileSeed::build_grid`].
    pub(crate) unsafe fn new(
        width: usize,
        height: usize,
        seed: &SandpileSeed,
        strategy: ToppleStrategy,
    ) -> Result<Box<Self>, DefaultSandpileError> {
        let grid = unsafe { seed.build_grid(width, height)? };
        Ok(Box::new(Self {
            sim: Sandpile::from_grid(grid, strategy),
        }))
    }
}

/// Write the outcome of a constructor into `out_instance`.
///
/// # Safety
/// `out_instance` must be a valid, non-null, writable pointer.
unsafe fn publish(
    result: Result<Box<SandpileInstance>, DefaultSandpileError>,
    out_instance: *mut *mut SandpileInstance,
) -> SandpileErrorCode {
    match track_result(result) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            SandpileErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                // Set to null on error (per documentation contract)
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Create a zero-filled sandpile of `width` x `height` cells.
///
/// Returns
/// - `Ok` with a valid instance in `out_instance`
/// - `NullPointer` if `out_instance` is null
/// - `InvalidDimensions` if a dimension is zero or the grid is too large
///   (`out_instance` is set to null)
///
/// # Safety
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller owns the returned instance and MUST call `sandpile_destroy`
///   exactly once.
#[no_mangle]
pub unsafe extern "C" fn sandpile_new(
    width: usize,
    height: usize,
    out_instance: *mut *mut SandpileInstance,
) -> SandpileErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultSandpileError::null_pointer("out_instance"));
    }

    unsafe {
        publish(
            SandpileInstance::new(width, height, &SandpileSeed::Empty, ToppleStrategy::Auto),
            out_instance,
        )
    }
}

/// Create a sandpile with an initial fill and toppling backend.
///
/// `strategy`: 0 = auto, 1 = full scan (parallel), 2 = frontier (sparse).
///
/// Returns
/// - `Ok` with a valid instance in `out_instance`
/// - `NullPointer` if `out_instance` (or a `FromCells` buffer) is null
/// - `InvalidDimensions` for bad dimensions or a `FromCells` length mismatch
/// - `OutOfRange` if a `Point` seed lies outside the grid
/// - `InvalidParameter` for an unknown `strategy`
///
/// # Safety
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - For `FromCells`, `cells_ptr` must point to `len` readable values; they are
///   copied and the caller may free them afterwards.
/// - The caller owns the returned instance and MUST call `sandpile_destroy`.
#[no_mangle]
pub unsafe extern "C" fn sandpile_new_seeded(
    width: usize,
    height: usize,
    seed: SandpileSeed,
    strategy: u8,
    out_instance: *mut *mut SandpileInstance,
) -> SandpileErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultSandpileError::null_pointer("out_instance"));
    }

    let result = strategy_from_u8(strategy)
        .and_then(|strategy| unsafe { SandpileInstance::new(width, height, &seed, strategy) });
    unsafe { publish(result, out_instance) }
}

/// Destroy an instance created by `sandpile_new*`. Null is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `sandpile_new*` and not freed already.
/// - Any cell pointer obtained from `sandpile_get_cells` dangles afterwards.
#[no_mangle]
pub unsafe extern "C" fn sandpile_destroy(ptr: *mut SandpileInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: `ptr` came from `Box::into_raw` in `publish` and is still live.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::sandpile_get_last_error_code;

    #[test]
    fn test_new_and_destroy() {
        let mut pile: *mut SandpileInstance = ptr::null_mut();
        let code = unsafe { sandpile_new(8, 4, &mut pile) };
        assert_eq!(code, SandpileErrorCode::Ok);
        assert!(!pile.is_null());
        unsafe { sandpile_destroy(pile) };
    }

    #[test]
    fn test_invalid_dimensions_null_out() {
        let mut pile: *mut SandpileInstance = ptr::null_mut();
        let code = unsafe { sandpile_new(0, 4, &mut pile) };
        assert_eq!(code, SandpileErrorCode::InvalidDimensions);
        assert!(pile.is_null());
        assert_eq!(sandpile_get_last_error_code(), SandpileErrorCode::InvalidDimensions);
    }

    #[test]
    fn test_null_out_instance() {
        let code = unsafe { sandpile_new(4, 4, ptr::null_mut()) };
        assert_eq!(code, SandpileErrorCode::NullPointer);
    }

    #[test]
    fn test_seeded_from_cells() {
        let cells = [0_u32, 1, 2, 3, 4, 5];
        let seed = SandpileSeed::FromCells {
            cells_ptr: cells.as_ptr(),
            len: cells.len(),
        };
        let mut pile: *mut SandpileInstance = ptr::null_mut();
        let code = unsafe { sandpile_new_seeded(3, 2, seed, 2, &mut pile) };
        assert_eq!(code, SandpileErrorCode::Ok);

        let instance = unsafe { &*pile };
        assert_eq!(instance.sim.raw_view().as_slice(), &cells);
        assert_eq!(instance.sim.strategy_name(), "frontier");
        unsafe { sandpile_destroy(pile) };
    }

    #[test]
    fn test_seeded_rejects_bad_strategy_and_length() {
        let mut pile: *mut SandpileInstance = ptr::null_mut();
        let code =
            unsafe { sandpile_new_seeded(3, 3, SandpileSeed::Center { height: 9 }, 7, &mut pile) };
        assert_eq!(code, SandpileErrorCode::InvalidParameter);
        assert!(pile.is_null());

        let cells = [1_u32; 5];
        let seed = SandpileSeed::FromCells {
            cells_ptr: cells.as_ptr(),
            len: cells.len(),
        };
        let code = unsafe { sandpile_new_seeded(3, 2, seed, 0, &mut pile) };
        assert_eq!(code, SandpileErrorCode::InvalidDimensions);
        assert!(pile.is_null());
    }
}
