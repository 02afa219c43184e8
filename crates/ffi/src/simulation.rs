use crate::error::{DefaultSandpileError, SandpileErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_mut_ptr};
use crate::instance::SandpileInstance;

/// Advance the sandpile by up to `n` toppling steps.
///
/// `out_running` receives `true` while unstable cells remain and `false` once
/// the grid is stable. Any cell pointer taken before this call must be
/// re-fetched with `sandpile_get_cells`.
///
/// Returns
/// - `Ok` on success
/// - `NullPointer` if `ptr` or `out_running` is null
///
/// # Safety
/// - `ptr` must be null or a live pointer returned by `sandpile_new*`.
/// - `out_running` must be null or a valid pointer to a `bool`.
#[no_mangle]
pub unsafe extern "C" fn sandpile_compute_steps(
    ptr: *mut SandpileInstance,
    n: u32,
    out_running: *mut bool,
) -> SandpileErrorCode {
    handle_ffi_result_error(|| {
        if out_running.is_null() {
            return Err(DefaultSandpileError::null_pointer("out_running"));
        }
        let instance = unsafe { instance_from_mut_ptr(ptr)? };
        let running = instance.sim.compute_steps(n);
        unsafe {
            *out_running = running;
        }
        Ok(())
    })
}

/// Drop `amount` grains onto cell `(row, col)`.
///
/// Returns
/// - `Ok` on success
/// - `NullPointer` if `ptr` is null
/// - `OutOfRange` if the cell lies outside the grid
/// - `HeightOverflow` if the cell's height would overflow
///
/// # Safety
/// `ptr` must be null or a live pointer returned by `sandpile_new*`.
#[no_mangle]
pub unsafe extern "C" fn sandpile_add_grains(
    ptr: *mut SandpileInstance,
    row: usize,
    col: usize,
    amount: u32,
) -> SandpileErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_mut_ptr(ptr)? };
        instance.sim.add_grains(row, col, amount)?;
        Ok(())
    })
}
