use std::ffi::CString;

use crate::error::{with_last_error_mut, DefaultSandpileError, FfiError, SandpileErrorCode};
use crate::instance::SandpileInstance;

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl FfiError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Clear the thread-local error message and code.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = SandpileErrorCode::Ok;
    });
}

/// Record an error and return its code.
#[inline]
pub(crate) fn track_error(error: &impl FfiError) -> SandpileErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the error of a failed result, clear it on success.
pub(crate) fn track_result<T>(result: Result<T, DefaultSandpileError>) -> Result<T, SandpileErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error)),
    }
}

/// Run `f` and turn its result into an error code.
pub(crate) fn handle_ffi_result_error<F>(f: F) -> SandpileErrorCode
where
    F: FnOnce() -> Result<(), DefaultSandpileError>,
{
    match track_result(f()) {
        Ok(()) => SandpileErrorCode::Ok,
        Err(code) => code,
    }
}

/// Borrow an instance from a raw pointer.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by `sandpile_new*`.
pub(crate) unsafe fn instance_from_ptr<'a>(
    ptr: *const SandpileInstance,
) -> Result<&'a SandpileInstance, DefaultSandpileError> {
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultSandpileError::null_pointer("ptr"))
}

/// Mutably borrow an instance from a raw pointer.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by `sandpile_new*` with no
/// other outstanding borrow.
pub(crate) unsafe fn instance_from_mut_ptr<'a>(
    ptr: *mut SandpileInstance,
) -> Result<&'a mut SandpileInstance, DefaultSandpileError> {
    unsafe { ptr.as_mut() }.ok_or_else(|| DefaultSandpileError::null_pointer("ptr"))
}
