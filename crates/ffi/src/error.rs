use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use sandpile_core::SandpileError;

/// Common interface for FFI error types.
///
/// - `code()` - the error code returned across the FFI boundary
/// - `msg()` - the human-readable message stored for `sandpile_get_last_error`
pub(crate) trait FfiError {
    fn code(&self) -> SandpileErrorCode;

    fn msg(&self) -> &str;
}

/// Error code plus message for failures detected at the FFI boundary or
/// forwarded from the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultSandpileError {
    code: SandpileErrorCode,
    msg: String,
}

impl DefaultSandpileError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: SandpileErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for an argument outside its accepted range.
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: SandpileErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<SandpileError> for DefaultSandpileError {
    fn from(error: SandpileError) -> Self {
        let code = match error {
            SandpileError::InvalidDimensions { .. } => SandpileErrorCode::InvalidDimensions,
            SandpileError::OutOfRange { .. } => SandpileErrorCode::OutOfRange,
            SandpileError::HeightOverflow { .. } => SandpileErrorCode::HeightOverflow,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl FfiError for DefaultSandpileError {
    fn code(&self) -> SandpileErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by sandpile functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandpileErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Null pointer passed where non-null required.
    NullPointer = 1,

    /// Width or height is zero, or the cell count cannot be allocated.
    InvalidDimensions = 2,

    /// Row or column outside the grid.
    OutOfRange = 3,

    /// Adding grains would overflow a cell's height.
    HeightOverflow = 4,

    /// Invalid parameter passed to function.
    InvalidParameter = 5,
}

impl From<DefaultSandpileError> for SandpileErrorCode {
    fn from(error: DefaultSandpileError) -> Self {
        error.code
    }
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    /// The `CString` is kept alive here so a borrowed pointer can be handed out.
    static LAST_ERROR: RefCell<(Option<CString>, SandpileErrorCode)> = const { RefCell::new((None, SandpileErrorCode::Ok)) };
}

pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, SandpileErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, SandpileErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns null if no error has occurred on this thread.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread that
/// sets or clears the error. **DO NOT FREE THIS POINTER.**
///
/// Example:
/// ```c
/// SandpileInstance* pile = NULL;
/// if (sandpile_new(0, 10, &pile) != Ok) {
///     printf("%s\n", sandpile_get_last_error());
/// }
/// ```
#[no_mangle]
pub extern "C" fn sandpile_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code (`Ok` if none).
#[no_mangle]
pub extern "C" fn sandpile_get_last_error_code() -> SandpileErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
