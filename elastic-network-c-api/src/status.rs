use std::panic::UnwindSafe;
use std::cell::RefCell;
use std::os::raw::c_char;
use std::ffi::CString;

use elastic_network::Error;

// Save the last error message in thread local storage.
//
// This is marginally better than a standard global static value because it
// allow multiple threads to each have separate errors conditions.
thread_local! {
    pub static LAST_ERROR_MESSAGE: RefCell<CString> = RefCell::new(CString::new("").expect("invalid C string"));
}

/// Status type returned by all functions in the C API. All errors are
/// negative, so they can be distinguished from a number of bonds.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum elnet_status_t {
    /// The function succeeded
    ELNET_SUCCESS = 0,
    /// A function got an invalid parameter
    ELNET_INVALID_PARAMETER_ERROR = -1,
    /// The positions are invalid or incomplete
    ELNET_INVALID_INPUT_ERROR = -2,
    /// There was an error reading or writing data
    ELNET_IO_ERROR = -3,
    /// There was an error reading or writing JSON
    ELNET_JSON_ERROR = -4,
    /// There was an error of unknown kind
    ELNET_UNKNOWN_ERROR = -254,
    /// There was an internal error (rust panic)
    ELNET_INTERNAL_PANIC = -255,
}

impl From<Error> for elnet_status_t {
    fn from(error: Error) -> elnet_status_t {
        LAST_ERROR_MESSAGE.with(|message| {
            *message.borrow_mut() = error_message(&error);
        });
        match error {
            Error::InvalidParameter(_) => elnet_status_t::ELNET_INVALID_PARAMETER_ERROR,
            Error::InvalidInput(_) => elnet_status_t::ELNET_INVALID_INPUT_ERROR,
            Error::Io(_) => elnet_status_t::ELNET_IO_ERROR,
            Error::Json(_) => elnet_status_t::ELNET_JSON_ERROR,
            Error::Panic(_) => elnet_status_t::ELNET_INTERNAL_PANIC,
            _ => elnet_status_t::ELNET_UNKNOWN_ERROR,
        }
    }
}

/// Get the message for `error` as a C string, removing any NULL byte from it
fn error_message(error: &Error) -> CString {
    let mut message = error.to_string().into_bytes();
    message.retain(|&byte| byte != 0);
    return CString::new(message).unwrap_or_default();
}

/// An alternative to `std::panic::catch_unwind` that automatically transform
/// the error into `elnet_status_t`.
pub fn catch_unwind<F>(function: F) -> elnet_status_t where F: FnOnce() -> Result<(), Error> + UnwindSafe {
    match std::panic::catch_unwind(function) {
        Ok(Ok(())) => elnet_status_t::ELNET_SUCCESS,
        Ok(Err(error)) => error.into(),
        Err(error) => Error::from(error).into()
    }
}

/// Check that pointers (used as C API function parameters) are not null.
#[macro_export]
macro_rules! check_pointers {
    ($pointer: ident) => {
        if $pointer.is_null() {
            return Err(elastic_network::Error::InvalidParameter(
                format!("got invalid NULL pointer for {}", stringify!($pointer))
            ));
        }
    };
    ($($pointer: ident),* $(,)?) => {
        $(check_pointers!($pointer);)*
    }
}

/// Get the last error message that was created on the current thread.
///
/// @returns the last error message, as a NULL-terminated string
#[no_mangle]
pub unsafe extern "C" fn elnet_last_error() -> *const c_char {
    let mut result = std::ptr::null();
    let wrapper = std::panic::AssertUnwindSafe(&mut result);
    let status = catch_unwind(move || {
        let wrapper = wrapper;
        LAST_ERROR_MESSAGE.with(|message| {
            *wrapper.0 = message.borrow().as_ptr();
        });
        Ok(())
    });

    if status != elnet_status_t::ELNET_SUCCESS {
        eprintln!("ERROR: unable to get last error message!");
        return std::ptr::null();
    }

    return result;
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;

    #[test]
    fn null_bytes_in_messages() {
        let status = elnet_status_t::from(Error::InvalidParameter("file a\0b.xyz".into()));
        assert_eq!(status, elnet_status_t::ELNET_INVALID_PARAMETER_ERROR);

        let message = unsafe { CStr::from_ptr(elnet_last_error()) };
        assert_eq!(message.to_str().unwrap(), "invalid parameter: file ab.xyz");
    }
}
