use std::ffi::CString;
use std::os::raw::c_char;
use std::sync::Mutex;

use log::{Record, Metadata};

/// Callback function type for logging. The first parameter is the log level
/// (1 for errors up to 5 for trace messages), and the second the message.
#[allow(non_camel_case_types)]
pub type elnet_logging_callback_t = Option<unsafe extern "C" fn(level: i32, message: *const c_char)>;

static GLOBAL_CALLBACK: Mutex<elnet_logging_callback_t> = Mutex::new(None);

/// Implementation of `log::Log` that forward all log messages to the global
/// `elnet_logging_callback_t`.
struct CallbackLogger;

static LOGGER: CallbackLogger = CallbackLogger;

/// Set the callback function used for all log messages, replacing any
/// previous callback. Passing `NULL` disables logging.
#[no_mangle]
pub unsafe extern "C" fn elnet_set_logging_callback(callback: elnet_logging_callback_t) {
    *GLOBAL_CALLBACK.lock().expect("mutex was poisoned") = callback;
    // we allow multiple sets of logger, therefore the result will be ignored
    let _ = log::set_logger(&LOGGER);

    if cfg!(debug_assertions) {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }
}

impl log::Log for CallbackLogger {
    fn enabled(&self, _: &Metadata) -> bool {
       return true;
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("{} -- {}", record.target(), record.args());
            let message_cstr = match CString::new(message) {
                Ok(message) => message,
                // messages with NULL bytes in them are dropped
                Err(_) => return,
            };

            let callback = *GLOBAL_CALLBACK.lock().expect("mutex was poisoned");
            if let Some(callback) = callback {
                unsafe {
                    callback(record.level() as i32, message_cstr.as_ptr());
                }
            }
        }
    }

    fn flush(&self) {}
}
