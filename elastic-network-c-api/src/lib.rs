#![warn(clippy::all, clippy::pedantic)]

// disable some style lints
#![allow(clippy::needless_return, clippy::redundant_field_names, clippy::upper_case_acronyms)]
#![allow(clippy::missing_errors_doc, clippy::missing_safety_doc, clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate, clippy::cast_possible_wrap)]

#[macro_use]
mod status;
pub use self::status::{catch_unwind, elnet_status_t, elnet_last_error};

mod logging;
pub use self::logging::{elnet_logging_callback_t, elnet_set_logging_callback};

mod network;
pub use self::network::{elnet_bond_callback_t, elnet_elastic_network};
