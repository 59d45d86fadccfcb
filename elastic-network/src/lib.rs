#![warn(clippy::all, clippy::pedantic)]

// disable some style lints
#![allow(clippy::needless_return, clippy::must_use_candidate, clippy::comparison_chain)]
#![allow(clippy::redundant_field_names, clippy::redundant_closure_for_method_calls)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::module_name_repetitions)]

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap, clippy::cast_lossless, clippy::cast_sign_loss)]

// Tests lints
#![cfg_attr(test, allow(clippy::float_cmp))]

//! Generation of elastic networks: every pair of particles closer than a
//! cutoff is connected by a spring, with an equilibrium length equal to the
//! distance between the particles.
//!
//! Pairs are found with a cell list, in a box which can be periodic along
//! some axes and open along the others.

mod errors;
pub use self::errors::Error;

pub mod domain;
pub use self::domain::{Dimension, SimulationBox};

pub mod cell_list;
pub use self::cell_list::{Grid, CellList, CellListBuilder};

mod parameters;
pub use self::parameters::NetworkParameters;

mod network;
pub use self::network::{ElasticNetwork, Bond};

pub mod io;
pub use self::io::PositionReader;
