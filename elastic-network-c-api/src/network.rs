use std::os::raw::{c_int, c_void};

use elastic_network::{Dimension, ElasticNetwork, Error, NetworkParameters};

use crate::{catch_unwind, elnet_status_t};

/// Callback function type receiving the bonds of an elastic network, one at
/// the time. `user_data` is the pointer given to `elnet_elastic_network`,
/// `first` and `second` are the indexes of the bonded particles (including
/// the offset), `spring_constant` is the strength of the bond and `distance`
/// its equilibrium length.
#[allow(non_camel_case_types)]
pub type elnet_bond_callback_t = Option<unsafe extern "C" fn(
    user_data: *mut c_void,
    first: i64,
    second: i64,
    spring_constant: f64,
    distance: f64,
)>;

/// Compute the elastic network connecting all particles closer than `cutoff`.
///
/// @param n_particles number of particles to use. If this is negative, all the
///        `n_positions` positions are used
/// @param cutoff cutoff radius for bonds
/// @param spring_constant strength of all bonds
/// @param lengths box lengths along each axis, this must contain `dimension`
///        values. Positive values make the corresponding axis periodic, zero
///        or negative values make it open.
/// @param positions positions of the particles, as `n_positions` rows of
///        `dimension` values
/// @param n_positions number of rows in `positions`
/// @param dimension dimensionality of space, 1, 2 or 3
/// @param offset offset added to the particles indexes in the bonds
/// @param callback function called for every bond. This can be `NULL` to
///        only count the bonds
/// @param user_data pointer passed as-is to `callback`
///
/// @returns The number of bonds, or a negative `elnet_status_t` if there was
///          an error. In this case, you can use `elnet_last_error()` to get
///          the full error message, and any bond given to the callback must be
///          discarded.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn elnet_elastic_network(
    n_particles: i64,
    cutoff: f64,
    spring_constant: f64,
    lengths: *const f64,
    positions: *const f64,
    n_positions: usize,
    dimension: c_int,
    offset: i64,
    callback: elnet_bond_callback_t,
    user_data: *mut c_void,
) -> i64 {
    let mut n_bonds = 0;
    let unwind_wrapper = std::panic::AssertUnwindSafe(&mut n_bonds);
    let status = catch_unwind(move || {
        let unwind_wrapper = unwind_wrapper;
        check_pointers!(lengths);

        let dimension = Dimension::try_from(i64::from(dimension))?;
        let offset = usize::try_from(offset).map_err(|_| Error::InvalidParameter(format!(
            "offset must be positive or zero, got {}", offset
        )))?;

        let lengths = std::slice::from_raw_parts(lengths, dimension.count());
        let positions: &[f64] = if n_positions == 0 {
            &[]
        } else {
            check_pointers!(positions);
            std::slice::from_raw_parts(positions, n_positions * dimension.count())
        };

        let n_particles = usize::try_from(n_particles).unwrap_or(n_positions);

        let network = ElasticNetwork::new(NetworkParameters {
            cutoff: cutoff,
            spring_constant: spring_constant,
            box_lengths: lengths.to_vec(),
            dimension: dimension.count(),
            offset: offset,
            parallel: false,
        })?;

        let rows = positions.chunks_exact(dimension.count()).map(Ok);
        let count = network.compute(n_particles, rows, |bond| {
            if let Some(callback) = callback {
                callback(
                    user_data,
                    bond.first as i64,
                    bond.second as i64,
                    bond.spring_constant,
                    bond.distance,
                );
            }
            Ok(())
        })?;

        *unwind_wrapper.0 = count as i64;
        Ok(())
    });

    if status == elnet_status_t::ELNET_SUCCESS {
        return n_bonds;
    }
    return status as i64;
}
