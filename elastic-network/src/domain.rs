//! The `SimulationBox` type represents the box enclosing all particles, with
//! periodic boundary conditions along some of the axes and open boundaries
//! along the others.
use log::warn;
use ndarray::Array2;

use crate::Error;

/// Dimensionality of the space containing the particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    One = 1,
    Two = 2,
    Three = 3,
}

impl Dimension {
    /// Get the number of spatial axes for this dimensionality
    pub fn count(self) -> usize {
        self as usize
    }
}

impl TryFrom<i64> for Dimension {
    type Error = Error;

    fn try_from(value: i64) -> Result<Dimension, Error> {
        match value {
            1 => Ok(Dimension::One),
            2 => Ok(Dimension::Two),
            3 => Ok(Dimension::Three),
            _ => Err(Error::InvalidParameter(format!(
                "invalid dimensionality {}, expected 1, 2 or 3", value
            ))),
        }
    }
}

impl TryFrom<usize> for Dimension {
    type Error = Error;

    fn try_from(value: usize) -> Result<Dimension, Error> {
        let value = i64::try_from(value).unwrap_or(i64::MAX);
        Dimension::try_from(value)
    }
}

/// A `SimulationBox` is an orthogonal box centered on the origin. Each axis is
/// either periodic, with a fixed length given by the user; or open, with a
/// length inferred from the particles positions.
///
/// Only the first `dimension.count()` entries of the per-axis arrays are used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBox {
    dimension: Dimension,
    lengths: [f64; 3],
    periodic: [bool; 3],
}

impl SimulationBox {
    /// Create a new box from the raw lengths along each axis. A positive
    /// length makes the corresponding axis periodic, a zero or negative length
    /// makes it open. Only the first `dimension.count()` lengths are used.
    pub fn new(dimension: Dimension, raw_lengths: &[f64]) -> Result<SimulationBox, Error> {
        let n_axes = dimension.count();
        if raw_lengths.len() < n_axes {
            return Err(Error::InvalidParameter(format!(
                "expected {} box lengths for a {}-dimensional space, got {}",
                n_axes, n_axes, raw_lengths.len()
            )));
        }

        let mut lengths = [0.0; 3];
        let mut periodic = [false; 3];
        for (axis, &length) in raw_lengths.iter().take(n_axes).enumerate() {
            if !length.is_finite() {
                return Err(Error::InvalidParameter(format!(
                    "box length along axis {} must be a finite number, got {}", axis, length
                )));
            }

            periodic[axis] = length > 0.0;
            lengths[axis] = length;
        }

        return Ok(SimulationBox { dimension, lengths, periodic });
    }

    /// Get the dimensionality of this box
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Get the length of the box along each axis
    pub fn lengths(&self) -> &[f64] {
        &self.lengths[..self.dimension.count()]
    }

    /// Get the periodicity of each axis
    pub fn periodic(&self) -> &[bool] {
        &self.periodic[..self.dimension.count()]
    }

    /// Is the given `axis` periodic?
    pub fn is_periodic(&self, axis: usize) -> bool {
        self.periodic()[axis]
    }

    /// Grow the open axes of this box until they contain the given
    /// `position`. Periodic axes are left untouched.
    pub fn enclose(&mut self, position: &[f64]) {
        for axis in 0..self.dimension.count() {
            if self.periodic[axis] {
                continue;
            }

            // the box is centered on the origin
            let extent = 2.0 * f64::abs(position[axis]);
            if extent > self.lengths[axis] {
                self.lengths[axis] = extent;
            }
        }
    }

    /// Make sure the box is at least three times the `cutoff` along each axis,
    /// so that a grid of cells with size `cutoff` contains at least three cells
    /// in every direction.
    pub fn ensure_minimal_length(&mut self, cutoff: f64) {
        let minimal = 3.0 * cutoff;
        for axis in 0..self.dimension.count() {
            if self.lengths[axis] < minimal {
                self.lengths[axis] = minimal;
                warn!(
                    "box length along axis {} is too narrow, increased to {}",
                    axis, minimal
                );
            }
        }
    }

    /// Apply the minimum image convention to the given `displacement`, which
    /// must contain exactly one component per axis. Components along open axes
    /// are left unmodified.
    pub fn minimum_image(&self, displacement: &mut [f64]) {
        debug_assert_eq!(displacement.len(), self.dimension.count());
        for (axis, component) in displacement.iter_mut().enumerate() {
            if self.periodic[axis] {
                let length = self.lengths[axis];
                *component -= f64::floor(*component / length + 0.5) * length;
            }
        }
    }
}

/// Read the first `n_particles` positions from `positions`, and determine the
/// final simulation box for these particles and the given `cutoff`.
///
/// The positions are stored in an array with one row per particle and one
/// column per axis. Only the first `dimension.count()` components of each
/// position are used.
///
/// This returns an error if `positions` contains less than `n_particles`
/// entries, or if any of these entries is an error.
pub fn size_domain<I, R>(
    dimension: Dimension,
    raw_lengths: &[f64],
    cutoff: f64,
    n_particles: usize,
    positions: I,
) -> Result<(SimulationBox, Array2<f64>), Error> where
    I: IntoIterator<Item = Result<R, Error>>,
    R: AsRef<[f64]>,
{
    let n_axes = dimension.count();
    let mut simulation_box = SimulationBox::new(dimension, raw_lengths)?;

    // the declared number of particles might not match the actual input
    let mut data = Vec::with_capacity(usize::min(n_particles, 1 << 20) * n_axes);
    let mut n_read = 0;
    for position in positions.into_iter().take(n_particles) {
        let position = position?;
        let position = position.as_ref();
        if position.len() < n_axes {
            return Err(Error::InvalidInput(format!(
                "position of particle {} has {} components, expected at least {}",
                n_read, position.len(), n_axes
            )));
        }

        let position = &position[..n_axes];
        if position.iter().any(|value| !value.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "position of particle {} contains non-finite values: {:?}",
                n_read, position
            )));
        }

        simulation_box.enclose(position);
        data.extend_from_slice(position);
        n_read += 1;
    }

    if n_read < n_particles {
        return Err(Error::InvalidInput(format!(
            "end of input reached prematurely: expected {} positions, got {}",
            n_particles, n_read
        )));
    }

    simulation_box.ensure_minimal_length(cutoff);

    let positions = Array2::from_shape_vec((n_particles, n_axes), data)?;
    return Ok((simulation_box, positions));
}

#[cfg(test)]
mod tests {
    use approx::{assert_relative_eq, assert_ulps_eq};

    use super::*;

    fn ok_rows(rows: &[&[f64]]) -> Vec<Result<Vec<f64>, Error>> {
        rows.iter().map(|row| Ok(row.to_vec())).collect()
    }

    #[test]
    fn dimension() {
        assert_eq!(Dimension::try_from(1_i64).unwrap(), Dimension::One);
        assert_eq!(Dimension::try_from(2_usize).unwrap(), Dimension::Two);
        assert_eq!(Dimension::try_from(3_i64).unwrap().count(), 3);

        for invalid in [-1_i64, 0, 4] {
            let error = Dimension::try_from(invalid).unwrap_err();
            assert_eq!(
                error.to_string(),
                format!("invalid parameter: invalid dimensionality {}, expected 1, 2 or 3", invalid)
            );
        }
    }

    #[test]
    fn periodicity() {
        let simulation_box = SimulationBox::new(Dimension::Three, &[10.0, -1.0, 0.0]).unwrap();
        assert_eq!(simulation_box.periodic(), [true, false, false]);
        assert_eq!(simulation_box.lengths(), [10.0, -1.0, 0.0]);

        // extra lengths are ignored
        let simulation_box = SimulationBox::new(Dimension::One, &[-1.0, 5.0, 5.0]).unwrap();
        assert_eq!(simulation_box.periodic(), [false]);
        assert_eq!(simulation_box.lengths().len(), 1);

        let error = SimulationBox::new(Dimension::Two, &[1.0]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid parameter: expected 2 box lengths for a 2-dimensional space, got 1"
        );

        assert!(SimulationBox::new(Dimension::One, &[f64::NAN]).is_err());
    }

    #[test]
    fn enclose() {
        let mut simulation_box = SimulationBox::new(Dimension::Two, &[4.0, -1.0]).unwrap();
        simulation_box.enclose(&[7.0, 0.5]);
        assert_eq!(simulation_box.lengths(), [4.0, 1.0]);

        simulation_box.enclose(&[0.0, -3.0]);
        assert_eq!(simulation_box.lengths(), [4.0, 6.0]);

        // already enclosed
        simulation_box.enclose(&[0.0, 2.5]);
        assert_eq!(simulation_box.lengths(), [4.0, 6.0]);
    }

    #[test]
    fn minimal_length() {
        let mut simulation_box = SimulationBox::new(Dimension::Three, &[10.0, 2.0, -1.0]).unwrap();
        simulation_box.ensure_minimal_length(1.5);
        assert_eq!(simulation_box.lengths(), [10.0, 4.5, 4.5]);
        // periodicity is not affected by the growth
        assert_eq!(simulation_box.periodic(), [true, true, false]);
    }

    #[test]
    fn minimum_image() {
        let simulation_box = SimulationBox::new(Dimension::Two, &[10.0, -1.0]).unwrap();

        let mut displacement = [9.8, 9.8];
        simulation_box.minimum_image(&mut displacement);
        assert_relative_eq!(displacement[0], -0.2, epsilon = 1e-12);
        assert_eq!(displacement[1], 9.8);

        let mut displacement = [-6.0, -6.0];
        simulation_box.minimum_image(&mut displacement);
        assert_ulps_eq!(displacement[0], 4.0);
        assert_eq!(displacement[1], -6.0);
    }

    #[test]
    fn sizing() {
        let rows = ok_rows(&[&[0.0], &[1.0], &[2.0]]);
        let (simulation_box, positions) = size_domain(Dimension::One, &[-1.0], 1.5, 3, rows).unwrap();

        assert_eq!(simulation_box.periodic(), [false]);
        assert_eq!(simulation_box.lengths(), [4.5]);
        assert_eq!(positions.shape(), [3, 1]);
        assert_eq!(positions[[2, 0]], 2.0);
    }

    #[test]
    fn only_first_components() {
        let rows = ok_rows(&[&[0.0, 1.0, 100.0], &[1.0, 2.0, -100.0]]);
        let (simulation_box, positions) = size_domain(Dimension::Two, &[-1.0, -1.0, -1.0], 0.1, 2, rows).unwrap();

        assert_eq!(simulation_box.lengths(), [2.0, 4.0]);
        assert_eq!(positions.shape(), [2, 2]);
    }

    #[test]
    fn stop_after_n_particles() {
        let rows = ok_rows(&[&[0.0], &[1.0], &[50.0]]);
        let (simulation_box, positions) = size_domain(Dimension::One, &[-1.0], 0.1, 2, rows).unwrap();

        assert_eq!(simulation_box.lengths(), [2.0]);
        assert_eq!(positions.shape(), [2, 1]);
    }

    #[test]
    fn premature_end() {
        let rows = ok_rows(&[&[0.0], &[1.0], &[2.0]]);
        let error = size_domain(Dimension::One, &[-1.0], 1.0, 5, rows).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid input: end of input reached prematurely: expected 5 positions, got 3"
        );
    }

    #[test]
    fn invalid_rows() {
        let rows = ok_rows(&[&[0.0, 0.0], &[1.0]]);
        let error = size_domain(Dimension::Two, &[-1.0, -1.0], 1.0, 2, rows).unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));

        let rows = ok_rows(&[&[f64::INFINITY]]);
        let error = size_domain(Dimension::One, &[-1.0], 1.0, 1, rows).unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));

        let rows = vec![
            Ok(vec![0.0]),
            Err(Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "broken"))),
        ];
        let error = size_domain(Dimension::One, &[-1.0], 1.0, 2, rows).unwrap_err();
        assert!(matches!(error, Error::Io(_)));
    }
}
