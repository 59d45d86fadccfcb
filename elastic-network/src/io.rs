//! Reading positions from and writing bonds to text files.
//!
//! Positions are stored one particle per line, with whitespace-separated
//! coordinates. Bonds are written one per line as `i j K r`, separated by
//! tabulations.
use std::io::{BufRead, Lines, Write};

use log::info;

use crate::{Bond, Dimension, Error};

/// Streaming reader for particles positions in a text file.
///
/// Every line starting with at least `dimension` numbers is a valid position,
/// additional fields are ignored. Other lines are skipped. The reader stops
/// after `n_particles` positions.
pub struct PositionReader<R> {
    lines: Lines<R>,
    dimension: Dimension,
    n_particles: usize,
    n_read: usize,
}

impl<R: BufRead> PositionReader<R> {
    /// Create a new reader for `n_particles` positions from `reader`. If
    /// `n_particles` is `None`, the number of particles is read from the
    /// first line of input.
    pub fn new(reader: R, dimension: Dimension, n_particles: Option<usize>) -> Result<PositionReader<R>, Error> {
        let mut lines = reader.lines();

        let n_particles = if let Some(n_particles) = n_particles {
            n_particles
        } else {
            let header = lines.next().transpose()?.ok_or_else(|| Error::InvalidInput(
                "expected the number of particles on the first line, got an empty input".into()
            ))?;

            let n_particles = header.split_whitespace()
                .next()
                .and_then(|value| value.parse::<usize>().ok())
                .ok_or_else(|| Error::InvalidInput(format!(
                    "expected the number of particles on the first line, got '{}'", header
                )))?;

            info!("Number of particles: {}", n_particles);
            n_particles
        };

        return Ok(PositionReader {
            lines: lines,
            dimension: dimension,
            n_particles: n_particles,
            n_read: 0,
        });
    }

    /// Get the number of particles this reader will try to read
    pub fn n_particles(&self) -> usize {
        self.n_particles
    }
}

impl<R: BufRead> Iterator for PositionReader<R> {
    type Item = Result<[f64; 3], Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.n_read >= self.n_particles {
            return None;
        }

        for line in &mut self.lines {
            let line = match line {
                Ok(line) => line,
                Err(error) => return Some(Err(error.into())),
            };

            if let Some(position) = parse_position(&line, self.dimension) {
                self.n_read += 1;
                return Some(Ok(position));
            }
        }

        return None;
    }
}

/// Parse the first `dimension` fields of `line` as a position. Unused axes are
/// set to zero.
fn parse_position(line: &str, dimension: Dimension) -> Option<[f64; 3]> {
    let mut fields = line.split_whitespace();
    let mut position = [0.0; 3];
    for value in position.iter_mut().take(dimension.count()) {
        *value = fields.next()?.parse().ok()?;
    }
    return Some(position);
}

/// Write a single `bond` to `writer`
pub fn write_bond<W: Write>(writer: &mut W, bond: &Bond) -> Result<(), Error> {
    writeln!(
        writer, "{}\t{}\t{:.6}\t{:.6}",
        bond.first, bond.second, bond.spring_constant, bond.distance
    )?;
    return Ok(());
}

/// Write all the `bonds` to `writer`, in order
pub fn write_bonds<W: Write>(writer: &mut W, bonds: &[Bond]) -> Result<(), Error> {
    for bond in bonds {
        write_bond(writer, bond)?;
    }
    return Ok(());
}
