use log::debug;
use ndarray::ArrayView2;
use rayon::prelude::*;

use crate::{CellList, Dimension, Error, Grid, NetworkParameters, SimulationBox};
use crate::domain::size_domain;

/// A single spring in an elastic network
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond {
    /// index of the first particle in the bond, including the offset
    pub first: usize,
    /// index of the second particle in the bond, including the offset
    pub second: usize,
    /// strength of the spring
    pub spring_constant: f64,
    /// equilibrium length of the spring, i.e. the distance between the
    /// particles, accounting for periodic boundary conditions
    pub distance: f64,
}

/// Generator of elastic networks, connecting all particles closer than a
/// cutoff with springs.
#[derive(Debug, Clone)]
pub struct ElasticNetwork {
    parameters: NetworkParameters,
    dimension: Dimension,
}

impl ElasticNetwork {
    /// Create a new `ElasticNetwork` with the given parameters
    pub fn new(parameters: NetworkParameters) -> Result<ElasticNetwork, Error> {
        let dimension = parameters.validate()?;
        return Ok(ElasticNetwork { parameters, dimension });
    }

    /// Create a new `ElasticNetwork` with parameters given in JSON
    pub fn from_json(parameters: &str) -> Result<ElasticNetwork, Error> {
        ElasticNetwork::new(NetworkParameters::from_json(parameters)?)
    }

    /// Get the parameters used by this `ElasticNetwork`
    pub fn parameters(&self) -> &NetworkParameters {
        &self.parameters
    }

    /// Get the dimensionality of space for this `ElasticNetwork`
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Compute the elastic network for the first `n_particles` positions
    /// yielded by `positions`, calling `emit` for every bond.
    ///
    /// Bonds are emitted in order of their first particle, and the first
    /// particle is always the one with the largest index. This returns the
    /// number of bonds, or an error if less than `n_particles` positions are
    /// available. When an error is returned, `emit` is never called.
    pub fn compute<I, R, F>(&self, n_particles: usize, positions: I, mut emit: F) -> Result<usize, Error> where
        I: IntoIterator<Item = Result<R, Error>>,
        R: AsRef<[f64]>,
        F: FnMut(Bond) -> Result<(), Error>,
    {
        let (simulation_box, positions) = size_domain(
            self.dimension,
            &self.parameters.box_lengths,
            self.parameters.cutoff,
            n_particles,
            positions,
        )?;
        debug!(
            "read {} positions, final box lengths are {:?} with periodicity {:?}",
            positions.nrows(), simulation_box.lengths(), simulation_box.periodic()
        );

        let grid = Grid::new(simulation_box, self.parameters.cutoff)?;
        let cell_list = CellList::new(grid, positions.view());

        let search = NeighborSearch {
            cell_list: &cell_list,
            positions: positions.view(),
            cutoff: self.parameters.cutoff,
            spring_constant: self.parameters.spring_constant,
            offset: self.parameters.offset,
        };

        if self.parameters.parallel {
            let mut n_bonds = 0;
            for bond in search.all_bonds_parallel() {
                emit(bond)?;
                n_bonds += 1;
            }
            return Ok(n_bonds);
        } else {
            return search.all_bonds(&mut emit);
        }
    }

    /// Compute the elastic network for the first `n_particles` positions
    /// yielded by `positions` and collect all the bonds.
    pub fn bonds<I, R>(&self, n_particles: usize, positions: I) -> Result<Vec<Bond>, Error> where
        I: IntoIterator<Item = Result<R, Error>>,
        R: AsRef<[f64]>,
    {
        let mut bonds = Vec::new();
        self.compute(n_particles, positions, |bond| {
            bonds.push(bond);
            Ok(())
        })?;
        return Ok(bonds);
    }
}

/// Search for all pairs closer than the cutoff, using a cell list. The cell
/// list is only read during the search.
struct NeighborSearch<'a> {
    cell_list: &'a CellList,
    positions: ArrayView2<'a, f64>,
    cutoff: f64,
    spring_constant: f64,
    offset: usize,
}

impl<'a> NeighborSearch<'a> {
    fn simulation_box(&self) -> &SimulationBox {
        self.cell_list.grid().simulation_box()
    }

    /// Emit all the bonds between particle `i` and particles with a smaller
    /// index, returning the number of bonds.
    fn bonds_of<F>(&self, i: usize, emit: &mut F) -> Result<usize, Error> where
        F: FnMut(Bond) -> Result<(), Error> + ?Sized,
    {
        let grid = self.cell_list.grid();
        let simulation_box = self.simulation_box();
        let n_axes = simulation_box.dimension().count();
        let position_i = self.positions.row(i);

        let mut n_bonds = 0;
        let coordinates = grid.cell_coordinates(position_i);
        for cell in grid.neighbor_cells(coordinates) {
            for j in self.cell_list.particles_in(cell) {
                // each pair is visited twice, keep only one of them. This
                // also removes pairs between a particle and itself.
                if j >= i {
                    continue;
                }

                let position_j = self.positions.row(j);
                let mut displacement = [0.0; 3];
                let displacement = &mut displacement[..n_axes];
                for (axis, component) in displacement.iter_mut().enumerate() {
                    *component = position_j[axis] - position_i[axis];
                }
                simulation_box.minimum_image(displacement);

                let distance = displacement.iter().map(|d| d * d).sum::<f64>().sqrt();
                if distance <= self.cutoff {
                    emit(Bond {
                        first: self.offset + i,
                        second: self.offset + j,
                        spring_constant: self.spring_constant,
                        distance: distance,
                    })?;
                    n_bonds += 1;
                }
            }
        }

        return Ok(n_bonds);
    }

    #[time_graph::instrument(name = "NeighborSearch::all_bonds")]
    fn all_bonds(&self, emit: &mut dyn FnMut(Bond) -> Result<(), Error>) -> Result<usize, Error> {
        let mut n_bonds = 0;
        for i in 0..self.cell_list.n_particles() {
            n_bonds += self.bonds_of(i, &mut *emit)?;
        }
        return Ok(n_bonds);
    }

    /// Same as `all_bonds`, running the search for different particles in
    /// parallel. The bonds are returned in the same order as `all_bonds`.
    #[time_graph::instrument(name = "NeighborSearch::all_bonds_parallel")]
    fn all_bonds_parallel(&self) -> Vec<Bond> {
        let bonds_by_particle = (0..self.cell_list.n_particles())
            .into_par_iter()
            .map(|i| {
                let mut bonds = Vec::new();
                self.bonds_of(i, &mut |bond| {
                    bonds.push(bond);
                    Ok(())
                }).expect("collecting bonds can not fail");
                bonds
            })
            .collect::<Vec<_>>();

        return bonds_by_particle.into_iter().flatten().collect();
    }
}
