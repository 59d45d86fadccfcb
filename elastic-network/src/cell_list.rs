//! Cell lists sort particles inside a uniform grid of cells at least as large
//! as the cutoff, so that neighbors of a particle only need to be searched in
//! the cells adjacent to its own.
use log::debug;
use ndarray::{ArrayView1, ArrayView2};

use crate::{Error, SimulationBox};

/// Maximal number of cells, we need to use this to prevent having too many
/// cells with a large box and a small cutoff
const MAX_NUMBER_OF_CELLS: f64 = 1e6;

/// Relative margin by which cells are larger than the cutoff. Two particles
/// at exactly the cutoff distance must end up in adjacent cells even when
/// their cell coordinates are rounded.
const CELL_SIZE_MARGIN: f64 = 1e-9;

/// Uniform grid of cells covering a [`SimulationBox`].
///
/// Cells are identified either by their integer coordinates along each axis,
/// or by a single flattened index where the coordinate along the first axis
/// varies fastest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    simulation_box: SimulationBox,
    /// length covered by the grid along each axis. This is the box length,
    /// slightly extended on open axes where three cells would otherwise be
    /// smaller than the cutoff.
    lengths: [f64; 3],
    /// number of cells along each axis, 1 for unused axes
    n_cells: [usize; 3],
    /// size of the cells along each axis
    cell_size: [f64; 3],
}

impl Grid {
    /// Create a new grid with cells slightly larger than `cutoff` covering the
    /// given `simulation_box`.
    ///
    /// The box must be at least three times the cutoff along every axis, see
    /// [`SimulationBox::ensure_minimal_length`].
    pub fn new(simulation_box: SimulationBox, cutoff: f64) -> Result<Grid, Error> {
        if !(cutoff > 0.0 && cutoff.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "cutoff must be a positive number, got {}", cutoff
            )));
        }

        let n_axes = simulation_box.dimension().count();
        let minimal_cell_size = cutoff * (1.0 + CELL_SIZE_MARGIN);

        let mut lengths = [0.0; 3];
        let mut n_cells = [1.0; 3];
        for (axis, &length) in simulation_box.lengths().iter().enumerate() {
            if length < 3.0 * cutoff {
                return Err(Error::InvalidParameter(format!(
                    "box length along axis {} ({}) must be at least three times the cutoff ({})",
                    axis, length, cutoff
                )));
            }

            // with three cells along a periodic axis, all cells are neighbors
            // of each other and the cell size does not matter. Along open
            // axes, the grid can extend past the box instead.
            lengths[axis] = if simulation_box.is_periodic(axis) {
                length
            } else {
                f64::max(length, 3.0 * minimal_cell_size)
            };

            n_cells[axis] = f64::max(f64::floor(lengths[axis] / minimal_cell_size), 3.0);
        }

        // limit memory consumption by ensuring we have less than
        // `MAX_NUMBER_OF_CELLS` cells, while keeping the ratio of cells in
        // each direction. Larger cells still contain all neighbors.
        let n_cells_total = n_cells.iter().product::<f64>();
        if n_cells_total > MAX_NUMBER_OF_CELLS {
            reduce_cells_count(&mut n_cells[..n_axes]);
            debug!(
                "too many cells ({}) in the cell list, reduced to {:?}",
                n_cells_total, &n_cells[..n_axes]
            );
        }

        let n_cells = [n_cells[0] as usize, n_cells[1] as usize, n_cells[2] as usize];
        let mut cell_size = [0.0; 3];
        for axis in 0..n_axes {
            cell_size[axis] = lengths[axis] / n_cells[axis] as f64;
        }

        let grid = Grid { simulation_box, lengths, n_cells, cell_size };
        debug!(
            "using a grid of {:?} cells with size {:?}",
            grid.n_cells(), grid.cell_size()
        );

        return Ok(grid);
    }

    /// Get the simulation box covered by this grid
    pub fn simulation_box(&self) -> &SimulationBox {
        &self.simulation_box
    }

    /// Get the number of cells along each axis
    pub fn n_cells(&self) -> &[usize] {
        &self.n_cells[..self.simulation_box.dimension().count()]
    }

    /// Get the size of the cells along each axis
    pub fn cell_size(&self) -> &[f64] {
        &self.cell_size[..self.simulation_box.dimension().count()]
    }

    /// Get the total number of cells in this grid
    pub fn count(&self) -> usize {
        self.n_cells.iter().product()
    }

    /// Get the coordinates of the cell containing the given `position`.
    ///
    /// Positions are expected inside the box, between `-L/2` and `L/2`.
    /// Positions outside of the box are wrapped back inside along periodic
    /// axes, and assigned to the closest cell along open axes.
    pub fn cell_coordinates(&self, position: ArrayView1<'_, f64>) -> [usize; 3] {
        let n_axes = self.simulation_box.dimension().count();

        let mut coordinates = [0; 3];
        for (axis, &length) in self.lengths[..n_axes].iter().enumerate() {
            let n_cells = self.n_cells[axis] as i64;
            let coordinate = f64::floor((position[axis] + 0.5 * length) / self.cell_size[axis]) as i64;

            let coordinate = if self.simulation_box.is_periodic(axis) {
                coordinate.rem_euclid(n_cells)
            } else {
                coordinate.clamp(0, n_cells - 1)
            };
            coordinates[axis] = coordinate as usize;
        }

        return coordinates;
    }

    /// Get the flattened index of the cell with the given `coordinates`
    pub fn cell_index(&self, coordinates: [usize; 3]) -> usize {
        debug_assert!((0..3).all(|axis| coordinates[axis] < self.n_cells[axis]));
        coordinates[0] + self.n_cells[0] * (coordinates[1] + self.n_cells[1] * coordinates[2])
    }

    /// Iterate over the flattened indexes of the cell at `coordinates` and all
    /// the cells adjacent to it, wrapping around periodic axes. Along open
    /// axes, cells outside of the grid are skipped.
    pub fn neighbor_cells(&self, coordinates: [usize; 3]) -> NeighborCells<'_> {
        NeighborCells {
            grid: self,
            center: coordinates,
            current: 0,
            // 3^D offsets, including the zero offset
            total: usize::pow(3, self.simulation_box.dimension().count() as u32),
        }
    }
}

/// Scale down the number of cells along each axis until there are at most
/// `MAX_NUMBER_OF_CELLS` cells in total, keeping at least three cells along
/// every axis.
fn reduce_cells_count(n_cells: &mut [f64]) {
    loop {
        let total = n_cells.iter().product::<f64>();
        let n_scalable = n_cells.iter().filter(|&&n| n > 3.0).count();
        if total <= MAX_NUMBER_OF_CELLS || n_scalable == 0 {
            return;
        }

        // axes already down to three cells keep their size, the others
        // absorb the whole reduction
        let scale = f64::powf(MAX_NUMBER_OF_CELLS / total, 1.0 / n_scalable as f64);
        for n in n_cells.iter_mut().filter(|n| **n > 3.0) {
            *n = f64::max(f64::floor(*n * scale), 3.0);
        }
    }
}

/// Iterator over the cells adjacent to a given cell, created by
/// [`Grid::neighbor_cells`]
#[derive(Debug, Clone)]
pub struct NeighborCells<'a> {
    grid: &'a Grid,
    center: [usize; 3],
    current: usize,
    total: usize,
}

impl<'a> NeighborCells<'a> {
    /// Get the cell at the given offset of the center cell, or `None` if it is
    /// outside an open axis. The `offset` encodes the shift along axis `k` as
    /// the k-th digit in base 3, axis 0 being the least significant digit.
    fn cell_at(&self, offset: usize) -> Option<usize> {
        let periodic = self.grid.simulation_box.periodic();

        let mut digits = offset;
        let mut coordinates = [0; 3];
        for (axis, &periodic) in periodic.iter().enumerate() {
            let delta = (digits % 3) as i64 - 1;
            digits /= 3;

            let n_cells = self.grid.n_cells[axis] as i64;
            let mut coordinate = self.center[axis] as i64 + delta;
            if coordinate < 0 || coordinate >= n_cells {
                if !periodic {
                    return None;
                }
                // there are at least 3 cells along each axis, so wrapping once
                // never visits the same cell twice
                coordinate -= delta * n_cells;
            }
            coordinates[axis] = coordinate as usize;
        }

        return Some(self.grid.cell_index(coordinates));
    }
}

impl<'a> Iterator for NeighborCells<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.current < self.total {
            let offset = self.current;
            self.current += 1;
            if let Some(cell) = self.cell_at(offset) {
                return Some(cell);
            }
        }
        return None;
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.total - self.current))
    }
}

/// Builder for a [`CellList`]. Particles are added one at the time in the
/// cells, and the builder is then frozen into a read-only `CellList`.
#[derive(Debug, Clone)]
pub struct CellListBuilder {
    grid: Grid,
    /// first particle in each cell
    head: Vec<Option<usize>>,
    /// next particle in the same cell as a given particle
    next: Vec<Option<usize>>,
}

impl CellListBuilder {
    /// Create a new builder with empty cells, for up to `n_particles`
    /// particles.
    pub fn new(grid: Grid, n_particles: usize) -> CellListBuilder {
        CellListBuilder {
            head: vec![None; grid.count()],
            next: vec![None; n_particles],
            grid: grid,
        }
    }

    /// Add the particle with the given `index` and `position` to the cell
    /// containing it.
    ///
    /// # Panics
    ///
    /// If `index` is larger than the number of particles given to
    /// [`CellListBuilder::new`].
    pub fn add_particle(&mut self, index: usize, position: ArrayView1<'_, f64>) {
        let cell = self.grid.cell_index(self.grid.cell_coordinates(position));
        self.next[index] = self.head[cell];
        self.head[cell] = Some(index);
    }

    /// Freeze this builder into a `CellList`
    pub fn finish(self) -> CellList {
        CellList {
            grid: self.grid,
            head: self.head,
            next: self.next,
        }
    }
}

/// The cell list stores the particles contained in each cell of a [`Grid`] as
/// singly linked chains: `head` gives the first particle in each cell, and
/// `next` the following particle in the same cell as any particle.
#[derive(Debug, Clone)]
pub struct CellList {
    grid: Grid,
    head: Vec<Option<usize>>,
    next: Vec<Option<usize>>,
}

impl CellList {
    /// Create a new cell list containing all the particles in `positions`,
    /// with one particle per row.
    #[time_graph::instrument(name = "CellList::new")]
    pub fn new(grid: Grid, positions: ArrayView2<'_, f64>) -> CellList {
        let mut builder = CellListBuilder::new(grid, positions.nrows());
        for (index, position) in positions.outer_iter().enumerate() {
            builder.add_particle(index, position);
        }
        return builder.finish();
    }

    /// Get the grid used by this cell list
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Get the number of particles in this cell list
    pub fn n_particles(&self) -> usize {
        self.next.len()
    }

    /// Iterate over the particles in the cell with the given flattened index.
    /// Particles are visited in the reverse order of insertion.
    pub fn particles_in(&self, cell: usize) -> CellParticles<'_> {
        CellParticles {
            next: &self.next,
            current: self.head[cell],
        }
    }
}

/// Iterator over the particles inside a single cell, created by
/// [`CellList::particles_in`]
#[derive(Debug, Clone)]
pub struct CellParticles<'a> {
    next: &'a [Option<usize>],
    current: Option<usize>,
}

impl<'a> Iterator for CellParticles<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.current?;
        self.current = self.next[current];
        return Some(current);
    }
}
