use crate::{Dimension, Error};

#[derive(Debug, Clone, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
/// Parameters for the generation of an elastic network.
///
/// Every pair of particles closer than `cutoff` is connected by a spring with
/// strength `spring_constant`, and an equilibrium length equal to the distance
/// between the particles.
pub struct NetworkParameters {
    /// Cutoff radius for bonds. Pairs of particles at exactly this distance
    /// are bonded.
    pub cutoff: f64,
    /// Strength of every spring in the network
    pub spring_constant: f64,
    /// Length of the simulation box along each axis. A positive length makes
    /// the axis periodic, a zero or negative length makes it open, with a
    /// length determined from the positions. Only the first `dimension`
    /// values are used.
    pub box_lengths: Vec<f64>,
    /// Dimensionality of space, 1, 2 or 3
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// Offset added to the particles indexes in the bonds. This is useful to
    /// combine multiple networks into one.
    #[serde(default)]
    pub offset: usize,
    /// Should the neighbors search run in parallel? The output is the same as
    /// the sequential search.
    #[serde(default)]
    pub parallel: bool,
}

fn default_dimension() -> usize {
    3
}

impl NetworkParameters {
    /// Create parameters from their JSON representation
    pub fn from_json(json: &str) -> Result<NetworkParameters, Error> {
        let parameters = serde_json::from_str(json)?;
        return Ok(parameters);
    }

    /// Get the JSON representation of these parameters
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("failed to serialize to JSON")
    }

    /// Check that these parameters are valid, and get the corresponding
    /// dimensionality.
    pub fn validate(&self) -> Result<Dimension, Error> {
        let dimension = Dimension::try_from(self.dimension)?;

        if !(self.cutoff > 0.0 && self.cutoff.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "cutoff must be a positive number, got {}", self.cutoff
            )));
        }

        if self.box_lengths.len() < dimension.count() {
            return Err(Error::InvalidParameter(format!(
                "expected {} box lengths for a {}-dimensional space, got {}",
                dimension.count(), dimension.count(), self.box_lengths.len()
            )));
        }

        return Ok(dimension);
    }
}
