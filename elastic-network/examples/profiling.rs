use std::fs::File;
use std::io::BufReader;

use elastic_network::{ElasticNetwork, PositionReader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).expect("expected a command line argument");

    // enable collection of profiling data
    time_graph::enable_data_collection(true);
    // clear any existing collected data
    time_graph::clear_collected_data();

    // run the calculation
    let n_bonds = compute_network(&path)?;
    println!("generated {} bonds", n_bonds);

    // get the call graph and display it
    let graph = time_graph::get_full_graph();
    // (this requires the "table" feature for the time_graph crate)
    println!("{}", graph.as_short_table());

    // also available for saving profiling data to the disk & future analysis
    // (this requires the "json" feature for the time_graph crate)
    println!("{}", graph.as_json());

    Ok(())
}

/// Compute a periodic elastic network for the positions in the file at
/// `path`. The number of particles is read from the first line.
fn compute_network(path: &str) -> Result<usize, Box<dyn std::error::Error>> {
    let parameters = r#"{
        "cutoff": 1.5,
        "spring_constant": 10.0,
        "box_lengths": [30.0, 30.0, 30.0],
        "parallel": true
    }"#;

    let network = ElasticNetwork::from_json(parameters)?;

    let file = BufReader::new(File::open(path)?);
    let positions = PositionReader::new(file, network.dimension(), None)?;

    let n_bonds = time_graph::spanned!("Full calculation", {
        network.compute(positions.n_particles(), positions, |_| Ok(()))?
    });

    Ok(n_bonds)
}
