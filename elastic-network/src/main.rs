use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use log::{info, error, Record, Metadata};

use elastic_network::{Dimension, ElasticNetwork, Error, NetworkParameters, PositionReader};
use elastic_network::io::write_bond;

/// Implementation of `log::Log` printing all messages to the standard error,
/// keeping the standard output for the bonds.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            match record.level() {
                log::Level::Info => eprintln!("{}", record.args()),
                level => eprintln!("{}: {}", level, record.args()),
            }
        }
    }

    fn flush(&self) {}
}

fn usage(program: &str) {
    println!("Usage: {} <N> <Rc> <K> <Lx> <Ly> <Lz> <file> [DIM]", program);
    println!("Parameters:");
    println!("\tN:\tNumber of particles to read from file (set to -1 to read from the top of the input file).");
    println!("\tRc:\tCut-off radius for bonds.");
    println!("\tK:\tBond strength parameter.");
    println!("\tLx, Ly, Lz:\tBox dimensions (enter -1 for no periodic boundary conditions).");
    println!("\tfile:\tFilename of particle positions (Format: x y z ... by rows).");
    println!("\tDIM:\tDimensionality of space (1, 2 or 3).");
}

fn parse<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, Error> {
    value.parse().map_err(|_| Error::InvalidParameter(format!(
        "invalid value for {}: '{}'", name, value
    )))
}

fn run(args: &[String]) -> Result<(), Error> {
    let n_particles = parse::<i64>("N", &args[1])?;
    let cutoff = parse::<f64>("Rc", &args[2])?;
    let spring_constant = parse::<f64>("K", &args[3])?;
    let box_lengths = vec![
        parse::<f64>("Lx", &args[4])?,
        parse::<f64>("Ly", &args[5])?,
        parse::<f64>("Lz", &args[6])?,
    ];
    let path = &args[7];
    let dimension = match args.get(8) {
        Some(value) => parse::<i64>("DIM", value)?,
        None => 3,
    };
    let dimension = Dimension::try_from(dimension)?;

    let network = ElasticNetwork::new(NetworkParameters {
        cutoff: cutoff,
        spring_constant: spring_constant,
        box_lengths: box_lengths,
        dimension: dimension.count(),
        offset: 0,
        parallel: false,
    })?;

    let file = File::open(path).map_err(|error| Error::InvalidParameter(format!(
        "unable to open file {}: {}", path, error
    )))?;

    let n_particles = usize::try_from(n_particles).ok();
    let positions = PositionReader::new(BufReader::new(file), dimension, n_particles)?;

    let stdout = std::io::stdout();
    let mut output = BufWriter::new(stdout.lock());
    let n_bonds = network.compute(positions.n_particles(), positions, |bond| {
        write_bond(&mut output, &bond)
    })?;
    output.flush()?;

    info!("Generated {} bonds.", n_bonds);
    return Ok(());
}

fn main() {
    let args = std::env::args().collect::<Vec<_>>();
    if args.len() < 8 {
        usage(args.first().map_or("elastic-network", String::as_str));
        return;
    }

    // we only ever set one logger, the result can be ignored
    let _ = log::set_logger(&LOGGER);
    if cfg!(debug_assertions) {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }

    let profile = std::env::var_os("ELASTIC_NETWORK_PROFILE").is_some();
    time_graph::enable_data_collection(profile);

    let result = run(&args);

    if profile {
        let graph = time_graph::get_full_graph();
        eprintln!("{}", graph.as_short_table());
    }

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
