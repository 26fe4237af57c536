use std::path::Path;
use std::process::exit;
use std::time::Instant;

use colocmine::ColocationMiner;

use crate::ops::{display_results, from_file, write_report};

mod ops;

#[macro_use]
extern crate clap;

fn main() {
    env_logger::init();
    let matches = clap_app!(colocmine =>
        (version: "0.1.0")
        (about: "Weighted spatial co-location pattern mining")
        (@arg INPUT: -i --input +takes_value +required "Path to input CSV of id,kind,x,y rows")
        (@arg DISTANCE: -d --distance +takes_value "Neighbor distance threshold, default=5.0")
        (@arg MIN_PREV: -p --min_prev +takes_value "Minimum weighted prevalence in [0,1], default=0.6")
        (@arg THREADS: -t --threads +takes_value "Number of worker threads, default=4")
        (@arg OUTPUT: -o --output +takes_value "Write the run report to this file instead of stdout")
    )
    .get_matches();

    let input_file = matches.value_of("INPUT").unwrap().to_string();
    if !Path::new(&input_file).exists() {
        eprintln!("Unable to locate input file {}", input_file);
        exit(1);
    }
    let distance = matches
        .value_of("DISTANCE")
        .unwrap_or("5.0")
        .parse::<f64>()
        .expect("Unable to parse distance");
    let min_prev = matches
        .value_of("MIN_PREV")
        .unwrap_or("0.6")
        .parse::<f64>()
        .expect("Unable to parse min_prev");
    let threads = matches
        .value_of("THREADS")
        .unwrap_or("4")
        .parse::<usize>()
        .expect("Unable to parse threads");
    if threads < 1 {
        eprintln!("Improper parameter set!");
        exit(2);
    }

    let objects = from_file(Path::new(&input_file).to_path_buf());

    let miner = match ColocationMiner::new(distance, min_prev, threads) {
        Ok(miner) => miner,
        Err(e) => {
            eprintln!("{}", e);
            exit(2);
        }
    };
    let start = Instant::now();
    match miner.mine(&objects) {
        Ok(patterns) => {
            let elapsed = start.elapsed();
            match matches.value_of("OUTPUT") {
                Some(output) => write_report(
                    Path::new(output).to_path_buf(),
                    &objects,
                    distance,
                    min_prev,
                    &patterns,
                    elapsed,
                ),
                None => display_results(&objects, distance, min_prev, &patterns),
            }
            log::info!("total runtime {:?}", elapsed);
        }
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    }
}
