use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Duration;

use colocmine::SpatialObject;

/// Reads in a file formatted as (comma separated):
///     id1,typeA,x,y
///     id2,typeB,x,y
///
/// Lines starting with '#' and blank lines are skipped
/// Coordinates should be floating-point decimal values
pub(crate) fn from_file(p: PathBuf) -> Vec<SpatialObject<f64>> {
    let reader = BufReader::new(File::open(p).unwrap());
    let mut objects = Vec::new();
    reader.lines().map(|l| l.unwrap()).for_each(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        let mut fields = line.split(',');
        let id = fields.next().expect("Error reading object id").trim();
        let kind = fields.next().expect("Error reading feature type").trim();
        let x = fields
            .next()
            .expect("Error reading x coordinate")
            .trim()
            .parse::<f64>()
            .expect("Error parsing x coordinate");
        let y = fields
            .next()
            .expect("Error reading y coordinate")
            .trim()
            .parse::<f64>()
            .expect("Error parsing y coordinate");
        objects.push(SpatialObject::new(id, kind, x, y));
    });
    objects
}

pub(crate) fn display_results(
    objects: &[SpatialObject<f64>],
    distance: f64,
    min_prev: f64,
    patterns: &[Vec<String>],
) {
    println!(
        "nObjects={} neighborDistance={} minPrev={} nPatterns={}",
        objects.len(),
        distance,
        min_prev,
        patterns.len()
    );
    patterns.iter().enumerate().for_each(|(idx, pattern)| {
        println!("[{}] {{{}}}", idx + 1, pattern.join(", "));
    });
}

/// Writes the run report to a file instead of stdout.
pub(crate) fn write_report(
    p: PathBuf,
    objects: &[SpatialObject<f64>],
    distance: f64,
    min_prev: f64,
    patterns: &[Vec<String>],
    elapsed: Duration,
) {
    let mut out = File::create(p).expect("Error creating output file");
    writeln!(out, "=== FINAL REPORT ===").unwrap();
    writeln!(out, "Total Objects:     {}", objects.len()).unwrap();
    writeln!(out, "Neighbor Distance: {}", distance).unwrap();
    writeln!(out, "Min Prevalence:    {}", min_prev).unwrap();
    writeln!(out, "Execution Time:    {:.3} s", elapsed.as_secs_f64()).unwrap();
    writeln!(out, "Patterns Found:    {}", patterns.len()).unwrap();
    writeln!(out, "----------------------------------------").unwrap();
    if patterns.is_empty() {
        writeln!(out, "No patterns found.").unwrap();
    } else {
        for (idx, pattern) in patterns.iter().enumerate() {
            writeln!(out, "[{}] {{{}}}", idx + 1, pattern.join(", ")).unwrap();
        }
    }
}
