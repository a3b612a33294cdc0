use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use boundpath::movingai;
use boundpath::{JpsPlusSearcher, PreprocessedMap};
use boundpath_grid::{octile_distance, BitGrid};
use clap::Parser;

#[derive(Parser)]
struct Options {
    /// Scenario file to run, or a map file with --preprocess.
    path: PathBuf,
    /// Preprocess the map and write the `.bp` sidecar file next to it.
    #[arg(long)]
    preprocess: bool,
}

fn main() {
    let opt = Options::parse();

    if opt.preprocess {
        let map = movingai::read_map(&opt.path).unwrap();
        let tables = PreprocessedMap::compute(&map, |done, total, elapsed| {
            let progress = done as f64 / total as f64;
            let eta = (elapsed.as_secs_f64() / progress - elapsed.as_secs_f64()) as u64;
            let mut stdout = std::io::stdout().lock();
            let _ = write!(
                stdout,
                "\r{:5.1}% ETA {:2} min {:2} sec",
                progress * 100.0,
                eta / 60,
                eta % 60,
            );
            let _ = stdout.flush();
        });
        println!();

        let mut sidecar = opt.path.into_os_string();
        sidecar.push(".bp");
        let mut file = BufWriter::new(File::create(sidecar).unwrap());
        tables.save(&map, &mut file).unwrap();
        return;
    }

    let t1 = std::time::Instant::now();

    let scen = movingai::read_scenario(&opt.path).unwrap();
    let map = movingai::read_map(&scen.map).unwrap();

    let mut sidecar = scen.map.clone().into_os_string();
    sidecar.push(".bp");
    let mut file = BufReader::new(
        File::open(&sidecar).unwrap_or_else(|_| {
            panic!("missing {sidecar:?}; run with --preprocess on the map first")
        }),
    );
    let tables = PreprocessedMap::load(&map, &mut file).unwrap();
    let mut searcher = JpsPlusSearcher::new(&tables);

    let t2 = std::time::Instant::now();

    let mut invalid = 0;
    let mut suboptimal = 0;
    let mut unreachable = 0;
    for problem in &scen.instances {
        match searcher.get_path(problem.start, problem.target) {
            Some(path) => {
                let length = path_length(&path);
                if path[0] != problem.start
                    || *path.last().unwrap() != problem.target
                    || !valid_path(&map, &path)
                {
                    invalid += 1;
                }
                if length / problem.optimal.max(f64::MIN_POSITIVE) > 1.000005 {
                    suboptimal += 1;
                }
            }
            None => {
                unreachable += 1;
                if problem.optimal > 0.0 {
                    invalid += 1;
                }
            }
        }
    }

    let t3 = std::time::Instant::now();

    println!(
        "{} instances: {invalid} invalid, {suboptimal} suboptimal, {unreachable} unreachable",
        scen.instances.len(),
    );
    eprintln!("Load: {:<10.2?} Search: {:.2?}", t2 - t1, t3 - t2);
}

fn path_length(path: &[(i32, i32)]) -> f64 {
    path.windows(2)
        .map(|pair| octile_distance(pair[0], pair[1]))
        .sum()
}

fn valid_path(map: &BitGrid, path: &[(i32, i32)]) -> bool {
    path.windows(2).all(|pair| {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        let (dx, dy) = (x1 - x0, y1 - y0);
        dx.abs() <= 1
            && dy.abs() <= 1
            && (dx, dy) != (0, 0)
            && map.get(x0, y0)
            && map.get(x1, y1)
            && (dx == 0 || dy == 0 || (map.get(x0 + dx, y0) && map.get(x0, y0 + dy)))
    })
}
