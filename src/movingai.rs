//! Readers for the MovingAI benchmark formats: octile `.map` files and
//! `.scen` scenario files.

use std::fs::File;
use std::io::{BufRead, BufReader, Error, Result};
use std::path::{Path, PathBuf};

use boundpath_grid::BitGrid;

pub struct Problem {
    pub bucket: u32,
    pub start: (i32, i32),
    pub target: (i32, i32),
    pub optimal: f64,
}

pub struct Scenario {
    pub map: PathBuf,
    pub instances: Vec<Problem>,
}

/// Reads an octile map; `.`, `G`, and `S` cells are traversable.
pub fn read_map(path: &Path) -> Result<BitGrid> {
    let mut lines = BufReader::new(File::open(path)?).lines();
    let mut header = |expected: &str| -> Result<String> {
        let line = lines.next().transpose()?.unwrap_or_default();
        match line.split_whitespace().collect::<Vec<_>>()[..] {
            [key, value] if key == expected => Ok(value.to_owned()),
            _ => Err(Error::other(format!("expected \"{expected} <value>\", got {line:?}"))),
        }
    };

    let octile = header("type")?;
    if octile != "octile" {
        return Err(Error::other(format!("unsupported map type {octile:?}")));
    }
    let height: i32 = header("height")?.parse().map_err(Error::other)?;
    let width: i32 = header("width")?.parse().map_err(Error::other)?;
    if !(1..=boundpath_grid::MAX_MAP_DIM).contains(&width)
        || !(1..=boundpath_grid::MAX_MAP_DIM).contains(&height)
    {
        return Err(Error::other(format!("invalid map size {width}x{height}")));
    }
    if lines.next().transpose()?.as_deref() != Some("map") {
        return Err(Error::other("expected map token"));
    }

    let mut map = BitGrid::new(width, height);
    for (y, row) in lines.enumerate() {
        let row = row?;
        if y as i32 >= height {
            return Err(Error::other("too many rows of map"));
        }
        for (x, cell) in row.chars().enumerate() {
            if x as i32 >= width {
                return Err(Error::other("too many columns of map"));
            }
            map.set(x as i32, y as i32, matches!(cell, '.' | 'G' | 'S'));
        }
    }
    Ok(map)
}

/// Reads a scenario file; the named map must be shared by every instance and
/// is resolved relative to the scenario's directory when possible.
pub fn read_scenario(path: &Path) -> Result<Scenario> {
    let mut lines = BufReader::new(File::open(path)?).lines();

    let version = lines.next().transpose()?.unwrap_or_default();
    if !matches!(
        version.split_whitespace().collect::<Vec<_>>()[..],
        ["version", "1" | "1.0"]
    ) {
        return Err(Error::other(format!("unsupported scenario version {version:?}")));
    }

    let mut map = None;
    let mut instances = vec![];
    for line in lines {
        let line = line?;
        let mut tokens = line.split_whitespace();
        let Some(bucket) = tokens.next() else {
            continue;
        };

        let mut field = |name: &str| {
            tokens
                .next()
                .ok_or_else(|| Error::other(format!("instance missing field {name}")))
        };
        let instance_map = field("map")?.to_owned();
        let _ = field("map width")?;
        let _ = field("map height")?;
        let start_x = field("start x")?;
        let start_y = field("start y")?;
        let target_x = field("goal x")?;
        let target_y = field("goal y")?;
        let optimal = field("optimal length")?;

        if *map.get_or_insert(instance_map.clone()) != instance_map {
            return Err(Error::other("instance names a different map"));
        }

        let parse = |token: &str| token.parse::<i32>().map_err(Error::other);
        instances.push(Problem {
            bucket: bucket.parse().map_err(Error::other)?,
            start: (parse(start_x)?, parse(start_y)?),
            target: (parse(target_x)?, parse(target_y)?),
            optimal: optimal.parse().map_err(Error::other)?,
        });
    }

    let map = map.ok_or_else(|| Error::other("scenario has no instances"))?;
    let local = path.parent().unwrap_or(Path::new("")).join(&map);
    Ok(Scenario {
        map: if local.try_exists()? {
            local
        } else {
            PathBuf::from(map)
        },
        instances,
    })
}
