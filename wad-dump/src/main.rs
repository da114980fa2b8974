mod cli;

use std::error::Error;
use std::fs;

use cli::*;
use log::{info, warn};
use simplelog::TermLogger;
use wad::{ChildRef, LevelNodes, WadArchive, WadStack};

fn main() -> Result<(), Box<dyn Error>> {
    let options: CLIOptions = argh::from_env();

    TermLogger::init(
        options.verbose.unwrap_or(log::LevelFilter::Warn),
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut paths = vec![options.wad.clone()];
    paths.extend(options.pwad.iter().cloned());
    let files = paths
        .iter()
        .map(fs::read)
        .collect::<Result<Vec<_>, _>>()?;

    let mut stack = WadStack::new();
    for (path, data) in paths.iter().zip(&files) {
        let wad = WadArchive::parse_with(data, (&options).into())?;
        let header = wad.header();
        info!(
            "{}: {:?}, {} lumps, directory at {:#x}",
            path, header.kind, header.lump_count, header.directory_offset
        );
        stack.add(wad);
    }

    if options.list {
        for (n, wad) in stack.archives().iter().enumerate() {
            println!("{}", paths[n]);
            for (i, lump) in wad.lumps().iter().enumerate() {
                println!(
                    "{:5} {:<8} {:>10} {:>10}{}",
                    i,
                    lump.name,
                    lump.offset,
                    lump.size,
                    if lump.compressed { " compressed" } else { "" }
                );
            }
        }
    }

    if let Some(map) = &options.map {
        dump_level(&stack, map)?;
    }
    Ok(())
}

fn dump_level(stack: &WadStack<'_>, map: &str) -> Result<(), Box<dyn Error>> {
    let level = LevelNodes::from_stack(stack, map)?;
    info!("{}: {:?} nodes", map, level.format());
    if let Some(org) = level.num_org_vertices() {
        info!(
            "{}: {} extra vertexes after the first {}",
            map,
            level.extra_vertexes().len(),
            org
        );
    }

    let leaves = level
        .nodes()
        .iter()
        .flat_map(|n| n.children)
        .filter(|c| c.is_subsector())
        .count();
    let root = match level.root() {
        ChildRef::Node(i) => format!("node {}", i),
        ChildRef::SubSector(i) => format!("subsector {}", i),
    };
    println!(
        "{} {:?}: {} nodes ({} leaf children), {} segs, {} subsectors, root {}",
        map,
        level.format(),
        level.nodes().len(),
        leaves,
        level.segs().len(),
        level.subsectors().len(),
        root
    );

    let seg_total: u64 = level.subsectors().iter().map(|s| s.seg_count as u64).sum();
    if seg_total != level.segs().len() as u64 {
        warn!(
            "{}: subsectors reference {} segs, SEGS holds {}",
            map,
            seg_total,
            level.segs().len()
        );
    }
    Ok(())
}
