mod grid;

use grid::GridGraph;
use route_planner::{PlannerConfig, RouteError, RouteModel as _, RoutePlanner, Weight};

use anyhow::{ensure, Context as _};
use clap::Parser;
use indicatif::ProgressBar;
use movingai::SceneRecord;
use tracing::{info, warn};

use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// The path to a .scen file from moving AI, or a directory of .scen files
    scenario: PathBuf,
    /// Maps directory
    #[arg(long)]
    maps: PathBuf,
    /// Update visited nodes when a cheaper way to them is found
    #[arg(long)]
    relax: bool,
    /// Real-world length of one grid cell
    #[arg(long, default_value_t = 1.0)]
    metric_scale: Weight,
    /// Write a Graphviz rendering of the graph and the last route found
    #[arg(long)]
    output_graph: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct Summary {
    scenarios: usize,
    mismatches: usize,
    unreachable: usize,
}

fn parse_scenario_file(file: &Path) -> anyhow::Result<(Vec<SceneRecord>, String)> {
    let scenarios = movingai::parser::parse_scen_file(file)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    let first_map = scenarios
        .first()
        .map(|s| s.map_file.clone())
        .with_context(|| format!("No scenarios in {}", file.display()))?;
    let same = scenarios.iter().all(|s| s.map_file == first_map);
    ensure!(
        same,
        "All maps are not the same as {first_map} in {scenario}",
        scenario = file.display()
    );
    Ok((scenarios, first_map))
}

fn run_for_scenario_file(
    scenario: &Path,
    cli: &Cli,
    config: &PlannerConfig,
    summary: &mut Summary,
) -> anyhow::Result<()> {
    let (scenarios, first_map) = parse_scenario_file(scenario)?;
    let path = cli.maps.join(&first_map);
    let raw_map = movingai::parser::parse_map_file(&path)
        .with_context(|| format!("Failed to parse map {}", path.display()))?;

    let mut grid = GridGraph::from_map(&raw_map, cli.metric_scale);
    info!(
        scenarios = scenarios.len(),
        nodes = grid.graph.len(),
        map = %first_map,
        "running scenario file"
    );

    let pg = ProgressBar::new(scenarios.len() as u64);
    for (scenario_idx, scenario) in scenarios.iter().enumerate() {
        pg.inc(1);
        summary.scenarios += 1;

        let (sx, sy) = grid.to_percent(scenario.start_pos);
        let (ex, ey) = grid.to_percent(scenario.goal_pos);
        let mut planner = RoutePlanner::new(&grid.graph, config.clone(), sx, sy, ex, ey)?;
        if grid.coord2node.get(&scenario.start_pos) != Some(&planner.start_node()) {
            pg.suspend(|| {
                warn!(
                    scenario_idx,
                    start = ?scenario.start_pos,
                    resolved = ?grid.node2coord.get(planner.start_node()),
                    "start resolved to another cell"
                )
            });
        }

        let route = match planner.search() {
            Ok(route) => route,
            Err(e @ RouteError::Unreachable { .. }) => {
                summary.unreachable += 1;
                pg.suspend(|| warn!(scenario_idx, "{e}"));
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let expected = scenario.optimal_length * cli.metric_scale as f64;
        let cost = route.distance as f64;
        let diff = (expected - cost).abs();
        if diff > 0.001 {
            summary.mismatches += 1;
            pg.suspend(|| {
                warn!(
                    "[{}/{}] shortest path mismatch. Start: {:?}, End: {:?}. Expected length {}, got {}, diff {}",
                    scenario_idx,
                    scenarios.len(),
                    scenario.start_pos,
                    scenario.goal_pos,
                    expected,
                    cost,
                    diff
                )
            });
        }
        grid.graph.store_path(route.path);
    }
    pg.finish_and_clear();

    if let Some(o) = &cli.output_graph {
        std::fs::write(o, route_planner::to_dot(&grid.graph))
            .with_context(|| format!("Bad path: {}", o.display()))?;
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<Summary> {
    let start = std::time::Instant::now();
    let config = PlannerConfig::default().with_relaxation(cli.relax);
    let mut summary = Summary::default();

    let path = &cli.scenario;
    if path.is_dir() {
        let itr = std::fs::read_dir(path)
            .with_context(|| format!("Failed to read directory {}", path.display()))?;
        for entry in itr {
            let entry = entry.context("Failed to read path")?;
            if entry.file_name().to_string_lossy().ends_with(".scen") {
                info!(
                    "Running for scenarios in {p}. (cargo run --release -- {p} --maps {m})",
                    p = entry.path().display(),
                    m = cli.maps.display(),
                );
                run_for_scenario_file(&entry.path(), &cli, &config, &mut summary)?;
            }
        }
    } else {
        run_for_scenario_file(path, &cli, &config, &mut summary)?;
    }
    info!("Took {} s to run", start.elapsed().as_secs_f32());
    Ok(summary)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("route_planner=info".parse()?)
                .add_directive("route_bench=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let summary = run(cli)?;
    info!(
        scenarios = summary.scenarios,
        mismatches = summary.mismatches,
        unreachable = summary.unreachable,
        "done"
    );
    Ok(())
}
