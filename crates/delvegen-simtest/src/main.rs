//! Delvegen Headless Generation Harness
//!
//! Generates dungeons across a seed sweep and validates every layout
//! invariant. Runs entirely in-process, no rendering beyond ASCII.
//!
//! Usage:
//!   cargo run -p delvegen-simtest
//!   cargo run -p delvegen-simtest -- --verbose
//!   cargo run -p delvegen-simtest -- --seed 42 --map
//!   cargo run -p delvegen-simtest -- --config dungeon.json --json

use std::collections::BTreeSet;

use delvegen_core::engine::{generate, DungeonEngine};
use delvegen_core::layout::Layout;
use delvegen_core::observer::{EventRecorder, GenerationEvent, Stage};
use delvegen_logic::config::{validate_config, GeneratorConfig, TraversalMode};
use delvegen_logic::geometry::{Cell, Door, Point, Room};
use delvegen_logic::pathfinding::{PathFailure, Pathfinder};
use delvegen_logic::validation::{
    check_room_dimensions, check_room_tiling, validate_all, ValidationError,
};
use serde::Serialize;

// ── Logging ─────────────────────────────────────────────────────────────

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

// ── Options ─────────────────────────────────────────────────────────────

struct Options {
    verbose: bool,
    map: bool,
    json: bool,
    seeds: u64,
    config: GeneratorConfig,
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_options() -> Result<Options, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let has = |flag: &str| args.iter().any(|a| a == flag);

    let mut config = match value_after(&args, "--config") {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("can't read {}: {}", path, e))?;
            GeneratorConfig::from_json_str(&text)
                .map_err(|e| format!("bad config {}: {}", path, e))?
        }
        None => GeneratorConfig::default(),
    };
    if let Some(seed) = value_after(&args, "--seed") {
        config.seed = seed
            .parse()
            .map_err(|e| format!("bad --seed {}: {}", seed, e))?;
    }
    let seeds = match value_after(&args, "--seeds") {
        Some(n) => n.parse().map_err(|e| format!("bad --seeds {}: {}", n, e))?,
        None => 50,
    };

    Ok(Options {
        verbose: has("--verbose"),
        map: has("--map"),
        json: has("--json"),
        seeds,
        config,
    })
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let opts = match parse_options() {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("error: {}", msg);
            std::process::exit(2);
        }
    };
    init_logging(if opts.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    });

    println!("=== Delvegen Generation Harness ===\n");

    let config_errors = validate_config(&opts.config);
    if !config_errors.is_empty() {
        for e in &config_errors {
            eprintln!("config error: {}", e);
        }
        std::process::exit(2);
    }

    let mut results = Vec::new();

    // 1. Config validation
    results.extend(validate_configs(opts.verbose));

    // 2. Seed sweep
    results.extend(validate_seed_sweep(&opts.config, opts.seeds, opts.verbose));

    // 3. Traversal modes & observer
    results.extend(validate_traversal_modes(&opts.config, opts.verbose));

    // 4. Pathfinding on a generated layout
    let layout = match generate(&opts.config) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("generation failed for seed {}: {}", opts.config.seed, e);
            std::process::exit(1);
        }
    };
    let (path_results, sample_path) = validate_pathfinding(&layout, opts.verbose);
    results.extend(path_results);

    // 5. Persistence
    results.extend(validate_persistence(&opts.config, opts.verbose));

    if opts.map {
        println!("\n--- Map (seed {}) ---", layout.config.seed);
        print!("{}", render_ascii(&layout, &sample_path));
    }
    if opts.json {
        match serde_json::to_string_pretty(&LayoutExport::from(&layout)) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("json export failed: {}", e),
        }
    }

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Config validation ────────────────────────────────────────────────

fn validate_configs(_verbose: bool) -> Vec<TestResult> {
    println!("--- Config Validation ---");
    let mut results = Vec::new();

    let defaults = validate_config(&GeneratorConfig::default());
    results.push(TestResult {
        name: "config_defaults_valid".into(),
        passed: defaults.is_empty(),
        detail: format!("{} errors on defaults", defaults.len()),
    });

    let bad = GeneratorConfig {
        door_area: -1,
        max_room_size: (3, 10),
        hallway_chance: 2.0,
        ..Default::default()
    };
    let errors = validate_config(&bad);
    results.push(TestResult {
        name: "config_reports_all_errors".into(),
        passed: errors.len() == 3,
        detail: format!("3 bad fields → {} errors", errors.len()),
    });

    let partial = GeneratorConfig::from_json_str(r#"{ "seed": 5, "traversal": "Dfs" }"#);
    results.push(TestResult {
        name: "config_json_defaults".into(),
        passed: matches!(
            &partial,
            Ok(c) if c.seed == 5 && c.traversal == TraversalMode::Dfs && c.size == (100, 50)
        ),
        detail: "partial JSON fills defaults".into(),
    });

    results
}

// ── 2. Seed sweep ───────────────────────────────────────────────────────

fn layout_errors(layout: &Layout) -> Vec<ValidationError> {
    let mut errors = validate_all(
        &layout.rooms,
        &layout.graph,
        &layout.doors,
        &layout.navigation,
        layout.config.door_area,
    );
    errors.extend(check_room_tiling(&layout.leaves, layout.root()));
    errors.extend(check_room_dimensions(
        &layout.leaves,
        layout.config.min_room_size,
    ));
    errors
}

fn validate_seed_sweep(base: &GeneratorConfig, seeds: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Seed Sweep ({} seeds) ---", seeds);
    let mut results = Vec::new();

    let mut generated = 0usize;
    let mut invalid = Vec::new();
    let mut gen_failures = 0;
    let mut room_total = 0;
    let mut door_total = 0;
    for offset in 0..seeds {
        let config = GeneratorConfig {
            seed: base.seed.wrapping_add(offset),
            ..base.clone()
        };
        match generate(&config) {
            Ok(layout) => {
                generated += 1;
                room_total += layout.rooms.len();
                door_total += layout.doors.len();
                let errors = layout_errors(&layout);
                if !errors.is_empty() {
                    if verbose {
                        for e in errors.iter().take(5) {
                            println!("    seed {} [{}] {}", config.seed, e.category, e.message);
                        }
                    }
                    invalid.push(config.seed);
                }
            }
            Err(e) => {
                println!("    seed {}: {}", config.seed, e);
                gen_failures += 1;
            }
        }
    }

    results.push(TestResult {
        name: "sweep_generates".into(),
        passed: gen_failures == 0,
        detail: format!("{}/{} seeds generated", generated, seeds),
    });
    results.push(TestResult {
        name: "sweep_invariants".into(),
        passed: invalid.is_empty(),
        detail: if invalid.is_empty() {
            format!(
                "all layouts valid, avg {:.1} rooms / {:.1} doors",
                room_total as f64 / generated.max(1) as f64,
                door_total as f64 / generated.max(1) as f64
            )
        } else {
            format!("invalid seeds: {:?}", invalid)
        },
    });

    let repeat_ok = (0..seeds.min(5)).all(|offset| {
        let config = GeneratorConfig {
            seed: base.seed.wrapping_add(offset),
            ..base.clone()
        };
        matches!((generate(&config), generate(&config)), (Ok(a), Ok(b)) if a == b)
    });
    results.push(TestResult {
        name: "sweep_deterministic".into(),
        passed: repeat_ok,
        detail: "same seed twice → identical layout".into(),
    });

    results
}

// ── 3. Traversal modes ──────────────────────────────────────────────────

fn validate_traversal_modes(base: &GeneratorConfig, _verbose: bool) -> Vec<TestResult> {
    println!("--- Traversal Modes ---");
    let mut results = Vec::new();

    let with_mode = |traversal| GeneratorConfig {
        traversal,
        ..base.clone()
    };
    let bfs = generate(&with_mode(TraversalMode::Bfs));
    let dfs = generate(&with_mode(TraversalMode::Dfs));
    match (bfs, dfs) {
        (Ok(bfs), Ok(dfs)) => {
            results.push(TestResult {
                name: "traversal_same_rooms".into(),
                passed: bfs.rooms == dfs.rooms,
                detail: format!("{} rooms under both modes", bfs.rooms.len()),
            });
            results.push(TestResult {
                name: "traversal_both_trees".into(),
                passed: bfs.is_connected(TraversalMode::Dfs)
                    && dfs.is_connected(TraversalMode::Bfs)
                    && bfs.graph.edge_count() == dfs.graph.edge_count(),
                detail: format!("{} tree edges", bfs.graph.edge_count()),
            });
        }
        _ => results.push(TestResult {
            name: "traversal_generates".into(),
            passed: false,
            detail: "generation failed".into(),
        }),
    }

    let mut engine = match DungeonEngine::new(base.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            results.push(TestResult {
                name: "observer_events".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    let mut recorder = EventRecorder::new();
    let observed = engine
        .generate_with_observer(&mut recorder)
        .map(|layout| (layout.doors.len(), layout.rooms.len()));
    let stages = recorder.count(|e| matches!(e, GenerationEvent::StageFinished(_)));
    let doors = recorder.count(|e| matches!(e, GenerationEvent::DoorPlaced(_)));
    let waves = recorder.count(|e| matches!(e, GenerationEvent::WaveStarted { .. }));
    results.push(TestResult {
        name: "observer_events".into(),
        passed: matches!(observed, Ok((d, _)) if d == doors) && stages == Stage::ALL.len(),
        detail: format!(
            "{} events, {} waves, {} doors",
            recorder.events.len(),
            waves,
            doors
        ),
    });

    results
}

// ── 4. Pathfinding ──────────────────────────────────────────────────────

fn first_walkable(layout: &Layout, room: &Room) -> Option<Cell> {
    room.interior_cells()
        .find(|c| layout.navigation.contains_node(c))
}

fn validate_pathfinding(layout: &Layout, verbose: bool) -> (Vec<TestResult>, Vec<Cell>) {
    println!("--- Pathfinding ---");
    let mut results = Vec::new();
    let mut pf = Pathfinder::new();

    let Some(spawn) = layout.spawn_point() else {
        results.push(TestResult {
            name: "pathfind_spawn".into(),
            passed: false,
            detail: "layout has no spawn point".into(),
        });
        return (results, Vec::new());
    };

    // Same cell
    let same = layout.find_path(&mut pf, spawn, spawn);
    results.push(TestResult {
        name: "pathfind_same_cell".into(),
        passed: same.is_found() && same.steps() == 0 && same.waypoints == vec![spawn],
        detail: "same cell → single waypoint at target".into(),
    });

    // Spawn to every room
    let mut unreachable = 0;
    let mut longest: Vec<Cell> = Vec::new();
    for room in &layout.rooms {
        let Some(goal) = first_walkable(layout, room) else {
            unreachable += 1;
            continue;
        };
        let result = layout.find_path(&mut pf, spawn, goal.anchor());
        if !result.is_found() {
            unreachable += 1;
        } else if result.cells.len() > longest.len() {
            longest = result.cells;
        }
    }
    results.push(TestResult {
        name: "pathfind_all_rooms".into(),
        passed: unreachable == 0,
        detail: format!(
            "{}/{} rooms reachable, longest path {} steps",
            layout.rooms.len() - unreachable,
            layout.rooms.len(),
            longest.len()
        ),
    });

    // Unit steps only
    let unit_steps = longest.windows(2).all(|w| w[0].manhattan(w[1]) == 1);
    results.push(TestResult {
        name: "pathfind_unit_steps".into(),
        passed: unit_steps,
        detail: "consecutive cells are orthogonal neighbours".into(),
    });

    // Wall target
    let wall_cell = layout.rooms.first().map(|r| Cell::new(r.x, r.y));
    let wall = wall_cell.map(|c| layout.find_path(&mut pf, spawn, c.anchor()));
    results.push(TestResult {
        name: "pathfind_wall_target".into(),
        passed: matches!(
            wall.as_ref().and_then(|w| w.failure),
            Some(PathFailure::TargetNotWalkable(_))
        ),
        detail: "corner wall cell → TargetNotWalkable".into(),
    });

    // Cache
    results.push(TestResult {
        name: "pathfind_cache".into(),
        passed: pf.cache_size() > 0,
        detail: format!("{} cached paths", pf.cache_size()),
    });

    if verbose {
        println!("    spawn at ({:.1}, {:.1})", spawn.x, spawn.y);
    }
    (results, longest)
}

// ── 5. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(base: &GeneratorConfig, _verbose: bool) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let roundtrip = (|| -> Result<bool, Box<dyn std::error::Error>> {
        let mut engine = DungeonEngine::new(base.clone())?;
        engine.generate()?;
        let mut buffer = Vec::new();
        engine.save(&mut buffer)?;

        let mut restored = DungeonEngine::new(GeneratorConfig::default())?;
        restored.load(buffer.as_slice())?;
        Ok(restored.layout() == engine.layout())
    })();

    results.push(TestResult {
        name: "persistence_roundtrip".into(),
        passed: matches!(roundtrip, Ok(true)),
        detail: match roundtrip {
            Ok(same) => format!("layout identical after reload: {}", same),
            Err(e) => e.to_string(),
        },
    });

    results
}

// ── ASCII rendering ─────────────────────────────────────────────────────

/// Walls `#`, floor `.`, doors `+`, decorations `*`, path `o`. Cells of
/// pruned rooms are blank.
fn render_ascii(layout: &Layout, path: &[Cell]) -> String {
    let root = layout.root();
    let doors: BTreeSet<Cell> = layout.doors.iter().flat_map(Door::cells).collect();
    let decorations: BTreeSet<Cell> = layout.decorations.iter().copied().collect();
    let path: BTreeSet<Cell> = path.iter().copied().collect();

    let mut out = String::new();
    for y in (root.y..root.y_max()).rev() {
        for x in root.x..root.x_max() {
            let cell = Cell::new(x, y);
            let ch = if path.contains(&cell) {
                'o'
            } else if doors.contains(&cell) {
                '+'
            } else if decorations.contains(&cell) {
                '*'
            } else if layout.navigation.contains_node(&cell) {
                '.'
            } else if layout.rooms.iter().any(|r| r.contains_cell(cell)) {
                '#'
            } else {
                ' '
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

// ── JSON export ─────────────────────────────────────────────────────────

/// Flat, string-keyed view of a layout for JSON consumers.
#[derive(Serialize)]
struct LayoutExport<'a> {
    config: &'a GeneratorConfig,
    spawn: Option<Point>,
    rooms: &'a [Room],
    edges: Vec<(Room, Room)>,
    doors: &'a [Door],
    walkable: Vec<Cell>,
    decorations: &'a [Cell],
}

impl<'a> From<&'a Layout> for LayoutExport<'a> {
    fn from(layout: &'a Layout) -> Self {
        Self {
            config: &layout.config,
            spawn: layout.spawn_point(),
            rooms: &layout.rooms,
            edges: layout.graph.edges().map(|(a, b)| (*a, *b)).collect(),
            doors: &layout.doors,
            walkable: layout.navigation.nodes().copied().collect(),
            decorations: &layout.decorations,
        }
    }
}
