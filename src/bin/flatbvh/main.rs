//! flatbvh CLI - Build, inspect and query BVHs for triangle meshes.

use flatbvh::geom::load_obj;
use flatbvh::prelude::{Bvh, Ray, Triangle, Vec3};
use flatbvh::settings::Settings;

use anyhow::{bail, Context, Result};
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "FLATBVH_LOG";

#[cfg(feature = "trace")]
type TraceGuard = Option<tracing_chrome::FlushGuard>;
#[cfg(not(feature = "trace"))]
type TraceGuard = ();

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level: Option<&str> = None;
    let mut config: Option<PathBuf> = None;
    let mut filtered_args: Vec<&str> = Vec::new();
    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => level = Some("debug"),
            "-vv" | "--trace" => level = Some("trace"),
            "-q" | "--quiet" => level = Some("error"),
            "-c" | "--config" => match iter.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => {
                    eprintln!("Error: --config needs a file argument");
                    std::process::exit(1);
                }
            },
            _ => filtered_args.push(arg),
        }
    }

    let settings = match &config {
        Some(path) => match Settings::load_from(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to load settings {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Settings::load(),
    };

    let directive = level
        .or(settings.log_filter.as_deref())
        .unwrap_or("info")
        .to_string();
    let _trace_guard = init_tracing(&directive);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        // Build command - build and optionally write node buffer
        "build" | "b" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: flatbvh build <mesh.obj> [-o <nodes.bin>]");
                std::process::exit(1);
            }
            let output = filtered_args
                .iter()
                .position(|&s| s == "-o" || s == "--output")
                .and_then(|i| filtered_args.get(i + 1))
                .copied();
            cmd_build(filtered_args[1], output, &settings)
        }

        // Info command - show tree statistics
        "info" | "i" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: flatbvh info <mesh.obj>");
                std::process::exit(1);
            }
            cmd_info(filtered_args[1], &settings)
        }

        // Trace command - cast a single ray
        "trace" | "t" => {
            if filtered_args.len() < 8 {
                eprintln!("Error: missing ray arguments");
                eprintln!("Usage: flatbvh trace <mesh.obj> <ox> <oy> <oz> <dx> <dy> <dz>");
                std::process::exit(1);
            }
            cmd_trace(filtered_args[1], &filtered_args[2..8], &settings)
        }

        "version" | "--version" | "-V" => {
            print_version();
            Ok(())
        }

        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        // Passing a mesh directly is equivalent to 'info'
        path if path.ends_with(".obj") => cmd_info(path, &settings),

        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Run 'flatbvh help' for usage");
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Install the fmt subscriber, plus a chrome trace layer when
/// `FLATBVH_TRACE=1` and the `trace` feature is enabled.
fn init_tracing(directive: &str) -> TraceGuard {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(directive));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let registry = tracing_subscriber::registry().with(filter).with(fmt_layer);

    #[cfg(feature = "trace")]
    {
        if std::env::var("FLATBVH_TRACE").ok().as_deref() == Some("1") {
            let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new()
                .file("trace.json")
                .build();
            if registry.with(chrome_layer).try_init().is_err() {
                return None;
            }
            return Some(guard);
        }
        let _ = registry.try_init();
        None
    }

    #[cfg(not(feature = "trace"))]
    {
        let _ = registry.try_init();
    }
}

fn print_help() {
    println!("flatbvh - BVH builder for triangle meshes");
    println!();
    println!("USAGE:");
    println!("    flatbvh [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    b, build  <mesh> [-o <out>]     Build BVH, validate, write packed nodes");
    println!("    i, info   <mesh>              Show tree statistics");
    println!("    t, trace  <mesh> <o..> <d..>  Cast one ray (origin xyz, direction xyz)");
    println!("    version                       Show version and build date");
    println!("    h, help                       Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose        Show debug output");
    println!("    -vv, --trace         Show trace output (very verbose)");
    println!("    -q, --quiet          Only show errors");
    println!("    -c, --config <file>  Read settings from a JSON file");
    println!();
    println!("EXAMPLES:");
    println!("    flatbvh build bunny.obj -o bunny.bvh     # Write 32-byte nodes");
    println!("    flatbvh info bunny.obj                   # Node count, depth, SAH cost");
    println!("    flatbvh trace bunny.obj 0 0 -5 0 0 1     # Closest hit along +Z");
    println!();
    println!("NOTES:");
    println!("    - Passing a .obj file directly is equivalent to 'info'");
    println!("    - {} overrides the log level (e.g. flatbvh=trace)", LOG_ENV);
    println!("    - Settings default to <config dir>/flatbvh/settings.json");
}

fn print_version() {
    println!(
        "flatbvh {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("FLATBVH_BUILD_DATE"),
        env!("FLATBVH_BUILD_TIME")
    );
}

fn load_and_build(path: &str, settings: &Settings) -> Result<(Vec<Triangle>, Bvh)> {
    tracing::info!("Loading mesh: {}", path);
    let triangles = load_obj(path).with_context(|| format!("failed to load {}", path))?;

    let start = Instant::now();
    let bvh = Bvh::build_with(&triangles, settings.build)
        .with_context(|| format!("failed to build BVH for {}", path))?;
    tracing::info!(
        "Built {} nodes from {} triangles in {:.2}ms",
        bvh.len(),
        triangles.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    if settings.validate {
        bvh.validate().context("built tree failed validation")?;
        tracing::debug!("Validation passed");
    }

    Ok((triangles, bvh))
}

fn cmd_build(path: &str, output: Option<&str>, settings: &Settings) -> Result<()> {
    let (_, bvh) = load_and_build(path, settings)?;

    let stats = bvh.stats();
    tracing::info!(
        "Leaves: {}, max depth: {}, SAH cost: {:.3}",
        stats.leaf_count,
        stats.max_depth,
        stats.sah_cost
    );

    if let Some(output) = output {
        let file = File::create(output).with_context(|| format!("failed to create {}", output))?;
        bvh.write_to(BufWriter::new(file))?;
        tracing::info!("Wrote {} bytes to {}", bvh.as_bytes().len(), output);
    }
    Ok(())
}

fn cmd_info(path: &str, settings: &Settings) -> Result<()> {
    let (triangles, bvh) = load_and_build(path, settings)?;
    let stats = bvh.stats();
    let bounds = bvh.root_bounds();

    println!("Mesh: {}", path);
    println!("Triangles: {}", triangles.len());
    println!();
    println!("BVH:");
    println!("  Nodes:     {} ({} bytes)", stats.node_count, bvh.as_bytes().len());
    println!("  Leaves:    {}", stats.leaf_count);
    println!("  Max depth: {}", stats.max_depth);
    println!("  SAH cost:  {:.4}", stats.sah_cost);
    println!("  Bounds:    {:?} - {:?}", bounds.min.to_array(), bounds.max.to_array());
    Ok(())
}

fn cmd_trace(path: &str, ray_args: &[&str], settings: &Settings) -> Result<()> {
    let values = ray_args
        .iter()
        .map(|s| s.parse::<f32>().with_context(|| format!("not a number: {}", s)))
        .collect::<Result<Vec<f32>>>()?;
    let origin = Vec3::new(values[0], values[1], values[2]);
    let direction = Vec3::new(values[3], values[4], values[5]);
    if direction == Vec3::ZERO {
        bail!("ray direction must be non-zero");
    }

    let (triangles, bvh) = load_and_build(path, settings)?;
    let ray = Ray::new(origin, direction);

    match bvh.closest_hit(&triangles, &ray, f32::INFINITY) {
        Some(hit) => {
            let point = ray.at(hit.t);
            println!("Hit triangle {}", hit.primitive);
            println!("  t:     {:.6}", hit.t);
            println!("  point: {:?}", point.to_array());
            println!("  uv:    ({:.4}, {:.4})", hit.u, hit.v);
        }
        None => println!("No hit"),
    }
    Ok(())
}
