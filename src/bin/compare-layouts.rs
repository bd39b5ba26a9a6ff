/// Runs every layout algorithm over the same sample tree and compares them
/// Usage: compare-layouts [width] [height]
use rayon::prelude::*;
use silvamap::layout::{compute_layout, LayoutConfig, LayoutKind};
use silvamap::stats::{compute_stats, validate, LayoutStats};
use silvamap::tree::sample::sample_tree;
use std::time::{Duration, Instant};

struct Run {
    kind: LayoutKind,
    stats: LayoutStats,
    issues: usize,
    elapsed: Duration,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("silvamap=warn".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let width: f64 = args.get(1).map(|s| s.parse()).transpose()?.unwrap_or(1920.0);
    let height: f64 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(1080.0);

    let tree = sample_tree(16, 24);
    // Fill the derived-field cache once before sharing the tree across threads.
    let _ = tree.accum_size(tree.root);

    println!(
        "Comparing {} layouts on {} nodes in {}x{}",
        LayoutKind::ALL.len(),
        tree.len(),
        width,
        height
    );
    println!();

    let mut runs: Vec<Run> = LayoutKind::ALL
        .par_iter()
        .map(|&kind| {
            let config = LayoutConfig::new(width, height).with_layout(kind);
            let start = Instant::now();
            let layout = compute_layout(&tree, tree.root, &config);
            let elapsed = start.elapsed();
            Run {
                kind,
                stats: compute_stats(&tree, &layout, &config),
                issues: validate(&tree, &layout, 1e-6).len(),
                elapsed,
            }
        })
        .collect();
    runs.sort_by(|a, b| a.stats.mean_aspect.total_cmp(&b.stats.mean_aspect));

    let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
    println!(
        "{:<18} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>7} {:>9}",
        "layout", "nodes", "aspect", "read", "displ", "angle", "r2", "issues", "time"
    );
    for run in &runs {
        println!(
            "{:<18} {:>6} {:>8.3} {:>8.3} {:>8} {:>8} {:>8} {:>7} {:>7.2}ms",
            run.kind.name(),
            run.stats.nodes,
            run.stats.mean_aspect,
            run.stats.readability,
            cell(run.stats.displacement),
            cell(run.stats.angular_deviation),
            cell(run.stats.order_r2),
            run.issues,
            run.elapsed.as_secs_f64() * 1000.0
        );
    }

    let failing = runs.iter().filter(|r| r.issues > 0).count();
    if failing > 0 {
        anyhow::bail!("{failing} layouts produced invalid geometry");
    }
    Ok(())
}
