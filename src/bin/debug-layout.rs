/// Diagnostic tool to verify tree → layout → statistics pipeline
/// Usage: debug-layout [algorithm] [width] [height] [config.json]
use anyhow::Context;
use silvamap::layout::{compute_layout, LayoutConfig, LayoutKind};
use silvamap::stats::{compute_stats, validate};
use silvamap::tree::sample::sample_tree;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("silvamap=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let kind: LayoutKind = match args.get(1) {
        Some(name) => name.parse()?,
        None => LayoutKind::default(),
    };
    let width: f64 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(1920.0);
    let height: f64 = args.get(3).map(|s| s.parse()).transpose()?.unwrap_or(1080.0);

    let config = match args.get(4) {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            let mut config: LayoutConfig =
                serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
            config.set_canvas(width, height)?;
            config
        }
        None => LayoutConfig::new(width, height).with_layout(kind),
    };
    config.validate()?;

    println!("=== DIAGNOSTIC: Tree → Layout Pipeline ===");
    println!("Layout: {} ({}x{})", config.level(0).layout, width, height);

    // Build tree
    let tree = sample_tree(12, 9);
    println!("\n[1] Tree built: {} nodes", tree.len());

    let root = tree.get(tree.root);
    println!(
        "    Root: '{}' (accum size={:.2}, max depth={})",
        root.data.label,
        tree.accum_size(tree.root),
        tree.max_depth(tree.root)
    );

    // Show top 10 children of root by size
    println!("\n[2] Top 10 children of root:");
    let mut root_children: Vec<_> = tree.children(tree.root).to_vec();
    root_children.sort_by(|&a, &b| tree.accum_size(b).total_cmp(&tree.accum_size(a)));

    for (i, &child_id) in root_children.iter().take(10).enumerate() {
        let child = tree.get(child_id);
        println!(
            "    [{}] '{}' - accum size {:.2} (children={})",
            i,
            child.data.label,
            tree.accum_size(child_id),
            child.children().len()
        );
    }

    // Compute layout
    let layout = compute_layout(&tree, tree.root, &config);
    println!("\n[3] Layout computed: {} rectangles", layout.rects.len());

    // Show top 10 largest rectangles
    println!("\n[4] Top 10 largest rectangles by area:");
    let mut sorted_rects = layout.rects.clone();
    sorted_rects.sort_by(|a, b| b.rect.area().total_cmp(&a.rect.area()));

    for (i, r) in sorted_rects.iter().skip(1).take(10).enumerate() {
        let node = tree.get(r.node);
        println!(
            "    [{}] '{}' - rect: {:.1}x{:.1} ({:.0}u²) at ({:.1}, {:.1}) \
             - depth {} - neighbours {}",
            i,
            node.data.label,
            r.rect.w,
            r.rect.h,
            r.rect.area(),
            r.rect.x,
            r.rect.y,
            r.depth,
            layout.neighbours(r.node).map_or(0, |n| n.len())
        );
    }

    // Coverage of the leaves
    println!("\n[5] Coverage:");
    let leaf_area: f64 = layout
        .rects
        .iter()
        .filter(|r| tree.is_leaf(r.node))
        .map(|r| r.rect.area())
        .sum();
    let canvas_area = width * height;
    println!("    Leaf rect area: {:.0}u²", leaf_area);
    println!("    Canvas area:    {:.0}u²", canvas_area);
    println!("    Coverage: {:.1}%", leaf_area / canvas_area * 100.0);

    println!("\n[6] Statistics:");
    println!("    {}", compute_stats(&tree, &layout, &config));

    println!("\n[7] Checking for anomalies:");
    let issues = validate(&tree, &layout, 1e-6);
    if issues.is_empty() {
        println!("    none");
    }
    for issue in issues.iter().take(10) {
        println!("    ✗ {issue}");
    }

    Ok(())
}
