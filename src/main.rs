use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use h3_heat_map::config::HeatMapConfig;
use h3_heat_map::dataset::Dataset;
use h3_heat_map::deck::{write_deck_json, write_legend_html};
use h3_heat_map::hex_png::{HexPngConfig, HexPngRenderer};
use h3_heat_map::record_filter::region_filter_applies;
use h3_heat_map::spatial_binner::H3Indexer;
use h3_heat_map::view::{MapStyle, RenderRequest, Scenario};
use h3_heat_map::HeatMapPipeline;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "h3-heat-map")]
#[command(about = "Hexagonal heat-potential map of building energy data")]
struct Args {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input table (overrides the configured data_path)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Map zoom level, 1-15
    #[arg(long)]
    zoom: Option<i32>,

    /// Place name to show; repeat for several. Ignored at zoom 1-7
    #[arg(long = "region")]
    regions: Vec<String>,

    /// light, dark, streets, outdoors, satellite or satellite-streets
    #[arg(long)]
    style: Option<MapStyle>,

    /// Extrusion scenario, 1-4
    #[arg(long, default_value = "1")]
    scenario: Scenario,

    /// Extrude hexagons by heat value
    #[arg(long)]
    extruded: bool,

    /// Seed for the density sampler (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Write the deck.gl JSON document here
    #[arg(long)]
    deck_out: Option<PathBuf>,

    /// Write the legend HTML fragment here
    #[arg(long)]
    legend_out: Option<PathBuf>,

    /// Write a PNG of the visible layer here
    #[arg(long)]
    png_out: Option<PathBuf>,

    /// Print the available regions and exit
    #[arg(long)]
    list_regions: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => HeatMapConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => HeatMapConfig::default(),
    };

    let data_path = args.data.clone().unwrap_or_else(|| config.data_path.clone());
    let dataset = Dataset::load_cached(&data_path, config.delimiter)
        .with_context(|| format!("loading {}", data_path.display()))?;

    if args.list_regions {
        for region in dataset.regions() {
            println!("{}", region);
        }
        return Ok(());
    }

    let zoom = args.zoom.unwrap_or(config.default_zoom);
    let regions = if args.regions.is_empty() {
        vec![config.default_region.clone()]
    } else {
        args.regions.clone()
    };
    let request = RenderRequest::new(zoom)?
        .with_regions(regions)
        .with_extrusion(args.extruded)
        .with_scenario(args.scenario)
        .with_map_style(args.style.unwrap_or(config.map_style));

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let pipeline = HeatMapPipeline::from_config(H3Indexer, &config);
    let render = pipeline.render(&dataset, &request, &mut rng);

    for warning in &render.warnings {
        println!("{} {}", "⚠️".yellow(), warning.yellow());
    }

    println!("\n🗺️  {}", "H3 heat map".bold());
    println!("   Zoom:        {} ({} band)", zoom, render.band.as_str());
    println!("   Resolution:  {}", u8::from(render.resolution));
    println!("   Style:       {}", request.map_style.label());
    println!("   Scenario:    {}", request.scenario);
    if region_filter_applies(zoom) {
        println!("   Regions:     {}", request.regions.join(", "));
    } else {
        println!("   Regions:     all");
    }
    println!(
        "   Records:     {} loaded, {} in region, {} sampled, {} rendered",
        render.stats.base_records,
        render.stats.region_records,
        render.stats.sampled_records,
        render.stats.rendered_records.to_string().green()
    );
    if render.stats.dropped_records > 0 {
        println!(
            "   Dropped:     {}",
            render.stats.dropped_records.to_string().red()
        );
    }
    println!(
        "   Centre:      {:.4}, {:.4}",
        render.view_state.latitude, render.view_state.longitude
    );

    if let Some(path) = &args.deck_out {
        write_deck_json(&render, path)?;
        println!("   Deck JSON:   {}", path.display());
    }
    if let Some(path) = &args.legend_out {
        write_legend_html(&render, path)?;
        println!("   Legend:      {}", path.display());
    }
    if let Some(path) = &args.png_out {
        let renderer = HexPngRenderer::new(HexPngConfig::new(config.png_width, config.png_height));
        renderer.write_png(&render, path)?;
        println!("   PNG:         {}", path.display());
    }

    Ok(())
}
