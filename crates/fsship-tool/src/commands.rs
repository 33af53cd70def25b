//! Subcommand implementations.
//!
//! Each command returns the report it would print, so the binary only has to
//! write it to stdout.

use crate::config::{Command, ToolConfig};
use anyhow::{Context, Result};
use fsship_formats::shp2::ShipFormat;
use fsship_formats::{ImageSize, MaterialDatabase, ShipDefinition, ShipPreviewData};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Run the configured subcommand.
///
/// # Errors
///
/// Returns an error if a file cannot be read or written, the ship file is
/// invalid, or the material database cannot be loaded.
pub fn run(config: &ToolConfig) -> Result<String> {
    let format = ShipFormat::new(config.format_config());
    match &config.command {
        Command::Info { file } => info_report(&format, file),
        Command::Preview {
            file,
            output,
            max_width,
            max_height,
        } => write_preview(
            &format,
            file,
            output,
            ImageSize::new(*max_width, *max_height),
        ),
        Command::Check { file, materials } => {
            let materials = load_materials(materials)?;
            check_report(&format, file, &materials)
        }
        Command::Resave {
            input,
            output,
            materials,
        } => {
            let materials = load_materials(materials)?;
            resave(&format, input, output, &materials)
        }
    }
}

/// Load the material database from a directory.
///
/// # Errors
///
/// Returns an error if either material file is missing or invalid.
pub fn load_materials(dir: &Path) -> Result<MaterialDatabase> {
    let materials = MaterialDatabase::load_from_directory(dir)
        .with_context(|| format!("Failed to load materials from {}", dir.display()))?;
    debug!(
        "Loaded {} structural and {} electrical materials",
        materials.structural_count(),
        materials.electrical_count()
    );
    Ok(materials)
}

/// Ship size, metadata and preview flags.
///
/// # Errors
///
/// Returns an error if the file cannot be read as a ship file.
pub fn info_report(format: &ShipFormat, file: &Path) -> Result<String> {
    let preview = format
        .load_preview_data_file(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(format_preview_data(&preview))
}

fn format_preview_data(preview: &ShipPreviewData) -> String {
    let metadata = &preview.metadata;
    let mut lines = vec![format!("Name:        {}", metadata.ship_name)];

    if let Some(author) = &metadata.author {
        lines.push(format!("Author:      {author}"));
    }
    if let Some(art_credits) = &metadata.art_credits {
        lines.push(format!("Art credits: {art_credits}"));
    }
    if let Some(year_built) = &metadata.year_built {
        lines.push(format!("Year built:  {year_built}"));
    }
    if let Some(category) = metadata.category {
        lines.push(format!("Category:    {category:?}"));
    }
    lines.push(format!("Size:        {}", preview.ship_size));
    lines.push(match preview.last_write_time {
        Some(seconds) => format!("Saved:       {seconds} (Unix time)"),
        None => "Saved:       unknown".to_string(),
    });
    lines.push(format!("HD:          {}", yes_no(preview.is_hd)));
    lines.push(format!("Electricals: {}", yes_no(preview.has_electricals)));
    lines.push(format!("Protected:   {}", yes_no(metadata.password.is_some())));
    if let Some(description) = &metadata.description {
        lines.push(String::new());
        lines.push(description.clone());
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Write the ship's preview image as PNG.
///
/// # Errors
///
/// Returns an error if the ship has no readable preview or the PNG cannot be
/// written.
pub fn write_preview(
    format: &ShipFormat,
    file: &Path,
    output: &Path,
    max_size: ImageSize,
) -> Result<String> {
    let image = format
        .load_preview_image_file(file, max_size)
        .with_context(|| format!("Failed to read preview from {}", file.display()))?;
    let png = image.encode_png().context("Failed to encode preview")?;
    std::fs::write(output, &png)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Wrote {} preview to {}", image.size(), output.display());
    Ok(format!("{} preview written to {}\n", image.size(), output.display()))
}

/// Layer statistics of a ship.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipStats {
    /// Non-empty structural cells
    pub structural_cells: usize,
    /// Distinct structural materials
    pub structural_materials: usize,
    /// Non-empty electrical cells, if there is an electrical layer
    pub electrical_cells: Option<usize>,
    /// Electrical panel entries, if there is an electrical layer
    pub panel_entries: Option<usize>,
    /// Ropes, if there is a ropes layer
    pub ropes: Option<usize>,
}

impl ShipStats {
    /// Collect statistics from a loaded ship.
    #[must_use]
    pub fn collect(definition: &ShipDefinition) -> Self {
        let layers = &definition.layers;
        let occupied = layers
            .structural
            .buffer
            .data()
            .iter()
            .filter(|cell| cell.is_occupied())
            .map(fsship_formats::StructuralElement::color_key)
            .collect::<Vec<_>>();

        Self {
            structural_cells: occupied.len(),
            structural_materials: occupied.into_iter().collect::<BTreeSet<_>>().len(),
            electrical_cells: layers.electrical.as_ref().map(|electrical| {
                electrical
                    .buffer
                    .data()
                    .iter()
                    .filter(|cell| cell.material.is_some())
                    .count()
            }),
            panel_entries: layers.electrical.as_ref().map(|e| e.panel.len()),
            ropes: layers.ropes.as_ref().map(|r| r.elements.len()),
        }
    }
}

/// Load every layer and report statistics.
///
/// # Errors
///
/// Returns an error if the ship cannot be loaded, including unresolved
/// materials.
pub fn check_report(format: &ShipFormat, file: &Path, materials: &MaterialDatabase) -> Result<String> {
    let definition = format
        .load_file(file, materials)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    let stats = ShipStats::collect(&definition);
    let layers = &definition.layers;

    let mut lines = vec![
        format!("{}: OK", definition.metadata.ship_name),
        format!("Size:        {}", layers.size),
        format!(
            "Structural:  {} cells, {} materials",
            stats.structural_cells, stats.structural_materials
        ),
    ];
    lines.push(match (stats.electrical_cells, stats.panel_entries) {
        (Some(cells), Some(entries)) => format!("Electrical:  {cells} cells, {entries} panel entries"),
        _ => "Electrical:  none".to_string(),
    });
    lines.push(match stats.ropes {
        Some(ropes) => format!("Ropes:       {ropes}"),
        None => "Ropes:       none".to_string(),
    });
    lines.push(match &layers.texture {
        Some(texture) => format!("Texture:     {}", texture.image.size()),
        None => "Texture:     none".to_string(),
    });

    lines.push(String::new());
    Ok(lines.join("\n"))
}

/// Load a ship and save it with this tool's producer version.
///
/// # Errors
///
/// Returns an error if the input cannot be loaded or the output cannot be
/// written.
pub fn resave(
    format: &ShipFormat,
    input: &Path,
    output: &Path,
    materials: &MaterialDatabase,
) -> Result<String> {
    let definition = format
        .load_file(input, materials)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    format
        .save_file(&definition, output)
        .with_context(|| format!("Failed to save {}", output.display()))?;

    info!(
        "Re-saved {} as version {}",
        definition.metadata.ship_name,
        format.config().producer_version
    );
    Ok(format!(
        "{} saved to {}\n",
        definition.metadata.ship_name,
        output.display()
    ))
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
