//! partforge CLI - build machined parts from JSON part definitions.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use partforge_ir::PartDefinition;
use partforge_kernel::partforge_kernel_step::{write_brep_to_string, write_step, StepOptions};
use partforge_kernel::partforge_kernel_tessellate::RenderMesh;
use partforge_kernel::{build_model, order_features, BuildResult, KernelConfig};

#[derive(Parser)]
#[command(name = "partforge")]
#[command(about = "Feature-based machining kernel", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a part and export the result
    Build {
        /// Part definition (JSON)
        input: PathBuf,
        /// Kernel configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the model as STEP points
        #[arg(long)]
        step: Option<PathBuf>,
        /// Write the stock solid as coarse B-rep STEP
        #[arg(long)]
        stock_step: Option<PathBuf>,
        /// Write the render mesh (.stl for binary STL, otherwise JSON)
        #[arg(long)]
        mesh: Option<PathBuf>,
        /// Fixed STEP header timestamp, for reproducible output
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Show the stock and the machining order of a part definition
    Info {
        /// Part definition (JSON)
        input: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            input,
            config,
            step,
            stock_step,
            mesh,
            timestamp,
        } => {
            let config = match config {
                Some(path) => KernelConfig::load(&path)?,
                None => KernelConfig::default(),
            };
            let part = read_part(&input)?;
            tracing::debug!(path = %input.display(), features = part.features.len(), "loaded part");
            let result = build_model(&part, &config);
            let options = StepOptions {
                name: part_name(&input),
                timestamp,
                ..Default::default()
            };
            if let Some(path) = step {
                write_step(&path, &result.model.to_step(&options))
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            if let Some(path) = stock_step {
                export_stock(&result, &options, &path)?;
            }
            if let Some(path) = mesh {
                export_mesh(&result.model.to_render_mesh(), &path)?;
            }
            println!("{}", serde_json::to_string_pretty(&result.metadata)?);
        }
        Commands::Info { input } => {
            show_info(&read_part(&input)?);
        }
    }

    Ok(())
}

fn read_part(path: &Path) -> Result<PartDefinition> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}

fn part_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("part")
        .to_string()
}

fn export_stock(result: &BuildResult, options: &StepOptions, path: &Path) -> Result<()> {
    let Some(stock) = result.stock else {
        bail!("build produced no stock solid");
    };
    let text = write_brep_to_string(&result.arena, stock, options)?;
    write_step(path, &text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn export_mesh(mesh: &RenderMesh, path: &Path) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let bytes = match ext.to_lowercase().as_str() {
        "stl" => stl_bytes(mesh),
        "json" | "" => serde_json::to_vec(mesh)?,
        _ => bail!("unknown mesh format: {}", ext),
    };
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Binary STL with the mesh's flat normals.
fn stl_bytes(mesh: &RenderMesh) -> Vec<u8> {
    let num_triangles = mesh.num_triangles();
    let mut data = Vec::with_capacity(84 + num_triangles * 50);

    let mut header = [b' '; 80];
    let tag = b"partforge STL export";
    header[..tag.len()].copy_from_slice(tag);
    data.extend_from_slice(&header);
    data.extend_from_slice(&(num_triangles as u32).to_le_bytes());

    for tri in mesh.indices.chunks(3) {
        let first = tri[0] as usize * 3;
        for n in &mesh.normals[first..first + 3] {
            data.extend_from_slice(&n.to_le_bytes());
        }
        for &i in tri {
            let i = i as usize * 3;
            for c in &mesh.positions[i..i + 3] {
                data.extend_from_slice(&c.to_le_bytes());
            }
        }
        // Attribute byte count
        data.extend_from_slice(&0u16.to_le_bytes());
    }

    data
}

fn show_info(part: &PartDefinition) {
    println!("Stock: {}", part.stock.kind);
    if let Some(material) = &part.material {
        println!("Material: {material}");
    }
    println!("Features: {}", part.features.len());
    for (i, feature) in order_features(&part.features).iter().enumerate() {
        match feature.feature_kind() {
            Some(kind) => println!(
                "  {:>2}. {:<12} priority {} depth {}  {}",
                i + 1,
                kind.as_str(),
                kind.priority(),
                feature.dimensions.cut_depth(),
                feature.label()
            ),
            None => println!("  {:>2}. {:<12} unknown, skipped", i + 1, feature.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partforge_kernel::partforge_kernel_tessellate::Triangle;
    use partforge_kernel::partforge_kernel_math::Point3;

    #[test]
    fn test_stl_layout() {
        let mesh = RenderMesh::from_triangles(&[Triangle::new(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )]);
        let bytes = stl_bytes(&mesh);
        assert_eq!(bytes.len(), 84 + 50);
        assert!(bytes.starts_with(b"partforge STL export"));
        assert_eq!(u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]), 1);
        let nz = f32::from_le_bytes([bytes[92], bytes[93], bytes[94], bytes[95]]);
        assert_eq!(nz, 1.0);
    }

    #[test]
    fn test_part_name_from_path() {
        assert_eq!(part_name(Path::new("/tmp/bracket.json")), "bracket");
        assert_eq!(part_name(Path::new("")), "part");
    }

    #[test]
    fn test_cli_parses_build() {
        let cli = Cli::try_parse_from([
            "partforge",
            "-v",
            "build",
            "part.json",
            "--step",
            "out.step",
            "--timestamp",
            "2024-01-01T00:00:00",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Build { step, timestamp, mesh, .. } => {
                assert_eq!(step, Some(PathBuf::from("out.step")));
                assert_eq!(timestamp.as_deref(), Some("2024-01-01T00:00:00"));
                assert!(mesh.is_none());
            }
            Commands::Info { .. } => panic!("expected build"),
        }
    }
}
