use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const TABLE_DIR: &str = "tables";
pub const BUNDLE_FORMAT_V1: &str = "edutrack-workspace-v1";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub table_count: usize,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
    pub tables_restored: usize,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn workspace_tables(workspace_path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut tables = Vec::new();
    for ent in std::fs::read_dir(workspace_path).with_context(|| {
        format!(
            "failed to read workspace {}",
            workspace_path.to_string_lossy()
        )
    })? {
        let p = ent?.path();
        if !p.is_file() {
            continue;
        }
        let Some(name) = p.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if name.ends_with(".json") {
            tables.push(p);
        }
    }
    // Deterministic bundle order.
    tables.sort();
    Ok(tables)
}

/// Bundles every JSON table in the workspace into a zip with a manifest
/// carrying a sha256 per table.
pub fn export_workspace_bundle(
    workspace_path: &Path,
    out_path: &Path,
) -> anyhow::Result<ExportSummary> {
    let tables = workspace_tables(workspace_path)?;
    if tables.is_empty() {
        return Err(anyhow!(
            "no tables to export in {}",
            workspace_path.to_string_lossy()
        ));
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut checksums = serde_json::Map::new();
    let mut contents: Vec<(String, Vec<u8>)> = Vec::new();
    for path in &tables {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("unreadable table name in workspace"))?
            .to_string();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read table {}", path.to_string_lossy()))?;
        checksums.insert(name.clone(), json!(sha256_hex(&bytes)));
        contents.push((name, bytes));
    }

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "tables": checksums,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    for (name, bytes) in &contents {
        zip.start_file(format!("{}/{}", TABLE_DIR, name), opts)
            .with_context(|| format!("failed to start entry for {}", name))?;
        zip.write_all(bytes)
            .with_context(|| format!("failed to write entry for {}", name))?;
    }

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        table_count: contents.len(),
    })
}

/// Restores every table from a bundle. Checksums are verified and all tables
/// are staged before anything is moved into place, so a bad bundle leaves the
/// workspace untouched.
pub fn import_workspace_bundle(
    in_path: &Path,
    workspace_path: &Path,
) -> anyhow::Result<ImportSummary> {
    if !is_zip_file(in_path)? {
        return Err(anyhow!(
            "not a workspace bundle: {}",
            in_path.to_string_lossy()
        ));
    }

    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }
    let checksums = manifest
        .get("tables")
        .and_then(|v| v.as_object())
        .ok_or_else(|| anyhow!("manifest has no tables map"))?;

    std::fs::create_dir_all(workspace_path).with_context(|| {
        format!(
            "failed to create workspace {}",
            workspace_path.to_string_lossy()
        )
    })?;

    // Stage every verified table first; install only after all pass.
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();
    for (name, expected) in checksums {
        let expected = expected
            .as_str()
            .ok_or_else(|| anyhow!("manifest checksum for {} is not a string", name))?;
        let mut bytes = Vec::new();
        archive
            .by_name(&format!("{}/{}", TABLE_DIR, name))
            .with_context(|| format!("bundle missing table {}", name))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed to read table {}", name))?;
        let actual = sha256_hex(&bytes);
        if actual != expected {
            return Err(anyhow!(
                "checksum mismatch for {}: expected {}, got {}",
                name,
                expected,
                actual
            ));
        }
        let tmp = workspace_path.join(format!("{}.importing", name));
        std::fs::write(&tmp, &bytes)
            .with_context(|| format!("failed to stage table {}", name))?;
        staged.push((tmp, workspace_path.join(name)));
    }

    for (tmp, dst) in &staged {
        std::fs::rename(tmp, dst)
            .with_context(|| format!("failed to move staged table to {}", dst.to_string_lossy()))?;
    }

    Ok(ImportSummary {
        bundle_format_detected: BUNDLE_FORMAT_V1.to_string(),
        tables_restored: staged.len(),
    })
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}
