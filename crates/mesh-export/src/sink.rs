//! Destinations for exported files.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use setting_ops::SettingOutput;
use tracing::{info, instrument};

use crate::error::ExportError;
use crate::MeshWriter;

/// Opens named outputs for writing.
pub trait ExportSink {
    fn open(&mut self, name: &str) -> Result<Box<dyn Write + '_>, ExportError>;
}

/// Keeps exported files in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }
}

impl ExportSink for MemorySink {
    fn open(&mut self, name: &str) -> Result<Box<dyn Write + '_>, ExportError> {
        let buf = self.files.entry(name.to_string()).or_default();
        buf.clear();
        Ok(Box::new(buf))
    }
}

/// Writes files under a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    pub root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ExportSink for DirectorySink {
    fn open(&mut self, name: &str) -> Result<Box<dyn Write + '_>, ExportError> {
        fs::create_dir_all(&self.root)?;
        let file = File::create(self.root.join(name))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// Write the designer and production meshes of `output`.
///
/// Produces `designer.<ext>` (all fragments concatenated) and
/// `production.<ext>`, returning the names written.
#[instrument(skip_all, fields(format = writer.format_name()))]
pub fn export_setting(
    output: &SettingOutput,
    writer: &dyn MeshWriter,
    sink: &mut dyn ExportSink,
) -> Result<Vec<String>, ExportError> {
    let ext = writer.extension();
    let (designer, _) = output.designer.flatten();
    let meshes = [
        ("designer", &designer),
        ("production", &output.production.mesh),
    ];

    let mut written = Vec::with_capacity(meshes.len());
    for (stem, mesh) in meshes {
        let name = format!("{stem}.{ext}");
        let mut out = sink.open(&name)?;
        writer.write_mesh(mesh, stem, &mut out)?;
        out.flush()?;
        written.push(name);
    }
    info!(files = ?written, "setting exported");
    Ok(written)
}
