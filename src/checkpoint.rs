//! Network persistence and generation bookkeeping.
//!
//! ## File format (version 1, little endian)
//!
//! ```text
//! magic    4 bytes  "GOEV"
//! version  u32
//! layers   u32
//! per layer:
//!   input_length   u32
//!   output_length  u32
//!   weights        f32 × output.size() × (input.size() + 1), row-major, bias last
//! ```
//!
//! A layer's shapes are stored as board lengths; [`GoShape::new`] rebuilds the same
//! symmetry list and representatives from a length, so nothing derived is saved.
//!
//! Checkpoints live in one directory and are named `<generation>.dat`. The newest
//! generation is the largest numeric file stem found there.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::{CHECKPOINT_EXTENSION, CHECKPOINT_MAGIC, CHECKPOINT_VERSION};
use crate::network::{Layer, Network};
use crate::shape::GoShape;

/// Errors raised while reading or writing checkpoints.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("not a network checkpoint")]
    BadMagic,

    #[error("unsupported checkpoint version {0}")]
    UnsupportedVersion(u32),

    #[error("checkpoint ended early")]
    Truncated,

    #[error("checkpoint has trailing data")]
    TrailingData,

    #[error("invalid board length {0} in checkpoint")]
    InvalidLength(u32),

    #[error("layer {layer}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        layer: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("expected {expected} layers, found {found}")]
    LayerCountMismatch { expected: usize, found: usize },
}

fn read_error(e: io::Error) -> CheckpointError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        CheckpointError::Truncated
    } else {
        CheckpointError::Io(e)
    }
}

/// Serialize `net` in the current format.
pub fn write_network<W: Write>(writer: &mut W, net: &Network) -> Result<(), CheckpointError> {
    writer.write_all(&CHECKPOINT_MAGIC)?;
    writer.write_u32::<LittleEndian>(CHECKPOINT_VERSION)?;
    writer.write_u32::<LittleEndian>(net.layers().len() as u32)?;
    for layer in net.layers() {
        writer.write_u32::<LittleEndian>(layer.input().length() as u32)?;
        writer.write_u32::<LittleEndian>(layer.output().length() as u32)?;
        for &w in layer.matrix().iter().flatten() {
            writer.write_f32::<LittleEndian>(w)?;
        }
    }
    Ok(())
}

fn read_length<R: Read>(reader: &mut R) -> Result<usize, CheckpointError> {
    let length = reader.read_u32::<LittleEndian>().map_err(read_error)?;
    // Reject absurd lengths before allocating.
    if length == 0 || length > 64 {
        return Err(CheckpointError::InvalidLength(length));
    }
    Ok(length as usize)
}

/// Deserialize a network, taking its topology from the file.
pub fn read_network<R: Read>(reader: &mut R) -> Result<Network, CheckpointError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(read_error)?;
    if magic != CHECKPOINT_MAGIC {
        return Err(CheckpointError::BadMagic);
    }
    let version = reader.read_u32::<LittleEndian>().map_err(read_error)?;
    if version != CHECKPOINT_VERSION {
        return Err(CheckpointError::UnsupportedVersion(version));
    }

    let count = reader.read_u32::<LittleEndian>().map_err(read_error)?;
    let mut layers = Vec::new();
    for _ in 0..count {
        let input = read_length(reader)?;
        let output = read_length(reader)?;
        let mut layer = Layer::zeroed(GoShape::new(input), GoShape::new(output));
        for row in layer.matrix_mut() {
            reader
                .read_f32_into::<LittleEndian>(row)
                .map_err(read_error)?;
        }
        layers.push(layer);
    }

    let mut rest = [0u8; 1];
    if reader.read(&mut rest)? != 0 {
        return Err(CheckpointError::TrailingData);
    }
    Ok(Network::from_layers(layers))
}

/// Check that `found` has the topology of `expected`, layer by layer.
pub fn check_topology(expected: &Network, found: &Network) -> Result<(), CheckpointError> {
    if expected.layers().len() != found.layers().len() {
        return Err(CheckpointError::LayerCountMismatch {
            expected: expected.layers().len(),
            found: found.layers().len(),
        });
    }
    for (i, (e, f)) in expected.layers().iter().zip(found.layers()).enumerate() {
        if !e.same_topology(f) {
            return Err(CheckpointError::ShapeMismatch {
                layer: i,
                expected: (e.input().length(), e.output().length()),
                found: (f.input().length(), f.output().length()),
            });
        }
    }
    Ok(())
}

pub fn save_network(path: &Path, net: &Network) -> Result<(), CheckpointError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_network(&mut writer, net)?;
    writer.flush()?;
    Ok(())
}

pub fn load_network(path: &Path) -> Result<Network, CheckpointError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_network(&mut reader)
}

/// A directory of `<generation>.dat` checkpoints.
#[derive(Debug, Clone)]
pub struct CheckpointRegistry {
    dir: PathBuf,
}

impl CheckpointRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, generation: u64) -> PathBuf {
        self.dir.join(format!("{generation}.{CHECKPOINT_EXTENSION}"))
    }

    /// Highest generation stored, or `None` for a missing or empty directory.
    ///
    /// Entries whose stem is not an integer are skipped.
    pub fn latest(&self) -> Result<Option<u64>, CheckpointError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut latest = None;
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match stem.parse::<u64>() {
                Ok(generation) => latest = latest.max(Some(generation)),
                Err(_) => warn!(path = %path.display(), "Skipping non-generation file"),
            }
        }
        debug!(dir = %self.dir.display(), ?latest, "Scanned checkpoints");
        Ok(latest)
    }

    /// Write `net` as `generation`, creating the directory if needed.
    pub fn save(&self, generation: u64, net: &Network) -> Result<PathBuf, CheckpointError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(generation);
        save_network(&path, net)?;
        info!(generation, path = %path.display(), "Saved checkpoint");
        Ok(path)
    }

    /// Read `generation` and require it to match the topology of `template`.
    pub fn load(&self, generation: u64, template: &Network) -> Result<Network, CheckpointError> {
        let path = self.path_for(generation);
        let net = load_network(&path)?;
        check_topology(template, &net)?;
        info!(generation, path = %path.display(), "Loaded checkpoint");
        Ok(net)
    }
}
