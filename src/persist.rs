//! Binary persistence for trained networks.

use crate::error::NetworkError;
use crate::network::Network;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// File identification bytes.
const MAGIC: &[u8; 4] = b"SOMB";

/// Current file format version.
pub const VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    network: Network,
}

/// Save a network to a binary file: magic bytes, then a bincode-encoded
/// envelope carrying the format version and the network state.
pub fn save<P: AsRef<Path>>(network: &Network, path: P) -> Result<(), PersistError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(MAGIC)?;

    let envelope = Envelope {
        version: VERSION,
        network: network.clone(),
    };
    let encoded = bincode::serialize(&envelope)?;
    writer.write_all(&encoded)?;
    writer.flush()?;

    Ok(())
}

/// Load a network from a binary file. Checks magic bytes and format
/// version, validates the layer/connector topology, and rebuilds the RNG
/// from the stored seed. A failed load leaves nothing half-constructed.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Network, PersistError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(PersistError::InvalidFormat("invalid magic bytes".to_string()));
    }

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    let envelope: Envelope = bincode::deserialize(&buffer)?;

    if envelope.version != VERSION {
        return Err(PersistError::VersionMismatch {
            expected: VERSION,
            found: envelope.version,
        });
    }

    let mut network = envelope.network;
    network.validate()?;
    network.rebuild_rng();

    Ok(network)
}

/// Approximate serialized size in bytes.
pub fn serialized_size(network: &Network) -> usize {
    bincode::serialized_size(network).unwrap_or(0) as usize
}

/// Errors that can occur while saving or loading a network file.
#[derive(Debug)]
pub enum PersistError {
    Io(std::io::Error),
    Serialization(bincode::Error),
    InvalidFormat(String),
    VersionMismatch { expected: u32, found: u32 },
    TopologyMismatch(NetworkError),
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            Self::VersionMismatch { expected, found } => {
                write!(f, "Version mismatch: expected {}, found {}", expected, found)
            }
            Self::TopologyMismatch(e) => write!(f, "Inconsistent network state: {}", e),
        }
    }
}

impl std::error::Error for PersistError {}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<bincode::Error> for PersistError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e)
    }
}

impl From<NetworkError> for PersistError {
    fn from(e: NetworkError) -> Self {
        Self::TopologyMismatch(e)
    }
}
