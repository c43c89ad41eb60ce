//! Q-value and visit-count tables with binary checkpointing.
//!
//! Both tables are dense row-major arrays indexed `[state][action]`. The
//! trainer is the only writer; agents read them without mutation.
//!
//! Checkpoint format: a fixed little-endian header (magic, version, table
//! dimensions, training hyperparameters) followed by the raw f32 Q array
//! and the raw u32 visit array. Round-trip fidelity is exact: loading a
//! saved file reproduces both tables bit for bit.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Checkpoint file magic: "QTBL".
const CHECKPOINT_MAGIC: u32 = 0x4C42_5451;

/// Checkpoint format version.
const CHECKPOINT_VERSION: u32 = 1;

/// Header size in bytes: magic, version, num_states, num_actions,
/// epochs, discount bits, exploration threshold.
const HEADER_SIZE: u64 = 4 + 4 + 8 + 4 + 8 + 4 + 4;

/// Values are streamed through a scratch buffer of this many elements.
const IO_CHUNK: usize = 16 * 1024;

/// Errors from reading or writing a checkpoint.
///
/// A failed load never yields a zero-initialized table; the caller must
/// decide how to proceed.
#[derive(Debug, Clone)]
pub enum CheckpointError {
    /// Underlying file I/O failed.
    Io(String),
    /// The file is not a checkpoint, or its version is unsupported.
    Format(String),
    /// The file length does not match its declared dimensions.
    SizeMismatch {
        /// Bytes the header implies.
        expected: u64,
        /// Bytes actually on disk.
        actual: u64,
    },
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointError::Io(e) => write!(f, "IO error: {}", e),
            CheckpointError::Format(e) => write!(f, "Invalid checkpoint: {}", e),
            CheckpointError::SizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Checkpoint size mismatch: expected {} bytes, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<std::io::Error> for CheckpointError {
    fn from(e: std::io::Error) -> Self {
        CheckpointError::Io(e.to_string())
    }
}

/// Training hyperparameters persisted alongside the tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckpointMeta {
    /// Episodes the tables have been trained for.
    pub epochs: u64,
    /// Discount rate used during training.
    pub discount_rate: f32,
    /// Visit-count threshold below which actions were treated as
    /// unexplored.
    pub exploration_threshold: u32,
}

/// Dense Q-value and visit-count tables.
#[derive(Debug, Clone, PartialEq)]
pub struct QTables {
    num_states: usize,
    num_actions: usize,
    q: Vec<f32>,
    n: Vec<u32>,
}

impl QTables {
    /// Allocate zero-initialized tables of the given shape.
    pub fn new(num_states: usize, num_actions: usize) -> QTables {
        QTables {
            num_states,
            num_actions,
            q: vec![0.0; num_states * num_actions],
            n: vec![0; num_states * num_actions],
        }
    }

    /// Number of state rows.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Number of action columns.
    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    #[inline]
    fn idx(&self, state: usize, action: usize) -> usize {
        debug_assert!(state < self.num_states && action < self.num_actions);
        state * self.num_actions + action
    }

    /// Learned value for a (state, action) pair.
    #[inline]
    pub fn q(&self, state: usize, action: usize) -> f32 {
        self.q[self.idx(state, action)]
    }

    /// Overwrite the learned value for a (state, action) pair.
    #[inline]
    pub fn set_q(&mut self, state: usize, action: usize, value: f32) {
        let idx = self.idx(state, action);
        self.q[idx] = value;
    }

    /// Times a (state, action) pair has been updated.
    #[inline]
    pub fn visits(&self, state: usize, action: usize) -> u32 {
        self.n[self.idx(state, action)]
    }

    /// Increment a pair's visit count and return the new count.
    #[inline]
    pub fn bump_visit(&mut self, state: usize, action: usize) -> u32 {
        let idx = self.idx(state, action);
        self.n[idx] += 1;
        self.n[idx]
    }

    /// Maximum learned value across a state's whole action row.
    pub fn row_max(&self, state: usize) -> f32 {
        let row = &self.q[state * self.num_actions..(state + 1) * self.num_actions];
        row.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Highest-valued action id among the given candidates.
    ///
    /// Ties go to the earliest candidate. Returns `None` for an empty
    /// candidate set.
    pub fn argmax_among<I>(&self, state: usize, actions: I) -> Option<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut best: Option<(usize, f32)> = None;
        for action in actions {
            let value = self.q(state, action);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((action, value)),
            }
        }
        best.map(|(action, _)| action)
    }

    /// Estimated memory footprint of both tables in bytes.
    pub fn memory_usage(&self) -> usize {
        self.q.len() * std::mem::size_of::<f32>() + self.n.len() * std::mem::size_of::<u32>()
    }

    /// Write the tables and hyperparameters to a checkpoint file.
    pub fn save<P: AsRef<Path>>(
        &self,
        path: P,
        meta: &CheckpointMeta,
    ) -> Result<(), CheckpointError> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);

        writer.write_all(&CHECKPOINT_MAGIC.to_le_bytes())?;
        writer.write_all(&CHECKPOINT_VERSION.to_le_bytes())?;
        writer.write_all(&(self.num_states as u64).to_le_bytes())?;
        writer.write_all(&(self.num_actions as u32).to_le_bytes())?;
        writer.write_all(&meta.epochs.to_le_bytes())?;
        writer.write_all(&meta.discount_rate.to_bits().to_le_bytes())?;
        writer.write_all(&meta.exploration_threshold.to_le_bytes())?;

        let mut buf = Vec::with_capacity(IO_CHUNK * 4);
        for chunk in self.q.chunks(IO_CHUNK) {
            buf.clear();
            for value in chunk {
                buf.extend_from_slice(&value.to_le_bytes());
            }
            writer.write_all(&buf)?;
        }
        for chunk in self.n.chunks(IO_CHUNK) {
            buf.clear();
            for value in chunk {
                buf.extend_from_slice(&value.to_le_bytes());
            }
            writer.write_all(&buf)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Load tables and hyperparameters from a checkpoint file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<(QTables, CheckpointMeta), CheckpointError> {
        let file = File::open(path.as_ref())?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let magic = read_u32(&mut reader)?;
        if magic != CHECKPOINT_MAGIC {
            return Err(CheckpointError::Format(format!(
                "bad magic 0x{:08x}",
                magic
            )));
        }
        let version = read_u32(&mut reader)?;
        if version != CHECKPOINT_VERSION {
            return Err(CheckpointError::Format(format!(
                "unsupported version {}",
                version
            )));
        }

        let num_states = read_u64(&mut reader)? as usize;
        let num_actions = read_u32(&mut reader)? as usize;
        let meta = CheckpointMeta {
            epochs: read_u64(&mut reader)?,
            discount_rate: f32::from_bits(read_u32(&mut reader)?),
            exploration_threshold: read_u32(&mut reader)?,
        };

        let cells = (num_states as u64) * (num_actions as u64);
        let expected = HEADER_SIZE + cells * 8;
        if file_len != expected {
            return Err(CheckpointError::SizeMismatch {
                expected,
                actual: file_len,
            });
        }

        let cells = cells as usize;
        let mut q = vec![0.0f32; cells];
        let mut n = vec![0u32; cells];
        let mut buf = vec![0u8; IO_CHUNK * 4];
        let mut filled = 0;
        while filled < cells {
            let take = (cells - filled).min(IO_CHUNK);
            reader.read_exact(&mut buf[..take * 4])?;
            for (i, bytes) in buf[..take * 4].chunks_exact(4).enumerate() {
                q[filled + i] = f32::from_le_bytes(bytes.try_into().unwrap());
            }
            filled += take;
        }
        filled = 0;
        while filled < cells {
            let take = (cells - filled).min(IO_CHUNK);
            reader.read_exact(&mut buf[..take * 4])?;
            for (i, bytes) in buf[..take * 4].chunks_exact(4).enumerate() {
                n[filled + i] = u32::from_le_bytes(bytes.try_into().unwrap());
            }
            filled += take;
        }

        Ok((
            QTables {
                num_states,
                num_actions,
                q,
                n,
            },
            meta,
        ))
    }
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, CheckpointError> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64, CheckpointError> {
    let mut bytes = [0u8; 8];
    reader.read_exact(&mut bytes)?;
    Ok(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tables() -> QTables {
        let mut tables = QTables::new(7, 5);
        tables.set_q(0, 0, 1.5);
        tables.set_q(3, 4, -2.25);
        tables.set_q(6, 2, 1000.0);
        tables.bump_visit(3, 4);
        tables.bump_visit(3, 4);
        tables.bump_visit(6, 2);
        tables
    }

    #[test]
    fn test_bump_visit_counts_up() {
        let mut tables = QTables::new(2, 2);
        assert_eq!(tables.visits(1, 1), 0);
        assert_eq!(tables.bump_visit(1, 1), 1);
        assert_eq!(tables.bump_visit(1, 1), 2);
        assert_eq!(tables.visits(1, 0), 0);
    }

    #[test]
    fn test_row_max_scans_full_row() {
        let mut tables = QTables::new(2, 4);
        tables.set_q(1, 0, -3.0);
        tables.set_q(1, 2, 2.5);
        tables.set_q(0, 3, 9.0); // different row, must not leak
        assert_eq!(tables.row_max(1), 2.5);
        assert_eq!(tables.row_max(0), 9.0);
    }

    #[test]
    fn test_argmax_prefers_earliest_on_ties() {
        let mut tables = QTables::new(1, 4);
        tables.set_q(0, 1, 5.0);
        tables.set_q(0, 3, 5.0);
        assert_eq!(tables.argmax_among(0, [0, 1, 2, 3]), Some(1));
        assert_eq!(tables.argmax_among(0, [3, 1]), Some(3));
        assert_eq!(tables.argmax_among(0, []), None);
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let dir = std::env::temp_dir().join("yahtzee_q_roundtrip.bin");
        let tables = sample_tables();
        let meta = CheckpointMeta {
            epochs: 12_345,
            discount_rate: 0.9,
            exploration_threshold: 5,
        };

        tables.save(&dir, &meta).unwrap();
        let (loaded, loaded_meta) = QTables::load(&dir).unwrap();

        assert_eq!(loaded, tables);
        assert_eq!(loaded_meta, meta);

        let _ = std::fs::remove_file(&dir);
    }

    #[test]
    fn test_load_missing_file_is_reported() {
        let result = QTables::load("/tmp/yahtzee_q_does_not_exist.bin");
        assert!(matches!(result, Err(CheckpointError::Io(_))));
    }

    #[test]
    fn test_load_rejects_bad_magic() {
        let path = std::env::temp_dir().join("yahtzee_q_bad_magic.bin");
        std::fs::write(&path, b"not a checkpoint at all........").unwrap();
        let result = QTables::load(&path);
        assert!(matches!(result, Err(CheckpointError::Format(_))));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_truncated_file() {
        let path = std::env::temp_dir().join("yahtzee_q_truncated.bin");
        let tables = sample_tables();
        let meta = CheckpointMeta {
            epochs: 1,
            discount_rate: 0.5,
            exploration_threshold: 5,
        };
        tables.save(&path, &meta).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();

        let result = QTables::load(&path);
        assert!(matches!(
            result,
            Err(CheckpointError::SizeMismatch { .. })
        ));
        let _ = std::fs::remove_file(&path);
    }
}
