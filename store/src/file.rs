use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use eos_common::{Error, Scalar};

use crate::OfflineStore;

/// Append-only writer to the record file (e.g. `miniApp_data.txt`). One
/// line of whitespace-separated scalars per sample, `n_in + n_out`
/// values, buffered and flushed once per `store` call rather than per
/// record.
pub struct FileStore {
    writer: BufWriter<File>,
}

impl FileStore {
    /// Opens (creating if absent) the record file in append mode.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| Error::Store { source })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl<V: Scalar> OfflineStore<V> for FileStore {
    fn store(
        &mut self,
        n: usize,
        packed_inputs: &[&[V]],
        packed_outputs: &[&[V]],
    ) -> Result<(), Error> {
        for feature in packed_inputs.iter().chain(packed_outputs) {
            if feature.len() != n {
                return Err(Error::ShapeMismatch {
                    what: "offline store feature length",
                    expected: n,
                    actual: feature.len(),
                });
            }
        }

        for sample in 0..n {
            let mut values = packed_inputs
                .iter()
                .chain(packed_outputs)
                .map(|feature| feature[sample]);
            if let Some(first) = values.next() {
                write!(self.writer, "{first:?}").map_err(|source| Error::Store { source })?;
            }
            for value in values {
                write!(self.writer, " {value:?}").map_err(|source| Error::Store { source })?;
            }
            writeln!(self.writer).map_err(|source| Error::Store { source })?;
        }
        self.writer.flush().map_err(|source| Error::Store { source })?;
        log::trace!("offline store appended {n} records");
        Ok(())
    }
}
