use super::error::InputError;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Defines the interface for reading one row type from a delimited text table.
///
/// Implementors parse the format-specific layout (delimiter, column positions, row
/// filters) while the provided [`read_from_path`](TabularInput::read_from_path) attaches
/// the file path to any failure.
pub trait TabularInput: Sized {
    /// Reads every accepted row from a reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The source of the table, header row included.
    ///
    /// # Errors
    ///
    /// Returns a [`csv::Error`] if the underlying reader fails or a row cannot be decoded.
    fn read_from<R: Read>(reader: R) -> Result<Vec<Self>, csv::Error>;

    /// Reads every accepted row from the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Io`] if the file cannot be opened and [`InputError::Csv`] if
    /// parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Self>, InputError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| InputError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::read_from(BufReader::new(file)).map_err(|e| InputError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}
