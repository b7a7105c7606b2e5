use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, Error, ErrorKind};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::errors::Result;

///
/// Get a reader for either a gzip'd or non-gzip'd instrument export.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).map_err(|e| {
        Error::new(
            e.kind(),
            format!("Failed to open file: {:?}: {}", path, e),
        )
    })?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Read a whole instrument export into memory. Exports are small text files,
/// and every parser works on the full contents.
///
pub fn read_export(path: &Path) -> Result<String> {
    let mut reader = get_dynamic_reader(path)?;
    let mut contents = String::new();
    reader.read_to_string(&mut contents).map_err(|e| {
        Error::new(
            ErrorKind::InvalidData,
            format!("{:?} is not a UTF-8 text export: {}", path, e),
        )
    })?;
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    fn test_read_plain_and_gzipped_exports() {
        let dir = tempdir().unwrap();

        let plain = dir.path().join("reader.txt");
        std::fs::write(&plain, "1.0\t2.0\n").unwrap();
        assert_eq!(read_export(&plain).unwrap(), "1.0\t2.0\n");

        let gz = dir.path().join("reader.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(b"3.0\t4.0\n").unwrap();
        encoder.finish().unwrap();
        assert_eq!(read_export(&gz).unwrap(), "3.0\t4.0\n");
    }

    #[rstest]
    fn test_missing_file() {
        assert!(read_export(Path::new("does/not/exist.txt")).is_err());
    }
}
