use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use log::debug;

use crate::consts;
use crate::error::{MachineError, Result};

/// A raw program image: no header, loaded verbatim at `PROG_OFFSET`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rom {
    pub buffer: Vec<u8>,
}

impl Rom {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > consts::MAX_ROM_BYTES {
            return Err(MachineError::RomTooLarge {
                size: bytes.len(),
                max: consts::MAX_ROM_BYTES,
            });
        }
        Ok(Rom {
            buffer: bytes.to_vec(),
        })
    }

    pub fn from_reader(reader: &mut impl Read) -> Result<Self> {
        // read one byte past the limit so oversized images are caught without
        // slurping arbitrarily large inputs
        let mut data = Vec::with_capacity(consts::MAX_ROM_BYTES);
        reader
            .by_ref()
            .take(consts::MAX_ROM_BYTES as u64 + 1)
            .read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let rom = Self::from_reader(&mut file)?;
        debug!("read {} byte ROM from {}", rom.len(), path.display());
        Ok(rom)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_size_accepted() {
        let rom = Rom::from_bytes(&[0xAA; consts::MAX_ROM_BYTES]).unwrap();
        assert_eq!(rom.len(), 3584);
    }

    #[test]
    fn test_too_large_rejected() {
        let err = Rom::from_bytes(&[0; consts::MAX_ROM_BYTES + 1]).unwrap_err();
        assert!(matches!(
            err,
            MachineError::RomTooLarge {
                size: 3585,
                max: 3584
            }
        ));
    }

    #[test]
    fn test_reader_too_large_rejected() {
        let data = vec![0u8; 5000];
        let err = Rom::from_reader(&mut data.as_slice()).unwrap_err();
        assert!(matches!(err, MachineError::RomTooLarge { size: 3585, .. }));
    }

    #[test]
    fn test_missing_file_unreadable() {
        let err = Rom::from_path("/nonexistent/definitely/not/here.ch8").unwrap_err();
        assert!(matches!(err, MachineError::RomUnreadable(_)));
    }
}
