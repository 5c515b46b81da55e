use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::Result;

/// Whole-file input from a path, or from stdin when the path is "-"
pub struct InputReader {
    reader: Box<dyn Read>,
    path: PathBuf,
    is_pipe: bool,
}

impl InputReader {
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let path = input_path.as_ref().to_path_buf();
        let is_pipe = is_pipe_path(&path);

        let reader: Box<dyn Read> = if is_pipe {
            Box::new(io::stdin().lock())
        } else {
            Box::new(BufReader::new(File::open(&path)?))
        };

        Ok(Self {
            reader,
            path,
            is_pipe,
        })
    }

    pub fn is_pipe(&self) -> bool {
        self.is_pipe
    }

    /// File name used for kind resolution; `None` for stdin.
    pub fn file_name(&self) -> Option<String> {
        if self.is_pipe {
            None
        } else {
            Some(self.path.to_string_lossy().into_owned())
        }
    }

    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        log::debug!("Read {} bytes from {}", data.len(), self.path.display());
        Ok(data)
    }
}

pub fn is_pipe_path(path: &Path) -> bool {
    path.as_os_str() == "-"
}
