//! Output plumbing shared by the binary
//!
//! `log` and `global-log` can print the whole history, so the binary routes
//! them through the minus pager when stdout is a terminal.

use derive_new::new;
use minus::Pager;
use std::io::{self, Write};

/// `io::Write` front for a minus pager
///
/// A `Repository` only knows its writer as `Box<dyn Write>`; handing it a
/// `PagerWriter` collects the history text in the pager, which is shown with
/// `minus::page_all` once the command returns. Output must be UTF-8.
///
/// ```ignore
/// let pager = Pager::new();
/// let repository = Repository::new(path, Box::new(PagerWriter::new(pager.clone())))?;
/// repository.log()?;
/// minus::page_all(pager)?;
/// ```
#[derive(new)]
pub struct PagerWriter {
    pager: Pager,
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text =
            std::str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.pager.push_str(text).map_err(io::Error::other)?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_utf8_output() {
        let mut writer = PagerWriter::new(Pager::new());

        assert!(writer.write_all(b"commit abc\n").is_ok());
        let err = writer.write(&[0xff, 0xfe]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
