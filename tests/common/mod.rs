#![allow(dead_code)]

pub mod command;
pub mod file;

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Fixed commit date so ids are reproducible across test runs
pub const COMMIT_DATE: &str = "2024-01-01 12:00:00 +0000";

/// Writer handed to a `Repository` whose output the test reads back afterwards
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).to_string()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
