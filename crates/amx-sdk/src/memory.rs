//! In-memory data segment
//!
//! A growable cell vector implementing [`Amx`]. Hosts that keep script data
//! in Rust can use it directly; tests use it to drive natives end to end.

use std::collections::HashMap;

use crate::{Amx, Cell, CELL_SIZE};

/// A script data segment addressed in bytes.
#[derive(Debug, Default, Clone)]
pub struct DataSegment {
    cells: Vec<Cell>,
    pub_vars: HashMap<String, Cell>,
}

impl DataSegment {
    /// Create an empty data segment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells in the segment.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the segment holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reserve `count` zeroed cells and return the address of the first.
    pub fn alloc(&mut self, count: usize) -> Cell {
        let addr = self.next_addr();
        self.cells.resize(self.cells.len() + count, 0);
        addr
    }

    /// Append a single cell and return its address.
    pub fn push_cell(&mut self, value: Cell) -> Cell {
        let addr = self.next_addr();
        self.cells.push(value);
        addr
    }

    /// Append an unpacked, zero-terminated string.
    pub fn push_string(&mut self, s: &[u8]) -> Cell {
        let addr = self.next_addr();
        self.cells.extend(s.iter().map(|&b| b as Cell));
        self.cells.push(0);
        addr
    }

    /// Append a packed, zero-terminated string (four bytes per cell, most
    /// significant first).
    pub fn push_packed_string(&mut self, s: &[u8]) -> Cell {
        let addr = self.next_addr();
        let mut bytes = s.to_vec();
        // Always leave room for at least one zero byte.
        bytes.resize((s.len() / 4 + 1) * 4, 0);
        self.cells.extend(
            bytes
                .chunks_exact(4)
                .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]) as Cell),
        );
        addr
    }

    /// Declare a public variable holding `value`; returns its address.
    pub fn set_pub_var(&mut self, name: &str, value: Cell) -> Cell {
        let addr = self.push_cell(value);
        self.pub_vars.insert(name.to_string(), addr);
        addr
    }

    fn next_addr(&self) -> Cell {
        self.cells.len() as Cell * CELL_SIZE
    }

    fn index(&self, addr: Cell) -> Option<usize> {
        if addr < 0 || addr % CELL_SIZE != 0 {
            return None;
        }
        let index = (addr / CELL_SIZE) as usize;
        (index < self.cells.len()).then_some(index)
    }
}

impl Amx for DataSegment {
    fn cell(&self, addr: Cell) -> Option<Cell> {
        self.index(addr).map(|i| self.cells[i])
    }

    fn set_cell(&mut self, addr: Cell, value: Cell) -> bool {
        match self.index(addr) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    fn pub_var(&self, name: &str) -> Option<Cell> {
        self.pub_vars.get(name).copied()
    }
}
