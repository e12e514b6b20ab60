//! Native parameter blocks
//!
//! The VM calls a native with a pointer to a cell array whose first element
//! is the byte size of the arguments that follow. Argument `n` lives at
//! index `n` (1-based).

use crate::{AmxError, AmxResult, Cell, CELL_SIZE};

/// Borrowed view of one native call's parameters.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    raw: &'a [Cell],
}

impl<'a> Params<'a> {
    /// Wrap a raw parameter block (size header included).
    pub fn new(raw: &'a [Cell]) -> Self {
        Self { raw }
    }

    /// Build a parameter block from plain arguments, the way the VM lays
    /// one out.
    pub fn block(args: &[Cell]) -> Vec<Cell> {
        let mut raw = Vec::with_capacity(args.len() + 1);
        raw.push(args.len() as Cell * CELL_SIZE);
        raw.extend_from_slice(args);
        raw
    }

    /// Argument count declared by the caller.
    pub fn count(&self) -> usize {
        match self.raw.first() {
            Some(&bytes) if bytes > 0 => (bytes / CELL_SIZE) as usize,
            _ => 0,
        }
    }

    /// Fail unless the header is exactly `expected` cells' worth of bytes
    /// and that many arguments actually follow it.
    pub fn check(&self, expected: usize) -> AmxResult<()> {
        let header = self.raw.first().copied().unwrap_or(0);
        let supplied = self.raw.len().saturating_sub(1);
        if i64::from(header) != expected as i64 * i64::from(CELL_SIZE) || supplied < expected {
            return Err(AmxError::ParamCount {
                expected,
                got: self.count().min(supplied),
            });
        }
        Ok(())
    }

    /// Argument `index` (1-based). Missing arguments read as 0.
    pub fn get(&self, index: usize) -> Cell {
        if index == 0 {
            return 0;
        }
        self.raw.get(index).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_layout() {
        let raw = Params::block(&[10, 20, 30]);
        assert_eq!(raw, vec![12, 10, 20, 30]);

        let params = Params::new(&raw);
        assert_eq!(params.count(), 3);
        assert_eq!(params.get(1), 10);
        assert_eq!(params.get(3), 30);
        assert_eq!(params.get(4), 0);
        assert_eq!(params.get(0), 0);
    }

    #[test]
    fn test_check_count() {
        let raw = Params::block(&[1, 2]);
        let params = Params::new(&raw);
        assert!(params.check(2).is_ok());
        assert_eq!(
            params.check(3),
            Err(AmxError::ParamCount { expected: 3, got: 2 })
        );
    }

    #[test]
    fn test_check_rejects_lying_header() {
        // Header claims three arguments, only one follows.
        let raw = [12, 5];
        let params = Params::new(&raw);
        assert!(params.check(3).is_err());
        assert!(params.check(1).is_err());
    }

    #[test]
    fn test_check_rejects_unaligned_header() {
        // 13..=15 bytes round down to three cells but are not a valid header.
        for header in 13..=15 {
            let raw = [header, 1, 2, 3];
            assert!(Params::new(&raw).check(3).is_err(), "header {header}");
        }
        assert!(Params::new(&[12, 1, 2, 3]).check(3).is_ok());
    }

    #[test]
    fn test_empty_block() {
        let params = Params::new(&[]);
        assert_eq!(params.count(), 0);
        assert!(params.check(0).is_ok());
    }
}
