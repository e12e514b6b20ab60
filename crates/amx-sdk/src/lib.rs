//! AMX SDK - the scripting VM as seen from a native plugin
//!
//! Natives only ever exchange 32-bit cells with the VM. A cell is either a
//! plain integer (flags, indices, handles) or a byte address into the
//! script's data segment (strings, by-reference parameters). This crate
//! models that boundary without depending on any particular VM build:
//!
//! - [`Amx`]: bounds-checked cell access and public-variable lookup
//! - [`Params`]: the parameter block handed to every native
//! - [`DataSegment`]: an in-memory data segment for embedders and tests

#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod params;

pub use error::{AmxError, AmxResult};
pub use memory::DataSegment;
pub use params::Params;

/// The VM's only value type.
pub type Cell = i32;

/// Size of one cell in bytes; addresses advance in these steps.
pub const CELL_SIZE: Cell = std::mem::size_of::<Cell>() as Cell;

/// Largest first-cell value of an unpacked string. Anything above it marks
/// a packed string.
pub const UNPACKED_MAX: u32 = 0x00FF_FFFF;

// ============================================================================
// VM access
// ============================================================================

/// Abstract VM instance for natives.
///
/// The host implements the three required methods; string reading is
/// provided on top of them. Every access is bounds-checked by the
/// implementation, so a forged address yields `None`/`false` rather than a
/// fault.
pub trait Amx {
    /// Read the cell at a data-segment byte address.
    fn cell(&self, addr: Cell) -> Option<Cell>;

    /// Write the cell at a data-segment byte address. Returns `false` if the
    /// address does not resolve.
    fn set_cell(&mut self, addr: Cell, value: Cell) -> bool;

    /// Address of a public variable, if the script declares it.
    fn pub_var(&self, name: &str) -> Option<Cell>;

    /// Number of characters in the string at `addr`, packed or unpacked.
    fn str_len(&self, addr: Cell) -> AmxResult<usize> {
        self.string_bytes(addr).map(|bytes| bytes.len())
    }

    /// Characters of the string at `addr`, without the terminator.
    ///
    /// Unpacked cells are truncated to their low byte. Packed strings hold
    /// four characters per cell, most significant byte first.
    fn string_bytes(&self, addr: Cell) -> AmxResult<Vec<u8>> {
        let first = self.cell(addr).ok_or(AmxError::InvalidAddress(addr))?;
        let packed = first as u32 > UNPACKED_MAX;

        let mut out = Vec::new();
        let mut at = addr;
        loop {
            let cell = self.cell(at).ok_or(AmxError::Unterminated(addr))?;
            if packed {
                for byte in (cell as u32).to_be_bytes() {
                    if byte == 0 {
                        return Ok(out);
                    }
                    out.push(byte);
                }
            } else {
                if cell == 0 {
                    return Ok(out);
                }
                out.push(cell as u8);
            }
            at = at.checked_add(CELL_SIZE).ok_or(AmxError::Unterminated(addr))?;
        }
    }
}
