//! Strings and by-reference cells across the VM boundary

use std::ffi::CString;

use amx_sdk::{Amx, Cell, CELL_SIZE};

use crate::error::{RegexError, RegexResult};

/// Read a non-empty string argument. `what` names the parameter in the
/// error.
pub fn read_string(amx: &dyn Amx, addr: Cell, what: &'static str) -> RegexResult<CString> {
    let bytes = amx
        .string_bytes(addr)
        .map_err(|_| RegexError::InvalidString(what))?;
    if bytes.is_empty() {
        return Err(RegexError::InvalidString(what));
    }
    // A cell whose low byte is zero leaves an interior nul.
    CString::new(bytes).map_err(|_| RegexError::InvalidString(what))
}

/// Write `src` as an unpacked string at `dest`.
///
/// `capacity` counts cells and includes the terminator: at most
/// `capacity - 1` characters are copied, then a zero cell. Returns the
/// number of characters copied; nothing is written when `capacity <= 0`.
pub fn write_string(amx: &mut dyn Amx, dest: Cell, src: &[u8], capacity: Cell) -> RegexResult<usize> {
    if capacity <= 0 {
        return Ok(0);
    }
    let written = src.len().min(capacity as usize - 1);

    let mut at = dest;
    for &byte in &src[..written] {
        store(amx, at, Cell::from(byte))?;
        at = next(at)?;
    }
    store(amx, at, 0)?;
    Ok(written)
}

/// Store `value` through a by-reference parameter.
pub fn set_ref(amx: &mut dyn Amx, addr: Cell, value: Cell) -> RegexResult<()> {
    if amx.set_cell(addr, value) {
        Ok(())
    } else {
        Err(RegexError::InvalidReference)
    }
}

/// Load the cell behind a by-reference parameter.
pub fn get_ref(amx: &dyn Amx, addr: Cell) -> RegexResult<Cell> {
    amx.cell(addr).ok_or(RegexError::InvalidReference)
}

fn store(amx: &mut dyn Amx, addr: Cell, value: Cell) -> RegexResult<()> {
    if amx.set_cell(addr, value) {
        Ok(())
    } else {
        Err(out_of_bounds(addr))
    }
}

fn next(addr: Cell) -> RegexResult<Cell> {
    addr.checked_add(CELL_SIZE).ok_or_else(|| out_of_bounds(addr))
}

fn out_of_bounds(addr: Cell) -> RegexError {
    RegexError::InvalidArgument(format!("destination runs off the data segment at {addr:#x}"))
}
