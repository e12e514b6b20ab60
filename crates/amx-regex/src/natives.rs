//! Native table
//!
//! Each native unpacks its cell arguments, runs the matching [`Script`]
//! operation and turns the outcome into the status cell the VM sees.
//! Errors never cross the boundary: they are logged with the native's name
//! and reported as 0.

use amx_sdk::{Amx, Cell, Params};

use crate::error::{RegexError, RegexResult};
use crate::marshal::{get_ref, read_string, set_ref, write_string};
use crate::script::Script;

/// Signature shared by every native body.
pub type NativeFn = fn(&Script, &mut dyn Amx, &Params<'_>) -> RegexResult<Cell>;

/// A native as registered with the host.
#[derive(Clone, Copy)]
pub struct Native {
    /// Name scripts declare it under
    pub name: &'static str,
    /// Exact number of arguments it takes
    pub args: usize,
    body: NativeFn,
}

impl std::fmt::Debug for Native {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Native")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish()
    }
}

impl Native {
    /// Run the native. Argument count is checked before anything else;
    /// any failure is logged and yields 0.
    pub fn invoke(&self, script: &Script, amx: &mut dyn Amx, params: &Params<'_>) -> Cell {
        let result = params
            .check(self.args)
            .map_err(RegexError::from)
            .and_then(|()| (self.body)(script, amx, params));
        match result {
            Ok(status) => status,
            Err(error) => {
                tracing::error!(native = self.name, %error, "native call failed");
                0
            }
        }
    }
}

/// Every native the bridge exports.
pub static NATIVES: [Native; 8] = [
    Native { name: "Regex_New", args: 3, body: regex_new },
    Native { name: "Regex_Delete", args: 1, body: regex_delete },
    Native { name: "Regex_Check", args: 3, body: regex_check },
    Native { name: "Regex_Match", args: 4, body: regex_match },
    Native { name: "Regex_Search", args: 6, body: regex_search },
    Native { name: "Regex_Replace", args: 6, body: regex_replace },
    Native { name: "Match_GetGroup", args: 5, body: match_get_group },
    Native { name: "Match_Free", args: 1, body: match_free },
];

/// Look a native up by name.
pub fn find(name: &str) -> Option<&'static Native> {
    NATIVES.iter().find(|native| native.name == name)
}

// ============================================================================
// Bodies
// ============================================================================

// native Regex:Regex_New(const pattern[], E_REGEX_FLAG:flags = REGEX_DEFAULT,
//     E_REGEX_GRAMMAR:grammar = REGEX_ECMASCRIPT);
fn regex_new(script: &Script, amx: &mut dyn Amx, params: &Params<'_>) -> RegexResult<Cell> {
    let pattern = read_string(amx, params.get(1), "pattern")?;
    script.new_regex(pattern.as_bytes(), params.get(2), params.get(3))
}

// native Regex_Delete(&Regex:r);
fn regex_delete(script: &Script, amx: &mut dyn Amx, params: &Params<'_>) -> RegexResult<Cell> {
    let slot = params.get(1);
    script.delete_regex(get_ref(amx, slot)?)?;
    set_ref(amx, slot, 0)?;
    Ok(1)
}

// native Regex_Check(const str[], Regex:r, E_MATCH_FLAG:flags = MATCH_DEFAULT);
fn regex_check(script: &Script, amx: &mut dyn Amx, params: &Params<'_>) -> RegexResult<Cell> {
    let subject = read_string(amx, params.get(1), "str")?;
    let matched = script.check(subject.as_bytes(), params.get(2), params.get(3))?;
    Ok(Cell::from(matched))
}

// native Regex_Match(const str[], Regex:r, &RegexMatch:m,
//     E_MATCH_FLAG:flags = MATCH_DEFAULT);
fn regex_match(script: &Script, amx: &mut dyn Amx, params: &Params<'_>) -> RegexResult<Cell> {
    let subject = read_string(amx, params.get(1), "str")?;
    let slot = params.get(3);
    get_ref(amx, slot)?;

    match script.regex_match(subject.as_bytes(), params.get(2), params.get(4))? {
        Some(handle) => {
            set_ref(amx, slot, handle)?;
            Ok(1)
        }
        None => Ok(0),
    }
}

// native Regex_Search(const str[], Regex:r, &RegexMatch:m, &pos,
//     startpos = 0, E_MATCH_FLAG:flags = MATCH_DEFAULT);
fn regex_search(script: &Script, amx: &mut dyn Amx, params: &Params<'_>) -> RegexResult<Cell> {
    let subject = read_string(amx, params.get(1), "str")?;
    let (match_slot, pos_slot) = (params.get(3), params.get(4));
    get_ref(amx, match_slot)?;
    get_ref(amx, pos_slot)?;

    let found = script.search(subject.as_bytes(), params.get(2), params.get(5), params.get(6))?;
    match found {
        Some((handle, pos)) => {
            set_ref(amx, match_slot, handle)?;
            set_ref(amx, pos_slot, pos)?;
            Ok(1)
        }
        None => Ok(0),
    }
}

// native Regex_Replace(const str[], Regex:r, const fmt[], dest[],
//     E_MATCH_FLAG:flags = MATCH_DEFAULT, size = sizeof dest);
fn regex_replace(script: &Script, amx: &mut dyn Amx, params: &Params<'_>) -> RegexResult<Cell> {
    let subject = read_string(amx, params.get(1), "str")?;
    let template = read_string(amx, params.get(3), "fmt")?;
    let out = script.replace(subject.as_bytes(), params.get(2), template.as_bytes(), params.get(5))?;
    let written = write_string(amx, params.get(4), &out, params.get(6))?;
    if written < out.len() {
        tracing::debug!(written, len = out.len(), "replacement truncated");
    }
    Ok(1)
}

// native Match_GetGroup(RegexMatch:m, index, dest[], &length,
//     size = sizeof dest);
fn match_get_group(script: &Script, amx: &mut dyn Amx, params: &Params<'_>) -> RegexResult<Cell> {
    let length_slot = params.get(4);
    get_ref(amx, length_slot)?;

    let group = script.group(params.get(1), params.get(2))?;
    let written = write_string(amx, params.get(3), &group, params.get(5))?;
    // Strings are bounded by the data segment, so the count fits a cell.
    set_ref(amx, length_slot, written as Cell)?;
    Ok(1)
}

// native Match_Free(&RegexMatch:m);
fn match_free(script: &Script, amx: &mut dyn Amx, params: &Params<'_>) -> RegexResult<Cell> {
    let slot = params.get(1);
    script.free_match(get_ref(amx, slot)?)?;
    set_ref(amx, slot, 0)?;
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use amx_sdk::DataSegment;

    fn call(name: &str, script: &Script, data: &mut DataSegment, args: &[Cell]) -> Cell {
        let raw = Params::block(args);
        find(name).unwrap().invoke(script, data, &Params::new(&raw))
    }

    #[test]
    fn test_table() {
        let names: Vec<_> = NATIVES.iter().map(|n| (n.name, n.args)).collect();
        assert_eq!(
            names,
            [
                ("Regex_New", 3),
                ("Regex_Delete", 1),
                ("Regex_Check", 3),
                ("Regex_Match", 4),
                ("Regex_Search", 6),
                ("Regex_Replace", 6),
                ("Match_GetGroup", 5),
                ("Match_Free", 1),
            ]
        );
        assert!(find("Regex_Nope").is_none());
    }

    #[test]
    fn test_param_count_checked_first() {
        let script = Script::new(Locale::default());
        let mut data = DataSegment::new();
        let pattern = data.push_string(b"abc");
        assert_eq!(call("Regex_New", &script, &mut data, &[pattern, 0]), 0);
        assert_eq!(script.pattern_count(), 0);
    }

    #[test]
    fn test_delete_zeroes_reference() {
        let script = Script::new(Locale::default());
        let mut data = DataSegment::new();
        let pattern = data.push_string(b"abc");
        let handle = call("Regex_New", &script, &mut data, &[pattern, 0, 0]);
        assert_ne!(handle, 0);

        let slot = data.push_cell(handle);
        assert_eq!(call("Regex_Delete", &script, &mut data, &[slot]), 1);
        assert_eq!(data.cell(slot), Some(0));
        assert_eq!(call("Regex_Delete", &script, &mut data, &[slot]), 0);
    }

    #[test]
    fn test_match_leaves_reference_on_no_match() {
        let script = Script::new(Locale::default());
        let mut data = DataSegment::new();
        let pattern = data.push_string(b"a+");
        let re = call("Regex_New", &script, &mut data, &[pattern, 0, 0]);
        let subject = data.push_string(b"bbb");
        let slot = data.push_cell(-1);
        assert_eq!(call("Regex_Match", &script, &mut data, &[subject, re, slot, 0]), 0);
        assert_eq!(data.cell(slot), Some(-1));
        assert_eq!(script.match_count(), 0);
    }

    #[test]
    fn test_bad_reference_has_no_side_effects() {
        let script = Script::new(Locale::default());
        let mut data = DataSegment::new();
        let pattern = data.push_string(b"a");
        let re = call("Regex_New", &script, &mut data, &[pattern, 0, 0]);
        let subject = data.push_string(b"a");
        assert_eq!(call("Regex_Match", &script, &mut data, &[subject, re, 4096, 0]), 0);
        assert_eq!(script.match_count(), 0);
    }
}
