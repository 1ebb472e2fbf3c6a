//! Extended Inquiry Response parsing.
//!
//! An EIR block is a run of `[length][type][data ...]` structures where
//! `length` covers the type byte and the data. A zero length ends the block.

use crate::protocol::constants::*;

/// Find the payload of the first structure with the given type
pub fn resolve_eir_data(eir: &[u8], data_type: u8) -> Option<&[u8]> {
    let mut pos = 0;

    while pos < eir.len() {
        let len = eir[pos] as usize;
        if len == 0 {
            break;
        }

        let end = pos + 1 + len;
        if end > eir.len() {
            // Truncated structure
            break;
        }

        if eir[pos + 1] == data_type {
            return Some(&eir[pos + 2..end]);
        }

        pos = end;
    }

    None
}

/// Complete local name, else short local name, truncated to the name limit
pub fn name_from_eir(eir: &[u8]) -> Option<String> {
    let raw = resolve_eir_data(eir, EIR_TYPE_CMPL_LOCAL_NAME)
        .or_else(|| resolve_eir_data(eir, EIR_TYPE_SHORT_LOCAL_NAME))?;

    let raw = &raw[..raw.len().min(MAX_NAME_LEN)];
    Some(String::from_utf8_lossy(raw).into_owned())
}
