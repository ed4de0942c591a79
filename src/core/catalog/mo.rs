//! Binary MO output.

/// Little-endian MO magic number.
pub const MO_MAGIC: u32 = 0x950412de;

const HEADER_SIZE: u32 = 28;

/// Serialize `(key, value)` pairs as an MO file without a hash table.
///
/// Keys are written sorted bytewise, which puts the empty header key first.
pub fn write_mo(mut messages: Vec<(String, String)>) -> Vec<u8> {
    messages.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let nstrings = messages.len() as u32;
    let orig_tab_offset = HEADER_SIZE;
    let trans_tab_offset = orig_tab_offset + nstrings * 8;
    let strings_offset = trans_tab_offset + nstrings * 8;

    let mut orig_descriptors: Vec<(u32, u32)> = Vec::new();
    let mut trans_descriptors: Vec<(u32, u32)> = Vec::new();
    let mut string_data: Vec<u8> = Vec::new();

    for (key, value) in &messages {
        orig_descriptors.push((key.len() as u32, strings_offset + string_data.len() as u32));
        string_data.extend_from_slice(key.as_bytes());
        string_data.push(0);

        trans_descriptors.push((value.len() as u32, strings_offset + string_data.len() as u32));
        string_data.extend_from_slice(value.as_bytes());
        string_data.push(0);
    }

    let mut out = Vec::with_capacity(strings_offset as usize + string_data.len());
    for word in [
        MO_MAGIC,
        0, // revision
        nstrings,
        orig_tab_offset,
        trans_tab_offset,
        0, // hash table size
        strings_offset,
    ] {
        out.extend_from_slice(&word.to_le_bytes());
    }
    for (len, offset) in orig_descriptors.iter().chain(&trans_descriptors) {
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
    }
    out.extend_from_slice(&string_data);
    out
}
