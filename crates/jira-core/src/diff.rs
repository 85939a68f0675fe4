// crates/jira-core/src/diff.rs - Change detection between two files
//
// Used after the editor exits to decide whether the user touched the
// document at all. Files of different size are different without reading
// them; otherwise both are read in fixed-size chunks and the first mismatch
// wins.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Comparison chunk size in bytes
pub const CHUNK_SIZE: usize = 1024;

/// Returns `true` when the two files differ in size or in any byte
pub fn files_differ(original: &Path, edited: &Path) -> io::Result<bool> {
    let mut old = File::open(original)?;
    let mut new = File::open(edited)?;

    if old.metadata()?.len() != new.metadata()?.len() {
        return Ok(true);
    }

    readers_differ(&mut old, &mut new)
}

/// Chunked comparison of two readers until both reach end of input
pub fn readers_differ<A: Read, B: Read>(old: &mut A, new: &mut B) -> io::Result<bool> {
    let mut old_buf = [0u8; CHUNK_SIZE];
    let mut new_buf = [0u8; CHUNK_SIZE];

    loop {
        let old_count = read_chunk(old, &mut old_buf)?;
        let new_count = read_chunk(new, &mut new_buf)?;

        if old_count != new_count || old_buf[..old_count] != new_buf[..new_count] {
            return Ok(true);
        }
        if old_count == 0 {
            return Ok(false);
        }
    }
}

/// Fill `buf` as far as the reader allows; a short count means end of input
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
