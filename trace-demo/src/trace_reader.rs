//! Trace ingestion: turns a file of hexadecimal memory addresses, one per
//! line, into the page-number sequence the simulator consumes. Address to
//! page is a plain division by the page size; the simulator itself never
//! sees addresses.

use std::fs;
use std::io;
use std::path::Path;

/// Parses one address line. Accepts an optional `0x` prefix and odd-length
/// digit strings (left-padded before decoding).
fn parse_address(line: &str) -> io::Result<usize> {
    let digits = line
        .strip_prefix("0x")
        .or_else(|| line.strip_prefix("0X"))
        .unwrap_or(line);

    let padded;
    let digits = if digits.len() % 2 == 1 {
        padded = format!("0{}", digits);
        &padded
    } else {
        digits
    };

    let bytes = hex::decode(digits)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("bad address {:?}: {}", line, e)))?;

    if bytes.len() > std::mem::size_of::<usize>() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("address {:?} does not fit in usize", line),
        ));
    }

    Ok(bytes.iter().fold(0usize, |addr, &b| (addr << 8) | b as usize))
}

/// Reads a trace file and derives the page-number sequence.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn read_trace<P: AsRef<Path>>(path: P, page_size: usize) -> io::Result<Vec<usize>> {
    let contents = fs::read_to_string(path)?;
    let mut pages = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        pages.push(parse_address(line)? / page_size);
    }
    Ok(pages)
}
