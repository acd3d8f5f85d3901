// arg_utils.rs — value parsers shared by the clap definitions.

/// Parses an unsigned size from the start of `s`, optionally followed by a
/// size suffix. Returns `None` if no leading digits are present or the value
/// overflows, or `Some((value, remainder))` where `remainder` is the part of
/// `s` that was not consumed.
///
/// Recognised suffixes (case-sensitive):
///   `K` / `KB` / `KiB`  → multiply by 1 024
///   `M` / `MB` / `MiB`  → multiply by 1 048 576
///   `G` / `GB` / `GiB`  → multiply by 1 073 741 824
pub fn read_size_from_str(s: &str) -> Option<(u64, &str)> {
    let bytes = s.as_bytes();
    let mut i = 0usize;

    // Require at least one digit.
    if i >= bytes.len() || !bytes[i].is_ascii_digit() {
        return None;
    }

    let mut result: u64 = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        result = result
            .checked_mul(10)?
            .checked_add((bytes[i] - b'0') as u64)?;
        i += 1;
    }

    if i < bytes.len() {
        let shift = match bytes[i] {
            b'K' => Some(10),
            b'M' => Some(20),
            b'G' => Some(30),
            _ => None,
        };
        if let Some(shift) = shift {
            if result.leading_zeros() < shift {
                return None;
            }
            result <<= shift;
            i += 1;
            if i < bytes.len() && bytes[i] == b'i' {
                i += 1;
            }
            if i < bytes.len() && bytes[i] == b'B' {
                i += 1;
            }
        }
    }

    Some((result, &s[i..]))
}

/// clap value parser for `--max-size`: a size with an optional suffix and
/// nothing after it.
pub fn parse_size(s: &str) -> Result<usize, String> {
    match read_size_from_str(s) {
        Some((value, "")) => {
            usize::try_from(value).map_err(|_| format!("size {} is too large", s))
        }
        Some((_, rest)) => Err(format!("unexpected trailing characters '{}'", rest)),
        None => Err(format!("'{}' is not a valid size", s)),
    }
}
