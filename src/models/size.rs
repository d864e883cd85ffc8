const UNITS: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

// Largest magnitude that still renders below "1024.0" in the next unit down.
const SCALE_THRESHOLD: u64 = 0x0fff_cccc_cccc_cccc;

/// Format a signed byte count using binary units with one decimal digit.
///
/// Values under 1024 in magnitude are printed as plain bytes. The sign is
/// preserved, and `i64::MIN` is handled without overflow.
pub fn human_readable_size(bytes: i64) -> String {
    let magnitude = bytes.unsigned_abs();
    if magnitude < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = magnitude;
    let mut unit = 0;
    let mut shift: i32 = 40;
    while shift >= 0 && magnitude > SCALE_THRESHOLD >> shift {
        value >>= 10;
        unit += 1;
        shift -= 10;
    }

    // Tenths of the unit, rounded half up.
    let tenths = (value * 10 + 512) / 1024;
    let sign = if bytes < 0 { "-" } else { "" };
    format!("{}{}.{} {}", sign, tenths / 10, tenths % 10, UNITS[unit])
}
