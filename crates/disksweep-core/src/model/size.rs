/// Size formatting utilities: human-readable byte counts for reports and
/// the command line.
///
/// All internal sizes are `u64` bytes. Floating point is only used at the
/// display-formatting boundary.

const KIB: u64 = 1 << 10;
const MIB: u64 = 1 << 20;
const GIB: u64 = 1 << 30;
const TIB: u64 = 1 << 40;

/// Format a byte count into a human-readable string with an appropriate unit.
///
/// Steps are 1024 but labelled KB, MB, GB, TB, the short forms users expect
/// in a cleanup tool.
pub fn format_size(bytes: u64) -> String {
    let scaled = |unit: u64| bytes as f64 / unit as f64;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", scaled(KIB))
    } else if bytes < GIB {
        format!("{:.1} MB", scaled(MIB))
    } else if bytes < TIB {
        format!("{:.2} GB", scaled(GIB))
    } else {
        format!("{:.2} TB", scaled(TIB))
    }
}

/// Format a file count with thousand separators.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_below_one_kb() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(600), "600 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn each_unit_step() {
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_048_576), "1.0 MB");
        assert_eq!(format_size(1_073_741_824), "1.00 GB");
        assert_eq!(format_size(1_099_511_627_776), "1.00 TB");
    }

    #[test]
    fn petabytes_stay_in_terabytes() {
        assert_eq!(format_size(1_125_899_906_842_624), "1024.00 TB");
    }

    #[test]
    fn counts_get_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
