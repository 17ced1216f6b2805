// Helper method to format bytes in human-readable form
pub fn bytes2hr(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Relative error of an estimate, as a percentage of the true count.
pub fn relative_error_pct(estimate: f64, actual: usize) -> f64 {
    if actual == 0 {
        return if estimate == 0.0 { 0.0 } else { f64::INFINITY };
    }
    (estimate - actual as f64).abs() / actual as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes2hr() {
        assert_eq!(bytes2hr(512), "512 bytes");
        assert_eq!(bytes2hr(4096), "4.00 KB");
        assert_eq!(bytes2hr(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_relative_error_pct() {
        assert!((relative_error_pct(110.0, 100) - 10.0).abs() < 1e-9);
        assert_eq!(relative_error_pct(0.0, 0), 0.0);
    }
}
