//! Cardinality estimate from an exported register array.
//!
//! Kept apart from sketch maintenance: registers are the exported contract,
//! and a consumer may merge arrays from several processes (element-wise max)
//! before estimating.

/// Bias-correction constant for `m` registers.
pub fn alpha(m: usize) -> f64 {
    match m {
        0..=16 => 0.673,
        17..=32 => 0.697,
        33..=64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / m as f64),
    }
}

/// Linear counting while any register is zero, harmonic-mean estimate
/// otherwise. Registers are used as they are.
pub fn raw_estimate(registers: &[u8]) -> f64 {
    harmonic_estimate(registers, 0)
}

/// Estimate for registers produced by this crate's projection.
///
/// Every non-zero register carries a rank of at least `log_size`, i.e. an
/// offset of `log_size - 1` above the first-one-bit position the harmonic
/// mean expects. The offset is removed before summing; linear counting only
/// looks at zero registers and is unaffected.
pub fn estimate(registers: &[u8], log_size: u32) -> f64 {
    harmonic_estimate(registers, log_size.saturating_sub(1))
}

fn harmonic_estimate(registers: &[u8], rank_offset: u32) -> f64 {
    let m = registers.len();
    if m == 0 {
        return 0.0;
    }
    let m_f = m as f64;

    let zeros = registers.iter().filter(|&&r| r == 0).count();
    if zeros > 0 {
        return m_f * (m_f / zeros as f64).ln();
    }

    let sum: f64 = registers
        .iter()
        .map(|&r| {
            let rank = u32::from(r).saturating_sub(rank_offset);
            2f64.powi(-(rank as i32))
        })
        .sum();

    alpha(m) * m_f * m_f / sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_thresholds() {
        assert_eq!(alpha(16), 0.673);
        assert_eq!(alpha(32), 0.697);
        assert_eq!(alpha(64), 0.709);
        let a = alpha(4096);
        assert!((a - 0.7213 / (1.0 + 1.079 / 4096.0)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_registers_estimate_zero() {
        assert_eq!(raw_estimate(&[]), 0.0);
        assert_eq!(raw_estimate(&[0u8; 64]), 0.0);
    }

    #[test]
    fn test_linear_counting_single_register() {
        let mut registers = vec![0u8; 4096];
        registers[17] = 12;
        let e = raw_estimate(&registers);
        assert!((e - 4096.0 * (4096.0f64 / 4095.0).ln()).abs() < 1e-9);
        assert!(e > 0.9 && e < 1.1);
        // Linear counting ignores register values.
        assert_eq!(estimate(&registers, 12), e);
    }

    #[test]
    fn test_harmonic_regime_formula() {
        let registers = vec![1u8; 16];
        // sum = 16 * 0.5, estimate = 0.673 * 256 / 8
        let e = raw_estimate(&registers);
        assert!((e - 0.673 * 256.0 / 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset_removed_in_harmonic_regime() {
        // rank 4 under log_size 4 is first-one-bit position 1
        let shifted = vec![4u8; 16];
        let plain = vec![1u8; 16];
        assert_eq!(estimate(&shifted, 4), raw_estimate(&plain));
    }
}
