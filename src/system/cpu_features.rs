//! Runtime CPU feature detection
//!
//! Detects the SIMD capabilities the validator and bulk byte operations
//! dispatch on. Detection runs once and is cached in a process-wide global;
//! all hot paths read the cached struct.

use std::sync::OnceLock;

/// CPU features relevant to this crate's SIMD dispatch
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuFeatures {
    /// AVX2: 32-byte integer SIMD (x86_64)
    pub has_avx2: bool,
    /// SSE4.2: string-compare instructions (x86_64)
    pub has_sse42: bool,
    /// SSSE3: byte shuffle, required for table-lookup validation (x86_64)
    pub has_ssse3: bool,
    /// ARM NEON: 16-byte SIMD (aarch64)
    pub has_neon: bool,
}

impl CpuFeatures {
    /// Detect features on the running CPU
    fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Self {
                has_avx2: std::arch::is_x86_feature_detected!("avx2"),
                has_sse42: std::arch::is_x86_feature_detected!("sse4.2"),
                has_ssse3: std::arch::is_x86_feature_detected!("ssse3"),
                has_neon: false,
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            Self {
                has_avx2: false,
                has_sse42: false,
                has_ssse3: false,
                has_neon: std::arch::is_aarch64_feature_detected!("neon"),
            }
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self::default()
        }
    }

    /// True if any vector acceleration is available
    pub fn has_simd(&self) -> bool {
        self.has_avx2 || self.has_ssse3 || self.has_neon
    }
}

static CPU_FEATURES: OnceLock<CpuFeatures> = OnceLock::new();

/// Get the cached CPU feature set for the running processor
pub fn get_cpu_features() -> &'static CpuFeatures {
    CPU_FEATURES.get_or_init(|| {
        let features = CpuFeatures::detect();
        log::debug!(
            "cpu features: avx2={} sse4.2={} ssse3={} neon={}",
            features.has_avx2,
            features.has_sse42,
            features.has_ssse3,
            features.has_neon
        );
        features
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_is_cached() {
        let a = get_cpu_features();
        let b = get_cpu_features();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_feature_implications() {
        let features = get_cpu_features();
        // AVX2 implies the older x86 extensions are present too.
        if features.has_avx2 {
            assert!(features.has_ssse3);
        }
        #[cfg(target_arch = "aarch64")]
        assert!(features.has_neon);
    }
}
