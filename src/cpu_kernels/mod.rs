//! # CPU tiers
//!
//! Runtime view of the three SIMD capability levels plus the per-tier
//! wrapper tables.
//!
//! | Tier | Marker | Register | Module |
//! |---|---|---|---|
//! | `CpuTier::Sse2` | `Sse2` | 128-bit | `cpu_kernels::sse2` |
//! | `CpuTier::Avx2` | `Avx2` | 256-bit | `cpu_kernels::avx2` |
//! | `CpuTier::Avx512bw` | `Avx512bw` | 512-bit | `cpu_kernels::avx512` (feature `avx512`) |
//!
//! Detection never dispatches anything: the GEMM driver asks
//! `select_cpu_tier()` once and then instantiates the kernels for the
//! matching marker type.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{KernelError, KernelResult};

#[cfg(target_arch = "x86_64")]
pub mod sse2;

#[cfg(target_arch = "x86_64")]
pub mod avx2;

#[cfg(all(target_arch = "x86_64", feature = "avx512"))]
pub mod avx512;


/// Environment variable capping the tier reported by `select_cpu_tier`.
pub const CPU_TIER_ENV: &str = "QGEMM_CPUID";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CpuTier {
    /// 128-bit baseline.
    Sse2,
    /// 256-bit.
    Avx2,
    /// 512-bit with byte/word and dword/qword extensions.
    Avx512bw,
}

impl CpuTier {
    /// All tiers, smallest first.
    pub const ALL: [CpuTier; 3] = [CpuTier::Sse2, CpuTier::Avx2, CpuTier::Avx512bw];

    pub fn name(self) -> &'static str {
        match self {
            CpuTier::Sse2 => "sse2",
            CpuTier::Avx2 => "avx2",
            CpuTier::Avx512bw => "avx512bw",
        }
    }

    pub fn register_bits(self) -> usize {
        match self {
            CpuTier::Sse2 => 128,
            CpuTier::Avx2 => 256,
            CpuTier::Avx512bw => 512,
        }
    }

    /// Whether this build can run the tier on the current CPU.
    pub fn is_supported(self) -> bool {
        hardware_supports(self)
    }
}

impl fmt::Display for CpuTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CpuTier {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("sse2") {
            Ok(CpuTier::Sse2)
        } else if value.eq_ignore_ascii_case("avx2") {
            Ok(CpuTier::Avx2)
        } else if value.eq_ignore_ascii_case("avx512bw") || value.eq_ignore_ascii_case("avx512") {
            Ok(CpuTier::Avx512bw)
        } else {
            Err(KernelError::InvalidTierOverride(value.to_string()))
        }
    }
}

#[cfg(target_arch = "x86_64")]
fn hardware_supports(tier: CpuTier) -> bool {
    match tier {
        CpuTier::Sse2 => is_x86_feature_detected!("sse2"),
        CpuTier::Avx2 => is_x86_feature_detected!("avx2"),
        CpuTier::Avx512bw => {
            cfg!(feature = "avx512")
                && is_x86_feature_detected!("avx512f")
                && is_x86_feature_detected!("avx512bw")
                && is_x86_feature_detected!("avx512dq")
        }
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn hardware_supports(_tier: CpuTier) -> bool {
    false
}

static CPU_TIER: OnceLock<Option<CpuTier>> = OnceLock::new();

/// Best tier the hardware (and this build) supports, detected once.
pub fn get_cpu_tier() -> Option<CpuTier> {
    *CPU_TIER.get_or_init(|| {
        let detected = CpuTier::ALL.into_iter().rev().find(|tier| tier.is_supported());
        match detected {
            Some(tier) => log::info!("Detected SIMD tier: {} ({}-bit)", tier, tier.register_bits()),
            None => log::warn!("No supported SIMD tier detected"),
        }
        detected
    })
}

/// Tier the driver should instantiate, honoring `QGEMM_CPUID`.
///
/// The variable can only lower the tier; asking for more than the hardware
/// offers is an error rather than a silent fallback.
pub fn select_cpu_tier() -> KernelResult<CpuTier> {
    let requested = match env::var(CPU_TIER_ENV) {
        Ok(value) if !value.trim().is_empty() => Some(value.parse::<CpuTier>()?),
        _ => None,
    };
    apply_override(get_cpu_tier(), requested)
}

pub(crate) fn apply_override(
    detected: Option<CpuTier>,
    requested: Option<CpuTier>,
) -> KernelResult<CpuTier> {
    let detected = detected.ok_or(KernelError::NoSupportedTier)?;
    match requested {
        Some(tier) if tier > detected => {
            log::warn!("{}={} exceeds the detected {} tier", CPU_TIER_ENV, tier, detected);
            Err(KernelError::UnsupportedTier(tier))
        }
        Some(tier) if tier < detected => {
            log::warn!("{} caps the SIMD tier at {} (hardware: {})", CPU_TIER_ENV, tier, detected);
            Ok(tier)
        }
        _ => Ok(detected),
    }
}
