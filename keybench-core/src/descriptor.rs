//! Algorithm descriptors — the static catalog of benchmarkable
//! RSA and ECC parameter sets.
//!
//! Descriptors are immutable and defined at startup; runs refer to them
//! by id. Security strength ratings follow the NIST SP 800-57 equivalence
//! table (RSA-2048 ≈ 112 bits, P-256 ≈ 128 bits, and so on).

use serde::Serialize;

/// NIST prime curves supported by the ECC descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Curve {
    P256,
    P384,
    P521,
}

impl std::fmt::Display for Curve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Curve::P256 => write!(f, "P-256"),
            Curve::P384 => write!(f, "P-384"),
            Curve::P521 => write!(f, "P-521"),
        }
    }
}

/// Algorithm family and its family-specific parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum Algorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256 over the given modulus length.
    Rsa { modulus_bits: u32 },
    /// ECDSA with SHA-256 over the given named curve.
    Ecc { curve: Curve },
}

impl Algorithm {
    /// The family name without parameters, for display.
    pub fn family_name(&self) -> &'static str {
        match self {
            Algorithm::Rsa { .. } => "RSA",
            Algorithm::Ecc { .. } => "ECC",
        }
    }
}

/// One benchmarkable algorithm configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlgorithmDescriptor {
    /// Unique id used for lookup (e.g. `rsa2048`, `p256`).
    pub id: &'static str,
    /// Human-readable label (e.g. `RSA-2048`, `ECC P-256`).
    pub label: &'static str,
    pub algorithm: Algorithm,
    /// NIST security strength equivalent, in bits.
    pub security_bits: u32,
}

impl std::fmt::Display for AlgorithmDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// The built-in descriptor catalog.
pub const CATALOG: &[AlgorithmDescriptor] = &[
    AlgorithmDescriptor {
        id: "rsa2048",
        label: "RSA-2048",
        algorithm: Algorithm::Rsa { modulus_bits: 2048 },
        security_bits: 112,
    },
    AlgorithmDescriptor {
        id: "rsa3072",
        label: "RSA-3072",
        algorithm: Algorithm::Rsa { modulus_bits: 3072 },
        security_bits: 128,
    },
    AlgorithmDescriptor {
        id: "rsa4096",
        label: "RSA-4096",
        algorithm: Algorithm::Rsa { modulus_bits: 4096 },
        security_bits: 152,
    },
    AlgorithmDescriptor {
        id: "p256",
        label: "ECC P-256",
        algorithm: Algorithm::Ecc { curve: Curve::P256 },
        security_bits: 128,
    },
    AlgorithmDescriptor {
        id: "p384",
        label: "ECC P-384",
        algorithm: Algorithm::Ecc { curve: Curve::P384 },
        security_bits: 192,
    },
    AlgorithmDescriptor {
        id: "p521",
        label: "ECC P-521",
        algorithm: Algorithm::Ecc { curve: Curve::P521 },
        security_bits: 256,
    },
];

/// Look up a descriptor by id.
///
/// Lookup is forgiving about case and separators, so `RSA-2048`,
/// `rsa_2048`, and `rsa2048` all resolve to the same descriptor.
pub fn find(id: &str) -> Option<AlgorithmDescriptor> {
    let normalized: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    CATALOG.iter().find(|d| d.id == normalized).copied()
}
