//! Generator types, families and residency.

use std::fmt;
use std::str::FromStr;

use crate::error::RngError;

/// Closed enumeration of generator types.
///
/// Numeric values are ABI. The `*Default` variants are aliases resolved by
/// [`RngType::resolve`]; [`RngType::Test`] is parseable but never creatable.
///
/// # Examples
/// ```
/// use rng_core::RngType;
///
/// assert_eq!(RngType::PseudoDefault.resolve(), RngType::PseudoXorwow);
/// assert_eq!(RngType::QuasiDefault.resolve(), RngType::QuasiSobol32);
/// assert_eq!("philox4x32-10".parse::<RngType>().unwrap(), RngType::PseudoPhilox4x32_10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RngType {
    /// Test-only type
    Test = 0,
    /// Default pseudo-random generator (XORWOW)
    PseudoDefault = 400,
    /// XORWOW pseudo-random generator
    PseudoXorwow = 401,
    /// MRG32k3a pseudo-random generator
    PseudoMrg32k3a = 402,
    /// Mersenne Twister MTGP32 pseudo-random generator
    PseudoMtgp32 = 403,
    /// Mersenne Twister 19937
    PseudoMt19937 = 404,
    /// Philox 4x32 (10 rounds) pseudo-random generator
    PseudoPhilox4x32_10 = 405,
    /// Default quasi-random generator (Sobol32)
    QuasiDefault = 500,
    /// Sobol32 quasi-random generator
    QuasiSobol32 = 501,
    /// Scrambled Sobol32 quasi-random generator
    QuasiScrambledSobol32 = 502,
    /// Sobol64 quasi-random generator
    QuasiSobol64 = 503,
    /// Scrambled Sobol64 quasi-random generator
    QuasiScrambledSobol64 = 504,
}

/// Generator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RngFamily {
    /// Test-only family
    Test,
    /// Seeded, reproducible pseudo-random sequences
    Pseudo,
    /// Low-discrepancy sequences configured by offset and dimension
    Quasi,
}

impl RngType {
    /// Every type, in ascending code order.
    pub const ALL: [RngType; 12] = [
        RngType::Test,
        RngType::PseudoDefault,
        RngType::PseudoXorwow,
        RngType::PseudoMrg32k3a,
        RngType::PseudoMtgp32,
        RngType::PseudoMt19937,
        RngType::PseudoPhilox4x32_10,
        RngType::QuasiDefault,
        RngType::QuasiSobol32,
        RngType::QuasiScrambledSobol32,
        RngType::QuasiSobol64,
        RngType::QuasiScrambledSobol64,
    ];

    /// Returns the numeric ABI code.
    #[inline]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Looks up a type by ABI code.
    ///
    /// # Errors
    ///
    /// Returns [`RngError::TypeError`] for an unknown code.
    pub fn from_code(code: u32) -> Result<Self, RngError> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .ok_or_else(|| RngError::TypeError(format!("unknown generator type code {}", code)))
    }

    /// Resolves the default aliases to their concrete type.
    pub fn resolve(self) -> Self {
        match self {
            RngType::PseudoDefault => RngType::PseudoXorwow,
            RngType::QuasiDefault => RngType::QuasiSobol32,
            other => other,
        }
    }

    /// Returns the family of this type.
    pub fn family(self) -> RngFamily {
        match self.code() / 100 {
            4 => RngFamily::Pseudo,
            5 => RngFamily::Quasi,
            _ => RngFamily::Test,
        }
    }

    /// Returns `true` for pseudo-random types.
    #[inline]
    pub fn is_pseudo(self) -> bool {
        self.family() == RngFamily::Pseudo
    }

    /// Returns `true` for quasi-random types.
    #[inline]
    pub fn is_quasi(self) -> bool {
        self.family() == RngFamily::Quasi
    }

    /// Canonical lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            RngType::Test => "test",
            RngType::PseudoDefault => "pseudo-default",
            RngType::PseudoXorwow => "xorwow",
            RngType::PseudoMrg32k3a => "mrg32k3a",
            RngType::PseudoMtgp32 => "mtgp32",
            RngType::PseudoMt19937 => "mt19937",
            RngType::PseudoPhilox4x32_10 => "philox4x32-10",
            RngType::QuasiDefault => "quasi-default",
            RngType::QuasiSobol32 => "sobol32",
            RngType::QuasiScrambledSobol32 => "scrambled-sobol32",
            RngType::QuasiSobol64 => "sobol64",
            RngType::QuasiScrambledSobol64 => "scrambled-sobol64",
        }
    }
}

impl fmt::Display for RngType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RngType {
    type Err = RngError;

    /// Parses a canonical name (case-insensitive, `_` accepted for `-`) or a
    /// numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace('_', "-");
        if let Ok(code) = normalised.parse::<u32>() {
            return Self::from_code(code);
        }
        let bare = normalised
            .strip_prefix("pseudo-")
            .filter(|rest| *rest != "default")
            .or_else(|| {
                normalised
                    .strip_prefix("quasi-")
                    .filter(|rest| *rest != "default")
            })
            .unwrap_or(&normalised);

        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() == bare)
            .ok_or_else(|| RngError::TypeError(format!("unknown generator type '{}'", s)))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RngType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RngType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Where a generator runs its launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Residency {
    /// Data-parallel launches on the generator's execution stream
    #[default]
    Device,
    /// Sequential launches on the calling thread
    Host,
}

impl fmt::Display for Residency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Residency::Device => write!(f, "device"),
            Residency::Host => write!(f, "host"),
        }
    }
}

impl FromStr for Residency {
    type Err = RngError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "device" | "gpu" => Ok(Residency::Device),
            "host" | "cpu" => Ok(Residency::Host),
            _ => Err(RngError::OutOfRange(format!("unknown residency '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_codes_are_abi_stable() {
        assert_eq!(RngType::Test.code(), 0);
        assert_eq!(RngType::PseudoDefault.code(), 400);
        assert_eq!(RngType::PseudoPhilox4x32_10.code(), 405);
        assert_eq!(RngType::QuasiDefault.code(), 500);
        assert_eq!(RngType::QuasiScrambledSobol64.code(), 504);
    }

    #[test]
    fn test_family() {
        assert_eq!(RngType::Test.family(), RngFamily::Test);
        for t in &RngType::ALL[1..7] {
            assert!(t.is_pseudo(), "{} should be pseudo", t);
        }
        for t in &RngType::ALL[7..] {
            assert!(t.is_quasi(), "{} should be quasi", t);
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        for t in RngType::ALL {
            assert_eq!(t.resolve().resolve(), t.resolve());
            assert_eq!(t.resolve().family(), t.family());
        }
    }

    #[test]
    fn test_unknown_code_is_type_error() {
        let err = RngType::from_code(406).unwrap_err();
        assert!(matches!(err, RngError::TypeError(_)));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("XORWOW".parse::<RngType>().unwrap(), RngType::PseudoXorwow);
        assert_eq!(
            "pseudo_mrg32k3a".parse::<RngType>().unwrap(),
            RngType::PseudoMrg32k3a
        );
        assert_eq!(
            "quasi-scrambled-sobol64".parse::<RngType>().unwrap(),
            RngType::QuasiScrambledSobol64
        );
        assert_eq!(
            "pseudo-default".parse::<RngType>().unwrap(),
            RngType::PseudoDefault
        );
        assert_eq!("503".parse::<RngType>().unwrap(), RngType::QuasiSobol64);
        assert!("halton".parse::<RngType>().is_err());
    }

    #[test]
    fn test_names_round_trip() {
        for t in RngType::ALL {
            assert_eq!(t.name().parse::<RngType>().unwrap(), t);
        }
    }

    #[test]
    fn test_residency_parsing() {
        assert_eq!("host".parse::<Residency>().unwrap(), Residency::Host);
        assert_eq!("GPU".parse::<Residency>().unwrap(), Residency::Device);
        assert!("tpu".parse::<Residency>().is_err());
        assert_eq!(Residency::default(), Residency::Device);
    }

    proptest! {
        #[test]
        fn prop_from_code_accepts_only_known_codes(code in any::<u32>()) {
            match RngType::from_code(code) {
                Ok(t) => prop_assert_eq!(t.code(), code),
                Err(e) => prop_assert!(matches!(e, RngError::TypeError(_))),
            }
        }
    }
}
