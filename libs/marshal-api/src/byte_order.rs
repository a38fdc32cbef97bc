use serde::{Deserialize, Serialize};

use crate::error::MarshalError;

/// Byte order applied to every multi-byte field: Int32 and Float64
/// payloads, length prefixes, counts and intern indices.
///
/// The wire format is meant for a process talking to itself across a
/// native boundary, so the default is the host's own order. `Reversed`
/// exists for verification: a codec configured with it must still
/// round-trip, while producing byte-swapped output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    #[default]
    #[serde(alias = "host")]
    Native,
    #[serde(alias = "swapped")]
    Reversed,
}

impl ByteOrder {
    /// The policy that yields little-endian output on this host.
    pub const fn little_endian() -> Self {
        if cfg!(target_endian = "little") { ByteOrder::Native } else { ByteOrder::Reversed }
    }

    /// The policy that yields big-endian output on this host.
    pub const fn big_endian() -> Self {
        if cfg!(target_endian = "big") { ByteOrder::Native } else { ByteOrder::Reversed }
    }

    pub const fn is_little_endian(self) -> bool {
        match self {
            ByteOrder::Native => cfg!(target_endian = "little"),
            ByteOrder::Reversed => cfg!(target_endian = "big"),
        }
    }

    pub const fn reversed(self) -> Self {
        match self {
            ByteOrder::Native => ByteOrder::Reversed,
            ByteOrder::Reversed => ByteOrder::Native,
        }
    }

    pub fn u32_to_bytes(self, n: u32) -> [u8; 4] {
        match self {
            ByteOrder::Native => n.to_ne_bytes(),
            ByteOrder::Reversed => n.swap_bytes().to_ne_bytes(),
        }
    }

    pub fn u32_from_bytes(self, bytes: [u8; 4]) -> u32 {
        let n = u32::from_ne_bytes(bytes);
        match self {
            ByteOrder::Native => n,
            ByteOrder::Reversed => n.swap_bytes(),
        }
    }

    pub fn u64_to_bytes(self, n: u64) -> [u8; 8] {
        match self {
            ByteOrder::Native => n.to_ne_bytes(),
            ByteOrder::Reversed => n.swap_bytes().to_ne_bytes(),
        }
    }

    pub fn u64_from_bytes(self, bytes: [u8; 8]) -> u64 {
        let n = u64::from_ne_bytes(bytes);
        match self {
            ByteOrder::Native => n,
            ByteOrder::Reversed => n.swap_bytes(),
        }
    }

    pub fn i32_to_bytes(self, n: i32) -> [u8; 4] {
        self.u32_to_bytes(n as u32)
    }

    pub fn i32_from_bytes(self, bytes: [u8; 4]) -> i32 {
        self.u32_from_bytes(bytes) as i32
    }

    pub fn f64_to_bytes(self, n: f64) -> [u8; 8] {
        self.u64_to_bytes(n.to_bits())
    }

    pub fn f64_from_bytes(self, bytes: [u8; 8]) -> f64 {
        f64::from_bits(self.u64_from_bytes(bytes))
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ByteOrder::Native => f.write_str("native"),
            ByteOrder::Reversed => f.write_str("reversed"),
        }
    }
}

impl std::str::FromStr for ByteOrder {
    type Err = MarshalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" | "host" => Ok(ByteOrder::Native),
            "reversed" | "swapped" => Ok(ByteOrder::Reversed),
            other => Err(MarshalError::UnsupportedValue(format!(
                "byte order must be \"native\" or \"reversed\", got {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_policy_writes_low_byte_first() {
        let order = ByteOrder::little_endian();
        assert!(order.is_little_endian());
        assert_eq!(order.i32_to_bytes(0x01020304), [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(order.reversed().i32_to_bytes(0x01020304), [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn float_bytes_follow_policy() {
        let le = ByteOrder::little_endian();
        assert_eq!(le.f64_to_bytes(1.23), [0xae, 0x47, 0xe1, 0x7a, 0x14, 0xae, 0xf3, 0x3f]);
        assert_eq!(
            ByteOrder::big_endian().f64_to_bytes(1.23),
            [0x3f, 0xf3, 0xae, 0x14, 0x7a, 0xe1, 0x47, 0xae]
        );
        assert_eq!(le.f64_from_bytes(le.f64_to_bytes(-625e-4)), -625e-4);
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("native".parse::<ByteOrder>().unwrap(), ByteOrder::Native);
        assert_eq!("swapped".parse::<ByteOrder>().unwrap(), ByteOrder::Reversed);
        assert!("middle".parse::<ByteOrder>().is_err());
        assert_eq!(ByteOrder::Reversed.to_string(), "reversed");
    }
}
