use std::fmt;
use std::str::FromStr;

use crate::hd::keychain::{HARDENED_BIT, MAX_INDEX};
use crate::PrimitivesError;

/// One derivation step: a raw index in `0..=0x7fffffff` and a hardened flag.
///
/// The flag is folded into the index's high bit only on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildNumber {
    index: u32,
    hardened: bool,
}

impl ChildNumber {
    pub fn new(index: u32, hardened: bool) -> Result<Self, PrimitivesError> {
        if index > MAX_INDEX {
            return Err(PrimitivesError::InvalidChildIndex(index));
        }
        Ok(ChildNumber { index, hardened })
    }

    pub fn normal(index: u32) -> Result<Self, PrimitivesError> {
        Self::new(index, false)
    }

    pub fn hardened(index: u32) -> Result<Self, PrimitivesError> {
        Self::new(index, true)
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// 32-bit wire form with the hardened flag in the high bit.
    pub fn to_wire(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_BIT
        } else {
            self.index
        }
    }

    pub fn from_wire(raw: u32) -> Self {
        ChildNumber { index: raw & MAX_INDEX, hardened: raw & HARDENED_BIT != 0 }
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.index, if self.hardened { "'" } else { "" })
    }
}

/// A path such as `m/44'/0'/0'/0/7`.
///
/// Parsing accepts `'`, `h` or `H` as the hardened marker and ignores empty
/// segments, so `""`, `"m"`, `"/"` and `"m//"` all name the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, child: ChildNumber) -> Self {
        let mut steps = self.0.clone();
        steps.push(child);
        DerivationPath(steps)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChildNumber> {
        self.0.iter()
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(steps: Vec<ChildNumber>) -> Self {
        DerivationPath(steps)
    }
}

impl FromStr for DerivationPath {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PrimitivesError::InvalidPath(s.to_string());
        let mut steps = Vec::new();
        for (i, segment) in s.split('/').enumerate() {
            if segment.is_empty() || (i == 0 && segment == "m") {
                continue;
            }
            let (digits, hardened) = match segment.strip_suffix(&['\'', 'h', 'H'][..]) {
                Some(digits) => (digits, true),
                None => (segment, false),
            };
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let index: u32 = digits.parse().map_err(|_| invalid())?;
            steps.push(ChildNumber::new(index, hardened).map_err(|_| invalid())?);
        }
        Ok(DerivationPath(steps))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for step in &self.0 {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_spellings() {
        for s in ["", "m", "/", "m/", "m//"] {
            assert!(s.parse::<DerivationPath>().unwrap().is_root(), "{s:?}");
        }
    }

    #[test]
    fn test_parse_and_display() {
        let path: DerivationPath = "m/0'/1/2h/2/1000000000".parse().unwrap();
        let steps: Vec<_> = path.iter().map(|c| (c.index(), c.is_hardened())).collect();
        assert_eq!(steps, vec![(0, true), (1, false), (2, true), (2, false), (1_000_000_000, false)]);
        assert_eq!(path.to_string(), "m/0'/1/2'/2/1000000000");
        assert_eq!("0H/5".parse::<DerivationPath>().unwrap().to_string(), "m/0'/5");
    }

    #[test]
    fn test_rejects_garbage() {
        for s in [" m/0", "m/ 0", "m/0x1", "m/-1", "m/'", "m/1''", "x/0", "m/0/m", "m/2147483648"] {
            assert!(
                matches!(s.parse::<DerivationPath>(), Err(PrimitivesError::InvalidPath(_))),
                "{s:?}"
            );
        }
    }

    #[test]
    fn test_child_number_wire() {
        let c = ChildNumber::hardened(0x7fff_ffff).unwrap();
        assert_eq!(c.to_wire(), 0xffff_ffff);
        assert_eq!(ChildNumber::from_wire(0xffff_ffff), c);
        assert_eq!(ChildNumber::from_wire(5), ChildNumber::normal(5).unwrap());
        assert!(matches!(ChildNumber::normal(HARDENED_BIT), Err(PrimitivesError::InvalidChildIndex(_))));
    }
}
