//! Typed meteorological variables and their codes.

use std::{fmt::Display, str::FromStr};

use crate::{errors::MetobsDataErr, vartable, vartable::VarKind};

/// New type wrapper for a WMO table B variable code.
///
/// Codes have the fixed format `Bxxyyy`, e.g. `B12101` for dry bulb
/// temperature. Internally the x and y parts are packed into 16 bits the
/// same way BUFR descriptors are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Varcode {
    code: u16,
}

impl Varcode {
    /// Create a code directly from its x (category) and y (number) parts.
    pub const fn new(x: u8, y: u8) -> Self {
        Varcode {
            code: ((x as u16) << 8) | y as u16,
        }
    }

    /// The BUFR category part, 0..=63.
    pub fn x(self) -> u8 {
        ((self.code >> 8) & 0x3f) as u8
    }

    /// The number within the category, 0..=255.
    pub fn y(self) -> u8 {
        (self.code & 0xff) as u8
    }
}

impl From<Varcode> for u32 {
    fn from(val: Varcode) -> u32 {
        u32::from(val.code)
    }
}

impl From<u16> for Varcode {
    fn from(code: u16) -> Self {
        Varcode { code }
    }
}

impl FromStr for Varcode {
    type Err = MetobsDataErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MetobsDataErr::InvalidVarcode(s.to_owned());

        if s.len() != 6 || !s.is_ascii() || !s.starts_with('B') {
            return Err(invalid());
        }

        let x: u8 = s[1..3].parse().map_err(|_| invalid())?;
        let y: u8 = s[3..6].parse().map_err(|_| invalid())?;

        if x > 63 {
            return Err(invalid());
        }

        Ok(Varcode::new(x, y))
    }
}

impl Display for Varcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "B{:02}{:03}", self.x(), self.y())
    }
}

/// The value of a variable or of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    /// An integer value.
    Integer(i64),
    /// A decimal value.
    Decimal(f64),
    /// A character string value.
    Text(String),
}

impl VarValue {
    /// Parse a value back from its canonical string representation.
    ///
    /// The declared kind of the owning code decides between text and
    /// numeric; for numeric values the presence of a decimal point decides
    /// between integer and decimal so that values round trip unchanged.
    pub(crate) fn parse(kind: VarKind, raw: &str) -> Result<Self, MetobsDataErr> {
        match kind {
            VarKind::Text => Ok(VarValue::Text(raw.to_owned())),
            VarKind::Integer | VarKind::Decimal => {
                if raw.contains('.') {
                    raw.parse()
                        .map(VarValue::Decimal)
                        .map_err(|_| MetobsDataErr::InvalidValue("unparseable decimal in index"))
                } else {
                    raw.parse()
                        .map(VarValue::Integer)
                        .map_err(|_| MetobsDataErr::InvalidValue("unparseable integer in index"))
                }
            }
        }
    }
}

impl Display for VarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self {
            VarValue::Integer(v) => write!(f, "{}", v),
            VarValue::Decimal(v) => write!(f, "{}", v),
            VarValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for VarValue {
    fn from(v: i64) -> Self {
        VarValue::Integer(v)
    }
}

impl From<i32> for VarValue {
    fn from(v: i32) -> Self {
        VarValue::Integer(i64::from(v))
    }
}

impl From<f64> for VarValue {
    fn from(v: f64) -> Self {
        VarValue::Decimal(v)
    }
}

impl From<&str> for VarValue {
    fn from(v: &str) -> Self {
        VarValue::Text(v.to_owned())
    }
}

impl From<String> for VarValue {
    fn from(v: String) -> Self {
        VarValue::Text(v)
    }
}

/// A variable: a code, its value, and any attributes attached inline.
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    /// The table B code of this variable.
    pub code: Varcode,
    /// The value.
    pub value: VarValue,
    /// Attributes to store with the value, e.g. confidence codes.
    pub attrs: Vec<Var>,
}

impl Var {
    /// Create a variable, checking the value against the declared kind of
    /// the code in the local table B.
    pub fn new(code: Varcode, value: impl Into<VarValue>) -> Result<Self, MetobsDataErr> {
        let value = value.into();
        let info = vartable::varinfo(code)?;

        match (info.kind, &value) {
            (VarKind::Integer, VarValue::Integer(_)) => {}
            (VarKind::Decimal, VarValue::Integer(_)) => {}
            (VarKind::Decimal, VarValue::Decimal(_)) => {}
            (VarKind::Text, VarValue::Text(_)) => {}
            (VarKind::Integer, _) => {
                return Err(MetobsDataErr::InvalidValue("code requires an integer"))
            }
            (VarKind::Decimal, _) => {
                return Err(MetobsDataErr::InvalidValue("code requires a number"))
            }
            (VarKind::Text, _) => {
                return Err(MetobsDataErr::InvalidValue("code requires a string"))
            }
        }

        Ok(Var {
            code,
            value,
            attrs: vec![],
        })
    }

    /// Create a variable from the textual form of its code.
    pub fn parse(code: &str, value: impl Into<VarValue>) -> Result<Self, MetobsDataErr> {
        Var::new(Varcode::from_str(code)?, value)
    }

    /// Attach an attribute, builder style.
    pub fn with_attr(mut self, attr: Var) -> Self {
        self.attrs.push(attr);
        self
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_varcode_round_trip() {
        for code in &["B01011", "B01012", "B12101", "B33007", "B63255"] {
            let parsed = Varcode::from_str(code).expect("Failed to parse code.");
            assert_eq!(&parsed.to_string(), code);
        }
    }

    #[test]
    fn test_varcode_rejects_garbage() {
        for code in &["B1011", "C01011", "B9901a", "01011", "B64001", ""] {
            assert!(Varcode::from_str(code).is_err(), "accepted {}", code);
        }
    }

    #[test]
    fn test_varcode_parts() {
        let code = Varcode::from_str("B12101").unwrap();
        assert_eq!(code.x(), 12);
        assert_eq!(code.y(), 101);
    }

    #[test]
    fn test_var_kind_checking() {
        assert!(Var::parse("B01011", "Hey Hey!!").is_ok());
        assert!(Var::parse("B01012", 500).is_ok());
        assert!(Var::parse("B12101", 270.96).is_ok());

        // Integer where a string is required and vice versa.
        assert!(Var::parse("B01011", 500).is_err());
        assert!(Var::parse("B01012", "north").is_err());
        assert!(Var::parse("B12101", "cold").is_err());

        // Integers are acceptable for decimal codes.
        assert!(Var::parse("B10004", 73810).is_ok());
    }

    #[test]
    fn test_value_round_trip_keeps_type() {
        let int_val = VarValue::Integer(73810);
        let parsed = VarValue::parse(VarKind::Decimal, &int_val.to_string()).unwrap();
        assert_eq!(parsed, int_val);

        let dec_val = VarValue::Decimal(270.96);
        let parsed = VarValue::parse(VarKind::Decimal, &dec_val.to_string()).unwrap();
        assert_eq!(parsed, dec_val);
    }
}
