//! Vertical level and statistical time range descriptors.
//!
//! Both are small tuples of coded integers where any component may be
//! unset. An unset component is a wildcard when the descriptor is used in
//! a query filter.

use std::fmt::Display;

/// A vertical level: two (type, value) pairs of coded integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Level {
    /// Type of the first part of the level.
    pub ltype1: Option<i32>,
    /// Value of the first part of the level.
    pub l1: Option<i32>,
    /// Type of the second part of the level, for layers.
    pub ltype2: Option<i32>,
    /// Value of the second part of the level, for layers.
    pub l2: Option<i32>,
}

impl Level {
    /// A level with every component set.
    pub fn new(ltype1: i32, l1: i32, ltype2: i32, l2: i32) -> Self {
        Level {
            ltype1: Some(ltype1),
            l1: Some(l1),
            ltype2: Some(ltype2),
            l2: Some(l2),
        }
    }

    /// True if no component is set.
    pub fn is_unset(&self) -> bool {
        self.ltype1.is_none() && self.l1.is_none() && self.ltype2.is_none() && self.l2.is_none()
    }

    pub(crate) fn components(&self) -> [Option<i32>; 4] {
        [self.ltype1, self.l1, self.ltype2, self.l2]
    }
}

impl From<(i32, i32, i32, i32)> for Level {
    fn from(t: (i32, i32, i32, i32)) -> Self {
        Level::new(t.0, t.1, t.2, t.3)
    }
}

impl From<(i32, i32)> for Level {
    fn from(t: (i32, i32)) -> Self {
        Level {
            ltype1: Some(t.0),
            l1: Some(t.1),
            ltype2: None,
            l2: None,
        }
    }
}

impl From<i32> for Level {
    fn from(ltype1: i32) -> Self {
        Level {
            ltype1: Some(ltype1),
            l1: None,
            ltype2: None,
            l2: None,
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "{},{},{},{}",
            fmt_component(self.ltype1),
            fmt_component(self.l1),
            fmt_component(self.ltype2),
            fmt_component(self.l2)
        )
    }
}

/// A statistical or forecast time range: (pind, p1, p2) coded integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Trange {
    /// Time range indicator.
    pub pind: Option<i32>,
    /// First time period in seconds.
    pub p1: Option<i32>,
    /// Second time period in seconds.
    pub p2: Option<i32>,
}

impl Trange {
    /// A time range with every component set.
    pub fn new(pind: i32, p1: i32, p2: i32) -> Self {
        Trange {
            pind: Some(pind),
            p1: Some(p1),
            p2: Some(p2),
        }
    }

    /// Instantaneous value, the common case for synop data.
    pub fn instant() -> Self {
        Trange::new(254, 0, 0)
    }

    /// True if no component is set.
    pub fn is_unset(&self) -> bool {
        self.pind.is_none() && self.p1.is_none() && self.p2.is_none()
    }

    pub(crate) fn components(&self) -> [Option<i32>; 3] {
        [self.pind, self.p1, self.p2]
    }
}

impl From<(i32, i32, i32)> for Trange {
    fn from(t: (i32, i32, i32)) -> Self {
        Trange::new(t.0, t.1, t.2)
    }
}

impl From<i32> for Trange {
    fn from(pind: i32) -> Self {
        Trange {
            pind: Some(pind),
            p1: None,
            p2: None,
        }
    }
}

impl Display for Trange {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "{},{},{}",
            fmt_component(self.pind),
            fmt_component(self.p1),
            fmt_component(self.p2)
        )
    }
}

fn fmt_component(val: Option<i32>) -> String {
    match val {
        Some(v) => v.to_string(),
        None => "-".to_owned(),
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_level_display() {
        assert_eq!(Level::new(10, 11, 15, 22).to_string(), "10,11,15,22");
        assert_eq!(Level::from((103, 2000)).to_string(), "103,2000,-,-");
        assert_eq!(Level::from(1).to_string(), "1,-,-,-");
        assert_eq!(Level::default().to_string(), "-,-,-,-");
    }

    #[test]
    fn test_trange_display() {
        assert_eq!(Trange::new(20, 111, 222).to_string(), "20,111,222");
        assert_eq!(Trange::from(0).to_string(), "0,-,-");
        assert_eq!(Trange::instant().to_string(), "254,0,0");
    }

    #[test]
    fn test_unset() {
        assert!(Level::default().is_unset());
        assert!(!Level::from(1).is_unset());
        assert!(Trange::default().is_unset());
        assert!(!Trange::instant().is_unset());
    }
}
