//! Report types, also called networks.
//!
//! Every observation belongs to a network identified by a mnemonic such as
//! "synop" and a numeric code. The store seeds a default table on creation
//! and grows it as new mnemonics are first used.

/// How an observation names its network.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// By numeric code; the code must already exist in the store.
    Code(u32),
    /// By mnemonic; unknown mnemonics are added to the store on first use.
    Memo(String),
}

impl Report {
    /// Convenience constructor for the mnemonic form.
    pub fn memo(memo: &str) -> Self {
        Report::Memo(memo.to_owned())
    }
}

impl From<u32> for Report {
    fn from(code: u32) -> Self {
        Report::Code(code)
    }
}

impl From<&str> for Report {
    fn from(memo: &str) -> Self {
        Report::memo(memo)
    }
}

/// One entry of the report table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportInfo {
    /// Numeric code of the network.
    pub rep_cod: u32,
    /// Mnemonic of the network.
    pub rep_memo: String,
    /// Priority used to rank networks; larger wins.
    pub prio: i64,
}
