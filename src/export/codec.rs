//! Self-contained BUFR and CREX message writers.
//!
//! These implement the framing of the two WMO exchange formats around a
//! simplified body encoding. They stand behind [`MsgEncoder`] so a real
//! table-driven codec can be swapped in without touching the export path.

use std::io::Write;

use chrono::{Datelike, Timelike};

use super::{data_category, MsgEncoder, ObsMsg};

use crate::{
    errors::MetobsDataErr,
    vars::{Var, VarValue},
};

/// BUFR edition emitted by [`BufrEncoder`].
pub const BUFR_EDITION: u8 = 4;

/// CREX table and edition identifier emitted by [`CrexEncoder`].
pub const CREX_TABLE: &str = "T000409";

// Components of unset levels and time ranges in the binary body.
const MISSING_COMPONENT: i32 = i32::min_value();

/// Writes BUFR (FM 94) messages.
#[derive(Debug, Clone, Copy)]
pub struct BufrEncoder {
    /// Use the generic data category instead of deriving one from the
    /// network.
    pub generic: bool,
}

impl MsgEncoder for BufrEncoder {
    fn encode(&self, msg: &ObsMsg, dest: &mut dyn Write) -> Result<(), MetobsDataErr> {
        let section1 = self.section1(msg);
        let section3 = section3(msg);
        let section4 = section4(msg)?;

        // Indicator section: "BUFR", 24-bit total length, edition.
        let total = 8 + section1.len() + section3.len() + section4.len() + 4;
        if total > 0xff_ffff {
            return Err(MetobsDataErr::Encoding(
                "message too large for 24-bit BUFR length".to_owned(),
            ));
        }

        let mut buf = Vec::with_capacity(total);
        buf.extend_from_slice(b"BUFR");
        push_u24(&mut buf, total as u32);
        buf.push(BUFR_EDITION);

        buf.extend_from_slice(&section1);
        buf.extend_from_slice(&section3);
        buf.extend_from_slice(&section4);
        buf.extend_from_slice(b"7777");

        dest.write_all(&buf)?;

        Ok(())
    }
}

impl BufrEncoder {
    // Identification section, edition 4 layout, 22 octets.
    fn section1(&self, msg: &ObsMsg) -> Vec<u8> {
        let category = if self.generic {
            255
        } else {
            data_category(&msg.station.rep_memo)
        };

        let mut buf = Vec::with_capacity(22);
        push_u24(&mut buf, 22); // section length
        buf.push(0); // BUFR master table
        push_u16(&mut buf, 0xffff); // originating centre: missing
        push_u16(&mut buf, 0xffff); // originating subcentre: missing
        buf.push(0); // update sequence number
        buf.push(0); // no optional section
        buf.push(category);
        buf.push(255); // international subcategory: missing
        buf.push(255); // local subcategory: missing
        buf.push(14); // master table version
        buf.push(0); // local table version
        push_u16(&mut buf, msg.datetime.year() as u16);
        buf.push(msg.datetime.month() as u8);
        buf.push(msg.datetime.day() as u8);
        buf.push(msg.datetime.hour() as u8);
        buf.push(msg.datetime.minute() as u8);
        buf.push(msg.datetime.second() as u8);

        buf
    }
}

// Data description section: one subset, one descriptor per entry.
fn section3(msg: &ObsMsg) -> Vec<u8> {
    let len = 7 + 2 * msg.entries.len();

    let mut buf = Vec::with_capacity(len);
    push_u24(&mut buf, len as u32);
    buf.push(0); // reserved
    push_u16(&mut buf, 1); // one subset
    buf.push(0x80); // observed, not compressed

    for entry in &msg.entries {
        push_u16(&mut buf, u32::from(entry.var.code) as u16);
    }

    buf
}

// Data section: level, time range, code, value, and attributes per entry.
fn section4(msg: &ObsMsg) -> Result<Vec<u8>, MetobsDataErr> {
    let mut body = vec![];

    for entry in &msg.entries {
        for component in entry.level.components().iter() {
            push_i32(&mut body, component.unwrap_or(MISSING_COMPONENT));
        }
        for component in entry.trange.components().iter() {
            push_i32(&mut body, component.unwrap_or(MISSING_COMPONENT));
        }

        push_var(&mut body, &entry.var)?;

        if entry.attrs.len() > 255 {
            return Err(MetobsDataErr::Encoding(
                "too many attributes on one datum".to_owned(),
            ));
        }
        body.push(entry.attrs.len() as u8);
        for attr in &entry.attrs {
            push_var(&mut body, attr)?;
        }
    }

    let mut buf = Vec::with_capacity(4 + body.len());
    push_u24(&mut buf, 4 + body.len() as u32);
    buf.push(0); // reserved
    buf.extend_from_slice(&body);

    Ok(buf)
}

fn push_var(buf: &mut Vec<u8>, var: &Var) -> Result<(), MetobsDataErr> {
    push_u16(buf, u32::from(var.code) as u16);

    match &var.value {
        VarValue::Integer(v) => {
            buf.push(0);
            buf.extend_from_slice(&v.to_be_bytes());
        }
        VarValue::Decimal(v) => {
            buf.push(1);
            buf.extend_from_slice(&v.to_bits().to_be_bytes());
        }
        VarValue::Text(v) => {
            if v.len() > usize::from(u16::max_value()) {
                return Err(MetobsDataErr::Encoding(
                    "character value too long for BUFR".to_owned(),
                ));
            }
            buf.push(2);
            push_u16(buf, v.len() as u16);
            buf.extend_from_slice(v.as_bytes());
        }
    }

    Ok(())
}

fn push_u16(buf: &mut Vec<u8>, val: u16) {
    buf.extend_from_slice(&val.to_be_bytes());
}

fn push_u24(buf: &mut Vec<u8>, val: u32) {
    buf.extend_from_slice(&val.to_be_bytes()[1..]);
}

fn push_i32(buf: &mut Vec<u8>, val: i32) {
    buf.extend_from_slice(&val.to_be_bytes());
}

/// Writes CREX (FM 95) messages.
#[derive(Debug, Clone, Copy)]
pub struct CrexEncoder {
    /// Use the generic data category instead of deriving one from the
    /// network.
    pub generic: bool,
}

impl MsgEncoder for CrexEncoder {
    fn encode(&self, msg: &ObsMsg, dest: &mut dyn Write) -> Result<(), MetobsDataErr> {
        let category = if self.generic {
            255
        } else {
            data_category(&msg.station.rep_memo)
        };

        let mut out = String::new();
        out.push_str("CREX++\r\r\n");

        // Data description: table identifier, category, one descriptor per
        // entry.
        out.push_str(&format!("{} A{:03}", CREX_TABLE, category));
        for entry in &msg.entries {
            out.push_str(&format!(" {}", entry.var.code));
        }
        out.push_str("++\r\r\n");

        // One data subset: datetime, then per entry the level and time
        // range groups followed by the value.
        out.push_str(&msg.datetime.format("%Y%m%d %H%M%S").to_string());
        for entry in &msg.entries {
            for component in entry.level.components().iter() {
                out.push_str(&format!(" {}", crex_component(*component)));
            }
            for component in entry.trange.components().iter() {
                out.push_str(&format!(" {}", crex_component(*component)));
            }
            out.push(' ');
            out.push_str(&crex_value(&entry.var.value)?);
        }
        out.push_str("++\r\r\n");

        out.push_str("7777++\r\r\n");

        dest.write_all(out.as_bytes())?;

        Ok(())
    }
}

fn crex_component(component: Option<i32>) -> String {
    match component {
        Some(val) => val.to_string(),
        None => "///".to_owned(),
    }
}

// CREX is a character format; values must be printable ASCII.
fn crex_value(value: &VarValue) -> Result<String, MetobsDataErr> {
    let text = value.to_string();

    if !text.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        return Err(MetobsDataErr::Encoding(
            "value not representable in CREX character data".to_owned(),
        ));
    }

    Ok(text)
}
