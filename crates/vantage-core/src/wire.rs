//! Console wire protocol: framing bytes, CRC, stamps, and record decoding.
//!
//! Everything on the link is little-endian except the CRC, which the
//! console transmits most-significant byte first. All multi-field frames
//! carry a CRC-CCITT (polynomial 0x1021, zero seed) over the data bytes;
//! a frame is valid when the CRC computed over data plus trailing CRC
//! bytes is zero.

use time::{Date, Month, PrimitiveDateTime, Time};

use vantage_types::{DATETIME_FIELD, Record, datetime};

use crate::error::{Error, Result};

/// Positive acknowledge byte.
pub const ACK: u8 = 0x06;
/// Negative acknowledge byte.
pub const NAK: u8 = 0x21;
/// Abort byte for multi-page transfers.
pub const ESC: u8 = 0x1B;

/// Size of one revision-B archive record.
pub const ARCHIVE_RECORD_LEN: usize = 52;
/// Archive records per DMP page.
pub const RECORDS_PER_PAGE: usize = 5;
/// Size of one DMP page: sequence byte, five records, four reserved
/// bytes, two CRC bytes.
pub const PAGE_LEN: usize = 1 + RECORDS_PER_PAGE * ARCHIVE_RECORD_LEN + 4 + 2;
/// Size of one LOOP packet including CRC.
pub const LOOP_PACKET_LEN: usize = 99;
/// Capacity of the console's archive memory in records.
pub const MAX_ARCHIVE_RECORDS: u64 = 2560;

/// Compute the CRC-CCITT checksum the console uses.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Whether a frame (data followed by its big-endian CRC) is intact.
pub fn check_crc(frame: &[u8]) -> bool {
    crc16(frame) == 0
}

/// Append the big-endian CRC of `data` to it.
pub fn append_crc(data: &mut Vec<u8>) {
    let crc = crc16(data);
    data.extend_from_slice(&crc.to_be_bytes());
}

/// Encode the console's packed archive date stamp.
pub fn encode_date_stamp(dt: PrimitiveDateTime) -> u16 {
    let year = (dt.year() - 2000).max(0) as u16;
    dt.day() as u16 + (dt.month() as u16) * 32 + year * 512
}

/// Encode the console's packed archive time stamp (minute precision).
pub fn encode_time_stamp(dt: PrimitiveDateTime) -> u16 {
    dt.hour() as u16 * 100 + dt.minute() as u16
}

/// Decode a packed date/time stamp pair.
///
/// Returns `None` for the all-ones date stamp that marks an unused
/// record slot, or for stamps that do not form a real calendar date.
pub fn decode_stamps(date_stamp: u16, time_stamp: u16) -> Option<PrimitiveDateTime> {
    if date_stamp == 0xFFFF {
        return None;
    }
    let day = (date_stamp & 0x1F) as u8;
    let month = ((date_stamp >> 5) & 0x0F) as u8;
    let year = (date_stamp >> 9) as i32 + 2000;

    let month = Month::try_from(month).ok()?;
    let date = Date::from_calendar_date(year, month, day).ok()?;
    let time = Time::from_hms((time_stamp / 100) as u8, (time_stamp % 100) as u8, 0).ok()?;
    Some(PrimitiveDateTime::new(date, time))
}

fn u16_at(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn i16_at(data: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Format a tenths-of-degree temperature, empty for the dash value.
fn fmt_temp(raw: i16, dash: i16) -> String {
    if raw == dash {
        String::new()
    } else {
        format!("{:.1}", raw as f32 / 10.0)
    }
}

/// Format a u8 field, empty for the 0xFF dash value.
fn fmt_u8(raw: u8) -> String {
    if raw == 0xFF {
        String::new()
    } else {
        raw.to_string()
    }
}

/// Decode one 52-byte revision-B archive record into a flat [`Record`].
///
/// Returns `None` when the slot is unused (all-ones date stamp), the
/// stamp does not decode to a calendar date, or `data` is not exactly
/// [`ARCHIVE_RECORD_LEN`] bytes.
pub fn decode_archive_record(data: &[u8]) -> Option<Record> {
    if data.len() != ARCHIVE_RECORD_LEN {
        return None;
    }

    let dt = decode_stamps(u16_at(data, 0), u16_at(data, 2))?;

    let mut record = Record::new();
    record.set(DATETIME_FIELD, datetime::format_seconds(dt));
    record.set("TempOut", fmt_temp(i16_at(data, 4), 32767));
    record.set("TempOutHi", fmt_temp(i16_at(data, 6), -32768));
    record.set("TempOutLow", fmt_temp(i16_at(data, 8), 32767));
    record.set("RainFall", format!("{:.2}", u16_at(data, 10) as f32 / 100.0));
    record.set(
        "RainRateHi",
        format!("{:.2}", u16_at(data, 12) as f32 / 100.0),
    );
    record.set(
        "Barometer",
        format!("{:.3}", u16_at(data, 14) as f32 / 1000.0),
    );
    let solar = u16_at(data, 16);
    record.set(
        "SolarRad",
        if solar == 32767 {
            String::new()
        } else {
            solar.to_string()
        },
    );
    record.set("WindSamps", u16_at(data, 18).to_string());
    record.set("TempIn", fmt_temp(i16_at(data, 20), 32767));
    record.set("HumIn", fmt_u8(data[22]));
    record.set("HumOut", fmt_u8(data[23]));
    record.set("WindAvg", fmt_u8(data[24]));
    record.set("WindHi", fmt_u8(data[25]));
    record.set("WindHiDir", fmt_u8(data[26]));
    record.set("WindAvgDir", fmt_u8(data[27]));
    let uv = data[28];
    record.set(
        "UV",
        if uv == 0xFF {
            String::new()
        } else {
            format!("{:.1}", uv as f32 / 10.0)
        },
    );
    record.set("ETHour", format!("{:.3}", data[29] as f32 / 1000.0));

    Some(record)
}

/// Decode one DMP page into its used archive records.
///
/// `skip_slots` drops slots at the front of the page; the console's DMPAFT
/// header names the slot where the first new record sits on the first page.
/// Unused slots (all-ones date stamp) are dropped silently.
pub fn decode_page_records(page: &[u8], skip_slots: usize) -> Result<Vec<Record>> {
    if page.len() != PAGE_LEN {
        return Err(Error::InvalidData(format!(
            "DMP page has {} bytes, expected {}",
            page.len(),
            PAGE_LEN
        )));
    }
    if !check_crc(page) {
        return Err(Error::crc("DMP page", page.len()));
    }
    let mut records = Vec::with_capacity(RECORDS_PER_PAGE);
    for slot in skip_slots..RECORDS_PER_PAGE {
        let start = 1 + slot * ARCHIVE_RECORD_LEN;
        if let Some(record) = decode_archive_record(&page[start..start + ARCHIVE_RECORD_LEN]) {
            records.push(record);
        }
    }
    Ok(records)
}

/// Decode a 99-byte LOOP packet into a flat [`Record`].
///
/// LOOP packets carry no timestamp of their own, so the caller supplies
/// one (normally the console clock).
pub fn decode_loop(data: &[u8], timestamp: PrimitiveDateTime) -> Result<Record> {
    if data.len() != LOOP_PACKET_LEN {
        return Err(Error::InvalidData(format!(
            "LOOP packet has {} bytes, expected {}",
            data.len(),
            LOOP_PACKET_LEN
        )));
    }
    if &data[0..3] != b"LOO" {
        return Err(Error::InvalidData(
            "LOOP packet missing 'LOO' signature".into(),
        ));
    }
    if !check_crc(data) {
        return Err(Error::crc("LOOP", data.len()));
    }

    let mut record = Record::new();
    record.set(DATETIME_FIELD, datetime::format_seconds(timestamp));
    record.set(
        "Barometer",
        format!("{:.3}", u16_at(data, 7) as f32 / 1000.0),
    );
    record.set("TempIn", fmt_temp(i16_at(data, 9), 32767));
    record.set("HumIn", fmt_u8(data[11]));
    record.set("TempOut", fmt_temp(i16_at(data, 12), 32767));
    record.set("WindSpeed", fmt_u8(data[14]));
    record.set("WindSpeed10Min", fmt_u8(data[15]));
    record.set("WindDir", u16_at(data, 16).to_string());
    record.set("HumOut", fmt_u8(data[33]));
    record.set("RainRate", format!("{:.2}", u16_at(data, 41) as f32 / 100.0));
    let uv = data[43];
    record.set(
        "UV",
        if uv == 0xFF {
            String::new()
        } else {
            format!("{:.1}", uv as f32 / 10.0)
        },
    );
    let solar = u16_at(data, 44);
    record.set(
        "SolarRad",
        if solar == 32767 {
            String::new()
        } else {
            solar.to_string()
        },
    );
    record.set("RainDay", format!("{:.2}", u16_at(data, 50) as f32 / 100.0));
    record.set(
        "BatteryVolts",
        format!("{:.2}", (u16_at(data, 87) as f32 * 300.0) / 512.0 / 100.0),
    );

    Ok(record)
}
