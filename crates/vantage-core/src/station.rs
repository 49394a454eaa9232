//! Console session: wake-up, clock, configuration, and archive download.
//!
//! A [`Station`] wraps any blocking [`Transport`] and speaks the console
//! command protocol over it. The archive path ([`Station::archives`])
//! streams DMPAFT pages lazily; each page is requested only when the
//! iterator needs more records, so a long download never buffers the whole
//! archive.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::time::Duration;

use time::{Date, Month, PrimitiveDateTime, Time};
use tracing::{debug, info};

use vantage_types::Record;

use crate::error::{ConnectivityReason, Error, Result};
use crate::fetch::{ArchiveSource, FetchWindow};
use crate::link::{LinkUrl, TcpLink, Transport};
use crate::wire::{
    ACK, ESC, LOOP_PACKET_LEN, PAGE_LEN, append_crc, check_crc, decode_loop, decode_page_records,
    encode_date_stamp, encode_time_stamp,
};

/// Archive period values the console accepts, in minutes.
pub const ARCHIVE_PERIODS: [u8; 7] = [1, 5, 10, 15, 30, 60, 120];

const WAKE_ATTEMPTS: usize = 3;
const LINE_LIMIT: usize = 256;

/// Firmware and receiver information reported by the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationInfo {
    /// Firmware build date, e.g. `Apr 24 2002`.
    pub firmware_date: String,
    /// Firmware version, e.g. `1.90`.
    pub firmware_version: String,
    /// Raw receiver statistics line from `RXCHECK`.
    pub diagnostics: String,
}

/// A session with a Vantage console over a blocking transport.
pub struct Station<T: Transport = TcpLink> {
    link: T,
    url: Option<String>,
    timeout: Duration,
    awake: bool,
}

impl Station<TcpLink> {
    /// Connect to a console from a connection string like
    /// `tcp:192.168.1.18:1111`.
    pub fn from_url(url: &str, timeout: Duration) -> Result<Self> {
        let parsed = LinkUrl::parse(url)?;
        let LinkUrl::Tcp { host, port } = &parsed;
        let link = TcpLink::connect(host, *port, timeout)?;
        let mut station = Self::over(link, timeout);
        station.url = Some(parsed.to_string());
        Ok(station)
    }
}

impl<T: Transport> Station<T> {
    /// Wrap an already-open transport.
    pub fn over(link: T, timeout: Duration) -> Self {
        Self {
            link,
            url: None,
            timeout,
            awake: false,
        }
    }

    fn map_io(&self, operation: &str, err: std::io::Error) -> Error {
        match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                Error::timeout(operation, self.timeout)
            }
            std::io::ErrorKind::UnexpectedEof => {
                Error::connectivity(self.url.clone(), ConnectivityReason::LinkClosed)
            }
            _ => Error::Io(err),
        }
    }

    fn send(&mut self, operation: &str, bytes: &[u8]) -> Result<()> {
        self.link
            .write_all(bytes)
            .and_then(|_| self.link.flush())
            .map_err(|e| self.map_io(operation, e))
    }

    fn receive(&mut self, operation: &str, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.link
            .read_exact(&mut buf)
            .map_err(|e| self.map_io(operation, e))?;
        Ok(buf)
    }

    fn expect_ack(&mut self, operation: &str) -> Result<()> {
        let byte = self.receive(operation, 1)?[0];
        if byte == ACK {
            Ok(())
        } else {
            Err(Error::unexpected(operation, "ACK", byte))
        }
    }

    /// Read a CRC-protected frame of `len` bytes (CRC included).
    fn receive_frame(&mut self, operation: &str, len: usize) -> Result<Vec<u8>> {
        let frame = self.receive(operation, len)?;
        if !check_crc(&frame) {
            return Err(Error::crc(operation, len));
        }
        Ok(frame)
    }

    /// Wake the console. The console sleeps aggressively and answers a bare
    /// newline with `\n\r` once it is listening.
    pub fn wake_up(&mut self) -> Result<()> {
        if self.awake {
            return Ok(());
        }
        for attempt in 1..=WAKE_ATTEMPTS {
            self.send("wake-up", b"\n")?;
            match self.receive("wake-up", 2) {
                Ok(reply) if reply == b"\n\r" => {
                    debug!("Console awake after {} attempt(s)", attempt);
                    self.awake = true;
                    return Ok(());
                }
                Ok(reply) => {
                    debug!("Unexpected wake-up reply: {:02X?}", reply);
                }
                Err(Error::Timeout { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(Error::connectivity(
            self.url.clone(),
            ConnectivityReason::NoWakeResponse,
        ))
    }

    /// Issue a command that is answered with a bare ACK.
    ///
    /// Any bytes still buffered from an earlier exchange are discarded
    /// first so a stale reply cannot be taken for this command's answer.
    fn run_cmd(&mut self, cmd: &str) -> Result<()> {
        self.link.drain().map_err(|e| self.map_io(cmd, e))?;
        self.wake_up()?;
        self.send(cmd, format!("{}\n", cmd).as_bytes())?;
        self.expect_ack(cmd)
    }

    /// Read one non-empty `\n\r`-terminated line.
    fn read_crlf_line(&mut self, operation: &str) -> Result<String> {
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let byte = self.receive(operation, 1)?[0];
            buf.push(byte);
            if buf.ends_with(b"\n\r") {
                let text = String::from_utf8_lossy(&buf[..buf.len() - 2])
                    .trim()
                    .to_string();
                if !text.is_empty() {
                    return Ok(text);
                }
                buf.clear();
            }
            if buf.len() > LINE_LIMIT {
                return Err(Error::InvalidData(format!(
                    "unterminated reply to '{}'",
                    operation
                )));
            }
        }
    }

    /// Issue a command answered with `OK` and one payload line.
    fn run_text_cmd(&mut self, cmd: &str) -> Result<String> {
        self.link.drain().map_err(|e| self.map_io(cmd, e))?;
        self.wake_up()?;
        self.send(cmd, format!("{}\n", cmd).as_bytes())?;
        let status = self.read_crlf_line(cmd)?;
        if status != "OK" {
            return Err(Error::InvalidData(format!(
                "console answered '{}' to '{}'",
                status, cmd
            )));
        }
        self.read_crlf_line(cmd)
    }

    /// Read the console clock.
    pub fn get_time(&mut self) -> Result<PrimitiveDateTime> {
        self.run_cmd("GETTIME")?;
        let frame = self.receive_frame("GETTIME", 8)?;
        let (sec, min, hour, day, month, year) = (
            frame[0], frame[1], frame[2], frame[3], frame[4], frame[5],
        );
        let month = Month::try_from(month)
            .map_err(|_| Error::InvalidData(format!("bad month {} in GETTIME reply", month)))?;
        let date = Date::from_calendar_date(1900 + year as i32, month, day)
            .map_err(|e| Error::InvalidData(format!("bad date in GETTIME reply: {}", e)))?;
        let time = Time::from_hms(hour, min, sec)
            .map_err(|e| Error::InvalidData(format!("bad time in GETTIME reply: {}", e)))?;
        Ok(PrimitiveDateTime::new(date, time))
    }

    /// Set the console clock.
    pub fn set_time(&mut self, dt: PrimitiveDateTime) -> Result<()> {
        self.run_cmd("SETTIME")?;
        let mut data = vec![
            dt.second(),
            dt.minute(),
            dt.hour(),
            dt.day(),
            dt.month() as u8,
            (dt.year() - 1900) as u8,
        ];
        append_crc(&mut data);
        self.send("SETTIME", &data)?;
        self.expect_ack("SETTIME")?;
        info!("Console clock set to {}", dt);
        Ok(())
    }

    /// Firmware date, version, and receiver diagnostics.
    pub fn info(&mut self) -> Result<StationInfo> {
        Ok(StationInfo {
            firmware_date: self.run_text_cmd("VER")?,
            firmware_version: self.run_text_cmd("NVER")?,
            diagnostics: self.run_text_cmd("RXCHECK")?,
        })
    }

    /// Read the archive period in minutes from console EEPROM.
    pub fn archive_period(&mut self) -> Result<u8> {
        self.run_cmd("EEBRD 2D 01")?;
        let frame = self.receive_frame("EEBRD 2D 01", 3)?;
        Ok(frame[0])
    }

    /// Set the archive period. The console erases its archive when the
    /// period changes, so callers should sync first.
    pub fn set_archive_period(&mut self, minutes: u8) -> Result<()> {
        if !ARCHIVE_PERIODS.contains(&minutes) {
            return Err(Error::InvalidData(format!(
                "archive period {} not in {:?}",
                minutes, ARCHIVE_PERIODS
            )));
        }
        self.run_cmd(&format!("SETPER {}", minutes))?;
        info!("Archive period set to {} minutes", minutes);
        Ok(())
    }

    /// Read one current-conditions record, stamped with the console clock.
    pub fn current_record(&mut self) -> Result<Record> {
        let now = self.get_time()?;
        self.run_cmd("LOOP 1")?;
        let packet = self.receive("LOOP", LOOP_PACKET_LEN)?;
        decode_loop(&packet, now)
    }

    /// Start a lazy archive download for the given window.
    ///
    /// The DMPAFT exchange happens up front; pages stream on demand as the
    /// returned iterator is consumed. Dropping the iterator early aborts
    /// the transfer cleanly.
    pub fn archives(&mut self, window: &FetchWindow) -> Result<ArchiveDump<'_, T>> {
        self.run_cmd("DMPAFT")?;

        let mut stamp = match window.start {
            Some(dt) => {
                let mut bytes = Vec::with_capacity(6);
                bytes.extend_from_slice(&encode_date_stamp(dt).to_le_bytes());
                bytes.extend_from_slice(&encode_time_stamp(dt).to_le_bytes());
                bytes
            }
            // Zero stamp: everything the archive holds.
            None => vec![0, 0, 0, 0],
        };
        append_crc(&mut stamp);
        self.send("DMPAFT", &stamp)?;
        self.expect_ack("DMPAFT")?;

        let header = self.receive_frame("DMPAFT", 6)?;
        let pages = u16::from_le_bytes([header[0], header[1]]);
        let first_slot = u16::from_le_bytes([header[2], header[3]]);
        debug!(
            "DMPAFT: {} page(s), first record at slot {}",
            pages, first_slot
        );

        Ok(ArchiveDump {
            station: self,
            window: *window,
            pages_left: pages,
            skip_slots: first_slot as usize,
            buffer: VecDeque::new(),
            failed: false,
        })
    }
}

impl<T: Transport> ArchiveSource for Station<T> {
    fn archive_records<'a>(
        &'a mut self,
        window: &FetchWindow,
    ) -> Result<Box<dyn Iterator<Item = Result<Record>> + 'a>> {
        Ok(Box::new(self.archives(window)?))
    }
}

/// Lazy iterator over the records of one DMPAFT transfer.
pub struct ArchiveDump<'a, T: Transport> {
    station: &'a mut Station<T>,
    window: FetchWindow,
    pages_left: u16,
    skip_slots: usize,
    buffer: VecDeque<Record>,
    failed: bool,
}

impl<T: Transport> ArchiveDump<'_, T> {
    fn read_page(&mut self) -> Result<()> {
        self.station.send("DMP page", &[ACK])?;
        let page = self.station.receive("DMP page", PAGE_LEN)?;
        self.pages_left -= 1;

        // The first-slot offset applies to the first page only.
        let skip = std::mem::take(&mut self.skip_slots);
        for record in decode_page_records(&page, skip)? {
            match record.datetime() {
                Ok(dt) if self.window.contains(dt) => self.buffer.push_back(record),
                Ok(_) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl<T: Transport> Iterator for ArchiveDump<'_, T> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Some(Ok(record));
            }
            if self.failed || self.pages_left == 0 {
                return None;
            }
            if let Err(e) = self.read_page() {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}

impl<T: Transport> Drop for ArchiveDump<'_, T> {
    fn drop(&mut self) {
        // Abort an unfinished transfer so the console returns to its
        // command loop.
        if self.pages_left > 0 && !self.failed {
            let _ = self.station.link.write_all(&[ESC]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};
    use time::macros::datetime;
    use vantage_types::DATETIME_FIELD;

    use crate::wire::{ARCHIVE_RECORD_LEN, RECORDS_PER_PAGE, crc16};

    /// Scripted transport: replays canned console replies, records writes.
    /// Bytes in `stale` sit in front of the script until drained, the way
    /// leftovers from an abandoned exchange would on a real link.
    struct ScriptLink {
        stale: Vec<u8>,
        replies: Cursor<Vec<u8>>,
        written: Vec<u8>,
    }

    impl ScriptLink {
        fn new(replies: Vec<u8>) -> Self {
            Self {
                stale: Vec::new(),
                replies: Cursor::new(replies),
                written: Vec::new(),
            }
        }

        fn with_stale(stale: &[u8], replies: Vec<u8>) -> Self {
            Self {
                stale: stale.to_vec(),
                ..Self::new(replies)
            }
        }
    }

    impl Read for ScriptLink {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.stale.is_empty() {
                let n = buf.len().min(self.stale.len());
                buf[..n].copy_from_slice(&self.stale[..n]);
                self.stale.drain(..n);
                return Ok(n);
            }
            let n = self.replies.read(buf)?;
            if n == 0 {
                // A real link would block until timeout.
                return Err(io::Error::new(io::ErrorKind::TimedOut, "script exhausted"));
            }
            Ok(n)
        }
    }

    impl Transport for ScriptLink {
        fn drain(&mut self) -> io::Result<()> {
            self.stale.clear();
            Ok(())
        }
    }

    impl Write for ScriptLink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn station(replies: Vec<u8>) -> Station<ScriptLink> {
        Station::over(ScriptLink::new(replies), Duration::from_secs(1))
    }

    fn framed(data: &[u8]) -> Vec<u8> {
        let mut frame = data.to_vec();
        append_crc(&mut frame);
        frame
    }

    #[test]
    fn test_wake_up_retries_then_fails() {
        let mut st = station(Vec::new());
        let err = st.wake_up().unwrap_err();
        assert!(matches!(
            err,
            Error::Connectivity {
                reason: ConnectivityReason::NoWakeResponse,
                ..
            }
        ));
        assert_eq!(st.link.written, b"\n\n\n");
    }

    #[test]
    fn test_get_time() {
        let mut replies = b"\n\r".to_vec();
        replies.push(ACK);
        // 16:44:56 on 2012-06-13.
        replies.extend_from_slice(&framed(&[56, 44, 16, 13, 6, 112]));

        let mut st = station(replies);
        let dt = st.get_time().unwrap();
        assert_eq!(dt, datetime!(2012-06-13 16:44:56));
        assert!(st.link.written.ends_with(b"GETTIME\n"));
    }

    #[test]
    fn test_stale_bytes_are_drained_before_a_command() {
        let mut replies = b"\n\r".to_vec();
        replies.push(ACK);
        replies.extend_from_slice(&framed(&[56, 44, 16, 13, 6, 112]));

        // Leftovers from an abandoned exchange sit in the buffer; they
        // must not be taken for the wake-up reply or the time frame.
        let link = ScriptLink::with_stale(b"\x06\n\rgarbage", replies);
        let mut st = Station::over(link, Duration::from_secs(1));
        let dt = st.get_time().unwrap();
        assert_eq!(dt, datetime!(2012-06-13 16:44:56));
    }

    #[test]
    fn test_get_time_bad_crc() {
        let mut replies = b"\n\r".to_vec();
        replies.push(ACK);
        let mut frame = framed(&[56, 44, 16, 13, 6, 112]);
        frame[0] ^= 0x01;
        replies.extend_from_slice(&frame);

        let mut st = station(replies);
        assert!(matches!(st.get_time(), Err(Error::Crc { .. })));
    }

    #[test]
    fn test_set_time_frames_payload() {
        let mut replies = b"\n\r".to_vec();
        replies.push(ACK); // SETTIME command
        replies.push(ACK); // data frame
        let mut st = station(replies);
        st.set_time(datetime!(2012-06-13 16:44:56)).unwrap();

        let payload = [56u8, 44, 16, 13, 6, 112];
        let crc = crc16(&payload).to_be_bytes();
        let written = &st.link.written;
        assert!(written.ends_with(&[&payload[..], &crc[..]].concat()));
    }

    #[test]
    fn test_run_text_cmd_rejects_non_ok() {
        let mut replies = b"\n\r".to_vec();
        replies.extend_from_slice(b"\n\rHUH?\n\r");
        let mut st = station(replies);
        let err = st.run_text_cmd("VER").unwrap_err();
        assert!(err.to_string().contains("HUH?"));
    }

    #[test]
    fn test_info_reads_three_lines() {
        let mut replies = b"\n\r".to_vec();
        replies.extend_from_slice(b"\n\rOK\n\rApr 24 2002\n\r");
        replies.extend_from_slice(b"\n\rOK\n\r1.90\n\r");
        replies.extend_from_slice(b"\n\rOK\n\r21629 15 0 3204 128\n\r");
        let mut st = station(replies);
        let info = st.info().unwrap();
        assert_eq!(info.firmware_date, "Apr 24 2002");
        assert_eq!(info.firmware_version, "1.90");
        assert_eq!(info.diagnostics, "21629 15 0 3204 128");
    }

    #[test]
    fn test_set_archive_period_validates() {
        let mut st = station(Vec::new());
        let err = st.set_archive_period(7).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    fn archive_slot(dt: PrimitiveDateTime) -> [u8; ARCHIVE_RECORD_LEN] {
        let mut data = [0u8; ARCHIVE_RECORD_LEN];
        data[0..2].copy_from_slice(&encode_date_stamp(dt).to_le_bytes());
        data[2..4].copy_from_slice(&encode_time_stamp(dt).to_le_bytes());
        data
    }

    fn page_reply(slots: &[PrimitiveDateTime]) -> Vec<u8> {
        let mut page = vec![0u8; PAGE_LEN - 2];
        for slot in 0..RECORDS_PER_PAGE {
            let start = 1 + slot * ARCHIVE_RECORD_LEN;
            match slots.get(slot) {
                Some(&dt) => {
                    page[start..start + ARCHIVE_RECORD_LEN].copy_from_slice(&archive_slot(dt));
                }
                None => {
                    page[start] = 0xFF;
                    page[start + 1] = 0xFF;
                }
            }
        }
        append_crc(&mut page);
        page
    }

    #[test]
    fn test_archives_streams_pages() {
        let mut replies = b"\n\r".to_vec();
        replies.push(ACK); // DMPAFT
        replies.push(ACK); // stamp accepted
        replies.extend_from_slice(&framed(&[2, 0, 0, 0])); // 2 pages, slot 0
        replies.extend_from_slice(&page_reply(&[
            datetime!(2024-01-01 00:00:00),
            datetime!(2024-01-01 00:05:00),
        ]));
        replies.extend_from_slice(&page_reply(&[datetime!(2024-01-01 00:10:00)]));

        let mut st = station(replies);
        let records: Vec<_> = st
            .archives(&FetchWindow::unbounded())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get(DATETIME_FIELD), Some("2024-01-01 00:00:00"));
        assert_eq!(records[2].get(DATETIME_FIELD), Some("2024-01-01 00:10:00"));
    }

    #[test]
    fn test_archives_skips_first_slots() {
        let mut replies = b"\n\r".to_vec();
        replies.push(ACK);
        replies.push(ACK);
        replies.extend_from_slice(&framed(&[1, 0, 1, 0])); // 1 page, start at slot 1
        replies.extend_from_slice(&page_reply(&[
            datetime!(2024-01-01 00:00:00), // stale slot, must be skipped
            datetime!(2024-01-01 00:05:00),
        ]));

        let mut st = station(replies);
        let records: Vec<_> = st
            .archives(&FetchWindow::unbounded())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(DATETIME_FIELD), Some("2024-01-01 00:05:00"));
    }

    #[test]
    fn test_archives_empty_transfer() {
        let mut replies = b"\n\r".to_vec();
        replies.push(ACK);
        replies.push(ACK);
        replies.extend_from_slice(&framed(&[0, 0, 0, 0])); // no pages

        let mut st = station(replies);
        let records: Vec<_> = st.archives(&FetchWindow::unbounded()).unwrap().collect();
        assert!(records.is_empty());
    }

    #[test]
    fn test_archives_corrupt_page_fails_stream() {
        let mut replies = b"\n\r".to_vec();
        replies.push(ACK);
        replies.push(ACK);
        replies.extend_from_slice(&framed(&[1, 0, 0, 0]));
        let mut page = page_reply(&[datetime!(2024-01-01 00:00:00)]);
        page[5] ^= 0x01;
        replies.extend_from_slice(&page);

        let mut st = station(replies);
        let items: Vec<_> = st.archives(&FetchWindow::unbounded()).unwrap().collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(Error::Crc { .. })));
    }
}
