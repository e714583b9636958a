//! Newline framing for the command channel
//!
//! The radio delivers opaque byte fragments that may split or coalesce
//! logical messages arbitrarily. The framer accumulates them and hands out
//! complete records, one JSON object per `\n`-terminated line.

/// Default cap on the accumulation buffer.
///
/// Commands are single small JSON objects; anything that grows past this
/// without a terminator is a misbehaving central, not a real command.
pub const DEFAULT_BUFFER_CAP: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// An unterminated record outgrew the buffer cap and was dropped.
    #[error("unterminated record exceeds {cap} bytes, dropping buffered data")]
    Overflow { cap: usize },
}

/// Accumulates inbound fragments and extracts newline-terminated records.
///
/// The buffer between calls is the only persistent state here. Complete
/// records already sitting in the buffer are never lost to an overflow;
/// only the unterminated tail is dropped.
#[derive(Debug)]
pub struct Framer {
    buf: Vec<u8>,
    cap: usize,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framer {
    pub fn new() -> Self {
        Self::with_buffer_cap(DEFAULT_BUFFER_CAP)
    }

    pub fn with_buffer_cap(cap: usize) -> Self {
        Self {
            buf: Vec::new(),
            cap,
        }
    }

    /// Append one inbound fragment to the buffer.
    ///
    /// Returns `Overflow` when the bytes after the last terminator exceed
    /// the cap; that tail is discarded and the framer resynchronizes at the
    /// next terminator the central sends. Records completed by this
    /// fragment stay extractable via [`Framer::next_record`].
    pub fn push(&mut self, fragment: &[u8]) -> Result<(), FrameError> {
        self.buf.extend_from_slice(fragment);

        let tail_start = match self.buf.iter().rposition(|&b| b == b'\n') {
            Some(pos) => pos + 1,
            None => 0,
        };
        if self.buf.len() - tail_start > self.cap {
            self.buf.truncate(tail_start);
            return Err(FrameError::Overflow { cap: self.cap });
        }
        Ok(())
    }

    /// Extract the next complete record, trimmed of surrounding whitespace.
    ///
    /// A bare newline yields an empty record; deciding what that means is
    /// the dispatcher's job, not a framing error.
    pub fn next_record(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let rest = self.buf.split_off(pos + 1);
        let line = std::mem::replace(&mut self.buf, rest);
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }

    /// Drop any buffered partial record (e.g. when the central detaches).
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = "{\"type\":\"wifi_config\",\"ssid\":\"Home\",\"password\":\"abc\"}";

    fn drain(framer: &mut Framer) -> Vec<String> {
        std::iter::from_fn(|| framer.next_record()).collect()
    }

    #[test]
    fn whole_record_in_one_fragment() {
        let mut framer = Framer::new();
        framer.push(format!("{RECORD}\n").as_bytes()).unwrap();
        assert_eq!(drain(&mut framer), vec![RECORD.to_string()]);
    }

    #[test]
    fn byte_at_a_time_yields_the_same_record() {
        let mut framer = Framer::new();
        for byte in format!("{RECORD}\n").bytes() {
            framer.push(&[byte]).unwrap();
        }
        assert_eq!(drain(&mut framer), vec![RECORD.to_string()]);
    }

    #[test]
    fn split_mid_record_carries_state_across_calls() {
        let mut framer = Framer::new();
        framer.push(b"{").unwrap();
        assert_eq!(framer.next_record(), None);
        framer.push(b"\"type\":\"x\"}\n").unwrap();
        assert_eq!(drain(&mut framer), vec!["{\"type\":\"x\"}".to_string()]);
    }

    #[test]
    fn coalesced_fragments_yield_multiple_records() {
        let mut framer = Framer::new();
        framer.push(b"{\"type\":\"a\"}\n{\"type\":\"b\"}\npartial").unwrap();
        assert_eq!(
            drain(&mut framer),
            vec!["{\"type\":\"a\"}".to_string(), "{\"type\":\"b\"}".to_string()]
        );
        framer.push(b"\n").unwrap();
        assert_eq!(drain(&mut framer), vec!["partial".to_string()]);
    }

    #[test]
    fn records_are_trimmed() {
        let mut framer = Framer::new();
        framer.push(b"  {\"type\":\"x\"} \r\n").unwrap();
        assert_eq!(drain(&mut framer), vec!["{\"type\":\"x\"}".to_string()]);
    }

    #[test]
    fn bare_newline_yields_empty_record() {
        let mut framer = Framer::new();
        framer.push(b"\n").unwrap();
        assert_eq!(drain(&mut framer), vec![String::new()]);
    }

    #[test]
    fn overflow_drops_the_tail_and_resynchronizes() {
        let mut framer = Framer::with_buffer_cap(16);
        assert_eq!(
            framer.push(&[b'x'; 17]),
            Err(FrameError::Overflow { cap: 16 })
        );
        assert_eq!(framer.next_record(), None);

        framer.push(b"{\"type\":\"x\"}\n").unwrap();
        assert_eq!(drain(&mut framer), vec!["{\"type\":\"x\"}".to_string()]);
    }

    #[test]
    fn overflow_keeps_records_completed_by_the_same_fragment() {
        let mut framer = Framer::with_buffer_cap(16);
        let mut fragment = b"{\"type\":\"x\"}\n".to_vec();
        fragment.extend_from_slice(&[b'y'; 32]);
        assert_eq!(
            framer.push(&fragment),
            Err(FrameError::Overflow { cap: 16 })
        );
        assert_eq!(drain(&mut framer), vec!["{\"type\":\"x\"}".to_string()]);
    }

    #[test]
    fn overflow_accumulates_across_fragments() {
        let mut framer = Framer::with_buffer_cap(16);
        framer.push(&[b'x'; 10]).unwrap();
        assert_eq!(
            framer.push(&[b'x'; 10]),
            Err(FrameError::Overflow { cap: 16 })
        );
    }

    #[test]
    fn clear_drops_partial_data() {
        let mut framer = Framer::new();
        framer.push(b"{\"type\":").unwrap();
        framer.clear();
        framer.push(b"{\"type\":\"x\"}\n").unwrap();
        assert_eq!(drain(&mut framer), vec!["{\"type\":\"x\"}".to_string()]);
    }
}
