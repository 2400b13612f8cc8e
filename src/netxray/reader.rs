use crate::atm::{guess_atm_type, AtmTrafficGuesser, StandardAtmGuesser};
use crate::error::{from_nom_err, NetxrayError};
use crate::netxray::header::{parse_netxray_header, NetxrayInfo, CAPTUREFILE_HEADER_SIZE};
use crate::netxray::record::{parse_record_header, RecordInfo};
use crate::packet::{NetxrayPacket, RecordType};
use crate::utils::{read_full, Data};
use circular::Buffer;
use log::{debug, warn};
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;

/// Shared ATM heuristics
pub type SharedAtmGuesser = Arc<dyn AtmTrafficGuesser + Send + Sync>;

/// Progress of a sequential scan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    /// Reading from the start offset
    Reading,
    /// End of file was reached once, reading again after the file header
    Wrapped,
    /// End of file was reached after wrapping
    Finished,
}

/// Streaming reader over NetXRay data
///
/// ## NetXRay Reader
///
/// This reader is a streaming parser based on a circular buffer, which means memory
/// usage is constant and does not depend on the size of the file. It takes any input
/// providing the `Read` and `Seek` traits: seeking is required to reach the first
/// packet, and to wrap around in circular captures.
///
/// The file header is read and checked when the reader is created, and can be
/// accessed using [`info`](NetxrayReader::info). Each call to
/// [`next_packet`](NetxrayReader::next_packet) returns the file offset of a record and
/// its packet. The packet data borrows the internal buffer, and is released by the next
/// call.
///
/// In a circular capture, packets are stored from the start offset to the end of the
/// file, then from the end of the file header to the end offset. The reader follows
/// this order, and wraps at most once.
///
/// The buffer grows if a record is larger than its capacity. Using at least 65k is
/// advised to avoid frequent reads and buffer shifts.
///
/// ## Example
///
/// ```rust,no_run
/// use netxray_parser::*;
/// use std::fs::File;
///
/// # let path = "capture.cap";
/// let file = File::open(path).unwrap();
/// let mut num_packets = 0;
/// let mut reader = NetxrayReader::new(65536, file).expect("NetxrayReader");
/// println!("encapsulation: {:?}", reader.info().encapsulation);
/// loop {
///     match reader.next_packet() {
///         Ok((_offset, packet)) => {
///             num_packets += 1;
///             println!("{}.{:09}: {} bytes", packet.ts_sec, packet.ts_nsec, packet.caplen);
///         }
///         Err(NetxrayError::Eof) => break,
///         Err(e) => panic!("error while reading: {:?}", e),
///     }
/// }
/// println!("num_packets: {}", num_packets);
/// ```
pub struct NetxrayReader<R>
where
    R: Read + Seek,
{
    info: NetxrayInfo,
    reader: R,
    buffer: Buffer,
    /// File offset of the first byte of the buffer data
    offset: u64,
    /// Size of the record returned by the last call, consumed on the next call
    pending: usize,
    reader_exhausted: bool,
    state: ScanState,
    guesser: SharedAtmGuesser,
}

impl<R> NetxrayReader<R>
where
    R: Read + Seek,
{
    /// Creates a new `NetxrayReader<R>` with the provided buffer capacity.
    ///
    /// The reader must be positioned at the start of the file.
    pub fn new(capacity: usize, mut reader: R) -> Result<NetxrayReader<R>, NetxrayError> {
        let info = read_file_info(&mut reader)?;
        reader.seek(SeekFrom::Start(u64::from(info.start_offset)))?;
        Ok(NetxrayReader {
            info,
            reader,
            buffer: Buffer::with_capacity(capacity),
            offset: u64::from(info.start_offset),
            pending: 0,
            reader_exhausted: false,
            state: ScanState::Reading,
            guesser: Arc::new(StandardAtmGuesser),
        })
    }

    /// Use other heuristics to classify ATM traffic
    pub fn with_atm_guesser(mut self, guesser: SharedAtmGuesser) -> Self {
        self.guesser = guesser;
        self
    }

    /// Values derived from the file header
    pub fn info(&self) -> &NetxrayInfo {
        &self.info
    }

    /// Open a reader for random access, on another handle to the same file
    ///
    /// The two readers are independent: reading at random offsets does not change the
    /// state of the sequential scan.
    pub fn random_access<R2>(&self, reader: R2) -> NetxrayRandomReader<R2>
    where
        R2: Read + Seek,
    {
        NetxrayRandomReader {
            info: self.info,
            reader,
            guesser: self.guesser.clone(),
        }
    }

    /// Read the next packet
    ///
    /// Returns the file offset of the record, and the packet. Returns
    /// [`NetxrayError::Eof`] after the last packet, and
    /// [`NetxrayError::UnexpectedEof`] if the file is truncated.
    pub fn next_packet(&mut self) -> Result<(u64, NetxrayPacket<'_>), NetxrayError> {
        if self.pending > 0 {
            self.buffer.consume(self.pending);
            self.offset += self.pending as u64;
            self.pending = 0;
        }
        let hdr_len = self.info.record_header_len();
        loop {
            if self.state == ScanState::Finished
                || self.offset == u64::from(self.info.end_offset)
            {
                return Err(NetxrayError::Eof);
            }
            let avail = self.fill(hdr_len)?;
            if avail >= hdr_len {
                break;
            }
            if avail > 0 {
                return Err(NetxrayError::UnexpectedEof);
            }
            // end of file, at a record boundary
            if self.info.start_offset < self.info.end_offset {
                warn!(
                    "netxray: end of file at 0x{:x}, before end offset 0x{:x}",
                    self.offset, self.info.end_offset
                );
                return Err(NetxrayError::UnexpectedEof);
            }
            if self.state == ScanState::Wrapped {
                self.state = ScanState::Finished;
                return Err(NetxrayError::Eof);
            }
            debug!("netxray: wrapping around at 0x{:x}", self.offset);
            self.state = ScanState::Wrapped;
            self.seek_to(CAPTUREFILE_HEADER_SIZE as u64)?;
        }
        let (_, hdr) = parse_record_header(self.info.version.major(), self.buffer.data())
            .map_err(from_nom_err)?;
        let RecordInfo {
            ts_sec,
            ts_nsec,
            caplen,
            origlen,
            mut pseudo_header,
            padding,
        } = self.info.decode_record(&hdr)?;
        let total = hdr_len + caplen as usize + padding as usize;
        if self.fill(total)? < total {
            return Err(NetxrayError::UnexpectedEof);
        }
        let offset = self.offset;
        self.pending = total;
        let data = &self.buffer.data()[hdr_len..hdr_len + caplen as usize];
        guess_atm_type(
            self.info.encapsulation,
            &mut pseudo_header,
            caplen,
            data,
            self.guesser.as_ref(),
        );
        let packet = NetxrayPacket {
            rec_type: RecordType::Packet,
            ts_sec,
            ts_nsec,
            caplen,
            origlen,
            pseudo_header,
            data: Data::Borrowed(data),
        };
        Ok((offset, packet))
    }

    /// Fill the buffer until it holds `needed` bytes, or the reader is exhausted
    ///
    /// Returns the number of bytes available, at most `needed`.
    fn fill(&mut self, needed: usize) -> Result<usize, NetxrayError> {
        if self.buffer.capacity() < needed {
            let new_size = needed.max(2 * self.buffer.capacity());
            debug!("netxray: growing buffer to {} bytes", new_size);
            self.buffer.grow(new_size);
        }
        while self.buffer.available_data() < needed && !self.reader_exhausted {
            if self.buffer.available_data() + self.buffer.available_space() < needed {
                self.buffer.shift();
            }
            match self.reader.read(self.buffer.space()) {
                Ok(0) => self.reader_exhausted = true,
                Ok(sz) => {
                    self.buffer.fill(sz);
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => (),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(self.buffer.available_data().min(needed))
    }

    fn seek_to(&mut self, offset: u64) -> Result<(), NetxrayError> {
        self.reader.seek(SeekFrom::Start(offset))?;
        let stale = self.buffer.available_data();
        self.buffer.consume(stale);
        self.buffer.shift();
        self.offset = offset;
        self.reader_exhausted = false;
        Ok(())
    }
}

/// Reader for packets at known offsets
///
/// Created with [`NetxrayReader::random_access`], from offsets returned by
/// [`NetxrayReader::next_packet`]. Packets own their data.
pub struct NetxrayRandomReader<R>
where
    R: Read + Seek,
{
    info: NetxrayInfo,
    reader: R,
    guesser: SharedAtmGuesser,
}

impl<R> NetxrayRandomReader<R>
where
    R: Read + Seek,
{
    /// Create a random access reader, from values derived from the file header
    pub fn new(info: NetxrayInfo, reader: R) -> Self {
        NetxrayRandomReader {
            info,
            reader,
            guesser: Arc::new(StandardAtmGuesser),
        }
    }

    pub fn with_atm_guesser(mut self, guesser: SharedAtmGuesser) -> Self {
        self.guesser = guesser;
        self
    }

    pub fn info(&self) -> &NetxrayInfo {
        &self.info
    }

    /// Read the record at `offset`
    ///
    /// Any end of file is unexpected here, since the record is supposed to exist.
    pub fn read_at(&mut self, offset: u64) -> Result<NetxrayPacket<'static>, NetxrayError> {
        self.reader.seek(SeekFrom::Start(offset))?;
        let hdr_len = self.info.record_header_len();
        let mut hdr_buf = vec![0; hdr_len];
        if read_full(&mut self.reader, &mut hdr_buf)? < hdr_len {
            return Err(NetxrayError::UnexpectedEof);
        }
        let (_, hdr) =
            parse_record_header(self.info.version.major(), &hdr_buf).map_err(from_nom_err)?;
        let RecordInfo {
            ts_sec,
            ts_nsec,
            caplen,
            origlen,
            mut pseudo_header,
            ..
        } = self.info.decode_record(&hdr)?;
        let mut data = vec![0; caplen as usize];
        if read_full(&mut self.reader, &mut data)? < data.len() {
            return Err(NetxrayError::UnexpectedEof);
        }
        guess_atm_type(
            self.info.encapsulation,
            &mut pseudo_header,
            caplen,
            &data,
            self.guesser.as_ref(),
        );
        Ok(NetxrayPacket {
            rec_type: RecordType::Packet,
            ts_sec,
            ts_nsec,
            caplen,
            origlen,
            pseudo_header,
            data: Data::Owned(data),
        })
    }
}

/// Read and check the file header, leaving the reader after it
fn read_file_info<R: Read>(reader: &mut R) -> Result<NetxrayInfo, NetxrayError> {
    let mut buf = [0u8; CAPTUREFILE_HEADER_SIZE];
    let sz = read_full(reader, &mut buf)?;
    if sz < 4 {
        return Err(NetxrayError::HeaderNotRecognized);
    }
    let (_, header) = parse_netxray_header(&buf[..sz]).map_err(from_nom_err)?;
    header.file_info()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netxray::header::tests::HDR_V2_ETH;
    use std::io::Cursor;

    #[test]
    fn test_short_input_not_recognized() {
        let res = NetxrayReader::new(1024, Cursor::new(b"XC".to_vec()));
        assert!(matches!(res, Err(NetxrayError::HeaderNotRecognized)));
        let res = NetxrayReader::new(1024, Cursor::new(b"\xd4\xc3\xb2\xa1....".to_vec()));
        assert!(matches!(res, Err(NetxrayError::HeaderNotRecognized)));
    }

    #[test]
    fn test_truncated_header() {
        let res = NetxrayReader::new(1024, Cursor::new(HDR_V2_ETH[..60].to_vec()));
        assert!(matches!(res, Err(NetxrayError::UnexpectedEof)));
    }

    #[test]
    fn test_small_buffer_grows() {
        let mut data = HDR_V2_ETH.to_vec();
        // one record of 40 bytes of data, ending at the end offset
        let mut rec = [0u8; 40];
        rec[0..4].copy_from_slice(&1_000_000u32.to_le_bytes());
        rec[8..10].copy_from_slice(&40u16.to_le_bytes());
        rec[10..12].copy_from_slice(&40u16.to_le_bytes());
        data.extend_from_slice(&rec);
        data.extend_from_slice(&[0x42; 40]);
        let total_len = data.len() as u32;
        data[28..32].copy_from_slice(&total_len.to_le_bytes());
        let mut reader = NetxrayReader::new(16, Cursor::new(data)).expect("reader");
        let (offset, packet) = reader.next_packet().expect("packet");
        assert_eq!(offset, 128);
        assert_eq!(packet.caplen, 40);
        assert_eq!(packet.packet_data(), &[0x42; 40][..]);
        assert_eq!(reader.next_packet().unwrap_err(), NetxrayError::Eof);
        // stays at EOF
        assert_eq!(reader.next_packet().unwrap_err(), NetxrayError::Eof);
    }
}
