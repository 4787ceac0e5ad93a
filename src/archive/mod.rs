//! Streaming ZIP writer.
//!
//! Entries are compressed and pushed to the sink as their bytes arrive, so
//! neither the number of entries nor any entry size has to be known up front.
//! Each entry's CRC and sizes follow its data in a data descriptor, and the
//! central directory is only written by [`ArchiveWriter::close`]. An archive
//! that is never closed is truncated and will not open in a ZIP reader.

mod format;

use std::collections::HashSet;
use std::io::Write;

use chrono::Local;
use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use format::{dos_timestamp, CentralRecord, MAX_ENTRIES};

/// Errors raised while writing an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("entry name already used in archive: {0}")]
    NameConflict(String),
    #[error("invalid entry name: {0:?}")]
    InvalidName(String),
    #[error("entry too large for a non-ZIP64 archive: {0}")]
    EntryTooLarge(String),
    #[error("archive exceeds 4 GiB, which requires ZIP64")]
    ArchiveTooLarge,
    #[error("archive cannot hold more than 65535 entries")]
    TooManyEntries,
    #[error("compression failed: {0}")]
    Compression(#[source] std::io::Error),
    #[error("archive output closed: {0}")]
    Sink(#[source] std::io::Error),
}

impl ArchiveError {
    /// Whether the archive output itself has failed.
    ///
    /// Every other error is local to a single entry and the archive can keep
    /// accepting entries afterwards.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ArchiveError::Sink(_) | ArchiveError::ArchiveTooLarge)
    }
}

/// Incremental ZIP writer over an async byte sink.
pub struct ArchiveWriter<W> {
    sink: W,
    offset: u64,
    entries: Vec<CentralRecord>,
    names: HashSet<String>,
}

impl<W: AsyncWrite + Unpin + Send> ArchiveWriter<W> {
    /// Start a new archive on `sink`. Nothing is written until the first entry.
    pub fn open(sink: W) -> Self {
        Self {
            sink,
            offset: 0,
            entries: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Begin a new entry and write its local header.
    ///
    /// The returned [`EntryWriter`] borrows the archive, so only one entry can
    /// be open at a time. It must be consumed with [`EntryWriter::finish`] or
    /// [`EntryWriter::abort`] before the next entry is created.
    pub async fn create_entry(&mut self, name: &str) -> Result<EntryWriter<'_, W>, ArchiveError> {
        if name.is_empty()
            || name.starts_with('/')
            || name.contains('\0')
            || name.len() > u16::MAX as usize
        {
            return Err(ArchiveError::InvalidName(name.to_string()));
        }
        if self.names.contains(name) {
            return Err(ArchiveError::NameConflict(name.to_string()));
        }
        if self.entries.len() >= MAX_ENTRIES {
            return Err(ArchiveError::TooManyEntries);
        }
        let header_offset = u32::try_from(self.offset).map_err(|_| ArchiveError::ArchiveTooLarge)?;

        let (dos_time, dos_date) = dos_timestamp(Local::now().naive_local());
        let header = format::local_header(name, dos_time, dos_date);
        self.write_raw(&header).await?;

        Ok(EntryWriter {
            archive: self,
            name: name.to_string(),
            crc: Crc::new(),
            encoder: DeflateEncoder::new(Vec::new(), Compression::default()),
            uncompressed: 0,
            compressed: 0,
            header_offset,
            dos_time,
            dos_date,
        })
    }

    /// Push everything written so far through the sink.
    pub async fn flush(&mut self) -> Result<(), ArchiveError> {
        self.sink.flush().await.map_err(ArchiveError::Sink)
    }

    /// Write the central directory and end record.
    ///
    /// Hands back the sink together with the total number of bytes written.
    pub async fn close(mut self) -> Result<(W, u64), ArchiveError> {
        let directory_offset =
            u32::try_from(self.offset).map_err(|_| ArchiveError::ArchiveTooLarge)?;

        let mut directory = Vec::new();
        for entry in &self.entries {
            entry.encode(&mut directory);
        }
        let directory_size =
            u32::try_from(directory.len()).map_err(|_| ArchiveError::ArchiveTooLarge)?;
        format::end_of_central_directory(
            &mut directory,
            self.entries.len() as u16,
            directory_size,
            directory_offset,
        );

        self.write_raw(&directory).await?;
        self.flush().await?;
        Ok((self.sink, self.offset))
    }

    /// Number of entries committed to the directory so far.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Total bytes emitted to the sink.
    pub fn bytes_written(&self) -> u64 {
        self.offset
    }

    async fn write_raw(&mut self, bytes: &[u8]) -> Result<(), ArchiveError> {
        self.sink
            .write_all(bytes)
            .await
            .map_err(ArchiveError::Sink)?;
        self.offset += bytes.len() as u64;
        Ok(())
    }
}

/// Writable stream for a single archive entry.
pub struct EntryWriter<'a, W> {
    archive: &'a mut ArchiveWriter<W>,
    name: String,
    crc: Crc,
    encoder: DeflateEncoder<Vec<u8>>,
    uncompressed: u64,
    compressed: u64,
    header_offset: u32,
    dos_time: u16,
    dos_date: u16,
}

impl<W: AsyncWrite + Unpin + Send> EntryWriter<'_, W> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compress `chunk` and forward whatever output the encoder produced.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), ArchiveError> {
        self.uncompressed += chunk.len() as u64;
        if self.uncompressed > u64::from(u32::MAX) {
            return Err(ArchiveError::EntryTooLarge(self.name.clone()));
        }
        self.crc.update(chunk);
        self.encoder
            .write_all(chunk)
            .map_err(ArchiveError::Compression)?;
        self.drain().await
    }

    /// Complete the entry and record it in the central directory.
    ///
    /// Returns the number of uncompressed bytes in the entry.
    pub async fn finish(mut self) -> Result<u64, ArchiveError> {
        self.terminate().await?;

        let compressed = u32::try_from(self.compressed)
            .map_err(|_| ArchiveError::EntryTooLarge(self.name.clone()))?;
        let uncompressed = u32::try_from(self.uncompressed)
            .map_err(|_| ArchiveError::EntryTooLarge(self.name.clone()))?;
        let crc = self.crc.sum();

        let descriptor = format::data_descriptor(crc, compressed, uncompressed);
        self.archive.write_raw(&descriptor).await?;

        self.archive.names.insert(self.name.clone());
        self.archive.entries.push(CentralRecord {
            name: std::mem::take(&mut self.name),
            crc,
            compressed_size: compressed,
            uncompressed_size: uncompressed,
            header_offset: self.header_offset,
            dos_time: self.dos_time,
            dos_date: self.dos_date,
        });
        Ok(self.uncompressed)
    }

    /// Close the entry's byte stream without listing it in the directory.
    ///
    /// The bytes already sent stay in the output but readers that go through
    /// the central directory never see the entry, and its name stays free.
    pub async fn abort(mut self) -> Result<(), ArchiveError> {
        self.terminate().await?;
        let descriptor = format::data_descriptor(
            self.crc.sum(),
            u32::try_from(self.compressed).unwrap_or(u32::MAX),
            u32::try_from(self.uncompressed).unwrap_or(u32::MAX),
        );
        self.archive.write_raw(&descriptor).await
    }

    async fn terminate(&mut self) -> Result<(), ArchiveError> {
        self.encoder.try_finish().map_err(ArchiveError::Compression)?;
        self.drain().await
    }

    async fn drain(&mut self) -> Result<(), ArchiveError> {
        let pending = std::mem::take(self.encoder.get_mut());
        if pending.is_empty() {
            return Ok(());
        }
        self.compressed += pending.len() as u64;
        self.archive.write_raw(&pending).await
    }
}
