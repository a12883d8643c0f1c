//! Page store: maps page numbers to byte ranges of the database file and
//! keeps the pages touched so far in memory.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{DbError, DbResult};
use crate::{PAGE_SIZE, TABLE_MAX_PAGES};

pub type PageNum = usize;

type PageBuf = Box<[u8; PAGE_SIZE]>;

/// Owns the database file and a bounded cache of page buffers.
///
/// Pages are loaded lazily on first access and stay resident until the pager
/// is closed. There is no eviction: `max_pages` bounds both the cache and
/// the file.
pub struct Pager {
    file: File,
    file_length: u64,
    max_pages: usize,
    pages: HashMap<PageNum, PageBuf>,
}

impl Pager {
    /// Opens the database file at `path`, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::open_with_max_pages(path, TABLE_MAX_PAGES)
    }

    /// Like [`Pager::open`] with a page capacity other than `TABLE_MAX_PAGES`.
    /// The capacity must be non-zero and every byte it covers addressable.
    pub fn open_with_max_pages(path: impl AsRef<Path>, max_pages: usize) -> DbResult<Self> {
        if max_pages == 0 || max_pages.checked_mul(PAGE_SIZE).is_none() {
            return Err(DbError::InvalidCapacity { max_pages });
        }

        let path = path.as_ref();
        let open_err = |source| DbError::Open {
            path: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(open_err)?;
        let file_length = file.metadata().map_err(open_err)?.len();

        log::info!(
            "Opened {} ({file_length} bytes, max {max_pages} pages)",
            path.display()
        );

        Ok(Self {
            file,
            file_length,
            max_pages,
            pages: HashMap::new(),
        })
    }

    /// Length of the file as known to the pager, in bytes.
    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    pub fn is_resident(&self, page_num: PageNum) -> bool {
        self.pages.contains_key(&page_num)
    }

    /// Page numbers currently held in memory, in ascending order.
    pub fn resident_pages(&self) -> Vec<PageNum> {
        let mut pages: Vec<_> = self.pages.keys().copied().collect();
        pages.sort_unstable();
        pages
    }

    /// Returns the buffer of `page_num`, reading it from disk on first access.
    ///
    /// Pages past the end of the file come back zero-filled, as does the
    /// tail of a partially written last page.
    pub fn get_page(&mut self, page_num: PageNum) -> DbResult<&mut [u8; PAGE_SIZE]> {
        if page_num >= self.max_pages {
            return Err(DbError::PageOutOfBounds {
                page_num,
                max_pages: self.max_pages,
            });
        }

        if !self.pages.contains_key(&page_num) {
            let page = self.load_page(page_num)?;
            self.pages.insert(page_num, page);
        }

        match self.pages.get_mut(&page_num) {
            Some(page) => Ok(&mut **page),
            None => Err(DbError::PageNotResident(page_num)),
        }
    }

    fn load_page(&mut self, page_num: PageNum) -> DbResult<PageBuf> {
        let mut page: PageBuf = Box::new([0u8; PAGE_SIZE]);

        let num_pages = self.file_length.div_ceil(PAGE_SIZE as u64);
        if (page_num as u64) < num_pages {
            let read_err = |source| DbError::Read { page_num, source };
            self.file
                .seek(SeekFrom::Start(page_offset(page_num)))
                .map_err(read_err)?;
            let bytes_read = read_up_to(&mut self.file, page.as_mut_slice()).map_err(read_err)?;
            log::debug!("Loaded page {page_num} ({bytes_read} bytes from disk)");
        } else {
            log::debug!("Allocated page {page_num} past end of file");
        }

        Ok(page)
    }

    /// Writes the first `byte_count` bytes of a resident page to its place in
    /// the file and syncs the file before returning.
    pub fn flush_page(&mut self, page_num: PageNum, byte_count: usize) -> DbResult<()> {
        if byte_count > PAGE_SIZE {
            return Err(DbError::FlushTooLarge {
                byte_count,
                page_size: PAGE_SIZE,
            });
        }
        let page = self
            .pages
            .get(&page_num)
            .ok_or(DbError::PageNotResident(page_num))?;

        let write_err = |source| DbError::Write { page_num, source };
        let offset = page_offset(page_num);
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(write_err)?;
        self.file
            .write_all(&page[..byte_count])
            .map_err(write_err)?;
        self.file.sync_all().map_err(write_err)?;

        self.file_length = self.file_length.max(offset + byte_count as u64);
        log::debug!("Flushed {byte_count} bytes of page {page_num}");

        Ok(())
    }

    /// Releases every page buffer and the file handle. Does not flush.
    pub fn close(self) {
        log::info!(
            "Closing pager ({} resident pages, {} bytes on disk)",
            self.pages.len(),
            self.file_length
        );
    }
}

fn page_offset(page_num: PageNum) -> u64 {
    page_num as u64 * PAGE_SIZE as u64
}

/// Reads until `buf` is full or the file ends. A short count is not an error.
fn read_up_to(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
