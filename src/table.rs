use std::path::Path;

use crate::error::{DbError, DbResult};
use crate::pager::{PageNum, Pager};
use crate::row::Row;
use crate::{PAGE_SIZE, ROW_SIZE, ROWS_PER_PAGE, TABLE_MAX_PAGES};

/// A single fixed-schema table stored row after row in a paged file.
///
/// Row `r` lives in page `r / ROWS_PER_PAGE` at byte offset
/// `(r % ROWS_PER_PAGE) * ROW_SIZE`. There is no header: the row count is
/// derived from the file length when the table is opened.
pub struct Table {
    pager: Pager,
    num_rows: usize,
}

impl Table {
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::open_with_max_pages(path, TABLE_MAX_PAGES)
    }

    pub fn open_with_max_pages(path: impl AsRef<Path>, max_pages: usize) -> DbResult<Self> {
        let pager = Pager::open_with_max_pages(path, max_pages)?;
        let file_length = pager.file_length();

        let trailing = file_length % ROW_SIZE as u64;
        if trailing != 0 {
            log::warn!("Ignoring {trailing} trailing bytes that do not form a whole row");
        }

        let mut num_rows = (file_length / ROW_SIZE as u64) as usize;
        let max_rows = pager.max_pages() * ROWS_PER_PAGE;
        if num_rows > max_rows {
            log::warn!("File holds {num_rows} rows, only the first {max_rows} are reachable");
            num_rows = max_rows;
        }

        Ok(Self { pager, num_rows })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn max_rows(&self) -> usize {
        self.pager.max_pages() * ROWS_PER_PAGE
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Page number and in-page byte offset of a row.
    pub fn row_location(row_num: usize) -> (PageNum, usize) {
        (row_num / ROWS_PER_PAGE, (row_num % ROWS_PER_PAGE) * ROW_SIZE)
    }

    fn row_slot(&mut self, row_num: usize) -> DbResult<&mut [u8]> {
        let (page_num, offset) = Self::row_location(row_num);
        let page = self.pager.get_page(page_num)?;
        Ok(&mut page[offset..offset + ROW_SIZE])
    }

    /// Appends a row and flushes it to disk before returning.
    ///
    /// The flush covers the page from its start through the new row, so the
    /// file never has a hole in front of the last inserted row.
    pub fn insert(&mut self, row: &Row) -> DbResult<()> {
        let max_rows = self.max_rows();
        if self.num_rows >= max_rows {
            return Err(DbError::TableFull { max_rows });
        }

        let row_num = self.num_rows;
        row.serialize(self.row_slot(row_num)?);

        // the row only counts once it is on disk
        let (page_num, offset) = Self::row_location(row_num);
        self.pager.flush_page(page_num, offset + ROW_SIZE)?;
        self.num_rows += 1;
        Ok(())
    }

    /// Returns a cursor over every row, in insertion order.
    pub fn scan(&mut self) -> Cursor<'_> {
        Cursor::start(self)
    }

    /// Forgets every row. Page bytes are neither zeroed nor flushed, so the
    /// old rows are overwritten one by one by later inserts.
    pub fn clear(&mut self) {
        log::debug!("Clearing {} rows", self.num_rows);
        self.num_rows = 0;
    }

    /// Flushes the resident pages that hold rows and closes the file.
    pub fn close(mut self) -> DbResult<()> {
        let num_full_pages = self.num_rows / ROWS_PER_PAGE;
        for page_num in 0..num_full_pages {
            if self.pager.is_resident(page_num) {
                self.pager.flush_page(page_num, PAGE_SIZE)?;
            }
        }

        // rows on the last, partially filled page
        let additional_rows = self.num_rows % ROWS_PER_PAGE;
        if additional_rows > 0 && self.pager.is_resident(num_full_pages) {
            self.pager
                .flush_page(num_full_pages, additional_rows * ROW_SIZE)?;
        }

        log::info!("Closing table with {} rows", self.num_rows);
        self.pager.close();
        Ok(())
    }
}

/// Position in a table, yielding decoded rows from `row_num` up to the end.
pub struct Cursor<'a> {
    table: &'a mut Table,
    row_num: usize,
    end_of_table: bool,
}

impl<'a> Cursor<'a> {
    fn start(table: &'a mut Table) -> Self {
        let end_of_table = table.num_rows == 0;
        Self {
            table,
            row_num: 0,
            end_of_table,
        }
    }

    pub fn row_num(&self) -> usize {
        self.row_num
    }

    pub fn end_of_table(&self) -> bool {
        self.end_of_table
    }

    /// Decodes the row under the cursor.
    pub fn value(&mut self) -> DbResult<Row> {
        let row_num = self.row_num;
        let slot = self.table.row_slot(row_num)?;
        Row::deserialize(slot).ok_or(DbError::CorruptRow { row_num })
    }

    pub fn advance(&mut self) {
        self.row_num += 1;
        if self.row_num >= self.table.num_rows {
            self.end_of_table = true;
        }
    }
}

impl Iterator for Cursor<'_> {
    type Item = DbResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.end_of_table {
            return None;
        }
        let row = self.value();
        self.advance();
        Some(row)
    }
}
