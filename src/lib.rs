pub mod command;
pub mod error;
pub mod pager;
pub mod repl;
pub mod row;
pub mod table;

pub use error::{DbError, DbResult};
pub use pager::Pager;
pub use row::Row;
pub use table::{Cursor, Table};

pub const COLUMN_NAME_SIZE: usize = 32;
pub const COLUMN_EMAIL_SIZE: usize = 64;
pub const ID_MAX_DIGITS: usize = 10;
pub const NAME_SIZE: usize = COLUMN_NAME_SIZE;
pub const EMAIL_SIZE: usize = COLUMN_EMAIL_SIZE;

// "<id> <name> <email>"
pub const ROW_LINE_MAX_SIZE: usize = ID_MAX_DIGITS + 1 + NAME_SIZE + 1 + EMAIL_SIZE;
pub const ROW_SIZE: usize = 256;

pub const PAGE_SIZE: usize = 4096;
pub const TABLE_MAX_PAGES: usize = 100;
pub const ROWS_PER_PAGE: usize = PAGE_SIZE / ROW_SIZE;
pub const TABLE_MAX_ROWS: usize = ROWS_PER_PAGE * TABLE_MAX_PAGES;

const _: () = assert!(ROW_LINE_MAX_SIZE <= ROW_SIZE);
const _: () = assert!(PAGE_SIZE % ROW_SIZE == 0);
