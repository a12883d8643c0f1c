use std::fmt;

use crate::error::{DbError, DbResult};
use crate::{EMAIL_SIZE, NAME_SIZE, ROW_SIZE};

/// One record of the table.
///
/// On disk a row is the text line `"<id> <name> <email>"` at the start of its
/// slot, the rest of the slot is zero. Fields are separated by a single space,
/// so neither `name` nor `email` may contain whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: u32,
    name: String,
    email: String,
}

impl Row {
    /// Builds a row, truncating `name` and `email` to their column widths.
    pub fn new(id: u32, name: &str, email: &str) -> DbResult<Self> {
        validate_field("name", name)?;
        validate_field("email", email)?;

        Ok(Self {
            id,
            name: truncate("name", name, NAME_SIZE).to_string(),
            email: truncate("email", email, EMAIL_SIZE).to_string(),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Writes the row into a slot of exactly `ROW_SIZE` bytes.
    pub fn serialize(&self, slot: &mut [u8]) {
        debug_assert_eq!(slot.len(), ROW_SIZE);
        let line = self.to_string();
        let len = line.len();
        slot[..len].copy_from_slice(line.as_bytes());
        slot[len..].fill(0);
    }

    /// Reads a row back from a slot. Returns `None` when the bytes are not a
    /// well-formed row line.
    pub fn deserialize(slot: &[u8]) -> Option<Self> {
        let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
        let line = std::str::from_utf8(&slot[..end]).ok()?;

        let mut fields = line.split(' ');
        let id = fields.next()?.parse().ok()?;
        let name = fields.next()?;
        let email = fields.next()?;
        if fields.next().is_some() || name.is_empty() || email.is_empty() {
            return None;
        }
        // wider than its column means the slot was not written by `serialize`
        if name.len() > NAME_SIZE || email.len() > EMAIL_SIZE {
            return None;
        }

        Some(Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.id, self.name, self.email)
    }
}

fn validate_field(field: &'static str, value: &str) -> DbResult<()> {
    if value.is_empty() {
        return Err(DbError::InvalidField {
            field,
            reason: "must not be empty",
        });
    }
    if value.chars().any(|c| c.is_whitespace() || c == '\0') {
        return Err(DbError::InvalidField {
            field,
            reason: "must not contain whitespace or NUL",
        });
    }
    Ok(())
}

fn truncate<'a>(field: &str, value: &'a str, max: usize) -> &'a str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    log::debug!("Truncating {field} from {} to {end} bytes", value.len());
    &value[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_as_text_line() {
        let row = Row::new(42, "alice", "a@example.com").unwrap();
        let mut slot = [0xffu8; ROW_SIZE];
        row.serialize(&mut slot);

        let line = b"42 alice a@example.com";
        assert_eq!(&slot[..line.len()], line);
        assert!(slot[line.len()..].iter().all(|&b| b == 0));
        assert_eq!(Row::deserialize(&slot), Some(row));
    }

    #[test]
    fn test_truncates_long_fields() {
        let name = "n".repeat(NAME_SIZE + 5);
        let email = "e".repeat(EMAIL_SIZE + 1);
        let row = Row::new(1, &name, &email).unwrap();

        assert_eq!(row.name().len(), NAME_SIZE);
        assert_eq!(row.email().len(), EMAIL_SIZE);
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        // 'é' is two bytes, so NAME_SIZE falls in the middle of a char
        let name = format!("a{}", "é".repeat(NAME_SIZE));
        let row = Row::new(1, &name, "x@y").unwrap();

        assert_eq!(row.name().len(), NAME_SIZE - 1);
        assert!(row.name().starts_with('a'));
    }

    #[test]
    fn test_rejects_delimiter_in_field() {
        assert!(matches!(
            Row::new(1, "bob smith", "b@example.com"),
            Err(DbError::InvalidField { field: "name", .. })
        ));
        assert!(matches!(
            Row::new(1, "bob", ""),
            Err(DbError::InvalidField { field: "email", .. })
        ));
    }

    #[test]
    fn test_overwrite_shorter_row_clears_tail() {
        let mut slot = [0u8; ROW_SIZE];
        Row::new(1000, "longer-name", "longer@example.com")
            .unwrap()
            .serialize(&mut slot);
        let short = Row::new(1, "a", "b").unwrap();
        short.serialize(&mut slot);

        assert_eq!(Row::deserialize(&slot), Some(short));
    }

    #[test]
    fn test_over_wide_field_does_not_decode() {
        let line = format!("1 {} e@x\0", "n".repeat(NAME_SIZE + 1));
        assert_eq!(Row::deserialize(line.as_bytes()), None);

        let line = format!("1 n {}\0", "e".repeat(EMAIL_SIZE + 1));
        assert_eq!(Row::deserialize(line.as_bytes()), None);

        let line = format!("1 {} {}\0", "n".repeat(NAME_SIZE), "e".repeat(EMAIL_SIZE));
        assert!(Row::deserialize(line.as_bytes()).is_some());
    }

    #[test]
    fn test_garbage_slot_does_not_decode() {
        assert_eq!(Row::deserialize(&[0u8; ROW_SIZE]), None);
        assert_eq!(Row::deserialize(b"abc def ghi\0"), None);
        assert_eq!(Row::deserialize(b"1 only-name\0"), None);
    }
}
