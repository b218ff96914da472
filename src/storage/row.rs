//! Row codec: a fixed-width `(id, username, email)` record.
use crate::err;
use crate::errors::Error;

pub const COLUMN_USERNAME_SIZE: usize = 32;
pub const COLUMN_EMAIL_SIZE: usize = 255;

pub const ID_SIZE: usize = 4;
pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + COLUMN_USERNAME_SIZE;
pub const ROW_SIZE: usize = ID_SIZE + COLUMN_USERNAME_SIZE + COLUMN_EMAIL_SIZE;

/// One row of the table. `id` must be positive; `id == 0` is the sentinel
/// for an empty/junk slot and is filtered out of `select` results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    pub fn new(id: u32, username: impl Into<String>, email: impl Into<String>) -> Result<Self, Error> {
        let username = username.into();
        let email = email.into();
        if username.len() > COLUMN_USERNAME_SIZE || email.len() > COLUMN_EMAIL_SIZE {
            return Err(err!(Validation, "String is too long."));
        }
        if id == 0 {
            return Err(err!(Validation, "ID must be positive"));
        }
        Ok(Row { id, username, email })
    }

    /// Writes this row into a `ROW_SIZE`-byte slot. Trailing bytes of the
    /// username/email regions are left zero.
    pub fn serialize(&self, dest: &mut [u8]) {
        debug_assert_eq!(dest.len(), ROW_SIZE);
        dest[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_le_bytes());

        let username_bytes = self.username.as_bytes();
        dest[USERNAME_OFFSET..USERNAME_OFFSET + COLUMN_USERNAME_SIZE].fill(0);
        dest[USERNAME_OFFSET..USERNAME_OFFSET + username_bytes.len()].copy_from_slice(username_bytes);

        let email_bytes = self.email.as_bytes();
        dest[EMAIL_OFFSET..EMAIL_OFFSET + COLUMN_EMAIL_SIZE].fill(0);
        dest[EMAIL_OFFSET..EMAIL_OFFSET + email_bytes.len()].copy_from_slice(email_bytes);
    }

    /// Reads a row back out of a `ROW_SIZE`-byte slot. Trailing NUL bytes
    /// are stripped from the string fields.
    pub fn deserialize(src: &[u8]) -> Self {
        debug_assert_eq!(src.len(), ROW_SIZE);
        let id = u32::from_le_bytes(src[ID_OFFSET..ID_OFFSET + ID_SIZE].try_into().unwrap());
        let username = trim_nul(&src[USERNAME_OFFSET..USERNAME_OFFSET + COLUMN_USERNAME_SIZE]);
        let email = trim_nul(&src[EMAIL_OFFSET..EMAIL_OFFSET + COLUMN_EMAIL_SIZE]);
        Row { id, username, email }
    }
}

fn trim_nul(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let row = Row::new(42, "user1", "person1@example.com").unwrap();
        let mut buf = [0u8; ROW_SIZE];
        row.serialize(&mut buf);
        let back = Row::deserialize(&buf);
        assert_eq!(row, back);
    }

    #[test]
    fn roundtrip_max_length_strings() {
        let username = "a".repeat(COLUMN_USERNAME_SIZE);
        let email = "a".repeat(COLUMN_EMAIL_SIZE);
        let row = Row::new(1, username.clone(), email.clone()).unwrap();
        let mut buf = [0u8; ROW_SIZE];
        row.serialize(&mut buf);
        let back = Row::deserialize(&buf);
        assert_eq!(back.username, username);
        assert_eq!(back.email, email);
    }

    #[test]
    fn rejects_oversized_strings() {
        let username = "a".repeat(COLUMN_USERNAME_SIZE + 1);
        assert!(Row::new(1, username, "e").is_err());
    }

    #[test]
    fn rejects_non_positive_id() {
        assert!(Row::new(0, "u", "e").is_err());
    }

    #[test]
    fn trailing_bytes_are_zero() {
        let row = Row::new(1, "ab", "cd").unwrap();
        let mut buf = [0xFFu8; ROW_SIZE];
        row.serialize(&mut buf);
        assert!(buf[USERNAME_OFFSET + 2..EMAIL_OFFSET].iter().all(|&b| b == 0));
        assert!(buf[EMAIL_OFFSET + 2..].iter().all(|&b| b == 0));
    }
}
