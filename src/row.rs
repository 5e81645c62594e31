//! Fixed-layout serialization of the table's only record shape.

use std::fmt;

pub const ID_SIZE: usize = 4;
pub const USERNAME_SIZE: usize = 32;
pub const EMAIL_SIZE: usize = 255;
/// Field regions on disk include the trailing NUL.
const USERNAME_REGION: usize = USERNAME_SIZE + 1;
const EMAIL_REGION: usize = EMAIL_SIZE + 1;

pub const ROW_SIZE: usize = ID_SIZE + USERNAME_REGION + EMAIL_REGION;

const ID_OFFSET: usize = 0;
const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_REGION;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

#[derive(Debug)]
pub enum RowError {
    StringTooLong,
}

impl Row {
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self, RowError> {
        if username.len() > USERNAME_SIZE || email.len() > EMAIL_SIZE {
            return Err(RowError::StringTooLong);
        }
        Ok(Row {
            id,
            username: username.to_owned(),
            email: email.to_owned(),
        })
    }

    pub fn serialize(&self) -> [u8; ROW_SIZE] {
        let mut buf = [0u8; ROW_SIZE];
        buf[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_le_bytes());

        let username_bytes = self.username.as_bytes();
        buf[USERNAME_OFFSET..USERNAME_OFFSET + username_bytes.len()]
            .copy_from_slice(username_bytes);

        let email_bytes = self.email.as_bytes();
        buf[EMAIL_OFFSET..EMAIL_OFFSET + email_bytes.len()].copy_from_slice(email_bytes);

        buf
    }

    pub fn deserialize(buf: &[u8]) -> Self {
        let mut id_bytes = [0u8; ID_SIZE];
        id_bytes.copy_from_slice(&buf[ID_OFFSET..ID_OFFSET + ID_SIZE]);
        let id = u32::from_le_bytes(id_bytes);

        let username = read_nul_terminated(&buf[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_REGION]);
        let email = read_nul_terminated(&buf[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_REGION]);

        Row {
            id,
            username,
            email,
        }
    }
}

fn read_nul_terminated(region: &[u8]) -> String {
    let end = region.iter().position(|&b| b == 0).unwrap_or(region.len());
    String::from_utf8_lossy(&region[..end]).into_owned()
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}
