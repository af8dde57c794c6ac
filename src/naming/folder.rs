use crate::error::{DamCamError, Result};
use crate::naming::strip_prefix_all;

/// Camera folder numbers that map onto download letters A..=Z.
pub const FIRST_FOLDER_NUMBER: u32 = 100;
pub const LAST_FOLDER_NUMBER: u32 = FIRST_FOLDER_NUMBER + 25;

/// Maps raw camera folders (`100RECNX`, `101RECNX`, ...) to download ids.
pub struct FolderClassifier {
    download_prefix: String,
    folder_prefix: String,
}

impl FolderClassifier {
    pub fn new<S: Into<String>>(download_prefix: S) -> Self {
        Self {
            download_prefix: download_prefix.into(),
            folder_prefix: "RECNX".to_string(),
        }
    }

    pub fn with_folder_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.folder_prefix = prefix.into();
        self
    }

    /// Letter for a folder number, `None` outside 100..=125.
    pub fn letter_for(number: u32) -> Option<char> {
        if (FIRST_FOLDER_NUMBER..=LAST_FOLDER_NUMBER).contains(&number) {
            char::from_u32(u32::from(b'A') + (number - FIRST_FOLDER_NUMBER))
        } else {
            None
        }
    }

    /// Leading folder number, `None` when the name is not `<digits>R...`.
    pub fn folder_number(folder_name: &str) -> Option<u32> {
        let (digits, _) = folder_name.split_once('R')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// `download_prefix` followed by the folder's letter.
    pub fn download_id(&self, folder_name: &str) -> Result<String> {
        let number = Self::folder_number(folder_name).ok_or_else(|| {
            DamCamError::unmapped(folder_name, "name does not start with '<number>R'")
        })?;

        let letter = Self::letter_for(number).ok_or_else(|| {
            DamCamError::unmapped(
                folder_name,
                format!(
                    "{} is outside {}..={}",
                    number, FIRST_FOLDER_NUMBER, LAST_FOLDER_NUMBER
                ),
            )
        })?;

        Ok(format!("{}{}", self.download_prefix, letter))
    }

    /// Folder name with the camera-firmware marker removed (`100RECNX` -> `100`).
    pub fn aux_folder(&self, folder_name: &str) -> String {
        strip_prefix_all(folder_name, &self.folder_prefix)
    }
}
