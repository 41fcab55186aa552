use super::types::{de_id, non_blank};
use crate::error::Result;
use crate::validation;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    #[serde(rename = "nama")]
    pub name: String,

    #[serde(rename = "tanggal_bergabung", default)]
    pub joined_on: Option<NaiveDate>,

    #[serde(rename = "kontak", default)]
    pub contact: Option<String>,

    #[serde(rename = "alamat", default)]
    pub address: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Teacher {
    pub fn to_draft(&self) -> TeacherDraft {
        TeacherDraft {
            name: self.name.clone(),
            joined_on: self.joined_on,
            contact: self.contact.clone(),
            address: self.address.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherDraft {
    #[serde(rename = "nama")]
    pub name: String,

    #[serde(rename = "tanggal_bergabung")]
    pub joined_on: Option<NaiveDate>,

    #[serde(rename = "kontak")]
    pub contact: Option<String>,

    #[serde(rename = "alamat")]
    pub address: Option<String>,
}

impl TeacherDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            joined_on: None,
            contact: None,
            address: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validation::validate_name(&self.name)?;
        if let Some(address) = &self.address {
            validation::validate_notes(address)?;
        }
        Ok(())
    }

    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            joined_on: self.joined_on,
            contact: non_blank(self.contact),
            address: non_blank(self.address),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherRef {
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    #[serde(rename = "nama")]
    pub name: String,
}
