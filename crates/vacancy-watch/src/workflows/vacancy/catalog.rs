use super::domain::{Property, PropertyId};
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Ordered set of tracked listings. Catalog order drives detection and log order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyCatalog {
    properties: Vec<Property>,
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    name: String,
    url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to open property catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid property catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("property catalog lists no properties")]
    Empty,
    #[error("property catalog row {row} has a blank name")]
    BlankName { row: usize },
    #[error("property '{0}' is listed more than once")]
    DuplicateProperty(String),
    #[error("property '{property}' has an invalid URL '{url}': {reason}")]
    InvalidUrl {
        property: String,
        url: String,
        reason: String,
    },
}

impl PropertyCatalog {
    pub fn new(properties: Vec<Property>) -> Result<Self, CatalogError> {
        if properties.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for (index, property) in properties.iter().enumerate() {
            if property.id.as_str().trim().is_empty() {
                return Err(CatalogError::BlankName { row: index + 1 });
            }
            if !seen.insert(property.id.clone()) {
                return Err(CatalogError::DuplicateProperty(property.id.to_string()));
            }
            validate_url(property)?;
        }

        Ok(Self { properties })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Reads a `name,url` CSV with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut properties = Vec::new();
        for row in csv_reader.deserialize::<CatalogRow>() {
            let row = row?;
            properties.push(Property::new(row.name, row.url));
        }

        Self::new(properties)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn get(&self, id: &PropertyId) -> Option<&Property> {
        self.properties.iter().find(|property| &property.id == id)
    }

    pub fn contains(&self, id: &PropertyId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

fn validate_url(property: &Property) -> Result<(), CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidUrl {
        property: property.id.to_string(),
        url: property.url.clone(),
        reason,
    };

    let url = Url::parse(&property.url).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
