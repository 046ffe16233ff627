use crate::utils::error::{Result, SpatialError};

/// Logical field name → accepted header spellings.
pub struct ColumnAliasTable {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
}

pub const EASTING: ColumnAliasTable = ColumnAliasTable {
    field: "easting",
    aliases: &["Easting", "east", "X"],
};

pub const NORTHING: ColumnAliasTable = ColumnAliasTable {
    field: "northing",
    aliases: &["Northing", "north", "Y"],
};

impl ColumnAliasTable {
    pub fn matches(&self, header: &str) -> bool {
        let normalized = header.trim().to_lowercase();
        self.aliases
            .iter()
            .any(|alias| alias.to_lowercase() == normalized)
    }
}

/// Returns the index and literal name of the first header matching the table.
pub fn find_column(headers: &[String], table: &ColumnAliasTable) -> Result<(usize, String)> {
    headers
        .iter()
        .enumerate()
        .find(|(_, header)| table.matches(header))
        .map(|(index, header)| (index, header.clone()))
        .ok_or_else(|| SpatialError::ColumnNotFoundError {
            field: table.field.to_string(),
            aliases: table.aliases.iter().map(|a| a.to_string()).collect(),
            headers: headers.to_vec(),
        })
}
